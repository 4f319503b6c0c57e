#![no_main]

use libfuzzer_sys::fuzz_target;
use tinylfu::policy::tiny_lfu::TinyLfuCore;

// Fuzz arbitrary operation sequences on the W-TinyLFU policy
//
// Tests random sequences of insert, get, contains, and clear to find edge
// cases in the window drain and admission tournament, checking the region
// bookkeeping after every step.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let maximum_size = (data[0] as usize % 64).max(1);
    let mut cache: TinyLfuCore<u64, u64> = TinyLfuCore::new(maximum_size);

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 8;
        let key = data[idx + 1] as u64;

        match op {
            0..=3 => {
                cache.insert(key, key.wrapping_mul(31));
            }
            4..=5 => {
                let _ = cache.get(&key);
            }
            6 => {
                let resident = cache.contains(&key);
                let tagged = cache.is_in_window(&key)
                    || cache.is_in_probation(&key)
                    || cache.is_in_protected(&key);
                assert_eq!(resident, tagged);
            }
            7 => {
                // Rare full reset keeps the sequence exploring refills.
                if data[idx + 1] == 0xff {
                    cache.clear();
                }
            }
            _ => unreachable!(),
        }

        // Region bookkeeping must stay consistent after every operation.
        assert!(cache.window_len() <= cache.window_cap());
        assert!(cache.probation_len() <= cache.probation_cap());
        assert!(cache.protected_len() <= cache.protected_cap());
        assert_eq!(
            cache.len(),
            cache.window_len() + cache.probation_len() + cache.protected_len()
        );
        assert!(cache.len() <= cache.maximum_size());

        idx += 2;
    }
});
