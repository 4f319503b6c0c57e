//! Window-TinyLFU (W-TinyLFU) cache replacement policy.
//!
//! Combines a small recency window with a frequency-sketch admission filter
//! in front of a segmented main area. New entries prove themselves in the
//! window; when the window overflows, its victim must win a popularity
//! tournament against the oldest probation entry to stay resident. This
//! keeps one-hit wonders from displacing the established working set while
//! still letting genuinely popular newcomers in.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          TinyLfuCore<K, V> Layout                           │
//! │                                                                             │
//! │   ┌─────────────────────────────────────────────────────────────────────┐   │
//! │   │  map: FxHashMap<K, NodeId>            nodes: RegionArena<K, V>      │   │
//! │   │                                                                     │   │
//! │   │  ┌──────────┬──────────┐    ┌────────┬───────────────────────────┐  │   │
//! │   │  │   Key    │  NodeId  │    │ NodeId │ key, value, region, links │  │   │
//! │   │  ├──────────┼──────────┤    ├────────┼───────────────────────────┤  │   │
//! │   │  │  "a"     │   id_0   │───►│  id_0  │ "a", .., Window,    ⟨..⟩  │  │   │
//! │   │  │  "b"     │   id_1   │───►│  id_1  │ "b", .., Probation, ⟨..⟩  │  │   │
//! │   │  └──────────┴──────────┘    └────────┴───────────────────────────┘  │   │
//! │   └─────────────────────────────────────────────────────────────────────┘   │
//! │                                                                             │
//! │   WINDOW (2%)            PROBATION (20%)          PROTECTED (4×probation)   │
//! │   ┌───────────────┐      ┌───────────────┐        ┌───────────────┐         │
//! │   │ MRU ──► LRU   │      │ MRU ──► LRU   │        │ (not populated│         │
//! │   │ new entries   │      │ admitted      │        │  by the       │         │
//! │   └───────┬───────┘      └───────┬───────┘        │  current core)│         │
//! │           │ overflow             │ tournament     └───────────────┘         │
//! │           ▼                      ▼ loser                                    │
//! │     admission tournament ──► evicted                                        │
//! │                                                                             │
//! │   FrequencySketch: 4-bit popularity estimates arbitrating the tournament    │
//! └─────────────────────────────────────────────────────────────────────────────┘
//!
//! Insert Flow (new key)
//! ─────────────────────
//!
//!   insert(key, value):
//!     1. Existing key ⇒ overwrite value in place, done (no sketch update)
//!     2. Push entry to window front, record in map
//!     3. sketch.increment(key)
//!     4. Window over cap ⇒ drain tails; highest-frequency tail becomes the
//!        admission candidate, the rest are evicted
//!     5. Probation has room ⇒ candidate admitted at probation front
//!     6. Otherwise candidate vs probation tail: lower frequency evicted,
//!        ties decided by coin flip
//!
//! Access Flow
//! ───────────
//!
//!   get(key):
//!     1. Lookup in map; miss ⇒ None
//!     2. Hit ⇒ sketch.increment(key), return &value
//!        (no reorder, no probation→protected promotion)
//! ```
//!
//! ## Operations
//!
//! | Operation   | Time   | Notes                                        |
//! |-------------|--------|----------------------------------------------|
//! | `get`       | O(1)   | Bumps the frequency sketch on hit            |
//! | `insert`    | O(1)*  | *Amortized; may run the admission tournament |
//! | `contains`  | O(1)   | Map lookup only, no sketch update            |
//! | `len`       | O(1)   | Total entries across regions                 |
//! | `clear`     | O(n)   | Keeps sketch history                         |
//!
//! ## Region sizing
//!
//! For a requested size `n`: window = `⌊n·0.02⌋` (min 2), probation =
//! `⌊n·0.20⌋` (min 2), protected = `probation·4` (min 8). The effective
//! maximum is their sum, so small requests round up (e.g. 4 → 12).
//!
//! ## Example Usage
//!
//! ```
//! use tinylfu::policy::tiny_lfu::TinyLfuCore;
//!
//! let mut cache = TinyLfuCore::new(4);
//! assert_eq!(cache.maximum_size(), 12);
//!
//! cache.insert("page1", "content1");
//! cache.insert("page2", "content2");
//! assert!(cache.is_in_window(&"page1"));
//!
//! // A third insert spills the window tail into probation.
//! cache.insert("page3", "content3");
//! assert!(cache.is_in_probation(&"page1"));
//!
//! // Hits feed the admission filter.
//! assert_eq!(cache.get(&"page1"), Some(&"content1"));
//! assert_eq!(cache.frequency(&"page1"), 2);
//! ```
//!
//! ## Thread Safety
//!
//! - [`TinyLfuCore`]: single-threaded; every operation runs to completion on
//!   the caller. `get` takes `&mut self` because a hit mutates the sketch.
//! - [`ConcurrentTinyLfu`]: the same core behind a `parking_lot::Mutex` for
//!   callers that need shared access.
//!
//! ## Implementation Notes
//!
//! - All three regions chain through one node arena ([`RegionArena`]); a
//!   node carries its own region tag, and a region transfer retags it in
//!   place, so the handle the map holds never needs rewriting and unlinks
//!   are O(1) without raw-pointer aliasing.
//! - A hit does not move the entry within its list and does not promote
//!   probation entries to the protected region; the protected region is
//!   sized and reported but stays empty.
//! - The window drain keeps the drained tail with the *highest* estimated
//!   frequency as the admission candidate (first drained wins ties).
//! - Tie-breaks use a per-cache xorshift stream seeded from the derived
//!   maximum size, so identical configurations replay identically.
//!
//! ## References
//!
//! - Einziger, Friedman, Manes: "TinyLFU: A Highly Efficient Cache
//!   Admission Policy"
//! - Karedla et al., "Caching Strategies to Improve Disk System
//!   Performance", 1994 (segmented LRU)

use crate::ds::region_arena::{NodeId, Region, RegionArena};
use crate::sketch::frequency_sketch::FrequencySketch;
use crate::sketch::key_hash::SketchKey;
use crate::traits::{CoreCache, ReadOnlyCache};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::hash::Hash;

const WINDOW_FRACTION: f64 = 0.02;
const PROBATION_FRACTION: f64 = 0.20;

/// Core Window-TinyLFU cache implementation.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `SketchKey + Clone + Eq + Hash`
/// - `V`: Value type
///
/// # Example
///
/// ```
/// use tinylfu::policy::tiny_lfu::TinyLfuCore;
///
/// let mut cache = TinyLfuCore::new(100);
///
/// cache.insert("key1", "value1");
/// assert_eq!(cache.get(&"key1"), Some(&"value1"));
///
/// // Update in place
/// cache.insert("key1", "new_value");
/// assert_eq!(cache.get(&"key1"), Some(&"new_value"));
/// ```
pub struct TinyLfuCore<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    /// Key -> node handle for every live entry. Handles stay valid across
    /// region transfers, so the map is only touched on insert and evict.
    map: FxHashMap<K, NodeId>,

    /// All entry nodes, chained into the three recency regions.
    nodes: RegionArena<K, V>,

    window_cap: usize,
    probation_cap: usize,
    protected_cap: usize,

    sketch: FrequencySketch,

    /// Xorshift state for tournament tie-breaks.
    rng_state: u64,
}

impl<K, V> TinyLfuCore<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    /// Creates a cache sized for roughly `maximum_size` entries.
    ///
    /// Region caps are derived as window 2% (min 2), probation 20% (min 2),
    /// protected 4× probation (min 8); the effective capacity is their sum
    /// and may exceed the request for small sizes.
    ///
    /// # Example
    ///
    /// ```
    /// use tinylfu::policy::tiny_lfu::TinyLfuCore;
    ///
    /// let cache: TinyLfuCore<u64, String> = TinyLfuCore::new(20);
    /// assert_eq!(cache.window_cap(), 2);
    /// assert_eq!(cache.probation_cap(), 4);
    /// assert_eq!(cache.protected_cap(), 16);
    /// assert_eq!(cache.maximum_size(), 22);
    /// ```
    pub fn new(maximum_size: usize) -> Self {
        let window_cap = ((maximum_size as f64 * WINDOW_FRACTION) as usize).max(2);
        let probation_cap = ((maximum_size as f64 * PROBATION_FRACTION) as usize).max(2);
        let protected_cap = (probation_cap * 4).max(8);
        let total = window_cap + probation_cap + protected_cap;

        let mut sketch = FrequencySketch::new();
        sketch.ensure_capacity(total);

        Self {
            map: FxHashMap::with_capacity_and_hasher(total, Default::default()),
            nodes: RegionArena::with_capacity(total + 1),
            window_cap,
            probation_cap,
            protected_cap,
            sketch,
            // Non-zero xorshift seed tied to the configuration so runs replay.
            rng_state: (total as u64).wrapping_add(0x9e37_79b9_7f4a_7c15),
        }
    }

    /// Retrieves a value by key, recording the access in the sketch.
    ///
    /// A hit bumps the key's popularity estimate (capped at 15) but does
    /// not reorder the entry within its region.
    ///
    /// # Example
    ///
    /// ```
    /// use tinylfu::policy::tiny_lfu::TinyLfuCore;
    ///
    /// let mut cache = TinyLfuCore::new(100);
    /// cache.insert("key", 42);
    ///
    /// assert_eq!(cache.get(&"key"), Some(&42));
    /// assert_eq!(cache.get(&"missing"), None);
    /// ```
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = self.map.get(key).copied()?;
        self.sketch.increment(key);
        self.nodes.value(id)
    }

    /// Inserts or updates a key-value pair, returning the previous value on
    /// update.
    ///
    /// - An existing key is overwritten in place: no region change, no
    ///   sketch update.
    /// - A new key enters the window front, is recorded in the sketch, and
    ///   may displace older entries through the admission tournament.
    ///
    /// # Example
    ///
    /// ```
    /// use tinylfu::policy::tiny_lfu::TinyLfuCore;
    ///
    /// let mut cache = TinyLfuCore::new(100);
    /// assert_eq!(cache.insert("key", "initial"), None);
    /// assert_eq!(cache.insert("key", "updated"), Some("initial"));
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(id) = self.map.get(&key).copied() {
            return self
                .nodes
                .value_mut(id)
                .map(|slot| std::mem::replace(slot, value));
        }

        let id = self.nodes.push_front(Region::Window, key.clone(), value);
        self.map.insert(key.clone(), id);
        self.sketch.increment(&key);
        self.maintain();

        #[cfg(debug_assertions)]
        self.validate_invariants();

        None
    }

    /// Restores the window to its cap and runs the admission tournament.
    fn maintain(&mut self) {
        // Drain window tails while over cap. The drained node with the
        // highest estimated frequency stays in play as the admission
        // candidate (first drained wins ties); the rest are evicted. A
        // drained node is only detached, so admitting it later is a retag,
        // not a reinsert.
        let mut candidate: Option<(NodeId, u8)> = None;
        while self.nodes.region_len(Region::Window) > self.window_cap {
            let Some(tail) = self.nodes.back_id(Region::Window) else {
                break;
            };
            let Some(frequency) = self.nodes.key(tail).map(|key| self.sketch.frequency(key))
            else {
                break;
            };
            self.nodes.detach(tail);
            candidate = match candidate.take() {
                None => Some((tail, frequency)),
                Some((best, best_frequency)) => {
                    if frequency > best_frequency {
                        self.evict(best);
                        Some((tail, frequency))
                    } else {
                        self.evict(tail);
                        Some((best, best_frequency))
                    }
                },
            };
        }
        let Some((candidate, candidate_frequency)) = candidate else {
            return;
        };

        if self.nodes.region_len(Region::Probation) < self.probation_cap {
            self.nodes.attach_front(candidate, Region::Probation);
            return;
        }

        // Tournament: the candidate challenges the oldest probation entry.
        // Lower estimated frequency is evicted; a tie is settled by a coin
        // flip.
        let Some(victim) = self.nodes.back_id(Region::Probation) else {
            self.nodes.attach_front(candidate, Region::Probation);
            return;
        };
        let Some(victim_frequency) = self.nodes.key(victim).map(|key| self.sketch.frequency(key))
        else {
            self.nodes.attach_front(candidate, Region::Probation);
            return;
        };

        let admit = match candidate_frequency.cmp(&victim_frequency) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.coin_flip(),
        };

        if admit {
            self.evict(victim);
            self.nodes.attach_front(candidate, Region::Probation);
        } else {
            self.evict(candidate);
        }
    }

    /// Drops a node and its map entry.
    fn evict(&mut self, id: NodeId) {
        if let Some((key, _)) = self.nodes.remove(id) {
            self.map.remove(&key);
        }
    }

    /// Xorshift64 step; returns the tie-break verdict for the tournament.
    fn coin_flip(&mut self) -> bool {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        (x & 1) == 0
    }

    fn region_of(&self, key: &K) -> Option<Region> {
        self.map.get(key).and_then(|id| self.nodes.region(*id))
    }

    /// Returns `true` if the key is resident.
    ///
    /// Does not touch the frequency sketch.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all entries.
    ///
    /// The sketch keeps its popularity history: recently hot keys still
    /// carry their estimates into the refilled cache.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.map.clear();

        #[cfg(debug_assertions)]
        self.validate_invariants();
    }

    /// Configured window region cap.
    #[inline]
    pub fn window_cap(&self) -> usize {
        self.window_cap
    }

    /// Configured probation region cap.
    #[inline]
    pub fn probation_cap(&self) -> usize {
        self.probation_cap
    }

    /// Configured protected region cap.
    #[inline]
    pub fn protected_cap(&self) -> usize {
        self.protected_cap
    }

    /// Current window occupancy.
    #[inline]
    pub fn window_len(&self) -> usize {
        self.nodes.region_len(Region::Window)
    }

    /// Current probation occupancy.
    #[inline]
    pub fn probation_len(&self) -> usize {
        self.nodes.region_len(Region::Probation)
    }

    /// Current protected occupancy.
    #[inline]
    pub fn protected_len(&self) -> usize {
        self.nodes.region_len(Region::Protected)
    }

    /// Effective maximum number of entries (sum of the region caps).
    #[inline]
    pub fn maximum_size(&self) -> usize {
        self.window_cap + self.probation_cap + self.protected_cap
    }

    /// Estimated popularity of `key`, in `0..=15`.
    #[inline]
    pub fn frequency(&self, key: &K) -> u8 {
        self.sketch.frequency(key)
    }

    /// Returns `true` if the key is resident in the window region.
    pub fn is_in_window(&self, key: &K) -> bool {
        self.region_of(key) == Some(Region::Window)
    }

    /// Returns `true` if the key is resident in the probation region.
    pub fn is_in_probation(&self, key: &K) -> bool {
        self.region_of(key) == Some(Region::Probation)
    }

    /// Returns `true` if the key is resident in the protected region.
    pub fn is_in_protected(&self, key: &K) -> bool {
        self.region_of(key) == Some(Region::Protected)
    }

    /// Read access to the admission sketch.
    pub fn sketch(&self) -> &FrequencySketch {
        &self.sketch
    }

    /// Validates the region/map bookkeeping.
    ///
    /// Checks that every mapped entry sits in exactly the region list its
    /// tag names, that occupancies match the map, and that no region
    /// exceeds its cap. Runs automatically after mutations in debug builds.
    #[cfg(any(test, debug_assertions))]
    pub fn validate_invariants(&self) {
        assert!(self.window_len() <= self.window_cap, "window over cap");
        assert!(
            self.probation_len() <= self.probation_cap,
            "probation over cap"
        );
        assert!(
            self.protected_len() <= self.protected_cap,
            "protected over cap"
        );
        assert_eq!(
            self.map.len(),
            self.nodes.len(),
            "map and region occupancies disagree"
        );
        assert!(self.map.len() <= self.maximum_size());

        for (key, id) in &self.map {
            let node_key = self
                .nodes
                .key(*id)
                .expect("mapped node missing from the arena");
            assert!(node_key == key, "map key and node key disagree");
        }

        self.nodes.debug_validate_invariants();
    }
}

impl<K, V> std::fmt::Debug for TinyLfuCore<K, V>
where
    K: SketchKey + Clone + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinyLfuCore")
            .field("maximum_size", &self.maximum_size())
            .field("len", &self.map.len())
            .field(
                "window",
                &format_args!("{}/{}", self.window_len(), self.window_cap),
            )
            .field(
                "probation",
                &format_args!("{}/{}", self.probation_len(), self.probation_cap),
            )
            .field(
                "protected",
                &format_args!("{}/{}", self.protected_len(), self.protected_cap),
            )
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K> for TinyLfuCore<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        TinyLfuCore::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        TinyLfuCore::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.maximum_size()
    }
}

/// Implementation of the [`CoreCache`] trait for W-TinyLFU.
///
/// # Example
///
/// ```
/// use tinylfu::policy::tiny_lfu::TinyLfuCore;
/// use tinylfu::traits::CoreCache;
///
/// let mut cache: TinyLfuCore<&str, i32> = TinyLfuCore::new(100);
/// cache.insert("key", 42);
/// assert_eq!(CoreCache::get(&mut cache, &"key"), Some(&42));
/// ```
impl<K, V> CoreCache<K, V> for TinyLfuCore<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        TinyLfuCore::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        TinyLfuCore::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        TinyLfuCore::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        TinyLfuCore::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.maximum_size()
    }

    fn clear(&mut self) {
        TinyLfuCore::clear(self);
    }
}

/// Thread-safe wrapper around [`TinyLfuCore`] using a `parking_lot::Mutex`.
///
/// The core's operations are short and allocation-light, so a single mutex
/// is the appropriate sharing primitive; value access goes through a
/// closure because a reference cannot outlive the lock.
///
/// # Example
///
/// ```
/// use tinylfu::policy::tiny_lfu::ConcurrentTinyLfu;
///
/// let cache = ConcurrentTinyLfu::new(100);
/// cache.insert(1u64, "one".to_string());
///
/// assert_eq!(cache.get_with(&1, |v| v.clone()), Some("one".to_string()));
/// assert!(cache.contains(&1));
/// ```
pub struct ConcurrentTinyLfu<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    inner: Mutex<TinyLfuCore<K, V>>,
}

impl<K, V> ConcurrentTinyLfu<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    /// Creates a lock-wrapped cache sized for roughly `maximum_size` entries.
    pub fn new(maximum_size: usize) -> Self {
        Self {
            inner: Mutex::new(TinyLfuCore::new(maximum_size)),
        }
    }

    /// Inserts or updates a key-value pair, returning the previous value on
    /// update.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut core = self.inner.lock();
        core.insert(key, value)
    }

    /// Runs `f` on the value for `key`, recording the access.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut core = self.inner.lock();
        core.get(key).map(f)
    }

    /// Returns `true` if the key is resident.
    pub fn contains(&self, key: &K) -> bool {
        let core = self.inner.lock();
        core.contains(key)
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        let core = self.inner.lock();
        core.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        let core = self.inner.lock();
        core.is_empty()
    }

    /// Effective maximum number of entries.
    pub fn maximum_size(&self) -> usize {
        let core = self.inner.lock();
        core.maximum_size()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        let mut core = self.inner.lock();
        core.clear();
    }
}
