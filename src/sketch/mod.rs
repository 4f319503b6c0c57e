pub mod frequency_sketch;
pub mod key_hash;

pub use frequency_sketch::{FrequencySketch, ONE_MASK, RESET_MASK};
pub use key_hash::SketchKey;
