pub use crate::builder::{Cache, CacheBuilder};
pub use crate::ds::{NodeId, Region, RegionArena};
pub use crate::error::ConfigError;
pub use crate::policy::tiny_lfu::{ConcurrentTinyLfu, TinyLfuCore};
pub use crate::sketch::{FrequencySketch, SketchKey};
pub use crate::traits::{CoreCache, ReadOnlyCache};
