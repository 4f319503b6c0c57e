pub mod tiny_lfu;

pub use tiny_lfu::{ConcurrentTinyLfu, TinyLfuCore};
