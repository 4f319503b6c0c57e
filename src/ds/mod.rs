pub mod region_arena;

pub use region_arena::{NodeId, Region, RegionArena};
