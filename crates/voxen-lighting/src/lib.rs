//! Voxel light: per-chunk sunlight and block-light initialization, cross-chunk
//! flood fill, and incremental repair after block edits.
//!
//! Per-chunk initialization touches a single [`ChunkStore`](voxen_voxel::ChunkStore)
//! and may run anywhere. Everything else goes through a [`ChunkLookup`] and
//! needs exclusive access to the world.

mod block_light;
mod lookup;
mod propagate;
mod removal;
mod seed;
mod sunlight;
mod update;

pub use block_light::{
    init_block_light, propagate_block_light_from, propagate_block_light_from_boundaries,
};
pub use lookup::{ChunkLookup, DirtySet};
pub use removal::{
    recalculate_block_light, recalculate_sunlight, remove_block_light, remove_sunlight,
};
pub use sunlight::{SkyMask, init_sunlight, init_sunlight_with_sky, propagate_sunlight_from_boundaries};
pub use update::on_block_changed;
