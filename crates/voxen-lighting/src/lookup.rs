//! World access for cross-chunk light propagation.
//!
//! Light algorithms never own chunks. They reach them through
//! [`ChunkLookup`], which the chunk arena and the world both implement. An
//! absent chunk is "not loaded": propagation simply does not cross into it.

use glam::IVec3;
use rustc_hash::FxHashSet;
use voxen_voxel::{
    BlockId, CHUNK_SIZE_I32, ChunkCoord, ChunkManager, ChunkStore, world_to_chunk, world_to_local,
};

/// Chunk coordinates whose stored light changed during an operation.
pub type DirtySet = FxHashSet<ChunkCoord>;

/// Read/write access to loaded chunks by coordinate.
pub trait ChunkLookup {
    /// The chunk at `coord`, or `None` if it is not loaded.
    fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkStore>;

    /// Mutable access to the chunk at `coord`.
    fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkStore>;

    /// World voxel `y` range light may occupy, `min` inclusive, `max` exclusive.
    fn height_range(&self) -> (i32, i32) {
        (i32::MIN, i32::MAX)
    }
}

impl ChunkLookup for ChunkManager {
    fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkStore> {
        self.get(coord)
    }

    fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkStore> {
        self.get_mut(coord)
    }
}

/// A single chunk viewed as a world of one chunk at the origin.
///
/// Lets per-chunk initialization reuse the cross-chunk BFS while staying
/// confined to the chunk.
pub(crate) struct Isolated<'a>(pub &'a mut ChunkStore);

impl ChunkLookup for Isolated<'_> {
    fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkStore> {
        (coord == ChunkCoord::default()).then_some(&*self.0)
    }

    fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkStore> {
        if coord == ChunkCoord::default() {
            Some(&mut *self.0)
        } else {
            None
        }
    }

    fn height_range(&self) -> (i32, i32) {
        (0, CHUNK_SIZE_I32)
    }
}

/// Which light nibble an operation works on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Channel {
    Sun,
    Block,
}

impl Channel {
    pub(crate) fn get(self, chunk: &ChunkStore, x: i32, y: i32, z: i32) -> u8 {
        match self {
            Channel::Sun => chunk.sunlight(x, y, z),
            Channel::Block => chunk.block_light(x, y, z),
        }
    }

    pub(crate) fn set(self, chunk: &mut ChunkStore, x: i32, y: i32, z: i32, level: u8) {
        match self {
            Channel::Sun => chunk.set_sunlight(x, y, z, level),
            Channel::Block => chunk.set_block_light(x, y, z, level),
        }
    }
}

/// The six axis-aligned neighbour offsets.
pub(crate) const NEIGHBORS_6: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

fn local_i32(pos: IVec3) -> (i32, i32, i32) {
    let (x, y, z) = world_to_local(pos);
    (x as i32, y as i32, z as i32)
}

/// Returns `true` if `pos.y` lies inside the world's light range.
pub(crate) fn in_height<W: ChunkLookup + ?Sized>(world: &W, pos: IVec3) -> bool {
    let (min, max) = world.height_range();
    pos.y >= min && pos.y < max
}

/// Block id and channel level at `pos`, or `None` if unloaded or out of range.
pub(crate) fn probe<W: ChunkLookup + ?Sized>(
    world: &W,
    pos: IVec3,
    channel: Channel,
) -> Option<(BlockId, u8)> {
    if !in_height(world, pos) {
        return None;
    }
    let chunk = world.chunk(world_to_chunk(pos))?;
    let (x, y, z) = local_i32(pos);
    Some((chunk.get(x, y, z), channel.get(chunk, x, y, z)))
}

/// Writes a channel level at `pos`, recording the chunk in `dirty` when it changes.
pub(crate) fn write<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    channel: Channel,
    level: u8,
    dirty: &mut DirtySet,
) {
    let coord = world_to_chunk(pos);
    let Some(chunk) = world.chunk_mut(coord) else {
        return;
    };
    let (x, y, z) = local_i32(pos);
    if channel.get(chunk, x, y, z) != level {
        channel.set(chunk, x, y, z, level);
        dirty.insert(coord);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
