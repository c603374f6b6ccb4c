//! Emissive block light. Decays by one level per step in every direction.

use glam::IVec3;
use voxen_voxel::{BlockCatalog, CHUNK_SIZE_I32, ChunkCoord, ChunkStore};

use crate::lookup::{Channel, ChunkLookup, DirtySet, Isolated, probe, write};
use crate::propagate::{LightQueue, spread};
use crate::seed::seed_boundaries;

/// Computes block light for a single chunk from the emitters it contains.
///
/// Each emitter's own cell is set to its emission even when the block is
/// opaque. Touches only `chunk`.
pub fn init_block_light(chunk: &mut ChunkStore, catalog: &BlockCatalog) {
    chunk.clear_block_light();

    let mut queue = LightQueue::new();
    for z in 0..CHUNK_SIZE_I32 {
        for y in 0..CHUNK_SIZE_I32 {
            for x in 0..CHUNK_SIZE_I32 {
                let emission = catalog.emission(chunk.get(x, y, z));
                if emission > 0 {
                    chunk.set_block_light(x, y, z, emission);
                    queue.push_back((IVec3::new(x, y, z), emission));
                }
            }
        }
    }
    if queue.is_empty() {
        return;
    }
    let sources = queue.len();

    let mut dirty = DirtySet::default();
    spread(
        &mut Isolated(chunk),
        Channel::Block,
        &mut queue,
        catalog,
        &mut dirty,
    );
    tracing::trace!("block light init: {} sources", sources);
}

/// Spreads block light outward from the emitter at `pos`, crossing chunk
/// boundaries through `world`.
///
/// The source cell is raised to the block's emission when that is brighter
/// than what it already holds. Non-emissive blocks and unloaded positions
/// return an empty set.
pub fn propagate_block_light_from<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    catalog: &BlockCatalog,
) -> DirtySet {
    let mut dirty = DirtySet::default();
    let Some((block, current)) = probe(world, pos, Channel::Block) else {
        return dirty;
    };
    let emission = catalog.emission(block);
    if emission == 0 {
        return dirty;
    }
    if emission > current {
        write(world, pos, Channel::Block, emission, &mut dirty);
    }

    let mut queue = LightQueue::from([(pos, emission.max(current))]);
    spread(world, Channel::Block, &mut queue, catalog, &mut dirty);
    tracing::trace!(
        "block light from {:?}: level {}, {} chunks changed",
        pos,
        emission,
        dirty.len()
    );
    dirty
}

/// Spreads block light across the faces of the chunk at `coord` in both
/// directions, for stitching a freshly loaded chunk to its neighbors.
pub fn propagate_block_light_from_boundaries<W: ChunkLookup + ?Sized>(
    world: &mut W,
    coord: ChunkCoord,
    catalog: &BlockCatalog,
) -> DirtySet {
    let mut dirty = DirtySet::default();
    let mut queue = seed_boundaries(world, coord, Channel::Block);
    if queue.is_empty() {
        return dirty;
    }
    spread(world, Channel::Block, &mut queue, catalog, &mut dirty);
    tracing::debug!(
        "block light stitch at {}: {} chunks changed",
        coord,
        dirty.len()
    );
    dirty
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use voxen_voxel::{BlockInfo, ChunkManager, ToolType, blocks};

    fn catalog() -> BlockCatalog {
        BlockCatalog::standard()
    }

    const LAMP: u8 = blocks::TORCH;

    #[test]
    fn test_manhattan_decay() {
        let catalog = catalog();
        let mut chunk = ChunkStore::new();
        chunk.set(8, 8, 8, LAMP);
        init_block_light(&mut chunk, &catalog);

        assert_eq!(chunk.block_light(8, 8, 8), 14);
        assert_eq!(chunk.block_light(9, 8, 8), 13);
        assert_eq!(chunk.block_light(8, 7, 8), 13);
        assert_eq!(chunk.block_light(8, 8, 10), 12);
        assert_eq!(chunk.block_light(9, 9, 8), 12);
        assert_eq!(chunk.block_light(8, 0, 8), 6);
        assert_eq!(chunk.sunlight(8, 8, 8), 0);
    }

    #[test]
    fn test_obstruction_forces_detour() {
        let catalog = catalog();
        let mut chunk = ChunkStore::new();
        chunk.set(8, 8, 8, LAMP);
        // A 3x3 wall one step east of the lamp.
        for y in 7..=9 {
            for z in 7..=9 {
                chunk.set(9, y, z, blocks::STONE);
            }
        }
        init_block_light(&mut chunk, &catalog);

        assert_eq!(chunk.block_light(9, 8, 8), 0);
        // Direct distance 2 would give 12; the detour is 6 steps.
        assert_eq!(chunk.block_light(10, 8, 8), 8);
        assert!(chunk.block_light(10, 8, 8) < 12);
    }

    #[test]
    fn test_opaque_emitter_cell_is_lit() {
        let mut catalog = BlockCatalog::standard();
        catalog.register(
            200,
            BlockInfo {
                emission: 12,
                ..BlockInfo::solid("glowstone", 40, 0.3, ToolType::None)
            },
        );
        let mut chunk = ChunkStore::new();
        chunk.set(1, 1, 1, 200);
        init_block_light(&mut chunk, &catalog);
        assert_eq!(chunk.block_light(1, 1, 1), 12);
        assert_eq!(chunk.block_light(2, 1, 1), 11);
    }

    #[test]
    fn test_init_clears_stale_block_light() {
        let catalog = catalog();
        let mut chunk = ChunkStore::new();
        chunk.set_light(4, 4, 4, 200);
        init_block_light(&mut chunk, &catalog);
        assert_eq!(chunk.block_light(4, 4, 4), 0);
        assert_eq!(chunk.sunlight(4, 4, 4), 12);
    }

    #[test]
    fn test_cross_chunk_source() {
        let catalog = catalog();
        let mut mgr = ChunkManager::new();
        mgr.insert(ChunkCoord::new(0, 0, 0), ChunkStore::new());
        mgr.insert(ChunkCoord::new(-1, 0, 0), ChunkStore::new());
        mgr.get_mut(ChunkCoord::new(0, 0, 0))
            .expect("loaded")
            .set(0, 4, 4, LAMP);

        let dirty = propagate_block_light_from(&mut mgr, IVec3::new(0, 4, 4), &catalog);
        assert_eq!(dirty.len(), 2);

        let west = mgr.get(ChunkCoord::new(-1, 0, 0)).expect("loaded");
        assert_eq!(west.block_light(15, 4, 4), 13);
        assert_eq!(west.block_light(12, 4, 4), 10);
    }

    #[test]
    fn test_unloaded_neighbor_stops_spread() {
        let catalog = catalog();
        let mut mgr = ChunkManager::new();
        mgr.insert(ChunkCoord::new(0, 0, 0), ChunkStore::new());
        mgr.get_mut(ChunkCoord::new(0, 0, 0))
            .expect("loaded")
            .set(15, 4, 4, LAMP);

        let dirty = propagate_block_light_from(&mut mgr, IVec3::new(15, 4, 4), &catalog);
        assert_eq!(dirty.len(), 1);
        assert!(!mgr.contains(ChunkCoord::new(1, 0, 0)));
    }

    #[test]
    fn test_non_emitter_is_noop() {
        let catalog = catalog();
        let mut mgr = ChunkManager::new();
        mgr.insert(ChunkCoord::new(0, 0, 0), ChunkStore::new());
        let dirty = propagate_block_light_from(&mut mgr, IVec3::new(3, 3, 3), &catalog);
        assert!(dirty.is_empty());
        let dirty = propagate_block_light_from(&mut mgr, IVec3::new(99, 3, 3), &catalog);
        assert!(dirty.is_empty());
    }

    #[test]
    fn test_boundary_stitch_carries_torch_into_new_chunk() {
        let catalog = catalog();
        let mut mgr = ChunkManager::new();
        let mut a = ChunkStore::new();
        a.set(14, 2, 2, LAMP);
        init_block_light(&mut a, &catalog);
        mgr.insert(ChunkCoord::new(0, 0, 0), a);
        mgr.insert(ChunkCoord::new(1, 0, 0), ChunkStore::new());

        let dirty =
            propagate_block_light_from_boundaries(&mut mgr, ChunkCoord::new(1, 0, 0), &catalog);
        assert!(dirty.contains(&ChunkCoord::new(1, 0, 0)));
        let b = mgr.get(ChunkCoord::new(1, 0, 0)).expect("loaded");
        assert_eq!(b.block_light(0, 2, 2), 12);
        assert_eq!(b.block_light(1, 2, 2), 11);
    }
}
