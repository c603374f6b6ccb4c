//! Queue seeding for chunk-boundary stitching.

use glam::IVec3;
use voxen_voxel::{CHUNK_SIZE_I32, ChunkCoord};

use crate::lookup::{Channel, ChunkLookup, NEIGHBORS_6, probe};
use crate::propagate::LightQueue;

/// Local position of cell `(a, b)` on the chunk face pointing along `dir`.
fn face_cell(dir: IVec3, a: i32, b: i32) -> IVec3 {
    let edge = |d: i32| if d > 0 { CHUNK_SIZE_I32 - 1 } else { 0 };
    if dir.x != 0 {
        IVec3::new(edge(dir.x), a, b)
    } else if dir.y != 0 {
        IVec3::new(a, edge(dir.y), b)
    } else {
        IVec3::new(a, b, edge(dir.z))
    }
}

fn on_boundary(local: IVec3) -> bool {
    let last = CHUNK_SIZE_I32 - 1;
    local.x == 0
        || local.y == 0
        || local.z == 0
        || local.x == last
        || local.y == last
        || local.z == last
}

/// Collects every lit cell that can push light across the faces of `coord`:
/// the chunk's own boundary shell plus the touching layer of each loaded
/// neighbor.
pub(crate) fn seed_boundaries<W: ChunkLookup + ?Sized>(
    world: &W,
    coord: ChunkCoord,
    channel: Channel,
) -> LightQueue {
    let mut queue = LightQueue::new();
    let origin = coord.origin();

    for z in 0..CHUNK_SIZE_I32 {
        for y in 0..CHUNK_SIZE_I32 {
            for x in 0..CHUNK_SIZE_I32 {
                let local = IVec3::new(x, y, z);
                if !on_boundary(local) {
                    continue;
                }
                let pos = origin + local;
                if let Some((_, level)) = probe(world, pos, channel)
                    && level > 0
                {
                    queue.push_back((pos, level));
                }
            }
        }
    }

    for dir in NEIGHBORS_6 {
        if world.chunk(coord.neighbor(dir)).is_none() {
            continue;
        }
        for b in 0..CHUNK_SIZE_I32 {
            for a in 0..CHUNK_SIZE_I32 {
                let outside = origin + face_cell(dir, a, b) + dir;
                if let Some((_, level)) = probe(world, outside, channel)
                    && level > 0
                {
                    queue.push_back((outside, level));
                }
            }
        }
    }

    queue
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxen_voxel::{ChunkManager, ChunkStore};

    #[test]
    fn test_face_cells_lie_on_the_named_face() {
        assert_eq!(face_cell(IVec3::X, 3, 4), IVec3::new(15, 3, 4));
        assert_eq!(face_cell(IVec3::NEG_Y, 3, 4), IVec3::new(3, 0, 4));
        assert_eq!(face_cell(IVec3::Z, 3, 4), IVec3::new(3, 4, 15));
    }

    #[test]
    fn test_seeds_only_lit_shell_cells() {
        let mut mgr = ChunkManager::new();
        let mut chunk = ChunkStore::new();
        chunk.set_block_light(0, 5, 5, 4);
        chunk.set_block_light(7, 7, 7, 9);
        mgr.insert(ChunkCoord::new(2, 0, 0), chunk);

        let queue = seed_boundaries(&mgr, ChunkCoord::new(2, 0, 0), Channel::Block);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0], (IVec3::new(32, 5, 5), 4));
    }

    #[test]
    fn test_seeds_touching_layer_of_neighbor() {
        let mut mgr = ChunkManager::new();
        mgr.insert(ChunkCoord::new(0, 0, 0), ChunkStore::new());
        let mut above = ChunkStore::new();
        above.set_sunlight(2, 0, 2, 15);
        above.set_sunlight(2, 1, 2, 15);
        mgr.insert(ChunkCoord::new(0, 1, 0), above);

        let queue = seed_boundaries(&mgr, ChunkCoord::new(0, 0, 0), Channel::Sun);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0], (IVec3::new(2, 16, 2), 15));
    }
}
