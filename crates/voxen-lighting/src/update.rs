//! Light repair after a single block edit.

use glam::IVec3;
use voxen_voxel::{BlockCatalog, BlockId};

use crate::block_light::propagate_block_light_from;
use crate::lookup::{ChunkLookup, DirtySet};
use crate::removal::{
    recalculate_block_light, recalculate_sunlight, remove_block_light, remove_sunlight,
};

/// Repairs both light channels after the block at `pos` changed from `old`
/// to `new`. The world must already hold `new`.
///
/// Steps, in order:
/// 1. an emissive `old` retracts its block light;
/// 2. a light-blocking `new` retracts sunlight and block light at `pos`;
/// 3. a light-blocking `old` reopens sunlight and block light into `pos`;
/// 4. an emissive `new` spreads its block light.
///
/// Returns every chunk whose stored light changed in any step.
pub fn on_block_changed<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    old: BlockId,
    new: BlockId,
    catalog: &BlockCatalog,
) -> DirtySet {
    let old_info = catalog.get(old);
    let new_info = catalog.get(new);
    let mut dirty = DirtySet::default();

    if old_info.is_emissive() {
        dirty.extend(remove_block_light(world, pos, catalog));
    }
    if new_info.blocks_light() {
        dirty.extend(remove_sunlight(world, pos, catalog));
        dirty.extend(remove_block_light(world, pos, catalog));
    }
    if old_info.blocks_light() {
        dirty.extend(recalculate_sunlight(world, pos, catalog));
        dirty.extend(recalculate_block_light(world, pos, catalog));
    }
    if new_info.is_emissive() {
        dirty.extend(propagate_block_light_from(world, pos, catalog));
    }

    tracing::trace!(
        "block {} -> {} at {:?}: {} chunks relit",
        old,
        new,
        pos,
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
    use crate::{SkyMask, init_block_light, init_sunlight, init_sunlight_with_sky};
    use voxen_voxel::{AIR, ChunkCoord, ChunkManager, ChunkStore, blocks, world_to_chunk, world_to_local};

    struct Scene {
        mgr: ChunkManager,
        catalog: BlockCatalog,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                mgr: ChunkManager::new(),
                catalog: BlockCatalog::standard(),
            }
        }

        fn add(&mut self, coord: ChunkCoord, chunk: ChunkStore) {
            self.mgr.insert(coord, chunk);
        }

        fn edit(&mut self, pos: IVec3, new: BlockId) -> DirtySet {
            let (x, y, z) = world_to_local(pos);
            let chunk = self
                .mgr
                .get_mut(world_to_chunk(pos))
                .expect("edit inside loaded chunk");
            let old = chunk.get(x as i32, y as i32, z as i32);
            chunk.set(x as i32, y as i32, z as i32, new);
            on_block_changed(&mut self.mgr, pos, old, new, &self.catalog)
        }

        fn chunk(&self, coord: ChunkCoord) -> &ChunkStore {
            self.mgr.get(coord).expect("loaded")
        }
    }

    fn lit_chunk(catalog: &BlockCatalog) -> ChunkStore {
        let mut chunk = ChunkStore::new();
        init_sunlight(&mut chunk, catalog);
        init_block_light(&mut chunk, catalog);
        chunk
    }

    /// Recomputes a single-chunk scene from scratch for comparison.
    fn fresh(chunk: &ChunkStore, catalog: &BlockCatalog) -> ChunkStore {
        let mut copy = chunk.clone();
        init_sunlight(&mut copy, catalog);
        init_block_light(&mut copy, catalog);
        copy
    }

    #[test]
    fn test_place_and_remove_torch() {
        let mut scene = Scene::new();
        let origin = ChunkCoord::new(0, 0, 0);
        scene.add(origin, lit_chunk(&scene.catalog));
        let pos = IVec3::new(6, 6, 6);

        let dirty = scene.edit(pos, blocks::TORCH);
        assert!(dirty.contains(&origin));
        assert_eq!(scene.chunk(origin).block_light(6, 6, 6), 14);
        assert_eq!(scene.chunk(origin).block_light(6, 6, 9), 11);
        assert_eq!(scene.chunk(origin).sunlight(6, 6, 6), 15);

        scene.edit(pos, AIR);
        assert!(scene.chunk(origin).light_data().iter().all(|&l| l & 0x0F == 0));
        assert_eq!(scene.chunk(origin).sunlight(6, 6, 6), 15);
    }

    #[test]
    fn test_place_then_remove_stone_matches_fresh() {
        let mut scene = Scene::new();
        let origin = ChunkCoord::new(0, 0, 0);
        let mut chunk = ChunkStore::new();
        chunk.set(3, 3, 3, blocks::TORCH);
        scene.add(origin, fresh(&chunk, &scene.catalog));

        scene.edit(IVec3::new(3, 9, 3), blocks::STONE);
        scene.edit(IVec3::new(4, 3, 3), blocks::STONE);
        let expected = fresh(scene.chunk(origin), &scene.catalog);
        assert_eq!(scene.chunk(origin).light_data(), expected.light_data());
        assert_eq!(scene.chunk(origin).sunlight(3, 9, 3), 0);
        assert_eq!(scene.chunk(origin).block_light(4, 3, 3), 0);

        scene.edit(IVec3::new(3, 9, 3), AIR);
        scene.edit(IVec3::new(4, 3, 3), AIR);
        let expected = fresh(scene.chunk(origin), &scene.catalog);
        assert_eq!(scene.chunk(origin).light_data(), expected.light_data());
        assert_eq!(scene.chunk(origin).sunlight(3, 0, 3), 15);
    }

    #[test]
    fn test_replacing_torch_with_stone() {
        let mut scene = Scene::new();
        let origin = ChunkCoord::new(0, 0, 0);
        let mut chunk = ChunkStore::new();
        chunk.set(8, 8, 8, blocks::TORCH);
        scene.add(origin, fresh(&chunk, &scene.catalog));

        scene.edit(IVec3::new(8, 8, 8), blocks::STONE);
        let after = scene.chunk(origin);
        assert_eq!(after.light(8, 8, 8), 0);
        assert_eq!(after.block_light(9, 8, 8), 0);
        assert_eq!(after.sunlight(8, 7, 8), 14);
    }

    #[test]
    fn test_glass_is_not_a_light_edit() {
        let mut scene = Scene::new();
        let origin = ChunkCoord::new(0, 0, 0);
        scene.add(origin, lit_chunk(&scene.catalog));
        let dirty = scene.edit(IVec3::new(2, 2, 2), blocks::GLASS);
        assert!(dirty.is_empty());
        assert_eq!(scene.chunk(origin).sunlight(2, 2, 2), 15);
    }

    #[test]
    fn test_roof_shades_chunk_below() {
        let mut scene = Scene::new();
        let upper = ChunkCoord::new(0, 1, 0);
        let lower = ChunkCoord::new(0, 0, 0);
        let top = lit_chunk(&scene.catalog);
        let mut bottom = ChunkStore::new();
        init_sunlight_with_sky(&mut bottom, &scene.catalog, &SkyMask::from_chunk_above(&top));
        scene.add(upper, top);
        scene.add(lower, bottom);

        let dirty = scene.edit(IVec3::new(5, 20, 5), blocks::STONE);
        assert!(dirty.contains(&upper));
        assert!(dirty.contains(&lower));
        assert_eq!(scene.chunk(upper).sunlight(5, 3, 5), 14);
        assert_eq!(scene.chunk(lower).sunlight(5, 0, 5), 14);
        assert_eq!(scene.chunk(lower).sunlight(6, 0, 5), 15);

        let dirty = scene.edit(IVec3::new(5, 20, 5), AIR);
        assert!(dirty.contains(&lower));
        assert_eq!(scene.chunk(lower).sunlight(5, 0, 5), 15);
    }

    #[test]
    fn test_torch_light_crosses_into_neighbor_and_back_out() {
        let mut scene = Scene::new();
        let west = ChunkCoord::new(-1, 0, 0);
        let east = ChunkCoord::new(0, 0, 0);
        scene.add(west, lit_chunk(&scene.catalog));
        scene.add(east, lit_chunk(&scene.catalog));

        let dirty = scene.edit(IVec3::new(1, 4, 4), blocks::TORCH);
        assert_eq!(dirty.len(), 2);
        assert_eq!(scene.chunk(west).block_light(15, 4, 4), 12);

        let dirty = scene.edit(IVec3::new(1, 4, 4), AIR);
        assert_eq!(dirty.len(), 2);
        assert_eq!(scene.chunk(west).block_light(15, 4, 4), 0);
    }
}
