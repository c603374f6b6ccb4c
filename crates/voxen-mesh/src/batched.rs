//! Batched mesh builder.
//!
//! Copies the chunk and its six boundary planes into a padded 18³ volume
//! once, so the emission loop never branches on chunk boundaries. A first
//! pass counts visible faces and the second writes into buffers reserved to
//! exactly that size. Output is identical to [`build_mesh`](crate::build_mesh).

use voxen_voxel::{AIR, BlockCatalog, CHUNK_SIZE, CHUNK_VOLUME, index_to_local};

use crate::atlas::tile_uvs_inset;
use crate::builder::light_brightness;
use crate::chunk_mesh::ChunkMesh;
use crate::face_direction::FaceDirection;
use crate::neighborhood::MeshNeighborhood;

/// Edge length of the padded volume (one voxel border on every side).
const PADDED: usize = CHUNK_SIZE + 2;
const PADDED_VOLUME: usize = PADDED * PADDED * PADDED;

/// Padded-index stride per face direction, in [`FaceDirection::ALL`] order.
const STRIDES: [isize; 6] = [
    1,
    -1,
    PADDED as isize,
    -(PADDED as isize),
    (PADDED * PADDED) as isize,
    -((PADDED * PADDED) as isize),
];

#[inline]
fn padded_index(x: usize, y: usize, z: usize) -> usize {
    (x + 1) + PADDED * ((y + 1) + PADDED * (z + 1))
}

/// Occlusion and brightness for every voxel of the chunk plus its border.
struct PaddedVolume {
    /// `true` where the voxel is solid and opaque.
    occludes: Vec<bool>,
    /// Light-derived brightness (1.0 where no light is known).
    brightness: Vec<f32>,
}

impl PaddedVolume {
    fn build(
        blocks: &[u8; CHUNK_VOLUME],
        light: Option<&[u8; CHUNK_VOLUME]>,
        neighbors: &MeshNeighborhood,
        catalog: &BlockCatalog,
    ) -> Self {
        let mut occludes = vec![false; PADDED_VOLUME];
        let mut brightness = vec![1.0f32; PADDED_VOLUME];

        for (index, &block) in blocks.iter().enumerate() {
            let (x, y, z) = index_to_local(index);
            let p = padded_index(x, y, z);
            occludes[p] = catalog.blocks_light(block);
            if let Some(light) = light {
                brightness[p] = light_brightness(light[index]);
            }
        }

        for dir in FaceDirection::ALL {
            let Some(plane) = neighbors.face(dir) else {
                continue;
            };
            let n = dir.normal_ivec();
            for v in 0..CHUNK_SIZE {
                for u in 0..CHUNK_SIZE {
                    // Boundary voxel of this chunk on side `dir`, then step
                    // one cell outward into the border.
                    let (x, y, z) = dir.boundary_voxel(u, v, CHUNK_SIZE);
                    let p = (padded_index(x, y, z) as isize
                        + n.x as isize
                        + n.y as isize * PADDED as isize
                        + n.z as isize * (PADDED * PADDED) as isize)
                        as usize;
                    occludes[p] = catalog.blocks_light(plane.block(u, v));
                    if light.is_some()
                        && let Some(packed) = plane.light(u, v)
                    {
                        brightness[p] = light_brightness(packed);
                    }
                }
            }
        }

        Self {
            occludes,
            brightness,
        }
    }

    #[inline]
    fn visible(&self, p: usize, dir: usize) -> bool {
        !self.occludes[(p as isize + STRIDES[dir]) as usize]
    }
}

/// Builds the mesh of one chunk using the padded-volume strategy.
///
/// Same inputs and output as [`build_mesh`](crate::build_mesh).
pub fn build_mesh_batched(
    blocks: &[u8; CHUNK_VOLUME],
    light: Option<&[u8; CHUNK_VOLUME]>,
    neighbors: &MeshNeighborhood,
    catalog: &BlockCatalog,
) -> ChunkMesh {
    let volume = PaddedVolume::build(blocks, light, neighbors, catalog);

    let face_count: usize = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| **b != AIR)
        .map(|(i, _)| {
            let (x, y, z) = index_to_local(i);
            let p = padded_index(x, y, z);
            (0..6).filter(|&d| volume.visible(p, d)).count()
        })
        .sum();

    let mut mesh = ChunkMesh::with_quad_capacity(face_count);
    if face_count == 0 {
        return mesh;
    }

    for (index, &block) in blocks.iter().enumerate() {
        if block == AIR {
            continue;
        }
        let (x, y, z) = index_to_local(index);
        let p = padded_index(x, y, z);
        let info = catalog.get(block);

        for dir in FaceDirection::ALL {
            let d = dir.index();
            if !volume.visible(p, d) {
                continue;
            }
            let level = volume.brightness[(p as isize + STRIDES[d]) as usize];
            let uv = tile_uvs_inset(info.tile_for(dir.normal_ivec().y));
            mesh.push_face(dir, (x, y, z), uv, level * dir.shade(), block);
        }
    }

    tracing::trace!(
        "batched mesher emitted {} quads ({} neighbors)",
        face_count,
        neighbors.neighbor_count()
    );
    mesh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_mesh;
    use voxen_voxel::{ChunkStore, blocks, pack_light};

    /// Deterministic xorshift so the scenes are reproducible.
    struct Rng(u32);

    impl Rng {
        fn next(&mut self) -> u32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            self.0
        }
    }

    fn random_chunk(rng: &mut Rng) -> ChunkStore {
        let palette = [
            blocks::STONE,
            blocks::GLASS,
            blocks::LEAVES,
            blocks::TORCH,
            blocks::GRASS,
            blocks::WATER,
            250,
        ];
        let mut chunk = ChunkStore::new();
        for i in 0..CHUNK_VOLUME {
            let (x, y, z) = index_to_local(i);
            let r = rng.next();
            let block = if r % 3 == 0 {
                palette[(r as usize / 3) % palette.len()]
            } else {
                AIR
            };
            chunk.set(x as i32, y as i32, z as i32, block);
            chunk.set_light(x as i32, y as i32, z as i32, (rng.next() & 0xFF) as u8);
        }
        chunk
    }

    fn assert_equivalent(a: &ChunkMesh, b: &ChunkMesh) {
        assert_eq!(a.vertices.len(), b.vertices.len());
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.quads, b.quads);
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            for k in 0..3 {
                assert!((va.position[k] - vb.position[k]).abs() < 1e-3);
            }
            for k in 0..2 {
                assert!((va.uv[k] - vb.uv[k]).abs() < 1e-3);
            }
            assert_eq!(va.color, vb.color);
        }
    }

    #[test]
    fn test_empty_chunk() {
        let chunk = ChunkStore::new();
        let catalog = BlockCatalog::standard();
        let mesh = build_mesh_batched(chunk.blocks(), None, &MeshNeighborhood::new(), &catalog);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_single_block_matches_scalar() {
        let mut chunk = ChunkStore::new();
        chunk.set(0, 15, 7, blocks::GRASS);
        let catalog = BlockCatalog::standard();
        let hood = MeshNeighborhood::new();
        let scalar = build_mesh(chunk.blocks(), None, &hood, &catalog);
        let batched = build_mesh_batched(chunk.blocks(), None, &hood, &catalog);
        assert_eq!(batched.quad_count(), 6);
        assert_eq!(scalar, batched);
    }

    #[test]
    fn test_random_scenes_match_scalar() {
        let catalog = BlockCatalog::standard();
        let mut rng = Rng(0x9E37_79B9);

        for scene in 0..6 {
            let chunk = random_chunk(&mut rng);
            let mut hood = MeshNeighborhood::new();
            for dir in FaceDirection::ALL {
                // Mix present-with-light, present-without-light and absent.
                match (scene + dir.index()) % 3 {
                    0 => {
                        let n = random_chunk(&mut rng);
                        hood.set_face_neighbor(dir, n.blocks(), Some(n.light_data()));
                    }
                    1 => {
                        let n = random_chunk(&mut rng);
                        hood.set_face_neighbor(dir, n.blocks(), None);
                    }
                    _ => {}
                }
            }

            for light in [None, Some(chunk.light_data())] {
                let scalar = build_mesh(chunk.blocks(), light, &hood, &catalog);
                let batched = build_mesh_batched(chunk.blocks(), light, &hood, &catalog);
                assert!(!scalar.is_empty());
                assert_equivalent(&scalar, &batched);
            }
        }
    }

    #[test]
    fn test_cross_chunk_culling_matches_scalar() {
        let catalog = BlockCatalog::standard();
        let mut chunk = ChunkStore::new();
        chunk.set(15, 4, 4, blocks::STONE);
        let mut neighbor = ChunkStore::new();
        neighbor.set(0, 4, 4, blocks::STONE);
        neighbor.set_light(0, 5, 4, pack_light(15, 0));
        let mut hood = MeshNeighborhood::new();
        hood.set_face_neighbor(FaceDirection::PosX, neighbor.blocks(), Some(neighbor.light_data()));

        let batched = build_mesh_batched(chunk.blocks(), Some(chunk.light_data()), &hood, &catalog);
        assert_eq!(batched.quad_count(), 5);
        let scalar = build_mesh(chunk.blocks(), Some(chunk.light_data()), &hood, &catalog);
        assert_eq!(scalar, batched);
    }

    #[test]
    fn test_solid_chunk_draws_only_shell() {
        let chunk = ChunkStore::new_filled(blocks::STONE);
        let catalog = BlockCatalog::standard();
        let mesh = build_mesh_batched(chunk.blocks(), None, &MeshNeighborhood::new(), &catalog);
        assert_eq!(mesh.quad_count(), 6 * 256);
        for dir in FaceDirection::ALL {
            assert_eq!(mesh.count_quads_for_direction(dir), 256);
        }
    }
}
