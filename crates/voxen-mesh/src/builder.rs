//! Reference face-culling mesh builder.
//!
//! Walks every non-air voxel in flat-index order and, for each face in
//! [`FaceDirection::ALL`] order, probes the neighbor voxel directly: inside
//! the chunk from the block array, outside from the matching boundary plane.
//! A face is emitted unless that neighbor blocks light (solid and opaque).

use voxen_voxel::{
    AIR, BlockCatalog, CHUNK_VOLUME, MAX_LIGHT, block_of, in_chunk, index_to_local, local_index,
    sun_of,
};

use crate::atlas::tile_uvs_inset;
use crate::chunk_mesh::ChunkMesh;
use crate::face_direction::FaceDirection;
use crate::neighborhood::MeshNeighborhood;

/// Lowest brightness a lit face can receive, so unlit caves stay visible.
pub const MIN_BRIGHTNESS: f32 = 0.1;

/// Brightness of a packed light byte: `max(sun, block) / 15`, floored at
/// [`MIN_BRIGHTNESS`].
#[inline]
pub fn light_brightness(packed: u8) -> f32 {
    let level = sun_of(packed).max(block_of(packed));
    (level as f32 / MAX_LIGHT as f32).max(MIN_BRIGHTNESS)
}

/// Builds the mesh of one chunk, probing neighbors per face.
///
/// `light` is the chunk's packed light array; when `None` every face gets
/// full brightness. Faces whose light-facing neighbor lies in a chunk that
/// was captured without light also get full brightness.
pub fn build_mesh(
    blocks: &[u8; CHUNK_VOLUME],
    light: Option<&[u8; CHUNK_VOLUME]>,
    neighbors: &MeshNeighborhood,
    catalog: &BlockCatalog,
) -> ChunkMesh {
    let mut mesh = ChunkMesh::new();

    for (index, &block) in blocks.iter().enumerate() {
        if block == AIR {
            continue;
        }
        let (x, y, z) = index_to_local(index);
        let info = catalog.get(block);

        for dir in FaceDirection::ALL {
            let (nx, ny, nz) = dir.offset(x as i32, y as i32, z as i32);
            let (neighbor, neighbor_light) = if in_chunk(nx, ny, nz) {
                let ni = local_index(nx as usize, ny as usize, nz as usize);
                (blocks[ni], light.map(|l| l[ni]))
            } else {
                match neighbors.face(dir) {
                    Some(plane) => {
                        let (u, v) = dir.plane_coords(x, y, z);
                        (plane.block(u, v), plane.light(u, v))
                    }
                    None => (AIR, None),
                }
            };

            if catalog.blocks_light(neighbor) {
                continue;
            }

            let level = match light {
                Some(_) => neighbor_light.map_or(1.0, light_brightness),
                None => 1.0,
            };
            let uv = tile_uvs_inset(info.tile_for(dir.normal_ivec().y));
            mesh.push_face(dir, (x, y, z), uv, level * dir.shade(), block);
        }
    }

    tracing::trace!("scalar mesher emitted {} quads", mesh.quad_count());
    mesh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use voxen_voxel::{ChunkStore, blocks, pack_light};

    fn catalog() -> BlockCatalog {
        BlockCatalog::standard()
    }

    fn mesh_of(chunk: &ChunkStore, hood: &MeshNeighborhood) -> ChunkMesh {
        build_mesh(chunk.blocks(), None, hood, &catalog())
    }

    #[test]
    fn test_empty_chunk_gives_empty_mesh() {
        let chunk = ChunkStore::new();
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        assert!(mesh.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_single_block_has_six_faces() {
        let mut chunk = ChunkStore::new();
        chunk.set(8, 8, 8, blocks::STONE);
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for dir in FaceDirection::ALL {
            assert_eq!(mesh.count_quads_for_direction(dir), 1);
        }
    }

    #[test]
    fn test_adjacent_blocks_cull_shared_face() {
        let mut chunk = ChunkStore::new();
        chunk.set(8, 8, 8, blocks::STONE);
        chunk.set(9, 8, 8, blocks::STONE);
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        assert_eq!(mesh.quad_count(), 10);
        assert_eq!(mesh.vertices.len(), 40);
        assert_eq!(mesh.indices.len(), 60);
    }

    #[test]
    fn test_transparent_neighbor_keeps_faces() {
        let mut chunk = ChunkStore::new();
        chunk.set(8, 8, 8, blocks::STONE);
        chunk.set(9, 8, 8, blocks::GLASS);
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        // Stone keeps its +X face behind glass; glass loses its −X face to stone.
        assert_eq!(mesh.quad_count(), 11);
    }

    #[test]
    fn test_cross_chunk_culling() {
        let mut chunk = ChunkStore::new();
        chunk.set(15, 4, 4, blocks::STONE);

        let alone = mesh_of(&chunk, &MeshNeighborhood::new());
        assert_eq!(alone.quad_count(), 6);

        let mut neighbor = ChunkStore::new();
        neighbor.set(0, 4, 4, blocks::STONE);
        let mut hood = MeshNeighborhood::new();
        hood.set_face_neighbor(FaceDirection::PosX, neighbor.blocks(), None);
        let stitched = mesh_of(&chunk, &hood);
        assert_eq!(stitched.quad_count(), 5);
        assert_eq!(stitched.vertices.len(), 20);
        assert_eq!(stitched.count_quads_for_direction(FaceDirection::PosX), 0);
    }

    #[test]
    fn test_full_chunk_without_neighbors_draws_shell() {
        let chunk = ChunkStore::new_filled(blocks::STONE);
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        assert_eq!(mesh.quad_count(), 6 * 16 * 16);
    }

    #[test]
    fn test_uvs_in_unit_square() {
        let mut chunk = ChunkStore::new();
        for (i, id) in [1u8, 4, 6, 18, 21, 200].iter().enumerate() {
            chunk.set(i as i32 * 2, 3, 3, *id);
        }
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        assert!(!mesh.is_empty());
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_face_uses_direction_tile() {
        let mut chunk = ChunkStore::new();
        chunk.set(0, 0, 0, blocks::GRASS);
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        let top = mesh
            .quads
            .iter()
            .position(|q| q.direction == FaceDirection::PosY)
            .unwrap();
        let expected = tile_uvs_inset(1).corners();
        for (k, v) in mesh.vertices[top * 4..top * 4 + 4].iter().enumerate() {
            assert_eq!(v.uv, expected[k]);
        }
    }

    #[test]
    fn test_unlit_mesh_uses_shade_only() {
        let mut chunk = ChunkStore::new();
        chunk.set(5, 5, 5, blocks::STONE);
        let mesh = mesh_of(&chunk, &MeshNeighborhood::new());
        for (q, quad) in mesh.quads.iter().enumerate() {
            let c = mesh.vertices[q * 4].color;
            assert_eq!(c[0], quad.direction.shade());
            assert_eq!(c[3], 1.0);
        }
    }

    #[test]
    fn test_lit_face_samples_neighbor_voxel() {
        let mut chunk = ChunkStore::new();
        chunk.set(5, 5, 5, blocks::STONE);
        chunk.set_light(5, 6, 5, pack_light(15, 0));
        chunk.set_light(6, 5, 5, pack_light(3, 9));
        chunk.set_light(5, 5, 5, pack_light(15, 15));

        let mesh = build_mesh(
            chunk.blocks(),
            Some(chunk.light_data()),
            &MeshNeighborhood::new(),
            &catalog(),
        );
        let color_of = |dir: FaceDirection| {
            let q = mesh.quads.iter().position(|q| q.direction == dir).unwrap();
            mesh.vertices[q * 4].color[0]
        };
        assert_eq!(color_of(FaceDirection::PosY), 1.0);
        assert!((color_of(FaceDirection::PosX) - 0.8 * 9.0 / 15.0).abs() < 1e-6);
        // Dark neighbor is floored at the minimum.
        assert!((color_of(FaceDirection::NegY) - 0.6 * MIN_BRIGHTNESS).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_face_light_from_neighbor_plane() {
        let mut chunk = ChunkStore::new();
        chunk.set(15, 0, 0, blocks::STONE);

        let mut lit = ChunkStore::new();
        lit.set_light(0, 0, 0, pack_light(0, 6));
        let mut hood = MeshNeighborhood::new();
        hood.set_face_neighbor(FaceDirection::PosX, lit.blocks(), Some(lit.light_data()));

        let mesh = build_mesh(chunk.blocks(), Some(chunk.light_data()), &hood, &catalog());
        let q = mesh
            .quads
            .iter()
            .position(|q| q.direction == FaceDirection::PosX)
            .unwrap();
        assert!((mesh.vertices[q * 4].color[0] - 0.8 * 6.0 / 15.0).abs() < 1e-6);

        // Neighbor captured without light: full brightness.
        let mut unlit_hood = MeshNeighborhood::new();
        unlit_hood.set_face_neighbor(FaceDirection::PosX, lit.blocks(), None);
        let mesh = build_mesh(chunk.blocks(), Some(chunk.light_data()), &unlit_hood, &catalog());
        let q = mesh
            .quads
            .iter()
            .position(|q| q.direction == FaceDirection::PosX)
            .unwrap();
        assert_eq!(mesh.vertices[q * 4].color[0], 0.8);
    }

    #[test]
    fn test_light_brightness_floor() {
        assert_eq!(light_brightness(0), MIN_BRIGHTNESS);
        assert_eq!(light_brightness(pack_light(15, 0)), 1.0);
        assert_eq!(light_brightness(pack_light(2, 12)), 12.0 / 15.0);
    }
}
