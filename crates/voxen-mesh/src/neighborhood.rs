//! Cross-chunk neighbor access for face culling and face lighting.
//!
//! [`MeshNeighborhood`] holds, for each of the six face directions, the
//! single layer of the adjacent chunk that touches the center chunk. It is
//! an owned snapshot, so it can be sent to worker threads without holding
//! any references into the world.

use voxen_voxel::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, ChunkManager, local_index};

use crate::face_direction::FaceDirection;

/// Voxels in one boundary plane.
pub const PLANE_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

// ---------------------------------------------------------------------------
// NeighborSource
// ---------------------------------------------------------------------------

/// Anything that can hand out a loaded chunk's block and light arrays.
///
/// Implemented by the chunk arena and the world so meshing stays testable
/// without a full world instance.
pub trait NeighborSource {
    /// Block array of the chunk at `coord`, or `None` if not loaded.
    fn chunk_blocks(&self, coord: ChunkCoord) -> Option<&[u8; CHUNK_VOLUME]>;
    /// Packed light array of the chunk at `coord`, or `None` if not loaded.
    fn chunk_light(&self, coord: ChunkCoord) -> Option<&[u8; CHUNK_VOLUME]>;
}

impl NeighborSource for ChunkManager {
    fn chunk_blocks(&self, coord: ChunkCoord) -> Option<&[u8; CHUNK_VOLUME]> {
        self.get(coord).map(|c| c.blocks())
    }

    fn chunk_light(&self, coord: ChunkCoord) -> Option<&[u8; CHUNK_VOLUME]> {
        self.get(coord).map(|c| c.light_data())
    }
}

// ---------------------------------------------------------------------------
// BoundaryPlane
// ---------------------------------------------------------------------------

/// One `16 × 16` layer of a chunk, indexed `u + 16 * v`.
///
/// See [`FaceDirection::plane_coords`] for the `(u, v)` axes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryPlane {
    blocks: [u8; PLANE_AREA],
    light: Option<[u8; PLANE_AREA]>,
}

impl BoundaryPlane {
    /// Copies the layer of a chunk on side `side` (e.g. `PosX` is `x = 15`).
    pub fn extract(
        blocks: &[u8; CHUNK_VOLUME],
        light: Option<&[u8; CHUNK_VOLUME]>,
        side: FaceDirection,
    ) -> Self {
        let mut plane_blocks = [0u8; PLANE_AREA];
        let mut plane_light = light.map(|_| [0u8; PLANE_AREA]);

        for v in 0..CHUNK_SIZE {
            for u in 0..CHUNK_SIZE {
                let (x, y, z) = side.boundary_voxel(u, v, CHUNK_SIZE);
                let src = local_index(x, y, z);
                let dst = u + CHUNK_SIZE * v;
                plane_blocks[dst] = blocks[src];
                if let (Some(out), Some(light)) = (plane_light.as_mut(), light) {
                    out[dst] = light[src];
                }
            }
        }

        Self {
            blocks: plane_blocks,
            light: plane_light,
        }
    }

    /// Block id at `(u, v)`.
    pub fn block(&self, u: usize, v: usize) -> u8 {
        self.blocks[u + CHUNK_SIZE * v]
    }

    /// Packed light at `(u, v)`, or `None` if the plane carries no light.
    pub fn light(&self, u: usize, v: usize) -> Option<u8> {
        self.light.as_ref().map(|l| l[u + CHUNK_SIZE * v])
    }

    /// Returns `true` if light was captured with the blocks.
    pub fn has_light(&self) -> bool {
        self.light.is_some()
    }
}

// ---------------------------------------------------------------------------
// MeshNeighborhood
// ---------------------------------------------------------------------------

/// Boundary planes of the six face neighbors, each possibly absent.
///
/// An absent neighbor is meshed as air: faces toward it are always drawn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshNeighborhood {
    planes: [Option<BoundaryPlane>; 6],
}

impl MeshNeighborhood {
    /// Creates a neighborhood with every neighbor absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the neighbor lying in direction `dir` from the center chunk.
    ///
    /// Only the neighbor's layer facing the center (its `dir.opposite()`
    /// side) is kept.
    pub fn set_face_neighbor(
        &mut self,
        dir: FaceDirection,
        blocks: &[u8; CHUNK_VOLUME],
        light: Option<&[u8; CHUNK_VOLUME]>,
    ) {
        self.planes[dir.index()] = Some(BoundaryPlane::extract(blocks, light, dir.opposite()));
    }

    /// Removes the neighbor in direction `dir`.
    pub fn clear_face_neighbor(&mut self, dir: FaceDirection) {
        self.planes[dir.index()] = None;
    }

    /// The plane of the neighbor in direction `dir`, if present.
    pub fn face(&self, dir: FaceDirection) -> Option<&BoundaryPlane> {
        self.planes[dir.index()].as_ref()
    }

    /// Number of neighbors present.
    pub fn neighbor_count(&self) -> usize {
        self.planes.iter().filter(|p| p.is_some()).count()
    }

    /// Snapshots the six neighbors of `center` from `source`.
    pub fn gather<S: NeighborSource + ?Sized>(source: &S, center: ChunkCoord, with_light: bool) -> Self {
        let mut hood = Self::new();
        for dir in FaceDirection::ALL {
            let coord = center.neighbor(dir.normal_ivec());
            if let Some(blocks) = source.chunk_blocks(coord) {
                let light = if with_light { source.chunk_light(coord) } else { None };
                hood.set_face_neighbor(dir, blocks, light);
            }
        }
        hood
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
