//! Chunk mesh data structure holding the vertices and indices produced by
//! the mesh builders.

use crate::atlas::TileUv;
use crate::face_direction::FaceDirection;

/// A single vertex in a chunk mesh.
///
/// `repr(C)` and [`bytemuck::Pod`] so the vertex buffer can be uploaded with
/// `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Position in chunk-local coordinates (0..=16).
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Atlas texture coordinates.
    pub uv: [f32; 2],
    /// Light × directional shade, RGBA.
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(MeshVertex, [u8; 48]);

/// Metadata for a single emitted quad, used for analysis and debugging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadInfo {
    /// Which face direction this quad belongs to.
    pub direction: FaceDirection,
    /// Block id the face belongs to.
    pub block: u8,
}

/// The mesh output of a chunk meshing pass.
///
/// An empty mesh is a valid "nothing to draw" result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Index buffer (two triangles per quad).
    pub indices: Vec<u32>,
    /// One entry per emitted quad.
    pub quads: Vec<QuadInfo>,
}

impl ChunkMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh with room for `quads` faces.
    pub fn with_quad_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
            quads: Vec::with_capacity(quads),
        }
    }

    /// Appends one unit face of the voxel at `(x, y, z)`.
    ///
    /// `brightness` is the final vertex intensity (light already multiplied
    /// by the direction's shade).
    pub fn push_face(
        &mut self,
        direction: FaceDirection,
        (x, y, z): (usize, usize, usize),
        uv: TileUv,
        brightness: f32,
        block: u8,
    ) {
        let base = self.vertices.len() as u32;
        let normal = direction.normal();
        let color = [brightness, brightness, brightness, 1.0];
        let origin = [x as f32, y as f32, z as f32];

        for (corner, uv) in direction.corners().iter().zip(uv.corners()) {
            self.vertices.push(MeshVertex {
                position: [
                    origin[0] + corner[0],
                    origin[1] + corner[1],
                    origin[2] + corner[2],
                ],
                normal,
                uv,
                color,
            });
        }

        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.quads.push(QuadInfo { direction, block });
    }

    /// Counts the number of quads emitted for a specific face direction.
    pub fn count_quads_for_direction(&self, direction: FaceDirection) -> usize {
        self.quads
            .iter()
            .filter(|q| q.direction == direction)
            .count()
    }

    /// Returns the total number of quads in the mesh.
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Returns `true` if the mesh has no faces.
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Iterates over vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
