//! Mesh cache invalidation: tracks which chunk version each mesh was built
//! from and which chunks need remeshing after a block edit.

use voxen_voxel::{CHUNK_SIZE, ChunkCoord};

use crate::FaceDirection;

/// Metadata for a chunk's mesh cache state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMeshState {
    /// Chunk version the current mesh was generated from, `None` if never meshed.
    pub meshed_version: Option<u64>,
    /// Whether a remesh task is already in flight for this chunk.
    pub remesh_pending: bool,
    /// Set when something outside the chunk's own blocks (light, a
    /// neighbor's boundary) changed the mesh.
    pub forced: bool,
}

impl ChunkMeshState {
    /// Creates a state with no mesh generated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the mesh does not reflect `current_version`.
    pub fn is_stale(&self, current_version: u64) -> bool {
        self.forced || self.meshed_version != Some(current_version)
    }

    /// Returns `true` if this chunk needs a remesh task submitted.
    pub fn needs_remesh(&self, current_version: u64) -> bool {
        self.is_stale(current_version) && !self.remesh_pending
    }

    /// Returns `true` if a finished mesh built from `data_version` may be
    /// applied to a chunk now at `current_version`.
    ///
    /// A chunk marked `forced` after the snapshot was taken rejects it too.
    pub fn accepts_result(&self, data_version: u64, current_version: u64) -> bool {
        !self.forced && data_version == current_version
    }

    /// Records a freshly applied mesh built from `version`.
    pub fn mark_meshed(&mut self, version: u64) {
        self.meshed_version = Some(version);
        self.remesh_pending = false;
        self.forced = false;
    }
}

/// Determines which chunks need remeshing after a block edit.
pub struct MeshInvalidator;

impl MeshInvalidator {
    /// Returns the chunks whose meshes depend on the voxel at `local` in `edited`.
    ///
    /// The edited chunk itself is always first. A face neighbor is included
    /// when the edit lies on the shared boundary, because the neighbor culls
    /// its faces against this voxel.
    pub fn invalidate(edited: ChunkCoord, local: (usize, usize, usize)) -> Vec<ChunkCoord> {
        let (x, y, z) = local;
        let last = CHUNK_SIZE - 1;
        let mut dirty = vec![edited];

        for dir in FaceDirection::ALL {
            let on_boundary = match dir {
                FaceDirection::PosX => x == last,
                FaceDirection::NegX => x == 0,
                FaceDirection::PosY => y == last,
                FaceDirection::NegY => y == 0,
                FaceDirection::PosZ => z == last,
                FaceDirection::NegZ => z == 0,
            };
            if on_boundary {
                dirty.push(edited.neighbor(dir.normal_ivec()));
            }
        }

        dirty
    }
}
