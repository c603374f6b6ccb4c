//! World ↔ chunk coordinate math.
//!
//! World positions are [`IVec3`] voxel coordinates. A [`ChunkCoord`] is the
//! floored division of a world position by [`CHUNK_SIZE`] and the local
//! position is the (always non-negative) floored remainder.

use glam::IVec3;

/// Edge length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 16;

/// Number of voxels in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// [`CHUNK_SIZE`] as `i32` for signed arithmetic.
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// Integer chunk coordinate in chunk units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World position of the chunk's `(0, 0, 0)` voxel.
    pub fn origin(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE_I32
    }

    /// Returns the coordinate shifted by `(dx, dy, dz)` chunks.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Returns the adjacent chunk across the face with the given unit normal.
    pub fn neighbor(self, normal: IVec3) -> Self {
        self.offset(normal.x, normal.y, normal.z)
    }

    /// Converts a chunk-local position back to a world position.
    pub fn to_world(self, x: usize, y: usize, z: usize) -> IVec3 {
        self.origin() + IVec3::new(x as i32, y as i32, z as i32)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The chunk containing world position `pos`.
pub fn world_to_chunk(pos: IVec3) -> ChunkCoord {
    ChunkCoord::new(
        pos.x.div_euclid(CHUNK_SIZE_I32),
        pos.y.div_euclid(CHUNK_SIZE_I32),
        pos.z.div_euclid(CHUNK_SIZE_I32),
    )
}

/// Position of `pos` inside its chunk, each component in `0..16`.
pub fn world_to_local(pos: IVec3) -> (usize, usize, usize) {
    (
        pos.x.rem_euclid(CHUNK_SIZE_I32) as usize,
        pos.y.rem_euclid(CHUNK_SIZE_I32) as usize,
        pos.z.rem_euclid(CHUNK_SIZE_I32) as usize,
    )
}

/// Flat array index of a local position: `x + 16 * (y + 16 * z)`.
#[inline]
pub fn local_index(x: usize, y: usize, z: usize) -> usize {
    x + CHUNK_SIZE * (y + CHUNK_SIZE * z)
}

/// Inverse of [`local_index`].
#[inline]
pub fn index_to_local(index: usize) -> (usize, usize, usize) {
    (
        index % CHUNK_SIZE,
        (index / CHUNK_SIZE) % CHUNK_SIZE,
        index / (CHUNK_SIZE * CHUNK_SIZE),
    )
}

/// Returns `true` if a signed local position lies inside a chunk.
#[inline]
pub fn in_chunk(x: i32, y: i32, z: i32) -> bool {
    (0..CHUNK_SIZE_I32).contains(&x)
        && (0..CHUNK_SIZE_I32).contains(&y)
        && (0..CHUNK_SIZE_I32).contains(&z)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
