//! The six cardinal directions a voxel face can point, with their fixed
//! quad geometry and shading.

use glam::IVec3;

/// One of the six cardinal directions a voxel face can point.
///
/// The `repr(u8)` discriminant doubles as the slot index in
/// [`MeshNeighborhood`](crate::MeshNeighborhood).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction.
    PosX = 0,
    /// −X direction.
    NegX = 1,
    /// +Y direction.
    PosY = 2,
    /// −Y direction.
    NegY = 3,
    /// +Z direction.
    PosZ = 4,
    /// −Z direction.
    NegZ = 5,
}

impl FaceDirection {
    /// All six directions in emission order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Returns the unit normal as `[f32; 3]` for this face direction.
    pub fn normal(self) -> [f32; 3] {
        let n = self.normal_ivec();
        [n.x as f32, n.y as f32, n.z as f32]
    }

    /// Returns the unit normal as an integer vector.
    pub fn normal_ivec(self) -> IVec3 {
        match self {
            Self::PosX => IVec3::X,
            Self::NegX => IVec3::NEG_X,
            Self::PosY => IVec3::Y,
            Self::NegY => IVec3::NEG_Y,
            Self::PosZ => IVec3::Z,
            Self::NegZ => IVec3::NEG_Z,
        }
    }

    /// Returns the neighbor coordinate offset for this direction.
    pub fn offset(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        let n = self.normal_ivec();
        (x + n.x, y + n.y, z + n.z)
    }

    /// Returns the opposite face direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Returns the direction index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Directional shading factor: top 1.0, bottom 0.6, sides 0.8.
    pub fn shade(self) -> f32 {
        match self {
            Self::PosY => 1.0,
            Self::NegY => 0.6,
            _ => 0.8,
        }
    }

    /// Corner offsets of the face quad inside a unit cube.
    ///
    /// Wound counter-clockwise when viewed from outside, so triangles
    /// `0,1,2` and `0,2,3` face along [`normal`](Self::normal).
    pub fn corners(self) -> [[f32; 3]; 4] {
        match self {
            Self::PosX => [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
            Self::NegX => [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
            Self::PosY => [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
            Self::NegY => [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            Self::PosZ => [[1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]],
            Self::NegZ => [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        }
    }

    /// Maps a voxel position onto the 2D plane perpendicular to this
    /// direction's axis, returning `(u, v)`.
    ///
    /// X faces use `(y, z)`, Y faces `(x, z)`, Z faces `(x, y)`.
    pub fn plane_coords(self, x: usize, y: usize, z: usize) -> (usize, usize) {
        match self {
            Self::PosX | Self::NegX => (y, z),
            Self::PosY | Self::NegY => (x, z),
            Self::PosZ | Self::NegZ => (x, y),
        }
    }

    /// Inverse of [`plane_coords`](Self::plane_coords) for the boundary layer
    /// of a chunk on this side (`x = 15` for `PosX`, `x = 0` for `NegX`, …).
    pub fn boundary_voxel(self, u: usize, v: usize, size: usize) -> (usize, usize, usize) {
        let far = size - 1;
        match self {
            Self::PosX => (far, u, v),
            Self::NegX => (0, u, v),
            Self::PosY => (u, far, v),
            Self::NegY => (u, 0, v),
            Self::PosZ => (u, v, far),
            Self::NegZ => (u, v, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
