//! Texture atlas addressing for block faces.
//!
//! The atlas is a 256 px square of 16 px tiles (16 per row). Tile 0 sits in
//! the top-left corner; rows count downward while UV `v` grows upward.

/// Width and height of the atlas texture in pixels.
pub const ATLAS_SIZE: u32 = 256;

/// Width and height of one tile in pixels.
pub const TILE_SIZE: u32 = 16;

/// Number of tiles in one atlas row.
pub const TILES_PER_ROW: u32 = ATLAS_SIZE / TILE_SIZE;

/// Highest addressable tile index.
pub const MAX_TILE: u16 = (TILES_PER_ROW * TILES_PER_ROW - 1) as u16;

/// UV rectangle of one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileUv {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl TileUv {
    /// Per-corner UVs in quad corner order: `(u0,v0) (u0,v1) (u1,v1) (u1,v0)`.
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.u0, self.v0],
            [self.u0, self.v1],
            [self.u1, self.v1],
            [self.u1, self.v0],
        ]
    }
}

/// Returns the UV rectangle for `tile` with a half-pixel inset to prevent bleeding.
///
/// Indices past the last tile are clamped to it.
pub fn tile_uvs_inset(tile: u16) -> TileUv {
    let tile = tile.min(MAX_TILE) as u32;
    let col = (tile % TILES_PER_ROW) as f32;
    let row = (tile / TILES_PER_ROW) as f32;
    let per_row = TILES_PER_ROW as f32;
    let half_pixel = 0.5 / ATLAS_SIZE as f32;

    TileUv {
        u0: col / per_row + half_pixel,
        u1: (col + 1.0) / per_row - half_pixel,
        v0: 1.0 - (row + 1.0) / per_row + half_pixel,
        v1: 1.0 - row / per_row - half_pixel,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
