//! Fixed-size chunk storage: one block byte and one packed light byte per voxel.
//!
//! [`ChunkStore`] keeps two flat 4096-byte arrays indexed with
//! [`local_index`]. The light byte packs sunlight in the high nibble and
//! block light in the low nibble. Out-of-bounds reads return air / zero
//! and out-of-bounds writes are ignored.

use crate::catalog::{AIR, BlockId, MAX_LIGHT};
use crate::coords::{CHUNK_VOLUME, in_chunk, local_index};

/// Packs sunlight and block light into one byte (sunlight high nibble).
#[inline]
pub fn pack_light(sun: u8, block: u8) -> u8 {
    (sun.min(MAX_LIGHT) << 4) | block.min(MAX_LIGHT)
}

/// Sunlight nibble of a packed light byte.
#[inline]
pub fn sun_of(packed: u8) -> u8 {
    packed >> 4
}

/// Block-light nibble of a packed light byte.
#[inline]
pub fn block_of(packed: u8) -> u8 {
    packed & 0x0F
}

/// Block ids and light for one 16³ chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkStore {
    blocks: Box<[u8; CHUNK_VOLUME]>,
    light: Box<[u8; CHUNK_VOLUME]>,
    /// Set by block mutations, cleared after persistence.
    dirty: bool,
    /// Incremented on every block mutation.
    version: u64,
}

impl ChunkStore {
    /// Creates an all-air, unlit chunk.
    pub fn new() -> Self {
        Self {
            blocks: Box::new([AIR; CHUNK_VOLUME]),
            light: Box::new([0; CHUNK_VOLUME]),
            dirty: false,
            version: 0,
        }
    }

    /// Creates a chunk filled with one block type. The result is not dirty.
    pub fn new_filled(block: BlockId) -> Self {
        let mut chunk = Self::new();
        chunk.blocks.fill(block);
        chunk
    }

    /// Returns the block at `(x, y, z)`, or air if out of bounds.
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockId {
        match Self::index(x, y, z) {
            Some(i) => self.blocks[i],
            None => AIR,
        }
    }

    /// Sets the block at `(x, y, z)` and marks the chunk dirty.
    ///
    /// Out-of-bounds writes are ignored with a warning.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockId) {
        let Some(i) = Self::index(x, y, z) else {
            tracing::warn!("ChunkStore::set out of bounds: ({}, {}, {})", x, y, z);
            return;
        };
        self.blocks[i] = block;
        self.dirty = true;
        self.version += 1;
    }

    /// Overwrites every block with `block` and marks the chunk dirty.
    pub fn fill(&mut self, block: BlockId) {
        self.blocks.fill(block);
        self.dirty = true;
        self.version += 1;
    }

    /// Packed light byte at `(x, y, z)`, 0 if out of bounds.
    pub fn light(&self, x: i32, y: i32, z: i32) -> u8 {
        Self::index(x, y, z).map_or(0, |i| self.light[i])
    }

    /// Sunlight level at `(x, y, z)`.
    pub fn sunlight(&self, x: i32, y: i32, z: i32) -> u8 {
        sun_of(self.light(x, y, z))
    }

    /// Block-light level at `(x, y, z)`.
    pub fn block_light(&self, x: i32, y: i32, z: i32) -> u8 {
        block_of(self.light(x, y, z))
    }

    /// Writes the raw packed light byte.
    pub fn set_light(&mut self, x: i32, y: i32, z: i32, packed: u8) {
        if let Some(i) = Self::index(x, y, z) {
            self.light[i] = packed;
        }
    }

    /// Sets the sunlight nibble, preserving block light. Level is clamped to 15.
    pub fn set_sunlight(&mut self, x: i32, y: i32, z: i32, level: u8) {
        if let Some(i) = Self::index(x, y, z) {
            self.light[i] = pack_light(level, block_of(self.light[i]));
        }
    }

    /// Sets the block-light nibble, preserving sunlight. Level is clamped to 15.
    pub fn set_block_light(&mut self, x: i32, y: i32, z: i32, level: u8) {
        if let Some(i) = Self::index(x, y, z) {
            self.light[i] = pack_light(sun_of(self.light[i]), level);
        }
    }

    /// Zeroes the sunlight nibble of every voxel.
    pub fn clear_sunlight(&mut self) {
        for l in self.light.iter_mut() {
            *l &= 0x0F;
        }
    }

    /// Zeroes the block-light nibble of every voxel.
    pub fn clear_block_light(&mut self) {
        for l in self.light.iter_mut() {
            *l &= 0xF0;
        }
    }

    /// Returns `true` if every block is air.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == AIR)
    }

    /// Flat view of the block array.
    pub fn blocks(&self) -> &[u8; CHUNK_VOLUME] {
        &self.blocks
    }

    /// Flat view of the packed light array.
    pub fn light_data(&self) -> &[u8; CHUNK_VOLUME] {
        &self.light
    }

    /// Copies the block array into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != 4096`.
    pub fn export_raw(&self, out: &mut [u8]) {
        assert!(
            out.len() == CHUNK_VOLUME,
            "export buffer must be {CHUNK_VOLUME} bytes, got {}",
            out.len()
        );
        out.copy_from_slice(&self.blocks[..]);
    }

    /// Replaces the block array with `data` and clears the dirty flag.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != 4096`.
    pub fn import_raw(&mut self, data: &[u8]) {
        assert!(
            data.len() == CHUNK_VOLUME,
            "import buffer must be {CHUNK_VOLUME} bytes, got {}",
            data.len()
        );
        self.blocks.copy_from_slice(data);
        self.dirty = false;
        self.version += 1;
    }

    /// Returns `true` if a block changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, typically after the chunk was saved.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Mutation counter used to detect stale mesh results.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Resets to an all-air unlit chunk, keeping the allocations.
    pub fn reset(&mut self) {
        self.blocks.fill(AIR);
        self.light.fill(0);
        self.dirty = false;
        self.version = 0;
    }

    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        in_chunk(x, y, z).then(|| local_index(x as usize, y as usize, z as usize))
    }
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
