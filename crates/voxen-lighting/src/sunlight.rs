//! Sunlight: column fill from the sky followed by a flood fill.
//!
//! A full-strength cell passes 15 straight down without decay, which keeps
//! open shafts at full brightness all the way to the ground. Every other
//! step loses one level.

use glam::IVec3;
use voxen_voxel::{BlockCatalog, CHUNK_SIZE, CHUNK_SIZE_I32, ChunkCoord, ChunkStore, MAX_LIGHT};

use crate::lookup::{Channel, ChunkLookup, DirtySet, Isolated};
use crate::propagate::{LightQueue, spread};
use crate::seed::seed_boundaries;

/// Per-column sky exposure of a chunk's top face, indexed `x + 16 * z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkyMask([bool; CHUNK_SIZE * CHUNK_SIZE]);

impl SkyMask {
    /// Every column open to the sky.
    pub fn open() -> Self {
        Self([true; CHUNK_SIZE * CHUNK_SIZE])
    }

    /// Every column covered.
    pub fn closed() -> Self {
        Self([false; CHUNK_SIZE * CHUNK_SIZE])
    }

    /// Derives the mask from the chunk directly above: a column is open
    /// when full sunlight reaches that chunk's bottom layer.
    pub fn from_chunk_above(above: &ChunkStore) -> Self {
        let mut mask = Self::closed();
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                mask.0[x + CHUNK_SIZE * z] = above.sunlight(x as i32, 0, z as i32) == MAX_LIGHT;
            }
        }
        mask
    }

    /// Whether column `(x, z)` sees the sky.
    pub fn is_open(&self, x: usize, z: usize) -> bool {
        x < CHUNK_SIZE && z < CHUNK_SIZE && self.0[x + CHUNK_SIZE * z]
    }

    /// Sets the exposure of column `(x, z)`. Out-of-range columns are ignored.
    pub fn set(&mut self, x: usize, z: usize, open: bool) {
        if x < CHUNK_SIZE && z < CHUNK_SIZE {
            self.0[x + CHUNK_SIZE * z] = open;
        }
    }

    /// Number of open columns.
    pub fn open_count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

impl Default for SkyMask {
    fn default() -> Self {
        Self::open()
    }
}

/// Computes sunlight for a single chunk as if it were directly under open sky.
///
/// Touches only `chunk`, so it may run on any thread.
pub fn init_sunlight(chunk: &mut ChunkStore, catalog: &BlockCatalog) {
    init_sunlight_with_sky(chunk, catalog, &SkyMask::open());
}

/// Computes sunlight for a single chunk, filling only the columns `sky` marks open.
pub fn init_sunlight_with_sky(chunk: &mut ChunkStore, catalog: &BlockCatalog, sky: &SkyMask) {
    chunk.clear_sunlight();

    let mut queue = LightQueue::new();
    for z in 0..CHUNK_SIZE_I32 {
        for x in 0..CHUNK_SIZE_I32 {
            if !sky.is_open(x as usize, z as usize) {
                continue;
            }
            for y in (0..CHUNK_SIZE_I32).rev() {
                if catalog.blocks_light(chunk.get(x, y, z)) {
                    break;
                }
                chunk.set_sunlight(x, y, z, MAX_LIGHT);
                queue.push_back((IVec3::new(x, y, z), MAX_LIGHT));
            }
        }
    }
    let seeded = queue.len();

    let mut dirty = DirtySet::default();
    let spread_count = spread(
        &mut Isolated(chunk),
        Channel::Sun,
        &mut queue,
        catalog,
        &mut dirty,
    );
    tracing::trace!(
        "sunlight init: {} column cells, {} spread, {} open columns",
        seeded,
        spread_count,
        sky.open_count()
    );
}

/// Spreads sunlight across the faces of the chunk at `coord` into its loaded
/// neighbors and back.
///
/// Seeds from every lit cell on the chunk's boundary and from the lit cells
/// of loaded neighbors that touch it.
pub fn propagate_sunlight_from_boundaries<W: ChunkLookup + ?Sized>(
    world: &mut W,
    coord: ChunkCoord,
    catalog: &BlockCatalog,
) -> DirtySet {
    let mut dirty = DirtySet::default();
    let mut queue = seed_boundaries(world, coord, Channel::Sun);
    let written = spread(world, Channel::Sun, &mut queue, catalog, &mut dirty);
    tracing::debug!(
        "sunlight stitch at {}: {} cells, {} chunks changed",
        coord,
        written,
        dirty.len()
    );
    dirty
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
