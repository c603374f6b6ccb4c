//! Terrain generation hooks.

use voxen_voxel::{AIR, BlockId, CHUNK_SIZE_I32, ChunkCoord, ChunkStore, blocks};

/// Fills a freshly created chunk with terrain.
///
/// Implementations receive an all-air chunk and should only write blocks;
/// light is computed by the world afterwards.
pub trait ChunkGenerator: Send {
    /// Generates the blocks of the chunk at `coord` into `chunk`.
    fn generate(&self, coord: ChunkCoord, chunk: &mut ChunkStore);
}

/// Implements [`ChunkGenerator`] for any closure `Fn(ChunkCoord, &mut ChunkStore)`.
impl<F> ChunkGenerator for F
where
    F: Fn(ChunkCoord, &mut ChunkStore) + Send,
{
    fn generate(&self, coord: ChunkCoord, chunk: &mut ChunkStore) {
        self(coord, chunk)
    }
}

/// Leaves every chunk empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyGenerator;

impl ChunkGenerator for EmptyGenerator {
    fn generate(&self, _coord: ChunkCoord, _chunk: &mut ChunkStore) {}
}

/// Horizontal layers stacked upward from `base_y`; air above the last layer
/// and below `base_y`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatGenerator {
    base_y: i32,
    layers: Vec<(BlockId, u32)>,
}

impl FlatGenerator {
    /// A generator with no layers whose first layer starts at world `y = base_y`.
    pub fn new(base_y: i32) -> Self {
        Self {
            base_y,
            layers: Vec::new(),
        }
    }

    /// Adds a layer of `block`, `thickness` voxels thick, on top of the stack.
    pub fn with_layer(mut self, block: BlockId, thickness: u32) -> Self {
        self.layers.push((block, thickness));
        self
    }

    /// Block at world height `y`.
    pub fn block_at(&self, y: i32) -> BlockId {
        if y < self.base_y {
            return AIR;
        }
        let mut top = i64::from(self.base_y);
        for &(block, thickness) in &self.layers {
            top += i64::from(thickness);
            if i64::from(y) < top {
                return block;
            }
        }
        AIR
    }

    /// First world `y` above the stack.
    pub fn surface_y(&self) -> i32 {
        let height: i64 = self.layers.iter().map(|&(_, t)| i64::from(t)).sum();
        (i64::from(self.base_y) + height).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl Default for FlatGenerator {
    /// Bedrock, stone, dirt and a grass top; the surface sits at `y = 8`.
    fn default() -> Self {
        Self::new(0)
            .with_layer(blocks::BEDROCK, 1)
            .with_layer(blocks::STONE, 3)
            .with_layer(blocks::DIRT, 3)
            .with_layer(blocks::GRASS, 1)
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, coord: ChunkCoord, chunk: &mut ChunkStore) {
        let base = coord.y * CHUNK_SIZE_I32;
        for y in 0..CHUNK_SIZE_I32 {
            let block = self.block_at(base + y);
            if block == AIR {
                continue;
            }
            for z in 0..CHUNK_SIZE_I32 {
                for x in 0..CHUNK_SIZE_I32 {
                    chunk.set(x, y, z, block);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layers() {
        let flat = FlatGenerator::default();
        assert_eq!(flat.block_at(-1), AIR);
        assert_eq!(flat.block_at(0), blocks::BEDROCK);
        assert_eq!(flat.block_at(3), blocks::STONE);
        assert_eq!(flat.block_at(4), blocks::DIRT);
        assert_eq!(flat.block_at(7), blocks::GRASS);
        assert_eq!(flat.block_at(8), AIR);
        assert_eq!(flat.surface_y(), 8);
    }

    #[test]
    fn test_generate_spans_chunks() {
        let flat = FlatGenerator::new(10).with_layer(blocks::STONE, 10);
        let mut lower = ChunkStore::new();
        flat.generate(ChunkCoord::new(0, 0, 0), &mut lower);
        let mut upper = ChunkStore::new();
        flat.generate(ChunkCoord::new(3, 1, -2), &mut upper);

        assert_eq!(lower.get(5, 9, 5), AIR);
        assert_eq!(lower.get(5, 10, 5), blocks::STONE);
        assert_eq!(lower.get(0, 15, 15), blocks::STONE);
        assert_eq!(upper.get(5, 3, 5), blocks::STONE);
        assert_eq!(upper.get(5, 4, 5), AIR);
    }

    #[test]
    fn test_empty_generator() {
        let mut chunk = ChunkStore::new();
        EmptyGenerator.generate(ChunkCoord::new(0, 0, 0), &mut chunk);
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_closure_generator() {
        let pillar = |coord: ChunkCoord, chunk: &mut ChunkStore| {
            if coord.y == 0 {
                for y in 0..16 {
                    chunk.set(0, y, 0, blocks::WOOD);
                }
            }
        };
        let mut chunk = ChunkStore::new();
        pillar.generate(ChunkCoord::new(0, 0, 0), &mut chunk);
        assert_eq!(chunk.get(0, 15, 0), blocks::WOOD);
    }
}
