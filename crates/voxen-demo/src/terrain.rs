//! Rolling hills from fBm simplex noise.

use noise::{NoiseFn, Simplex};
use voxen_voxel::{AIR, BlockId, CHUNK_SIZE_I32, ChunkCoord, ChunkStore, blocks};
use voxen_world::ChunkGenerator;

/// Heightmap terrain: bedrock floor, stone, a dirt band and grass on top,
/// with the odd tree trunk.
pub struct HillsGenerator {
    noise: Simplex,
    /// World `y` the heightmap oscillates around.
    sea_level: f64,
    amplitude: f64,
    base_frequency: f64,
    octaves: u32,
    /// Lowest world `y`, filled with bedrock.
    floor_y: i32,
}

impl HillsGenerator {
    /// Hills around `sea_level` above a bedrock floor at `floor_y`.
    pub fn new(seed: u64, floor_y: i32, sea_level: i32) -> Self {
        Self {
            noise: Simplex::new(seed as u32),
            sea_level: f64::from(sea_level),
            amplitude: 10.0,
            base_frequency: 0.02,
            octaves: 4,
            floor_y,
        }
    }

    /// Terrain height (first air block) of the column at world `(x, z)`.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let mut total = 0.0;
        let mut frequency = self.base_frequency;
        let mut amplitude = self.amplitude;
        for _ in 0..self.octaves {
            total += self.noise.get([f64::from(x) * frequency, f64::from(z) * frequency]) * amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        (self.sea_level + total).round() as i32
    }

    fn block_at(&self, y: i32, height: i32) -> BlockId {
        if y == self.floor_y {
            blocks::BEDROCK
        } else if y < self.floor_y || y >= height {
            AIR
        } else if y == height - 1 {
            blocks::GRASS
        } else if y >= height - 4 {
            blocks::DIRT
        } else {
            blocks::STONE
        }
    }

    fn has_tree(&self, x: i32, z: i32) -> bool {
        // Sparse, deterministic placement from a high-frequency sample.
        self.noise.get([f64::from(x) * 0.9 + 100.0, f64::from(z) * 0.9 - 100.0]) > 0.82
    }
}

impl ChunkGenerator for HillsGenerator {
    fn generate(&self, coord: ChunkCoord, chunk: &mut ChunkStore) {
        let origin = coord.origin();
        for z in 0..CHUNK_SIZE_I32 {
            for x in 0..CHUNK_SIZE_I32 {
                let (wx, wz) = (origin.x + x, origin.z + z);
                let height = self.height_at(wx, wz);
                let tree = self.has_tree(wx, wz);
                for y in 0..CHUNK_SIZE_I32 {
                    let wy = origin.y + y;
                    let mut block = self.block_at(wy, height);
                    if tree && (height..height + 4).contains(&wy) {
                        block = blocks::WOOD;
                    } else if tree && (height + 4..height + 6).contains(&wy) {
                        block = blocks::LEAVES;
                    }
                    if block != AIR {
                        chunk.set(x, y, z, block);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_heightmap() {
        let hills = HillsGenerator::new(7, 0, 12);
        let mut chunk = ChunkStore::new();
        hills.generate(ChunkCoord::new(0, 0, 0), &mut chunk);

        for z in 0..16 {
            for x in 0..16 {
                if hills.has_tree(x, z) {
                    continue;
                }
                let height = hills.height_at(x, z);
                for y in 0..16 {
                    assert_eq!(chunk.get(x, y, z), hills.block_at(y, height), "({x}, {y}, {z})");
                }
            }
        }
    }

    #[test]
    fn test_deterministic_per_seed() {
        let a = HillsGenerator::new(42, 0, 24);
        let b = HillsGenerator::new(42, 0, 24);
        for (x, z) in [(0, 0), (17, -40), (-300, 5)] {
            assert_eq!(a.height_at(x, z), b.height_at(x, z));
        }
    }

    #[test]
    fn test_bedrock_floor() {
        let hills = HillsGenerator::new(1, 0, 24);
        let mut chunk = ChunkStore::new();
        hills.generate(ChunkCoord::new(2, 0, -1), &mut chunk);
        assert_eq!(chunk.get(0, 0, 0), blocks::BEDROCK);
        assert_eq!(chunk.get(15, 0, 15), blocks::BEDROCK);
    }
}
