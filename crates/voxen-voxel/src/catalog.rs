//! Block catalog: maps a block-type byte to its static [`BlockInfo`].
//!
//! The catalog is a dense 256-entry table so lookups are a single index and
//! every byte resolves to *something*. Unregistered ids behave exactly like
//! air, which keeps stale or forward-compatible block ids from breaking
//! meshing or lighting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Block-type identifier stored in every voxel cell.
pub type BlockId = u8;

/// The air block. Zeroed chunk memory is all air.
pub const AIR: BlockId = 0;

/// Maximum light level for either light channel.
pub const MAX_LIGHT: u8 = 15;

/// Tool that breaks a block fastest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    /// Any tool (or bare hands) works equally well.
    #[default]
    None,
    /// Stone, ores, bricks.
    Pickaxe,
    /// Wood and planks.
    Axe,
    /// Dirt, sand, gravel, snow.
    Shovel,
    /// Wool and leaves.
    Shears,
}

/// Static description of one block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockInfo {
    /// Human-readable name (e.g. "stone").
    pub name: String,
    /// Whether the block occupies its cell for collision and culling.
    pub is_solid: bool,
    /// Whether light and sight pass through the block.
    pub is_transparent: bool,
    /// Atlas tile used for the +Y face.
    pub top_tile: u16,
    /// Atlas tile used for the four side faces.
    pub side_tile: u16,
    /// Atlas tile used for the −Y face.
    pub bottom_tile: u16,
    /// Emitted block-light level (0 = none, 15 = max).
    pub emission: u8,
    /// Break time scale: `-1.0` unbreakable, `0.0` instant.
    pub hardness: f32,
    /// Tool that breaks this block fastest.
    pub preferred_tool: ToolType,
}

impl BlockInfo {
    /// The air-like default returned for unregistered ids.
    pub fn air() -> Self {
        Self {
            name: "air".to_string(),
            is_solid: false,
            is_transparent: true,
            top_tile: 0,
            side_tile: 0,
            bottom_tile: 0,
            emission: 0,
            hardness: 0.0,
            preferred_tool: ToolType::None,
        }
    }

    /// Shorthand for a solid opaque block using one tile on every face.
    pub fn solid(name: &str, tile: u16, hardness: f32, tool: ToolType) -> Self {
        Self {
            name: name.to_string(),
            is_solid: true,
            is_transparent: false,
            top_tile: tile,
            side_tile: tile,
            bottom_tile: tile,
            emission: 0,
            hardness,
            preferred_tool: tool,
        }
    }

    /// Returns `true` if the block stops light and hides faces behind it.
    ///
    /// Only solid, non-transparent blocks qualify: glass and leaves are solid
    /// but let light through, water is transparent and not solid.
    pub fn blocks_light(&self) -> bool {
        self.is_solid && !self.is_transparent
    }

    /// Returns `true` if the block emits block light.
    pub fn is_emissive(&self) -> bool {
        self.emission > 0
    }

    /// Returns `true` if the block can never be broken.
    pub fn is_unbreakable(&self) -> bool {
        self.hardness < 0.0
    }

    /// Seconds needed to break this block with `tool`, or `None` if unbreakable.
    ///
    /// The matching tool breaks blocks five times faster than anything else.
    pub fn break_time(&self, tool: ToolType) -> Option<f32> {
        if self.is_unbreakable() {
            return None;
        }
        let base = self.hardness * 1.5;
        if self.preferred_tool == ToolType::None || tool == self.preferred_tool {
            Some(base / if tool == ToolType::None { 1.0 } else { 5.0 })
        } else {
            Some(base)
        }
    }

    /// Returns the atlas tile for a face given the face normal's Y sign.
    ///
    /// `1` selects the top tile, `-1` the bottom tile, `0` the side tile.
    pub fn tile_for(&self, normal_y: i32) -> u16 {
        match normal_y.signum() {
            1 => self.top_tile,
            -1 => self.bottom_tile,
            _ => self.side_tile,
        }
    }
}

impl Default for BlockInfo {
    fn default() -> Self {
        Self::air()
    }
}

/// Errors raised while loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The RON text could not be parsed.
    #[error("failed to parse block catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The catalog could not be written as RON.
    #[error("failed to serialize block catalog: {0}")]
    Serialize(#[from] ron::Error),
    /// A light emission outside `0..=15` was declared.
    #[error("block {id} ({name}) declares emission {emission}, max is 15")]
    EmissionOutOfRange {
        /// Offending block id.
        id: BlockId,
        /// Offending block name.
        name: String,
        /// Declared emission.
        emission: u8,
    },
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only lookup table from [`BlockId`] to [`BlockInfo`].
///
/// Built once at startup and shared (usually behind an `Arc`) by meshing,
/// lighting, and the world.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    /// Dense table where `index == id`.
    blocks: Vec<BlockInfo>,
}

impl BlockCatalog {
    /// Creates a catalog where every id is air-like.
    pub fn new() -> Self {
        Self {
            blocks: vec![BlockInfo::air(); 256],
        }
    }

    /// Returns the info for `id`. Total over all 256 ids.
    pub fn get(&self, id: BlockId) -> &BlockInfo {
        &self.blocks[id as usize]
    }

    /// Registers (or replaces) the definition for `id`, returning the old one.
    ///
    /// Emission is clamped to [`MAX_LIGHT`].
    pub fn register(&mut self, id: BlockId, mut info: BlockInfo) -> BlockInfo {
        info.emission = info.emission.min(MAX_LIGHT);
        std::mem::replace(&mut self.blocks[id as usize], info)
    }

    /// Returns `true` if `id` stops light.
    pub fn blocks_light(&self, id: BlockId) -> bool {
        self.get(id).blocks_light()
    }

    /// Returns the emission of `id` (0 for non-emissive or unknown ids).
    pub fn emission(&self, id: BlockId) -> u8 {
        self.get(id).emission
    }

    /// Finds a block id by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, info)| info.name == name)
            .map(|(id, _)| id as BlockId)
    }

    /// Iterates over ids whose entry differs from the air default.
    pub fn registered(&self) -> impl Iterator<Item = (BlockId, &BlockInfo)> {
        let air = BlockInfo::air();
        self.blocks
            .iter()
            .enumerate()
            .filter(move |(id, info)| *id == 0 || **info != air)
            .map(|(id, info)| (id as BlockId, info))
    }

    /// Parses a catalog from RON: a list of `(id, BlockInfo)` pairs.
    ///
    /// Ids not listed stay air-like.
    pub fn from_ron_str(text: &str) -> Result<Self, CatalogError> {
        let entries: Vec<(BlockId, BlockInfo)> = ron::from_str(text)?;
        let mut catalog = Self::new();
        for (id, info) in entries {
            if info.emission > MAX_LIGHT {
                return Err(CatalogError::EmissionOutOfRange {
                    id,
                    name: info.name,
                    emission: info.emission,
                });
            }
            catalog.register(id, info);
        }
        Ok(catalog)
    }

    /// Writes every registered entry as RON.
    pub fn to_ron_string(&self) -> Result<String, CatalogError> {
        let entries: Vec<(BlockId, BlockInfo)> = self
            .registered()
            .map(|(id, info)| (id, info.clone()))
            .collect();
        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        Ok(ron::ser::to_string_pretty(&entries, pretty)?)
    }

    /// The built-in block set.
    pub fn standard() -> Self {
        use ToolType::{Axe, Pickaxe, Shears, Shovel};

        let mut c = Self::new();
        c.register(
            1,
            BlockInfo {
                top_tile: 1,
                side_tile: 26,
                bottom_tile: 2,
                ..BlockInfo::solid("grass", 1, 0.6, Shovel)
            },
        );
        c.register(2, BlockInfo::solid("dirt", 2, 0.5, Shovel));
        c.register(3, BlockInfo::solid("stone", 3, 1.5, Pickaxe));
        c.register(
            4,
            BlockInfo {
                top_tile: 27,
                bottom_tile: 27,
                ..BlockInfo::solid("wood", 4, 2.0, Axe)
            },
        );
        c.register(
            5,
            BlockInfo {
                is_transparent: true,
                ..BlockInfo::solid("leaves", 5, 0.2, Shears)
            },
        );
        c.register(
            6,
            BlockInfo {
                is_solid: false,
                is_transparent: true,
                emission: 14,
                hardness: 0.0,
                ..BlockInfo::solid("torch", 24, 0.0, ToolType::None)
            },
        );
        c.register(
            7,
            BlockInfo {
                is_solid: false,
                is_transparent: true,
                ..BlockInfo::solid("water", 7, -1.0, ToolType::None)
            },
        );
        c.register(
            8,
            BlockInfo {
                is_transparent: true,
                ..BlockInfo::solid("glass", 8, 0.3, ToolType::None)
            },
        );
        c.register(9, BlockInfo::solid("cobblestone", 9, 2.0, Pickaxe));
        c.register(10, BlockInfo::solid("planks", 10, 2.0, Axe));
        c.register(11, BlockInfo::solid("brick", 11, 2.0, Pickaxe));
        c.register(12, BlockInfo::solid("gravel", 12, 0.6, Shovel));
        c.register(13, BlockInfo::solid("iron", 13, 3.0, Pickaxe));
        c.register(14, BlockInfo::solid("gold", 14, 3.0, Pickaxe));
        c.register(15, BlockInfo::solid("diamond", 15, 3.0, Pickaxe));
        c.register(16, BlockInfo::solid("coal", 16, 3.0, Pickaxe));
        c.register(17, BlockInfo::solid("obsidian", 17, 50.0, Pickaxe));
        c.register(
            18,
            BlockInfo {
                top_tile: 18,
                side_tile: 30,
                bottom_tile: 2,
                ..BlockInfo::solid("snow", 18, 0.2, Shovel)
            },
        );
        c.register(
            19,
            BlockInfo {
                is_transparent: true,
                ..BlockInfo::solid("ice", 19, 0.5, Pickaxe)
            },
        );
        c.register(20, BlockInfo::solid("clay", 20, 0.6, Shovel));
        c.register(
            21,
            BlockInfo {
                top_tile: 21,
                side_tile: 28,
                bottom_tile: 29,
                ..BlockInfo::solid("sandstone", 21, 0.8, Pickaxe)
            },
        );
        c.register(22, BlockInfo::solid("wool", 22, 0.8, Shears));
        c.register(23, BlockInfo::solid("bedrock", 23, -1.0, ToolType::None));
        c.register(
            25,
            BlockInfo {
                is_solid: false,
                is_transparent: true,
                ..BlockInfo::solid("flower", 25, 0.0, ToolType::None)
            },
        );
        c
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids of the built-in blocks in [`BlockCatalog::standard`].
pub mod blocks {
    use super::BlockId;

    pub const GRASS: BlockId = 1;
    pub const DIRT: BlockId = 2;
    pub const STONE: BlockId = 3;
    pub const WOOD: BlockId = 4;
    pub const LEAVES: BlockId = 5;
    pub const TORCH: BlockId = 6;
    pub const WATER: BlockId = 7;
    pub const GLASS: BlockId = 8;
    pub const COBBLESTONE: BlockId = 9;
    pub const PLANKS: BlockId = 10;
    pub const BRICK: BlockId = 11;
    pub const GRAVEL: BlockId = 12;
    pub const IRON: BlockId = 13;
    pub const GOLD: BlockId = 14;
    pub const DIAMOND: BlockId = 15;
    pub const COAL: BlockId = 16;
    pub const OBSIDIAN: BlockId = 17;
    pub const SNOW: BlockId = 18;
    pub const ICE: BlockId = 19;
    pub const CLAY: BlockId = 20;
    pub const SANDSTONE: BlockId = 21;
    pub const WOOL: BlockId = 22;
    pub const BEDROCK: BlockId = 23;
    pub const FLOWER: BlockId = 25;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_is_id_zero() {
        let catalog = BlockCatalog::standard();
        let air = catalog.get(AIR);
        assert_eq!(air.name, "air");
        assert!(!air.is_solid);
        assert!(air.is_transparent);
        assert_eq!(air.emission, 0);
    }

    #[test]
    fn test_unregistered_id_is_air_like() {
        let catalog = BlockCatalog::standard();
        for id in [24u8, 200, 255] {
            let info = catalog.get(id);
            assert!(!info.is_solid, "id {id} should not be solid");
            assert!(info.is_transparent, "id {id} should be transparent");
            assert_eq!(info.emission, 0);
            assert!(!catalog.blocks_light(id));
        }
    }

    #[test]
    fn test_standard_blocks_light_rules() {
        let catalog = BlockCatalog::standard();
        assert!(catalog.blocks_light(blocks::STONE));
        assert!(!catalog.blocks_light(blocks::GLASS), "glass is solid but transparent");
        assert!(!catalog.blocks_light(blocks::LEAVES));
        assert!(!catalog.blocks_light(blocks::WATER), "water is not solid");
        assert_eq!(catalog.emission(blocks::TORCH), 14);
    }

    #[test]
    fn test_tile_selection_by_face() {
        let catalog = BlockCatalog::standard();
        let grass = catalog.get(blocks::GRASS);
        assert_eq!(grass.tile_for(1), 1);
        assert_eq!(grass.tile_for(-1), 2);
        assert_eq!(grass.tile_for(0), 26);
    }

    #[test]
    fn test_register_replaces_and_clamps_emission() {
        let mut catalog = BlockCatalog::new();
        let old = catalog.register(
            40,
            BlockInfo {
                emission: 200,
                ..BlockInfo::solid("lamp", 3, 0.3, ToolType::None)
            },
        );
        assert_eq!(old, BlockInfo::air());
        assert_eq!(catalog.emission(40), MAX_LIGHT);
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = BlockCatalog::standard();
        assert_eq!(catalog.lookup_by_name("obsidian"), Some(blocks::OBSIDIAN));
        assert_eq!(catalog.lookup_by_name("nonexistent"), None);
    }

    #[test]
    fn test_break_time() {
        let catalog = BlockCatalog::standard();
        let stone = catalog.get(blocks::STONE);
        let with_pick = stone.break_time(ToolType::Pickaxe).unwrap();
        let with_axe = stone.break_time(ToolType::Axe).unwrap();
        assert!(with_pick < with_axe);
        assert_eq!(catalog.get(blocks::BEDROCK).break_time(ToolType::Pickaxe), None);
        assert_eq!(catalog.get(blocks::FLOWER).break_time(ToolType::None), Some(0.0));
    }

    #[test]
    fn test_ron_roundtrip() {
        let catalog = BlockCatalog::standard();
        let text = catalog.to_ron_string().unwrap();
        let restored = BlockCatalog::from_ron_str(&text).unwrap();
        for id in 0..=255u8 {
            assert_eq!(catalog.get(id), restored.get(id), "mismatch for id {id}");
        }
    }

    #[test]
    fn test_ron_missing_fields_use_defaults() {
        let text = r#"[(3, (name: "stone", is_solid: true, is_transparent: false))]"#;
        let catalog = BlockCatalog::from_ron_str(text).unwrap();
        assert!(catalog.blocks_light(3));
        assert_eq!(catalog.get(3).preferred_tool, ToolType::None);
    }

    #[test]
    fn test_ron_rejects_bad_emission() {
        let text = r#"[(9, (name: "sun", emission: 40))]"#;
        let result = BlockCatalog::from_ron_str(text);
        assert!(matches!(
            result,
            Err(CatalogError::EmissionOutOfRange { id: 9, .. })
        ));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        assert!(matches!(
            BlockCatalog::from_ron_str("{{not valid}}"),
            Err(CatalogError::Parse(_))
        ));
    }
}
