//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the configuration inside its directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World extent and generation.
    pub world: WorldConfig,
    /// Mesh generation.
    pub meshing: MeshingConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World extent and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Lowest chunk layer (chunk `y` coordinate) of the world.
    pub min_chunk_y: i32,
    /// Number of chunk layers stacked from `min_chunk_y` upward.
    pub height_chunks: u32,
    /// Horizontal load radius around the origin, in chunks.
    pub load_radius: u32,
    /// Seed handed to terrain generators.
    pub seed: u64,
}

/// Mesh generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshingConfig {
    /// Build meshes on worker threads instead of the caller's thread.
    pub async_meshing: bool,
    /// Worker thread count. `0` picks one less than the CPU count.
    pub worker_threads: usize,
    /// Maximum meshing tasks queued or running at once.
    pub max_in_flight: usize,
    /// Shade vertices from the light field.
    pub use_light: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,voxen_lighting=trace").
    pub log_level: String,
}

impl WorldConfig {
    /// World voxel `y` range, `min` inclusive, `max` exclusive.
    pub fn voxel_height_range(&self) -> (i32, i32) {
        let min = self.min_chunk_y.saturating_mul(16);
        let span = i32::try_from(self.height_chunks)
            .unwrap_or(i32::MAX)
            .saturating_mul(16);
        (min, min.saturating_add(span))
    }

    /// Chunk `y` range covered by the world, `min` inclusive, `max` exclusive.
    pub fn chunk_y_range(&self) -> std::ops::Range<i32> {
        let top = self
            .min_chunk_y
            .saturating_add(i32::try_from(self.height_chunks).unwrap_or(i32::MAX));
        self.min_chunk_y..top
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            min_chunk_y: 0,
            height_chunks: 8,
            load_radius: 4,
            seed: 0,
        }
    }
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            async_meshing: false,
            worker_threads: 0,
            max_in_flight: 64,
            use_light: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform default configuration directory (`<config dir>/voxen`).
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("voxen"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects values the world cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.height_chunks == 0 {
            return Err(ConfigError::Invalid {
                field: "world.height_chunks",
                reason: "must be at least 1",
            });
        }
        if self.meshing.max_in_flight == 0 {
            return Err(ConfigError::Invalid {
                field: "meshing.max_in_flight",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Self = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }
}
