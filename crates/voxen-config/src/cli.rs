//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Voxen command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "voxen", about = "Voxen voxel engine")]
pub struct CliArgs {
    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Horizontal load radius in chunks.
    #[arg(long)]
    pub load_radius: Option<u32>,

    /// Number of chunk layers in the world.
    #[arg(long)]
    pub height_chunks: Option<u32>,

    /// Build meshes on worker threads.
    #[arg(long)]
    pub async_meshing: Option<bool>,

    /// Meshing worker thread count (0 = automatic).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(radius) = args.load_radius {
            self.world.load_radius = radius;
        }
        if let Some(height) = args.height_chunks {
            self.world.height_chunks = height;
        }
        if let Some(enabled) = args.async_meshing {
            self.meshing.async_meshing = enabled;
        }
        if let Some(workers) = args.workers {
            self.meshing.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
