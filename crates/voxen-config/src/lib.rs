//! Configuration for Voxen.
//!
//! Settings persist to disk as RON. Supports CLI overrides via clap, hot-reload
//! detection, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, DebugConfig, MeshingConfig, WorldConfig, default_config_dir,
};
pub use error::ConfigError;
