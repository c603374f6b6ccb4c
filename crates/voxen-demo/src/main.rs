//! Headless demo that generates a patch of hilly terrain, lights it, edits it
//! and meshes it, logging what each step produced.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p voxen-demo -- --load-radius 3 --async-meshing true`.

mod terrain;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::IVec3;
use tracing::{info, warn};
use voxen_config::{CliArgs, Config, default_config_dir};
use voxen_voxel::{AIR, BlockCatalog, ChunkCoord, blocks};
use voxen_world::World;

use crate::terrain::HillsGenerator;

/// Upper bound on waiting for the meshing workers.
const MESH_TIMEOUT: Duration = Duration::from_secs(30);

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("{e}, using defaults");
        config = Config::default();
    }

    let log_dir = config_dir.join("logs");
    voxen_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    run(&config);
}

fn run(config: &Config) {
    let catalog = Arc::new(BlockCatalog::standard());
    let (min_y, max_y) = config.world.voxel_height_range();
    let sea_level = min_y + (max_y - min_y) / 3;
    let hills = HillsGenerator::new(config.world.seed, min_y, sea_level);

    let mut world = World::new(config.world.clone(), catalog)
        .with_generator(Box::new(hills))
        .with_meshing(config.meshing.clone());
    let edits = world.subscribe_edits();

    let start = Instant::now();
    let center = ChunkCoord::new(0, config.world.min_chunk_y, 0);
    let loaded = world.load_area(center, config.world.load_radius);
    info!(
        "Loaded and lit {} chunks in {:.1?} (seed {})",
        loaded,
        start.elapsed(),
        config.world.seed
    );

    let meshed = mesh_all(&mut world, config.meshing.async_meshing);
    info!("Meshed {} chunks, {} quads", meshed, total_quads(&world));

    // A ring of torches around the origin.
    let mut relit = 0;
    for (x, z) in [(4, 0), (-4, 0), (0, 4), (0, -4), (15, 15), (16, 16)] {
        if let Some(top) = surface_y(&world, x, z) {
            let pos = IVec3::new(x, top + 1, z);
            relit += world.set_block(pos, blocks::TORCH).len();
            info!(
                "Torch at {:?}: block light {}, sunlight {}",
                pos,
                world.block_light(pos),
                world.sunlight(pos)
            );
        }
    }

    // Dig a shaft at the origin and cover it with glass.
    if let Some(top) = surface_y(&world, 0, 0) {
        for y in (top - 6..=top).rev() {
            relit += world.set_block(IVec3::new(0, y, 0), AIR).len();
        }
        relit += world.set_block(IVec3::new(0, top + 1, 0), blocks::GLASS).len();
        info!(
            "Shaft bottom at y={} has sunlight {}",
            top - 6,
            world.sunlight(IVec3::new(0, top - 6, 0))
        );
    }

    // An edit arriving from a peer.
    if let Some(top) = surface_y(&world, 8, 8) {
        relit += world.apply_remote_edit(IVec3::new(8, top + 1, 8), blocks::STONE).len();
    }

    let replicate = edits.try_iter().filter(|e| e.should_replicate()).count();
    info!(
        "{} remesh requests from edits, {} edits to replicate",
        relit, replicate
    );

    let meshed = mesh_all(&mut world, config.meshing.async_meshing);
    info!("Remeshed {} chunks, {} quads", meshed, total_quads(&world));

    match world.save_all() {
        Ok(saved) => info!("Saved {} modified chunks", saved),
        Err(err) => warn!("Saving chunks failed: {}", err),
    }
}

/// Highest non-air block of the column at `(x, z)`.
fn surface_y(world: &World, x: i32, z: i32) -> Option<i32> {
    let (min_y, max_y) = world.config().voxel_height_range();
    (min_y..max_y)
        .rev()
        .find(|&y| world.get_block(IVec3::new(x, y, z)) != AIR)
}

/// Brings every dirty mesh up to date. Returns the number of meshes built.
fn mesh_all(world: &mut World, async_meshing: bool) -> usize {
    if !async_meshing {
        return world.rebuild_dirty_meshes();
    }

    let start = Instant::now();
    let mut applied = 0;
    loop {
        world.schedule_mesh_jobs();
        let idle = world.mesh_jobs_in_flight() == 0;
        applied += world.poll_mesh_jobs();
        if idle && world.dirty_meshes().is_empty() {
            break;
        }
        if start.elapsed() > MESH_TIMEOUT {
            warn!(
                "Gave up waiting for meshes, {} still dirty",
                world.dirty_meshes().len()
            );
            break;
        }
        sleep(Duration::from_millis(1));
    }
    applied
}

fn total_quads(world: &World) -> usize {
    world
        .loaded_coords()
        .into_iter()
        .filter_map(|coord| world.mesh(coord))
        .map(|mesh| mesh.quad_count())
        .sum()
}
