//! World orchestration: the loaded chunk map, world-space block access, light
//! and mesh upkeep after edits, chunk generation and persistence hooks.

mod generator;
mod storage;
mod world;

pub use generator::{ChunkGenerator, EmptyGenerator, FlatGenerator};
pub use storage::{ChunkStorage, MemoryStorage, StorageError};
pub use world::{World, worker_count};
