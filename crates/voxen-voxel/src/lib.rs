//! Voxel storage: block catalog, fixed-size chunks with packed light, chunk
//! arena, coordinate math, and the chunk serialization codec.

pub mod catalog;
pub mod chunk;
pub mod chunk_manager;
pub mod chunk_serial;
pub mod coords;
pub mod events;
pub mod rle;

pub use catalog::{AIR, BlockCatalog, BlockId, BlockInfo, CatalogError, MAX_LIGHT, ToolType, blocks};
pub use chunk::{ChunkStore, block_of, pack_light, sun_of};
pub use chunk_manager::ChunkManager;
pub use chunk_serial::{ChunkSerError, decode_blocks, encode_blocks, try_decode_blocks};
pub use coords::{
    CHUNK_SIZE, CHUNK_SIZE_I32, CHUNK_VOLUME, ChunkCoord, in_chunk, index_to_local, local_index,
    world_to_chunk, world_to_local,
};
pub use events::{BlockEdit, EditOrigin};
