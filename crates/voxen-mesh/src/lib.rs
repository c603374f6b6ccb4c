//! Chunk meshing: face-culled mesh builders (scalar reference and batched),
//! neighbor boundary snapshots, the async meshing pipeline, and mesh
//! invalidation.

pub mod async_mesh;
pub mod atlas;
pub mod batched;
pub mod builder;
pub mod chunk_mesh;
pub mod face_direction;
pub mod invalidation;
pub mod neighborhood;

pub use async_mesh::{MeshingPipeline, MeshingResult, MeshingTask};
pub use atlas::{ATLAS_SIZE, TILE_SIZE, TILES_PER_ROW, TileUv, tile_uvs_inset};
pub use batched::build_mesh_batched;
pub use builder::{MIN_BRIGHTNESS, build_mesh, light_brightness};
pub use chunk_mesh::{ChunkMesh, MeshVertex, QuadInfo};
pub use face_direction::FaceDirection;
pub use invalidation::{ChunkMeshState, MeshInvalidator};
pub use neighborhood::{BoundaryPlane, MeshNeighborhood, NeighborSource, PLANE_AREA};
