//! The world orchestrator: owns loaded chunks and keeps their light and
//! meshes consistent with block edits.
//!
//! A block edit flows through [`World::set_block`]: the chunk is mutated, the
//! light engine repairs both channels, every chunk whose light or culling
//! changed is queued for remeshing, and subscribers are notified.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use glam::IVec3;
use rustc_hash::{FxHashMap, FxHashSet};
use voxen_config::{MeshingConfig, WorldConfig};
use voxen_lighting::{
    ChunkLookup, DirtySet, SkyMask, init_block_light, init_sunlight_with_sky, on_block_changed,
    propagate_block_light_from_boundaries, propagate_sunlight_from_boundaries, remove_sunlight,
};
use voxen_mesh::{
    ChunkMesh, ChunkMeshState, MeshInvalidator, MeshNeighborhood, MeshingPipeline, MeshingTask,
    NeighborSource, build_mesh_batched,
};
use voxen_voxel::{
    AIR, BlockCatalog, BlockEdit, BlockId, CHUNK_SIZE_I32, CHUNK_VOLUME, ChunkCoord, ChunkManager,
    ChunkStore, EditOrigin, MAX_LIGHT, decode_blocks, encode_blocks, world_to_chunk,
    world_to_local,
};

use crate::generator::{ChunkGenerator, FlatGenerator};
use crate::storage::{ChunkStorage, MemoryStorage, StorageError};

/// The six face-neighbor offsets of a chunk.
const FACE_OFFSETS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

/// Loaded chunks plus everything derived from them.
pub struct World {
    config: WorldConfig,
    meshing: MeshingConfig,
    catalog: Arc<BlockCatalog>,
    chunks: ChunkManager,
    /// World voxel `y` range, cached from `config`.
    height_range: (i32, i32),
    generator: Box<dyn ChunkGenerator>,
    storage: Box<dyn ChunkStorage>,
    meshes: FxHashMap<ChunkCoord, ChunkMesh>,
    mesh_states: FxHashMap<ChunkCoord, ChunkMeshState>,
    dirty_meshes: FxHashSet<ChunkCoord>,
    pipeline: Option<MeshingPipeline>,
    subscribers: Vec<Sender<BlockEdit>>,
}

impl World {
    /// Creates an empty world with a [`FlatGenerator`], in-memory storage and
    /// synchronous lit meshing.
    pub fn new(config: WorldConfig, catalog: Arc<BlockCatalog>) -> Self {
        let height_range = config.voxel_height_range();
        Self {
            config,
            meshing: MeshingConfig::default(),
            catalog,
            chunks: ChunkManager::new(),
            height_range,
            generator: Box::new(FlatGenerator::default()),
            storage: Box::new(MemoryStorage::new()),
            meshes: FxHashMap::default(),
            mesh_states: FxHashMap::default(),
            dirty_meshes: FxHashSet::default(),
            pipeline: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the terrain generator.
    pub fn with_generator(mut self, generator: Box<dyn ChunkGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Replaces the persistence backend.
    pub fn with_storage(mut self, storage: Box<dyn ChunkStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Applies meshing settings, starting worker threads when async meshing
    /// is enabled.
    pub fn with_meshing(mut self, meshing: MeshingConfig) -> Self {
        self.pipeline = meshing.async_meshing.then(|| {
            MeshingPipeline::new(
                worker_count(&meshing),
                meshing.max_in_flight,
                Arc::clone(&self.catalog),
            )
        });
        self.meshing = meshing;
        self
    }

    /// World settings.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Block catalog shared with mesh workers.
    pub fn catalog(&self) -> &Arc<BlockCatalog> {
        &self.catalog
    }

    // -----------------------------------------------------------------------
    // Block access
    // -----------------------------------------------------------------------

    /// Block at world position `pos`; air when unloaded or out of range.
    pub fn get_block(&self, pos: IVec3) -> BlockId {
        self.with_cell(pos, |chunk, x, y, z| chunk.get(x, y, z))
            .unwrap_or(AIR)
    }

    /// Sunlight at `pos`; zero when unloaded.
    pub fn sunlight(&self, pos: IVec3) -> u8 {
        self.with_cell(pos, |chunk, x, y, z| chunk.sunlight(x, y, z))
            .unwrap_or(0)
    }

    /// Block light at `pos`; zero when unloaded.
    pub fn block_light(&self, pos: IVec3) -> u8 {
        self.with_cell(pos, |chunk, x, y, z| chunk.block_light(x, y, z))
            .unwrap_or(0)
    }

    fn with_cell<T>(
        &self,
        pos: IVec3,
        read: impl FnOnce(&ChunkStore, i32, i32, i32) -> T,
    ) -> Option<T> {
        if !self.in_height(pos.y) {
            return None;
        }
        let chunk = self.chunks.get(world_to_chunk(pos))?;
        let (x, y, z) = world_to_local(pos);
        Some(read(chunk, x as i32, y as i32, z as i32))
    }

    /// Places `block` at `pos` as a local edit.
    ///
    /// Returns the chunks queued for remeshing. Writes to unloaded chunks or
    /// outside the world's height are dropped and return an empty set.
    pub fn set_block(&mut self, pos: IVec3, block: BlockId) -> DirtySet {
        self.apply_edit(pos, block, EditOrigin::Local)
    }

    /// Applies an edit received from a remote peer.
    ///
    /// Identical to [`set_block`](Self::set_block) except that the emitted
    /// [`BlockEdit`] is tagged [`EditOrigin::Remote`] so replicators skip it.
    pub fn apply_remote_edit(&mut self, pos: IVec3, block: BlockId) -> DirtySet {
        self.apply_edit(pos, block, EditOrigin::Remote)
    }

    fn apply_edit(&mut self, pos: IVec3, block: BlockId, origin: EditOrigin) -> DirtySet {
        if !self.in_height(pos.y) {
            tracing::trace!("edit at {:?} outside world height, dropped", pos);
            return DirtySet::default();
        }
        let coord = world_to_chunk(pos);
        let local = world_to_local(pos);
        let (x, y, z) = (local.0 as i32, local.1 as i32, local.2 as i32);
        let Some(chunk) = self.chunks.get_mut(coord) else {
            tracing::debug!("edit at {:?} in unloaded chunk {}, dropped", pos, coord);
            return DirtySet::default();
        };
        let old = chunk.get(x, y, z);
        if old == block {
            return DirtySet::default();
        }
        chunk.set(x, y, z, block);

        let catalog = Arc::clone(&self.catalog);
        let lit = on_block_changed(self, pos, old, block, &catalog);

        let mut remesh = DirtySet::default();
        remesh.extend(MeshInvalidator::invalidate(coord, local));
        for changed in &lit {
            remesh.insert(*changed);
            remesh.extend(FACE_OFFSETS.iter().map(|&d| changed.neighbor(d)));
        }
        remesh.retain(|c| self.chunks.contains(*c));
        for &c in &remesh {
            self.mark_mesh_dirty(c);
        }

        self.notify(BlockEdit {
            pos,
            old,
            new: block,
            origin,
        });
        tracing::trace!(
            "{:?} edit {} -> {} at {:?}: {} relit, {} remesh",
            origin,
            old,
            block,
            pos,
            lit.len(),
            remesh.len()
        );
        remesh
    }

    /// Receiver for every block edit applied from now on.
    pub fn subscribe_edits(&mut self) -> Receiver<BlockEdit> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, edit: BlockEdit) {
        self.subscribers.retain(|tx| tx.send(edit).is_ok());
    }

    // -----------------------------------------------------------------------
    // Chunk lifecycle
    // -----------------------------------------------------------------------

    /// Returns `true` if the chunk at `coord` is loaded.
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains(coord)
    }

    /// The loaded chunk at `coord`.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkStore> {
        self.chunks.get(coord)
    }

    /// Number of loaded chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Coordinates of all loaded chunks, sorted.
    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        self.chunks.coords()
    }

    /// Loads the chunk at `coord` from storage, or generates it.
    ///
    /// Stored data that fails to decode is discarded and the chunk is
    /// regenerated. Returns `false` if the chunk was already loaded or lies
    /// outside the world's height.
    pub fn load_chunk(&mut self, coord: ChunkCoord) -> bool {
        if self.chunks.contains(coord) || !self.config.chunk_y_range().contains(&coord.y) {
            return false;
        }

        let mut chunk = ChunkStore::new();
        let stored = match self.storage.load(coord) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!("failed to read chunk {}: {}", coord, err);
                None
            }
        };
        match stored.as_deref().map(decode_blocks) {
            Some(Some(blocks)) => chunk.import_raw(&blocks[..]),
            Some(None) => {
                tracing::warn!("stored chunk {} is corrupt, regenerating", coord);
                self.generate_into(coord, &mut chunk);
            }
            None => self.generate_into(coord, &mut chunk),
        }

        self.light_and_insert(coord, chunk);
        true
    }

    fn generate_into(&self, coord: ChunkCoord, chunk: &mut ChunkStore) {
        self.generator.generate(coord, chunk);
        // Regenerable, so nothing to persist yet.
        chunk.clear_dirty();
    }

    /// Inserts an externally produced chunk (e.g. streamed from a server).
    ///
    /// Light is recomputed. Returns `false` without touching the world if a
    /// chunk is already loaded at `coord` or it lies outside the world's height.
    pub fn insert_chunk(&mut self, coord: ChunkCoord, chunk: ChunkStore) -> bool {
        if self.chunks.contains(coord) || !self.config.chunk_y_range().contains(&coord.y) {
            return false;
        }
        self.light_and_insert(coord, chunk);
        true
    }

    /// Loads every chunk within `radius` columns of `center`, nearest columns
    /// first and each column from the top down. Returns the number loaded.
    pub fn load_area(&mut self, center: ChunkCoord, radius: u32) -> usize {
        let r = i64::from(radius);
        let mut columns: Vec<(i64, i32, i32)> = Vec::new();
        for dx in -r..=r {
            for dz in -r..=r {
                let dist_sq = dx * dx + dz * dz;
                if dist_sq <= r * r {
                    columns.push((dist_sq, center.x + dx as i32, center.z + dz as i32));
                }
            }
        }
        columns.sort_unstable();

        let mut loaded = 0;
        for (_, x, z) in columns {
            for y in self.config.chunk_y_range().rev() {
                if self.load_chunk(ChunkCoord::new(x, y, z)) {
                    loaded += 1;
                }
            }
        }
        tracing::debug!(
            "loaded {} chunks around {} (radius {})",
            loaded,
            center,
            radius
        );
        loaded
    }

    /// Lights a chunk on its own, inserts it and stitches its light with
    /// loaded neighbors.
    fn light_and_insert(&mut self, coord: ChunkCoord, mut chunk: ChunkStore) {
        let catalog = Arc::clone(&self.catalog);
        let sky = self
            .chunks
            .get(coord.offset(0, 1, 0))
            .map(SkyMask::from_chunk_above)
            .unwrap_or_default();
        init_sunlight_with_sky(&mut chunk, &catalog, &sky);
        init_block_light(&mut chunk, &catalog);
        self.chunks.insert(coord, chunk);

        let mut lit = self.shade_chunk_below(coord);
        lit.extend(propagate_sunlight_from_boundaries(self, coord, &catalog));
        lit.extend(propagate_block_light_from_boundaries(self, coord, &catalog));
        lit.insert(coord);

        for changed in lit {
            self.mark_mesh_dirty_with_neighbors(changed);
        }
        self.mark_mesh_dirty_with_neighbors(coord);
    }

    /// Retracts sky light from the chunk below `coord` wherever the newly
    /// loaded chunk does not pass full sunlight down.
    ///
    /// The chunk below assumed open sky while `coord` was unloaded.
    fn shade_chunk_below(&mut self, coord: ChunkCoord) -> DirtySet {
        let mut dirty = DirtySet::default();
        let below = coord.offset(0, -1, 0);
        let (Some(upper), Some(lower)) = (self.chunks.get(coord), self.chunks.get(below)) else {
            return dirty;
        };

        let top = CHUNK_SIZE_I32 - 1;
        let mut shaded = Vec::new();
        for z in 0..CHUNK_SIZE_I32 {
            for x in 0..CHUNK_SIZE_I32 {
                if upper.sunlight(x, 0, z) < MAX_LIGHT && lower.sunlight(x, top, z) == MAX_LIGHT {
                    shaded.push(below.origin() + IVec3::new(x, top, z));
                }
            }
        }

        let catalog = Arc::clone(&self.catalog);
        for pos in &shaded {
            dirty.extend(remove_sunlight(self, *pos, &catalog));
        }
        if !shaded.is_empty() {
            tracing::debug!("shaded {} columns below {}", shaded.len(), coord);
        }
        dirty
    }

    /// Unloads the chunk at `coord`, saving it first if it was modified.
    ///
    /// On a save failure the chunk stays loaded and the error is returned.
    /// Returns `Ok(false)` if nothing was loaded at `coord`.
    pub fn unload_chunk(&mut self, coord: ChunkCoord) -> Result<bool, StorageError> {
        let Some(chunk) = self.chunks.get(coord) else {
            return Ok(false);
        };
        if chunk.is_dirty() {
            self.storage.save(coord, &encode_blocks(chunk.blocks()))?;
        }
        self.chunks.remove(coord);
        self.meshes.remove(&coord);
        self.mesh_states.remove(&coord);
        self.dirty_meshes.remove(&coord);

        // Faces that were culled against this chunk are exposed again.
        for d in FACE_OFFSETS {
            let neighbor = coord.neighbor(d);
            if self.chunks.contains(neighbor) {
                self.mark_mesh_dirty(neighbor);
            }
        }
        tracing::trace!("unloaded chunk {}", coord);
        Ok(true)
    }

    /// Writes every modified chunk to storage. Returns how many were saved.
    ///
    /// Stops at the first failure; chunks saved before it are marked clean.
    pub fn save_all(&mut self) -> Result<usize, StorageError> {
        let dirty: Vec<ChunkCoord> = self.chunks.iter_dirty().collect();
        let mut saved = 0;
        for coord in dirty {
            let Some(chunk) = self.chunks.get_mut(coord) else {
                continue;
            };
            self.storage.save(coord, &encode_blocks(chunk.blocks()))?;
            chunk.clear_dirty();
            saved += 1;
        }
        tracing::debug!("saved {} chunks", saved);
        Ok(saved)
    }

    // -----------------------------------------------------------------------
    // Meshing
    // -----------------------------------------------------------------------

    /// Current mesh of `coord`. `None` until meshed, and for chunks with no
    /// visible faces.
    pub fn mesh(&self, coord: ChunkCoord) -> Option<&ChunkMesh> {
        self.meshes.get(&coord)
    }

    /// Chunks waiting for a remesh, sorted.
    pub fn dirty_meshes(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.dirty_meshes.iter().copied().collect();
        coords.sort_unstable();
        coords
    }

    fn mark_mesh_dirty(&mut self, coord: ChunkCoord) {
        self.dirty_meshes.insert(coord);
        self.mesh_states.entry(coord).or_default().forced = true;
    }

    fn mark_mesh_dirty_with_neighbors(&mut self, coord: ChunkCoord) {
        if self.chunks.contains(coord) {
            self.mark_mesh_dirty(coord);
        }
        for d in FACE_OFFSETS {
            let neighbor = coord.neighbor(d);
            if self.chunks.contains(neighbor) {
                self.mark_mesh_dirty(neighbor);
            }
        }
    }

    fn store_mesh(&mut self, coord: ChunkCoord, mesh: ChunkMesh, version: u64) {
        if mesh.is_empty() {
            self.meshes.remove(&coord);
        } else {
            self.meshes.insert(coord, mesh);
        }
        self.mesh_states.entry(coord).or_default().mark_meshed(version);
    }

    /// Rebuilds every dirty mesh on the calling thread. Returns the number built.
    pub fn rebuild_dirty_meshes(&mut self) -> usize {
        let coords = self.dirty_meshes();
        let use_light = self.meshing.use_light;
        let mut built = 0;
        for coord in coords {
            self.dirty_meshes.remove(&coord);
            let Some(chunk) = self.chunks.get(coord) else {
                continue;
            };
            let neighbors = MeshNeighborhood::gather(&*self, coord, use_light);
            let light = use_light.then(|| chunk.light_data());
            let mesh = build_mesh_batched(chunk.blocks(), light, &neighbors, &self.catalog);
            let version = chunk.version();
            self.store_mesh(coord, mesh, version);
            built += 1;
        }
        if built > 0 {
            tracing::debug!("rebuilt {} chunk meshes", built);
        }
        built
    }

    /// Snapshots dirty chunks into meshing tasks for the worker pool, up to
    /// its in-flight budget. Returns the number submitted.
    ///
    /// Does nothing when async meshing is disabled.
    pub fn schedule_mesh_jobs(&mut self) -> usize {
        let Some(pipeline) = &self.pipeline else {
            return 0;
        };
        let use_light = self.meshing.use_light;
        let mut submitted = 0;
        for coord in self.dirty_meshes() {
            let Some(chunk) = self.chunks.get(coord) else {
                self.dirty_meshes.remove(&coord);
                continue;
            };
            if let Some(state) = self.mesh_states.get(&coord)
                && !state.needs_remesh(chunk.version())
            {
                if !state.remesh_pending {
                    self.dirty_meshes.remove(&coord);
                }
                continue;
            }
            let neighbors = MeshNeighborhood::gather(&*self, coord, use_light);
            let task = MeshingTask::snapshot(coord, chunk, neighbors, use_light);
            if !pipeline.submit(task) {
                break;
            }
            let state = self.mesh_states.entry(coord).or_default();
            state.remesh_pending = true;
            state.forced = false;
            self.dirty_meshes.remove(&coord);
            submitted += 1;
        }
        submitted
    }

    /// Applies finished meshing results. Returns the number applied.
    ///
    /// Results for unloaded chunks are dropped. Results for chunks that
    /// changed after their snapshot are dropped and the chunk stays dirty.
    pub fn poll_mesh_jobs(&mut self) -> usize {
        let Some(pipeline) = &self.pipeline else {
            return 0;
        };
        let results = pipeline.drain_results();
        let mut applied = 0;
        for result in results {
            let Some(chunk) = self.chunks.get(result.coord) else {
                tracing::trace!("dropping mesh for unloaded chunk {}", result.coord);
                continue;
            };
            let version = chunk.version();
            let state = self.mesh_states.entry(result.coord).or_default();
            state.remesh_pending = false;
            if !state.accepts_result(result.data_version, version) {
                tracing::trace!("dropping stale mesh for {}", result.coord);
                self.dirty_meshes.insert(result.coord);
                continue;
            }
            self.store_mesh(result.coord, result.mesh, version);
            applied += 1;
        }
        applied
    }

    /// Number of meshing tasks queued or running.
    pub fn mesh_jobs_in_flight(&self) -> usize {
        self.pipeline.as_ref().map_or(0, MeshingPipeline::in_flight_count)
    }

    fn in_height(&self, y: i32) -> bool {
        y >= self.height_range.0 && y < self.height_range.1
    }
}

/// Worker threads for the meshing pool: the configured count, or one less
/// than the CPU count when unset.
pub fn worker_count(meshing: &MeshingConfig) -> usize {
    if meshing.worker_threads > 0 {
        meshing.worker_threads
    } else {
        num_cpus::get().saturating_sub(1).max(1)
    }
}

impl ChunkLookup for World {
    fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkStore> {
        self.chunks.get(coord)
    }

    fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkStore> {
        self.chunks.get_mut(coord)
    }

    fn height_range(&self) -> (i32, i32) {
        self.height_range
    }
}

impl NeighborSource for World {
    fn chunk_blocks(&self, coord: ChunkCoord) -> Option<&[u8; CHUNK_VOLUME]> {
        self.chunks.get(coord).map(ChunkStore::blocks)
    }

    fn chunk_light(&self, coord: ChunkCoord) -> Option<&[u8; CHUNK_VOLUME]> {
        self.chunks.get(coord).map(ChunkStore::light_data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
