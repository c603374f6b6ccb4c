//! Asynchronous meshing pipeline: offloads chunk meshing to a thread pool
//! using snapshot-based tasks and channels for result delivery.
//!
//! There is no cancellation. A result whose chunk was edited or unloaded
//! after the snapshot is detected by the caller through `data_version` and
//! dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use voxen_voxel::{BlockCatalog, CHUNK_VOLUME, ChunkCoord, ChunkStore};

use crate::batched::build_mesh_batched;
use crate::chunk_mesh::ChunkMesh;
use crate::neighborhood::MeshNeighborhood;

/// A self-contained meshing task that can run on any thread.
///
/// Owns copies of the chunk's arrays and its neighbors' boundary planes, so
/// the source chunk may change or unload while the task runs.
pub struct MeshingTask {
    /// The chunk this mesh is for.
    pub coord: ChunkCoord,
    /// Snapshot of the chunk's blocks.
    pub blocks: Box<[u8; CHUNK_VOLUME]>,
    /// Snapshot of the chunk's light, `None` for unlit meshing.
    pub light: Option<Box<[u8; CHUNK_VOLUME]>>,
    /// Snapshot of the neighbor boundary planes.
    pub neighbors: MeshNeighborhood,
    /// Chunk version at snapshot time.
    pub data_version: u64,
}

impl MeshingTask {
    /// Snapshots `chunk` and its gathered neighborhood.
    pub fn snapshot(
        coord: ChunkCoord,
        chunk: &ChunkStore,
        neighbors: MeshNeighborhood,
        with_light: bool,
    ) -> Self {
        Self {
            coord,
            blocks: Box::new(*chunk.blocks()),
            light: with_light.then(|| Box::new(*chunk.light_data())),
            neighbors,
            data_version: chunk.version(),
        }
    }

    /// Runs the task on the current thread.
    pub fn run(&self, catalog: &BlockCatalog) -> ChunkMesh {
        build_mesh_batched(&self.blocks, self.light.as_deref(), &self.neighbors, catalog)
    }
}

/// The result of a completed meshing task.
pub struct MeshingResult {
    /// The chunk this mesh is for.
    pub coord: ChunkCoord,
    /// The generated mesh.
    pub mesh: ChunkMesh,
    /// Chunk version at snapshot time.
    pub data_version: u64,
}

/// Asynchronous meshing pipeline backed by a thread pool.
///
/// The owning thread creates [`MeshingTask`]s, submits them via
/// [`submit`](Self::submit), and collects [`MeshingResult`]s each tick via
/// [`drain_results`](Self::drain_results). Meshing never blocks the caller.
pub struct MeshingPipeline {
    /// Channel sender for submitting tasks to workers.
    task_sender: Option<crossbeam_channel::Sender<MeshingTask>>,
    /// Channel receiver for collecting completed results.
    result_receiver: crossbeam_channel::Receiver<MeshingResult>,
    /// Handles to the worker threads (for shutdown).
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks that can be in flight simultaneously.
    budget: usize,
    /// Current number of in-flight tasks.
    in_flight: Arc<AtomicUsize>,
}

impl MeshingPipeline {
    /// Creates a pipeline with `worker_count` threads and at most `budget`
    /// tasks in flight.
    ///
    /// `catalog` is shared read-only by all workers.
    pub fn new(worker_count: usize, budget: usize, catalog: Arc<BlockCatalog>) -> Self {
        let worker_count = worker_count.max(1);
        let budget = budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<MeshingTask>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let catalog = Arc::clone(&catalog);
            let flight = Arc::clone(&in_flight);

            let spawned = std::thread::Builder::new()
                .name(format!("voxen-mesh-{worker}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let mesh = task.run(&catalog);
                        let _ = tx.send(MeshingResult {
                            coord: task.coord,
                            mesh,
                            data_version: task.data_version,
                        });
                        flight.fetch_sub(1, Ordering::Relaxed);
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => tracing::warn!("failed to spawn mesh worker {}: {}", worker, err),
            }
        }
        tracing::debug!(
            "meshing pipeline started: {} workers, budget {}",
            handles.len(),
            budget
        );

        Self {
            task_sender: (!handles.is_empty()).then_some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
        }
    }

    /// Submit a meshing task. Returns `false` if the budget is exhausted
    /// or the pipeline has been shut down.
    pub fn submit(&self, task: MeshingTask) -> bool {
        let Some(sender) = &self.task_sender else {
            return false;
        };
        if self.in_flight.load(Ordering::Relaxed) >= self.budget {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.try_send(task).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Drain all completed results. Called once per tick on the owning thread.
    pub fn drain_results(&self) -> Vec<MeshingResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Number of tasks currently being processed or queued by workers.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Maximum number of in-flight tasks.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Shut down all worker threads gracefully.
    ///
    /// Drops the task sender so workers exit after finishing queued tasks,
    /// then joins them.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for MeshingPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
