//! Chunk persistence hooks. Storage holds encoded block data only; light is
//! recomputed on load.

use rustc_hash::FxHashMap;
use thiserror::Error;
use voxen_voxel::ChunkCoord;

/// Errors a storage backend may report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Keyed store of encoded chunk payloads.
pub trait ChunkStorage: Send {
    /// Encoded payload of the chunk at `coord`, `None` if never saved.
    fn load(&mut self, coord: ChunkCoord) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores the encoded payload of the chunk at `coord`, replacing any
    /// previous one.
    fn save(&mut self, coord: ChunkCoord, data: &[u8]) -> Result<(), StorageError>;
}

/// Process-local storage backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    chunks: FxHashMap<ChunkCoord, Vec<u8>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns `true` if a payload exists for `coord`.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Raw payload for `coord`.
    pub fn get(&self, coord: ChunkCoord) -> Option<&[u8]> {
        self.chunks.get(&coord).map(Vec::as_slice)
    }
}

impl ChunkStorage for MemoryStorage {
    fn load(&mut self, coord: ChunkCoord) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.chunks.get(&coord).cloned())
    }

    fn save(&mut self, coord: ChunkCoord, data: &[u8]) -> Result<(), StorageError> {
        self.chunks.insert(coord, data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::new();
        let coord = ChunkCoord::new(1, -2, 3);
        assert!(storage.load(coord).unwrap().is_none());

        storage.save(coord, b"abc").unwrap();
        assert_eq!(storage.load(coord).unwrap().as_deref(), Some(&b"abc"[..]));
        assert!(storage.contains(coord));
        assert_eq!(storage.len(), 1);

        storage.save(coord, b"de").unwrap();
        assert_eq!(storage.get(coord), Some(&b"de"[..]));
        assert_eq!(storage.len(), 1);
    }
}
