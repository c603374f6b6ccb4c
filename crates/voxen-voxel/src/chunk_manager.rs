//! Arena of loaded chunks keyed by [`ChunkCoord`].
//!
//! Chunks live in a `Vec` of slots with a coordinate → slot index map on
//! top. Removed slots go on a free list and keep their [`ChunkStore`]
//! allocation, so streaming chunks in and out does not churn the allocator.

use rustc_hash::FxHashMap;

use crate::chunk::ChunkStore;
use crate::coords::ChunkCoord;

struct Slot {
    /// `None` while the slot sits on the free list.
    coord: Option<ChunkCoord>,
    store: ChunkStore,
}

/// Owns every loaded chunk and provides O(1) lookup by coordinate.
pub struct ChunkManager {
    slots: Vec<Slot>,
    index: FxHashMap<ChunkCoord, usize>,
    free: Vec<usize>,
}

impl ChunkManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: FxHashMap::default(),
            free: Vec::new(),
        }
    }

    /// Inserts `store` at `coord`, replacing any chunk already there.
    pub fn insert(&mut self, coord: ChunkCoord, store: ChunkStore) {
        if let Some(&slot) = self.index.get(&coord) {
            self.slots[slot].store = store;
            return;
        }
        let slot = self.alloc_slot(coord);
        self.slots[slot].store = store;
    }

    /// Returns the chunk at `coord`, creating an all-air one if absent.
    ///
    /// A freed slot is reused (and reset) before a new one is allocated.
    pub fn get_or_insert_empty(&mut self, coord: ChunkCoord) -> &mut ChunkStore {
        let slot = match self.index.get(&coord) {
            Some(&slot) => slot,
            None => {
                let slot = self.alloc_slot(coord);
                self.slots[slot].store.reset();
                slot
            }
        };
        &mut self.slots[slot].store
    }

    /// Unloads the chunk at `coord`. Returns `false` if nothing was loaded.
    ///
    /// The slot's storage is kept for reuse.
    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        match self.index.remove(&coord) {
            Some(slot) => {
                self.slots[slot].coord = None;
                self.free.push(slot);
                true
            }
            None => false,
        }
    }

    /// Unloads the chunk at `coord` and hands its store to the caller.
    pub fn take(&mut self, coord: ChunkCoord) -> Option<ChunkStore> {
        let slot = self.index.remove(&coord)?;
        self.slots[slot].coord = None;
        self.free.push(slot);
        Some(std::mem::take(&mut self.slots[slot].store))
    }

    /// Immutable access to a loaded chunk.
    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkStore> {
        self.index.get(&coord).map(|&slot| &self.slots[slot].store)
    }

    /// Mutable access to a loaded chunk.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkStore> {
        let slot = *self.index.get(&coord)?;
        Some(&mut self.slots[slot].store)
    }

    /// Returns `true` if a chunk is loaded at `coord`.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.index.contains_key(&coord)
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of allocated slots, loaded or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Coordinates of all loaded chunks, sorted for deterministic iteration.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.index.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Iterates over all loaded `(coord, chunk)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &ChunkStore)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.coord.map(|c| (c, &slot.store)))
    }

    /// Iterates over coordinates of chunks whose blocks changed since the last save.
    pub fn iter_dirty(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.iter()
            .filter(|(_, store)| store.is_dirty())
            .map(|(coord, _)| coord)
    }

    fn alloc_slot(&mut self, coord: ChunkCoord) -> usize {
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot].coord = Some(coord);
                slot
            }
            None => {
                self.slots.push(Slot {
                    coord: Some(coord),
                    store: ChunkStore::new(),
                });
                self.slots.len() - 1
            }
        };
        self.index.insert(coord, slot);
        slot
    }
}

impl Default for ChunkManager {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
