//! Block edit notifications.
//!
//! A [`BlockEdit`] is emitted whenever a block in a loaded chunk changes.
//! Subscribers (network replication, audio, analytics) receive them over a
//! channel; the [`EditOrigin`] tag lets a replicator skip edits that arrived
//! from the network so they are not echoed back.

use glam::IVec3;

use crate::catalog::BlockId;
use crate::coords::{ChunkCoord, world_to_chunk};

/// Where an edit came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditOrigin {
    /// Made by this process (player input, scripted change).
    Local,
    /// Applied on behalf of a remote peer.
    Remote,
}

/// One block change in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockEdit {
    /// World position of the changed voxel.
    pub pos: IVec3,
    /// Block id before the edit.
    pub old: BlockId,
    /// Block id after the edit.
    pub new: BlockId,
    /// Who made the edit.
    pub origin: EditOrigin,
}

impl BlockEdit {
    /// Chunk containing the edited voxel.
    pub fn chunk(&self) -> ChunkCoord {
        world_to_chunk(self.pos)
    }

    /// Returns `true` if the edit should be forwarded to peers.
    pub fn should_replicate(&self) -> bool {
        self.origin == EditOrigin::Local
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_chunk_uses_floored_coords() {
        let edit = BlockEdit {
            pos: IVec3::new(-1, 20, 0),
            old: 0,
            new: 3,
            origin: EditOrigin::Local,
        };
        assert_eq!(edit.chunk(), ChunkCoord::new(-1, 1, 0));
    }

    #[test]
    fn test_remote_edits_not_replicated() {
        let mut edit = BlockEdit {
            pos: IVec3::ZERO,
            old: 3,
            new: 0,
            origin: EditOrigin::Remote,
        };
        assert!(!edit.should_replicate());
        edit.origin = EditOrigin::Local;
        assert!(edit.should_replicate());
    }
}
