//! The shared flood fill used by every light operation.

use std::collections::VecDeque;

use glam::IVec3;
use voxen_voxel::{BlockCatalog, MAX_LIGHT};

use crate::lookup::{Channel, ChunkLookup, DirtySet, NEIGHBORS_6, probe, write};

/// Pending `(position, level)` entries of a flood fill.
pub(crate) type LightQueue = VecDeque<(IVec3, u8)>;

/// Level a neighbor receives from a cell at `level` across `dir`.
///
/// Sunlight travels straight down from a full-strength cell without decay;
/// everything else loses one level per step.
#[inline]
pub(crate) fn next_level(channel: Channel, level: u8, dir: IVec3) -> u8 {
    if channel == Channel::Sun && level == MAX_LIGHT && dir == IVec3::NEG_Y {
        MAX_LIGHT
    } else {
        level.saturating_sub(1)
    }
}

/// Drains `queue`, raising neighbors that would receive more light than
/// they hold. Solid opaque blocks and unloaded chunks stop the spread.
///
/// Returns the number of cells written.
pub(crate) fn spread<W: ChunkLookup + ?Sized>(
    world: &mut W,
    channel: Channel,
    queue: &mut LightQueue,
    catalog: &BlockCatalog,
    dirty: &mut DirtySet,
) -> usize {
    let mut written = 0;
    while let Some((pos, level)) = queue.pop_front() {
        if level <= 1 {
            continue;
        }
        for dir in NEIGHBORS_6 {
            let npos = pos + dir;
            let Some((block, current)) = probe(world, npos, channel) else {
                continue;
            };
            if catalog.blocks_light(block) {
                continue;
            }
            let candidate = next_level(channel, level, dir);
            if candidate > current {
                write(world, npos, channel, candidate, dirty);
                queue.push_back((npos, candidate));
                written += 1;
            }
        }
    }
    written
}
