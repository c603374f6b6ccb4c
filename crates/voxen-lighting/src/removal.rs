//! Incremental light repair: retract light from a cell, or reopen light into
//! a cell that stopped blocking it.
//!
//! Removal runs in two phases. The first clears every cell whose light could
//! have come from the retracted cell and collects the still-valid sources at
//! the edge of the cleared region. The second refills the region from those
//! sources with the ordinary spread.

use std::collections::VecDeque;

use glam::IVec3;
use voxen_voxel::{BlockCatalog, MAX_LIGHT};

use crate::lookup::{Channel, ChunkLookup, DirtySet, NEIGHBORS_6, probe, write};
use crate::propagate::{LightQueue, next_level, spread};

/// Retracts the sunlight held at `pos` and everything that depended on it.
pub fn remove_sunlight<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    catalog: &BlockCatalog,
) -> DirtySet {
    remove(world, pos, Channel::Sun, catalog)
}

/// Retracts the block light held at `pos` and everything that depended on it.
///
/// Emitters inside the cleared region keep their own emission and light the
/// region back up during the refill.
pub fn remove_block_light<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    catalog: &BlockCatalog,
) -> DirtySet {
    remove(world, pos, Channel::Block, catalog)
}

/// Reopens sunlight into `pos` after it stopped blocking light.
///
/// The cell inherits from the one above it (full sun passes down unchanged,
/// anything weaker loses a level) and then spreads together with every lit
/// neighbor. Above the loaded world counts as open sky.
pub fn recalculate_sunlight<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    catalog: &BlockCatalog,
) -> DirtySet {
    let inherited = match probe(world, pos + IVec3::Y, Channel::Sun) {
        Some((_, above)) => next_level(Channel::Sun, above, IVec3::NEG_Y),
        None => MAX_LIGHT,
    };
    recalculate(world, pos, Channel::Sun, inherited, catalog)
}

/// Reopens block light into `pos` from its lit neighbors, and from the block
/// at `pos` itself when it emits.
pub fn recalculate_block_light<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    catalog: &BlockCatalog,
) -> DirtySet {
    let emission = probe(world, pos, Channel::Block)
        .map(|(block, _)| catalog.emission(block))
        .unwrap_or(0);
    recalculate(world, pos, Channel::Block, emission, catalog)
}

fn remove<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    channel: Channel,
    catalog: &BlockCatalog,
) -> DirtySet {
    let mut dirty = DirtySet::default();
    let Some((block, level)) = probe(world, pos, channel) else {
        return dirty;
    };

    let mut removal: VecDeque<(IVec3, u8)> = VecDeque::new();
    let mut refill = LightQueue::new();

    write(world, pos, channel, 0, &mut dirty);
    removal.push_back((pos, level));
    reseed_emitter(world, pos, block, channel, catalog, &mut refill, &mut dirty);

    let mut cleared = 1usize;
    while let Some((p, lvl)) = removal.pop_front() {
        for dir in NEIGHBORS_6 {
            let n = p + dir;
            let Some((nblock, nl)) = probe(world, n, channel) else {
                continue;
            };
            if nl == 0 {
                continue;
            }
            let shaft = channel == Channel::Sun
                && dir == IVec3::NEG_Y
                && lvl == MAX_LIGHT
                && nl == MAX_LIGHT;
            if nl < lvl || shaft {
                write(world, n, channel, 0, &mut dirty);
                removal.push_back((n, nl));
                reseed_emitter(world, n, nblock, channel, catalog, &mut refill, &mut dirty);
                cleared += 1;
            } else {
                refill.push_back((n, nl));
            }
        }
    }

    // Sources collected early may have been cleared later in the phase.
    let mut refill: LightQueue = refill
        .into_iter()
        .filter_map(|(p, _)| probe(world, p, channel).map(|(_, l)| (p, l)))
        .filter(|&(_, l)| l > 0)
        .collect();
    let refilled = spread(world, channel, &mut refill, catalog, &mut dirty);
    tracing::trace!(
        "{:?} removal at {:?}: {} cleared, {} refilled, {} chunks changed",
        channel,
        pos,
        cleared,
        refilled,
        dirty.len()
    );
    dirty
}

/// Restores an emitter's own level after removal cleared it.
fn reseed_emitter<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    block: u8,
    channel: Channel,
    catalog: &BlockCatalog,
    refill: &mut LightQueue,
    dirty: &mut DirtySet,
) {
    if channel != Channel::Block {
        return;
    }
    let emission = catalog.emission(block);
    if emission > 0 {
        write(world, pos, channel, emission, dirty);
        refill.push_back((pos, emission));
    }
}

fn recalculate<W: ChunkLookup + ?Sized>(
    world: &mut W,
    pos: IVec3,
    channel: Channel,
    own: u8,
    catalog: &BlockCatalog,
) -> DirtySet {
    let mut dirty = DirtySet::default();
    let Some((block, current)) = probe(world, pos, channel) else {
        return dirty;
    };
    if catalog.blocks_light(block) && (channel == Channel::Sun || own == 0) {
        return dirty;
    }

    let mut queue = LightQueue::new();
    if own > current {
        write(world, pos, channel, own, &mut dirty);
    }
    let start = own.max(current);
    if start > 0 {
        queue.push_back((pos, start));
    }
    for dir in NEIGHBORS_6 {
        if let Some((_, nl)) = probe(world, pos + dir, channel)
            && nl > 0
        {
            queue.push_back((pos + dir, nl));
        }
    }

    spread(world, channel, &mut queue, catalog, &mut dirty);
    tracing::trace!(
        "{:?} recalculated at {:?}: level {}, {} chunks changed",
        channel,
        pos,
        start,
        dirty.len()
    );
    dirty
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
