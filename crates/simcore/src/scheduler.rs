//! LOD-tier update scheduling.
//!
//! Active chunks are bucketed into per-tier queues on a fixed cadence:
//! Near every step, Medium every 4th, Far every 16th — a 1:4:16 update
//! frequency ratio. Queues are transient and rebuilt each cycle; overflow
//! beyond a queue's capacity is skipped for that cycle, which at worst makes
//! a distant chunk lag one extra cycle.

use log::trace;

use crate::chunk::LodTier;
use crate::config::{
    FAR_INTERVAL, FAR_QUEUE_CAPACITY, MEDIUM_INTERVAL, MEDIUM_QUEUE_CAPACITY, NEAR_QUEUE_CAPACITY,
};
use crate::world::WorldGrid;

pub struct LodQueues {
    pub near: Vec<u32>,
    pub medium: Vec<u32>,
    pub far: Vec<u32>,
}

impl Default for LodQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl LodQueues {
    pub fn new() -> Self {
        Self {
            near: Vec::with_capacity(NEAR_QUEUE_CAPACITY),
            medium: Vec::with_capacity(MEDIUM_QUEUE_CAPACITY),
            far: Vec::with_capacity(FAR_QUEUE_CAPACITY),
        }
    }

    /// Rebuild the queues for this tick from the world's active list.
    pub fn schedule(&mut self, world: &WorldGrid, tick: u64) {
        self.near.clear();
        self.medium.clear();
        self.far.clear();

        let medium_due = tick.is_multiple_of(MEDIUM_INTERVAL);
        let far_due = tick.is_multiple_of(FAR_INTERVAL);

        for &idx in world.active_chunks() {
            match world.chunk(idx).lod {
                LodTier::Near => push_capped(&mut self.near, idx, NEAR_QUEUE_CAPACITY, "near"),
                LodTier::Medium if medium_due => {
                    push_capped(&mut self.medium, idx, MEDIUM_QUEUE_CAPACITY, "medium")
                }
                LodTier::Far if far_due => {
                    push_capped(&mut self.far, idx, FAR_QUEUE_CAPACITY, "far")
                }
                _ => {}
            }
        }
    }

    /// Total chunks due this cycle.
    pub fn total(&self) -> usize {
        self.near.len() + self.medium.len() + self.far.len()
    }

    /// All due chunk indices, Near first. Each chunk appears at most once
    /// since it belongs to exactly one tier.
    pub fn due(&self) -> impl Iterator<Item = u32> + '_ {
        self.near
            .iter()
            .chain(self.medium.iter())
            .chain(self.far.iter())
            .copied()
    }
}

fn push_capped(queue: &mut Vec<u32>, idx: u32, capacity: usize, tier: &str) {
    if queue.len() < capacity {
        queue.push(idx);
    } else {
        // Non-fatal by design: the chunk catches up next cycle.
        trace!("{} queue full, skipping chunk {} this cycle", tier, idx);
    }
}
