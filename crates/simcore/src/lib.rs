//! Deterministic chunked simulation core for a tile-based city.
//!
//! The world is a bounded grid of 16x16-tile chunks. A fixed-timestep
//! driver ([`Simulation`]) advances it at a configurable rate, a
//! camera-driven classifier assigns each chunk a level-of-detail tier, and
//! a scheduler updates the tiers on a 1:4:16 cadence. Chunk updates are
//! dirty-driven and can be fanned out to an injected worker pool over
//! disjoint chunk ranges; per-tile seeded RNG keeps results identical with
//! or without threads.
//!
//! The crate is engine-agnostic: no rendering, no I/O, no threads of its
//! own. Callers inject a clock, an optional worker pool, and the per-tile
//! simulation hooks.

pub mod chunk;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod perf;
pub mod scheduler;
pub mod sim_rng;
pub mod tile;
pub mod updater;
pub mod visibility;
pub mod world;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;


pub use chunk::{Chunk, ChunkStats, DirtyMask, LodTier};
pub use dispatch::{Job, JobHandle, WorkerPool};
pub use driver::{CalendarHook, MonotonicClock, SimClock, SimConfig, Simulation};
pub use error::SimError;
pub use perf::{PerfStats, WorldStats};
pub use scheduler::LodQueues;
pub use sim_rng::SimRng;
pub use tile::{ServiceKind, Tile, TileKind, ZoneKind};
pub use updater::{DefaultHooks, TileHooks};
pub use visibility::Camera;
pub use world::WorldGrid;
