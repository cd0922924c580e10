//! Fixed-timestep driver.
//!
//! [`Simulation`] is the explicit context object for one independent
//! simulation: it owns the world, the scheduler, the injected clock and
//! worker pool, and all accounting. There is no process-wide state, so
//! multiple simulations can coexist and tests stay isolated.
//!
//! `tick()` accumulates real time and runs zero or more fixed-size steps,
//! so simulation output depends only on total elapsed time, never on how
//! frames happen to be paced. Leftover accumulator time becomes the render
//! interpolation alpha.

use std::time::Instant;

use log::{info, warn};

use crate::config::{
    ACCUMULATOR_CLAMP_FRAMES, CALENDAR_INTERVAL, CLASSIFY_INTERVAL, DEFAULT_DEMOTION_FRACTION,
    DEFAULT_TICK_RATE, MAX_STEPS_PER_TICK,
};
use crate::dispatch::{update_chunks, WorkerPool};
use crate::error::SimError;
use crate::perf::{PerfStats, WorldStats};
use crate::scheduler::LodQueues;
use crate::sim_rng::DEFAULT_SEED;
use crate::updater::{DefaultHooks, TileHooks};
use crate::visibility::{classify, demote_medium_chunks, Camera};
use crate::world::WorldGrid;

/// Monotonic time source consumed by the driver.
pub trait SimClock: Send {
    fn now_ns(&mut self) -> u64;
}

/// Default clock backed by `std::time::Instant`.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock for MonotonicClock {
    fn now_ns(&mut self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Startup configuration for one simulation context.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// World width in tiles.
    pub width: u32,
    /// World height in tiles.
    pub height: u32,
    /// Fixed-step rate in Hz.
    pub tick_rate: f64,
    /// Seed for all simulation randomness.
    pub seed: u64,
    /// Catch-up step budget per `tick()` call.
    pub max_steps_per_tick: u32,
    /// Fraction of Medium chunks demoted to Far on overload.
    pub demotion_fraction: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            tick_rate: DEFAULT_TICK_RATE,
            seed: DEFAULT_SEED,
            max_steps_per_tick: MAX_STEPS_PER_TICK,
            demotion_fraction: DEFAULT_DEMOTION_FRACTION,
        }
    }
}

/// Periodic hook into the external calendar/time-of-day system.
pub type CalendarHook = Box<dyn FnMut(u64) + Send>;

pub struct Simulation {
    world: WorldGrid,
    queues: LodQueues,
    clock: Box<dyn SimClock>,
    pool: Option<Box<dyn WorkerPool>>,
    hooks: Box<dyn TileHooks>,
    calendar: Option<CalendarHook>,

    camera: Option<Camera>,
    camera_moved: bool,

    paused: bool,
    tick_count: u64,
    frame_time_ns: u64,
    accumulator_ns: u64,
    last_time_ns: Option<u64>,
    max_steps: u32,
    demotion_fraction: f32,
    seed: u64,

    perf: PerfStats,
    world_stats: WorldStats,
}

fn frame_time_from_rate(rate: f64) -> Result<u64, SimError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(SimError::InvalidTickRate(rate));
    }
    let ns = (1e9 / rate) as u64;
    if ns == 0 {
        return Err(SimError::InvalidTickRate(rate));
    }
    Ok(ns)
}

impl Simulation {
    /// Build a simulation with the default clock, no worker pool, and the
    /// stand-in tile hooks.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        Self::with_parts(
            config,
            Box::new(MonotonicClock::new()),
            None,
            Box::new(DefaultHooks),
        )
    }

    /// Build a simulation with injected collaborators. Fails on degenerate
    /// dimensions or tick rate with no partial state left behind.
    pub fn with_parts(
        config: SimConfig,
        clock: Box<dyn SimClock>,
        pool: Option<Box<dyn WorkerPool>>,
        hooks: Box<dyn TileHooks>,
    ) -> Result<Self, SimError> {
        let frame_time_ns = frame_time_from_rate(config.tick_rate)?;
        let world = WorldGrid::new(config.width, config.height)?;

        info!(
            "simulation ready: {}x{} tiles at {} Hz ({} workers)",
            config.width,
            config.height,
            config.tick_rate,
            pool.as_ref().map_or(0, |p| p.worker_count())
        );

        Ok(Self {
            world,
            queues: LodQueues::new(),
            clock,
            pool,
            hooks,
            calendar: None,
            camera: None,
            camera_moved: false,
            paused: false,
            tick_count: 0,
            frame_time_ns,
            accumulator_ns: 0,
            last_time_ns: None,
            max_steps: config.max_steps_per_tick.max(1),
            demotion_fraction: config.demotion_fraction,
            seed: config.seed,
            perf: PerfStats::default(),
            world_stats: WorldStats::default(),
        })
    }

    /// Advance real time and run any fixed steps that became due. Returns
    /// the render interpolation alpha in 0..=1.
    pub fn tick(&mut self) -> f32 {
        let now = self.clock.now_ns();
        let delta = match self.last_time_ns {
            Some(prev) => now.saturating_sub(prev),
            None => 0,
        };
        self.last_time_ns = Some(now);

        // While paused the clock reference keeps advancing so resume does
        // not see one huge delta, but no time is accumulated and no steps
        // run.
        if self.paused {
            return self.alpha();
        }
        self.accumulator_ns += delta;

        let mut steps = 0;
        while self.accumulator_ns >= self.frame_time_ns && steps < self.max_steps {
            let started = Instant::now();
            self.step();
            self.perf.record_step(started.elapsed().as_nanos() as u64);
            self.accumulator_ns -= self.frame_time_ns;
            steps += 1;
        }

        if steps == self.max_steps && self.accumulator_ns >= self.frame_time_ns {
            self.handle_overload();
        }

        self.alpha()
    }

    fn alpha(&self) -> f32 {
        (self.accumulator_ns as f32 / self.frame_time_ns as f32).clamp(0.0, 1.0)
    }

    /// One deterministic simulation step.
    fn step(&mut self) {
        self.tick_count += 1;
        let tick = self.tick_count;

        if let Some(camera) = self.camera {
            if self.camera_moved || tick.is_multiple_of(CLASSIFY_INTERVAL) {
                classify(&mut self.world, camera);
                self.camera_moved = false;
            }
        }

        self.queues.schedule(&self.world, tick);
        update_chunks(
            &mut self.world,
            &self.queues,
            tick,
            self.hooks.as_ref(),
            self.seed,
            self.pool.as_deref(),
        );
        // Dispatch has joined all jobs; this single-threaded pass sees
        // fully written chunk stats.
        self.world_stats = self.world.aggregate_stats();

        if tick.is_multiple_of(CALENDAR_INTERVAL) {
            if let Some(hook) = self.calendar.as_mut() {
                hook(tick);
            }
        }
    }

    /// Spiral-of-death containment: drop backlog beyond two frames and
    /// reduce update quality at distance. A throttling event, not an error.
    fn handle_overload(&mut self) {
        let clamp = ACCUMULATOR_CLAMP_FRAMES * self.frame_time_ns;
        let dropped = self.accumulator_ns.saturating_sub(clamp);
        if dropped > 0 {
            self.accumulator_ns = clamp;
        }
        self.perf.overload_events += 1;
        let demoted = demote_medium_chunks(&mut self.world, self.demotion_fraction);
        warn!(
            "simulation overloaded: dropped {} ns of backlog, demoted {} chunks to far tier",
            dropped, demoted
        );
    }

    /// Move the camera; the next step reclassifies immediately.
    pub fn set_camera(&mut self, tile_x: i32, tile_y: i32, view_distance_tiles: u32) {
        let camera = Camera {
            tile_x,
            tile_y,
            view_distance: view_distance_tiles,
        };
        if self.camera != Some(camera) {
            self.camera = Some(camera);
            self.camera_moved = true;
        }
    }

    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Change the fixed-step rate. The accumulator is preserved.
    pub fn set_tick_rate(&mut self, hz: f64) -> Result<(), SimError> {
        self.frame_time_ns = frame_time_from_rate(hz)?;
        Ok(())
    }

    /// Register the periodic calendar hook, replacing any previous one.
    pub fn on_calendar(&mut self, hook: CalendarHook) {
        self.calendar = Some(hook);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn frame_time_ns(&self) -> u64 {
        self.frame_time_ns
    }

    pub fn perf(&self) -> &PerfStats {
        &self.perf
    }

    /// Aggregate stats as of the end of the last step.
    pub fn stats(&self) -> WorldStats {
        self.world_stats
    }

    pub fn world(&self) -> &WorldGrid {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldGrid {
        &mut self.world
    }

    /// Chunks within the render radius, for the renderer.
    pub fn visible_chunks(&self) -> &[u32] {
        self.world.visible_chunks()
    }
}
