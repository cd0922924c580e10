//! Compile-time tuning constants for the simulation core.

/// Tiles along one edge of a chunk.
pub const CHUNK_SIZE: usize = 16;
/// Tiles per chunk (16 x 16).
pub const TILES_PER_CHUNK: usize = CHUNK_SIZE * CHUNK_SIZE;
/// Hard cap on either world axis, in tiles.
pub const MAX_WORLD_DIM: u32 = 16_384;

/// Default fixed-step rate in Hz.
pub const DEFAULT_TICK_RATE: f64 = 30.0;
/// Maximum catch-up steps executed within a single `tick()` call.
pub const MAX_STEPS_PER_TICK: u32 = 5;
/// On overload the accumulator is clamped to this many frame times.
pub const ACCUMULATOR_CLAMP_FRAMES: u64 = 2;
/// Fraction of Medium-tier active chunks demoted to Far on overload.
pub const DEFAULT_DEMOTION_FRACTION: f32 = 0.25;

/// Medium-tier chunks are scheduled when the tick is a multiple of this.
pub const MEDIUM_INTERVAL: u64 = 4;
/// Far-tier chunks are scheduled when the tick is a multiple of this.
pub const FAR_INTERVAL: u64 = 16;
/// Reclassification cadence (ticks) while the camera is stationary.
pub const CLASSIFY_INTERVAL: u64 = 16;
/// Calendar hook cadence: one invocation per simulated second at 30 Hz.
pub const CALENDAR_INTERVAL: u64 = 30;

/// Per-cycle capacity of the Near update queue.
pub const NEAR_QUEUE_CAPACITY: usize = 1024;
/// Per-cycle capacity of the Medium update queue.
pub const MEDIUM_QUEUE_CAPACITY: usize = 2048;
/// Per-cycle capacity of the Far update queue.
pub const FAR_QUEUE_CAPACITY: usize = 4096;

/// Service-coverage channels carried per tile.
pub const SERVICE_CHANNELS: usize = 7;
