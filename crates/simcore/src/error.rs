//! Startup error taxonomy.
//!
//! Only bring-up can fail: bad world dimensions or a degenerate tick rate
//! abort construction with no partial state. Steady-state conditions
//! (out-of-bounds lookups, queue overflow, overload) are sentinels or
//! counted events, never errors — the core must not halt mid-frame.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid world dimensions {width}x{height} (each axis must be 1..={max} tiles)")]
    InvalidDimensions { width: u32, height: u32, max: u32 },

    #[error("invalid tick rate {0} Hz (must be finite and positive)")]
    InvalidTickRate(f64),
}
