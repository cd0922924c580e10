//! Step timing and world aggregate statistics.

use serde::{Deserialize, Serialize};

/// Whole-world aggregate of the cached per-chunk stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorldStats {
    pub population: u64,
    pub jobs: u64,
    pub tax_revenue: u64,
}

/// Wall-clock accounting for executed simulation steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PerfStats {
    pub total_steps: u64,
    /// Times the step budget was exhausted with backlog remaining.
    pub overload_events: u64,
    min_step_ns: u64,
    max_step_ns: u64,
    sum_step_ns: u64,
}

impl PerfStats {
    pub(crate) fn record_step(&mut self, elapsed_ns: u64) {
        if self.total_steps == 0 || elapsed_ns < self.min_step_ns {
            self.min_step_ns = elapsed_ns;
        }
        if elapsed_ns > self.max_step_ns {
            self.max_step_ns = elapsed_ns;
        }
        self.sum_step_ns += elapsed_ns;
        self.total_steps += 1;
    }

    /// Shortest recorded step, 0 before any step has run.
    pub fn min_step_ns(&self) -> u64 {
        self.min_step_ns
    }

    /// Longest recorded step, 0 before any step has run.
    pub fn max_step_ns(&self) -> u64 {
        self.max_step_ns
    }

    /// Mean step duration, 0 before any step has run.
    pub fn avg_step_ns(&self) -> u64 {
        if self.total_steps == 0 {
            0
        } else {
            self.sum_step_ns / self.total_steps
        }
    }
}
