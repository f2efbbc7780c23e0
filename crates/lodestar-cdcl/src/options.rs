//! Solver configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the CDCL engine.
///
/// Every option is a scalar with a documented range and default. Options are
/// read at construction time and stay fixed for the lifetime of a solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Base growth for the reduce conflict threshold (>= 0).
    pub reduce_interval: u32,
    /// Conflicts between restart checks (>= 0).
    pub restart_interval: u32,
    /// Fast/slow glue EMA ratio above which a restart fires (>= 1.0).
    pub restart_margin: f64,
    /// Trail-size ratio above which a restart is blocked (>= 1.0).
    pub restart_block_margin: f64,
    /// Step-count window of the fast glue moving average.
    pub fast_glue_window: u32,
    /// Step-count window of the slow glue moving average.
    pub slow_glue_window: u32,
    /// Enable learned-clause minimization.
    pub minimize: bool,
    /// Recursion depth limit of learned-clause minimization.
    pub minimize_depth: u32,
    /// Enable phase saving; when disabled every decision assigns false.
    pub phase_saving: bool,
    /// Tie-break seed, reserved for randomized extensions.
    pub seed: u64,
    /// Soft cap on conflicts; exceeding it ends the search with unknown.
    pub conflict_limit: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reduce_interval: 300,
            restart_interval: 50,
            restart_margin: 1.25,
            restart_block_margin: 1.4,
            fast_glue_window: 33,
            slow_glue_window: 100_000,
            minimize: true,
            minimize_depth: 1000,
            phase_saving: true,
            seed: 0,
            conflict_limit: None,
        }
    }
}
