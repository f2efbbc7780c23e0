//! Solver statistics and memory accounting.

use serde::Serialize;

/// Counters maintained by the search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    /// Number of conflicts encountered.
    pub conflicts: u64,
    /// Number of decisions made.
    pub decisions: u64,
    /// Number of trail literals propagated.
    pub propagations: u64,
    /// Number of restarts performed.
    pub restarts: u64,
    /// Number of restarts suppressed by trail-size blocking.
    pub blocked_restarts: u64,
    /// Number of clause-database reductions.
    pub reductions: u64,
    /// Number of clauses freed by reductions.
    pub collected: u64,
    /// Number of learned clauses.
    pub learned: u64,
    /// Number of learned unit clauses.
    pub units: u64,
    /// Number of root-level assigned variables.
    pub fixed: u64,
    /// Number of clauses resolved during conflict analysis.
    pub resolved: u64,
    /// Number of variable bumps in the VMTF queue.
    pub bumped: u64,
    /// Number of literals removed by learned-clause minimization.
    pub minimized: u64,
    /// Number of root-level unit reports.
    pub iterations: u64,
    /// Bytes currently allocated to clauses, watches and variable tables.
    pub bytes_current: usize,
    /// Running maximum of `bytes_current`.
    pub bytes_peak: usize,
}

impl Stats {
    pub(crate) fn inc_bytes(&mut self, bytes: usize) {
        self.bytes_current += bytes;
        if self.bytes_current > self.bytes_peak {
            self.bytes_peak = self.bytes_current;
        }
    }

    pub(crate) fn dec_bytes(&mut self, bytes: usize) {
        debug_assert!(self.bytes_current >= bytes);
        self.bytes_current = self.bytes_current.saturating_sub(bytes);
    }
}
