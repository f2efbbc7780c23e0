//! Restart policy driven by fast/slow glue moving averages.
//!
//! A restart fires when the fast glue average exceeds the slow one by a
//! configured margin, unless the trail has grown well past its recent
//! average (the assignment looks productive, so the restart is blocked).
//! Restarts reuse the trail prefix that the next decision would reproduce.

use lodestar_base::lit::vidx;

use crate::solver::Solver;

/// Exponential moving average with a geometric ramp-up so early samples are
/// weighted like a plain average until the configured window is reached.
#[derive(Debug, Clone)]
pub(crate) struct Ema {
    value: f64,
    alpha: f64,
    beta: f64,
    wait: u64,
    period: u64,
}

impl Ema {
    pub(crate) fn new(window: u32) -> Self {
        Self {
            value: 0.0,
            alpha: 1.0 / f64::from(window.max(1)),
            beta: 1.0,
            wait: 0,
            period: 0,
        }
    }

    pub(crate) fn get(&self) -> f64 {
        self.value
    }

    pub(crate) fn update(&mut self, y: f64) {
        self.value += self.beta * (y - self.value);
        if self.beta <= self.alpha {
            return;
        }
        if self.wait > 0 {
            self.wait -= 1;
            return;
        }
        self.period = 2 * (self.period + 1) - 1;
        self.wait = self.period;
        self.beta *= 0.5;
        if self.beta < self.alpha {
            self.beta = self.alpha;
        }
    }
}

/// Plain running average.
#[derive(Debug, Clone, Default)]
pub(crate) struct Avg {
    value: f64,
    count: u64,
}

impl Avg {
    pub(crate) fn get(&self) -> f64 {
        self.value
    }

    pub(crate) fn update(&mut self, y: f64) {
        self.count += 1;
        self.value += (y - self.value) / self.count as f64;
    }
}

impl Solver {
    /// Whether a restart should happen now. Each check advances the next
    /// restart threshold by the configured interval.
    pub(crate) fn restarting(&mut self) -> bool {
        debug_assert!(self.conflict.is_none());
        if self.stats.conflicts < self.limits.restart_conflicts {
            return false;
        }
        self.limits.restart_conflicts =
            self.stats.conflicts + u64::from(self.opts.restart_interval);
        if self.fast_glue_avg.get() <= self.opts.restart_margin * self.slow_glue_avg.get() {
            return false;
        }
        !self.restart_blocked()
    }

    /// Suppresses a due restart while the trail is much larger than its
    /// recent average; each block backs off for a growing number of
    /// conflicts.
    fn restart_blocked(&mut self) -> bool {
        if self.stats.conflicts < self.limits.block_conflicts {
            return false;
        }
        if (self.trail.len() as f64) <= self.opts.restart_block_margin * self.trail_avg.get() {
            return false;
        }
        self.inc.blocking += 1;
        self.limits.block_conflicts =
            self.stats.conflicts + self.inc.blocking * u64::from(self.opts.restart_interval);
        self.stats.blocked_restarts += 1;
        tracing::trace!(
            trail = self.trail.len(),
            avg = self.trail_avg.get(),
            "restart blocked"
        );
        true
    }

    /// Largest prefix of decision levels the next decision would reproduce:
    /// every level whose decision variable is hotter than the variable the
    /// next decision would pick survives the restart.
    fn reuse_trail(&mut self) -> usize {
        let next = self.next_decision_variable();
        let limit = self.vtab[next].bumped;
        let mut target = 0;
        for level in 1..=self.level {
            let decision = self.trail[self.control[level].trail_begin];
            if self.vtab[vidx(decision)].bumped <= limit {
                break;
            }
            target = level;
        }
        target
    }

    /// Backtracks to the reusable trail prefix.
    pub(crate) fn restart(&mut self) {
        self.stats.restarts += 1;
        let target = self.reuse_trail();
        tracing::debug!(
            conflicts = self.stats.conflicts,
            level = self.level,
            reused = target,
            "restart"
        );
        self.backtrack(target);
    }
}
