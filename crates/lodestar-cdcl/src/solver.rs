//! The solver state record and the CDCL search driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lodestar_base::lit::{vidx, Lit};
use lodestar_base::ProofSink;

use crate::bcp::Watch;
use crate::clause_db::{Clause, ClauseRef};
use crate::decision::Queue;
use crate::options::Options;
use crate::restart::{Avg, Ema};
use crate::stats::Stats;

/// The result of a SAT solve.
#[derive(Debug, Clone)]
pub enum SatResult {
    /// Satisfiable with a model; slot `i` holds the value of variable `i + 1`.
    Sat(Vec<bool>),
    /// Unsatisfiable.
    Unsat,
    /// Unknown (termination requested or a soft limit reached).
    Unknown(String),
}

impl SatResult {
    /// Returns the conventional numeric status code (10, 20, 0).
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Sat(_) => 10,
            Self::Unsat => 20,
            Self::Unknown(_) => 0,
        }
    }
}

/// Per-variable metadata.
#[derive(Debug, Clone, Default)]
pub(crate) struct Var {
    /// Clause that forced this assignment; `None` for decisions and unassigned.
    pub(crate) reason: Option<ClauseRef>,
    /// Decision level at which the variable was assigned.
    pub(crate) level: u32,
    /// Position in the trail when assigned.
    pub(crate) trail_pos: u32,
    /// Last-bumped sequence number, the VMTF priority.
    pub(crate) bumped: u64,
    /// VMTF intrusive-list neighbor toward the cold end (0 = none).
    pub(crate) prev: u32,
    /// VMTF intrusive-list neighbor toward the hot end (0 = none).
    pub(crate) next: u32,
    /// Marked during conflict analysis.
    pub(crate) seen: bool,
    /// Minimization memo.
    pub(crate) mark: Mark,
}

/// Memoization marks for learned-clause minimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Mark {
    #[default]
    None,
    Removable,
    Poison,
}

/// Per-decision-level bookkeeping on the control stack.
#[derive(Debug, Clone)]
pub(crate) struct Level {
    /// Trail length when this level was opened; the literal at this position
    /// is the level's decision.
    pub(crate) trail_begin: usize,
    /// Whether the level occurs in the learned clause under construction.
    pub(crate) seen: bool,
}

impl Level {
    pub(crate) fn new(trail_begin: usize) -> Self {
        Self { trail_begin, seen: false }
    }
}

/// Conflict thresholds for the next restart and reduce.
#[derive(Debug, Clone, Default)]
pub(crate) struct Limits {
    pub(crate) restart_conflicts: u64,
    pub(crate) block_conflicts: u64,
    pub(crate) reduce_conflicts: u64,
    /// Root-fixed variable count at the last reduce.
    pub(crate) reduce_fixed: u64,
    /// Conflict count at the last reduce; no new conflicts means the clause
    /// database has not changed and reduce is a no-op.
    pub(crate) reduce_at: u64,
}

/// Growing increments for the reduce interval and restart blocking.
#[derive(Debug, Clone, Default)]
pub(crate) struct Increments {
    pub(crate) reduce: u64,
    pub(crate) blocking: u64,
}

/// The CDCL solver: a single owning record passed explicitly to every
/// operation. The optional proof sink is an injected dependency.
pub struct Solver {
    /// Maximum variable index; variables are `1..=max_var`.
    pub(crate) max_var: usize,
    /// Variable table, 1-based (slot 0 unused).
    pub(crate) vtab: Vec<Var>,
    /// Current value of each positive literal, 1-based.
    pub(crate) vals: Vec<i8>,
    /// Saved phases for phase saving, 1-based, initialized to false.
    pub(crate) phases: Vec<i8>,
    /// Watch lists indexed by `vlit`.
    pub(crate) wtab: Vec<Vec<Watch>>,
    /// VMTF decision queue.
    pub(crate) queue: Queue,
    /// Monotonic bump sequence counter.
    pub(crate) stamp: u64,
    /// Set when the empty clause was found or learned.
    pub(crate) unsat: bool,
    /// Set when an ingested unit clashed with an existing root unit.
    pub(crate) clashing_unit: bool,
    /// Current decision level; `control.len() == level + 1`.
    pub(crate) level: usize,
    /// Per-level control stack; `control[0]` is the root frame.
    pub(crate) control: Vec<Level>,
    /// Assigned literals in chronological order.
    pub(crate) trail: Vec<Lit>,
    /// Next unprocessed trail position.
    pub(crate) propagated: usize,
    /// Temporary clause buffer shared by ingestion and learning.
    pub(crate) clause_buf: Vec<Lit>,
    /// Staging buffer for the `add_literal`/`finish_clause` interface.
    pub(crate) pending: Vec<Lit>,
    /// Clause arena; clauses are addressed by stable index.
    pub(crate) clauses: Vec<Clause>,
    /// Set when a new root-level unit should be reported.
    pub(crate) iterating: bool,
    /// Variables marked seen during the current conflict analysis.
    pub(crate) seen_vars: Vec<u32>,
    /// Decision levels occurring in the learned clause under construction.
    pub(crate) seen_levels: Vec<u32>,
    /// Variables carrying a minimization memo mark.
    pub(crate) minimized: Vec<u32>,
    /// Redundant clauses resolved during the current conflict analysis.
    pub(crate) resolved: Vec<ClauseRef>,
    /// Conflicting clause set by propagation, cleared by analysis.
    pub(crate) conflict: Option<ClauseRef>,
    /// Per-level stamps for glue computation.
    pub(crate) gstamps: Vec<u64>,
    pub(crate) gstamp: u64,
    /// Fast exponential moving average of learned-clause glue.
    pub(crate) fast_glue_avg: Ema,
    /// Slow exponential moving average of learned-clause glue.
    pub(crate) slow_glue_avg: Ema,
    /// Average backjump distance.
    pub(crate) jump_avg: Avg,
    /// Average trail size at conflicts, for restart blocking.
    pub(crate) trail_avg: Avg,
    pub(crate) limits: Limits,
    pub(crate) inc: Increments,
    pub(crate) opts: Options,
    pub(crate) stats: Stats,
    /// Optional clausal proof sink.
    pub(crate) proof: Option<Box<dyn ProofSink>>,
    /// Externally shared termination flag, polled by the search loop.
    pub(crate) terminate: Arc<AtomicBool>,
    /// Set once `solve` has returned; further ingestion is rejected.
    pub(crate) solved: bool,
}

impl Solver {
    /// Creates a new solver with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Creates a new solver with the given options.
    #[must_use]
    pub fn with_options(opts: Options) -> Self {
        Self {
            max_var: 0,
            vtab: Vec::new(),
            vals: Vec::new(),
            phases: Vec::new(),
            wtab: Vec::new(),
            queue: Queue::default(),
            stamp: 0,
            unsat: false,
            clashing_unit: false,
            level: 0,
            control: vec![Level::new(0)],
            trail: Vec::new(),
            propagated: 0,
            clause_buf: Vec::new(),
            pending: Vec::new(),
            clauses: Vec::new(),
            iterating: false,
            seen_vars: Vec::new(),
            seen_levels: Vec::new(),
            minimized: Vec::new(),
            resolved: Vec::new(),
            conflict: None,
            gstamps: Vec::new(),
            gstamp: 0,
            fast_glue_avg: Ema::new(opts.fast_glue_window),
            slow_glue_avg: Ema::new(opts.slow_glue_window),
            jump_avg: Avg::default(),
            trail_avg: Avg::default(),
            limits: Limits::default(),
            inc: Increments::default(),
            opts,
            stats: Stats::default(),
            proof: None,
            terminate: Arc::new(AtomicBool::new(false)),
            solved: false,
        }
    }

    /// Installs a clausal proof sink.
    pub fn connect_proof(&mut self, sink: Box<dyn ProofSink>) {
        self.proof = Some(sink);
    }

    /// Returns the shared termination flag. Setting it to `true` makes the
    /// search return [`SatResult::Unknown`] at the next loop iteration,
    /// leaving the solver in a consistent state.
    #[must_use]
    pub fn terminate_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate)
    }

    /// Returns the solver statistics.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Returns the solver options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Returns the maximum variable index.
    #[must_use]
    pub fn max_var(&self) -> usize {
        self.max_var
    }

    /// Returns the value of a literal: -1 false, 0 unassigned, +1 true.
    #[must_use]
    pub fn val(&self, lit: Lit) -> i8 {
        let idx = vidx(lit);
        debug_assert!(idx <= self.max_var);
        let res = self.vals[idx];
        if lit < 0 {
            -res
        } else {
            res
        }
    }

    /// As [`Solver::val`] but restricted to the root-level value; 0 if the
    /// variable is unassigned or assigned above the root.
    #[must_use]
    pub fn fixed(&self, lit: Lit) -> i8 {
        let idx = vidx(lit);
        debug_assert!(idx <= self.max_var);
        let mut res = self.vals[idx];
        if res != 0 && self.vtab[idx].level != 0 {
            res = 0;
        }
        if lit < 0 {
            -res
        } else {
            res
        }
    }

    /// Internal unchecked literal value.
    #[inline]
    pub(crate) fn value(&self, lit: Lit) -> i8 {
        let res = self.vals[vidx(lit)];
        if lit < 0 {
            -res
        } else {
            res
        }
    }

    /// Runs the CDCL search and returns the solve status.
    pub fn solve(&mut self) -> lodestar_base::Result<SatResult> {
        self.solved = true;
        self.init_solving();
        tracing::debug!(
            max_var = self.max_var,
            clauses = self.clauses.len(),
            "starting search"
        );
        let res = self.search();
        self.note_bytes();
        if let Some(proof) = self.proof.as_mut() {
            proof.finish()?;
        }
        tracing::debug!(
            conflicts = self.stats.conflicts,
            decisions = self.stats.decisions,
            restarts = self.stats.restarts,
            status = res.code(),
            "search finished"
        );
        Ok(res)
    }

    fn init_solving(&mut self) {
        self.limits.restart_conflicts =
            self.stats.conflicts + u64::from(self.opts.restart_interval);
        self.limits.block_conflicts =
            self.stats.conflicts + u64::from(self.opts.restart_interval);
        self.inc.blocking = 1;
        self.inc.reduce = u64::from(self.opts.reduce_interval);
        self.limits.reduce_conflicts = self.stats.conflicts + self.inc.reduce;
        self.limits.reduce_fixed = self.stats.fixed;
    }

    /// The CDCL loop.
    fn search(&mut self) -> SatResult {
        loop {
            if self.terminate.load(Ordering::Relaxed) {
                return SatResult::Unknown("termination requested".to_string());
            }
            if self.unsat {
                return SatResult::Unsat;
            }
            if !self.propagate() {
                if self.level == 0 {
                    self.learn_empty_clause();
                    return SatResult::Unsat;
                }
                self.analyze();
            } else if self.iterating {
                self.iterate();
            } else if self.satisfied() {
                return SatResult::Sat(self.extract_model());
            } else if self.conflict_limit_reached() {
                return SatResult::Unknown("conflict limit reached".to_string());
            } else if self.reducing() {
                self.reduce();
            } else if self.restarting() {
                self.restart();
            } else {
                self.decide();
            }
        }
    }

    fn conflict_limit_reached(&self) -> bool {
        self.opts
            .conflict_limit
            .is_some_and(|limit| self.stats.conflicts >= limit)
    }

    fn extract_model(&self) -> Vec<bool> {
        (1..=self.max_var).map(|idx| self.vals[idx] > 0).collect()
    }

    /// Pops all literals assigned above `target_level` and truncates the
    /// control stack. A backtrack to the current level is a no-op.
    pub(crate) fn backtrack(&mut self, target_level: usize) {
        debug_assert!(target_level <= self.level);
        let keep = if target_level < self.level {
            self.control[target_level + 1].trail_begin
        } else {
            self.trail.len()
        };
        while self.trail.len() > keep {
            if let Some(lit) = self.trail.pop() {
                self.unassign(lit);
            }
        }
        self.control.truncate(target_level + 1);
        self.level = target_level;
        self.propagated = self.trail.len();
        self.conflict = None;
    }

    fn unassign(&mut self, lit: Lit) {
        let idx = vidx(lit);
        debug_assert!(self.vals[idx] != 0);
        self.vals[idx] = 0;
        self.phases[idx] = if lit < 0 { -1 } else { 1 };
        self.vtab[idx].reason = None;
        if self.vtab[idx].bumped > self.queue.bumped {
            self.update_queue_unassigned(idx);
        }
    }

    /// Samples the current memory footprint into the peak counter.
    pub(crate) fn note_bytes(&mut self) {
        let current = self.stats.bytes_current;
        if current > self.stats.bytes_peak {
            self.stats.bytes_peak = current;
        }
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
