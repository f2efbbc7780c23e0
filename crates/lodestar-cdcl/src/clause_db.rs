//! Clause storage and original-clause ingestion.
//!
//! Clauses live in a single arena and are addressed by stable index, so
//! reason bookkeeping survives compaction with a one-pass index rewrite.

use lodestar_base::lit::{valid, vidx, Lit};
use lodestar_base::{Error, Result};

/// Stable arena index of a clause.
pub(crate) type ClauseRef = u32;

/// A stored clause. Units are absorbed into the trail and never stored, so
/// every stored clause has at least two literals; the first two are watched.
#[derive(Debug, Clone)]
pub(crate) struct Clause {
    /// Learned (eligible for reduction) versus original.
    pub(crate) redundant: bool,
    /// Scheduled for collection.
    pub(crate) garbage: bool,
    /// Referenced as an antecedent on the trail; protects from collection.
    pub(crate) reason: bool,
    /// Touched by conflict analysis in the current reduce epoch.
    pub(crate) used: bool,
    /// Number of distinct decision levels among the literals at creation.
    pub(crate) glue: u32,
    pub(crate) lits: Vec<Lit>,
}

impl Clause {
    pub(crate) fn len(&self) -> usize {
        self.lits.len()
    }
}

/// Approximate heap footprint of a clause record, including its two watch
/// entries.
pub(crate) fn bytes_clause(size: usize) -> usize {
    std::mem::size_of::<Clause>()
        + size * std::mem::size_of::<Lit>()
        + 2 * std::mem::size_of::<crate::bcp::Watch>()
}

impl crate::solver::Solver {
    /// Sets the variable count and allocates all per-variable tables.
    ///
    /// Must be called before any clause is added. Calling it again with the
    /// same count is a no-op; shrinking or growing afterwards is rejected.
    pub fn reserve(&mut self, max_var: usize) -> Result<()> {
        if self.max_var == max_var {
            return Ok(());
        }
        if self.max_var != 0 || !self.clauses.is_empty() || !self.trail.is_empty() {
            return Err(Error::InvalidState(
                "variable tables are already initialized",
            ));
        }
        self.max_var = max_var;
        self.vtab = vec![crate::solver::Var::default(); max_var + 1];
        self.vals = vec![0i8; max_var + 1];
        self.phases = vec![-1i8; max_var + 1];
        self.wtab = vec![Vec::new(); 2 * (max_var + 1)];
        self.gstamps = vec![0u64; max_var + 1];
        self.init_queue();
        let table_bytes = (max_var + 1)
            * (std::mem::size_of::<crate::solver::Var>()
                + 2 * std::mem::size_of::<i8>()
                + std::mem::size_of::<u64>()
                + 2 * std::mem::size_of::<Vec<crate::bcp::Watch>>());
        self.stats.inc_bytes(table_bytes);
        Ok(())
    }

    /// Buffers one literal of a clause under construction; `0` terminates
    /// the clause as in DIMACS.
    pub fn add_literal(&mut self, lit: Lit) -> Result<()> {
        if lit == 0 {
            return self.finish_clause();
        }
        if !valid(lit, self.max_var) {
            return Err(Error::InvalidLiteral(lit));
        }
        self.pending.push(lit);
        Ok(())
    }

    /// Finishes the clause accumulated through [`Solver::add_literal`].
    pub fn finish_clause(&mut self) -> Result<()> {
        let lits = std::mem::take(&mut self.pending);
        let res = self.add_original_clause(&lits);
        self.pending = lits;
        self.pending.clear();
        res
    }

    /// Ingests one original clause.
    ///
    /// The clause is normalized (sorted, duplicates dropped, tautologies
    /// discarded) and simplified against the root-level assignment before it
    /// is stored or, for units, absorbed into the trail.
    pub fn add_original_clause(&mut self, lits: &[Lit]) -> Result<()> {
        if self.solved {
            return Err(Error::InvalidState(
                "clauses cannot be added after solving",
            ));
        }
        debug_assert_eq!(self.level, 0);
        for &lit in lits {
            if !valid(lit, self.max_var) {
                return Err(Error::InvalidLiteral(lit));
            }
        }
        self.clause_buf.clear();
        self.clause_buf.extend_from_slice(lits);
        // Normalize so both polarities of a variable are adjacent.
        self.clause_buf
            .sort_unstable_by_key(|&lit| (vidx(lit), lit < 0));
        self.clause_buf.dedup();
        if self.tautological_clause() {
            tracing::trace!(?lits, "dropping tautological clause");
            return Ok(());
        }
        // Apply root-level values.
        let normalized_size = self.clause_buf.len();
        let mut satisfied = false;
        let mut kept = 0;
        for i in 0..self.clause_buf.len() {
            let lit = self.clause_buf[i];
            match self.value(lit) {
                1 => {
                    satisfied = true;
                    break;
                }
                -1 => {}
                _ => {
                    self.clause_buf[kept] = lit;
                    kept += 1;
                }
            }
        }
        if satisfied {
            tracing::trace!(?lits, "dropping root-satisfied clause");
            return Ok(());
        }
        self.clause_buf.truncate(kept);
        match self.clause_buf.len() {
            0 => {
                if !self.unsat {
                    if normalized_size == 1 {
                        tracing::debug!(
                            unit = lits[0],
                            "unit clause clashes with root assignment"
                        );
                        self.clashing_unit = true;
                    } else {
                        tracing::debug!("original clause is empty under root assignment");
                    }
                    self.unsat = true;
                }
            }
            1 => {
                let unit = self.clause_buf[0];
                self.assign(unit, None);
                tracing::trace!(unit, "original unit clause");
            }
            _ => {
                let cref = self.new_clause(false, 0);
                self.watch_clause(cref);
            }
        }
        Ok(())
    }

    /// Detects `l` and `-l` in the normalized temporary buffer.
    pub(crate) fn tautological_clause(&self) -> bool {
        self.clause_buf
            .windows(2)
            .any(|pair| pair[0] == -pair[1])
    }

    /// Allocates a clause from the temporary buffer.
    pub(crate) fn new_clause(&mut self, redundant: bool, glue: u32) -> ClauseRef {
        debug_assert!(self.clause_buf.len() >= 2);
        let lits = self.clause_buf.clone();
        self.stats.inc_bytes(bytes_clause(lits.len()));
        let cref = self.clauses.len() as ClauseRef;
        self.clauses.push(Clause {
            redundant,
            garbage: false,
            reason: false,
            used: false,
            glue,
            lits,
        });
        cref
    }

    /// Allocates a learned clause, installs its watches and traces it.
    pub(crate) fn new_learned_clause(&mut self, glue: u32) -> ClauseRef {
        let cref = self.new_clause(true, glue);
        self.watch_clause(cref);
        if self.proof.is_some() {
            let lits = self.clauses[cref as usize].lits.clone();
            if let Some(proof) = self.proof.as_mut() {
                proof.add_clause(&lits);
            }
        }
        tracing::trace!(
            cref,
            glue,
            size = self.clauses[cref as usize].len(),
            "learned clause"
        );
        cref
    }

    /// Returns the number of stored (non-garbage) clauses.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.iter().filter(|c| !c.garbage).count()
    }
}
