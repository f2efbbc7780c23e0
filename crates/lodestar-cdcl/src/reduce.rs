//! Clause-database reduction: periodic garbage collection of low-quality
//! learned clauses.
//!
//! Clauses are addressed by stable arena index, so compaction rewrites the
//! reason references on the trail through an old-to-new index map and then
//! rebuilds all watch lists from the surviving clauses.

use lodestar_base::lit::{vidx, Lit};

use crate::clause_db::{bytes_clause, ClauseRef};
use crate::solver::Solver;

impl Solver {
    /// Whether the next reduction is due.
    pub(crate) fn reducing(&self) -> bool {
        self.stats.conflicts >= self.limits.reduce_conflicts
    }

    /// Collects useless redundant clauses and compacts the clause store.
    /// Without new conflicts since the last reduction the clause database is
    /// unchanged and the call is a no-op.
    pub(crate) fn reduce(&mut self) {
        debug_assert!(self.conflict.is_none());
        if self.stats.conflicts == self.limits.reduce_at {
            return;
        }
        self.stats.reductions += 1;
        self.protect_reasons();
        if self.stats.fixed > self.limits.reduce_fixed {
            self.mark_satisfied_clauses_as_garbage();
        }
        self.mark_useless_redundant_clauses_as_garbage();
        self.garbage_collection();
        self.unprotect_reasons();
        self.inc.reduce += u64::from(self.opts.reduce_interval);
        self.limits.reduce_conflicts = self.stats.conflicts + self.inc.reduce;
        self.limits.reduce_fixed = self.stats.fixed;
        self.limits.reduce_at = self.stats.conflicts;
        self.note_bytes();
        tracing::debug!(
            conflicts = self.stats.conflicts,
            clauses = self.clauses.len(),
            collected = self.stats.collected,
            "reduced clause database"
        );
    }

    /// Flags every clause referenced as an antecedent on the trail.
    fn protect_reasons(&mut self) {
        for i in 0..self.trail.len() {
            let idx = vidx(self.trail[i]);
            if let Some(cref) = self.vtab[idx].reason {
                self.clauses[cref as usize].reason = true;
            }
        }
    }

    fn unprotect_reasons(&mut self) {
        for i in 0..self.trail.len() {
            let idx = vidx(self.trail[i]);
            if let Some(cref) = self.vtab[idx].reason {
                self.clauses[cref as usize].reason = false;
            }
        }
    }

    /// Marks root-satisfied redundant clauses as garbage and strips
    /// root-falsified literals from the clauses that stay. Original clauses
    /// are never collected, satisfied or not. Watched positions never hold
    /// a root-falsified literal of a retained clause, so flushing starts at
    /// the third literal.
    fn mark_satisfied_clauses_as_garbage(&mut self) {
        for cref in 0..self.clauses.len() {
            if self.clauses[cref].garbage || self.clauses[cref].reason {
                continue;
            }
            if self.clause_root_satisfied(cref) {
                if self.clauses[cref].redundant {
                    self.mark_garbage(cref as ClauseRef);
                }
            } else {
                self.flush_falsified_literals(cref);
            }
        }
    }

    fn clause_root_satisfied(&self, cref: usize) -> bool {
        self.clauses[cref].lits.iter().any(|&lit| self.fixed(lit) > 0)
    }

    fn flush_falsified_literals(&mut self, cref: usize) {
        let mut k = 2;
        let mut removed = 0;
        while k < self.clauses[cref].lits.len() {
            let lit = self.clauses[cref].lits[k];
            if self.fixed(lit) < 0 {
                self.clauses[cref].lits.swap_remove(k);
                removed += 1;
            } else {
                k += 1;
            }
        }
        if removed > 0 {
            self.stats.dec_bytes(removed * std::mem::size_of::<Lit>());
        }
    }

    /// Sorts the unprotected, untouched redundant clauses by quality (glue,
    /// then size) and marks the worst half as garbage. Clauses touched by
    /// analysis since the last reduction are spared once and their `used`
    /// flags cleared.
    fn mark_useless_redundant_clauses_as_garbage(&mut self) {
        let mut candidates: Vec<ClauseRef> = Vec::new();
        for cref in 0..self.clauses.len() {
            let clause = &mut self.clauses[cref];
            if !clause.redundant || clause.garbage || clause.reason {
                continue;
            }
            if clause.used {
                clause.used = false;
                continue;
            }
            candidates.push(cref as ClauseRef);
        }
        candidates.sort_by_key(|&cref| {
            let clause = &self.clauses[cref as usize];
            (clause.glue, clause.len())
        });
        let keep = candidates.len() - candidates.len() / 2;
        for i in keep..candidates.len() {
            self.mark_garbage(candidates[i]);
        }
    }

    fn mark_garbage(&mut self, cref: ClauseRef) {
        debug_assert!(!self.clauses[cref as usize].garbage);
        self.clauses[cref as usize].garbage = true;
        self.stats.collected += 1;
        if self.proof.is_some() {
            let lits = self.clauses[cref as usize].lits.clone();
            if let Some(proof) = self.proof.as_mut() {
                proof.delete_clause(&lits);
            }
        }
    }

    /// Compacts the arena, rewrites trail reasons through the index map and
    /// rebuilds every watch list from the surviving clauses.
    fn garbage_collection(&mut self) {
        let old = std::mem::take(&mut self.clauses);
        let mut map = vec![u32::MAX; old.len()];
        let mut kept = Vec::with_capacity(old.len());
        for (i, clause) in old.into_iter().enumerate() {
            if clause.garbage {
                self.stats.dec_bytes(bytes_clause(clause.len()));
            } else {
                map[i] = kept.len() as u32;
                kept.push(clause);
            }
        }
        self.clauses = kept;
        for i in 0..self.trail.len() {
            let idx = vidx(self.trail[i]);
            if let Some(cref) = self.vtab[idx].reason {
                let moved = map[cref as usize];
                debug_assert!(moved != u32::MAX, "collected a reason clause");
                self.vtab[idx].reason = Some(moved);
            }
        }
        self.flush_watches();
    }

    /// Rebuilds all watch lists, skipping garbage clauses and keeping the
    /// first two literals of each clause watched.
    fn flush_watches(&mut self) {
        for watches in &mut self.wtab {
            watches.clear();
        }
        for cref in 0..self.clauses.len() {
            debug_assert!(!self.clauses[cref].garbage);
            self.watch_clause(cref as ClauseRef);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::Solver;

    fn add_redundant(solver: &mut Solver, lits: &[i32], glue: u32) {
        solver.clause_buf.clear();
        solver.clause_buf.extend_from_slice(lits);
        let cref = solver.new_clause(true, glue);
        solver.watch_clause(cref);
    }

    #[test]
    fn test_reduce_collects_worst_half() {
        let mut solver = Solver::new();
        solver.reserve(8).unwrap();
        add_redundant(&mut solver, &[1, 2], 1);
        add_redundant(&mut solver, &[3, 4], 2);
        add_redundant(&mut solver, &[5, 6], 3);
        add_redundant(&mut solver, &[7, 8], 4);
        solver.stats.conflicts = 10;
        solver.reduce();
        assert_eq!(solver.clauses.len(), 2);
        assert!(solver.clauses.iter().all(|c| c.glue <= 2));
        assert_eq!(solver.stats.collected, 2);
    }

    #[test]
    fn test_reduce_without_new_conflicts_is_noop() {
        let mut solver = Solver::new();
        solver.reserve(8).unwrap();
        for pair in [[1, 2], [3, 4], [5, 6], [7, 8]] {
            add_redundant(&mut solver, &pair, 3);
        }
        solver.stats.conflicts = 10;
        solver.reduce();
        let after_first = solver.clauses.len();
        solver.reduce();
        assert_eq!(solver.clauses.len(), after_first);
    }

    #[test]
    fn test_used_clauses_are_spared_once() {
        let mut solver = Solver::new();
        solver.reserve(8).unwrap();
        add_redundant(&mut solver, &[1, 2], 9);
        add_redundant(&mut solver, &[3, 4], 1);
        add_redundant(&mut solver, &[5, 6], 1);
        solver.clauses[0].used = true;
        solver.stats.conflicts = 10;
        solver.reduce();
        // The high-glue clause survives through its used flag, which is
        // cleared for the next epoch.
        assert!(solver.clauses.iter().any(|c| c.glue == 9));
        assert!(solver.clauses.iter().all(|c| !c.used));
    }

    #[test]
    fn test_original_clauses_never_collected() {
        let mut solver = Solver::new();
        solver.reserve(2).unwrap();
        // The binary clause is ingested first, while variable 1 is still
        // unassigned, so it is stored and watched rather than simplified.
        solver.add_original_clause(&[-1, 2]).unwrap();
        solver.add_original_clause(&[1]).unwrap();
        // Propagation fixes 2 through the stored original clause, which is
        // now root-satisfied and, being a root assignment, keeps no reason
        // link protecting the clause.
        assert!(solver.propagate());
        assert_eq!(solver.fixed(2), 1);
        solver.stats.conflicts = 10;
        solver.reduce();
        // The satisfied-clause sweep ran (fixed grew past its baseline) but
        // must not touch original clauses.
        assert_eq!(solver.limits.reduce_fixed, solver.stats.fixed);
        assert_eq!(solver.clauses.len(), 1);
        let clause = &solver.clauses[0];
        assert!(!clause.redundant);
        assert_eq!(clause.lits.len(), 2);
        assert!(clause.lits.contains(&-1) && clause.lits.contains(&2));
    }

    #[test]
    fn test_satisfied_redundant_clauses_are_collected() {
        let mut solver = Solver::new();
        solver.reserve(4).unwrap();
        add_redundant(&mut solver, &[-1, 2], 2);
        add_redundant(&mut solver, &[3, 4], 2);
        solver.add_original_clause(&[1]).unwrap();
        assert!(solver.propagate());
        assert_eq!(solver.fixed(2), 1);
        solver.stats.conflicts = 10;
        solver.reduce();
        // The root-satisfied learned clause is gone; the untouched one
        // survives the worst-half cut as the single best candidate.
        assert_eq!(solver.clauses.len(), 1);
        assert!(solver.clauses[0].redundant);
        assert_eq!(solver.clauses[0].lits, vec![3, 4]);
    }
}
