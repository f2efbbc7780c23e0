//! Conflict analysis: 1-UIP clause learning, minimization and bumping.

use lodestar_base::lit::{vidx, Lit};

use crate::clause_db::ClauseRef;
use crate::solver::{Mark, Solver};

impl Solver {
    /// Derives the 1-UIP asserting clause from the recorded conflict,
    /// minimizes it, bumps involved variables and clauses, backjumps and
    /// assigns the UIP.
    pub(crate) fn analyze(&mut self) {
        debug_assert!(self.conflict.is_some());
        if self.level == 0 {
            self.learn_empty_clause();
            return;
        }
        let Some(conflict) = self.conflict else {
            return;
        };

        // Resolve from the conflict toward the first UIP. `open` counts
        // unresolved literals of the current decision level.
        self.clause_buf.clear();
        self.clause_buf.push(0);
        let mut open = self.resolve_clause(conflict);
        let mut i = self.trail.len();
        let uip = loop {
            let lit = loop {
                debug_assert!(i > 0);
                i -= 1;
                let lit = self.trail[i];
                if self.vtab[vidx(lit)].seen {
                    break lit;
                }
            };
            open -= 1;
            if open == 0 {
                break lit;
            }
            let reason = self.vtab[vidx(lit)].reason;
            debug_assert!(reason.is_some(), "propagated literal without reason");
            if let Some(reason) = reason {
                open += self.resolve_clause(reason);
            }
        };
        self.clause_buf[0] = -uip;
        self.stats.learned += 1;

        if self.opts.minimize {
            self.minimize_clause();
        }

        let glue = self.glue_of_buf();
        self.fast_glue_avg.update(f64::from(glue));
        self.slow_glue_avg.update(f64::from(glue));
        self.trail_avg.update(self.trail.len() as f64);

        self.bump_resolved_clauses();
        self.bump_and_clear_seen_variables();
        self.clear_seen_levels();

        // Backjump to the second-highest decision level in the clause; the
        // literal at that level moves into the second watch slot.
        let size = self.clause_buf.len();
        let mut jump = 0;
        if size > 1 {
            let mut pos = 1;
            for k in 2..size {
                let level = self.vtab[vidx(self.clause_buf[k])].level;
                if level > self.vtab[vidx(self.clause_buf[pos])].level {
                    pos = k;
                }
            }
            self.clause_buf.swap(1, pos);
            jump = self.vtab[vidx(self.clause_buf[1])].level as usize;
        }
        self.jump_avg.update(jump as f64);
        self.backtrack(jump);

        let asserting = self.clause_buf[0];
        if size == 1 {
            debug_assert_eq!(self.level, 0);
            self.assign(asserting, None);
            self.stats.units += 1;
            self.iterating = true;
            if let Some(proof) = self.proof.as_mut() {
                proof.add_clause(&[asserting]);
            }
            tracing::debug!(unit = asserting, "learned unit clause");
        } else {
            let cref = self.new_learned_clause(glue);
            self.assign(asserting, Some(cref));
        }
    }

    /// Resolves one clause into the learned clause under construction and
    /// returns how many current-level literals it newly contributes.
    fn resolve_clause(&mut self, cref: ClauseRef) -> usize {
        self.stats.resolved += 1;
        if self.clauses[cref as usize].redundant {
            self.clauses[cref as usize].used = true;
            self.resolved.push(cref);
        }
        let mut open = 0;
        for k in 0..self.clauses[cref as usize].len() {
            let lit = self.clauses[cref as usize].lits[k];
            open += self.analyze_literal(lit);
        }
        open
    }

    /// Marks one conflict-side literal; returns 1 if it opens a
    /// current-level resolution obligation.
    fn analyze_literal(&mut self, lit: Lit) -> usize {
        let idx = vidx(lit);
        if self.vtab[idx].seen {
            return 0;
        }
        let level = self.vtab[idx].level as usize;
        if level == 0 {
            return 0;
        }
        self.vtab[idx].seen = true;
        self.seen_vars.push(idx as u32);
        if !self.control[level].seen {
            self.control[level].seen = true;
            self.seen_levels.push(level as u32);
        }
        if level == self.level {
            1
        } else {
            self.clause_buf.push(lit);
            0
        }
    }

    /// Removes every removable literal from the learned clause.
    fn minimize_clause(&mut self) {
        let mut buf = std::mem::take(&mut self.clause_buf);
        let mut kept = 1;
        for i in 1..buf.len() {
            let lit = buf[i];
            if self.minimize_literal(-lit, 0) {
                self.stats.minimized += 1;
            } else {
                buf[kept] = lit;
                kept += 1;
            }
        }
        buf.truncate(kept);
        self.clause_buf = buf;
        for i in 0..self.minimized.len() {
            let idx = self.minimized[i] as usize;
            self.vtab[idx].mark = Mark::None;
        }
        self.minimized.clear();
    }

    /// A literal is removable if every literal of its reason is in the
    /// learned clause or recursively removable. Only levels present in the
    /// learned clause qualify; memoized removable/poison marks keep the
    /// traversal linear.
    fn minimize_literal(&mut self, lit: Lit, depth: u32) -> bool {
        let idx = vidx(lit);
        let level = self.vtab[idx].level as usize;
        let mark = self.vtab[idx].mark;
        if level == 0 || mark == Mark::Removable || (depth > 0 && self.vtab[idx].seen) {
            return true;
        }
        let reason = self.vtab[idx].reason;
        if reason.is_none() || mark == Mark::Poison || level == self.level {
            return false;
        }
        if !self.control[level].seen || depth >= self.opts.minimize_depth {
            return false;
        }
        let Some(reason) = reason else {
            return false;
        };
        let mut removable = true;
        for k in 0..self.clauses[reason as usize].len() {
            let other = self.clauses[reason as usize].lits[k];
            if other == lit {
                continue;
            }
            if !self.minimize_literal(-other, depth + 1) {
                removable = false;
                break;
            }
        }
        self.vtab[idx].mark = if removable {
            Mark::Removable
        } else {
            Mark::Poison
        };
        self.minimized.push(idx as u32);
        removable
    }

    /// Number of distinct decision levels among the learned-clause literals.
    fn glue_of_buf(&mut self) -> u32 {
        self.gstamp += 1;
        let mut glue = 0;
        for i in 0..self.clause_buf.len() {
            let level = self.vtab[vidx(self.clause_buf[i])].level as usize;
            if self.gstamps[level] != self.gstamp {
                self.gstamps[level] = self.gstamp;
                glue += 1;
            }
        }
        glue
    }

    /// Number of distinct decision levels among a stored clause's literals.
    fn glue_of_clause(&mut self, cref: ClauseRef) -> u32 {
        self.gstamp += 1;
        let mut glue = 0;
        for k in 0..self.clauses[cref as usize].len() {
            let lit = self.clauses[cref as usize].lits[k];
            let level = self.vtab[vidx(lit)].level as usize;
            if self.gstamps[level] != self.gstamp {
                self.gstamps[level] = self.gstamp;
                glue += 1;
            }
        }
        glue
    }

    /// Improves the glue of every resolved clause and marks it used.
    fn bump_resolved_clauses(&mut self) {
        for i in 0..self.resolved.len() {
            let cref = self.resolved[i];
            let glue = self.glue_of_clause(cref);
            let clause = &mut self.clauses[cref as usize];
            if glue < clause.glue {
                clause.glue = glue;
            }
            clause.used = true;
        }
        self.resolved.clear();
    }

    /// Moves every seen variable to the front of the VMTF queue in trail
    /// order, so later assignments end up hottest, and clears the seen flags.
    fn bump_and_clear_seen_variables(&mut self) {
        let mut seen = std::mem::take(&mut self.seen_vars);
        seen.sort_unstable_by_key(|&idx| self.vtab[idx as usize].trail_pos);
        for &idx in &seen {
            self.bump_variable(idx as usize);
            self.vtab[idx as usize].seen = false;
        }
        seen.clear();
        self.seen_vars = seen;
    }

    fn clear_seen_levels(&mut self) {
        for i in 0..self.seen_levels.len() {
            let level = self.seen_levels[i] as usize;
            self.control[level].seen = false;
        }
        self.seen_levels.clear();
    }

    /// Derivation of the empty clause; the formula is unsatisfiable.
    pub(crate) fn learn_empty_clause(&mut self) {
        if self.unsat {
            return;
        }
        self.unsat = true;
        tracing::debug!("learned the empty clause");
        if let Some(proof) = self.proof.as_mut() {
            proof.add_clause(&[]);
        }
    }

    /// Reports a freshly learned root-level unit.
    pub(crate) fn iterate(&mut self) {
        debug_assert!(self.iterating);
        self.iterating = false;
        self.stats.iterations += 1;
        tracing::info!(
            fixed = self.stats.fixed,
            conflicts = self.stats.conflicts,
            "learned root-level unit"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::{SatResult, Solver};

    #[test]
    fn test_conflict_learning_on_unsat_square() {
        let mut solver = Solver::new();
        solver.reserve(2).unwrap();
        solver.add_original_clause(&[1, 2]).unwrap();
        solver.add_original_clause(&[1, -2]).unwrap();
        solver.add_original_clause(&[-1, 2]).unwrap();
        solver.add_original_clause(&[-1, -2]).unwrap();
        let res = solver.solve().unwrap();
        assert!(matches!(res, SatResult::Unsat));
        assert!(solver.stats().conflicts >= 1);
        assert!(solver.stats().learned >= 1);
    }

    #[test]
    fn test_learned_unit_is_reported() {
        let mut solver = Solver::new();
        solver.reserve(2).unwrap();
        solver.add_original_clause(&[1, 2]).unwrap();
        solver.add_original_clause(&[1, -2]).unwrap();
        solver.add_original_clause(&[-1, 2]).unwrap();
        let res = solver.solve().unwrap();
        assert!(matches!(res, SatResult::Sat(_)));
        // Both decisions fail until the solver learns the unit 1 or 2.
        assert!(solver.stats().units + solver.stats().iterations >= 1);
    }

    #[test]
    fn test_analysis_state_is_reset() {
        let mut solver = Solver::new();
        solver.reserve(3).unwrap();
        solver.add_original_clause(&[1, 2]).unwrap();
        solver.add_original_clause(&[1, -2]).unwrap();
        solver.add_original_clause(&[-1, 3]).unwrap();
        solver.add_original_clause(&[-1, -3]).unwrap();
        let res = solver.solve().unwrap();
        assert!(matches!(res, SatResult::Unsat));
        assert!(solver.seen_vars.is_empty());
        assert!(solver.seen_levels.is_empty());
        assert!(solver.resolved.is_empty());
        assert!(solver.minimized.is_empty());
        assert!((1..=solver.max_var()).all(|idx| !solver.vtab[idx].seen));
    }
}
