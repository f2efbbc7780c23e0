//! Boolean Constraint Propagation over two-watched literals.
//!
//! Every stored clause is watched by its first two literals. Each watch
//! entry carries a blocking literal so a satisfied clause can be skipped
//! without touching clause memory.

use lodestar_base::lit::{polarity, vidx, vlit, Lit};

use crate::clause_db::ClauseRef;
use crate::solver::Solver;

/// A watch list entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Watch {
    /// A literal of the clause other than the watched one; if it is already
    /// true the clause cannot propagate and is skipped.
    pub(crate) blit: Lit,
    pub(crate) clause: ClauseRef,
}

impl Solver {
    /// Adds a watch on `lit` with blocking literal `blit`.
    #[inline]
    pub(crate) fn watch_literal(&mut self, lit: Lit, blit: Lit, clause: ClauseRef) {
        self.wtab[vlit(lit)].push(Watch { blit, clause });
    }

    /// Installs watches on the first two literals of a clause.
    pub(crate) fn watch_clause(&mut self, cref: ClauseRef) {
        let (l0, l1) = {
            let lits = &self.clauses[cref as usize].lits;
            (lits[0], lits[1])
        };
        self.watch_literal(l0, l1, cref);
        self.watch_literal(l1, l0, cref);
    }

    /// Assigns a literal, recording its reason, level and trail position.
    /// Root-level assignments keep no reason; fixed literals are never
    /// resolved on, and forgetting the reference frees the clause for
    /// collection.
    pub(crate) fn assign(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let idx = vidx(lit);
        debug_assert_eq!(self.vals[idx], 0);
        let var = &mut self.vtab[idx];
        var.level = self.level as u32;
        var.trail_pos = self.trail.len() as u32;
        var.reason = if self.level == 0 { None } else { reason };
        self.vals[idx] = polarity(lit);
        if self.level == 0 {
            self.stats.fixed += 1;
        }
        self.trail.push(lit);
        tracing::trace!(lit, level = self.level, "assign");
    }

    /// Propagates all queued trail literals breadth-first in trail order.
    ///
    /// Returns `true` on success and `false` on conflict, in which case the
    /// conflicting clause is recorded and the remaining watches of the
    /// currently processed literal are preserved.
    pub(crate) fn propagate(&mut self) -> bool {
        while self.propagated < self.trail.len() {
            let lit = self.trail[self.propagated];
            self.propagated += 1;
            self.stats.propagations += 1;
            let falsified = -lit;
            let wi = vlit(falsified);
            let mut watches = std::mem::take(&mut self.wtab[wi]);
            let mut kept = 0;
            let mut i = 0;
            let mut found_conflict = false;
            while i < watches.len() {
                let mut watch = watches[i];
                i += 1;
                if self.value(watch.blit) > 0 {
                    // Blocking literal is true, clause untouched.
                    watches[kept] = watch;
                    kept += 1;
                    continue;
                }
                let cref = watch.clause as usize;
                if self.clauses[cref].lits[0] == falsified {
                    self.clauses[cref].lits.swap(0, 1);
                }
                debug_assert_eq!(self.clauses[cref].lits[1], falsified);
                let other = self.clauses[cref].lits[0];
                let other_val = self.value(other);
                if other_val > 0 {
                    // Clause satisfied by the other watch; cache it.
                    watch.blit = other;
                    watches[kept] = watch;
                    kept += 1;
                    continue;
                }
                let mut replacement = None;
                for k in 2..self.clauses[cref].lits.len() {
                    if self.value(self.clauses[cref].lits[k]) >= 0 {
                        replacement = Some(k);
                        break;
                    }
                }
                if let Some(k) = replacement {
                    // Move the watch to the non-false literal.
                    let lits = &mut self.clauses[cref].lits;
                    let repl = lits[k];
                    lits[k] = falsified;
                    lits[1] = repl;
                    self.watch_literal(repl, other, watch.clause);
                } else if other_val == 0 {
                    // Clause is unit under the current assignment.
                    self.assign(other, Some(watch.clause));
                    watches[kept] = watch;
                    kept += 1;
                } else {
                    // All literals false.
                    self.conflict = Some(watch.clause);
                    watches[kept] = watch;
                    kept += 1;
                    while i < watches.len() {
                        watches[kept] = watches[i];
                        kept += 1;
                        i += 1;
                    }
                    found_conflict = true;
                }
            }
            watches.truncate(kept);
            debug_assert!(self.wtab[wi].is_empty());
            self.wtab[wi] = watches;
            if found_conflict {
                self.stats.conflicts += 1;
                tracing::trace!(conflict = ?self.conflict, "propagation conflict");
                return false;
            }
        }
        true
    }
}
