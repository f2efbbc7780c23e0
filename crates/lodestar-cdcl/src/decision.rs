//! VMTF decision heuristic.
//!
//! Variables live on an intrusive doubly-linked move-to-front list ordered
//! by bump stamp; the links are the `prev`/`next` fields of the variable
//! table, so the queue needs no separate allocations. A cached search hint
//! points at the hottest position from which all hotter variables are known
//! to be assigned.

use lodestar_base::lit::Lit;

use crate::solver::Solver;

/// The VMTF queue head, tail and search hint.
#[derive(Debug, Clone, Default)]
pub(crate) struct Queue {
    /// Coldest (least recently bumped) variable, 0 if empty.
    pub(crate) first: u32,
    /// Hottest (most recently bumped) variable, 0 if empty.
    pub(crate) last: u32,
    /// Search hint: every variable hotter than this one is assigned.
    pub(crate) unassigned: u32,
    /// Bump stamp of the hint variable.
    pub(crate) bumped: u64,
}

impl Solver {
    /// Links all variables in index order; higher indices start hotter.
    pub(crate) fn init_queue(&mut self) {
        let n = self.max_var as u32;
        for idx in 1..=n {
            let var = &mut self.vtab[idx as usize];
            var.prev = idx - 1;
            var.next = if idx == n { 0 } else { idx + 1 };
            var.bumped = u64::from(idx);
        }
        self.queue.first = if n == 0 { 0 } else { 1 };
        self.queue.last = n;
        self.stamp = u64::from(n);
        if n != 0 {
            self.update_queue_unassigned(n as usize);
        }
    }

    /// Unlinks a variable from the queue.
    pub(crate) fn dequeue(&mut self, idx: usize) {
        let prev = self.vtab[idx].prev;
        let next = self.vtab[idx].next;
        if prev != 0 {
            self.vtab[prev as usize].next = next;
        } else {
            self.queue.first = next;
        }
        if next != 0 {
            self.vtab[next as usize].prev = prev;
        } else {
            self.queue.last = prev;
        }
    }

    /// Appends a variable at the hot end of the queue.
    pub(crate) fn enqueue(&mut self, idx: usize) {
        let last = self.queue.last;
        self.vtab[idx].prev = last;
        self.vtab[idx].next = 0;
        if last != 0 {
            self.vtab[last as usize].next = idx as u32;
        } else {
            self.queue.first = idx as u32;
        }
        self.queue.last = idx as u32;
    }

    /// Moves the search hint to a variable.
    pub(crate) fn update_queue_unassigned(&mut self, idx: usize) {
        debug_assert!(idx != 0);
        self.queue.unassigned = idx as u32;
        self.queue.bumped = self.vtab[idx].bumped;
    }

    /// Moves a variable to the front of the queue with a fresh stamp.
    pub(crate) fn bump_variable(&mut self, idx: usize) {
        self.dequeue(idx);
        self.stamp += 1;
        self.vtab[idx].bumped = self.stamp;
        self.enqueue(idx);
        if self.vals[idx] == 0 {
            self.update_queue_unassigned(idx);
        }
        self.stats.bumped += 1;
    }

    /// Walks the queue from the search hint toward the cold end until an
    /// unassigned variable is found, caching the new hint.
    pub(crate) fn next_decision_variable(&mut self) -> usize {
        let mut idx = self.queue.unassigned as usize;
        debug_assert!(idx != 0);
        while self.vals[idx] != 0 {
            idx = self.vtab[idx].prev as usize;
            debug_assert!(idx != 0);
        }
        if idx != self.queue.unassigned as usize {
            self.update_queue_unassigned(idx);
        }
        idx
    }

    /// Whether the trail covers all variables.
    pub(crate) fn satisfied(&self) -> bool {
        self.trail.len() == self.max_var
    }

    /// Opens a new decision level and assigns the next decision literal with
    /// its saved phase.
    pub(crate) fn decide(&mut self) {
        debug_assert!(!self.satisfied());
        self.level += 1;
        self.control.push(crate::solver::Level::new(self.trail.len()));
        let idx = self.next_decision_variable();
        let phase = if self.opts.phase_saving {
            self.phases[idx]
        } else {
            -1
        };
        let decision: Lit = i32::from(phase) * idx as i32;
        self.assign(decision, None);
        self.stats.decisions += 1;
        tracing::trace!(decision, level = self.level, "decide");
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::Solver;

    #[test]
    fn test_initial_decision_order_is_reverse_index() {
        let mut solver = Solver::new();
        solver.reserve(3).unwrap();
        solver.decide();
        assert_eq!(solver.val(3), -1);
        solver.decide();
        assert_eq!(solver.val(2), -1);
        solver.decide();
        assert_eq!(solver.val(1), -1);
    }

    #[test]
    fn test_bump_moves_variable_to_front() {
        let mut solver = Solver::new();
        solver.reserve(3).unwrap();
        solver.bump_variable(1);
        solver.decide();
        assert_eq!(solver.val(1), -1);
    }

    #[test]
    fn test_hint_skips_assigned_variables() {
        let mut solver = Solver::new();
        solver.reserve(3).unwrap();
        solver.add_original_clause(&[3]).unwrap();
        solver.decide();
        // Variable 3 is root-assigned, so the first decision is variable 2.
        assert_eq!(solver.val(2), -1);
    }

    #[test]
    fn test_backtrack_restores_hint() {
        let mut solver = Solver::new();
        solver.reserve(3).unwrap();
        solver.decide();
        solver.decide();
        assert_eq!(solver.val(3), -1);
        assert_eq!(solver.val(2), -1);
        solver.backtrack(0);
        solver.decide();
        assert_eq!(solver.val(3), -1);
    }
}
