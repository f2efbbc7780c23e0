//! Common traits for Lodestar components.

use crate::error::Result;
use crate::lit::Lit;

/// Sink for clausal proof events.
///
/// The solver calls [`ProofSink::add_clause`] exactly once for every learned
/// clause (including units and the empty clause) and
/// [`ProofSink::delete_clause`] exactly once for every garbage-collected
/// clause, in the order the events occur. When no sink is installed the
/// solver performs no proof work.
///
/// Sinks buffer I/O failures internally so that the hot path stays
/// infallible; [`ProofSink::finish`] surfaces any deferred error.
pub trait ProofSink {
    /// Records the addition of a derived clause.
    fn add_clause(&mut self, lits: &[Lit]);

    /// Records the deletion of a clause.
    fn delete_clause(&mut self, lits: &[Lit]);

    /// Flushes the sink and reports any deferred I/O error.
    fn finish(&mut self) -> Result<()>;
}
