//! # lodestar-cdcl
//!
//! Conflict-Driven Clause Learning (CDCL) core engine.
//!
//! Implements:
//! - Boolean Constraint Propagation over two-watched literals with blocking literals
//! - 1-UIP conflict analysis with recursive learned-clause minimization
//! - VMTF (variable-move-to-front) decision heuristic with phase saving
//! - Restarts driven by fast/slow glue moving averages, with trail reuse and blocking
//! - Periodic clause-database reduction keyed on glue and size
//!
//! The engine is single-threaded and synchronous. All outcomes are return
//! values; the search loop polls an externally shared termination flag and
//! reports soft limits as [`SatResult::Unknown`].

pub mod bcp;
pub mod clause_db;
pub mod conflict;
pub mod decision;
pub mod options;
pub mod reduce;
pub mod restart;
pub mod solver;
pub mod stats;

pub use lodestar_base::traits::ProofSink;
pub use options::Options;
pub use solver::{SatResult, Solver};
pub use stats::Stats;
