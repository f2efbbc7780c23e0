//! # lodestar-base
//!
//! Core types and utilities for the Lodestar SAT solver.
//!
//! This crate provides the foundational building blocks used across all other
//! Lodestar crates, including:
//!
//! - **Literals**: DIMACS-style signed literals and their index encodings
//! - **Error Types**: Unified error handling across the solver
//! - **Traits**: Common interfaces for solver components (clausal proof sinks)
//! - **Utilities**: Helper functions for tests and randomized tooling

pub mod error;
pub mod lit;
pub mod traits;
pub mod utils;

pub use error::{Error, Result};
pub use lit::Lit;
pub use traits::ProofSink;
