//! # lodestar-format
//!
//! File formats for Lodestar.
//!
//! Supports:
//! - **DIMACS CNF**: Standard SAT competition input format
//! - **DRAT**: Clausal proof output traced through the solver's proof sink

pub mod dimacs;
pub mod drat;

pub use dimacs::DimacsCnf;
pub use drat::DratWriter;
