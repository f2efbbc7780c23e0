//! DIMACS CNF format parser.
//!
//! Standard format used in SAT competitions. Malformed input is rejected
//! here, before anything reaches the solver core.

use lodestar_base::{Error, Result};
use std::io::{BufRead, BufReader, Read};

/// A DIMACS CNF formula.
#[derive(Debug, Clone)]
pub struct DimacsCnf {
    /// Number of variables declared in the header.
    pub num_vars: usize,
    /// Clauses as vectors of literals.
    pub clauses: Vec<Vec<i32>>,
}

impl DimacsCnf {
    /// Parses DIMACS CNF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut num_vars = 0usize;
        let mut num_clauses = 0usize;
        let mut clauses = Vec::new();
        let mut clause = Vec::new();
        let mut header_found = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            // Skip empty lines and comments.
            if line.is_empty() || line.starts_with('c') {
                continue;
            }

            // Parse header.
            if let Some(rest) = line.strip_prefix('p') {
                if header_found {
                    return Err(Error::Parse("duplicate DIMACS header".to_string()));
                }
                let parts: Vec<&str> = rest.split_whitespace().collect();
                if parts.len() != 3 || parts[0] != "cnf" {
                    return Err(Error::Parse(format!("invalid DIMACS header: {line}")));
                }
                num_vars = parts[1]
                    .parse()
                    .map_err(|e| Error::Parse(format!("invalid variable count: {e}")))?;
                num_clauses = parts[2]
                    .parse()
                    .map_err(|e| Error::Parse(format!("invalid clause count: {e}")))?;
                header_found = true;
                clauses.reserve(num_clauses);
                continue;
            }

            if !header_found {
                return Err(Error::Parse(
                    "DIMACS header 'p cnf ...' not found".to_string(),
                ));
            }

            // Parse clause literals; 0 terminates a clause.
            for token in line.split_whitespace() {
                let lit: i32 = token
                    .parse()
                    .map_err(|e| Error::Parse(format!("invalid literal '{token}': {e}")))?;
                if lit == 0 {
                    clauses.push(std::mem::take(&mut clause));
                } else {
                    if lit.unsigned_abs() as usize > num_vars {
                        return Err(Error::Parse(format!(
                            "literal {lit} exceeds declared variable count {num_vars}"
                        )));
                    }
                    clause.push(lit);
                }
            }
        }

        // A trailing clause without terminating 0 is still accepted.
        if !clause.is_empty() {
            clauses.push(clause);
        }

        if !header_found {
            return Err(Error::Parse(
                "DIMACS header 'p cnf ...' not found".to_string(),
            ));
        }
        if clauses.len() != num_clauses {
            tracing::warn!(
                declared = num_clauses,
                found = clauses.len(),
                "clause count differs from DIMACS header"
            );
        }

        Ok(Self { num_vars, clauses })
    }

    /// Parses DIMACS CNF from a string.
    pub fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Converts to DIMACS string.
    #[must_use]
    pub fn to_dimacs(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("p cnf {} {}\n", self.num_vars, self.clauses.len()));
        for clause in &self.clauses {
            for lit in clause {
                out.push_str(&format!("{lit} "));
            }
            out.push_str("0\n");
        }
        out
    }
}
