//! DRAT clausal proof writer.
//!
//! Receives add/delete events from the solver through the
//! [`ProofSink`] trait and writes them in textual DRAT format. I/O errors
//! are deferred so the solver's hot path stays infallible; they surface
//! from [`DratWriter::finish`].

use lodestar_base::lit::Lit;
use lodestar_base::{Error, ProofSink, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a textual DRAT proof trace.
pub struct DratWriter<W: Write> {
    out: BufWriter<W>,
    deferred: Option<std::io::Error>,
    /// Number of add and delete events written.
    pub added: u64,
    pub deleted: u64,
}

impl DratWriter<File> {
    /// Creates a proof writer backed by a file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> DratWriter<W> {
    /// Creates a proof writer over any sink.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
            deferred: None,
            added: 0,
            deleted: 0,
        }
    }

    fn write_clause(&mut self, prefix: &str, lits: &[Lit]) {
        if self.deferred.is_some() {
            return;
        }
        let mut line = String::with_capacity(prefix.len() + 8 * lits.len() + 2);
        line.push_str(prefix);
        for &lit in lits {
            line.push_str(&lit.to_string());
            line.push(' ');
        }
        line.push_str("0\n");
        if let Err(err) = self.out.write_all(line.as_bytes()) {
            self.deferred = Some(err);
        }
    }
}

impl<W: Write> ProofSink for DratWriter<W> {
    fn add_clause(&mut self, lits: &[Lit]) {
        self.added += 1;
        self.write_clause("", lits);
    }

    fn delete_clause(&mut self, lits: &[Lit]) {
        self.deleted += 1;
        self.write_clause("d ", lits);
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(err) = self.deferred.take() {
            return Err(Error::Io(err));
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drat_events() {
        let mut buf = Vec::new();
        {
            let mut writer = DratWriter::new(&mut buf);
            writer.add_clause(&[1, -2]);
            writer.add_clause(&[-1]);
            writer.delete_clause(&[1, -2]);
            writer.add_clause(&[]);
            writer.finish().unwrap();
            assert_eq!(writer.added, 3);
            assert_eq!(writer.deleted, 1);
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "1 -2 0\n-1 0\nd 1 -2 0\n0\n");
    }
}
