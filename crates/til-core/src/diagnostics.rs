//! Line-oriented diagnostics collected while compiling a unit.

use std::fmt;
use std::io::{self, Write};

use crate::CompilationError;

/// A single reported problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Source line (0 when unknown).
    pub line: u32,
    /// Source column (0 when unknown).
    pub col: u32,
    /// Human readable message, without location.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.message)
    }
}

impl From<&CompilationError> for Diagnostic {
    fn from(error: &CompilationError) -> Self {
        let span = error.span().unwrap_or_default();
        Diagnostic {
            line: span.line,
            col: span.col,
            message: error.description(),
        }
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Records a compilation error.
    pub fn report(&mut self, error: &CompilationError) {
        self.push(Diagnostic::from(error));
    }

    /// Returns `true` if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of reported diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Iterates diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Removes all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Writes one `line: message` entry per diagnostic.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(out, "{diagnostic}")?;
        }
        Ok(())
    }
}
