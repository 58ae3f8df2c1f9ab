//! TIL: type checking, code generation and execution for a small
//! imperative language with first-class functions.
//!
//! The passes live in the workspace crates and are re-exported here:
//!
//! - [`til_core`]: types, symbols, errors and diagnostics
//! - [`ast`]: the syntax tree and its builder helpers
//! - [`compiler`]: the checker, frame layout and code generator
//!
//! [`Unit`] ties them together and runs the output on [`vm::Machine`].

pub mod unit;
pub mod vm;

pub use til_ast as ast;
pub use til_compiler as compiler;

pub use til_compiler::{Compiler, CompilerOptions, Module};
pub use til_core::{CompilationError, Diagnostic, Diagnostics, Span, Type};
pub use unit::{Execution, Unit};
pub use vm::{Machine, RuntimeError, VmConfig};

use thiserror::Error;

/// Any error from compiling or running a unit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TilError {
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl TilError {
    pub fn is_compilation(&self) -> bool {
        matches!(self, TilError::Compilation(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, TilError::Runtime(_))
    }

    /// Source line of a compilation error.
    pub fn line(&self) -> Option<u32> {
        match self {
            TilError::Compilation(error) => error.span().map(|span| span.line),
            TilError::Runtime(_) => None,
        }
    }
}
