//! Core types shared by the TIL compiler crates.
//!
//! This crate holds everything the passes agree on:
//! - [`Span`] for source locations
//! - [`CompilationError`] and [`Diagnostics`] for reporting
//! - [`Type`] and [`deep_compare`] for the structural type model
//! - [`Symbol`] and [`Qualifier`] for resolved names

pub mod diagnostics;
pub mod error;
pub mod span;
pub mod symbol;
pub mod types;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::CompilationError;
pub use span::Span;
pub use symbol::{Qualifier, Symbol};
pub use types::{FunctionType, POINTER_SIZE, PrimitiveKind, Type, deep_compare};
