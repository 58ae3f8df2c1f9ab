//! Syntax tree for TIL.
//!
//! The tree is produced by an external parser (or by [`build`]) and then
//! mutated in place by the type checker, which fills each node's type
//! annotation and symbol slots. Every node kind is a closed enum so passes
//! dispatch with `match`.

pub mod build;
mod decl;
mod expr;
mod ops;
mod stmt;

pub use decl::{Declaration, Function, Program};
pub use expr::{Expr, ExprKind, Lvalue, LvalueKind};
pub use ops::{BinaryOp, UnaryOp};
pub use stmt::{Block, Stmt, StmtKind};
