//! Statements and blocks.

use til_core::Span;

use crate::{Declaration, Expr};

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Evaluates an expression and discards its value.
    Eval(Expr),
    /// `print`/`println` a list of values.
    Print {
        args: Vec<Expr>,
        newline: bool,
    },
    If {
        condition: Expr,
        then_block: Block,
    },
    IfElse {
        condition: Expr,
        then_block: Block,
        else_block: Block,
    },
    Loop {
        condition: Expr,
        body: Block,
    },
    /// Restarts the loop `level` nestings out (1 is the innermost).
    Next {
        level: u32,
    },
    /// Leaves the loop `level` nestings out (1 is the innermost).
    Stop {
        level: u32,
    },
    Return(Option<Expr>),
    Block(Block),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether nothing after this statement in the same block can run.
    pub fn ends_flow(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::Return(_) | StmtKind::Next { .. } | StmtKind::Stop { .. }
        )
    }
}

/// Declarations followed by statements.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub declarations: Vec<Declaration>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(declarations: Vec<Declaration>, statements: Vec<Stmt>, span: Span) -> Self {
        Self {
            declarations,
            statements,
            span,
        }
    }
}
