//! Terse constructors for syntax trees.
//!
//! These stand in for a parser when trees are built by hand, mostly in
//! tests and benchmarks. Nodes are created without a location; use
//! [`At::at`] to attach a line.
//!
//! ```
//! use til_ast::build::*;
//!
//! // program { var x = 3 println x }
//! let program = program(
//!     vec![],
//!     Some(block(
//!         vec![declare_var("x", int(3))],
//!         vec![println(vec![id("x")])],
//!     )),
//! );
//! assert!(program.main.is_some());
//! ```

use til_core::{Qualifier, Span, Type};

use crate::{
    BinaryOp, Block, Declaration, Expr, ExprKind, Function, Lvalue, LvalueKind, Program, Stmt,
    StmtKind, UnaryOp,
};

/// Attaches a source line to a node.
pub trait At {
    fn at(self, line: u32) -> Self;
}

impl At for Expr {
    fn at(mut self, line: u32) -> Self {
        self.span = Span::line(line);
        self
    }
}

impl At for Lvalue {
    fn at(mut self, line: u32) -> Self {
        self.span = Span::line(line);
        self
    }
}

impl At for Stmt {
    fn at(mut self, line: u32) -> Self {
        self.span = Span::line(line);
        self
    }
}

impl At for Declaration {
    fn at(mut self, line: u32) -> Self {
        self.span = Span::line(line);
        self
    }
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::default())
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::default())
}

// ============================================================================
// Expressions
// ============================================================================

pub fn int(value: i32) -> Expr {
    expr(ExprKind::Integer(value))
}

pub fn double(value: f64) -> Expr {
    expr(ExprKind::Double(value))
}

pub fn string(value: &str) -> Expr {
    expr(ExprKind::Str(value.to_string()))
}

pub fn null() -> Expr {
    expr(ExprKind::Null)
}

pub fn read() -> Expr {
    expr(ExprKind::Read)
}

pub fn var(name: &str) -> Lvalue {
    Lvalue::variable(name, Span::default())
}

pub fn index(base: Expr, index: Expr) -> Lvalue {
    Lvalue::new(
        LvalueKind::Index {
            base: Box::new(base),
            index: Box::new(index),
        },
        Span::default(),
    )
}

pub fn load(lvalue: Lvalue) -> Expr {
    Expr::rvalue(lvalue)
}

/// The value of variable `name`.
pub fn id(name: &str) -> Expr {
    load(var(name))
}

pub fn assign(target: Lvalue, value: Expr) -> Expr {
    expr(ExprKind::Assign {
        target: Box::new(target),
        value: Box::new(value),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn neg(operand: Expr) -> Expr {
    unary(UnaryOp::Neg, operand)
}

pub fn not(operand: Expr) -> Expr {
    unary(UnaryOp::Not, operand)
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn add(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Add, left, right)
}

pub fn sub(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Sub, left, right)
}

pub fn mul(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Mul, left, right)
}

pub fn lt(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Lt, left, right)
}

pub fn le(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Le, left, right)
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Eq, left, right)
}

pub fn address_of(lvalue: Lvalue) -> Expr {
    expr(ExprKind::AddressOf(Box::new(lvalue)))
}

/// `objects count`
pub fn alloc(count: Expr) -> Expr {
    expr(ExprKind::Alloc(Box::new(count)))
}

pub fn size_of(operand: Expr) -> Expr {
    expr(ExprKind::SizeOf(Box::new(operand)))
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        callee: Some(Box::new(callee)),
        args,
    })
}

/// A call of the enclosing function.
pub fn recurse(args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call { callee: None, args })
}

pub fn function(params: Vec<Declaration>, output: Type, body: Block) -> Expr {
    expr(ExprKind::Function(Box::new(Function::new(params, output, body, Span::default()))))
}

// ============================================================================
// Declarations
// ============================================================================

pub fn param(name: &str, ty: Type) -> Declaration {
    declare(ty, name, None)
}

pub fn declare(ty: Type, name: &str, init: Option<Expr>) -> Declaration {
    qualified(Qualifier::Default, ty, name, init)
}

/// `var name = init`
pub fn declare_var(name: &str, init: Expr) -> Declaration {
    declare(Type::unspecified(), name, Some(init))
}

pub fn qualified(qualifier: Qualifier, ty: Type, name: &str, init: Option<Expr>) -> Declaration {
    Declaration::new(qualifier, name, ty, init, Span::default())
}

pub fn forward(ty: Type, name: &str) -> Declaration {
    qualified(Qualifier::Forward, ty, name, None)
}

pub fn external(ty: Type, name: &str) -> Declaration {
    qualified(Qualifier::External, ty, name, None)
}

// ============================================================================
// Statements
// ============================================================================

pub fn block(declarations: Vec<Declaration>, statements: Vec<Stmt>) -> Block {
    Block::new(declarations, statements, Span::default())
}

pub fn eval(value: Expr) -> Stmt {
    stmt(StmtKind::Eval(value))
}

pub fn print(args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::Print {
        args,
        newline: false,
    })
}

pub fn println(args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::Print {
        args,
        newline: true,
    })
}

pub fn if_(condition: Expr, then_block: Block) -> Stmt {
    stmt(StmtKind::If {
        condition,
        then_block,
    })
}

pub fn if_else(condition: Expr, then_block: Block, else_block: Block) -> Stmt {
    stmt(StmtKind::IfElse {
        condition,
        then_block,
        else_block,
    })
}

pub fn loop_(condition: Expr, body: Block) -> Stmt {
    stmt(StmtKind::Loop { condition, body })
}

pub fn next(level: u32) -> Stmt {
    stmt(StmtKind::Next { level })
}

pub fn stop(level: u32) -> Stmt {
    stmt(StmtKind::Stop { level })
}

pub fn ret(value: Expr) -> Stmt {
    stmt(StmtKind::Return(Some(value)))
}

pub fn ret_void() -> Stmt {
    stmt(StmtKind::Return(None))
}

pub fn nested(inner: Block) -> Stmt {
    stmt(StmtKind::Block(inner))
}

/// A program with globals and an optional main block.
pub fn program(declarations: Vec<Declaration>, main: Option<Block>) -> Program {
    Program::new(
        declarations,
        main.map(|body| Function::entry(body, Span::default())),
    )
}
