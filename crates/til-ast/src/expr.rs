//! Expression and lvalue nodes.

use std::rc::Rc;

use til_core::{Span, Symbol, Type};

use crate::{BinaryOp, Function, UnaryOp};

/// An expression together with its type annotation slot.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Filled by the type checker.
    pub annotation: Option<Type>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Integer(i32),
    Double(f64),
    Str(String),
    Null,
    /// Reads a value from input; its type comes from context.
    Read,
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Loads the value stored at an lvalue.
    Rvalue(Box<Lvalue>),
    Assign {
        target: Box<Lvalue>,
        value: Box<Expr>,
    },
    AddressOf(Box<Lvalue>),
    /// `objects n`: reserves `n` elements on the stack.
    Alloc(Box<Expr>),
    SizeOf(Box<Expr>),
    /// A call without a callee invokes the enclosing function.
    Call {
        callee: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
    Function(Box<Function>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            annotation: None,
        }
    }

    /// Loads `lvalue`.
    pub fn rvalue(lvalue: Lvalue) -> Self {
        let span = lvalue.span;
        Self::new(ExprKind::Rvalue(Box::new(lvalue)), span)
    }

    /// The annotated type, or `unspecified` when none has been assigned.
    pub fn ty(&self) -> Type {
        self.annotation.clone().unwrap_or_else(Type::unspecified)
    }

    /// Whether the node already carries a concrete type.
    pub fn is_typed(&self) -> bool {
        self.annotation
            .as_ref()
            .is_some_and(|ty| !ty.is_unspecified())
    }

    pub fn annotate(&mut self, ty: Type) {
        self.annotation = Some(ty);
    }

    /// Whether the node can be emitted as static data.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Integer(_)
                | ExprKind::Double(_)
                | ExprKind::Str(_)
                | ExprKind::Null
                | ExprKind::Function(_)
        )
    }
}

/// A storage location.
#[derive(Debug, Clone)]
pub struct Lvalue {
    pub kind: LvalueKind,
    pub span: Span,
    pub annotation: Option<Type>,
}

#[derive(Debug, Clone)]
pub enum LvalueKind {
    Variable {
        name: String,
        /// Filled by the type checker.
        symbol: Option<Rc<Symbol>>,
    },
    /// `base[index]`
    Index { base: Box<Expr>, index: Box<Expr> },
}

impl Lvalue {
    pub fn new(kind: LvalueKind, span: Span) -> Self {
        Self {
            kind,
            span,
            annotation: None,
        }
    }

    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            LvalueKind::Variable {
                name: name.into(),
                symbol: None,
            },
            span,
        )
    }

    pub fn ty(&self) -> Type {
        self.annotation.clone().unwrap_or_else(Type::unspecified)
    }

    pub fn is_typed(&self) -> bool {
        self.annotation
            .as_ref()
            .is_some_and(|ty| !ty.is_unspecified())
    }

    pub fn annotate(&mut self, ty: Type) {
        self.annotation = Some(ty);
    }

    /// The resolved symbol of a variable.
    pub fn symbol(&self) -> Option<&Rc<Symbol>> {
        match &self.kind {
            LvalueKind::Variable { symbol, .. } => symbol.as_ref(),
            LvalueKind::Index { .. } => None,
        }
    }

    /// Whether this names an `external` symbol.
    pub fn is_external(&self) -> bool {
        self.symbol().is_some_and(|symbol| symbol.is_external())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unannotated_expression_is_unspecified() {
        let expr = Expr::new(ExprKind::Integer(1), Span::line(1));
        assert!(!expr.is_typed());
        assert!(expr.ty().is_unspecified());
    }

    #[test]
    fn unspecified_annotation_is_not_typed() {
        let mut expr = Expr::new(ExprKind::Read, Span::line(1));
        expr.annotate(Type::unspecified());
        assert!(!expr.is_typed());
        expr.annotate(Type::double());
        assert!(expr.is_typed());
        assert_eq!(expr.ty(), Type::double());
    }

    #[test]
    fn literals() {
        assert!(Expr::new(ExprKind::Str("a".into()), Span::default()).is_literal());
        assert!(Expr::new(ExprKind::Null, Span::default()).is_literal());
        assert!(!Expr::new(ExprKind::Read, Span::default()).is_literal());
    }

    #[test]
    fn rvalue_takes_lvalue_span() {
        let expr = Expr::rvalue(Lvalue::variable("x", Span::new(3, 4)));
        assert_eq!(expr.span, Span::new(3, 4));
        assert!(matches!(expr.kind, ExprKind::Rvalue(_)));
    }
}
