//! Declarations, function literals and the program root.

use std::rc::Rc;

use til_core::{Qualifier, Span, Symbol, Type};

use crate::Block;

/// A variable, parameter or global declaration.
///
/// A declaration whose type is `unspecified` takes the type of its
/// initializer.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub qualifier: Qualifier,
    pub name: String,
    pub ty: Type,
    pub init: Option<crate::Expr>,
    pub span: Span,
    /// Filled by the type checker.
    pub symbol: Option<Rc<Symbol>>,
}

impl Declaration {
    pub fn new(
        qualifier: Qualifier,
        name: impl Into<String>,
        ty: Type,
        init: Option<crate::Expr>,
        span: Span,
    ) -> Self {
        Self {
            qualifier,
            name: name.into(),
            ty,
            init,
            span,
            symbol: None,
        }
    }

    /// Whether the type is taken from the initializer.
    pub fn is_inferred(&self) -> bool {
        self.ty.is_unspecified()
    }
}

/// A function literal.
#[derive(Debug, Clone)]
pub struct Function {
    pub params: Vec<Declaration>,
    pub output: Type,
    pub body: Block,
    /// The program's main block.
    pub is_entry: bool,
    pub span: Span,
    /// The function's own symbol, as bound to the sentinel name.
    pub symbol: Option<Rc<Symbol>>,
}

impl Function {
    pub fn new(params: Vec<Declaration>, output: Type, body: Block, span: Span) -> Self {
        Self {
            params,
            output,
            body,
            is_entry: false,
            span,
            symbol: None,
        }
    }

    /// The program entry point: no parameters, returns `int`.
    pub fn entry(body: Block, span: Span) -> Self {
        Self {
            is_entry: true,
            ..Self::new(Vec::new(), Type::int(), body, span)
        }
    }

    /// The function's type.
    pub fn signature(&self) -> Type {
        Type::function(
            self.params.iter().map(|param| param.ty.clone()).collect(),
            self.output.clone(),
        )
    }
}

/// A whole compilation unit.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub main: Option<Function>,
}

impl Program {
    pub fn new(declarations: Vec<Declaration>, main: Option<Function>) -> Self {
        Self { declarations, main }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_returns_int() {
        let main = Function::entry(Block::default(), Span::line(1));
        assert!(main.is_entry);
        assert_eq!(main.signature(), Type::function(vec![], Type::int()));
    }

    #[test]
    fn signature_follows_parameters() {
        let params = vec![
            Declaration::new(Qualifier::Default, "a", Type::int(), None, Span::default()),
            Declaration::new(
                Qualifier::Default,
                "b",
                Type::double(),
                None,
                Span::default(),
            ),
        ];
        let f = Function::new(params, Type::void(), Block::default(), Span::default());
        assert_eq!(f.signature().to_string(), "void<int, double>");
    }

    #[test]
    fn inferred_declaration() {
        let decl = Declaration::new(
            Qualifier::Default,
            "x",
            Type::unspecified(),
            None,
            Span::default(),
        );
        assert!(decl.is_inferred());
    }
}
