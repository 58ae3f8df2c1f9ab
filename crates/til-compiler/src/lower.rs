//! Adapting function values to wider function types.
//!
//! A function value whose type differs structurally from the type expected
//! where it is used cannot be called through the expected signature
//! directly: arguments and results may need widening. The value is stored
//! in a hidden global and replaced by a trampoline that has the expected
//! signature, calls the stored value with its own parameters and returns
//! the result, letting the call site widen everything as usual.

use til_ast::{Block, Declaration, Expr, ExprKind, Function, Lvalue, Stmt, StmtKind};
use til_core::{CompilationError, Qualifier, Type};

use crate::TypeChecker;

type Result<T> = std::result::Result<T, CompilationError>;

/// The type-checked pieces that replace a wrapped function value.
#[derive(Debug, Clone)]
pub struct Lowered {
    /// Hidden global holding the original value, typed as that value.
    pub holder: Declaration,
    /// Stores the original value into the holder.
    pub store: Expr,
    /// Function literal with the expected signature.
    pub trampoline: Expr,
}

impl Lowered {
    /// The original value, as stored by [`store`](Self::store).
    pub fn stored_value(&self) -> Option<&Expr> {
        match &self.store.kind {
            ExprKind::Assign { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The trampoline's function literal.
    pub fn trampoline_function(&self) -> Option<&Function> {
        match &self.trampoline.kind {
            ExprKind::Function(function) => Some(function),
            _ => None,
        }
    }
}

/// Builds the holder, store and trampoline for `value` used as `target`.
///
/// `value` must already be type checked; it is cloned into the store and
/// skipped when the new pieces are checked.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn wrap_function_value(value: &Expr, target: &Type, holder_name: &str) -> Result<Lowered> {
    let source = value.ty();
    if !source.is_function() {
        return Err(CompilationError::internal(format!("cannot wrap a value of type {source}")));
    }
    let Some(expected) = target.as_function() else {
        return Err(CompilationError::internal(format!(
            "cannot wrap into non-function type {target}"
        )));
    };

    let span = value.span;
    let mut holder = Declaration::new(Qualifier::Default, holder_name, source, None, span);
    let mut store = Expr::new(
        ExprKind::Assign {
            target: Box::new(Lvalue::variable(holder_name, span)),
            value: Box::new(value.clone()),
        },
        span,
    );

    let params: Vec<Declaration> = expected
        .inputs
        .iter()
        .enumerate()
        .map(|(position, input)| {
            Declaration::new(
                Qualifier::Default,
                format!("_arg{position}"),
                input.clone(),
                None,
                span,
            )
        })
        .collect();
    let args = params
        .iter()
        .map(|param| Expr::rvalue(Lvalue::variable(param.name.clone(), span)))
        .collect();
    let forward = Expr::new(
        ExprKind::Call {
            callee: Some(Box::new(Expr::rvalue(Lvalue::variable(holder_name, span)))),
            args,
        },
        span,
    );
    let statement = if expected.output.is_void() {
        Stmt::new(StmtKind::Eval(forward), span)
    } else {
        Stmt::new(StmtKind::Return(Some(forward)), span)
    };
    let body = Block::new(Vec::new(), vec![statement], span);
    let function = Function::new(params, expected.output.clone(), body, span);
    let mut trampoline = Expr::new(ExprKind::Function(Box::new(function)), span);

    let mut checker = TypeChecker::new();
    checker.check_declaration(&mut holder)?;
    checker.check_expr(&mut store)?;
    checker.check_expr(&mut trampoline)?;

    Ok(Lowered {
        holder,
        store,
        trampoline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use til_ast::build::*;

    /// `(double x) -> int { return 1 }`, checked.
    fn typed_value() -> Expr {
        let mut value = function(
            vec![param("x", Type::double())],
            Type::int(),
            block(vec![], vec![ret(int(1))]),
        );
        TypeChecker::new().check_expr(&mut value).unwrap();
        value
    }

    #[test]
    fn trampoline_has_target_signature() {
        let target = Type::function(vec![Type::int()], Type::double());
        let lowered = wrap_function_value(&typed_value(), &target, "_wrapper_target_0").unwrap();

        assert_eq!(lowered.trampoline.ty(), target);
        let trampoline = lowered.trampoline_function().unwrap();
        assert_eq!(trampoline.params[0].name, "_arg0");
        assert!(trampoline.params[0].symbol.is_some());
    }

    #[test]
    fn holder_keeps_value_type() {
        let value = typed_value();
        let target = Type::function(vec![Type::int()], Type::double());
        let lowered = wrap_function_value(&value, &target, "_wrapper_target_7").unwrap();

        assert_eq!(lowered.holder.name, "_wrapper_target_7");
        assert_eq!(lowered.holder.ty, value.ty());
        assert_eq!(lowered.store.ty(), value.ty());
        assert!(lowered.stored_value().unwrap().is_typed());
    }

    #[test]
    fn trampoline_forwards_through_holder() {
        let target = Type::function(vec![Type::int()], Type::double());
        let lowered = wrap_function_value(&typed_value(), &target, "_wrapper_target_0").unwrap();
        let body = &lowered.trampoline_function().unwrap().body;

        let StmtKind::Return(Some(call)) = &body.statements[0].kind else {
            panic!("expected return of the forwarded call");
        };
        let ExprKind::Call { callee, args } = &call.kind else {
            panic!("expected call");
        };
        assert_eq!(call.ty(), Type::int());
        // Widened to the stored value's parameter type when emitted.
        assert_eq!(args[0].ty(), Type::int());
        let ExprKind::Rvalue(holder) = &callee.as_ref().unwrap().kind else {
            panic!("expected holder load");
        };
        assert!(holder.symbol().unwrap().is_global());
    }

    #[test]
    fn void_target_evaluates_call() {
        let mut value = function(vec![], Type::void(), block(vec![], vec![]));
        TypeChecker::new().check_expr(&mut value).unwrap();
        let target = Type::function(vec![], Type::void());
        let lowered = wrap_function_value(&value, &target, "_w").unwrap();
        let body = &lowered.trampoline_function().unwrap().body;
        assert!(matches!(body.statements[0].kind, StmtKind::Eval(_)));
    }

    #[test]
    fn non_function_value_is_internal_error() {
        let mut value = int(1);
        value.annotate(Type::int());
        let err = wrap_function_value(&value, &Type::double(), "_w").unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
    }
}
