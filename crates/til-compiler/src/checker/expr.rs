//! Expression and lvalue checking.

use til_ast::{Expr, ExprKind, Lvalue, LvalueKind, UnaryOp};
use til_core::{CompilationError, Span, Type};

use super::{Result, TypeChecker, default_to_int, settle};

impl TypeChecker {
    /// Annotates `expr` and everything below it.
    pub fn check_expr(&mut self, expr: &mut Expr) -> Result<()> {
        if expr.is_typed() {
            return Ok(());
        }

        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::Integer(_) => Type::int(),
            ExprKind::Double(_) => Type::double(),
            ExprKind::Str(_) => Type::string(),
            ExprKind::Null => Type::pointer(Type::unspecified()),
            ExprKind::Read => Type::unspecified(),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, span)?,
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, span)?,
            ExprKind::Rvalue(lvalue) => {
                self.check_lvalue(lvalue)?;
                lvalue.ty()
            }
            ExprKind::Assign { target, value } => self.check_assign(target, value, span)?,
            ExprKind::AddressOf(lvalue) => {
                self.check_lvalue(lvalue)?;
                address_type(lvalue.ty())
            }
            ExprKind::Alloc(count) => {
                self.check_expr(count)?;
                default_to_int(count);
                if !count.ty().is_int() {
                    return Err(CompilationError::type_mismatch(
                        format!(
                            "wrong type in argument of objects (expected int, found {})",
                            count.ty()
                        ),
                        span,
                    ));
                }
                Type::pointer(Type::unspecified())
            }
            ExprKind::SizeOf(operand) => {
                self.check_expr(operand)?;
                default_to_int(operand);
                Type::int()
            }
            ExprKind::Call { callee, args } => self.check_call(callee.as_deref_mut(), args, span)?,
            ExprKind::Function(function) => self.check_function(function)?,
        };

        expr.annotate(ty);
        Ok(())
    }

    /// Annotates an lvalue, resolving variables through the symbol table.
    pub fn check_lvalue(&mut self, lvalue: &mut Lvalue) -> Result<()> {
        if lvalue.is_typed() {
            return Ok(());
        }

        let span = lvalue.span;
        let ty = match &mut lvalue.kind {
            LvalueKind::Variable { name, symbol } => {
                let Some((found, depth)) = self.symbols.find_with_depth(name) else {
                    return Err(CompilationError::UndeclaredVariable {
                        name: name.clone(),
                        span,
                    });
                };
                let frame = self.frame_scopes.last().copied().unwrap_or(0);
                if !found.is_global() && depth < frame {
                    return Err(CompilationError::InvalidOperation {
                        message: format!("'{name}' is a local of an enclosing function"),
                        span,
                    });
                }
                let ty = found.ty().clone();
                *symbol = Some(found);
                ty
            }
            LvalueKind::Index { base, index } => self.check_index(base, index, span)?,
        };

        lvalue.annotate(ty);
        Ok(())
    }

    fn check_index(&mut self, base: &mut Expr, index: &mut Expr, span: Span) -> Result<Type> {
        self.check_expr(base)?;
        self.check_expr(index)?;
        default_to_int(index);

        if !index.ty().is_int() {
            return Err(CompilationError::type_mismatch(
                format!(
                    "wrong type in pointer index (expected int, found {})",
                    index.ty()
                ),
                span,
            ));
        }

        let base_ty = base.ty();
        let Some(element) = base_ty.referenced() else {
            return Err(CompilationError::type_mismatch(
                format!("indexing requires a pointer (found {base_ty})"),
                span,
            ));
        };

        if element.is_unspecified() {
            base.annotate(Type::pointer(Type::int()));
            return Ok(Type::int());
        }
        Ok(element.clone())
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &mut Expr, span: Span) -> Result<Type> {
        self.check_expr(operand)?;
        default_to_int(operand);

        let ty = operand.ty();
        if !ty.is_numeric() {
            return Err(CompilationError::type_mismatch(
                format!("wrong type in argument of unary {op} (found {ty})"),
                span,
            ));
        }

        Ok(match op {
            UnaryOp::Not => Type::int(),
            UnaryOp::Neg | UnaryOp::Plus => ty,
        })
    }

    fn check_assign(&mut self, target: &mut Lvalue, value: &mut Expr, span: Span) -> Result<Type> {
        self.check_lvalue(target)?;
        self.check_expr(value)?;

        let target_ty = target.ty();
        if !settle(&target_ty, value) {
            return Err(CompilationError::type_mismatch(
                format!(
                    "wrong type in assignment (expected {target_ty}, found {})",
                    value.ty()
                ),
                span,
            ));
        }
        Ok(target_ty)
    }
}

/// Type of `@x` given the type of `x`. A `void!` location already is an
/// untyped address and keeps its type.
fn address_type(location: Type) -> Type {
    match location.referenced() {
        Some(referenced) if referenced.is_void() => location,
        _ => Type::pointer(location),
    }
}
