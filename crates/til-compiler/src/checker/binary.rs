//! Binary operator checking.

use til_ast::{BinaryOp, Expr};
use til_core::{CompilationError, Span, Type, deep_compare};

use super::{Result, TypeChecker};

impl TypeChecker {
    pub(super) fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &mut Expr,
        right: &mut Expr,
        span: Span,
    ) -> Result<Type> {
        self.check_expr(left)?;
        self.check_expr(right)?;
        adopt_sibling_type(left, right);

        let (left_ty, right_ty) = (left.ty(), right.ty());
        match op {
            BinaryOp::Add | BinaryOp::Sub if left_ty.is_pointer() || right_ty.is_pointer() => {
                pointer_arithmetic(op, &left_ty, &right_ty, span)
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                numeric(op, &left_ty, &right_ty, span)
            }
            BinaryOp::Mod => {
                if !left_ty.is_int() {
                    return Err(wrong_side("left", op, &left_ty, span));
                }
                if !right_ty.is_int() {
                    return Err(wrong_side("right", op, &right_ty, span));
                }
                Ok(Type::int())
            }
            _ => {
                numeric(op, &left_ty, &right_ty, span)?;
                Ok(Type::int())
            }
        }
    }
}

/// An operand that is still unresolved takes the numeric type of the other
/// one; `int` when the other is not numeric or also unresolved.
fn adopt_sibling_type(left: &mut Expr, right: &mut Expr) {
    let sibling_type = |sibling: &Expr| {
        if sibling.ty().is_double() {
            Type::double()
        } else {
            Type::int()
        }
    };

    match (left.ty().is_unspecified(), right.ty().is_unspecified()) {
        (true, true) => {
            left.annotate(Type::int());
            right.annotate(Type::int());
        }
        (true, false) => left.annotate(sibling_type(right)),
        (false, true) => right.annotate(sibling_type(left)),
        (false, false) => {}
    }
}

/// int/double operands; mixed operands give `double`.
fn numeric(op: BinaryOp, left: &Type, right: &Type, span: Span) -> Result<Type> {
    if !left.is_numeric() {
        return Err(wrong_side("left", op, left, span));
    }
    if !right.is_numeric() {
        return Err(wrong_side("right", op, right, span));
    }
    Ok(if left.is_double() || right.is_double() {
        Type::double()
    } else {
        Type::int()
    })
}

/// `p + n`, `n + p`, `p - n` and `p - q`.
fn pointer_arithmetic(op: BinaryOp, left: &Type, right: &Type, span: Span) -> Result<Type> {
    match (left.referenced(), right.referenced()) {
        (Some(_), None) if right.is_int() => Ok(left.clone()),
        (None, Some(_)) if op == BinaryOp::Add && left.is_int() => Ok(right.clone()),
        (Some(lhs), Some(rhs)) if op == BinaryOp::Sub => {
            if deep_compare(lhs, rhs, false) || lhs == rhs {
                Ok(Type::int())
            } else {
                Err(CompilationError::type_mismatch(
                    format!("pointer subtraction of unrelated types {left} and {right}"),
                    span,
                ))
            }
        }
        (Some(_), _) => Err(wrong_side("right", op, right, span)),
        (None, _) => Err(wrong_side("left", op, left, span)),
    }
}

fn wrong_side(side: &str, op: BinaryOp, ty: &Type, span: Span) -> CompilationError {
    CompilationError::type_mismatch(
        format!("wrong type in {side} argument of '{op}' (found {ty})"),
        span,
    )
}
