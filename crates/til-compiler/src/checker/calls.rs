//! Calls and returns.

use std::rc::Rc;

use til_ast::Expr;
use til_core::{CompilationError, FunctionType, Span, Type};

use super::{Result, TypeChecker, settle};

impl TypeChecker {
    /// Checks a call and returns its result type.
    ///
    /// A call without a callee invokes the innermost enclosing function.
    pub(super) fn check_call(
        &mut self,
        callee: Option<&mut Expr>,
        args: &mut [Expr],
        span: Span,
    ) -> Result<Type> {
        let signature = match callee {
            Some(callee) => {
                self.check_expr(callee)?;
                let ty = callee.ty();
                match ty.as_function() {
                    Some(signature) => signature.clone(),
                    None => {
                        return Err(CompilationError::type_mismatch(
                            format!("called expression of type {ty} is not a function"),
                            span,
                        ));
                    }
                }
            }
            None => self.recursion_target(span)?,
        };

        if args.len() != signature.inputs.len() {
            return Err(CompilationError::ArityMismatch {
                expected: signature.inputs.len(),
                found: args.len(),
                span,
            });
        }

        for (position, (arg, param)) in args.iter_mut().zip(&signature.inputs).enumerate() {
            self.check_expr(arg)?;
            if !settle(param, arg) {
                return Err(CompilationError::type_mismatch(
                    format!(
                        "wrong type for argument {} (expected {param}, found {})",
                        position + 1,
                        arg.ty()
                    ),
                    arg.span,
                ));
            }
        }

        Ok(signature.output.clone())
    }

    /// Checks a `return` against the enclosing function's output type.
    pub(super) fn check_return(&mut self, value: Option<&mut Expr>, span: Span) -> Result<()> {
        let Some(function) = self.enclosing_function() else {
            return Err(CompilationError::invalid_operation("return outside of a function", span));
        };
        let Some(signature) = function.ty().as_function() else {
            return Err(CompilationError::internal("function sentinel without a function type"));
        };
        let output = &signature.output;

        match value {
            Some(_) if output.is_void() => Err(CompilationError::type_mismatch(
                "void function cannot return a value",
                span,
            )),
            None if output.is_void() => Ok(()),
            None => Err(CompilationError::type_mismatch(
                format!("missing return value (expected {output})"),
                span,
            )),
            Some(value) => {
                self.check_expr(value)?;
                if settle(output, value) {
                    Ok(())
                } else {
                    Err(CompilationError::type_mismatch(
                        format!(
                            "wrong type in return value (expected {output}, found {})",
                            value.ty()
                        ),
                        span,
                    ))
                }
            }
        }
    }

    fn recursion_target(&self, span: Span) -> Result<Rc<FunctionType>> {
        let Some(function) = self.enclosing_function() else {
            return Err(CompilationError::invalid_operation(
                "recursive call outside of a function",
                span,
            ));
        };
        if function.is_entry_point() {
            return Err(CompilationError::invalid_operation(
                "the program entry point cannot be called recursively",
                span,
            ));
        }
        function.ty().as_function().cloned().ok_or_else(|| {
            CompilationError::internal("function sentinel without a function type")
        })
    }
}
