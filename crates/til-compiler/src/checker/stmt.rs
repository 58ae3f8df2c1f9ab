//! Statements and blocks.

use til_ast::{Block, Expr, Stmt, StmtKind};
use til_core::CompilationError;

use super::{Result, TypeChecker, default_to_int};

impl TypeChecker {
    /// Checks a block in its own scope.
    pub fn check_block(&mut self, block: &mut Block) -> Result<()> {
        self.scoped(|checker| {
            for declaration in &mut block.declarations {
                checker.check_declaration(declaration)?;
            }
            for statement in &mut block.statements {
                checker.check_stmt(statement)?;
            }
            Ok(())
        })
    }

    pub fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::Eval(value) => {
                self.check_expr(value)?;
                default_to_int(value);
                Ok(())
            }
            StmtKind::Print { args, .. } => {
                for arg in args {
                    self.check_expr(arg)?;
                    default_to_int(arg);
                    let ty = arg.ty();
                    if !(ty.is_numeric() || ty.is_string()) {
                        return Err(CompilationError::type_mismatch(
                            format!("cannot print a value of type {ty}"),
                            arg.span,
                        ));
                    }
                }
                Ok(())
            }
            StmtKind::If {
                condition,
                then_block,
            } => {
                self.check_condition(condition)?;
                self.check_block(then_block)
            }
            StmtKind::IfElse {
                condition,
                then_block,
                else_block,
            } => {
                self.check_condition(condition)?;
                self.check_block(then_block)?;
                self.check_block(else_block)
            }
            StmtKind::Loop { condition, body } => {
                self.check_condition(condition)?;
                self.check_block(body)
            }
            // Loop nesting is only known while emitting code.
            StmtKind::Next { .. } | StmtKind::Stop { .. } => Ok(()),
            StmtKind::Return(value) => self.check_return(value.as_mut(), span),
            StmtKind::Block(inner) => self.check_block(inner),
        }
    }

    fn check_condition(&mut self, condition: &mut Expr) -> Result<()> {
        self.check_expr(condition)?;
        default_to_int(condition);
        let ty = condition.ty();
        if ty.is_int() {
            Ok(())
        } else {
            Err(CompilationError::type_mismatch(
                format!("wrong type in condition (expected int, found {ty})"),
                condition.span,
            ))
        }
    }
}
