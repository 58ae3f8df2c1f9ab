//! Statements and control flow.

use til_ast::{Block, Expr, Stmt, StmtKind};
use til_core::{CompilationError, Span};

use super::{CodeGenerator, Result, runtime};
use crate::emit::Instruction;

impl CodeGenerator {
    /// Emits a block's local initializers and then its statements.
    ///
    /// After a `return`, `next` or `stop` any further statement in the same
    /// block is rejected.
    pub(super) fn emit_block(&mut self, block: &Block) -> Result<()> {
        for declaration in &block.declarations {
            self.emit_declaration(declaration)?;
        }

        self.frame_mut()?.unreachable = false;
        for statement in &block.statements {
            if self.frame()?.unreachable {
                return Err(CompilationError::UnreachableCode {
                    span: statement.span,
                });
            }
            self.emit_stmt(statement)?;
        }
        self.frame_mut()?.unreachable = false;
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Eval(value) => {
                self.emit_expr(value)?;
                let size = value.ty().size();
                if size > 0 {
                    self.emit(Instruction::Trash(size));
                }
                Ok(())
            }
            StmtKind::Print { args, newline } => {
                for arg in args {
                    self.emit_print(arg)?;
                }
                if *newline {
                    self.call_runtime(runtime::PRINT_NEWLINE);
                }
                Ok(())
            }
            StmtKind::If {
                condition,
                then_block,
            } => {
                let end = self.emitter.new_label();
                self.emit_expr(condition)?;
                self.emit(Instruction::Jz(end.clone()));
                self.emit_block(then_block)?;
                self.emit(Instruction::Label(end));
                Ok(())
            }
            StmtKind::IfElse {
                condition,
                then_block,
                else_block,
            } => {
                let otherwise = self.emitter.new_label();
                let end = self.emitter.new_label();
                self.emit_expr(condition)?;
                self.emit(Instruction::Jz(otherwise.clone()));
                self.emit_block(then_block)?;
                self.emit(Instruction::Jmp(end.clone()));
                self.emit(Instruction::Label(otherwise));
                self.emit_block(else_block)?;
                self.emit(Instruction::Label(end));
                Ok(())
            }
            StmtKind::Loop { condition, body } => self.emit_loop(condition, body),
            StmtKind::Next { level } => self.emit_loop_jump(*level, false, stmt.span),
            StmtKind::Stop { level } => self.emit_loop_jump(*level, true, stmt.span),
            StmtKind::Return(value) => self.emit_return(value.as_ref()),
            StmtKind::Block(inner) => self.emit_block(inner),
        }
    }

    fn emit_print(&mut self, arg: &Expr) -> Result<()> {
        self.emit_expr(arg)?;
        let ty = arg.ty();
        let routine = if ty.is_int() {
            runtime::PRINT_INT
        } else if ty.is_double() {
            runtime::PRINT_DOUBLE
        } else if ty.is_string() {
            runtime::PRINT_STRING
        } else {
            return Err(CompilationError::internal(format!("cannot print a value of type {ty}")));
        };
        self.call_runtime(routine);
        self.emit(Instruction::Trash(ty.size()));
        Ok(())
    }

    fn emit_loop(&mut self, condition: &Expr, body: &Block) -> Result<()> {
        let check = self.emitter.new_label();
        let end = self.emitter.new_label();

        self.emit(Instruction::Label(check.clone()));
        self.emit_expr(condition)?;
        self.emit(Instruction::Jz(end.clone()));

        let loops = &mut self.frame_mut()?.loops;
        loops.enter_loop(check.clone(), end.clone());
        let body = self.emit_block(body);
        self.frame_mut()?.loops.exit_loop();
        body?;

        self.emit(Instruction::Jmp(check));
        self.emit(Instruction::Label(end));
        Ok(())
    }

    /// `next` jumps to the condition of the loop `level` nestings out,
    /// `stop` past its end.
    fn emit_loop_jump(&mut self, level: u32, stop: bool, span: Span) -> Result<()> {
        let frame = self.frame()?;
        let targets = frame
            .loops
            .target(level)
            .map_err(|err| CompilationError::InvalidLoopControl {
                message: err.to_string(),
                span,
            })?;
        let label = if stop {
            targets.end.clone()
        } else {
            targets.condition.clone()
        };

        self.emit(Instruction::Jmp(label));
        self.frame_mut()?.unreachable = true;
        Ok(())
    }

    fn emit_return(&mut self, value: Option<&Expr>) -> Result<()> {
        let frame = self.frame()?;
        let output = frame.signature.output.clone();
        let return_label = frame.return_label.clone();

        if let Some(value) = value {
            self.emit_coerced(&output, value)?;
            self.emit(if output.is_double() {
                Instruction::StFval64
            } else {
                Instruction::StFval32
            });
        }

        self.emit(Instruction::Jmp(return_label));
        self.frame_mut()?.unreachable = true;
        Ok(())
    }
}
