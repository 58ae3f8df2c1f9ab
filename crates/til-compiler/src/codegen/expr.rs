//! Expressions and lvalues.

use ordered_float::OrderedFloat;
use til_ast::{Expr, ExprKind, Lvalue, LvalueKind};
use til_core::CompilationError;

use super::{CodeGenerator, Result, dup_for, load_for, runtime, store_for};
use crate::emit::Instruction;

impl CodeGenerator {
    /// Emits `expr`, leaving its value on the stack.
    pub(super) fn emit_expr(&mut self, expr: &Expr) -> Result<()> {
        self.emit_value(expr)?;
        self.materialize_external();
        Ok(())
    }

    /// Like [`emit_expr`](Self::emit_expr), but an external symbol is left
    /// pending for a call to consume instead of being pushed.
    pub(super) fn emit_value(&mut self, expr: &Expr) -> Result<()> {
        let ty = expr.ty();
        if ty.is_unspecified() {
            return Err(CompilationError::internal(format!(
                "expression at {} reached code generation without a type",
                expr.span
            )));
        }

        match &expr.kind {
            ExprKind::Integer(value) => self.emit(Instruction::Int(*value)),
            ExprKind::Double(value) => self.emit(Instruction::Double(OrderedFloat(*value))),
            ExprKind::Str(text) => {
                let label = self.emitter.string_literal(text);
                self.emit(Instruction::Addr(label));
            }
            ExprKind::Null => self.emit(Instruction::Int(0)),
            ExprKind::Read => {
                if ty.is_double() {
                    self.call_runtime(runtime::READ_DOUBLE);
                    self.emit(Instruction::LdFval64);
                } else {
                    self.call_runtime(runtime::READ_INT);
                    self.emit(Instruction::LdFval32);
                }
            }
            ExprKind::Unary { op, operand } => self.emit_unary(*op, operand, &ty)?,
            ExprKind::Binary { op, left, right } => self.emit_binary(*op, left, right, &ty)?,
            ExprKind::Rvalue(lvalue) => {
                self.emit_address(lvalue)?;
                // An external symbol's value is its address.
                if !lvalue.is_external() {
                    self.emit(load_for(&ty));
                }
            }
            ExprKind::Assign { target, value } => {
                let target_ty = target.ty();
                self.emit_coerced(&target_ty, value)?;
                self.emit(dup_for(&target_ty));
                self.emit_address(target)?;
                self.materialize_external();
                self.emit(store_for(&target_ty));
            }
            ExprKind::AddressOf(lvalue) => self.emit_address(lvalue)?,
            ExprKind::Alloc(count) => {
                self.emit_expr(count)?;
                self.emit(Instruction::Int(ty.stride() as i32));
                self.emit(Instruction::Mul);
                self.emit(Instruction::Alloc);
                self.emit(Instruction::Sp);
            }
            ExprKind::SizeOf(operand) => self.emit(Instruction::Int(operand.ty().size() as i32)),
            ExprKind::Call { callee, args } => self.emit_call(callee.as_deref(), args, &ty)?,
            ExprKind::Function(function) => {
                let label = self.emit_function(function)?;
                self.emit(Instruction::Addr(label));
            }
        }
        Ok(())
    }

    /// Pushes the address of `lvalue`.
    pub(super) fn emit_address(&mut self, lvalue: &Lvalue) -> Result<()> {
        match &lvalue.kind {
            LvalueKind::Variable { name, symbol } => {
                let Some(symbol) = symbol else {
                    return Err(CompilationError::internal(format!(
                        "variable '{name}' was never resolved"
                    )));
                };
                if symbol.is_external() {
                    self.external_call = Some(name.clone());
                } else if symbol.is_global() {
                    self.emit(Instruction::Addr(name.clone()));
                } else {
                    self.emit(Instruction::Local(symbol.offset()));
                }
            }
            LvalueKind::Index { base, index } => {
                self.emit_expr(base)?;
                self.emit_expr(index)?;
                self.emit(Instruction::Int(base.ty().stride() as i32));
                self.emit(Instruction::Mul);
                self.emit(Instruction::Add);
            }
        }
        Ok(())
    }

    /// Pushes the address of an external symbol left pending.
    fn materialize_external(&mut self) {
        if let Some(name) = self.external_call.take() {
            self.emit(Instruction::Addr(name));
        }
    }
}
