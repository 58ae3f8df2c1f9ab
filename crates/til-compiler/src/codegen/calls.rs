//! Calls, value coercion and function-value wrapping.

use til_ast::Expr;
use til_core::{CompilationError, POINTER_SIZE, Type};

use super::{CodeGenerator, Result};
use crate::emit::{DataItem, Instruction};
use crate::lower::{Lowered, wrap_function_value};

/// Whether a function value of type `actual` must go through a trampoline
/// to be used as `expected`.
pub(super) fn needs_wrapping(expected: &Type, actual: &Type) -> bool {
    expected.is_function() && actual.is_function() && expected != actual
}

impl CodeGenerator {
    /// Emits a call. Arguments are pushed right to left, each converted to
    /// its parameter type, and dropped once the callee returns.
    pub(super) fn emit_call(
        &mut self,
        callee: Option<&Expr>,
        args: &[Expr],
        result: &Type,
    ) -> Result<()> {
        let signature = match callee {
            Some(callee) => callee.ty().as_function().cloned(),
            None => Some(self.frame()?.signature.clone()),
        }
        .ok_or_else(|| CompilationError::internal("call through a non-function value"))?;

        let mut argument_bytes = 0;
        for (arg, param) in args.iter().zip(&signature.inputs).rev() {
            self.emit_coerced(param, arg)?;
            argument_bytes += param.size();
        }

        match callee {
            Some(callee) => {
                self.emit_value(callee)?;
                match self.external_call.take() {
                    Some(name) => self.emit(Instruction::Call(name)),
                    None => self.emit(Instruction::Branch),
                }
            }
            None => {
                let own = self.frame()?.label.clone();
                self.emit(Instruction::Call(own));
            }
        }

        if argument_bytes > 0 {
            self.emit(Instruction::Trash(argument_bytes));
        }
        if result.is_double() {
            self.emit(Instruction::LdFval64);
        } else if !result.is_void() {
            self.emit(Instruction::LdFval32);
        }
        Ok(())
    }

    /// Emits `value` converted to `expected`: ints widen to doubles and
    /// function values of another shape are wrapped.
    pub(super) fn emit_coerced(&mut self, expected: &Type, value: &Expr) -> Result<()> {
        let actual = value.ty();
        if needs_wrapping(expected, &actual) {
            return self.emit_wrapped(expected, value);
        }

        self.emit_expr(value)?;
        if expected.is_double() && actual.is_int() {
            self.emit(Instruction::I2D);
        }
        Ok(())
    }

    /// Stores `value` in a hidden global at run time and pushes the
    /// address of a trampoline with the expected signature.
    fn emit_wrapped(&mut self, expected: &Type, value: &Expr) -> Result<()> {
        let lowered = self.lower(value, expected)?;

        self.emitter.bss(DataItem::Label(lowered.holder.name.clone()));
        self.emitter.bss(DataItem::SAlloc(lowered.holder.ty.size()));

        self.emit_expr(&lowered.store)?;
        self.emit(Instruction::Trash(POINTER_SIZE));
        self.emit_expr(&lowered.trampoline)
    }

    /// Static counterpart of [`emit_wrapped`](Self::emit_wrapped) for
    /// global initializers: the hidden global is initialized in data.
    /// Returns the trampoline's label.
    pub(super) fn emit_static_wrapper(&mut self, value: &Expr, expected: &Type) -> Result<String> {
        let lowered = self.lower(value, expected)?;
        let stored = lowered
            .stored_value()
            .ok_or_else(|| CompilationError::internal("wrapper without a stored value"))?;

        let holder = &lowered.holder;
        let initial = self.static_value(stored, &holder.ty, &holder.name)?;
        self.emitter.data(DataItem::Label(holder.name.clone()));
        self.emitter.data(initial);

        let trampoline = lowered
            .trampoline_function()
            .ok_or_else(|| CompilationError::internal("wrapper without a trampoline"))?;
        self.emit_function(trampoline)
    }

    fn lower(&mut self, value: &Expr, expected: &Type) -> Result<Lowered> {
        let holder = format!("{}{}", self.options.wrapper_prefix, self.wrappers);
        self.wrappers += 1;
        wrap_function_value(value, expected, &holder)
    }
}
