//! Unary and binary operators.

use ordered_float::OrderedFloat;
use til_ast::{BinaryOp, Expr, UnaryOp};
use til_core::{CompilationError, Type};

use super::{CodeGenerator, Result};
use crate::emit::Instruction;

impl CodeGenerator {
    pub(super) fn emit_unary(&mut self, op: UnaryOp, operand: &Expr, ty: &Type) -> Result<()> {
        match op {
            UnaryOp::Plus => self.emit_expr(operand),
            UnaryOp::Neg => {
                self.emit_expr(operand)?;
                self.emit(if ty.is_double() {
                    Instruction::DNeg
                } else {
                    Instruction::Neg
                });
                Ok(())
            }
            UnaryOp::Not => {
                self.emit_truth(operand)?;
                self.emit(Instruction::Int(0));
                self.emit(Instruction::Eq);
                Ok(())
            }
        }
    }

    pub(super) fn emit_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ty: &Type,
    ) -> Result<()> {
        let (left_ty, right_ty) = (left.ty(), right.ty());
        match op {
            BinaryOp::And | BinaryOp::Or => self.emit_short_circuit(op, left, right),
            BinaryOp::Add | BinaryOp::Sub if left_ty.is_pointer() || right_ty.is_pointer() => {
                self.emit_pointer_arithmetic(op, left, right)
            }
            _ if op.is_comparison() => {
                let wide = left_ty.is_double() || right_ty.is_double();
                self.emit_operand(left, wide)?;
                self.emit_operand(right, wide)?;
                if wide {
                    self.emit(Instruction::DCmp);
                    self.emit(Instruction::Int(0));
                }
                self.emit(int_instruction(op)?);
                Ok(())
            }
            _ => {
                let wide = ty.is_double();
                self.emit_operand(left, wide)?;
                self.emit_operand(right, wide)?;
                self.emit(if wide {
                    double_instruction(op)?
                } else {
                    int_instruction(op)?
                });
                Ok(())
            }
        }
    }

    /// Emits an operand, widening an int when the operation is on doubles.
    fn emit_operand(&mut self, operand: &Expr, wide: bool) -> Result<()> {
        self.emit_expr(operand)?;
        if wide && operand.ty().is_int() {
            self.emit(Instruction::I2D);
        }
        Ok(())
    }

    /// Emits `operand` normalized to 0 or 1.
    fn emit_truth(&mut self, operand: &Expr) -> Result<()> {
        self.emit_expr(operand)?;
        if operand.ty().is_double() {
            self.emit(Instruction::Double(OrderedFloat(0.0)));
            self.emit(Instruction::DCmp);
        }
        self.emit(Instruction::Int(0));
        self.emit(Instruction::Ne);
        Ok(())
    }

    /// `and` skips its right side when the left is false, `or` when it is
    /// true; the left value is then the result.
    fn emit_short_circuit(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<()> {
        let end = self.emitter.new_label();
        self.emit_truth(left)?;
        self.emit(Instruction::Dup32);
        self.emit(if op == BinaryOp::And {
            Instruction::Jz(end.clone())
        } else {
            Instruction::Jnz(end.clone())
        });
        self.emit_truth(right)?;
        self.emit(int_instruction(op)?);
        self.emit(Instruction::Label(end));
        Ok(())
    }

    /// Pointer offsets are scaled by the element size; a pointer
    /// difference is divided by it.
    fn emit_pointer_arithmetic(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<()> {
        let (left_ty, right_ty) = (left.ty(), right.ty());

        if left_ty.is_pointer() && right_ty.is_pointer() {
            self.emit_expr(left)?;
            self.emit_expr(right)?;
            self.emit(Instruction::Sub);
            self.emit(Instruction::Int(left_ty.stride() as i32));
            self.emit(Instruction::Div);
            return Ok(());
        }

        let pointer = if left_ty.is_pointer() {
            &left_ty
        } else {
            &right_ty
        };
        let stride = pointer.stride() as i32;
        for operand in [left, right] {
            self.emit_expr(operand)?;
            if !operand.ty().is_pointer() {
                self.emit(Instruction::Int(stride));
                self.emit(Instruction::Mul);
            }
        }
        self.emit(int_instruction(op)?);
        Ok(())
    }
}

fn int_instruction(op: BinaryOp) -> Result<Instruction> {
    Ok(match op {
        BinaryOp::Add => Instruction::Add,
        BinaryOp::Sub => Instruction::Sub,
        BinaryOp::Mul => Instruction::Mul,
        BinaryOp::Div => Instruction::Div,
        BinaryOp::Mod => Instruction::Mod,
        BinaryOp::Lt => Instruction::Lt,
        BinaryOp::Le => Instruction::Le,
        BinaryOp::Gt => Instruction::Gt,
        BinaryOp::Ge => Instruction::Ge,
        BinaryOp::Eq => Instruction::Eq,
        BinaryOp::Ne => Instruction::Ne,
        BinaryOp::And => Instruction::And,
        BinaryOp::Or => Instruction::Or,
    })
}

fn double_instruction(op: BinaryOp) -> Result<Instruction> {
    match op {
        BinaryOp::Add => Ok(Instruction::DAdd),
        BinaryOp::Sub => Ok(Instruction::DSub),
        BinaryOp::Mul => Ok(Instruction::DMul),
        BinaryOp::Div => Ok(Instruction::DDiv),
        _ => Err(CompilationError::internal(format!("no double form of '{op}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{compile_main, main_code};
    use super::*;
    use til_ast::build::*;

    fn eval_code(declarations: Vec<til_ast::Declaration>, value: Expr) -> Vec<Instruction> {
        let module = compile_main(block(declarations, vec![eval(value)])).unwrap();
        let code = main_code(&module);
        // skip ENTER; drop TRASH and the epilogue
        code[1..code.len() - 6].to_vec()
    }

    #[test]
    fn int_arithmetic() {
        assert_eq!(
            eval_code(vec![], binary(BinaryOp::Mod, int(7), int(3))),
            vec![Instruction::Int(7), Instruction::Int(3), Instruction::Mod]
        );
    }

    #[test]
    fn mixed_arithmetic_widens_int_side() {
        assert_eq!(
            eval_code(vec![], add(int(1), double(2.5))),
            vec![
                Instruction::Int(1),
                Instruction::I2D,
                Instruction::Double(OrderedFloat(2.5)),
                Instruction::DAdd,
            ]
        );
    }

    #[test]
    fn double_comparison_goes_through_dcmp() {
        assert_eq!(
            eval_code(vec![], lt(double(1.0), int(2))),
            vec![
                Instruction::Double(OrderedFloat(1.0)),
                Instruction::Int(2),
                Instruction::I2D,
                Instruction::DCmp,
                Instruction::Int(0),
                Instruction::Lt,
            ]
        );
    }

    #[test]
    fn and_short_circuits() {
        assert_eq!(
            eval_code(vec![], binary(BinaryOp::And, int(0), int(5))),
            vec![
                Instruction::Int(0),
                Instruction::Int(0),
                Instruction::Ne,
                Instruction::Dup32,
                Instruction::Jz("_L2".into()),
                Instruction::Int(5),
                Instruction::Int(0),
                Instruction::Ne,
                Instruction::And,
                Instruction::Label("_L2".into()),
            ]
        );
    }

    #[test]
    fn or_jumps_when_true() {
        let code = eval_code(vec![], binary(BinaryOp::Or, int(1), int(0)));
        assert_eq!(code[4], Instruction::Jnz("_L2".into()));
        assert_eq!(code[8], Instruction::Or);
    }

    #[test]
    fn not_of_double() {
        assert_eq!(
            eval_code(vec![], not(double(0.0))),
            vec![
                Instruction::Double(OrderedFloat(0.0)),
                Instruction::Double(OrderedFloat(0.0)),
                Instruction::DCmp,
                Instruction::Int(0),
                Instruction::Ne,
                Instruction::Int(0),
                Instruction::Eq,
            ]
        );
    }

    #[test]
    fn negation() {
        assert_eq!(
            eval_code(vec![], neg(double(2.0))),
            vec![Instruction::Double(OrderedFloat(2.0)), Instruction::DNeg]
        );
        assert_eq!(
            eval_code(vec![], neg(int(2))),
            vec![Instruction::Int(2), Instruction::Neg]
        );
    }

    #[test]
    fn pointer_plus_int_scales_offset() {
        let decls = vec![declare(Type::pointer(Type::double()), "p", None)];
        assert_eq!(
            eval_code(decls, add(int(2), id("p"))),
            vec![
                Instruction::Int(2),
                Instruction::Int(8),
                Instruction::Mul,
                Instruction::Local(-4),
                Instruction::LdInt,
                Instruction::Add,
            ]
        );
    }

    #[test]
    fn pointer_difference_divides() {
        let decls = vec![
            declare(Type::pointer(Type::double()), "p", None),
            declare(Type::pointer(Type::double()), "q", None),
        ];
        assert_eq!(
            eval_code(decls, sub(id("p"), id("q"))),
            vec![
                Instruction::Local(-4),
                Instruction::LdInt,
                Instruction::Local(-8),
                Instruction::LdInt,
                Instruction::Sub,
                Instruction::Int(8),
                Instruction::Div,
            ]
        );
    }
}
