//! Function bodies.

use til_ast::Function;
use til_core::CompilationError;

use super::{CodeGenerator, FunctionFrame, Result};
use crate::emit::{Instruction, LoopLabels};
use crate::frame::{FrameSizeCalculator, layout_parameters};

impl CodeGenerator {
    /// Emits `function` into its own chunk and returns its label.
    ///
    /// The enclosing function, if any, is left untouched: its chunk and
    /// frame state are restored when this one is done.
    pub(super) fn emit_function(&mut self, function: &Function) -> Result<String> {
        let Some(signature) = function.signature().as_function().cloned() else {
            return Err(CompilationError::internal("function literal without a signature"));
        };

        let label = if function.is_entry {
            self.options.entry_label.clone()
        } else {
            self.emitter.new_label()
        };
        let return_label = self.emitter.new_label();

        layout_parameters(&function.params)?;
        let frame_size = FrameSizeCalculator::compute(&function.body)?;

        self.emitter.begin_function(&label, function.is_entry, frame_size);
        self.frames.push(FunctionFrame {
            label: label.clone(),
            return_label,
            signature,
            loops: LoopLabels::new(),
            unreachable: false,
        });

        let body = self.emit_function_body(function, frame_size);

        self.frames.pop();
        self.emitter.end_function();
        body?;

        Ok(label)
    }

    fn emit_function_body(&mut self, function: &Function, frame_size: u32) -> Result<()> {
        self.emit(Instruction::Enter(frame_size));
        self.emit_block(&function.body)?;

        if function.is_entry {
            self.emit(Instruction::Int(0));
            self.emit(Instruction::StFval32);
        }

        let return_label = self.frame()?.return_label.clone();
        self.emit(Instruction::Label(return_label));
        self.emit(Instruction::Leave);
        self.emit(Instruction::Ret);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{compile_main, main_code};
    use crate::Compiler;
    use crate::emit::{DataItem, Instruction};
    use til_ast::build::*;
    use til_core::Type;

    fn add_one() -> til_ast::Expr {
        function(
            vec![param("n", Type::int())],
            Type::int(),
            block(vec![], vec![ret(add(id("n"), int(1)))]),
        )
    }

    #[test]
    fn function_body_shape() {
        let mut program = program(vec![declare_var("inc", add_one())], None);
        let module = Compiler::compile(&mut program).unwrap();

        let inc = &module.functions[0];
        assert!(!inc.public);
        assert_eq!(
            inc.code,
            vec![
                Instruction::Enter(0),
                Instruction::Local(8),
                Instruction::LdInt,
                Instruction::Int(1),
                Instruction::Add,
                Instruction::StFval32,
                Instruction::Jmp("_L2".into()),
                Instruction::Label("_L2".into()),
                Instruction::Leave,
                Instruction::Ret,
            ]
        );
        assert_eq!(
            module.data,
            vec![
                DataItem::Label("inc".into()),
                DataItem::SAddr(inc.label.clone()),
            ]
        );
    }

    #[test]
    fn nested_function_does_not_disturb_outer() {
        let module = compile_main(block(
            vec![
                declare(Type::int(), "before", Some(int(1))),
                declare_var("inc", add_one()),
                declare(Type::int(), "after", Some(int(2))),
            ],
            vec![],
        ))
        .unwrap();

        assert_eq!(module.functions.len(), 2);
        let code = main_code(&module);
        assert!(code.contains(&Instruction::Addr(module.functions[0].label.clone())));
        assert_eq!(module.function("_main").unwrap().frame_size, 12);
        assert_eq!(code.last(), Some(&Instruction::Ret));
    }

    #[test]
    fn explicit_return_from_main() {
        let module = compile_main(block(vec![], vec![ret(int(7))])).unwrap();
        let code = main_code(&module);
        let stored = [Instruction::Int(7), Instruction::StFval32];
        assert!(code.windows(2).any(|pair| pair == stored));
    }

    #[test]
    fn double_return_uses_wide_register() {
        let half = function(
            vec![param("x", Type::double())],
            Type::double(),
            block(vec![], vec![ret(id("x"))]),
        );
        let mut program = program(vec![declare_var("half", half)], None);
        let module = Compiler::compile(&mut program).unwrap();
        let code = &module.functions[0].code;
        assert!(code.contains(&Instruction::LdDouble));
        assert!(code.contains(&Instruction::StFval64));
    }
}
