//! Code generation for the postfix machine.
//!
//! [`CodeGenerator`] walks a type-checked tree and emits a [`Module`].
//! Generator state lives in one context object: the emitter, the stack of
//! functions being emitted, the externals still to declare, the pending
//! external-call name and the wrapper counter.

mod calls;
mod decl;
mod expr;
mod function;
mod ops;
mod stmt;

use std::collections::BTreeSet;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use til_ast::Program;
use til_core::{CompilationError, FunctionType, Type};

use crate::CompilerOptions;
use crate::emit::{Emitter, Instruction, LoopLabels, Module};

type Result<T> = std::result::Result<T, CompilationError>;

/// Names of the runtime-support routines the generated code calls.
pub mod runtime {
    pub const PRINT_INT: &str = "printi";
    pub const PRINT_DOUBLE: &str = "printd";
    pub const PRINT_STRING: &str = "prints";
    pub const PRINT_NEWLINE: &str = "println";
    pub const READ_INT: &str = "readi";
    pub const READ_DOUBLE: &str = "readd";
}

/// State of one function being emitted.
#[derive(Debug)]
struct FunctionFrame {
    label: String,
    return_label: String,
    signature: Rc<FunctionType>,
    loops: LoopLabels,
    /// Set after `return`, `next` or `stop` until the block ends.
    unreachable: bool,
}

/// Emits postfix code for a type-checked program.
#[derive(Debug)]
pub struct CodeGenerator {
    emitter: Emitter,
    options: CompilerOptions,
    frames: Vec<FunctionFrame>,
    /// Declared-only or runtime names not defined by the module.
    pending_externals: BTreeSet<String>,
    /// Names reserved by `forward` or `external`.
    reserved: FxHashSet<String>,
    /// Name of an external symbol just referenced, consumed by the next call.
    external_call: Option<String>,
    wrappers: u32,
}

impl CodeGenerator {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            emitter: Emitter::new(),
            options,
            frames: Vec::new(),
            pending_externals: BTreeSet::new(),
            reserved: FxHashSet::default(),
            external_call: None,
            wrappers: 0,
        }
    }

    /// Emits the globals and the entry point of `program`.
    ///
    /// The tree must have been checked by [`crate::TypeChecker`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program) -> Result<Module> {
        for declaration in &program.declarations {
            self.emit_global(declaration)?;
        }
        if let Some(main) = &program.main {
            self.emit_function(main)?;
        }

        let externs = self.pending_externals.into_iter().collect();
        self.emitter.finish(externs)
    }

    fn emit(&mut self, instruction: Instruction) {
        self.emitter.emit(instruction);
    }

    fn frame(&self) -> Result<&FunctionFrame> {
        self.frames
            .last()
            .ok_or_else(|| CompilationError::internal("statement emitted outside of a function"))
    }

    fn frame_mut(&mut self) -> Result<&mut FunctionFrame> {
        self.frames
            .last_mut()
            .ok_or_else(|| CompilationError::internal("statement emitted outside of a function"))
    }

    /// Calls a runtime-support routine and records it as external.
    fn call_runtime(&mut self, routine: &str) {
        self.pending_externals.insert(routine.to_string());
        self.emit(Instruction::Call(routine.to_string()));
    }
}

fn load_for(ty: &Type) -> Instruction {
    if ty.is_double() {
        Instruction::LdDouble
    } else {
        Instruction::LdInt
    }
}

fn store_for(ty: &Type) -> Instruction {
    if ty.is_double() {
        Instruction::StDouble
    } else {
        Instruction::StInt
    }
}

fn dup_for(ty: &Type) -> Instruction {
    if ty.is_double() {
        Instruction::Dup64
    } else {
        Instruction::Dup32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Compiler;
    use crate::emit::DataItem;
    use til_ast::build::*;

    /// Compiles a program whose main block is `main`.
    pub(super) fn compile_main(main: til_ast::Block) -> Result<Module> {
        Compiler::compile(&mut program(vec![], Some(main)))
    }

    pub(super) fn main_code(module: &Module) -> &[Instruction] {
        &module.function("_main").unwrap().code
    }

    #[test]
    fn empty_main_returns_zero() {
        let module = compile_main(block(vec![], vec![])).unwrap();
        let code = main_code(&module);
        assert_eq!(code[0], Instruction::Enter(0));
        assert_eq!(
            &code[1..],
            &[
                Instruction::Int(0),
                Instruction::StFval32,
                Instruction::Label("_L1".into()),
                Instruction::Leave,
                Instruction::Ret,
            ]
        );
        assert!(module.function("_main").unwrap().public);
    }

    #[test]
    fn entry_label_is_configurable() {
        let mut program = program(vec![], Some(block(vec![], vec![])));
        let options = CompilerOptions::default().with_entry_label("start");
        let module = Compiler::compile_with(&mut program, options).unwrap();
        assert!(module.function("start").is_some());
    }

    #[test]
    fn globals_without_main() {
        let mut program = program(vec![declare(Type::int(), "counter", None)], None);
        let module = Compiler::compile(&mut program).unwrap();
        assert!(module.functions.is_empty());
        assert_eq!(
            module.bss,
            vec![DataItem::Label("counter".into()), DataItem::SAlloc(4)]
        );
    }

    #[test]
    fn runtime_routines_become_externs() {
        let module = compile_main(block(
            vec![],
            vec![println(vec![int(1), double(2.0), string("x")])],
        ))
        .unwrap();
        assert_eq!(
            module.externs,
            vec!["printd", "printi", "println", "prints"]
        );
    }
}
