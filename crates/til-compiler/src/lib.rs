//! TIL compiler passes.
//!
//! Compilation runs three passes over a [`til_ast::Program`]:
//!
//! 1. [`checker::TypeChecker`] annotates every expression with a type and
//!    resolves every name to a [`til_core::Symbol`].
//! 2. [`frame::FrameSizeCalculator`] assigns local offsets per function.
//! 3. [`codegen::CodeGenerator`] emits a postfix stack-machine
//!    [`emit::Module`], wrapping covariant function values through
//!    [`lower::wrap_function_value`] where needed.
//!
//! [`Compiler`] runs them in order.

pub mod checker;
pub mod codegen;
pub mod emit;
pub mod frame;
pub mod lower;
mod options;
pub mod scope;

pub use checker::TypeChecker;
pub use codegen::CodeGenerator;
pub use emit::Module;
pub use options::CompilerOptions;
pub use scope::SymbolTable;

use til_ast::Program;
use til_core::CompilationError;

type Result<T> = std::result::Result<T, CompilationError>;

/// Runs every pass over a program.
pub struct Compiler;

impl Compiler {
    /// Checks and compiles `program` with default options.
    ///
    /// The tree is annotated in place.
    pub fn compile(program: &mut Program) -> Result<Module> {
        Self::compile_with(program, CompilerOptions::default())
    }

    /// Checks and compiles `program`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_with(program: &mut Program, options: CompilerOptions) -> Result<Module> {
        TypeChecker::new().check_program(program)?;
        CodeGenerator::new(options).generate(program)
    }
}
