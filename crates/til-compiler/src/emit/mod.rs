//! Instruction emission for the postfix machine.
//!
//! The [`Emitter`] keeps a stack of open function chunks so a function
//! literal met while emitting another function is compiled into its own
//! chunk without disturbing the enclosing one. Data segments and the
//! label counter are shared by the whole module.
//!
//! ```
//! use til_compiler::emit::{Emitter, Instruction};
//!
//! let mut emitter = Emitter::new();
//! emitter.begin_function("_main", true, 0);
//! emitter.emit(Instruction::Enter(0));
//! emitter.emit(Instruction::Int(0));
//! emitter.emit(Instruction::StFval32);
//! emitter.emit(Instruction::Leave);
//! emitter.emit(Instruction::Ret);
//! emitter.end_function();
//!
//! let module = emitter.finish(Vec::new()).unwrap();
//! assert_eq!(module.functions[0].code.len(), 5);
//! ```

mod instruction;
mod loops;
mod module;

pub use instruction::{DataItem, Instruction};
pub use loops::{LoopLabels, LoopLevelError, LoopTargets};
pub use module::{CompiledFunction, Module};

use til_core::CompilationError;

/// Builds a [`Module`].
#[derive(Debug, Default)]
pub struct Emitter {
    /// Functions being emitted, innermost last.
    open: Vec<CompiledFunction>,
    module: Module,
    next_label: u32,
    /// Instructions emitted while no function was open.
    stray: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A label no other part of the module uses.
    pub fn new_label(&mut self) -> String {
        self.next_label += 1;
        format!("_L{}", self.next_label)
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Opens a chunk; instructions go to it until [`end_function`](Self::end_function).
    pub fn begin_function(&mut self, label: &str, public: bool, frame_size: u32) {
        self.open.push(CompiledFunction {
            label: label.to_string(),
            public,
            frame_size,
            code: Vec::new(),
        });
    }

    /// Closes the innermost chunk and adds it to the module.
    pub fn end_function(&mut self) {
        if let Some(function) = self.open.pop() {
            self.module.functions.push(function);
        }
    }

    /// Appends to the innermost open chunk.
    pub fn emit(&mut self, instruction: Instruction) {
        match self.open.last_mut() {
            Some(function) => function.code.push(instruction),
            None => self.stray += 1,
        }
    }

    // ==========================================================================
    // Data
    // ==========================================================================

    pub fn data(&mut self, item: DataItem) {
        self.module.data.push(item);
    }

    pub fn rodata(&mut self, item: DataItem) {
        self.module.rodata.push(item);
    }

    pub fn bss(&mut self, item: DataItem) {
        self.module.bss.push(item);
    }

    /// Stores a string literal in read-only data and returns its label.
    pub fn string_literal(&mut self, text: &str) -> String {
        let label = self.new_label();
        self.rodata(DataItem::Label(label.clone()));
        self.rodata(DataItem::SString(text.to_string()));
        label
    }

    /// Completes the module.
    ///
    /// Fails if a function was left open or code was emitted outside of
    /// any function.
    pub fn finish(mut self, externs: Vec<String>) -> Result<Module, CompilationError> {
        if let Some(function) = self.open.last() {
            return Err(CompilationError::internal(format!(
                "function '{}' was never closed",
                function.label
            )));
        }
        if self.stray > 0 {
            return Err(CompilationError::internal(format!(
                "{} instructions emitted outside of a function",
                self.stray
            )));
        }
        self.module.externs = externs;
        Ok(self.module)
    }
}
