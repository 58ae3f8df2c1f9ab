//! Reference postfix stack machine.
//!
//! [`Machine`] loads a compiled [`Module`](til_compiler::Module), supplies
//! the runtime-support routines (`printi`, `printd`, `prints`, `println`,
//! `readi`, `readd`) and runs the entry point. Printed text is captured
//! rather than written to stdout.

mod error;
pub mod image;
mod machine;
pub mod memory;
pub mod runtime;

pub use error::RuntimeError;
pub use image::Image;
pub use machine::Machine;
pub use runtime::Routine;

/// Machine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Bytes of memory shared by static data and the stack.
    pub memory_size: u32,
    /// Instructions to execute before giving up; `None` runs forever.
    pub step_limit: Option<u64>,
    /// Label called by [`Machine::run`].
    pub entry_label: String,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_size: 1 << 20,
            step_limit: Some(50_000_000),
            entry_label: "_main".to_string(),
        }
    }
}

impl VmConfig {
    pub fn with_memory_size(mut self, bytes: u32) -> Self {
        self.memory_size = bytes;
        self
    }

    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn with_entry_label(mut self, label: impl Into<String>) -> Self {
        self.entry_label = label.into();
        self
    }
}
