//! Compiled output.

use std::fmt;

use super::{DataItem, Instruction};

/// The code of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub label: String,
    /// Exported from the module.
    pub public: bool,
    /// Bytes reserved for locals by `ENTER`.
    pub frame_size: u32,
    pub code: Vec<Instruction>,
}

impl CompiledFunction {
    /// The largest local-offset magnitude the code addresses.
    pub fn deepest_local(&self) -> u32 {
        self.code
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Local(offset) if *offset < 0 => Some(offset.unsigned_abs()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// A compiled program: functions plus data segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub functions: Vec<CompiledFunction>,
    /// Initialized globals.
    pub data: Vec<DataItem>,
    /// String literals.
    pub rodata: Vec<DataItem>,
    /// Zero-initialized globals.
    pub bss: Vec<DataItem>,
    /// Symbols the module expects the runtime or linker to provide.
    pub externs: Vec<String>,
}

impl Module {
    pub fn function(&self, label: &str) -> Option<&CompiledFunction> {
        self.functions
            .iter()
            .find(|function| function.label == label)
    }

    /// Every instruction, function by function.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.functions
            .iter()
            .flat_map(|function| function.code.iter())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            writeln!(f, "TEXT")?;
            writeln!(f, "ALIGN")?;
            if function.public {
                writeln!(f, "GLOBAL {}, FUNC", function.label)?;
            }
            writeln!(f, "LABEL {}", function.label)?;
            for instruction in &function.code {
                writeln!(f, "\t{instruction}")?;
            }
        }

        for (segment, items) in [
            ("RODATA", &self.rodata),
            ("DATA", &self.data),
            ("BSS", &self.bss),
        ] {
            if items.is_empty() {
                continue;
            }
            writeln!(f, "{segment}")?;
            writeln!(f, "ALIGN")?;
            for item in items {
                writeln!(f, "\t{item}")?;
            }
        }

        for name in &self.externs {
            writeln!(f, "EXTERN {name}")?;
        }
        Ok(())
    }
}
