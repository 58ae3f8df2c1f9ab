//! Loading a compiled module into machine memory.
//!
//! Addresses fall into three disjoint ranges: data addresses index
//! [`Memory`], code addresses are [`CODE_BASE`] plus an instruction index,
//! and runtime routines live at [`RUNTIME_BASE`] plus their index.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use til_compiler::emit::{DataItem, Instruction, Module};

use super::memory::{DATA_BASE, Memory};
use super::runtime::Routine;
use super::{RuntimeError, VmConfig};

pub const CODE_BASE: u32 = 0x8000_0000;
pub const RUNTIME_BASE: u32 = 0xF000_0000;
/// Return address that stops the machine.
pub const HALT_ADDRESS: u32 = 0xFFFF_FFF0;

type Result<T> = std::result::Result<T, RuntimeError>;

/// What an address refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Code(usize),
    Routine(Routine),
    Halt,
}

impl Target {
    pub fn of(address: u32) -> Option<Target> {
        if address == HALT_ADDRESS {
            Some(Target::Halt)
        } else if address >= RUNTIME_BASE {
            Routine::from_index(address - RUNTIME_BASE).map(Target::Routine)
        } else if address >= CODE_BASE {
            Some(Target::Code((address - CODE_BASE) as usize))
        } else {
            None
        }
    }
}

/// A module laid out for execution.
#[derive(Debug, Clone)]
pub struct Image {
    /// Every function's code, back to back.
    pub code: Rc<[Instruction]>,
    pub labels: FxHashMap<String, u32>,
    /// Memory with static data in place.
    pub memory: Memory,
    /// First address past static data.
    pub data_end: u32,
}

impl Image {
    pub fn load(module: &Module, config: &VmConfig) -> Result<Image> {
        let mut labels = FxHashMap::default();
        let mut define = |label: &str, address: u32| {
            if labels.insert(label.to_string(), address).is_some() {
                return Err(RuntimeError::DuplicateLabel(label.to_string()));
            }
            Ok(())
        };

        let mut code = Vec::new();
        for function in &module.functions {
            define(&function.label, CODE_BASE + code.len() as u32)?;
            for instruction in &function.code {
                if let Instruction::Label(label) = instruction {
                    define(label, CODE_BASE + code.len() as u32)?;
                }
                code.push(instruction.clone());
            }
        }

        let segments = || module.rodata.iter().chain(&module.data).chain(&module.bss);

        let mut address = DATA_BASE;
        for item in segments() {
            if let DataItem::Label(label) = item {
                define(label, address)?;
            }
            address += item.size();
        }
        let data_end = address;
        if data_end >= config.memory_size {
            return Err(RuntimeError::OutOfMemory {
                needed: data_end,
                available: config.memory_size,
            });
        }

        for routine in Routine::ALL {
            labels
                .entry(routine.name().to_string())
                .or_insert(RUNTIME_BASE + routine.index());
        }

        let mut memory = Memory::new(config.memory_size);
        let mut address = DATA_BASE;
        for item in segments() {
            match item {
                DataItem::Label(_) | DataItem::Global(_) | DataItem::SAlloc(_) => {}
                DataItem::SInt(value) => memory.write_i32(address, *value)?,
                DataItem::SDouble(value) => memory.write_f64(address, value.into_inner())?,
                DataItem::SString(text) => {
                    memory.write_bytes(address, text.as_bytes())?;
                    memory.write_bytes(address + text.len() as u32, &[0])?;
                }
                DataItem::SAddr(label) => {
                    let target = labels
                        .get(label)
                        .ok_or_else(|| RuntimeError::UnresolvedLabel(label.clone()))?;
                    memory.write_i32(address, *target as i32)?;
                }
            }
            address += item.size();
        }

        Ok(Image {
            code: code.into(),
            labels,
            memory,
            data_end,
        })
    }

    pub fn resolve(&self, label: &str) -> Result<u32> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| RuntimeError::UnresolvedLabel(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;
    use til_compiler::emit::CompiledFunction;

    fn module() -> Module {
        Module {
            functions: vec![CompiledFunction {
                label: "_main".into(),
                public: true,
                frame_size: 0,
                code: vec![
                    Instruction::Enter(0),
                    Instruction::Label("_L1".into()),
                    Instruction::Leave,
                    Instruction::Ret,
                ],
            }],
            data: vec![
                DataItem::Label("x".into()),
                DataItem::SDouble(OrderedFloat(1.5)),
                DataItem::Label("f".into()),
                DataItem::SAddr("_main".into()),
            ],
            rodata: vec![
                DataItem::Label("_L2".into()),
                DataItem::SString("ok".into()),
            ],
            bss: vec![DataItem::Label("y".into()), DataItem::SAlloc(4)],
            externs: vec!["printi".into()],
        }
    }

    #[test]
    fn code_labels() {
        let image = Image::load(&module(), &VmConfig::default()).unwrap();
        assert_eq!(image.resolve("_main").unwrap(), CODE_BASE);
        assert_eq!(image.resolve("_L1").unwrap(), CODE_BASE + 1);
        assert_eq!(image.code.len(), 4);
    }

    #[test]
    fn data_layout_starts_with_rodata() {
        let image = Image::load(&module(), &VmConfig::default()).unwrap();
        assert_eq!(image.resolve("_L2").unwrap(), DATA_BASE);
        let x = image.resolve("x").unwrap();
        assert_eq!(x, DATA_BASE + 3);
        assert_eq!(image.memory.read_f64(x).unwrap(), 1.5);
        let f = image.resolve("f").unwrap();
        assert_eq!(image.memory.read_i32(f).unwrap() as u32, CODE_BASE);
        assert_eq!(image.data_end, f + 8);
        assert_eq!(image.memory.read_c_string(DATA_BASE).unwrap(), "ok");
    }

    #[test]
    fn runtime_routines_resolve() {
        let image = Image::load(&module(), &VmConfig::default()).unwrap();
        let printi = Target::of(image.resolve("printi").unwrap());
        assert_eq!(printi, Some(Target::Routine(Routine::PrintInt)));
        assert_eq!(Target::of(HALT_ADDRESS), Some(Target::Halt));
        assert_eq!(Target::of(DATA_BASE), None);
    }

    #[test]
    fn duplicate_labels_fail() {
        let mut module = module();
        module.bss.push(DataItem::Label("x".into()));
        assert_eq!(
            Image::load(&module, &VmConfig::default()).unwrap_err(),
            RuntimeError::DuplicateLabel("x".into())
        );
    }

    #[test]
    fn unresolved_static_address_fails() {
        let mut module = module();
        module.data.push(DataItem::SAddr("missing".into()));
        assert_eq!(
            Image::load(&module, &VmConfig::default()).unwrap_err(),
            RuntimeError::UnresolvedLabel("missing".into())
        );
    }

    #[test]
    fn static_data_must_fit() {
        let config = VmConfig::default().with_memory_size(20);
        assert!(matches!(
            Image::load(&module(), &config),
            Err(RuntimeError::OutOfMemory { .. })
        ));
    }
}
