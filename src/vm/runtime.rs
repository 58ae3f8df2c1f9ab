//! Host implementations of the runtime-support routines.

use til_compiler::codegen::runtime;

/// A routine the machine provides instead of module code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routine {
    PrintInt,
    PrintDouble,
    PrintString,
    PrintNewline,
    ReadInt,
    ReadDouble,
}

impl Routine {
    pub const ALL: [Routine; 6] = [
        Routine::PrintInt,
        Routine::PrintDouble,
        Routine::PrintString,
        Routine::PrintNewline,
        Routine::ReadInt,
        Routine::ReadDouble,
    ];

    /// The symbol generated code calls.
    pub fn name(self) -> &'static str {
        match self {
            Routine::PrintInt => runtime::PRINT_INT,
            Routine::PrintDouble => runtime::PRINT_DOUBLE,
            Routine::PrintString => runtime::PRINT_STRING,
            Routine::PrintNewline => runtime::PRINT_NEWLINE,
            Routine::ReadInt => runtime::READ_INT,
            Routine::ReadDouble => runtime::READ_DOUBLE,
        }
    }

    pub fn from_name(name: &str) -> Option<Routine> {
        Routine::ALL
            .into_iter()
            .find(|routine| routine.name() == name)
    }

    /// Index into [`Routine::ALL`].
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Option<Routine> {
        Routine::ALL.get(index as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for routine in Routine::ALL {
            assert_eq!(Routine::from_name(routine.name()), Some(routine));
            assert_eq!(Routine::from_index(routine.index()), Some(routine));
        }
        assert_eq!(Routine::from_name("printx"), None);
    }
}
