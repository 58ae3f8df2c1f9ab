//! Faults raised while loading or running a module.

use thiserror::Error;

/// A fault of the stack machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A load or store outside addressable memory.
    #[error("bad memory access at address {address:#x} ({width} bytes)")]
    BadAddress { address: u32, width: u32 },

    /// The stack ran into the static data.
    #[error("stack overflow")]
    StackOverflow,

    /// A jump, call or address names a label nothing defines.
    #[error("unresolved label '{0}'")]
    UnresolvedLabel(String),

    /// Two definitions of one label.
    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(String),

    /// Control was transferred to something that is not code.
    #[error("branch to non-code address {0:#x}")]
    BadBranch(u32),

    /// The static data does not fit in memory.
    #[error("static data needs {needed} bytes but memory has {available}")]
    OutOfMemory { needed: u32, available: u32 },

    #[error("integer division by zero")]
    DivisionByZero,

    /// A read had no queued input left.
    #[error("input exhausted")]
    InputExhausted,

    /// Queued input could not be parsed as the requested type.
    #[error("invalid input '{input}' for {expected}")]
    InvalidInput {
        input: String,
        expected: &'static str,
    },

    /// A string in memory is not valid UTF-8.
    #[error("invalid string at address {0:#x}")]
    InvalidString(u32),

    /// Execution ran longer than the configured limit.
    #[error("step limit of {0} instructions exceeded")]
    StepLimitExceeded(u64),
}
