//! Loop label tracking for `next` and `stop`.

use thiserror::Error;

/// Labels of one enclosing loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopTargets {
    /// Where `next` jumps: the condition check.
    pub condition: String,
    /// Where `stop` jumps: just past the loop.
    pub end: String,
}

/// Why a `next`/`stop` level could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopLevelError {
    #[error("invalid loop control instruction level {0}")]
    InvalidLevel(u32),
    #[error("loop control level {level} is not within sufficient loops (depth {depth})")]
    NotEnoughLoops { level: u32, depth: usize },
}

/// Stack of loop contexts, innermost last.
#[derive(Debug, Default)]
pub struct LoopLabels {
    loops: Vec<LoopTargets>,
}

impl LoopLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a loop whose condition and end carry these labels.
    pub fn enter_loop(&mut self, condition: String, end: String) {
        self.loops.push(LoopTargets { condition, end });
    }

    /// Exit the innermost loop.
    pub fn exit_loop(&mut self) -> Option<LoopTargets> {
        self.loops.pop()
    }

    /// Current loop nesting depth.
    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }

    /// The loop `level` nestings out; 1 is the innermost.
    pub fn target(&self, level: u32) -> Result<&LoopTargets, LoopLevelError> {
        if level == 0 {
            return Err(LoopLevelError::InvalidLevel(level));
        }
        let depth = self.loops.len();
        let level_index = level as usize;
        if level_index > depth {
            return Err(LoopLevelError::NotEnoughLoops { level, depth });
        }
        Ok(&self.loops[depth - level_index])
    }
}
