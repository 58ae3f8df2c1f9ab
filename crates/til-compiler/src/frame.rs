//! Stack frame layout.
//!
//! Offsets are relative to the frame pointer. Parameters sit above it,
//! starting at +8 past the saved frame pointer and return address. Locals
//! sit below it at decreasing offsets, in the order the code generator
//! visits their declarations. This is the only place offsets are assigned;
//! code generation reads them back from the symbols.

use til_ast::{Block, Declaration, StmtKind};
use til_core::CompilationError;

type Result<T> = std::result::Result<T, CompilationError>;

/// Offset of the first parameter.
pub const PARAMETER_BASE: i32 = 8;

/// Assigns parameter offsets and returns the bytes they occupy.
pub fn layout_parameters(params: &[Declaration]) -> Result<u32> {
    let mut offset = PARAMETER_BASE;
    for param in params {
        let Some(symbol) = &param.symbol else {
            return Err(unchecked(&param.name));
        };
        symbol.set_offset(offset);
        offset += param.ty.size() as i32;
    }
    Ok((offset - PARAMETER_BASE) as u32)
}

/// Computes local offsets for one function body.
#[derive(Debug, Default)]
pub struct FrameSizeCalculator {
    offset: i32,
}

impl FrameSizeCalculator {
    /// Assigns an offset to every local of `body` and returns the frame
    /// size in bytes.
    ///
    /// Nested function literals have frames of their own and are skipped,
    /// as are `forward`/`external` declarations, which reserve no storage.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compute(body: &Block) -> Result<u32> {
        let mut calculator = Self::default();
        calculator.visit_block(body)?;
        Ok(calculator.offset.unsigned_abs())
    }

    fn visit_block(&mut self, block: &Block) -> Result<()> {
        for declaration in &block.declarations {
            self.declare(declaration)?;
        }
        for statement in &block.statements {
            match &statement.kind {
                StmtKind::If { then_block, .. } => self.visit_block(then_block)?,
                StmtKind::IfElse {
                    then_block,
                    else_block,
                    ..
                } => {
                    self.visit_block(then_block)?;
                    self.visit_block(else_block)?;
                }
                StmtKind::Loop { body, .. } => self.visit_block(body)?,
                StmtKind::Block(inner) => self.visit_block(inner)?,
                StmtKind::Eval(_)
                | StmtKind::Print { .. }
                | StmtKind::Next { .. }
                | StmtKind::Stop { .. }
                | StmtKind::Return(_) => {}
            }
        }
        Ok(())
    }

    fn declare(&mut self, declaration: &Declaration) -> Result<()> {
        if declaration.qualifier.is_declaration_only() {
            return Ok(());
        }
        let symbol = declaration
            .symbol
            .as_ref()
            .ok_or_else(|| unchecked(&declaration.name))?;
        self.offset -= declaration.ty.size() as i32;
        symbol.set_offset(self.offset);
        Ok(())
    }
}

fn unchecked(name: &str) -> CompilationError {
    CompilationError::internal(format!("'{name}' reached frame layout before type checking"))
}
