//! Resolved names.

use std::cell::Cell;

use crate::Type;

/// Declaration qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Qualifier {
    #[default]
    Default,
    /// Exported from the module.
    Public,
    /// Declared here, defined later in the same unit.
    Forward,
    /// Defined outside the unit.
    External,
}

impl Qualifier {
    /// `forward` and `external` reserve a name without defining storage.
    pub fn is_declaration_only(self) -> bool {
        matches!(self, Qualifier::Forward | Qualifier::External)
    }
}

/// A declared name, shared between the symbol table and the tree nodes
/// that declare or reference it.
#[derive(Debug)]
pub struct Symbol {
    name: String,
    ty: Type,
    qualifier: Qualifier,
    offset: Cell<i32>,
    is_entry_point: bool,
    is_global: bool,
}

impl Symbol {
    /// Name bound in every function scope to the function's own symbol.
    pub const SENTINEL: &'static str = "@";

    /// Creates a local, non-entry symbol.
    pub fn new(name: impl Into<String>, ty: Type, qualifier: Qualifier) -> Self {
        Self {
            name: name.into(),
            ty,
            qualifier,
            offset: Cell::new(0),
            is_entry_point: false,
            is_global: qualifier.is_declaration_only(),
        }
    }

    /// Marks the symbol as global storage. Forward and external symbols
    /// stay global regardless.
    pub fn with_global(mut self, global: bool) -> Self {
        self.is_global = global || self.qualifier.is_declaration_only();
        self
    }

    /// Marks the symbol as the program entry point.
    pub fn with_entry_point(mut self, entry_point: bool) -> Self {
        self.is_entry_point = entry_point;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// Frame offset: positive for parameters, negative for locals,
    /// meaningless for globals.
    pub fn offset(&self) -> i32 {
        self.offset.get()
    }

    pub fn set_offset(&self, offset: i32) {
        self.offset.set(offset);
    }

    pub fn is_entry_point(&self) -> bool {
        self.is_entry_point
    }

    pub fn is_global(&self) -> bool {
        self.is_global
    }

    pub fn is_external(&self) -> bool {
        self.qualifier == Qualifier::External
    }
}
