//! Primitive type kinds of TIL.

use std::fmt;

/// Primitive type kinds.
///
/// `Unspecified` is a placeholder for a type that context has not
/// resolved yet; no node reaches code generation still carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Double,
    String,
    Void,
    Unspecified,
}

impl PrimitiveKind {
    /// Storage size in bytes.
    pub const fn size(self) -> u32 {
        match self {
            PrimitiveKind::Int => 4,
            PrimitiveKind::Double => 8,
            PrimitiveKind::String => 4,
            PrimitiveKind::Void | PrimitiveKind::Unspecified => 0,
        }
    }

    /// Get the name of this primitive type.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
