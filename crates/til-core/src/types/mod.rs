//! Structural type model for TIL.
//!
//! Types are immutable values. Composite types share their parts through
//! `Rc`, so cloning a [`Type`] is cheap.

mod compare;
mod primitive_kind;

pub use compare::deep_compare;
pub use primitive_kind::PrimitiveKind;

use std::fmt;
use std::rc::Rc;

/// Size in bytes of pointers, string handles and function addresses.
pub const POINTER_SIZE: u32 = 4;

/// A TIL type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Pointer(Rc<Type>),
    Function(Rc<FunctionType>),
}

/// Signature of a function value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub inputs: Vec<Type>,
    pub output: Type,
}

impl Type {
    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn int() -> Self {
        Type::Primitive(PrimitiveKind::Int)
    }

    pub fn double() -> Self {
        Type::Primitive(PrimitiveKind::Double)
    }

    pub fn string() -> Self {
        Type::Primitive(PrimitiveKind::String)
    }

    pub fn void() -> Self {
        Type::Primitive(PrimitiveKind::Void)
    }

    pub fn unspecified() -> Self {
        Type::Primitive(PrimitiveKind::Unspecified)
    }

    /// Pointer to `referenced`.
    pub fn pointer(referenced: Type) -> Self {
        Type::Pointer(Rc::new(referenced))
    }

    /// Function taking `inputs` and producing `output`.
    pub fn function(inputs: Vec<Type>, output: Type) -> Self {
        Type::Function(Rc::new(FunctionType { inputs, output }))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The primitive kind, if this is a primitive type.
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_int(&self) -> bool {
        self.kind() == Some(PrimitiveKind::Int)
    }

    pub fn is_double(&self) -> bool {
        self.kind() == Some(PrimitiveKind::Double)
    }

    pub fn is_string(&self) -> bool {
        self.kind() == Some(PrimitiveKind::String)
    }

    pub fn is_void(&self) -> bool {
        self.kind() == Some(PrimitiveKind::Void)
    }

    pub fn is_unspecified(&self) -> bool {
        self.kind() == Some(PrimitiveKind::Unspecified)
    }

    /// `int` or `double`.
    pub fn is_numeric(&self) -> bool {
        self.is_int() || self.is_double()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    /// The pointed-to type of a pointer.
    pub fn referenced(&self) -> Option<&Type> {
        match self {
            Type::Pointer(referenced) => Some(referenced),
            _ => None,
        }
    }

    /// The signature of a function type.
    pub fn as_function(&self) -> Option<&Rc<FunctionType>> {
        match self {
            Type::Function(signature) => Some(signature),
            _ => None,
        }
    }

    /// Storage size in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Type::Primitive(kind) => kind.size(),
            Type::Pointer(_) | Type::Function(_) => POINTER_SIZE,
        }
    }

    /// Byte distance between consecutive elements reached through this
    /// pointer. Untyped elements are laid out as ints and `void!` steps
    /// bytewise.
    pub fn stride(&self) -> u32 {
        match self.referenced() {
            Some(referenced) if referenced.is_unspecified() => Type::int().size(),
            Some(referenced) => referenced.size().max(1),
            None => 1,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{kind}"),
            Type::Pointer(referenced) => write!(f, "{referenced}!"),
            Type::Function(signature) => write!(f, "{signature}"),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.output)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{input}")?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(Type::int().size(), 4);
        assert_eq!(Type::double().size(), 8);
        assert_eq!(Type::string().size(), 4);
        assert_eq!(Type::void().size(), 0);
        assert_eq!(Type::unspecified().size(), 0);
        assert_eq!(Type::pointer(Type::double()).size(), 4);
        let function = Type::function(vec![Type::double()], Type::double());
        assert_eq!(function.size(), 4);
    }

    #[test]
    fn display_notation() {
        assert_eq!(Type::pointer(Type::int()).to_string(), "int!");
        assert_eq!(
            Type::pointer(Type::pointer(Type::double())).to_string(),
            "double!!"
        );
        assert_eq!(
            Type::function(vec![Type::int(), Type::int()], Type::double()).to_string(),
            "double<int, int>"
        );
        assert_eq!(Type::function(vec![], Type::void()).to_string(), "void<>");
    }

    #[test]
    fn stride_by_element() {
        assert_eq!(Type::pointer(Type::double()).stride(), 8);
        assert_eq!(Type::pointer(Type::int()).stride(), 4);
        assert_eq!(Type::pointer(Type::void()).stride(), 1);
        assert_eq!(Type::pointer(Type::unspecified()).stride(), 4);
    }

    #[test]
    fn predicates() {
        assert!(Type::int().is_numeric());
        assert!(Type::double().is_numeric());
        assert!(!Type::string().is_numeric());
        assert!(Type::pointer(Type::int()).is_pointer());
        assert_eq!(
            Type::pointer(Type::string()).referenced(),
            Some(&Type::string())
        );
        let f = Type::function(vec![Type::int()], Type::void());
        assert!(f.is_function());
        assert_eq!(f.as_function().map(|s| s.inputs.len()), Some(1));
    }

    #[test]
    fn structural_equality() {
        let a = Type::function(vec![Type::pointer(Type::int())], Type::int());
        let b = Type::function(vec![Type::pointer(Type::int())], Type::int());
        assert_eq!(a, b);
        assert_ne!(
            a,
            Type::function(vec![Type::pointer(Type::double())], Type::int())
        );
    }
}
