//! Error taxonomy for the TIL compiler.
//!
//! ```text
//! CompilationError
//! ├── semantic:     TypeMismatch, UndeclaredVariable, Redeclaration,
//! │                 ArityMismatch, InvalidQualifier, InvalidOperation
//! ├── generation:   InvalidLoopControl, UnreachableCode,
//! │                 NonLiteralGlobalInitializer
//! └── consistency:  Internal
//! ```
//!
//! Every pass stops at the first error it raises; nothing is recovered.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors raised while checking or generating code for a TIL program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// Two types that had to agree did not.
    #[error("at {span}: {message}")]
    TypeMismatch { message: String, span: Span },

    /// A name was used without any visible declaration.
    #[error("at {span}: undeclared variable '{name}'")]
    UndeclaredVariable { name: String, span: Span },

    /// A name was declared twice in the same scope.
    #[error("at {span}: '{name}' redeclared")]
    Redeclaration { name: String, span: Span },

    /// A call passed the wrong number of arguments.
    #[error("at {span}: wrong number of arguments (expected {expected}, found {found})")]
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A qualifier was applied where it is not allowed.
    #[error("at {span}: {message}")]
    InvalidQualifier { message: String, span: Span },

    /// An operation is not valid in its context.
    #[error("at {span}: {message}")]
    InvalidOperation { message: String, span: Span },

    /// `next`/`stop` named a loop level that does not exist.
    #[error("at {span}: {message}")]
    InvalidLoopControl { message: String, span: Span },

    /// A statement follows `return`, `next` or `stop` in the same block.
    #[error("at {span}: unreachable code")]
    UnreachableCode { span: Span },

    /// A global was initialized with something other than a literal.
    #[error("at {span}: non-literal initializer for global variable '{name}'")]
    NonLiteralGlobalInitializer { name: String, span: Span },

    /// The passes were run out of order or on an unchecked tree.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CompilationError {
    /// Shorthand for [`CompilationError::TypeMismatch`].
    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        CompilationError::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    /// Shorthand for [`CompilationError::InvalidOperation`].
    pub fn invalid_operation(message: impl Into<String>, span: Span) -> Self {
        CompilationError::InvalidOperation {
            message: message.into(),
            span,
        }
    }

    /// Shorthand for [`CompilationError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
        }
    }

    /// Get the span where this error occurred, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompilationError::TypeMismatch { span, .. }
            | CompilationError::UndeclaredVariable { span, .. }
            | CompilationError::Redeclaration { span, .. }
            | CompilationError::ArityMismatch { span, .. }
            | CompilationError::InvalidQualifier { span, .. }
            | CompilationError::InvalidOperation { span, .. }
            | CompilationError::InvalidLoopControl { span, .. }
            | CompilationError::UnreachableCode { span }
            | CompilationError::NonLiteralGlobalInitializer { span, .. } => Some(*span),
            CompilationError::Internal { .. } => None,
        }
    }

    /// The source line of the error, or 0 when it has no location.
    pub fn line(&self) -> u32 {
        self.span().map_or(0, |span| span.line)
    }

    /// The error text without its location prefix.
    pub fn description(&self) -> String {
        match self {
            CompilationError::TypeMismatch { message, .. }
            | CompilationError::InvalidQualifier { message, .. }
            | CompilationError::InvalidOperation { message, .. }
            | CompilationError::InvalidLoopControl { message, .. } => message.clone(),
            CompilationError::UndeclaredVariable { name, .. } => {
                format!("undeclared variable '{name}'")
            }
            CompilationError::Redeclaration { name, .. } => format!("'{name}' redeclared"),
            CompilationError::ArityMismatch {
                expected, found, ..
            } => format!("wrong number of arguments (expected {expected}, found {found})"),
            CompilationError::UnreachableCode { .. } => "unreachable code".to_string(),
            CompilationError::NonLiteralGlobalInitializer { name, .. } => {
                format!("non-literal initializer for global variable '{name}'")
            }
            CompilationError::Internal { message } => format!("internal error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_variable_display() {
        let err = CompilationError::UndeclaredVariable {
            name: "x".to_string(),
            span: Span::new(4, 2),
        };
        assert_eq!(err.to_string(), "at 4:2: undeclared variable 'x'");
        assert_eq!(err.description(), "undeclared variable 'x'");
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn arity_mismatch_display() {
        let err = CompilationError::ArityMismatch {
            expected: 2,
            found: 3,
            span: Span::line(9),
        };
        assert_eq!(
            err.to_string(),
            "at 9: wrong number of arguments (expected 2, found 3)"
        );
    }

    #[test]
    fn internal_has_no_span() {
        let err = CompilationError::internal("missing type");
        assert_eq!(err.span(), None);
        assert_eq!(err.line(), 0);
        assert_eq!(err.to_string(), "internal error: missing type");
    }

    #[test]
    fn shorthand_constructors() {
        let err = CompilationError::type_mismatch("bad", Span::line(1));
        assert!(matches!(err, CompilationError::TypeMismatch { .. }));
        let err = CompilationError::invalid_operation("bad", Span::line(1));
        assert!(matches!(err, CompilationError::InvalidOperation { .. }));
    }
}
