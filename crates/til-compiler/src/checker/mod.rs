//! Type checking pass.
//!
//! The checker walks the tree bottom-up, annotating each expression with
//! its type and binding each name to a [`Symbol`]. Nodes that already
//! carry a concrete type are treated as checked and skipped, which lets
//! synthesized sub-trees embed nodes that were checked earlier.
//!
//! The first violation aborts the pass.

mod binary;
mod calls;
mod decl;
mod expr;
mod stmt;

use std::rc::Rc;

use til_ast::{Expr, Program};
use til_core::{CompilationError, Symbol, Type, deep_compare};

use crate::scope::SymbolTable;

type Result<T> = std::result::Result<T, CompilationError>;

/// Annotates a tree with types and symbols.
#[derive(Debug, Default)]
pub struct TypeChecker {
    symbols: SymbolTable,
    /// Symbol table depth of each function literal being checked,
    /// innermost last.
    frame_scopes: Vec<usize>,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The symbol table in its current state.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Checks the global declarations and then the entry point.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_program(&mut self, program: &mut Program) -> Result<()> {
        for declaration in &mut program.declarations {
            self.check_declaration(declaration)?;
        }
        if let Some(main) = program.main.as_mut() {
            self.check_function(main)?;
        }
        Ok(())
    }

    /// Whether declarations made now are globals.
    fn at_global_level(&self) -> bool {
        self.symbols.is_global_scope()
    }

    /// The innermost function's symbol.
    fn enclosing_function(&self) -> Option<Rc<Symbol>> {
        self.symbols.enclosing_function()
    }

    /// Checks `body` inside a freshly pushed scope, popping it whatever the
    /// outcome.
    fn scoped<T>(&mut self, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.push_scope();
        let result = body(self);
        self.symbols.pop_scope();
        result
    }
}

// ============================================================================
// Context resolution
// ============================================================================

/// Resolves a value against the type expected at its destination
/// (assignment target, declared type, parameter or return type) and
/// reports whether the result is acceptable there.
///
/// An unresolved value becomes `double` when a double is expected and
/// `int` otherwise. A pointer to `void` or to an unresolved type on
/// either side takes the expected pointer type.
fn settle(expected: &Type, value: &mut Expr) -> bool {
    let actual = value.ty();
    if actual.is_unspecified() {
        value.annotate(if expected.is_double() {
            Type::double()
        } else {
            Type::int()
        });
    } else if let (Some(wanted), Some(given)) = (expected.referenced(), actual.referenced())
        && (given.is_unspecified() || given.is_void() || wanted.is_void())
    {
        value.annotate(expected.clone());
    }
    deep_compare(expected, &value.ty(), true)
}

/// Gives an unresolved value its default type.
fn default_to_int(value: &mut Expr) {
    if value.ty().is_unspecified() {
        value.annotate(Type::int());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use til_ast::build::*;

    fn check(mut program: Program) -> Result<Program> {
        TypeChecker::new().check_program(&mut program)?;
        Ok(program)
    }

    fn main_statement(program: &Program, index: usize) -> &til_ast::Stmt {
        &program.main.as_ref().unwrap().body.statements[index]
    }

    #[test]
    fn settle_defaults_unresolved_values() {
        let mut value = read();
        assert!(settle(&Type::double(), &mut value));
        assert_eq!(value.ty(), Type::double());

        let mut value = read();
        assert!(settle(&Type::int(), &mut value));
        assert_eq!(value.ty(), Type::int());
    }

    #[test]
    fn settle_degrades_untyped_pointers() {
        let mut value = null();
        value.annotate(Type::pointer(Type::unspecified()));
        assert!(settle(&Type::pointer(Type::double()), &mut value));
        assert_eq!(value.ty(), Type::pointer(Type::double()));
    }

    #[test]
    fn settle_rejects_narrowing() {
        let mut value = double(1.5);
        value.annotate(Type::double());
        assert!(!settle(&Type::int(), &mut value));
    }

    #[test]
    fn empty_program_checks() {
        assert!(check(program(vec![], None)).is_ok());
    }

    #[test]
    fn main_sees_globals() {
        let checked = check(program(
            vec![declare(Type::int(), "g", Some(int(1)))],
            Some(block(vec![], vec![println(vec![id("g")])])),
        ))
        .unwrap();

        let til_ast::StmtKind::Print { args, .. } = &main_statement(&checked, 0).kind else {
            panic!("expected print");
        };
        assert_eq!(args[0].ty(), Type::int());
    }

    #[test]
    fn scopes_are_restored_after_errors() {
        let mut checker = TypeChecker::new();
        let mut bad = program(vec![], Some(block(vec![], vec![eval(id("missing"))])));
        assert!(checker.check_program(&mut bad).is_err());
        assert!(checker.symbols().is_global_scope());
    }
}
