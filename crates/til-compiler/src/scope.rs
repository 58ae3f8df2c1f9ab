//! Scoped symbol table.
//!
//! The table is a stack of scopes. The outermost scope holds globals and
//! is never popped; blocks and functions push their own on entry. Lookup
//! walks from the innermost scope outwards, so inner declarations shadow
//! outer ones until their scope is popped.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use til_core::Symbol;

type Scope = FxHashMap<String, Rc<Symbol>>;

/// Stack of name → symbol scopes.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Enter a new scope (function, block).
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Exit the innermost scope, dropping its bindings.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of live scopes, the global scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Whether only the global scope is live.
    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    // ==========================================================================
    // Bindings
    // ==========================================================================

    /// Binds `symbol` under its name in the innermost scope.
    ///
    /// Fails with the existing symbol if the name is already bound there.
    pub fn insert(&mut self, symbol: Rc<Symbol>) -> Result<(), Rc<Symbol>> {
        let scope = self.innermost_mut();
        if let Some(existing) = scope.get(symbol.name()) {
            return Err(existing.clone());
        }
        scope.insert(symbol.name().to_string(), symbol);
        Ok(())
    }

    /// Rebinds `symbol` under its name in the innermost scope.
    pub fn replace(&mut self, symbol: Rc<Symbol>) {
        let name = symbol.name().to_string();
        self.innermost_mut().insert(name, symbol);
    }

    /// Looks `name` up from the innermost scope outwards.
    pub fn find(&self, name: &str) -> Option<Rc<Symbol>> {
        self.find_skipping(name, 0)
    }

    /// Like [`find`](Self::find), also returning the [`depth`](Self::depth)
    /// at which the binding lives.
    pub fn find_with_depth(&self, name: &str) -> Option<(Rc<Symbol>, usize)> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, scope)| scope.get(name).map(|symbol| (symbol.clone(), index + 1)))
    }

    /// Like [`find`](Self::find), ignoring the innermost `skip` scopes.
    pub fn find_skipping(&self, name: &str, skip: usize) -> Option<Rc<Symbol>> {
        self.scopes
            .iter()
            .rev()
            .skip(skip)
            .find_map(|scope| scope.get(name).cloned())
    }

    /// Whether `name` is bound in the innermost scope.
    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    /// The symbol of the innermost enclosing function.
    pub fn enclosing_function(&self) -> Option<Rc<Symbol>> {
        self.find(Symbol::SENTINEL)
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
