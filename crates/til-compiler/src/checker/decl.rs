//! Declarations and function literals.

use std::rc::Rc;

use til_ast::{Declaration, Function};
use til_core::{CompilationError, Qualifier, Span, Symbol, Type, deep_compare};

use super::{Result, TypeChecker, default_to_int, settle};

impl TypeChecker {
    /// Checks a declaration and binds its symbol in the current scope.
    ///
    /// The symbol is also stored in the declaration so later passes can
    /// reach it without a lookup.
    pub fn check_declaration(&mut self, declaration: &mut Declaration) -> Result<()> {
        let span = declaration.span;
        let name = declaration.name.clone();

        if declaration.qualifier == Qualifier::External && !declaration.ty.is_function() {
            return Err(CompilationError::InvalidQualifier {
                message: format!("external declaration of non-function '{name}'"),
                span,
            });
        }
        if declaration.qualifier.is_declaration_only() && declaration.init.is_some() {
            return Err(CompilationError::InvalidQualifier {
                message: format!("'{name}' cannot be initialized where it is only declared"),
                span,
            });
        }
        if declaration.ty.is_void() {
            return Err(CompilationError::type_mismatch(
                format!("variable '{name}' cannot be void"),
                span,
            ));
        }

        let ty = if declaration.is_inferred() {
            let Some(init) = declaration.init.as_mut() else {
                return Err(CompilationError::type_mismatch(
                    format!("cannot infer the type of '{name}' without an initializer"),
                    span,
                ));
            };
            self.check_expr(init)?;
            default_to_int(init);
            let ty = init.ty();
            if ty.is_void() {
                return Err(CompilationError::type_mismatch(
                    format!("cannot initialize '{name}' with a void value"),
                    span,
                ));
            }
            ty
        } else {
            if let Some(init) = declaration.init.as_mut() {
                self.check_expr(init)?;
                if !settle(&declaration.ty, init) {
                    return Err(CompilationError::type_mismatch(
                        format!(
                            "wrong type in initializer of '{name}' (expected {}, found {})",
                            declaration.ty,
                            init.ty()
                        ),
                        span,
                    ));
                }
            }
            declaration.ty.clone()
        };

        declaration.ty = ty.clone();
        let symbol = Rc::new(
            Symbol::new(name, ty, declaration.qualifier).with_global(self.at_global_level()),
        );
        self.bind(symbol.clone(), span)?;
        declaration.symbol = Some(symbol);
        Ok(())
    }

    /// Checks a function literal and returns its type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_function(&mut self, function: &mut Function) -> Result<Type> {
        for param in &function.params {
            if param.ty.is_unspecified() || param.ty.is_void() {
                return Err(CompilationError::type_mismatch(
                    format!("parameter '{}' needs a concrete type", param.name),
                    param.span,
                ));
            }
        }

        let signature = function.signature();
        self.scoped(|checker| {
            checker.frame_scopes.push(checker.symbols.depth());
            let result = checker.check_function_scope(function, &signature);
            checker.frame_scopes.pop();
            result
        })?;

        Ok(signature)
    }

    fn check_function_scope(&mut self, function: &mut Function, signature: &Type) -> Result<()> {
        let own = Rc::new(
            Symbol::new(Symbol::SENTINEL, signature.clone(), Qualifier::Default)
                .with_entry_point(function.is_entry),
        );
        if self.symbols.insert(own.clone()).is_err() {
            self.symbols.replace(own.clone());
        }
        function.symbol = Some(own);

        for param in &mut function.params {
            self.check_declaration(param)?;
        }
        self.check_block(&mut function.body)
    }

    /// Binds a new symbol, letting a compatible definition take over a
    /// name reserved by `forward` or `external`.
    fn bind(&mut self, symbol: Rc<Symbol>, span: Span) -> Result<()> {
        match self.symbols.insert(symbol.clone()) {
            Ok(()) => Ok(()),
            Err(existing)
                if existing.qualifier().is_declaration_only()
                    && deep_compare(existing.ty(), symbol.ty(), false) =>
            {
                self.symbols.replace(symbol);
                Ok(())
            }
            Err(_) => Err(CompilationError::Redeclaration {
                name: symbol.name().to_string(),
                span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use til_ast::Program;
    use til_ast::build::*;

    fn check(mut program: Program) -> Result<Program> {
        TypeChecker::new().check_program(&mut program)?;
        Ok(program)
    }

    fn int_to_int() -> Type {
        Type::function(vec![Type::int()], Type::int())
    }

    fn identity() -> til_ast::Expr {
        function(
            vec![param("n", Type::int())],
            Type::int(),
            block(vec![], vec![ret(id("n"))]),
        )
    }

    #[test]
    fn explicit_int_rejects_double_initializer() {
        let program = program(vec![declare(Type::int(), "x", Some(double(3.5)))], None);
        let err = check(program).unwrap_err();
        assert!(matches!(err, CompilationError::TypeMismatch { .. }));
    }

    #[test]
    fn explicit_double_accepts_int_initializer() {
        let program = program(vec![declare(Type::double(), "y", Some(int(3)))], None);
        let checked = check(program).unwrap();
        let symbol = checked.declarations[0].symbol.as_ref().unwrap();
        assert_eq!(symbol.ty(), &Type::double());
        assert!(symbol.is_global());
    }

    #[test]
    fn inferred_type_comes_from_initializer() {
        let checked = check(program(vec![declare_var("s", string("hi"))], None)).unwrap();
        assert_eq!(checked.declarations[0].ty, Type::string());
        let checked = check(program(vec![declare_var("r", read())], None)).unwrap();
        assert_eq!(checked.declarations[0].ty, Type::int());
    }

    #[test]
    fn inferred_needs_initializer() {
        let program = program(vec![declare(Type::unspecified(), "x", None)], None);
        let err = check(program).unwrap_err();
        assert!(matches!(err, CompilationError::TypeMismatch { .. }));
    }

    #[test]
    fn void_variable_rejected() {
        assert!(check(program(vec![declare(Type::void(), "v", None)], None)).is_err());
    }

    #[test]
    fn external_must_be_function() {
        let err = check(program(vec![external(Type::int(), "x")], None)).unwrap_err();
        assert!(matches!(err, CompilationError::InvalidQualifier { .. }));
    }

    #[test]
    fn forward_cannot_be_initialized() {
        let initialized = qualified(Qualifier::Forward, Type::int(), "x", Some(int(1)));
        let err = check(program(vec![initialized], None)).unwrap_err();
        assert!(matches!(err, CompilationError::InvalidQualifier { .. }));
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let err = check(program(
            vec![
                declare(Type::int(), "x", None),
                declare(Type::int(), "x", None).at(2),
            ],
            None,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            CompilationError::Redeclaration {
                name: "x".to_string(),
                span: Span::line(2),
            }
        );
    }

    #[test]
    fn shadowing_in_inner_block_is_allowed() {
        let inner = block(vec![declare(Type::double(), "x", None)], vec![]);
        let main = block(vec![declare(Type::int(), "x", None)], vec![nested(inner)]);
        assert!(check(program(vec![declare(Type::int(), "x", None)], Some(main))).is_ok());
    }

    #[test]
    fn forward_then_definition_replaces() {
        let checked = check(program(
            vec![
                forward(int_to_int(), "f"),
                declare(int_to_int(), "f", Some(identity())),
            ],
            None,
        ))
        .unwrap();
        let definition = checked.declarations[1].symbol.as_ref().unwrap();
        assert_eq!(definition.qualifier(), Qualifier::Default);
    }

    #[test]
    fn forward_then_incompatible_definition_fails() {
        let err = check(program(
            vec![
                forward(Type::function(vec![Type::double()], Type::int()), "f"),
                declare(int_to_int(), "f", Some(identity())),
            ],
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, CompilationError::Redeclaration { .. }));
    }

    #[test]
    fn locals_are_not_global() {
        let main = block(vec![declare(Type::int(), "x", None)], vec![]);
        let checked = check(program(vec![], Some(main))).unwrap();
        let main = checked.main.unwrap();
        let local = main.body.declarations[0].symbol.as_ref().unwrap();
        assert!(!local.is_global());
        assert!(main.symbol.as_ref().unwrap().is_entry_point());
    }

    #[test]
    fn forward_inside_function_is_global() {
        let main = block(vec![forward(int_to_int(), "g")], vec![]);
        let checked = check(program(vec![], Some(main))).unwrap();
        let main = checked.main.unwrap();
        let reserved = main.body.declarations[0].symbol.as_ref().unwrap();
        assert!(reserved.is_global());
    }

    #[test]
    fn parameters_need_concrete_types() {
        let f = function(
            vec![param("x", Type::unspecified())],
            Type::void(),
            block(vec![], vec![]),
        );
        assert!(check(program(vec![declare_var("f", f)], None)).is_err());
    }

    #[test]
    fn covariant_function_initializer() {
        let wider = Type::function(vec![Type::int()], Type::double());
        assert!(check(program(vec![declare(wider, "f", Some(identity()))], None)).is_ok());
    }

    #[test]
    fn function_value_of_wrong_shape_fails() {
        let narrower = Type::function(vec![Type::double()], Type::int());
        assert!(check(program(vec![declare(narrower, "f", Some(identity()))], None)).is_err());
    }
}
