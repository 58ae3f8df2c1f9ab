//! Declarations: locals, globals and static data.

use ordered_float::OrderedFloat;
use til_ast::{Declaration, Expr, ExprKind};
use til_core::{CompilationError, Qualifier, Type};

use super::calls::needs_wrapping;
use super::{CodeGenerator, Result, store_for};
use crate::emit::{DataItem, Instruction};

impl CodeGenerator {
    /// Emits a declaration met inside a function body.
    pub(super) fn emit_declaration(&mut self, declaration: &Declaration) -> Result<()> {
        let Some(symbol) = declaration.symbol.as_ref() else {
            return Err(CompilationError::internal(format!(
                "declaration of '{}' was never checked",
                declaration.name
            )));
        };
        if symbol.is_global() {
            return self.emit_global(declaration);
        }
        self.settle_reserved(&declaration.name);

        let Some(init) = &declaration.init else {
            return Ok(());
        };
        let offset = symbol.offset();
        self.emit_coerced(&declaration.ty, init)?;
        self.emit(Instruction::Local(offset));
        self.emit(store_for(&declaration.ty));
        Ok(())
    }

    /// Emits a global as static data.
    ///
    /// Uninitialized globals go to bss, initialized ones to data.
    /// `forward`/`external` declarations only reserve the name, which stays
    /// external until a definition appears.
    pub(super) fn emit_global(&mut self, declaration: &Declaration) -> Result<()> {
        let name = &declaration.name;
        if declaration.qualifier.is_declaration_only() {
            self.reserved.insert(name.clone());
            self.pending_externals.insert(name.clone());
            return Ok(());
        }
        self.settle_reserved(name);

        let (initialized, value) = match &declaration.init {
            Some(init) => (true, self.static_value(init, &declaration.ty, name)?),
            None => (false, DataItem::SAlloc(declaration.ty.size())),
        };

        if declaration.qualifier == Qualifier::Public {
            self.define(initialized, DataItem::Global(name.clone()));
        }
        self.define(initialized, DataItem::Label(name.clone()));
        self.define(initialized, value);
        Ok(())
    }

    /// A definition of a reserved name means it is no longer external.
    fn settle_reserved(&mut self, name: &str) {
        if self.reserved.remove(name) {
            self.pending_externals.remove(name);
        }
    }

    fn define(&mut self, initialized: bool, item: DataItem) {
        if initialized {
            self.emitter.data(item);
        } else {
            self.emitter.bss(item);
        }
    }

    /// The static form of a global initializer.
    ///
    /// Only literals qualify. Function literals are compiled on the spot
    /// and referenced by address.
    pub(super) fn static_value(
        &mut self,
        init: &Expr,
        expected: &Type,
        name: &str,
    ) -> Result<DataItem> {
        Ok(match &init.kind {
            ExprKind::Integer(value) if expected.is_double() => {
                DataItem::SDouble(OrderedFloat(f64::from(*value)))
            }
            ExprKind::Integer(value) => DataItem::SInt(*value),
            ExprKind::Double(value) => DataItem::SDouble(OrderedFloat(*value)),
            ExprKind::Str(text) => DataItem::SAddr(self.emitter.string_literal(text)),
            ExprKind::Null => DataItem::SInt(0),
            ExprKind::Function(function) => {
                let label = if needs_wrapping(expected, &init.ty()) {
                    self.emit_static_wrapper(init, expected)?
                } else {
                    self.emit_function(function)?
                };
                DataItem::SAddr(label)
            }
            _ => {
                return Err(CompilationError::NonLiteralGlobalInitializer {
                    name: name.to_string(),
                    span: init.span,
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{compile_main, main_code};
    use crate::Compiler;
    use crate::emit::{DataItem, Instruction};
    use ordered_float::OrderedFloat;
    use til_ast::build::*;
    use til_core::{CompilationError, Qualifier, Type};

    fn compile_globals(declarations: Vec<til_ast::Declaration>) -> super::Result<crate::Module> {
        Compiler::compile(&mut program(declarations, None))
    }

    #[test]
    fn int_literal_for_double_global_is_static_double() {
        let module = compile_globals(vec![declare(Type::double(), "y", Some(int(3)))]).unwrap();
        assert_eq!(
            module.data,
            vec![
                DataItem::Label("y".into()),
                DataItem::SDouble(OrderedFloat(3.0)),
            ]
        );
    }

    #[test]
    fn string_global_points_into_rodata() {
        let module = compile_globals(vec![declare_var("greeting", string("hi"))]).unwrap();
        assert_eq!(
            module.rodata,
            vec![
                DataItem::Label("_L1".into()),
                DataItem::SString("hi".into()),
            ]
        );
        assert_eq!(
            module.data,
            vec![
                DataItem::Label("greeting".into()),
                DataItem::SAddr("_L1".into()),
            ]
        );
    }

    #[test]
    fn public_global_is_exported() {
        let module = compile_globals(vec![
            qualified(Qualifier::Public, Type::int(), "shared", Some(int(5))),
            qualified(Qualifier::Public, Type::double(), "zeroed", None),
        ])
        .unwrap();
        assert_eq!(module.data[0], DataItem::Global("shared".into()));
        assert_eq!(
            module.bss,
            vec![
                DataItem::Global("zeroed".into()),
                DataItem::Label("zeroed".into()),
                DataItem::SAlloc(8),
            ]
        );
    }

    #[test]
    fn null_global_is_zero() {
        let pointer = declare(Type::pointer(Type::int()), "p", Some(null()));
        let module = compile_globals(vec![pointer]).unwrap();
        assert_eq!(module.data[1], DataItem::SInt(0));
    }

    #[test]
    fn non_literal_global_initializer_fails() {
        let sum = declare(Type::int(), "x", Some(add(int(1), int(2)).at(4)));
        let err = compile_globals(vec![sum]).unwrap_err();
        assert_eq!(
            err,
            CompilationError::NonLiteralGlobalInitializer {
                name: "x".into(),
                span: til_core::Span::line(4),
            }
        );
    }

    #[test]
    fn forward_stays_external_until_defined() {
        let signature = Type::function(vec![], Type::int());
        let body = || function(vec![], Type::int(), block(vec![], vec![ret(int(1))]));

        let module = compile_globals(vec![forward(signature.clone(), "f")]).unwrap();
        assert_eq!(module.externs, vec!["f"]);

        let module = compile_globals(vec![
            forward(signature.clone(), "f"),
            declare(signature, "f", Some(body())),
        ])
        .unwrap();
        assert!(module.externs.is_empty());
    }

    #[test]
    fn local_definition_settles_forward_in_body() {
        let signature = Type::function(vec![Type::int()], Type::int());
        let increment = function(
            vec![param("n", Type::int())],
            Type::int(),
            block(vec![], vec![ret(add(id("n"), int(1)))]),
        );

        let module = compile_main(block(
            vec![
                forward(signature.clone(), "f"),
                declare(signature, "f", Some(increment)),
            ],
            vec![println(vec![call(id("f"), vec![int(1)])])],
        ))
        .unwrap();
        assert_eq!(module.externs, vec!["printi", "println"]);
    }

    #[test]
    fn local_initializer_is_stored_at_offset() {
        let module = compile_main(block(
            vec![
                declare(Type::int(), "a", None),
                declare(Type::double(), "b", Some(int(2))),
            ],
            vec![],
        ))
        .unwrap();
        let code = main_code(&module);
        assert_eq!(
            &code[1..5],
            &[
                Instruction::Int(2),
                Instruction::I2D,
                Instruction::Local(-12),
                Instruction::StDouble,
            ]
        );
    }
}
