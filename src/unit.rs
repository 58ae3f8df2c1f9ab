//! Compilation unit API.
//!
//! A [`Unit`] owns one program tree, runs the compiler passes over it and
//! executes the result on the reference machine.
//!
//! # Example
//!
//! ```
//! use til::Unit;
//! use til::ast::build::*;
//!
//! let mut unit = Unit::new(program(
//!     vec![],
//!     Some(block(vec![], vec![println(vec![add(int(2), int(3))])])),
//! ));
//!
//! let execution = unit.run("").unwrap();
//! assert_eq!(execution.output, "5\n");
//! assert_eq!(execution.exit_code, 0);
//! ```

use til_ast::Program;
use til_compiler::{Compiler, CompilerOptions, Module};
use til_core::{CompilationError, Diagnostics};

use crate::TilError;
use crate::vm::{Machine, VmConfig};

/// The outcome of running a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Value returned by the entry point.
    pub exit_code: i32,
    /// Everything the program printed.
    pub output: String,
}

/// A program together with its compiled form.
///
/// The tree is annotated in place by [`build`](Unit::build), so a unit
/// compiles at most once; later calls return the cached result.
#[derive(Debug)]
pub struct Unit {
    program: Program,
    options: CompilerOptions,
    vm_config: VmConfig,
    compiled: Option<Result<Module, CompilationError>>,
    diagnostics: Diagnostics,
}

impl Unit {
    pub fn new(program: Program) -> Self {
        Self::with_options(program, CompilerOptions::default())
    }

    pub fn with_options(program: Program, options: CompilerOptions) -> Self {
        Self {
            program,
            options,
            vm_config: VmConfig::default(),
            compiled: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Replaces the machine settings used by [`run`](Unit::run).
    pub fn with_vm_config(mut self, config: VmConfig) -> Self {
        self.vm_config = config;
        self
    }

    /// Type-checks and compiles the program.
    ///
    /// The first error stops compilation and is recorded as a diagnostic.
    pub fn build(&mut self) -> Result<&Module, CompilationError> {
        if self.compiled.is_none() {
            let result = Compiler::compile_with(&mut self.program, self.options.clone());
            if let Err(error) = &result {
                self.diagnostics.report(error);
            }
            self.compiled = Some(result);
        }

        match &self.compiled {
            Some(Ok(module)) => Ok(module),
            Some(Err(error)) => Err(error.clone()),
            None => Err(CompilationError::internal("unit was not compiled")),
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self.compiled, Some(Ok(_)))
    }

    /// The program tree, annotated once built.
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn module(&self) -> Option<&Module> {
        match &self.compiled {
            Some(Ok(module)) => Some(module),
            _ => None,
        }
    }

    /// The assembly listing of the compiled module.
    pub fn listing(&self) -> Option<String> {
        self.module().map(Module::to_string)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Builds if needed, then runs the entry point with `input` queued for
    /// `read` expressions.
    pub fn run(&mut self, input: &str) -> Result<Execution, TilError> {
        let config = self
            .vm_config
            .clone()
            .with_entry_label(self.options.entry_label.clone());
        let module = self.build()?;

        let mut machine = Machine::new(module, config)?;
        machine.feed(input);
        let exit_code = machine.run()?;

        Ok(Execution {
            exit_code,
            output: machine.take_output(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use til_ast::build::*;
    use til_core::Type;

    #[test]
    fn build_is_cached() {
        let globals = vec![declare(Type::int(), "x", Some(int(1)))];
        let mut unit = Unit::new(program(globals, None));
        let first = unit.build().unwrap().clone();
        assert_eq!(unit.build().unwrap(), &first);
        assert!(unit.is_built());
        assert!(unit.diagnostics().is_empty());
    }

    #[test]
    fn failure_is_reported_once() {
        let mut unit = Unit::new(program(
            vec![],
            Some(block(vec![], vec![print(vec![load(var("nope").at(4))])])),
        ));
        assert!(unit.build().is_err());
        assert!(unit.build().is_err());
        assert_eq!(unit.diagnostics().len(), 1);
        assert!(unit.module().is_none());

        let mut out = Vec::new();
        unit.diagnostics().write_to(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("4: "));
    }

    #[test]
    fn listing_names_entry_point() {
        let mut unit = Unit::new(program(vec![], Some(block(vec![], vec![]))));
        unit.build().unwrap();
        assert!(unit.listing().unwrap().contains("_main"));
    }

    #[test]
    fn custom_entry_label_runs() {
        let mut unit = Unit::with_options(
            program(vec![], Some(block(vec![], vec![ret(int(3))]))),
            CompilerOptions::default().with_entry_label("start"),
        );
        assert_eq!(unit.run("").unwrap().exit_code, 3);
    }

    #[test]
    fn runtime_faults_surface() {
        let main = block(vec![], vec![print(vec![read()])]);
        let mut unit = Unit::new(program(vec![], Some(main)));
        assert!(matches!(unit.run(""), Err(TilError::Runtime(_))));
    }
}
