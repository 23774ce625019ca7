//! Process entry: load the program unit, run its initializers, then call `go`.
//!
//! # Flow
//!
//! ```text
//! main_helper(program, args)
//!   ├── install CodeResolver as the machine's linker
//!   ├── handle_unit(program)      manifest → initializers → RunState
//!   └── handle_go(args)           only while RunState is Continue
//!         ├── `go` bound to a procedure?    otherwise skip
//!         ├── `main` bound to a procedure?  otherwise skip
//!         └── go(symbol-list, argv)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use ori_machine::{stderr_dump, CodeVector, Machine, Procedure, SharedDumpHandler, Value};

use crate::config::LoadConfig;
use crate::errors::{HarnessError, LoadError, ResolveError};
use crate::harness::{Harness, RunState};
use crate::loader::{LinkedUnits, UnitLoader, UnitSource};
use crate::locate::Locator;
use crate::manifest::load_manifest;
use crate::resolve::CodeResolver;
use crate::search_path::SearchPath;
use crate::unit::{SharedUnit, Unit};

/// Global bound to the program's continuation procedure.
pub const CONTINUATION_BINDING: &str = "go";

/// Global whose presence gates the continuation call.
pub const MAIN_MARKER: &str = "main";

/// Everything a running program shares: the machine, the harness, and the
/// unit loader.
pub struct Runtime {
    machine: Machine,
    harness: Harness,
    loader: Arc<UnitLoader>,
    locator: Locator,
    working_dir: PathBuf,
    resolver: Option<Arc<CodeResolver>>,
}

impl Runtime {
    /// Start configuring a runtime.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// The shared machine.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Mutable access to the shared machine, e.g. to define globals.
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// Harness used for every top-level call.
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Unit cache shared with the code resolver.
    pub fn loader(&self) -> &Arc<UnitLoader> {
        &self.loader
    }

    /// The program unit, once `main_helper` or `set_program` installed one.
    pub fn program(&self) -> Option<&SharedUnit> {
        self.resolver.as_ref().map(|r| r.program())
    }

    /// Run `program` as the process entry.
    ///
    /// Initializers run first; `go` is only attempted while execution may
    /// continue. Faults have already been dumped when they are returned.
    pub fn main_helper(
        &mut self,
        program: SharedUnit,
        args: &[String],
    ) -> Result<RunState, HarnessError> {
        self.set_program(Arc::clone(&program));
        let state = self.handle_unit(&*program)?;
        if state.keep_running() {
            return self.handle_go(args);
        }
        Ok(state)
    }

    /// Make `program` the unit searched first for code references.
    pub fn set_program(&mut self, program: SharedUnit) {
        let resolver = Arc::new(
            CodeResolver::new(program, Arc::clone(&self.loader))
                .with_working_dir(self.working_dir.clone()),
        );
        self.machine.set_linker(resolver.clone());
        self.resolver = Some(resolver);
    }

    /// Run the initializers declared by `unit`'s manifest.
    ///
    /// A unit without a usable manifest runs nothing and lets execution continue.
    pub fn handle_unit(&mut self, unit: &dyn Unit) -> Result<RunState, HarnessError> {
        tracing::info!(unit = unit.name(), "executing module");
        match load_manifest(unit) {
            Ok(procedures) => self.harness.run_sequence(&mut self.machine, &procedures),
            Err(err) => {
                tracing::debug!(%err, "no initializers to run");
                Ok(RunState::Continue)
            }
        }
    }

    /// Call `go` with the symbol list and the argument vector.
    pub fn handle_go(&mut self, args: &[String]) -> Result<RunState, HarnessError> {
        let Some(go) = self.global_procedure(CONTINUATION_BINDING) else {
            tracing::info!("procedure go is not defined, skipping");
            return Ok(RunState::Continue);
        };
        if self.global_procedure(MAIN_MARKER).is_none() {
            tracing::info!("procedure main is not defined, not calling go");
            return Ok(RunState::Continue);
        }

        let go_args = [make_symlist(&self.machine), make_argv(args)];
        tracing::info!(argc = args.len(), "executing (go ...)");
        self.harness.run_procedure(&mut self.machine, &go, &go_args)
    }

    /// Resolve a code block through the installed program unit.
    pub fn resolve_code(
        &self,
        module: &str,
        ns: &str,
        id: u32,
        number: u32,
    ) -> Result<CodeVector, ResolveError> {
        match &self.resolver {
            Some(resolver) => resolver.resolve_code(module, ns, id, number),
            None => Err(ResolveError::NoProgramUnit {
                module: module.to_string(),
                ns: ns.to_string(),
                number,
            }),
        }
    }

    /// Locate a unit by base name and load it, without running its initializers.
    pub fn load_unit(&self, base: &str) -> Result<SharedUnit, LoadError> {
        self.locator.locate(base, &self.loader)
    }

    /// Global bound to a procedure; any other binding counts as absent.
    fn global_procedure(&self, name: &str) -> Option<Procedure> {
        self.machine.global_value(name)?.as_procedure().cloned()
    }
}

/// Every interned symbol, consed in enumeration order onto the empty list.
///
/// The most recently interned symbol ends up at the head.
pub fn make_symlist(machine: &Machine) -> Value {
    machine
        .symbols()
        .iter()
        .fold(Value::Null, |list, sym| Value::cons(Value::Symbol(sym), list))
}

/// Process arguments as a vector of strings, in order.
pub fn make_argv(args: &[String]) -> Value {
    Value::vector(args.iter().map(|arg| Value::string(arg)).collect())
}

/// Builder for [`Runtime`].
///
/// Anything not set falls back to the process configuration: the global
/// search path, `ORI_LOAD_REPORT`, stderr dumps, and no linked units.
pub struct RuntimeBuilder {
    search_path: Option<SearchPath>,
    working_dir: PathBuf,
    report_result: Option<bool>,
    dump: Option<SharedDumpHandler>,
    source: Option<Box<dyn UnitSource>>,
    machine: Option<Machine>,
}

impl RuntimeBuilder {
    /// Builder with every setting left to its default.
    pub fn new() -> Self {
        RuntimeBuilder {
            search_path: None,
            working_dir: PathBuf::new(),
            report_result: None,
            dump: None,
            source: None,
            machine: None,
        }
    }

    /// Directories probed after the working directory.
    #[must_use]
    pub fn search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = Some(search_path);
        self
    }

    /// Directory standing in for the process working directory.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Log the result register after each top-level call.
    #[must_use]
    pub fn report_result(mut self, report_result: bool) -> Self {
        self.report_result = Some(report_result);
        self
    }

    /// Where machine-state dumps go.
    #[must_use]
    pub fn dump_handler(mut self, dump: SharedDumpHandler) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Source that turns located files into units.
    #[must_use]
    pub fn source(mut self, source: impl UnitSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Start from a prepared machine (e.g. with globals already defined).
    #[must_use]
    pub fn machine(mut self, machine: Machine) -> Self {
        self.machine = Some(machine);
        self
    }

    /// Build the runtime, filling unset settings from the environment.
    pub fn build(self) -> Runtime {
        let search_path = self
            .search_path
            .unwrap_or_else(|| SearchPath::global().clone());
        let report_result = self
            .report_result
            .unwrap_or_else(|| LoadConfig::from_env().report_result);
        let dump = self.dump.unwrap_or_else(stderr_dump);
        let source = self
            .source
            .unwrap_or_else(|| Box::new(LinkedUnits::new()));

        Runtime {
            machine: self.machine.unwrap_or_default(),
            harness: Harness::new(dump).with_report_result(report_result),
            loader: Arc::new(UnitLoader::from_boxed(source)),
            locator: Locator::new(search_path).with_working_dir(self.working_dir.clone()),
            working_dir: self.working_dir,
            resolver: None,
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
