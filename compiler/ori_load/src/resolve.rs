//! Cross-unit code resolution.
//!
//! Compiled code refers to blocks in other units by `(module, namespace, id,
//! number)`. Resolution tries the program unit first, then loads the unit
//! named by `module` directly from the working directory (the search path is
//! not consulted, and the unit's initializers are not run). A reference that
//! neither unit satisfies means the build is inconsistent; it is never retried.

use std::path::PathBuf;
use std::sync::Arc;

use ori_machine::{CodeLinker, CodeVector, Fault};

use crate::errors::ResolveError;
use crate::loader::UnitLoader;
use crate::locate::UNIT_EXTENSION;
use crate::unit::{loader_type_name, SharedUnit, Unit};

/// Code block `number` of namespace `ns` in `unit`, if the unit has it.
pub fn lookup_in_unit(unit: &dyn Unit, ns: &str, number: u32) -> Option<CodeVector> {
    unit.loader_type(ns, &loader_type_name(number))?
        .entrypoint()
        .cloned()
}

/// Resolves code references for running code, program unit first.
pub struct CodeResolver {
    program: SharedUnit,
    loader: Arc<UnitLoader>,
    working_dir: PathBuf,
}

impl CodeResolver {
    /// Resolver for `program`, loading other units through `loader`.
    pub fn new(program: SharedUnit, loader: Arc<UnitLoader>) -> Self {
        CodeResolver {
            program,
            loader,
            working_dir: PathBuf::new(),
        }
    }

    /// Load external modules relative to `dir` instead of the process working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Unit searched before any other.
    pub fn program(&self) -> &SharedUnit {
        &self.program
    }

    /// Exact file loaded for `module`.
    pub fn module_path(&self, module: &str) -> PathBuf {
        self.working_dir.join(format!("{module}.{UNIT_EXTENSION}"))
    }

    /// Code block `number` of namespace `ns`, from the program unit or from `module`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resolve_code(
        &self,
        module: &str,
        ns: &str,
        id: u32,
        number: u32,
    ) -> Result<CodeVector, ResolveError> {
        if let Some(code) = lookup_in_unit(&*self.program, ns, number) {
            return Ok(code);
        }

        let cause = match self.loader.load(&self.module_path(module)) {
            Ok(unit) => match lookup_in_unit(&*unit, ns, number) {
                Some(code) => {
                    tracing::debug!(unit = unit.name(), "resolved in external unit");
                    return Ok(code);
                }
                None => None,
            },
            Err(err) => Some(err),
        };

        tracing::error!(module, ns, number, "code not found");
        Err(ResolveError::Unresolved {
            module: module.to_string(),
            ns: ns.to_string(),
            id,
            number,
            cause,
        })
    }
}

impl CodeLinker for CodeResolver {
    fn find_code(&self, module: &str, ns: &str, id: u32, number: u32) -> Result<CodeVector, Fault> {
        self.resolve_code(module, ns, id, number)
            .map_err(|err| Fault::internal(err.to_string()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
