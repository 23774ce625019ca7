//! Loadable units.
//!
//! A unit is a container of compiled code plus a manifest of entry points.
//! The code generator builds every lookup table at build time, so a unit is a
//! value implementing [`Unit`] instead of something discovered by reflection.
//!
//! # Code addressing
//!
//! Each externally addressable code block lives in a namespace under a loader
//! type named `Loader_<number>`. The loader type carries the block in its
//! `entrypoint`. A missing type or a missing entrypoint both mean "not here".

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

use ori_machine::{CodeVector, Procedure};

/// Prefix of synthesized loader type names.
pub const LOADER_PREFIX: &str = "Loader_";

/// Name of the loader type holding code block `number`.
pub fn loader_type_name(number: u32) -> String {
    format!("{LOADER_PREFIX}{number}")
}

/// Diagnostic-info procedure of a manifest.
pub type DebugInfoFn = dyn Fn() + Send + Sync;
/// Accessor returning a unit's initializers in order.
pub type TopLevelFn = dyn Fn() -> Vec<Procedure> + Send + Sync;

/// A unit's declared entry points.
///
/// `top_level` is required for the unit to be a valid program entry; a
/// manifest without it is reported and treated as having no initializers.
#[derive(Clone, Default)]
pub struct Manifest {
    debug_info: Option<Arc<DebugInfoFn>>,
    top_level: Option<Arc<TopLevelFn>>,
}

impl Manifest {
    /// Manifest with neither entry point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diagnostic-info procedure.
    #[must_use]
    pub fn with_debug_info(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.debug_info = Some(Arc::new(f));
        self
    }

    /// Set the accessor returning the initializers.
    #[must_use]
    pub fn with_top_level(
        mut self,
        f: impl Fn() -> Vec<Procedure> + Send + Sync + 'static,
    ) -> Self {
        self.top_level = Some(Arc::new(f));
        self
    }

    /// Convenience for a fixed initializer list.
    #[must_use]
    pub fn with_procedures(self, procedures: Vec<Procedure>) -> Self {
        self.with_top_level(move || procedures.clone())
    }

    /// Diagnostic-info procedure, if the unit provides one.
    pub fn debug_info(&self) -> Option<&DebugInfoFn> {
        self.debug_info.as_deref()
    }

    /// Initializer accessor, if the unit provides one.
    pub fn top_level(&self) -> Option<&TopLevelFn> {
        self.top_level.as_deref()
    }
}

impl fmt::Debug for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manifest")
            .field("debug_info", &self.debug_info.is_some())
            .field("top_level", &self.top_level.is_some())
            .finish()
    }
}

/// Synthesized per-block lookup type.
#[derive(Clone, Debug, Default)]
pub struct LoaderType {
    entrypoint: Option<CodeVector>,
}

impl LoaderType {
    /// Loader type carrying `entrypoint`.
    pub fn new(entrypoint: CodeVector) -> Self {
        LoaderType {
            entrypoint: Some(entrypoint),
        }
    }

    /// A loader type whose entrypoint was never emitted.
    pub fn without_entrypoint() -> Self {
        Self::default()
    }

    /// The code block, if one was emitted.
    pub fn entrypoint(&self) -> Option<&CodeVector> {
        self.entrypoint.as_ref()
    }
}

/// A loaded container of compiled code.
pub trait Unit: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn manifest(&self) -> Option<&Manifest>;

    /// Loader type `type_name` inside namespace `ns`.
    fn loader_type(&self, ns: &str, type_name: &str) -> Option<&LoaderType>;
}

/// Units are shared and never unloaded.
pub type SharedUnit = Arc<dyn Unit>;

/// Build-time image of a compiled unit.
#[derive(Debug, Default)]
pub struct CompiledUnit {
    name: String,
    manifest: Option<Manifest>,
    namespaces: FxHashMap<String, FxHashMap<String, LoaderType>>,
}

impl CompiledUnit {
    /// Unit with no manifest and no code.
    pub fn new(name: impl Into<String>) -> Self {
        CompiledUnit {
            name: name.into(),
            manifest: None,
            namespaces: FxHashMap::default(),
        }
    }

    /// Attach the unit's manifest.
    #[must_use]
    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Register code block `number` of namespace `ns`.
    #[must_use]
    pub fn with_code(self, ns: &str, number: u32, code: CodeVector) -> Self {
        self.with_loader_type(ns, &loader_type_name(number), LoaderType::new(code))
    }

    /// Register a loader type by its raw name.
    #[must_use]
    pub fn with_loader_type(mut self, ns: &str, type_name: &str, loader: LoaderType) -> Self {
        self.namespaces
            .entry(ns.to_string())
            .or_default()
            .insert(type_name.to_string(), loader);
        self
    }

    /// Share this unit as a loaded unit.
    pub fn into_shared(self) -> SharedUnit {
        Arc::new(self)
    }
}

impl Unit for CompiledUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    fn loader_type(&self, ns: &str, type_name: &str) -> Option<&LoaderType> {
        self.namespaces.get(ns)?.get(type_name)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
