//! Error types for unit loading and dispatch.
//!
//! Non-fatal conditions (`LoadError::NotFound`, `ManifestError`) are absorbed
//! by the component that detects them. `HarnessError` is fatal and propagates
//! to the caller of the entry point; `ResolveError` reaches running code as an
//! internal `Fault`.

use std::path::{Path, PathBuf};

use ori_machine::Fault;

/// Failure to locate or load a unit.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No candidate file exists.
    #[error("unit '{name}' not found. Searched: {}", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
    /// The file exists but could not be read.
    #[error("cannot read unit '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file exists but is not a loadable unit.
    #[error("'{}' is not a loadable unit: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl LoadError {
    /// An existing file that is not a loadable unit.
    #[cold]
    pub fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        LoadError::Invalid {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A unit that cannot serve as a program entry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("unit '{unit}' has no manifest")]
    Missing { unit: String },
    #[error("cannot get top-level procedures of unit '{unit}'")]
    MissingTopLevel { unit: String },
}

/// A failure escaping a procedure invoked by the harness.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum HarnessError {
    #[error("unhandled failure in procedure '{procedure}'")]
    Unhandled {
        procedure: String,
        #[source]
        fault: Fault,
    },
}

impl HarnessError {
    /// The fault that escaped the procedure.
    pub fn fault(&self) -> &Fault {
        match self {
            HarnessError::Unhandled { fault, .. } => fault,
        }
    }
}

/// A code reference that no unit can satisfy.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Neither the program unit nor the named module holds the block.
    #[error("code not found: {module} {ns} {number} (id {id})")]
    Unresolved {
        module: String,
        ns: String,
        id: u32,
        number: u32,
        /// Why the named module could not be searched, if it failed to load.
        #[source]
        cause: Option<LoadError>,
    },
    /// Resolution was attempted before a program unit was installed.
    #[error("no program unit installed; cannot resolve {module} {ns} {number}")]
    NoProgramUnit { module: String, ns: String, number: u32 },
}
