//! Unit location.
//!
//! A unit referenced by base name is probed in the working directory first,
//! then in every search-path directory in order. The first existing file is
//! loaded; if that load fails, later directories are not tried.

use std::path::{Path, PathBuf};

use crate::errors::LoadError;
use crate::loader::UnitLoader;
use crate::search_path::SearchPath;
use crate::unit::SharedUnit;

/// Canonical unit file extension.
pub const UNIT_EXTENSION: &str = "EXE";

/// File name for a unit: `base` as-is if it already carries the unit
/// extension (any case), otherwise `base.EXE`.
pub fn unit_file_name(base: &str) -> String {
    if has_unit_extension(base) {
        base.to_string()
    } else {
        format!("{base}.{UNIT_EXTENSION}")
    }
}

fn has_unit_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(UNIT_EXTENSION))
}

/// Probes the working directory and the search path for unit files.
#[derive(Clone, Debug, Default)]
pub struct Locator {
    working_dir: PathBuf,
    search_path: SearchPath,
}

impl Locator {
    /// Locator relative to the process working directory.
    pub fn new(search_path: SearchPath) -> Self {
        Locator {
            working_dir: PathBuf::new(),
            search_path,
        }
    }

    /// Resolve the first probe against `dir` instead of the process working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Directories probed after the working directory.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Paths probed for `base`, in probe order.
    pub fn candidates(&self, base: &str) -> Vec<PathBuf> {
        let name = unit_file_name(base);
        std::iter::once(self.working_dir.join(&name))
            .chain(self.search_path.iter().map(|dir| Path::new(dir).join(&name)))
            .collect()
    }

    /// First candidate that exists as a file.
    pub fn find(&self, base: &str) -> Option<PathBuf> {
        self.candidates(base).into_iter().find(|path| path.is_file())
    }

    /// Locate `base` and load it through `loader`.
    pub fn locate(&self, base: &str, loader: &UnitLoader) -> Result<SharedUnit, LoadError> {
        let candidates = self.candidates(base);
        let Some(index) = candidates.iter().position(|path| path.is_file()) else {
            tracing::debug!(unit = base, probed = candidates.len(), "unit not found");
            return Err(LoadError::NotFound {
                name: unit_file_name(base),
                searched: candidates,
            });
        };

        let path = &candidates[index];
        tracing::debug!(unit = base, path = %path.display(), "unit located");
        loader.load(path)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
