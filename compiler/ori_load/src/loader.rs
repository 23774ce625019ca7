//! Turning unit files into loaded units.
//!
//! A [`UnitSource`] knows how to produce a unit from an existing file. The
//! [`UnitLoader`] sits in front of it and caches every unit it has produced
//! for the lifetime of the process, so repeated loads of the same file hand
//! back the same unit without touching the source again.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::LoadError;
use crate::locate::unit_file_name;
use crate::unit::SharedUnit;

/// Produces a unit from a file path.
pub trait UnitSource: Send + Sync {
    fn load_from(&self, path: &Path) -> Result<SharedUnit, LoadError>;
}

/// Units linked into the host binary, addressed by their unit file name.
///
/// Loading a path succeeds when the file exists and its file name matches a
/// linked unit (ASCII case-insensitive). An existing file with no linked
/// image is not a loadable unit.
#[derive(Default)]
pub struct LinkedUnits {
    units: FxHashMap<String, SharedUnit>,
}

impl LinkedUnits {
    /// Registry with no linked units.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `unit`, addressable as `<name>.EXE`.
    pub fn link(&mut self, unit: SharedUnit) {
        let key = unit_file_name(unit.name()).to_ascii_lowercase();
        self.units.insert(key, unit);
    }

    /// Builder form of [`LinkedUnits::link`].
    #[must_use]
    pub fn with(mut self, unit: SharedUnit) -> Self {
        self.link(unit);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl UnitSource for LinkedUnits {
    fn load_from(&self, path: &Path) -> Result<SharedUnit, LoadError> {
        std::fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(file_name) = path.file_name().and_then(OsStr::to_str) else {
            return Err(LoadError::invalid(path, "path has no file name"));
        };

        self.units
            .get(&file_name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| LoadError::invalid(path, "no linked image for this unit file"))
    }
}

/// Caching front end for a [`UnitSource`].
///
/// Units are keyed by canonical path and never evicted.
pub struct UnitLoader {
    source: Box<dyn UnitSource>,
    cache: Mutex<FxHashMap<PathBuf, SharedUnit>>,
    loads: AtomicUsize,
}

impl UnitLoader {
    /// Empty cache in front of `source`.
    pub fn new(source: impl UnitSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    /// Like [`UnitLoader::new`], for an already boxed source.
    pub fn from_boxed(source: Box<dyn UnitSource>) -> Self {
        UnitLoader {
            source,
            cache: Mutex::new(FxHashMap::default()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Load the unit at `path`, reusing a previously loaded one.
    pub fn load(&self, path: &Path) -> Result<SharedUnit, LoadError> {
        let key = cache_key(path);
        if let Some(unit) = self.cache.lock().get(&key) {
            tracing::debug!(path = %path.display(), unit = unit.name(), "unit cache hit");
            return Ok(Arc::clone(unit));
        }

        let unit = self.source.load_from(path)?;
        self.loads.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %path.display(), unit = unit.name(), "loaded unit");

        let mut cache = self.cache.lock();
        Ok(Arc::clone(cache.entry(key).or_insert(unit)))
    }

    /// Number of times the source actually produced a unit.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of distinct cached units.
    pub fn cached_units(&self) -> usize {
        self.cache.lock().len()
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
