use super::*;
use crate::unit::CompiledUnit;
use pretty_assertions::assert_eq;
use std::fs;

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"unit").unwrap();
    path
}

#[test]
fn linked_units_match_file_name_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let path = touch(dir.path(), "prog.exe");
    let units = LinkedUnits::new().with(CompiledUnit::new("prog").into_shared());

    let unit = units.load_from(&path).unwrap();
    assert_eq!(unit.name(), "prog");
}

#[test]
fn existing_file_without_image_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = touch(dir.path(), "stray.EXE");
    let units = LinkedUnits::new().with(CompiledUnit::new("prog").into_shared());

    let err = units.load_from(&path).unwrap_err();
    assert!(matches!(err, LoadError::Invalid { .. }), "got {err:?}");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let units = LinkedUnits::new().with(CompiledUnit::new("prog").into_shared());

    let err = units.load_from(&dir.path().join("prog.EXE")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "got {err:?}");
}

#[test]
fn loader_caches_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = touch(dir.path(), "prog.EXE");
    let loader = UnitLoader::new(LinkedUnits::new().with(CompiledUnit::new("prog").into_shared()));

    let first = loader.load(&path).unwrap();
    let second = loader.load(&path).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.load_count(), 1);
    assert_eq!(loader.cached_units(), 1);
}

#[test]
fn loader_does_not_cache_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.EXE");
    let loader = UnitLoader::new(LinkedUnits::new().with(CompiledUnit::new("prog").into_shared()));

    assert!(loader.load(&path).is_err());
    fs::write(&path, b"unit").unwrap();
    assert!(loader.load(&path).is_ok());
    assert_eq!(loader.load_count(), 1);
}
