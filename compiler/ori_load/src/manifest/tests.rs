use super::*;
use crate::unit::{CompiledUnit, Manifest};
use ori_machine::Step;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn noop(name: &str) -> Procedure {
    Procedure::from_fn(name, |_| Step::Return)
}

#[test]
fn missing_manifest_is_reported() {
    let unit = CompiledUnit::new("lib");
    assert_eq!(
        load_manifest(&unit),
        Err(ManifestError::Missing {
            unit: "lib".to_string()
        })
    );
}

#[test]
fn missing_top_level_is_reported() {
    let unit = CompiledUnit::new("broken").with_manifest(Manifest::new().with_debug_info(|| {}));
    assert_eq!(
        load_manifest(&unit),
        Err(ManifestError::MissingTopLevel {
            unit: "broken".to_string()
        })
    );
}

#[test]
fn procedures_keep_declaration_order() {
    let procs = vec![noop("init-a"), noop("init-b"), noop("init-c")];
    let unit =
        CompiledUnit::new("prog").with_manifest(Manifest::new().with_procedures(procs.clone()));

    assert_eq!(load_manifest(&unit), Ok(procs));
}

#[test]
fn missing_debug_info_is_not_fatal() {
    let unit = CompiledUnit::new("prog")
        .with_manifest(Manifest::new().with_procedures(vec![noop("init")]));
    let procs = load_manifest(&unit).unwrap();
    assert_eq!(procs.len(), 1);
}

#[test]
fn debug_info_runs_once_per_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let unit = CompiledUnit::new("prog").with_manifest(
        Manifest::new()
            .with_debug_info(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .with_procedures(Vec::new()),
    );

    assert_eq!(load_manifest(&unit), Ok(Vec::new()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn debug_info_runs_even_without_top_level() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let unit = CompiledUnit::new("broken").with_manifest(Manifest::new().with_debug_info(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(load_manifest(&unit).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
