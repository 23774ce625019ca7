// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Process entry scenarios.
//!
//! Each test lays out real unit files in a temporary working directory,
//! links the matching unit images into a `Runtime`, locates the program by
//! name and starts it through `main_helper`.

use std::fs;
use std::sync::Arc;

use ori_load::{
    CompiledUnit, LinkedUnits, LoadError, Manifest, RunState, Runtime, SearchPath, Unit,
    CONTINUATION_BINDING, MAIN_MARKER,
};
use ori_machine::{buffer_dump, CodeVector, Procedure, Step, Value};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

type Trace = Arc<Mutex<Vec<String>>>;

struct Scenario {
    dir: TempDir,
    units: LinkedUnits,
}

impl Scenario {
    fn new() -> Self {
        Scenario {
            dir: tempfile::tempdir().unwrap(),
            units: LinkedUnits::new(),
        }
    }

    /// Write `<name>.EXE` into the working directory and link its image.
    fn with_unit(mut self, unit: CompiledUnit) -> Self {
        fs::write(self.dir.path().join(format!("{}.EXE", unit.name())), b"unit").unwrap();
        self.units.link(unit.into_shared());
        self
    }

    fn start(self, program: &str, args: &[&str]) -> (Runtime, RunState) {
        let mut runtime = Runtime::builder()
            .search_path(SearchPath::empty())
            .working_dir(self.dir.path())
            .report_result(true)
            .dump_handler(buffer_dump())
            .source(self.units)
            .build();
        let unit = runtime.load_unit(program).unwrap();
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        let state = runtime.main_helper(unit, &args).unwrap();
        (runtime, state)
    }
}

fn traced(trace: &Trace, name: &str, step: Step) -> Procedure {
    let trace = Arc::clone(trace);
    let label = name.to_string();
    Procedure::from_fn(name, move |_| {
        trace.lock().push(label.clone());
        step.clone()
    })
}

fn define(name: &str, value: Value) -> Procedure {
    let binding = name.to_string();
    Procedure::from_fn("define", move |m| {
        m.define_global(&binding, value.clone());
        Step::Return
    })
}

fn marker() -> Value {
    Value::Procedure(Procedure::from_fn("main", |_| Step::Return))
}

#[test]
fn clean_exit_in_initializer_skips_go() {
    let trace = Trace::default();
    let program = CompiledUnit::new("prog").with_manifest(Manifest::new().with_procedures(vec![
        define(MAIN_MARKER, marker()),
        define(
            CONTINUATION_BINDING,
            Value::Procedure(traced(&trace, "go", Step::Return)),
        ),
        traced(&trace, "initA", Step::Return),
        traced(&trace, "initB", Step::Exit(0)),
    ]));

    let (runtime, state) = Scenario::new().with_unit(program).start("prog", &[]);

    assert_eq!(state, RunState::Stopped { code: 0 });
    assert_eq!(*trace.lock(), vec!["initA", "initB"]);
    assert_eq!(runtime.harness().dump_handler().dump_count(), 0);
}

#[test]
fn go_runs_after_initializers_with_arguments() {
    let trace = Trace::default();
    let go = {
        let trace = Arc::clone(&trace);
        Procedure::from_fn("go", move |m| {
            let symbols = m
                .register(1)
                .and_then(Value::list_to_vec)
                .map_or(0, |list| list.len());
            trace.lock().push(format!("symbols={symbols}"));
            if let Some(argv) = m.register(2) {
                trace.lock().push(format!("argv={argv}"));
            }
            Step::Return
        })
    };
    let program = CompiledUnit::new("prog").with_manifest(
        Manifest::new()
            .with_debug_info(|| {})
            .with_procedures(vec![
                traced(&trace, "init", Step::Return),
                define(CONTINUATION_BINDING, Value::Procedure(go)),
                define(MAIN_MARKER, marker()),
            ]),
    );

    let (runtime, state) = Scenario::new()
        .with_unit(program)
        .start("prog.EXE", &["one", "two"]);

    assert_eq!(state, RunState::Continue);
    // `go` and `main` are the only interned symbols.
    assert_eq!(
        *trace.lock(),
        vec!["init", "symbols=2", "argv=#(\"one\" \"two\")"]
    );
    assert_eq!(runtime.machine().symbols().len(), 2);
}

#[test]
fn main_marker_absent_leaves_go_uncalled() {
    let trace = Trace::default();
    let program = CompiledUnit::new("prog").with_manifest(Manifest::new().with_procedures(vec![
        define(
            CONTINUATION_BINDING,
            Value::Procedure(traced(&trace, "go", Step::Return)),
        ),
    ]));

    let (_, state) = Scenario::new().with_unit(program).start("prog", &[]);

    assert_eq!(state, RunState::Continue);
    assert!(trace.lock().is_empty());
}

#[test]
fn go_calls_into_another_unit() {
    let library = CompiledUnit::new("lib").with_code(
        "lib.code",
        5,
        CodeVector::new("lib-5", |m| {
            m.set_result(Value::Fixnum(42));
            Step::Return
        }),
    );
    let go = Procedure::from_fn("go", |m| match m.find_code("lib", "lib.code", 0, 5) {
        Ok(code) => Step::TailCall {
            procedure: Procedure::new("lib-entry", code),
            argc: 0,
        },
        Err(fault) => Step::Fault(fault),
    });
    let program = CompiledUnit::new("prog").with_manifest(Manifest::new().with_procedures(vec![
        define(CONTINUATION_BINDING, Value::Procedure(go)),
        define(MAIN_MARKER, marker()),
    ]));

    let (runtime, state) = Scenario::new()
        .with_unit(program)
        .with_unit(library)
        .start("prog", &[]);

    assert_eq!(state, RunState::Continue);
    assert_eq!(runtime.machine().result(), &Value::Fixnum(42));
    // prog through the locator, lib through the resolver.
    assert_eq!(runtime.loader().load_count(), 2);
}

#[test]
fn program_without_manifest_still_runs_go() {
    // Globals prepared by the host stand in for a unit with no initializers.
    let trace = Trace::default();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bare.EXE"), b"unit").unwrap();

    let mut machine = ori_machine::Machine::new();
    machine.define_global(
        CONTINUATION_BINDING,
        Value::Procedure(traced(&trace, "go", Step::Exit(4))),
    );
    machine.define_global(MAIN_MARKER, marker());

    let mut runtime = Runtime::builder()
        .search_path(SearchPath::empty())
        .working_dir(dir.path())
        .report_result(false)
        .dump_handler(buffer_dump())
        .source(LinkedUnits::new().with(CompiledUnit::new("bare").into_shared()))
        .machine(machine)
        .build();
    let unit = runtime.load_unit("bare").unwrap();
    let state = runtime.main_helper(unit, &[]).unwrap();

    assert_eq!(state, RunState::Stopped { code: 4 });
    assert_eq!(state.exit_code(), 4);
    assert_eq!(*trace.lock(), vec!["go"]);
    assert_eq!(runtime.harness().dump_handler().dump_count(), 1);
}

#[test]
fn missing_program_reports_every_probe() {
    let cwd = tempfile::tempdir().unwrap();
    let lib_dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::builder()
        .search_path(SearchPath::from_dirs([lib_dir.path().to_string_lossy()]))
        .working_dir(cwd.path())
        .dump_handler(buffer_dump())
        .build();

    let err = runtime.load_unit("absent").unwrap_err();
    match err {
        LoadError::NotFound { name, searched } => {
            assert_eq!(name, "absent.EXE");
            assert_eq!(searched[0], cwd.path().join("absent.EXE"));
            assert_eq!(searched.len(), 2);
            assert_eq!(searched[1], lib_dir.path().join("absent.EXE"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}
