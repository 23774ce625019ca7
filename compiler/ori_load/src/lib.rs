//! Ori Load - locating, loading and starting compiled Ori units.
//!
//! A program is a unit file (`<name>.EXE`) whose manifest lists its
//! top-level initializers. Starting a program means running those
//! initializers in order on the shared [`Machine`](ori_machine::Machine),
//! then calling the `go` continuation if the program defined one.
//!
//! # Architecture
//!
//! - `SearchPath`: directories from `ORI_LIB_PATH`, split on `;` with `"` quoting
//! - `Locator`: probes the working directory, then each search directory
//! - `UnitLoader`: produces units through a `UnitSource` and caches them per path
//! - `load_manifest`: extracts the initializer sequence from a unit
//! - `Harness`: runs procedures on the machine and maps outcomes to `RunState`
//! - `CodeResolver`: resolves `(module, namespace, id, number)` code references
//! - `Runtime`: ties the pieces together for process entry

mod config;
mod entry;
mod errors;
mod harness;
mod loader;
mod locate;
mod manifest;
mod resolve;
mod search_path;
mod unit;

use std::sync::Once;

pub use config::{LoadConfig, REPORT_RESULT_VAR};
pub use entry::{
    make_argv, make_symlist, Runtime, RuntimeBuilder, CONTINUATION_BINDING, MAIN_MARKER,
};
pub use errors::{HarnessError, LoadError, ManifestError, ResolveError};
pub use harness::{Harness, RunState};
pub use loader::{LinkedUnits, UnitLoader, UnitSource};
pub use locate::{unit_file_name, Locator, UNIT_EXTENSION};
pub use manifest::load_manifest;
pub use resolve::{lookup_in_unit, CodeResolver};
pub use search_path::{split_search_path, SearchPath, LIB_PATH_VAR};
pub use unit::{
    loader_type_name, CompiledUnit, DebugInfoFn, LoaderType, Manifest, SharedUnit, TopLevelFn,
    Unit, LOADER_PREFIX,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for loader debugging.
///
/// Call this early in main() to enable tracing. Use `RUST_LOG` env var to control:
/// - `RUST_LOG=ori_load=debug` - all loader debug output
/// - `RUST_LOG=ori_load::resolve=debug` - code resolution only
/// - `RUST_LOG=ori_load=trace` - everything
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
