//! Full machine-state dumps for fatal conditions.
//!
//! The loader only decides when a dump happens; where it goes is chosen here:
//! - Native: stderr (default)
//! - Tests: buffer for assertions
//! - Embedded hosts: silent
//!
//! Uses enum dispatch instead of trait objects, like the print handlers.

use parking_lot::Mutex;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::{Machine, Value};

/// Render the register file, result register and environment sizes.
pub fn render_machine_state(machine: &Machine) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== machine state ==");
    let _ = writeln!(out, "argc: {}", machine.argc());
    let _ = writeln!(out, "result: {}", machine.result());
    let mut index = 0;
    while let Some(value) = machine.register(index) {
        if !matches!(value, Value::Unspecified) {
            let _ = writeln!(out, "r{index}: {value}");
        }
        index += 1;
    }
    let _ = writeln!(out, "symbols: {}", machine.symbols().len());
    out
}

/// Writes dumps to stderr.
#[derive(Default)]
pub struct StderrDump;

impl StderrDump {
    pub fn full_core_dump(&self, machine: &Machine) {
        tracing::error!("full core dump requested");
        eprint!("{}", render_machine_state(machine));
    }
}

/// Captures every dump for later inspection.
#[derive(Default)]
pub struct BufferDump {
    dumps: Mutex<Vec<String>>,
}

impl BufferDump {
    /// Buffer with no captured dumps.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full_core_dump(&self, machine: &Machine) {
        self.dumps.lock().push(render_machine_state(machine));
    }

    /// Number of dumps captured so far.
    pub fn dump_count(&self) -> usize {
        self.dumps.lock().len()
    }

    /// All captured dumps, concatenated.
    pub fn output(&self) -> String {
        self.dumps.lock().concat()
    }
}

/// Dump handler implementation using enum dispatch.
pub enum DumpHandlerImpl {
    /// Writes to stderr (default).
    Stderr(StderrDump),
    /// Captures to buffer (testing).
    Buffer(BufferDump),
    /// Discards dumps.
    Silent,
}

impl DumpHandlerImpl {
    pub fn full_core_dump(&self, machine: &Machine) {
        match self {
            Self::Stderr(h) => h.full_core_dump(machine),
            Self::Buffer(h) => h.full_core_dump(machine),
            Self::Silent => {}
        }
    }

    /// Number of captured dumps. Always 0 for handlers that don't capture.
    pub fn dump_count(&self) -> usize {
        match self {
            Self::Buffer(h) => h.dump_count(),
            Self::Stderr(_) | Self::Silent => 0,
        }
    }

    /// Captured dump text. Empty for handlers that don't capture.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(h) => h.output(),
            Self::Stderr(_) | Self::Silent => String::new(),
        }
    }
}

/// Shared dump handler that can be passed around.
pub type SharedDumpHandler = Arc<DumpHandlerImpl>;

/// Create a default stderr dump handler.
pub fn stderr_dump() -> SharedDumpHandler {
    Arc::new(DumpHandlerImpl::Stderr(StderrDump))
}

/// Create a buffer dump handler for tests.
pub fn buffer_dump() -> SharedDumpHandler {
    Arc::new(DumpHandlerImpl::Buffer(BufferDump::new()))
}

/// Create a handler that discards dumps.
pub fn silent_dump() -> SharedDumpHandler {
    Arc::new(DumpHandlerImpl::Silent)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
