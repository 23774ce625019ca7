//! Failures raised while running code on the machine.

use std::fmt;

/// Category of a machine fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// Link or build inconsistency (e.g. a code block that cannot be found).
    Internal,
    /// Failure signalled by running code.
    Runtime,
    /// More arguments than the register file can hold.
    ArgumentOverflow,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Internal => f.write_str("internal error"),
            FaultKind::Runtime => f.write_str("runtime error"),
            FaultKind::ArgumentOverflow => f.write_str("argument overflow"),
        }
    }
}

/// A failure escaping a procedure call.
///
/// Clean exits are not faults; they travel as `Step::Exit`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl Fault {
    /// Fault of `kind` with `message`.
    #[cold]
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Fault {
            kind,
            message: message.into(),
        }
    }

    /// Link or build inconsistency.
    #[cold]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Internal, message)
    }

    /// Failure signalled by running code.
    #[cold]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Runtime, message)
    }

    /// `count` arguments where only `capacity` registers are available.
    #[cold]
    pub fn argument_overflow(count: usize, capacity: usize) -> Self {
        Self::new(
            FaultKind::ArgumentOverflow,
            format!("{count} arguments do not fit in {capacity} argument registers"),
        )
    }
}
