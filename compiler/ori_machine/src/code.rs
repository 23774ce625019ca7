//! Code blocks and procedures.
//!
//! A `CodeVector` is an opaque compiled block. It runs against the machine and
//! returns a `Step` telling the trampoline what to do next, so deep call
//! chains never grow the native stack.

use std::fmt;
use std::sync::Arc;

use crate::{Fault, Machine};

type CodeFn = dyn Fn(&mut Machine) -> Step + Send + Sync;

/// What a code block asks the trampoline to do after it runs.
#[derive(Clone)]
pub enum Step {
    /// The call is finished; the result register holds the value.
    Return,
    /// Jump to `procedure` with `argc` arguments already in registers `1..=argc`.
    TailCall { procedure: Procedure, argc: usize },
    /// Intentional program exit with a return code.
    Exit(i32),
    /// Unrecoverable failure.
    Fault(Fault),
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Return => f.write_str("Return"),
            Step::TailCall { procedure, argc } => f
                .debug_struct("TailCall")
                .field("procedure", &procedure.name())
                .field("argc", argc)
                .finish(),
            Step::Exit(code) => f.debug_tuple("Exit").field(code).finish(),
            Step::Fault(fault) => f.debug_tuple("Fault").field(fault).finish(),
        }
    }
}

/// A compiled code block.
///
/// Cloning is O(1); equality is identity.
#[derive(Clone)]
pub struct CodeVector {
    label: Arc<str>,
    code: Arc<CodeFn>,
}

impl CodeVector {
    /// Wrap `code` as a block labelled `label`.
    pub fn new(label: &str, code: impl Fn(&mut Machine) -> Step + Send + Sync + 'static) -> Self {
        CodeVector {
            label: Arc::from(label),
            code: Arc::new(code),
        }
    }

    /// Label assigned by the code generator, used only for diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run this block once against the machine.
    #[inline]
    pub fn invoke(&self, machine: &mut Machine) -> Step {
        (self.code)(machine)
    }

    /// True if both handles refer to the same block.
    pub fn ptr_eq(&self, other: &CodeVector) -> bool {
        Arc::ptr_eq(&self.code, &other.code)
    }
}

impl PartialEq for CodeVector {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for CodeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeVector({})", self.label)
    }
}

/// A callable entity: a name plus the code block that implements it.
#[derive(Clone, PartialEq)]
pub struct Procedure {
    name: Arc<str>,
    code: CodeVector,
}

impl Procedure {
    /// Procedure `name` implemented by `code`.
    pub fn new(name: &str, code: CodeVector) -> Self {
        Procedure {
            name: Arc::from(name),
            code,
        }
    }

    /// Build a procedure whose code block is `f`, labelled with the procedure name.
    pub fn from_fn(name: &str, f: impl Fn(&mut Machine) -> Step + Send + Sync + 'static) -> Self {
        Self::new(name, CodeVector::new(name, f))
    }

    /// Name used in logs and dumps.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block run when the procedure is called.
    pub fn code(&self) -> &CodeVector {
        &self.code
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Procedure({})", self.name)
    }
}
