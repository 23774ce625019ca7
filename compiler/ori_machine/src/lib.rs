//! Ori Machine - register machine boundary for loaded Ori units.
//!
//! Compiled units never call each other directly. Every top-level call goes
//! through a shared register machine: the caller clears the register file,
//! binds arguments, and hands the procedure to the trampoline, which keeps
//! running code blocks until one of them returns, exits, or faults.
//!
//! # Architecture
//!
//! - `Machine`: register file, result register, global environment, symbol table
//! - `Procedure` / `CodeVector`: callable entities and the code blocks behind them
//! - `Step`: what a code block asks the trampoline to do next
//! - `CallOutcome`: tagged result of a whole trampoline run
//! - `DumpHandlerImpl`: destination of full machine-state dumps on fatal conditions
//! - `CodeLinker`: hook through which running code resolves blocks in other units

mod code;
mod dump;
mod fault;
mod machine;
mod symbol;
mod value;

pub use code::{CodeVector, Procedure, Step};
pub use dump::{
    buffer_dump, render_machine_state, silent_dump, stderr_dump, BufferDump, DumpHandlerImpl,
    SharedDumpHandler, StderrDump,
};
pub use fault::{Fault, FaultKind};
pub use machine::{CallOutcome, CodeLinker, Machine, NUM_REGISTERS};
pub use symbol::{Symbol, SymbolTable};
pub use value::{Pair, Value};
