//! The register machine shared by every loaded unit.
//!
//! One `Machine` exists per process. Its register file is reset at the start
//! of every top-level call; the global environment and the symbol table are
//! never reset.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

use crate::{CodeVector, Fault, Procedure, Step, Symbol, SymbolTable, Value};

/// Size of the register file. Register 0 holds the procedure being called.
pub const NUM_REGISTERS: usize = 32;

/// Tagged result of running a procedure to completion.
#[derive(Debug, PartialEq)]
pub enum CallOutcome {
    Completed,
    ExitedWithCode(i32),
    Failed(Fault),
}

/// Resolves code blocks that live in other units.
///
/// Installed on the machine by the loader so that running code can reach
/// blocks addressed by `(module, namespace, id, number)`.
pub trait CodeLinker: Send + Sync {
    fn find_code(&self, module: &str, ns: &str, id: u32, number: u32)
        -> Result<CodeVector, Fault>;
}

/// Register file, global environment and symbol table of one process.
pub struct Machine {
    registers: Vec<Value>,
    result: Value,
    argc: usize,
    globals: FxHashMap<Symbol, Value>,
    symbols: SymbolTable,
    linker: Option<Arc<dyn CodeLinker>>,
}

impl Machine {
    /// Machine with cleared registers, no globals and no linker.
    pub fn new() -> Self {
        Machine {
            registers: vec![Value::Unspecified; NUM_REGISTERS],
            result: Value::Unspecified,
            argc: 0,
            globals: FxHashMap::default(),
            symbols: SymbolTable::new(),
            linker: None,
        }
    }

    /// Reset the register file, result register and argument count.
    pub fn clear_registers(&mut self) {
        for reg in &mut self.registers {
            *reg = Value::Unspecified;
        }
        self.result = Value::Unspecified;
        self.argc = 0;
    }

    /// Contents of register `index`, if it exists.
    pub fn register(&self, index: usize) -> Option<&Value> {
        self.registers.get(index)
    }

    /// Store `value` in register `index`; out of range is an internal fault.
    pub fn set_register(&mut self, index: usize, value: Value) -> Result<(), Fault> {
        match self.registers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Fault::internal(format!(
                "register {index} out of range (0..{NUM_REGISTERS})"
            ))),
        }
    }

    /// Bind `args` to registers `1..=args.len()`.
    pub fn load_arguments(&mut self, args: &[Value]) -> Result<(), Fault> {
        if args.len() >= NUM_REGISTERS {
            return Err(Fault::argument_overflow(args.len(), NUM_REGISTERS - 1));
        }
        for (slot, arg) in self.registers[1..].iter_mut().zip(args) {
            *slot = arg.clone();
        }
        self.argc = args.len();
        Ok(())
    }

    /// Argument count of the current call.
    pub fn argc(&self) -> usize {
        self.argc
    }

    /// Result register.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Overwrite the result register.
    pub fn set_result(&mut self, value: Value) {
        self.result = value;
    }

    /// Run `procedure` with `argc` arguments already bound.
    ///
    /// Tail calls are followed in a loop until a block returns, exits or faults.
    pub fn trampoline(&mut self, procedure: &Procedure, argc: usize) -> CallOutcome {
        let mut current = procedure.clone();
        let mut argc = argc;
        loop {
            if argc >= NUM_REGISTERS {
                return CallOutcome::Failed(Fault::argument_overflow(argc, NUM_REGISTERS - 1));
            }
            self.registers[0] = Value::Procedure(current.clone());
            self.argc = argc;

            let step = current.code().invoke(self);
            match step {
                Step::Return => return CallOutcome::Completed,
                Step::TailCall { procedure, argc: next_argc } => {
                    current = procedure;
                    argc = next_argc;
                }
                Step::Exit(code) => return CallOutcome::ExitedWithCode(code),
                Step::Fault(fault) => return CallOutcome::Failed(fault),
            }
        }
    }

    /// Intern `text` in the process symbol table.
    pub fn intern(&mut self, text: &str) -> Symbol {
        self.symbols.intern(text)
    }

    /// The process symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Bind global `name`, interning it if needed.
    pub fn define_global(&mut self, name: &str, value: Value) {
        let sym = self.symbols.intern(name);
        self.globals.insert(sym, value);
    }

    /// Value bound to a global name, if any.
    pub fn global_value(&self, name: &str) -> Option<&Value> {
        let sym = self.symbols.get(name)?;
        self.globals.get(&sym)
    }

    /// Install the hook used by [`Machine::find_code`].
    pub fn set_linker(&mut self, linker: Arc<dyn CodeLinker>) {
        self.linker = Some(linker);
    }

    /// Resolve a code block in another unit through the installed linker.
    pub fn find_code(
        &self,
        module: &str,
        ns: &str,
        id: u32,
        number: u32,
    ) -> Result<CodeVector, Fault> {
        match &self.linker {
            Some(linker) => linker.find_code(module, ns, id, number),
            None => Err(Fault::internal(format!(
                "no code linker installed: {module} {ns} {number}"
            ))),
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("argc", &self.argc)
            .field("result", &self.result)
            .field("globals", &self.globals.len())
            .field("symbols", &self.symbols)
            .field("linker", &self.linker.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
