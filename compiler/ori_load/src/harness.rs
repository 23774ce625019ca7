//! Trampoline harness: running procedures through the shared machine.
//!
//! Every top-level call follows the same protocol, whether it is a manifest
//! initializer or the program's continuation:
//!
//! 1. Clear the register file and bind the arguments.
//! 2. Run the procedure on the trampoline.
//! 3. Map the outcome:
//!    - completed: keep running
//!    - exit with code 0: stop
//!    - exit with another code: report, dump the machine, stop
//!    - fault: dump the machine and propagate

use ori_machine::{CallOutcome, Machine, Procedure, SharedDumpHandler, Value};

use crate::errors::HarnessError;

/// Whether execution may continue after a procedure call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Continue,
    /// The program exited with `code`.
    Stopped { code: i32 },
}

impl RunState {
    /// True while later procedures may still run.
    #[inline]
    pub fn keep_running(self) -> bool {
        matches!(self, RunState::Continue)
    }

    /// Process exit code implied by this state.
    pub fn exit_code(self) -> i32 {
        match self {
            RunState::Continue => 0,
            RunState::Stopped { code } => code,
        }
    }
}

/// Runs top-level procedures on the machine and maps their outcomes.
pub struct Harness {
    report_result: bool,
    dump: SharedDumpHandler,
}

impl Harness {
    /// Harness that sends dumps to `dump`, with result reporting off.
    pub fn new(dump: SharedDumpHandler) -> Self {
        Harness {
            report_result: false,
            dump,
        }
    }

    /// Log the result register after every procedure that does not fault.
    #[must_use]
    pub fn with_report_result(mut self, report_result: bool) -> Self {
        self.report_result = report_result;
        self
    }

    /// Handler receiving machine-state dumps.
    pub fn dump_handler(&self) -> &SharedDumpHandler {
        &self.dump
    }

    /// Run `procedures` in order with no arguments, stopping at the first exit.
    pub fn run_sequence(
        &self,
        machine: &mut Machine,
        procedures: &[Procedure],
    ) -> Result<RunState, HarnessError> {
        let mut state = RunState::Continue;
        for procedure in procedures {
            if !state.keep_running() {
                break;
            }
            state = self.run_procedure(machine, procedure, &[])?;
        }
        Ok(state)
    }

    /// Run one procedure with `args` bound to registers `1..=args.len()`.
    pub fn run_procedure(
        &self,
        machine: &mut Machine,
        procedure: &Procedure,
        args: &[Value],
    ) -> Result<RunState, HarnessError> {
        machine.clear_registers();
        let outcome = match machine.load_arguments(args) {
            Ok(()) => machine.trampoline(procedure, args.len()),
            Err(fault) => CallOutcome::Failed(fault),
        };

        let state = match outcome {
            CallOutcome::Completed => RunState::Continue,
            CallOutcome::ExitedWithCode(code) => {
                if code != 0 {
                    tracing::error!(
                        procedure = procedure.name(),
                        code,
                        "machine exited with error code"
                    );
                    self.dump.full_core_dump(machine);
                }
                RunState::Stopped { code }
            }
            CallOutcome::Failed(fault) => {
                self.dump.full_core_dump(machine);
                return Err(HarnessError::Unhandled {
                    procedure: procedure.name().to_string(),
                    fault,
                });
            }
        };

        if self.report_result {
            tracing::info!(
                procedure = procedure.name(),
                result = %machine.result(),
                "procedure result"
            );
        }
        Ok(state)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
