//! The execution loop and its state machine.
//!
//! A [`Simulator`] owns the [`Machine`], the decoder built for its
//! configuration, the loaded program's text range, and the breakpoints. It
//! drives fetch, expand, decode and execute one instruction at a time and moves
//! between the states of [`SimState`]:
//!
//! ```text
//! Ready --run/step--> Running --> Paused(..) --run/step--> Running
//!                        |
//!                        +--> Stopped(Exit | Cliff | Exception | User)
//! ```
//!
//! `reset` returns to `Ready` from anywhere; `backstep` leaves the simulator
//! paused. Every transition is published as a [`SimulatorNotice`].

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use tracing::{debug, info, trace};

use crate::common::{SimError, SimulationException, Trap};
use crate::config::Config;
use crate::isa::InstructionSet;
use crate::isa::rvc;
use crate::machine::Machine;
use crate::machine::memory::Memory;
use crate::notice::{Publisher, Subscription};

/// Why execution is suspended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PauseReason {
    /// Requested through [`Simulator::pause`] or the runner.
    User,
    /// A single [`Simulator::step`] completed.
    Step,
    /// Reached a breakpoint address or executed `ebreak` at this PC.
    Breakpoint(u64),
    /// The step budget of `run` was used up.
    StepLimit,
}

/// Why execution ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// An exit `ecall` with this code.
    Exit(i32),
    /// The PC reached the end of the text segment.
    Cliff,
    /// A trap nobody handled.
    Exception(SimulationException),
    /// Requested through [`Simulator::stop`] or the runner.
    User,
}

/// Execution state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimState {
    /// Program loaded or reset, nothing executed.
    Ready,
    /// Inside `run`.
    Running,
    /// Suspended; `run` and `step` continue.
    Paused(PauseReason),
    /// Finished; only `reset` and `backstep` apply.
    Stopped(StopReason),
}

impl SimState {
    /// Returns true once the program has finished.
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    /// Turns a stop caused by an unhandled trap into an error.
    pub fn into_result(self) -> Result<Self, SimError> {
        match self {
            Self::Stopped(StopReason::Exception(exception)) => Err(exception.into()),
            state => Ok(state),
        }
    }
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Paused(PauseReason::User) => write!(f, "paused"),
            Self::Paused(PauseReason::Step) => write!(f, "paused after a step"),
            Self::Paused(PauseReason::Breakpoint(pc)) => write!(f, "paused at breakpoint {pc:#x}"),
            Self::Paused(PauseReason::StepLimit) => write!(f, "paused at the step limit"),
            Self::Stopped(StopReason::Exit(code)) => write!(f, "exited with code {code}"),
            Self::Stopped(StopReason::Cliff) => write!(f, "dropped off the end of the program"),
            Self::Stopped(StopReason::Exception(exception)) => write!(f, "stopped: {exception}"),
            Self::Stopped(StopReason::User) => write!(f, "stopped"),
        }
    }
}

/// Event published by the simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulatorNotice {
    /// The state changed to the carried value.
    StateChanged(SimState),
    /// An instruction executed.
    Stepped {
        /// Address it was fetched from.
        pc: u64,
        /// Its mnemonic.
        mnemonic: &'static str,
    },
    /// Registers, memory and counters were restored to their initial values.
    Reset,
    /// An instruction was undone; execution resumes at `pc`.
    BackStepped {
        /// Address of the undone instruction.
        pc: u64,
    },
}

/// A program image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Little-endian code, loaded at `memory.text_base`.
    pub text: Vec<u8>,
    /// Initialized data, loaded at `memory.data_base`.
    pub data: Vec<u8>,
}

impl Program {
    /// A data-less program from 32-bit instruction words.
    pub fn from_words(words: &[u32]) -> Self {
        Self {
            text: words.iter().flat_map(|word| word.to_le_bytes()).collect(),
            data: Vec::new(),
        }
    }

    /// Attaches initialized data.
    #[must_use]
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }
}

/// Outcome of executing one instruction.
enum Outcome {
    /// Execution may continue.
    Continue,
    /// Execution must halt in the carried state.
    Halt(SimState),
}

/// Single-hart execution engine.
#[derive(Debug)]
pub struct Simulator {
    machine: Machine,
    instructions: InstructionSet,
    text: Range<u64>,
    breakpoints: BTreeSet<u64>,
    state: SimState,
    initial_memory: Memory,
    notices: Publisher<SimulatorNotice>,
}

impl Simulator {
    /// Creates a simulator with an empty program.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        let instructions = InstructionSet::new(config)?;
        let base = config.memory.text_base;
        info!(
            xlen = config.general.xlen.bits(),
            instructions = instructions.basic_instructions().len(),
            "simulator created"
        );
        Ok(Self {
            machine: Machine::new(config),
            instructions,
            text: base..base,
            breakpoints: BTreeSet::new(),
            state: SimState::Ready,
            initial_memory: Memory::new(),
            notices: Publisher::new(),
        })
    }

    /// Loads `program`, replacing memory and resetting all state.
    ///
    /// The text must end before the data segment when the data segment lies
    /// above it.
    pub fn load_program(&mut self, program: &Program) -> Result<(), SimError> {
        self.ensure_not_running("load a program")?;
        let memory = &self.machine.config().memory;
        let (text_base, data_base) = (memory.text_base, memory.data_base);
        let end = text_base.checked_add(program.text.len() as u64);
        let fits = match end {
            Some(end) => data_base <= text_base || end <= data_base || program.data.is_empty(),
            None => false,
        };
        let Some(end) = end.filter(|_| fits) else {
            return Err(SimError::ProgramTooLarge {
                base: text_base,
                size: program.text.len(),
            });
        };

        let image = self.machine.memory_mut();
        image.clear();
        image.load(text_base, &program.text);
        image.load(data_base, &program.data);
        self.initial_memory = image.clone();
        self.text = text_base..end;
        self.machine.reset();
        debug!(
            text = program.text.len(),
            data = program.data.len(),
            base = text_base,
            "program loaded"
        );
        self.transition(SimState::Ready);
        Ok(())
    }

    /// Executes one instruction, ignoring breakpoints.
    pub fn step(&mut self) -> Result<SimState, SimError> {
        self.ensure_runnable("step")?;
        let next = match self.execute_one() {
            Outcome::Continue => SimState::Paused(PauseReason::Step),
            Outcome::Halt(state) => state,
        };
        self.transition(next);
        Ok(self.state.clone())
    }

    /// Runs until the program stops, a breakpoint is reached, or `max_steps`
    /// instructions have executed (falling back to `execution.max_steps`).
    ///
    /// The instruction at the starting PC runs even if it carries a breakpoint,
    /// so `run` resumes from the breakpoint it paused on.
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<SimState, SimError> {
        self.begin_run()?;
        let budget = max_steps.or(self.machine.config().execution.max_steps);
        let mut executed = 0_u64;
        loop {
            if budget.is_some_and(|limit| executed >= limit) {
                self.transition(SimState::Paused(PauseReason::StepLimit));
                break;
            }
            if let Some(state) = self.run_one(executed == 0) {
                self.transition(state);
                break;
            }
            executed += 1;
        }
        Ok(self.state.clone())
    }

    /// Suspends execution.
    pub fn pause(&mut self) -> Result<(), SimError> {
        if self.state.is_stopped() {
            return Err(self.invalid("pause"));
        }
        self.transition(SimState::Paused(PauseReason::User));
        Ok(())
    }

    /// Ends execution; only `reset` and `backstep` apply afterwards.
    pub fn stop(&mut self) {
        if !self.state.is_stopped() {
            self.transition(SimState::Stopped(StopReason::User));
        }
    }

    /// Restores registers, memory, counters and the PC to their values right
    /// after the program was loaded. Breakpoints are kept.
    pub fn reset(&mut self) {
        self.machine.reset();
        *self.machine.memory_mut() = self.initial_memory.clone();
        self.notices.publish(&SimulatorNotice::Reset);
        self.transition(SimState::Ready);
    }

    /// Undoes the most recent instruction and returns its address.
    pub fn backstep(&mut self) -> Result<u64, SimError> {
        self.ensure_not_running("step back")?;
        let pc = self.machine.backstep().ok_or(SimError::NothingToUndo)?;
        debug!(pc, depth = self.machine.undo_depth(), "stepped back");
        self.notices.publish(&SimulatorNotice::BackStepped { pc });
        let next = if self.machine.undo_depth() == 0 && self.machine.retired() == 0 {
            SimState::Ready
        } else {
            SimState::Paused(PauseReason::User)
        };
        self.transition(next);
        Ok(pc)
    }

    /// Debugger edit of a register by name, between instructions. Listeners
    /// see it; backstep does not undo it. Returns the previous value.
    pub fn set_register(&mut self, name: &str, value: u64) -> Result<u64, SimError> {
        self.ensure_not_running("edit a register")?;
        Ok(self.machine.set_register(name, value)?)
    }

    /// Pauses `run` before the instruction at `address` executes.
    pub fn set_breakpoint(&mut self, address: u64) -> bool {
        self.breakpoints.insert(address)
    }

    /// Removes a breakpoint. Returns false if none was set at `address`.
    pub fn clear_breakpoint(&mut self, address: u64) -> bool {
        self.breakpoints.remove(&address)
    }

    /// Breakpoint addresses in ascending order.
    pub fn breakpoints(&self) -> impl Iterator<Item = u64> + '_ {
        self.breakpoints.iter().copied()
    }

    /// Current state.
    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Subscribes to simulator notices. Grant credit with
    /// [`Subscription::request`] to receive them.
    pub fn subscribe(&self) -> Subscription<SimulatorNotice> {
        self.notices.subscribe()
    }

    /// The hart.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// The hart, mutably; for loaders, debuggers and tests.
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// The decoder.
    pub fn instructions(&self) -> &InstructionSet {
        &self.instructions
    }

    /// Address range of the loaded text.
    pub fn text(&self) -> Range<u64> {
        self.text.clone()
    }

    /// Enters `Running`. Used by `run` and by the execution thread.
    pub(crate) fn begin_run(&mut self) -> Result<(), SimError> {
        self.ensure_runnable("run")?;
        self.transition(SimState::Running);
        Ok(())
    }

    /// Executes one instruction of a run. Returns the state to halt in, if
    /// any. `first` suppresses the breakpoint check at the resume address.
    pub(crate) fn run_one(&mut self, first: bool) -> Option<SimState> {
        let pc = self.machine.pc();
        if !first && self.breakpoints.contains(&pc) {
            debug!(pc, "breakpoint reached");
            return Some(SimState::Paused(PauseReason::Breakpoint(pc)));
        }
        match self.execute_one() {
            Outcome::Continue => None,
            Outcome::Halt(state) => Some(state),
        }
    }

    /// Moves to `state` and publishes the change.
    pub(crate) fn transition(&mut self, state: SimState) {
        if self.state == state {
            return;
        }
        debug!(from = %self.state, to = %state, "state changed");
        self.state = state.clone();
        self.notices.publish(&SimulatorNotice::StateChanged(state));
    }

    fn execute_one(&mut self) -> Outcome {
        let pc = self.machine.pc();
        if pc == self.text.end {
            return Outcome::Halt(SimState::Stopped(StopReason::Cliff));
        }

        self.machine.begin_step(pc);
        let (word, length) = match self.fetch(pc) {
            Ok(fetched) => fetched,
            Err(trap) => return self.raise(trap, pc, None),
        };
        let Some(instruction) = self.instructions.find_by_binary_code(word) else {
            return self.raise(Trap::IllegalInstruction(word), pc, None);
        };
        let (mnemonic, execute) = (instruction.mnemonic, instruction.execute);

        if self.machine.config().general.trace_instructions {
            trace!(pc, word, mnemonic, "execute");
        }
        self.machine.set_instruction_length(length);
        self.machine.set_pc(pc.wrapping_add(length));
        if let Err(trap) = execute(&mut self.machine, word) {
            return self.raise(trap, pc, Some(mnemonic));
        }

        self.machine.commit_step(true);
        if !self.notices.is_idle() {
            self.notices
                .publish(&SimulatorNotice::Stepped { pc, mnemonic });
        }
        match self.machine.take_exit() {
            Some(code) => {
                info!(code, retired = self.machine.retired(), "program exited");
                Outcome::Halt(SimState::Stopped(StopReason::Exit(code)))
            }
            None => Outcome::Continue,
        }
    }

    /// Reads the instruction at `pc`, expanding compressed parcels.
    fn fetch(&self, pc: u64) -> Result<(u32, u64), Trap> {
        let extensions = &self.machine.config().general.extensions;
        let alignment = if extensions.c { 2 } else { 4 };
        if pc % alignment != 0 {
            return Err(Trap::InstructionAddressMisaligned(pc));
        }
        if !self.text.contains(&pc) {
            return Err(Trap::InstructionAccessFault(pc));
        }
        let memory = self.machine.memory();
        let parcel = memory.read_u16(pc);
        if rvc::is_compressed(parcel) {
            if !extensions.c {
                return Err(Trap::IllegalInstruction(memory.read_u32(pc)));
            }
            return rvc::expand(parcel, self.machine.xlen(), extensions)
                .map(|word| (word, 2))
                .ok_or(Trap::IllegalInstruction(u32::from(parcel)));
        }
        Ok((memory.read_u32(pc), 4))
    }

    /// Closes the step of a trapping instruction and decides how to continue.
    fn raise(&mut self, trap: Trap, pc: u64, mnemonic: Option<&'static str>) -> Outcome {
        if self.machine.deliver_trap(&trap, pc) {
            self.machine.commit_step(false);
            return Outcome::Continue;
        }
        if let Trap::Breakpoint(at) = trap {
            self.machine.commit_step(true);
            debug!(pc = at, "ebreak");
            return Outcome::Halt(SimState::Paused(PauseReason::Breakpoint(at)));
        }
        self.machine.set_pc(pc);
        self.machine.commit_step(false);
        let exception = SimulationException { trap, pc, mnemonic };
        info!(%exception, "simulation stopped by exception");
        Outcome::Halt(SimState::Stopped(StopReason::Exception(exception)))
    }

    fn ensure_runnable(&self, operation: &'static str) -> Result<(), SimError> {
        if self.state.is_stopped() || self.state == SimState::Running {
            return Err(self.invalid(operation));
        }
        Ok(())
    }

    fn ensure_not_running(&self, operation: &'static str) -> Result<(), SimError> {
        if self.state == SimState::Running {
            return Err(self.invalid(operation));
        }
        Ok(())
    }

    fn invalid(&self, operation: &'static str) -> SimError {
        SimError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }
}
