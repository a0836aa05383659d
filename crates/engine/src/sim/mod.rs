//! Program execution.
//!
//! 1. **Simulator:** the fetch/decode/execute loop and its state machine.
//! 2. **Runner:** a thread that owns a simulator and takes commands.

/// Execution thread and command channel.
pub mod runner;

/// Execution loop, states and notices.
pub mod simulator;

pub use self::runner::{RunnerCommand, SimulationRunner};
pub use self::simulator::{
    PauseReason, Program, SimState, Simulator, SimulatorNotice, StopReason,
};
