//! Execution thread.
//!
//! A [`SimulationRunner`] moves a [`Simulator`] onto its own thread and drives
//! it from [`RunnerCommand`]s sent over a channel. While a run is in progress
//! the thread reads no commands; [`SimulationRunner::pause`] and
//! [`SimulationRunner::stop`] raise atomic flags that the loop polls between
//! instructions instead.
//!
//! The simulator sits behind one mutex that guards memory and registers
//! together. The thread holds it for a single instruction at a time, so other
//! threads can inspect state between instructions of a long run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use super::simulator::{PauseReason, SimState, Simulator, SimulatorNotice, StopReason};
use crate::common::SimError;
use crate::notice::Subscription;

/// Sending half of the command channel.
pub type RunnerCommandSender = Sender<RunnerCommand>;

/// Command for the execution thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerCommand {
    /// Run with an optional step budget.
    Run(Option<u64>),
    /// Execute one instruction.
    Step,
    /// Suspend. Only observed between runs; use [`SimulationRunner::pause`]
    /// to interrupt one.
    Pause,
    /// End execution.
    Stop,
    /// Restore the loaded program's initial state.
    Reset,
    /// Undo the most recent instruction.
    Backstep,
    /// Exit the thread.
    Quit,
}

#[derive(Debug, Default)]
struct Control {
    pause: AtomicBool,
    stop: AtomicBool,
}

/// Owner of the execution thread.
#[derive(Debug)]
pub struct SimulationRunner {
    simulator: Arc<Mutex<Simulator>>,
    commands: RunnerCommandSender,
    control: Arc<Control>,
    thread: Option<JoinHandle<()>>,
}

impl SimulationRunner {
    /// Starts the execution thread. The simulator waits for commands.
    pub fn spawn(simulator: Simulator) -> Self {
        let simulator = Arc::new(Mutex::new(simulator));
        let control = Arc::new(Control::default());
        let (commands, receiver) = crossbeam_channel::unbounded();
        let thread = {
            let simulator = Arc::clone(&simulator);
            let control = Arc::clone(&control);
            thread::spawn(move || serve(&simulator, &control, &receiver))
        };
        Self {
            simulator,
            commands,
            control,
            thread: Some(thread),
        }
    }

    /// Queues a command.
    pub fn send(&self, command: RunnerCommand) -> Result<(), SimError> {
        if matches!(command, RunnerCommand::Run(_) | RunnerCommand::Step) {
            self.control.pause.store(false, Ordering::SeqCst);
            self.control.stop.store(false, Ordering::SeqCst);
        }
        self.commands
            .send(command)
            .map_err(|_| SimError::Disconnected)
    }

    /// Interrupts the current run after the executing instruction.
    pub fn pause(&self) {
        self.control.pause.store(true, Ordering::SeqCst);
    }

    /// Ends the current run after the executing instruction and stops the
    /// simulator.
    pub fn stop(&self) -> Result<(), SimError> {
        self.control.stop.store(true, Ordering::SeqCst);
        self.commands
            .send(RunnerCommand::Stop)
            .map_err(|_| SimError::Disconnected)
    }

    /// Locks the simulator for inspection or editing.
    pub fn simulator(&self) -> MutexGuard<'_, Simulator> {
        lock(&self.simulator)
    }

    /// Subscribes to the simulator's notices.
    pub fn subscribe(&self) -> Subscription<SimulatorNotice> {
        self.simulator().subscribe()
    }

    /// Stops the thread and waits for it to exit.
    pub fn join(mut self) -> Result<(), SimError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), SimError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        self.control.stop.store(true, Ordering::SeqCst);
        let _ = self.commands.send(RunnerCommand::Quit);
        thread.join().map_err(|_| SimError::Disconnected)
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn lock(simulator: &Mutex<Simulator>) -> MutexGuard<'_, Simulator> {
    simulator.lock().unwrap_or_else(PoisonError::into_inner)
}

fn serve(simulator: &Mutex<Simulator>, control: &Control, commands: &Receiver<RunnerCommand>) {
    debug!("execution thread started");
    for command in commands {
        let result = match command {
            RunnerCommand::Run(budget) => run(simulator, control, budget),
            RunnerCommand::Step => lock(simulator).step().map(|_| ()),
            RunnerCommand::Pause => lock(simulator).pause(),
            RunnerCommand::Stop => {
                lock(simulator).stop();
                Ok(())
            }
            RunnerCommand::Reset => {
                lock(simulator).reset();
                Ok(())
            }
            RunnerCommand::Backstep => lock(simulator).backstep().map(|_| ()),
            RunnerCommand::Quit => break,
        };
        if let Err(err) = result {
            warn!(?command, %err, "command rejected");
        }
    }
    debug!("execution thread exiting");
}

/// The run loop: one lock acquisition per instruction.
fn run(simulator: &Mutex<Simulator>, control: &Control, budget: Option<u64>) -> Result<(), SimError> {
    let budget = {
        let mut guard = lock(simulator);
        guard.begin_run()?;
        budget.or(guard.machine().config().execution.max_steps)
    };
    let mut executed = 0_u64;
    loop {
        let mut guard = lock(simulator);
        if control.stop.swap(false, Ordering::SeqCst) {
            guard.transition(SimState::Stopped(StopReason::User));
            return Ok(());
        }
        if control.pause.swap(false, Ordering::SeqCst) {
            guard.transition(SimState::Paused(PauseReason::User));
            return Ok(());
        }
        if budget.is_some_and(|limit| executed >= limit) {
            guard.transition(SimState::Paused(PauseReason::StepLimit));
            return Ok(());
        }
        if let Some(state) = guard.run_one(executed == 0) {
            guard.transition(state);
            return Ok(());
        }
        executed += 1;
    }
}
