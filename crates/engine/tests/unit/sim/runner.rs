use std::time::Duration;

use pretty_assertions::assert_eq;
use rvisa_engine::config::Config;
use rvisa_engine::notice::Subscription;
use rvisa_engine::sim::{
    PauseReason, Program, RunnerCommand, SimState, SimulationRunner, Simulator, SimulatorNotice,
    StopReason,
};

use crate::common::asm::*;
use crate::common::harness::{TEXT, init_tracing};

const TIMEOUT: Duration = Duration::from_secs(10);

fn runner(words: &[u32]) -> SimulationRunner {
    init_tracing();
    let mut sim = Simulator::new(&Config::default()).unwrap();
    sim.load_program(&Program::from_words(words)).unwrap();
    SimulationRunner::spawn(sim)
}

/// Waits for the state change that satisfies `done`.
fn wait_for(
    notices: &Subscription<SimulatorNotice>,
    done: impl Fn(&SimState) -> bool,
) -> SimState {
    loop {
        match notices.recv_timeout(TIMEOUT) {
            Some(SimulatorNotice::StateChanged(state)) if done(&state) => return state,
            Some(_) => {}
            None => panic!("no matching state change within {TIMEOUT:?}"),
        }
    }
}

#[test]
fn runs_a_program_to_completion() {
    let runner = runner(&[addi(10, 0, 4), addi(17, 0, 93), ecall()]);
    let notices = runner.subscribe();
    notices.request(u64::MAX);

    runner.send(RunnerCommand::Run(None)).unwrap();
    let state = wait_for(&notices, SimState::is_stopped);
    assert_eq!(state, SimState::Stopped(StopReason::Exit(4)));

    let sim = runner.simulator();
    assert_eq!(sim.machine().x(10), 4);
    assert_eq!(sim.machine().retired(), 3);
    drop(sim);
    runner.join().unwrap();
}

#[test]
fn pause_interrupts_a_run() {
    let runner = runner(&[addi(5, 5, 1), jal(0, -4)]);
    let notices = runner.subscribe();
    notices.request(u64::MAX);

    runner.send(RunnerCommand::Run(None)).unwrap();
    let _ = wait_for(&notices, |state| *state == SimState::Running);
    runner.pause();
    let state = wait_for(&notices, |state| matches!(state, SimState::Paused(_)));
    assert_eq!(state, SimState::Paused(PauseReason::User));
    assert!(runner.simulator().machine().retired() > 0);

    runner.stop().unwrap();
    let state = wait_for(&notices, SimState::is_stopped);
    assert_eq!(state, SimState::Stopped(StopReason::User));
    runner.join().unwrap();
}

#[test]
fn stop_ends_a_run() {
    let runner = runner(&[jal(0, 0)]);
    let notices = runner.subscribe();
    notices.request(u64::MAX);

    runner.send(RunnerCommand::Run(None)).unwrap();
    let _ = wait_for(&notices, |state| *state == SimState::Running);
    runner.stop().unwrap();
    let state = wait_for(&notices, SimState::is_stopped);
    assert_eq!(state, SimState::Stopped(StopReason::User));
}

#[test]
fn commands_are_applied_in_order() {
    let runner = runner(&[addi(5, 0, 1), addi(6, 0, 2), addi(7, 0, 3)]);
    let notices = runner.subscribe();
    notices.request(u64::MAX);

    for command in [
        RunnerCommand::Step,
        RunnerCommand::Step,
        RunnerCommand::Backstep,
        RunnerCommand::Run(Some(1)),
    ] {
        runner.send(command).unwrap();
    }
    let state = wait_for(&notices, |state| {
        *state == SimState::Paused(PauseReason::StepLimit)
    });
    assert_eq!(state, SimState::Paused(PauseReason::StepLimit));
    {
        let sim = runner.simulator();
        assert_eq!(sim.machine().pc(), TEXT + 8);
        assert_eq!(sim.machine().x(6), 2);
    }

    runner.send(RunnerCommand::Reset).unwrap();
    let _ = wait_for(&notices, |state| *state == SimState::Ready);
    assert_eq!(runner.simulator().machine().x(5), 0);
    runner.join().unwrap();
}

#[test]
fn the_simulator_can_be_edited_between_runs() {
    let runner = runner(&[addi(10, 10, 1), addi(17, 0, 93), ecall()]);
    let notices = runner.subscribe();
    notices.request(u64::MAX);
    runner.simulator().machine_mut().set_x(10, 41);

    runner.send(RunnerCommand::Run(None)).unwrap();
    let state = wait_for(&notices, SimState::is_stopped);
    assert_eq!(state, SimState::Stopped(StopReason::Exit(42)));
}

#[test]
fn dropping_the_runner_shuts_the_thread_down() {
    let runner = runner(&[jal(0, 0)]);
    runner.send(RunnerCommand::Run(None)).unwrap();
    drop(runner);
}
