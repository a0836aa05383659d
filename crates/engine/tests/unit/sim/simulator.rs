use pretty_assertions::assert_eq;
use rvisa_engine::common::{RegisterError, SimError, Trap};
use rvisa_engine::config::Config;
use rvisa_engine::sim::{
    PauseReason, Program, SimState, Simulator, SimulatorNotice, StopReason,
};

use crate::common::asm::*;
use crate::common::harness::{DATA, TEXT, TestContext};

fn counter(count: usize) -> Vec<u32> {
    (0..count).map(|_| addi(5, 5, 1)).collect()
}

#[test]
fn a_loaded_program_is_ready() {
    let ctx = TestContext::new().load_program(&counter(2));
    assert_eq!(ctx.sim.state(), &SimState::Ready);
    assert_eq!(ctx.sim.text(), TEXT..TEXT + 8);
    assert_eq!(ctx.pc(), TEXT);
}

#[test]
fn states_display_their_reason() {
    assert_eq!(SimState::Ready.to_string(), "ready");
    assert_eq!(
        SimState::Paused(PauseReason::Breakpoint(0x40_0008)).to_string(),
        "paused at breakpoint 0x400008"
    );
    assert_eq!(SimState::Stopped(StopReason::Exit(3)).to_string(), "exited with code 3");
    assert!(SimState::Stopped(StopReason::Cliff).is_stopped());
    assert!(!SimState::Paused(PauseReason::User).is_stopped());
}

#[test]
fn an_empty_program_drops_off_immediately() {
    let mut ctx = TestContext::new().load_program(&[]);
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Cliff));
    assert_eq!(ctx.machine().retired(), 0);
}

#[test]
fn run_pauses_at_breakpoints_and_resumes_past_them() {
    let mut ctx = TestContext::new().load_program(&counter(4));
    assert!(ctx.sim.set_breakpoint(TEXT + 8));
    assert!(!ctx.sim.set_breakpoint(TEXT + 8));
    assert!(ctx.sim.set_breakpoint(TEXT + 12));
    assert_eq!(ctx.sim.breakpoints().collect::<Vec<_>>(), vec![TEXT + 8, TEXT + 12]);

    assert_eq!(ctx.run(), SimState::Paused(PauseReason::Breakpoint(TEXT + 8)));
    assert_eq!(ctx.x(5), 2);
    assert_eq!(ctx.run(), SimState::Paused(PauseReason::Breakpoint(TEXT + 12)));
    assert_eq!(ctx.x(5), 3);

    assert!(ctx.sim.clear_breakpoint(TEXT + 12));
    assert!(!ctx.sim.clear_breakpoint(TEXT + 12));
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Cliff));
    assert_eq!(ctx.x(5), 4);
}

#[test]
fn step_ignores_breakpoints() {
    let mut ctx = TestContext::new().load_program(&counter(2));
    let _ = ctx.sim.set_breakpoint(TEXT);
    let _ = ctx.sim.set_breakpoint(TEXT + 4);
    assert_eq!(ctx.steps(2), SimState::Paused(PauseReason::Step));
    assert_eq!(ctx.x(5), 2);
}

#[test]
fn run_respects_the_step_budget() {
    let mut ctx = TestContext::new().load_program(&[addi(5, 5, 1), jal(0, -4)]);
    assert_eq!(
        ctx.sim.run(Some(10)).unwrap(),
        SimState::Paused(PauseReason::StepLimit)
    );
    assert_eq!(ctx.machine().retired(), 10);
    assert_eq!(ctx.x(5), 5);
}

#[test]
fn the_configured_budget_applies_without_an_argument() {
    let mut config = Config::default();
    config.execution.max_steps = Some(7);
    let mut ctx = TestContext::with_config(config).load_program(&[jal(0, 0)]);
    assert_eq!(ctx.sim.run(None).unwrap(), SimState::Paused(PauseReason::StepLimit));
    assert_eq!(ctx.machine().retired(), 7);
}

#[test]
fn a_stopped_simulator_rejects_execution() {
    let mut ctx = TestContext::new().load_program(&counter(1));
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Cliff));

    assert!(matches!(ctx.sim.step(), Err(SimError::InvalidState { operation: "step", .. })));
    assert!(matches!(ctx.sim.run(None), Err(SimError::InvalidState { .. })));
    assert!(matches!(ctx.sim.pause(), Err(SimError::InvalidState { .. })));

    ctx.sim.reset();
    assert_eq!(ctx.sim.state(), &SimState::Ready);
    assert_eq!(ctx.x(5), 0);
    assert_eq!(ctx.step(), SimState::Paused(PauseReason::Step));
}

#[test]
fn pause_and_stop() {
    let mut ctx = TestContext::new().load_program(&counter(3));
    ctx.sim.pause().unwrap();
    assert_eq!(ctx.sim.state(), &SimState::Paused(PauseReason::User));
    assert_eq!(ctx.step(), SimState::Paused(PauseReason::Step));

    ctx.sim.stop();
    assert_eq!(ctx.sim.state(), &SimState::Stopped(StopReason::User));
    let err = ctx.sim.step().unwrap_err();
    assert_eq!(err.to_string(), "cannot step while stopped");
}

#[test]
fn stop_keeps_an_earlier_reason() {
    let mut ctx = TestContext::new().load_program(&[addi(17, 0, 10), ecall()]);
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Exit(0)));
    ctx.sim.stop();
    assert_eq!(ctx.sim.state(), &SimState::Stopped(StopReason::Exit(0)));
}

#[test]
fn exceptions_report_the_instruction() {
    let mut ctx = TestContext::new().load_program(&[addi(5, 0, 1), sw(5, 0, 1)]);
    let SimState::Stopped(StopReason::Exception(exception)) = ctx.run() else {
        panic!("expected an exception");
    };
    assert_eq!(exception.trap, Trap::StoreAddressMisaligned(1));
    assert_eq!(exception.pc, TEXT + 4);
    assert_eq!(exception.mnemonic, Some("sw"));
    assert_eq!(
        exception.to_string(),
        "StoreAddressMisaligned(0x1) at pc 0x400004 (sw)"
    );
}

#[test]
fn trap_stops_convert_to_errors() {
    let mut ctx = TestContext::new().load_program(&[addi(5, 0, 1), sw(5, 0, 1)]);
    let error = ctx.run().into_result().unwrap_err();
    let SimError::Exception(exception) = &error else {
        panic!("expected an exception error, got {error:?}");
    };
    assert_eq!(exception.trap, Trap::StoreAddressMisaligned(1));
    assert_eq!(error.to_string(), "StoreAddressMisaligned(0x1) at pc 0x400004 (sw)");

    let exit = SimState::Stopped(StopReason::Exit(0));
    assert_eq!(exit.clone().into_result(), Ok(exit));
}

#[test]
fn registers_can_be_edited_between_instructions() {
    let mut ctx = TestContext::new().load_program(&counter(2));
    let _ = ctx.step();
    assert_eq!(ctx.sim.set_register("t0", 40), Ok(1));
    let _ = ctx.step();
    assert_eq!(ctx.x(5), 41);
    assert_eq!(
        ctx.sim.set_register("cycle", 0),
        Err(SimError::Register(RegisterError::ReadOnly("cycle")))
    );
    assert!(matches!(
        ctx.sim.set_register("q9", 0),
        Err(SimError::Register(RegisterError::Unknown(_)))
    ));
}

#[test]
fn text_may_not_run_into_initialized_data() {
    let mut config = Config::default();
    config.memory.data_base = TEXT + 8;
    let mut sim = Simulator::new(&config).unwrap();

    let crowded = Program::from_words(&counter(3)).with_data(vec![1]);
    assert_eq!(
        sim.load_program(&crowded),
        Err(SimError::ProgramTooLarge { base: TEXT, size: 12 })
    );
    assert!(sim.load_program(&Program::from_words(&counter(3))).is_ok());
    assert!(sim.load_program(&Program::from_words(&counter(2)).with_data(vec![1])).is_ok());
}

#[test]
fn reset_restores_the_loaded_image() {
    let mut ctx = TestContext::new().load_with_data(
        &[lui(10, 0x10010), addi(5, 0, 9), sw(5, 10, 0), addi(17, 0, 10), ecall()],
        &[1, 2, 3, 4],
    );
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Exit(0)));
    assert_eq!(ctx.machine().memory().read_u32(DATA), 9);

    ctx.sim.reset();
    assert_eq!(ctx.machine().memory().read_u32(DATA), 0x0403_0201);
    assert_eq!(ctx.pc(), TEXT);
    assert_eq!(ctx.machine().cycles(), 0);
    assert_eq!(ctx.x(17), 0);
}

#[test]
fn notices_follow_execution() {
    let mut ctx = TestContext::new().load_program(&counter(2));
    let notices = ctx.sim.subscribe();
    notices.request(16);

    let _ = ctx.steps(2);
    ctx.sim.reset();

    assert_eq!(
        notices.drain(),
        vec![
            SimulatorNotice::Stepped { pc: TEXT, mnemonic: "addi" },
            SimulatorNotice::StateChanged(SimState::Paused(PauseReason::Step)),
            SimulatorNotice::Stepped { pc: TEXT + 4, mnemonic: "addi" },
            SimulatorNotice::Reset,
            SimulatorNotice::StateChanged(SimState::Ready),
        ]
    );
}

#[test]
fn cancelled_subscriptions_receive_nothing() {
    let mut ctx = TestContext::new().load_program(&counter(2));
    let notices = ctx.sim.subscribe();
    notices.request(16);
    notices.cancel();
    assert!(notices.is_cancelled());

    let _ = ctx.run();
    assert!(notices.try_recv().is_none());
}
