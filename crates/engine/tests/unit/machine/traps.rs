use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use rvisa_engine::common::Trap;
use rvisa_engine::config::Config;
use rvisa_engine::machine::{EcallHandler, Machine};
use rvisa_engine::registers::csr::{
    UCAUSE, UEPC, USTATUS, USTATUS_UIE, USTATUS_UPIE, UTVAL, UTVEC,
};
use rvisa_engine::sim::{PauseReason, SimState, StopReason};

use crate::common::asm::*;
use crate::common::harness::{TEXT, TestContext};

const A0: u32 = 10;
const A7: u32 = 17;

fn exception_trap(state: &SimState) -> Option<&Trap> {
    match state {
        SimState::Stopped(StopReason::Exception(exception)) => Some(&exception.trap),
        _ => None,
    }
}

/// Installs a handler at `TEXT + 32` that records `ucause`, `utval` and
/// `uepc` in x12, x14 and x13, then resumes after the faulting instruction.
fn with_handler(faulting: u32) -> Vec<u32> {
    vec![
        lui(6, 0x00400),
        addi(6, 6, 32),
        csrrw(0, UTVEC, 6),
        csrrsi(0, USTATUS, 1),
        faulting,
        addi(11, 0, 7),
        jal(0, 32),
        addi(0, 0, 0),
        // handler
        csrrs(12, UCAUSE, 0),
        csrrs(14, UTVAL, 0),
        csrrs(13, UEPC, 0),
        addi(13, 13, 4),
        csrrw(0, UEPC, 13),
        uret(),
    ]
}

#[test]
fn traps_are_delivered_to_utvec_and_uret_resumes() {
    let mut ctx = TestContext::new().load_program(&with_handler(lw(5, 0, 2)));
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Cliff));
    assert_eq!(ctx.x(12), 4);
    assert_eq!(ctx.x(14), 2);
    assert_eq!(ctx.x(13), TEXT + 20);
    assert_eq!(ctx.x(11), 7);
    assert_eq!(ctx.x(5), 0);
    assert_eq!(
        ctx.machine().csr(USTATUS),
        Some(USTATUS_UIE | USTATUS_UPIE)
    );
}

#[test]
fn illegal_instructions_can_be_handled() {
    let mut ctx = TestContext::new().load_program(&with_handler(0xFFFF_FFFF));
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Cliff));
    assert_eq!(ctx.x(12), 2);
    assert_eq!(ctx.x(14) as u32, 0xFFFF_FFFF);
}

#[test]
fn traps_stop_the_program_when_interrupts_are_disabled() {
    let mut program = with_handler(lw(5, 0, 2));
    program[3] = addi(0, 0, 0);
    let mut ctx = TestContext::new().load_program(&program);
    let state = ctx.run();
    assert_eq!(exception_trap(&state), Some(&Trap::LoadAddressMisaligned(2)));
    assert_eq!(ctx.pc(), TEXT + 16);
}

#[test]
fn traps_stop_the_program_when_handling_is_off() {
    let mut config = Config::default();
    config.execution.trap_handling = false;
    let mut ctx = TestContext::with_config(config).load_program(&with_handler(lw(5, 0, 2)));
    let state = ctx.run();
    assert_eq!(exception_trap(&state), Some(&Trap::LoadAddressMisaligned(2)));
}

#[test]
fn delivery_updates_the_trap_csrs() {
    let mut machine = Machine::new(&Config::default());
    let _ = machine.set_csr(UTVEC, TEXT + 0x101).unwrap();
    let _ = machine.set_csr(USTATUS, USTATUS_UIE).unwrap();

    assert!(machine.deliver_trap(&Trap::IllegalInstruction(0xDEAD), TEXT + 8));
    assert_eq!(machine.pc(), TEXT + 0x100);
    assert_eq!(machine.csr(UCAUSE), Some(2));
    assert_eq!(machine.csr(UTVAL), Some(0xDEAD));
    assert_eq!(machine.csr(UEPC), Some(TEXT + 8));
    assert_eq!(machine.csr(USTATUS), Some(USTATUS_UPIE));

    // Nested traps are not taken while UIE is clear.
    assert!(!machine.deliver_trap(&Trap::Breakpoint(TEXT), TEXT));

    machine.trap_return();
    assert_eq!(machine.pc(), TEXT + 8);
    assert_eq!(machine.csr(USTATUS), Some(USTATUS_UIE | USTATUS_UPIE));
}

#[test]
fn zero_utvec_disables_delivery() {
    let mut machine = Machine::new(&Config::default());
    let _ = machine.set_csr(USTATUS, USTATUS_UIE).unwrap();
    assert!(!machine.deliver_trap(&Trap::EnvironmentCallFromUMode, TEXT));
    assert_eq!(machine.csr(UCAUSE), Some(0));
}

#[test]
fn trap_causes_and_values() {
    assert_eq!(Trap::InstructionAddressMisaligned(6).cause(), 0);
    assert_eq!(Trap::Breakpoint(4).value(), 4);
    assert_eq!(Trap::StoreAccessFault(9).cause(), 7);
    assert_eq!(Trap::EnvironmentCallFromUMode.cause(), 8);
    assert_eq!(Trap::EnvironmentCallFromUMode.value(), 0);
    assert_eq!(Trap::IllegalInstruction(0x13).to_string(), "IllegalInstruction(0x00000013)");
}

#[test]
fn exit_service() {
    let mut ctx = TestContext::new().load_program(&[
        addi(A7, 0, 10),
        ecall(),
        addi(5, 0, 1),
    ]);
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Exit(0)));
    assert_eq!(ctx.x(5), 0);
    assert_eq!(ctx.machine().retired(), 2);
}

#[test]
fn exit_with_code_service() {
    let mut ctx = TestContext::new().load_program(&[
        addi(A0, 0, -3),
        addi(A7, 0, 93),
        ecall(),
    ]);
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Exit(-3)));
}

#[test]
fn unknown_service_without_a_handler_is_an_exception() {
    let mut ctx = TestContext::new().load_program(&[addi(A7, 0, 1), ecall()]);
    let state = ctx.run();
    assert_eq!(exception_trap(&state), Some(&Trap::EnvironmentCallFromUMode));
    assert_eq!(ctx.pc(), TEXT + 4);
}

struct Doubler {
    seen: Arc<Mutex<Vec<u64>>>,
}

impl EcallHandler for Doubler {
    fn handle(&mut self, service: u64, machine: &mut Machine) -> Result<bool, Trap> {
        self.seen.lock().unwrap().push(service);
        match service {
            1 => {
                let value = machine.x(A0 as usize);
                machine.set_x(A0 as usize, value * 2);
                Ok(true)
            }
            2 => Err(Trap::StoreAccessFault(0)),
            _ => Ok(false),
        }
    }
}

#[test]
fn installed_handler_serves_other_services() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut ctx = TestContext::new().load_program(&[
        addi(A7, 0, 1),
        addi(A0, 0, 21),
        ecall(),
        addi(A7, 0, 5),
        ecall(),
    ]);
    ctx.machine_mut().set_ecall_handler(Box::new(Doubler {
        seen: Arc::clone(&seen),
    }));

    let state = ctx.run();
    assert_eq!(ctx.x(A0), 42);
    assert_eq!(exception_trap(&state), Some(&Trap::EnvironmentCallFromUMode));
    assert_eq!(*seen.lock().unwrap(), vec![1, 5]);
    assert!(ctx.machine_mut().take_ecall_handler().is_some());
}

#[test]
fn handler_traps_propagate() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut ctx = TestContext::new().load_program(&[addi(A7, 0, 2), ecall()]);
    ctx.machine_mut()
        .set_ecall_handler(Box::new(Doubler { seen }));
    let state = ctx.run();
    assert_eq!(exception_trap(&state), Some(&Trap::StoreAccessFault(0)));
}

#[test]
fn ebreak_pauses_and_resumes_after_itself() {
    let mut ctx = TestContext::new().load_program(&[addi(5, 0, 1), ebreak(), addi(6, 0, 2)]);
    assert_eq!(
        ctx.run(),
        SimState::Paused(PauseReason::Breakpoint(TEXT + 4))
    );
    assert_eq!(ctx.pc(), TEXT + 8);
    assert_eq!(ctx.run(), SimState::Stopped(StopReason::Cliff));
    assert_eq!(ctx.x(6), 2);
}
