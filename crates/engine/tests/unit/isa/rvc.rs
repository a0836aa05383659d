use rvisa_engine::common::Trap;
use rvisa_engine::config::Xlen;
use rvisa_engine::sim::{SimState, StopReason};

use crate::common::asm::addi;
use crate::common::harness::{TEXT, TestContext};

const C_LI_A0_5: u16 = 0x4515;
const C_ADDI_A0_3: u16 = 0x050D;
const C_MV_A1_A0: u16 = 0x85AA;
const C_LI_A1_9: u16 = 0x45A5;
const C_NOP: u16 = 0x0001;
const C_JR_RA: u16 = 0x8082;
const C_JALR_T0: u16 = 0x9282;
const C_BEQZ_S0_4: u16 = 0xC011;
const C_SWSP_A0_0: u16 = 0xC02A;
const C_LWSP_A1_0: u16 = 0x4582;

fn split(word: u32) -> [u16; 2] {
    [word as u16, (word >> 16) as u16]
}

fn exception_trap(state: SimState) -> Option<Trap> {
    match state {
        SimState::Stopped(StopReason::Exception(exception)) => Some(exception.trap),
        _ => None,
    }
}

#[test]
fn compressed_program_advances_by_two() {
    let mut ctx = TestContext::compressed(Xlen::Rv32).load_parcels(&[
        C_LI_A0_5,
        C_ADDI_A0_3,
        C_MV_A1_A0,
    ]);
    let _ = ctx.steps(3);
    assert_eq!(ctx.x(10), 8);
    assert_eq!(ctx.x(11), 8);
    assert_eq!(ctx.pc(), TEXT + 6);
}

#[test]
fn mixed_widths() {
    let [low, high] = split(addi(11, 10, 1));
    let mut ctx = TestContext::compressed(Xlen::Rv64).load_parcels(&[C_LI_A0_5, low, high, C_NOP]);
    let _ = ctx.steps(3);
    assert_eq!(ctx.x(11), 6);
    assert_eq!(ctx.pc(), TEXT + 8);
}

#[test]
fn compressed_jumps_link_past_the_parcel() {
    let mut ctx = TestContext::compressed(Xlen::Rv32).load_parcels(&[
        C_JALR_T0,
        C_NOP,
        C_LI_A0_5,
    ]);
    ctx.set_x(5, TEXT + 4);
    let _ = ctx.step();
    assert_eq!(ctx.x(1), TEXT + 2);
    assert_eq!(ctx.pc(), TEXT + 4);

    let _ = ctx.step();
    assert_eq!(ctx.x(10), 5);
}

#[test]
fn compressed_return() {
    let mut ctx = TestContext::compressed(Xlen::Rv32).load_parcels(&[
        C_JR_RA,
        C_NOP,
        C_NOP,
        C_LI_A0_5,
    ]);
    ctx.set_x(1, TEXT + 6);
    let _ = ctx.steps(2);
    assert_eq!(ctx.x(10), 5);
    assert_eq!(ctx.pc(), TEXT + 8);
}

#[test]
fn compressed_branch_offsets_from_the_parcel() {
    let mut ctx = TestContext::compressed(Xlen::Rv32).load_parcels(&[
        C_BEQZ_S0_4,
        C_LI_A0_5,
        C_LI_A1_9,
    ]);
    let _ = ctx.step();
    assert_eq!(ctx.pc(), TEXT + 4);
    let _ = ctx.step();
    assert_eq!(ctx.x(10), 0);
    assert_eq!(ctx.x(11), 9);
}

#[test]
fn stack_pointer_relative_access() {
    let mut ctx = TestContext::compressed(Xlen::Rv32).load_parcels(&[
        C_LI_A0_5,
        C_SWSP_A0_0,
        C_LWSP_A1_0,
    ]);
    let _ = ctx.steps(3);
    assert_eq!(ctx.x(11), 5);
    assert_eq!(ctx.machine().memory().read_u32(0x7fff_effc), 5);
}

#[test]
fn parcels_are_illegal_without_c() {
    let mut ctx = TestContext::new().load_parcels(&[C_LI_A0_5, 0x0000]);
    assert_eq!(
        exception_trap(ctx.step()),
        Some(Trap::IllegalInstruction(0x0000_4515))
    );
}

#[test]
fn the_zero_parcel_is_illegal() {
    let mut ctx = TestContext::compressed(Xlen::Rv32).load_parcels(&[0x0000, C_NOP]);
    assert_eq!(exception_trap(ctx.step()), Some(Trap::IllegalInstruction(0)));
    assert_eq!(ctx.pc(), TEXT);
}
