//! Integer multiply/divide (M extension).
//!
//! Division never traps: dividing by zero yields all ones (quotient) or the
//! dividend (remainder), and the signed overflow case `MIN / -1` yields `MIN`
//! with remainder zero.

use super::decode::InstructionBits;
use super::instruction::{Availability, BasicInstruction, Extension, Format};
use super::rv32i::R_MASK;
use crate::common::Trap;
use crate::config::Xlen;
use crate::machine::Machine;

/// The multiply/divide table.
pub static INSTRUCTIONS: &[BasicInstruction] = &[
    BasicInstruction::new("mul", Format::R, R_MASK, 0x0200_0033, Extension::M,
        "Multiplication: set t1 to the low XLEN bits of t2 * t3", mul),
    BasicInstruction::new("mulh", Format::R, R_MASK, 0x0200_1033, Extension::M,
        "Multiplication: high XLEN bits of signed * signed", mulh),
    BasicInstruction::new("mulhsu", Format::R, R_MASK, 0x0200_2033, Extension::M,
        "Multiplication: high XLEN bits of signed * unsigned", mulhsu),
    BasicInstruction::new("mulhu", Format::R, R_MASK, 0x0200_3033, Extension::M,
        "Multiplication: high XLEN bits of unsigned * unsigned", mulhu),
    BasicInstruction::new("div", Format::R, R_MASK, 0x0200_4033, Extension::M,
        "Division: set t1 to t2 / t3 (signed, truncating)", div),
    BasicInstruction::new("divu", Format::R, R_MASK, 0x0200_5033, Extension::M,
        "Division: set t1 to t2 / t3 (unsigned)", divu),
    BasicInstruction::new("rem", Format::R, R_MASK, 0x0200_6033, Extension::M,
        "Remainder of signed division", rem),
    BasicInstruction::new("remu", Format::R, R_MASK, 0x0200_7033, Extension::M,
        "Remainder of unsigned division", remu),
    BasicInstruction::new("mulw", Format::R, R_MASK, 0x0200_003B, Extension::M,
        "Word multiplication, sign-extended", mulw).only(Availability::Rv64Only),
    BasicInstruction::new("divw", Format::R, R_MASK, 0x0200_403B, Extension::M,
        "Word division (signed), sign-extended", divw).only(Availability::Rv64Only),
    BasicInstruction::new("divuw", Format::R, R_MASK, 0x0200_503B, Extension::M,
        "Word division (unsigned), sign-extended", divuw).only(Availability::Rv64Only),
    BasicInstruction::new("remw", Format::R, R_MASK, 0x0200_603B, Extension::M,
        "Word remainder (signed), sign-extended", remw).only(Availability::Rv64Only),
    BasicInstruction::new("remuw", Format::R, R_MASK, 0x0200_703B, Extension::M,
        "Word remainder (unsigned), sign-extended", remuw).only(Availability::Rv64Only),
];

#[inline]
fn operate(m: &mut Machine, inst: u32, op: impl FnOnce(u64, u64, Xlen) -> u64) -> Result<(), Trap> {
    let value = op(m.x(inst.rs1()), m.x(inst.rs2()), m.xlen());
    m.set_x(inst.rd(), value);
    Ok(())
}

fn mul(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| a.wrapping_mul(b))
}

fn mulh(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, xlen| {
        ((i128::from(a as i64) * i128::from(b as i64)) >> xlen.bits()) as u64
    })
}

fn mulhsu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, xlen| {
        ((i128::from(a as i64) * i128::from(b & xlen.mask())) >> xlen.bits()) as u64
    })
}

fn mulhu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, xlen| {
        ((u128::from(a & xlen.mask()) * u128::from(b & xlen.mask())) >> xlen.bits()) as u64
    })
}

fn div(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| {
        if b == 0 {
            u64::MAX
        } else {
            (a as i64).wrapping_div(b as i64) as u64
        }
    })
}

fn divu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, xlen| {
        let (a, b) = (a & xlen.mask(), b & xlen.mask());
        if b == 0 { u64::MAX } else { a / b }
    })
}

fn rem(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| {
        if b == 0 {
            a
        } else {
            (a as i64).wrapping_rem(b as i64) as u64
        }
    })
}

fn remu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, xlen| {
        let (a, b) = (a & xlen.mask(), b & xlen.mask());
        if b == 0 { a } else { a % b }
    })
}

fn mulw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| (a as i32).wrapping_mul(b as i32) as u64)
}

fn divw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| {
        let (a, b) = (a as i32, b as i32);
        if b == 0 {
            u64::MAX
        } else {
            a.wrapping_div(b) as u64
        }
    })
}

fn divuw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| {
        let (a, b) = (a as u32, b as u32);
        if b == 0 {
            u64::MAX
        } else {
            (a / b) as i32 as u64
        }
    })
}

fn remw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| {
        let (a, b) = (a as i32, b as i32);
        if b == 0 {
            a as u64
        } else {
            a.wrapping_rem(b) as u64
        }
    })
}

fn remuw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    operate(m, inst, |a, b, _| {
        let (a, b) = (a as u32, b as u32);
        if b == 0 {
            a as i32 as u64
        } else {
            (a % b) as i32 as u64
        }
    })
}
