//! Double-precision floating point (D extension).
//!
//! Same semantics as the F table at `Float64`, plus the two format
//! conversions and, on RV64, raw moves between integer and FP registers.

use super::decode::InstructionBits;
use super::instruction::{Availability, BasicInstruction, Extension, Format};
use super::rv32f::{
    FUSED_MASK, MOVE_MASK, ROUNDED_MASK, UNARY_MASK, environment, fadd, fclass, fcvt_from_l,
    fcvt_from_lu, fcvt_from_w, fcvt_from_wu, fcvt_l, fcvt_lu, fcvt_w, fcvt_wu, fdiv, feq, fle,
    fload, flt, fmadd, fmax, fmin, fmsub, fmul, fnmadd, fnmsub, fsgnj, fsgnjn, fsgnjx, fsqrt,
    fstore, fsub,
};
use super::rv32i::{I_MASK, R_MASK};
use crate::common::Trap;
use crate::float::{Environment, Float32, Float64, convert};
use crate::machine::Machine;

/// The double-precision table.
pub static INSTRUCTIONS: &[BasicInstruction] = &[
    BasicInstruction::new("fld", Format::I, I_MASK, 0x3007, Extension::D,
        "Load a double-precision value from memory", fload::<Float64>),
    BasicInstruction::new("fsd", Format::S, I_MASK, 0x3027, Extension::D,
        "Store a double-precision value to memory", fstore::<Float64>),
    BasicInstruction::new("fmadd.d", Format::R4, FUSED_MASK, 0x0200_0043, Extension::D,
        "Fused multiply-add: f1 = f2 * f3 + f4", fmadd::<Float64>),
    BasicInstruction::new("fmsub.d", Format::R4, FUSED_MASK, 0x0200_0047, Extension::D,
        "Fused multiply-subtract: f1 = f2 * f3 - f4", fmsub::<Float64>),
    BasicInstruction::new("fnmsub.d", Format::R4, FUSED_MASK, 0x0200_004B, Extension::D,
        "Negated fused multiply-subtract: f1 = -(f2 * f3) + f4", fnmsub::<Float64>),
    BasicInstruction::new("fnmadd.d", Format::R4, FUSED_MASK, 0x0200_004F, Extension::D,
        "Negated fused multiply-add: f1 = -(f2 * f3) - f4", fnmadd::<Float64>),
    BasicInstruction::new("fadd.d", Format::R, ROUNDED_MASK, 0x0200_0053, Extension::D,
        "Floating addition: f1 = f2 + f3", fadd::<Float64>),
    BasicInstruction::new("fsub.d", Format::R, ROUNDED_MASK, 0x0A00_0053, Extension::D,
        "Floating subtraction: f1 = f2 - f3", fsub::<Float64>),
    BasicInstruction::new("fmul.d", Format::R, ROUNDED_MASK, 0x1200_0053, Extension::D,
        "Floating multiplication: f1 = f2 * f3", fmul::<Float64>),
    BasicInstruction::new("fdiv.d", Format::R, ROUNDED_MASK, 0x1A00_0053, Extension::D,
        "Floating division: f1 = f2 / f3", fdiv::<Float64>),
    BasicInstruction::new("fsqrt.d", Format::R, UNARY_MASK, 0x5A00_0053, Extension::D,
        "Floating square root: f1 = sqrt(f2)", fsqrt::<Float64>),
    BasicInstruction::new("fsgnj.d", Format::R, R_MASK, 0x2200_0053, Extension::D,
        "f1 = |f2| with the sign of f3", fsgnj::<Float64>),
    BasicInstruction::new("fsgnjn.d", Format::R, R_MASK, 0x2200_1053, Extension::D,
        "f1 = |f2| with the opposite sign of f3", fsgnjn::<Float64>),
    BasicInstruction::new("fsgnjx.d", Format::R, R_MASK, 0x2200_2053, Extension::D,
        "f1 = f2 with its sign XORed with the sign of f3", fsgnjx::<Float64>),
    BasicInstruction::new("fmin.d", Format::R, R_MASK, 0x2A00_0053, Extension::D,
        "f1 = the smaller of f2 and f3", fmin::<Float64>),
    BasicInstruction::new("fmax.d", Format::R, R_MASK, 0x2A00_1053, Extension::D,
        "f1 = the larger of f2 and f3", fmax::<Float64>),
    BasicInstruction::new("fcvt.s.d", Format::R, UNARY_MASK, 0x4010_0053, Extension::D,
        "Convert double to single precision", fcvt_s_d),
    BasicInstruction::new("fcvt.d.s", Format::R, UNARY_MASK, 0x4200_0053, Extension::D,
        "Convert single to double precision (exact)", fcvt_d_s),
    BasicInstruction::new("feq.d", Format::R, R_MASK, 0xA200_2053, Extension::D,
        "t1 = 1 if f1 == f2 (quiet)", feq::<Float64>),
    BasicInstruction::new("flt.d", Format::R, R_MASK, 0xA200_1053, Extension::D,
        "t1 = 1 if f1 < f2 (signaling)", flt::<Float64>),
    BasicInstruction::new("fle.d", Format::R, R_MASK, 0xA200_0053, Extension::D,
        "t1 = 1 if f1 <= f2 (signaling)", fle::<Float64>),
    BasicInstruction::new("fclass.d", Format::R, MOVE_MASK, 0xE200_1053, Extension::D,
        "Classify f1, setting one of ten bits in t1", fclass::<Float64>),
    BasicInstruction::new("fcvt.w.d", Format::R, UNARY_MASK, 0xC200_0053, Extension::D,
        "Convert to a signed 32-bit integer", fcvt_w::<Float64>),
    BasicInstruction::new("fcvt.wu.d", Format::R, UNARY_MASK, 0xC210_0053, Extension::D,
        "Convert to an unsigned 32-bit integer", fcvt_wu::<Float64>),
    BasicInstruction::new("fcvt.l.d", Format::R, UNARY_MASK, 0xC220_0053, Extension::D,
        "Convert to a signed 64-bit integer", fcvt_l::<Float64>).only(Availability::Rv64Only),
    BasicInstruction::new("fcvt.lu.d", Format::R, UNARY_MASK, 0xC230_0053, Extension::D,
        "Convert to an unsigned 64-bit integer", fcvt_lu::<Float64>).only(Availability::Rv64Only),
    BasicInstruction::new("fcvt.d.w", Format::R, UNARY_MASK, 0xD200_0053, Extension::D,
        "Convert a signed 32-bit integer (exact)", fcvt_from_w::<Float64>),
    BasicInstruction::new("fcvt.d.wu", Format::R, UNARY_MASK, 0xD210_0053, Extension::D,
        "Convert an unsigned 32-bit integer (exact)", fcvt_from_wu::<Float64>),
    BasicInstruction::new("fcvt.d.l", Format::R, UNARY_MASK, 0xD220_0053, Extension::D,
        "Convert a signed 64-bit integer", fcvt_from_l::<Float64>).only(Availability::Rv64Only),
    BasicInstruction::new("fcvt.d.lu", Format::R, UNARY_MASK, 0xD230_0053, Extension::D,
        "Convert an unsigned 64-bit integer", fcvt_from_lu::<Float64>).only(Availability::Rv64Only),
    BasicInstruction::new("fmv.x.d", Format::R, MOVE_MASK, 0xE200_0053, Extension::D,
        "Move the bit pattern of f1 to t1", fmv_x_d).only(Availability::Rv64Only),
    BasicInstruction::new("fmv.d.x", Format::R, MOVE_MASK, 0xF200_0053, Extension::D,
        "Move the bit pattern of t1 to f1", fmv_d_x).only(Availability::Rv64Only),
];

fn fcvt_s_d(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let mut env = environment(m, inst)?;
    let value: Float32 = convert::convert_format(m.f::<Float64>(inst.rs1()), &mut env);
    m.set_f(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

/// Widening is exact, so `rm` is not consulted.
fn fcvt_d_s(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let mut env = Environment::default();
    let value: Float64 = convert::convert_format(m.f::<Float32>(inst.rs1()), &mut env);
    m.set_f(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

fn fmv_x_d(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    m.set_x(inst.rd(), m.f_raw(inst.rs1()));
    Ok(())
}

fn fmv_d_x(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    m.set_f_raw(inst.rd(), m.x(inst.rs1()));
    Ok(())
}
