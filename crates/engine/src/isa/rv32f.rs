//! Single-precision floating point (F extension).
//!
//! The semantics are written once, generic over [`RegisterImage`], and the D
//! table reuses them at `Float64`. Every rounding instruction resolves its `rm`
//! field first (a reserved mode is an illegal instruction), runs the operation
//! in a fresh [`Environment`], and ORs the raised flags into `fflags`.

use super::decode::{InstructionBits, i_imm, s_imm};
use super::instruction::{Availability, BasicInstruction, Extension, Format};
use super::rv32i::{I_MASK, R_MASK};
use crate::common::Trap;
use crate::float::{Environment, Float32, Floating, RegisterImage, arith, compare, convert};
use crate::machine::Machine;
use crate::machine::memory::Width;

/// Mask of rounding R-type encodings: opcode and funct7, `rm` free.
pub const ROUNDED_MASK: u32 = 0xFE00_007F;

/// Mask of unary encodings that also fix `rs2` (sqrt, conversions).
pub const UNARY_MASK: u32 = 0xFFF0_007F;

/// Mask of unary encodings that fix `rs2` and funct3 (moves, classify).
pub const MOVE_MASK: u32 = 0xFFF0_707F;

/// Mask of fused multiply-add encodings: opcode and format field.
pub const FUSED_MASK: u32 = 0x0600_007F;

/// The single-precision table.
pub static INSTRUCTIONS: &[BasicInstruction] = &[
    BasicInstruction::new("flw", Format::I, I_MASK, 0x2007, Extension::F,
        "Load a single-precision value from memory", fload::<Float32>),
    BasicInstruction::new("fsw", Format::S, I_MASK, 0x2027, Extension::F,
        "Store a single-precision value to memory", fstore::<Float32>),
    BasicInstruction::new("fmadd.s", Format::R4, FUSED_MASK, 0x43, Extension::F,
        "Fused multiply-add: f1 = f2 * f3 + f4", fmadd::<Float32>),
    BasicInstruction::new("fmsub.s", Format::R4, FUSED_MASK, 0x47, Extension::F,
        "Fused multiply-subtract: f1 = f2 * f3 - f4", fmsub::<Float32>),
    BasicInstruction::new("fnmsub.s", Format::R4, FUSED_MASK, 0x4B, Extension::F,
        "Negated fused multiply-subtract: f1 = -(f2 * f3) + f4", fnmsub::<Float32>),
    BasicInstruction::new("fnmadd.s", Format::R4, FUSED_MASK, 0x4F, Extension::F,
        "Negated fused multiply-add: f1 = -(f2 * f3) - f4", fnmadd::<Float32>),
    BasicInstruction::new("fadd.s", Format::R, ROUNDED_MASK, 0x0000_0053, Extension::F,
        "Floating addition: f1 = f2 + f3", fadd::<Float32>),
    BasicInstruction::new("fsub.s", Format::R, ROUNDED_MASK, 0x0800_0053, Extension::F,
        "Floating subtraction: f1 = f2 - f3", fsub::<Float32>),
    BasicInstruction::new("fmul.s", Format::R, ROUNDED_MASK, 0x1000_0053, Extension::F,
        "Floating multiplication: f1 = f2 * f3", fmul::<Float32>),
    BasicInstruction::new("fdiv.s", Format::R, ROUNDED_MASK, 0x1800_0053, Extension::F,
        "Floating division: f1 = f2 / f3", fdiv::<Float32>),
    BasicInstruction::new("fsqrt.s", Format::R, UNARY_MASK, 0x5800_0053, Extension::F,
        "Floating square root: f1 = sqrt(f2)", fsqrt::<Float32>),
    BasicInstruction::new("fsgnj.s", Format::R, R_MASK, 0x2000_0053, Extension::F,
        "f1 = |f2| with the sign of f3", fsgnj::<Float32>),
    BasicInstruction::new("fsgnjn.s", Format::R, R_MASK, 0x2000_1053, Extension::F,
        "f1 = |f2| with the opposite sign of f3", fsgnjn::<Float32>),
    BasicInstruction::new("fsgnjx.s", Format::R, R_MASK, 0x2000_2053, Extension::F,
        "f1 = f2 with its sign XORed with the sign of f3", fsgnjx::<Float32>),
    BasicInstruction::new("fmin.s", Format::R, R_MASK, 0x2800_0053, Extension::F,
        "f1 = the smaller of f2 and f3", fmin::<Float32>),
    BasicInstruction::new("fmax.s", Format::R, R_MASK, 0x2800_1053, Extension::F,
        "f1 = the larger of f2 and f3", fmax::<Float32>),
    BasicInstruction::new("fcvt.w.s", Format::R, UNARY_MASK, 0xC000_0053, Extension::F,
        "Convert to a signed 32-bit integer", fcvt_w::<Float32>),
    BasicInstruction::new("fcvt.wu.s", Format::R, UNARY_MASK, 0xC010_0053, Extension::F,
        "Convert to an unsigned 32-bit integer", fcvt_wu::<Float32>),
    BasicInstruction::new("fcvt.l.s", Format::R, UNARY_MASK, 0xC020_0053, Extension::F,
        "Convert to a signed 64-bit integer", fcvt_l::<Float32>).only(Availability::Rv64Only),
    BasicInstruction::new("fcvt.lu.s", Format::R, UNARY_MASK, 0xC030_0053, Extension::F,
        "Convert to an unsigned 64-bit integer", fcvt_lu::<Float32>).only(Availability::Rv64Only),
    BasicInstruction::new("fmv.x.w", Format::R, MOVE_MASK, 0xE000_0053, Extension::F,
        "Move the bit pattern of f1 to t1, sign-extended", fmv_x_w),
    BasicInstruction::new("fclass.s", Format::R, MOVE_MASK, 0xE000_1053, Extension::F,
        "Classify f1, setting one of ten bits in t1", fclass::<Float32>),
    BasicInstruction::new("feq.s", Format::R, R_MASK, 0xA000_2053, Extension::F,
        "t1 = 1 if f1 == f2 (quiet)", feq::<Float32>),
    BasicInstruction::new("flt.s", Format::R, R_MASK, 0xA000_1053, Extension::F,
        "t1 = 1 if f1 < f2 (signaling)", flt::<Float32>),
    BasicInstruction::new("fle.s", Format::R, R_MASK, 0xA000_0053, Extension::F,
        "t1 = 1 if f1 <= f2 (signaling)", fle::<Float32>),
    BasicInstruction::new("fcvt.s.w", Format::R, UNARY_MASK, 0xD000_0053, Extension::F,
        "Convert a signed 32-bit integer", fcvt_from_w::<Float32>),
    BasicInstruction::new("fcvt.s.wu", Format::R, UNARY_MASK, 0xD010_0053, Extension::F,
        "Convert an unsigned 32-bit integer", fcvt_from_wu::<Float32>),
    BasicInstruction::new("fcvt.s.l", Format::R, UNARY_MASK, 0xD020_0053, Extension::F,
        "Convert a signed 64-bit integer", fcvt_from_l::<Float32>).only(Availability::Rv64Only),
    BasicInstruction::new("fcvt.s.lu", Format::R, UNARY_MASK, 0xD030_0053, Extension::F,
        "Convert an unsigned 64-bit integer", fcvt_from_lu::<Float32>).only(Availability::Rv64Only),
    BasicInstruction::new("fmv.w.x", Format::R, MOVE_MASK, 0xF000_0053, Extension::F,
        "Move the low 32 bits of t1 to f1", fmv_w_x),
];

/// Environment for a rounding instruction.
pub(crate) fn environment(m: &Machine, inst: u32) -> Result<Environment, Trap> {
    m.rounding_mode(inst.rm())
        .map(Environment::new)
        .ok_or(Trap::IllegalInstruction(inst))
}

#[inline]
fn binary<F: RegisterImage>(
    m: &mut Machine,
    inst: u32,
    op: fn(F, F, &mut Environment) -> F,
) -> Result<(), Trap> {
    let mut env = environment(m, inst)?;
    let value = op(m.f(inst.rs1()), m.f(inst.rs2()), &mut env);
    m.set_f(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

/// Min/max: `rm` is a function selector, not a rounding mode.
#[inline]
fn select<F: RegisterImage>(
    m: &mut Machine,
    inst: u32,
    op: fn(F, F, &mut Environment) -> F,
) -> Result<(), Trap> {
    let mut env = Environment::default();
    let value = op(m.f(inst.rs1()), m.f(inst.rs2()), &mut env);
    m.set_f(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

#[inline]
fn fused<F: RegisterImage>(
    m: &mut Machine,
    inst: u32,
    negate_product: bool,
    negate_addend: bool,
) -> Result<(), Trap> {
    let mut env = environment(m, inst)?;
    let a: F = m.f(inst.rs1());
    let c: F = m.f(inst.rs3());
    let a = if negate_product { a.negate() } else { a };
    let c = if negate_addend { c.negate() } else { c };
    let value = arith::fused_multiply_add(a, m.f(inst.rs2()), c, &mut env);
    m.set_f(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

#[inline]
fn predicate<F: RegisterImage>(
    m: &mut Machine,
    inst: u32,
    op: fn(F, F, &mut Environment) -> bool,
) -> Result<(), Trap> {
    let mut env = Environment::default();
    let holds = op(m.f(inst.rs1()), m.f(inst.rs2()), &mut env);
    m.set_x(inst.rd(), u64::from(holds));
    m.accrue_flags(env.flags);
    Ok(())
}

#[inline]
fn to_integer<F: RegisterImage>(
    m: &mut Machine,
    inst: u32,
    op: impl FnOnce(F, &mut Environment) -> u64,
) -> Result<(), Trap> {
    let mut env = environment(m, inst)?;
    let value = op(m.f(inst.rs1()), &mut env);
    m.set_x(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

#[inline]
fn from_integer<F: RegisterImage>(
    m: &mut Machine,
    inst: u32,
    op: impl FnOnce(u64, &mut Environment) -> F,
) -> Result<(), Trap> {
    let mut env = environment(m, inst)?;
    let value = op(m.x(inst.rs1()), &mut env);
    m.set_f(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

/// Access width of a format.
#[inline]
fn width<F: Floating>() -> Width {
    if F::WIDTH == 32 { Width::Word } else { Width::Double }
}

pub(crate) fn fload<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let address = m.x(inst.rs1()).wrapping_add(i_imm(inst) as u64);
    let raw = m.load(address, width::<F>())?;
    m.set_f(inst.rd(), F::from_raw(raw));
    Ok(())
}

pub(crate) fn fstore<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let address = m.x(inst.rs1()).wrapping_add(s_imm(inst) as u64);
    m.store(address, width::<F>(), m.f_raw(inst.rs2()))
}

pub(crate) fn fmadd<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    fused::<F>(m, inst, false, false)
}

pub(crate) fn fmsub<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    fused::<F>(m, inst, false, true)
}

pub(crate) fn fnmsub<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    fused::<F>(m, inst, true, false)
}

pub(crate) fn fnmadd<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    fused::<F>(m, inst, true, true)
}

pub(crate) fn fadd<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    binary(m, inst, arith::add::<F>)
}

pub(crate) fn fsub<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    binary(m, inst, arith::subtract::<F>)
}

pub(crate) fn fmul<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    binary(m, inst, arith::multiply::<F>)
}

pub(crate) fn fdiv<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    binary(m, inst, arith::divide::<F>)
}

pub(crate) fn fsqrt<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let mut env = environment(m, inst)?;
    let value = arith::square_root::<F>(m.f(inst.rs1()), &mut env);
    m.set_f(inst.rd(), value);
    m.accrue_flags(env.flags);
    Ok(())
}

pub(crate) fn fsgnj<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let a: F = m.f(inst.rs1());
    m.set_f(inst.rd(), a.copy_sign(m.f(inst.rs2())));
    Ok(())
}

pub(crate) fn fsgnjn<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let value = arith::copy_sign_negated::<F>(m.f(inst.rs1()), m.f(inst.rs2()));
    m.set_f(inst.rd(), value);
    Ok(())
}

pub(crate) fn fsgnjx<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let value = arith::copy_sign_xor::<F>(m.f(inst.rs1()), m.f(inst.rs2()));
    m.set_f(inst.rd(), value);
    Ok(())
}

pub(crate) fn fmin<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    select(m, inst, compare::minimum_number::<F>)
}

pub(crate) fn fmax<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    select(m, inst, compare::maximum_number::<F>)
}

pub(crate) fn fcvt_w<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    to_integer::<F>(m, inst, |value, env| {
        i64::from(convert::convert_to_int(value, env, false)) as u64
    })
}

pub(crate) fn fcvt_wu<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    // The 32-bit result is sign-extended on RV64.
    to_integer::<F>(m, inst, |value, env| {
        convert::convert_to_unsigned_int(value, env, false) as i32 as u64
    })
}

pub(crate) fn fcvt_l<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    to_integer::<F>(m, inst, |value, env| {
        convert::convert_to_long(value, env, false) as u64
    })
}

pub(crate) fn fcvt_lu<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    to_integer::<F>(m, inst, |value, env| {
        convert::convert_to_unsigned_long(value, env, false)
    })
}

pub(crate) fn fcvt_from_w<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    from_integer::<F>(m, inst, |x, env| {
        convert::convert_from_int(i64::from(x as i32), env)
    })
}

pub(crate) fn fcvt_from_wu<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    from_integer::<F>(m, inst, |x, env| {
        convert::convert_from_unsigned(u64::from(x as u32), env)
    })
}

pub(crate) fn fcvt_from_l<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    from_integer::<F>(m, inst, |x, env| convert::convert_from_int(x as i64, env))
}

pub(crate) fn fcvt_from_lu<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    from_integer::<F>(m, inst, convert::convert_from_unsigned::<F>)
}

pub(crate) fn fclass<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let value: F = m.f(inst.rs1());
    m.set_x(inst.rd(), value.classify().mask());
    Ok(())
}

pub(crate) fn feq<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    predicate(m, inst, compare::compare_quiet_equal::<F>)
}

pub(crate) fn flt<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    predicate(m, inst, compare::compare_signaling_less_than::<F>)
}

pub(crate) fn fle<F: RegisterImage>(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    predicate(m, inst, compare::compare_signaling_less_than_equal::<F>)
}

/// Raw low word, not unboxed.
fn fmv_x_w(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    m.set_x(inst.rd(), m.f_raw(inst.rs1()) as u32 as i32 as u64);
    Ok(())
}

fn fmv_w_x(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    m.set_f(inst.rd(), Float32::from_bits(m.x(inst.rs1()) as u32));
    Ok(())
}
