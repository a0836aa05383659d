//! Base integer instructions (RV32I and the RV64I additions).
//!
//! Register values are held sign-extended to 64 bits on RV32, so signed
//! operations work on the stored value directly and unsigned ones mask with
//! [`Xlen::mask`]. Results pass through [`Machine::set_x`], which re-normalizes.

use super::decode::{InstructionBits, b_imm, i_imm, j_imm, s_imm, u_imm};
use super::instruction::{Availability, BasicInstruction, Extension, Format};
use crate::common::Trap;
use crate::config::Xlen;
use crate::machine::Machine;
use crate::machine::memory::Width;

/// Mask of R-type encodings: opcode, funct3 and funct7.
pub const R_MASK: u32 = 0xFE00_707F;

/// Mask of I/S/B-type encodings: opcode and funct3.
pub const I_MASK: u32 = 0x0000_707F;

/// Mask of U/J-type encodings: opcode only.
pub const U_MASK: u32 = 0x0000_007F;

/// Mask of RV64 shift-immediate encodings, whose shamt reaches bit 25.
const SHIFT64_MASK: u32 = 0xFC00_707F;

/// The base integer table.
pub static INSTRUCTIONS: &[BasicInstruction] = &[
    BasicInstruction::new("lui", Format::U, U_MASK, 0x37, Extension::I,
        "Load upper immediate: set t1 to the 20-bit immediate shifted left 12", lui),
    BasicInstruction::new("auipc", Format::U, U_MASK, 0x17, Extension::I,
        "Add upper immediate to pc: set t1 to pc plus the immediate shifted left 12", auipc),
    BasicInstruction::new("jal", Format::J, U_MASK, 0x6F, Extension::I,
        "Jump and link: set t1 to pc + 4, then jump to label", jal),
    BasicInstruction::new("jalr", Format::I, I_MASK, 0x67, Extension::I,
        "Jump and link register: set t1 to pc + 4, then jump to t0 + offset", jalr),
    BasicInstruction::new("beq", Format::B, I_MASK, 0x63, Extension::I,
        "Branch if equal", beq),
    BasicInstruction::new("bne", Format::B, I_MASK, 0x1063, Extension::I,
        "Branch if not equal", bne),
    BasicInstruction::new("blt", Format::B, I_MASK, 0x4063, Extension::I,
        "Branch if less than (signed)", blt),
    BasicInstruction::new("bge", Format::B, I_MASK, 0x5063, Extension::I,
        "Branch if greater than or equal (signed)", bge),
    BasicInstruction::new("bltu", Format::B, I_MASK, 0x6063, Extension::I,
        "Branch if less than (unsigned)", bltu),
    BasicInstruction::new("bgeu", Format::B, I_MASK, 0x7063, Extension::I,
        "Branch if greater than or equal (unsigned)", bgeu),
    BasicInstruction::new("lb", Format::I, I_MASK, 0x03, Extension::I,
        "Load byte, sign-extended", lb),
    BasicInstruction::new("lh", Format::I, I_MASK, 0x1003, Extension::I,
        "Load half-word, sign-extended", lh),
    BasicInstruction::new("lw", Format::I, I_MASK, 0x2003, Extension::I,
        "Load word, sign-extended", lw),
    BasicInstruction::new("ld", Format::I, I_MASK, 0x3003, Extension::I,
        "Load double-word", ld).only(Availability::Rv64Only),
    BasicInstruction::new("lbu", Format::I, I_MASK, 0x4003, Extension::I,
        "Load byte, zero-extended", lbu),
    BasicInstruction::new("lhu", Format::I, I_MASK, 0x5003, Extension::I,
        "Load half-word, zero-extended", lhu),
    BasicInstruction::new("lwu", Format::I, I_MASK, 0x6003, Extension::I,
        "Load word, zero-extended", lwu).only(Availability::Rv64Only),
    BasicInstruction::new("sb", Format::S, I_MASK, 0x23, Extension::I,
        "Store the low byte of t1", sb),
    BasicInstruction::new("sh", Format::S, I_MASK, 0x1023, Extension::I,
        "Store the low half-word of t1", sh),
    BasicInstruction::new("sw", Format::S, I_MASK, 0x2023, Extension::I,
        "Store the low word of t1", sw),
    BasicInstruction::new("sd", Format::S, I_MASK, 0x3023, Extension::I,
        "Store double-word", sd).only(Availability::Rv64Only),
    BasicInstruction::new("addi", Format::I, I_MASK, 0x13, Extension::I,
        "Addition immediate: set t1 to (t2 plus immediate)", addi),
    BasicInstruction::new("slti", Format::I, I_MASK, 0x2013, Extension::I,
        "Set less than immediate (signed)", slti),
    BasicInstruction::new("sltiu", Format::I, I_MASK, 0x3013, Extension::I,
        "Set less than immediate (unsigned)", sltiu),
    BasicInstruction::new("xori", Format::I, I_MASK, 0x4013, Extension::I,
        "Bitwise XOR immediate", xori),
    BasicInstruction::new("ori", Format::I, I_MASK, 0x6013, Extension::I,
        "Bitwise OR immediate", ori),
    BasicInstruction::new("andi", Format::I, I_MASK, 0x7013, Extension::I,
        "Bitwise AND immediate", andi),
    BasicInstruction::new("slli", Format::I, R_MASK, 0x1013, Extension::I,
        "Shift left logical by a 5-bit immediate", slli).only(Availability::Rv32Only),
    BasicInstruction::new("srli", Format::I, R_MASK, 0x5013, Extension::I,
        "Shift right logical by a 5-bit immediate", srli).only(Availability::Rv32Only),
    BasicInstruction::new("srai", Format::I, R_MASK, 0x4000_5013, Extension::I,
        "Shift right arithmetic by a 5-bit immediate", srai).only(Availability::Rv32Only),
    BasicInstruction::new("slli", Format::I, SHIFT64_MASK, 0x1013, Extension::I,
        "Shift left logical by a 6-bit immediate", slli).only(Availability::Rv64Only),
    BasicInstruction::new("srli", Format::I, SHIFT64_MASK, 0x5013, Extension::I,
        "Shift right logical by a 6-bit immediate", srli).only(Availability::Rv64Only),
    BasicInstruction::new("srai", Format::I, SHIFT64_MASK, 0x4000_5013, Extension::I,
        "Shift right arithmetic by a 6-bit immediate", srai).only(Availability::Rv64Only),
    BasicInstruction::new("add", Format::R, R_MASK, 0x33, Extension::I,
        "Addition: set t1 to (t2 plus t3)", add),
    BasicInstruction::new("sub", Format::R, R_MASK, 0x4000_0033, Extension::I,
        "Subtraction: set t1 to (t2 minus t3)", sub),
    BasicInstruction::new("sll", Format::R, R_MASK, 0x1033, Extension::I,
        "Shift left logical by the low bits of t3", sll),
    BasicInstruction::new("slt", Format::R, R_MASK, 0x2033, Extension::I,
        "Set less than (signed)", slt),
    BasicInstruction::new("sltu", Format::R, R_MASK, 0x3033, Extension::I,
        "Set less than (unsigned)", sltu),
    BasicInstruction::new("xor", Format::R, R_MASK, 0x4033, Extension::I,
        "Bitwise XOR", xor),
    BasicInstruction::new("srl", Format::R, R_MASK, 0x5033, Extension::I,
        "Shift right logical by the low bits of t3", srl),
    BasicInstruction::new("sra", Format::R, R_MASK, 0x4000_5033, Extension::I,
        "Shift right arithmetic by the low bits of t3", sra),
    BasicInstruction::new("or", Format::R, R_MASK, 0x6033, Extension::I,
        "Bitwise OR", or),
    BasicInstruction::new("and", Format::R, R_MASK, 0x7033, Extension::I,
        "Bitwise AND", and),
    BasicInstruction::new("addiw", Format::I, I_MASK, 0x1B, Extension::I,
        "Addition immediate on the low 32 bits, sign-extended", addiw).only(Availability::Rv64Only),
    BasicInstruction::new("slliw", Format::I, R_MASK, 0x101B, Extension::I,
        "Shift left logical word by immediate", slliw).only(Availability::Rv64Only),
    BasicInstruction::new("srliw", Format::I, R_MASK, 0x501B, Extension::I,
        "Shift right logical word by immediate", srliw).only(Availability::Rv64Only),
    BasicInstruction::new("sraiw", Format::I, R_MASK, 0x4000_501B, Extension::I,
        "Shift right arithmetic word by immediate", sraiw).only(Availability::Rv64Only),
    BasicInstruction::new("addw", Format::R, R_MASK, 0x3B, Extension::I,
        "Addition on the low 32 bits, sign-extended", addw).only(Availability::Rv64Only),
    BasicInstruction::new("subw", Format::R, R_MASK, 0x4000_003B, Extension::I,
        "Subtraction on the low 32 bits, sign-extended", subw).only(Availability::Rv64Only),
    BasicInstruction::new("sllw", Format::R, R_MASK, 0x103B, Extension::I,
        "Shift left logical word", sllw).only(Availability::Rv64Only),
    BasicInstruction::new("srlw", Format::R, R_MASK, 0x503B, Extension::I,
        "Shift right logical word", srlw).only(Availability::Rv64Only),
    BasicInstruction::new("sraw", Format::R, R_MASK, 0x4000_503B, Extension::I,
        "Shift right arithmetic word", sraw).only(Availability::Rv64Only),
];

/// Sign-extends the low `bits` of `value`.
#[inline]
fn sext(value: u64, bits: u32) -> u64 {
    let shift = 64 - bits;
    (((value << shift) as i64) >> shift) as u64
}

/// Shift amount mask for register shifts.
#[inline]
fn shift_mask(xlen: Xlen) -> u64 {
    u64::from(xlen.bits() - 1)
}

#[inline]
fn register_op(
    m: &mut Machine,
    inst: u32,
    op: impl FnOnce(u64, u64, Xlen) -> u64,
) -> Result<(), Trap> {
    let value = op(m.x(inst.rs1()), m.x(inst.rs2()), m.xlen());
    m.set_x(inst.rd(), value);
    Ok(())
}

#[inline]
fn immediate_op(
    m: &mut Machine,
    inst: u32,
    op: impl FnOnce(u64, i64, Xlen) -> u64,
) -> Result<(), Trap> {
    let value = op(m.x(inst.rs1()), i_imm(inst), m.xlen());
    m.set_x(inst.rd(), value);
    Ok(())
}

/// Operates on the low 32 bits and sign-extends the result.
#[inline]
fn word_op(m: &mut Machine, inst: u32, op: impl FnOnce(u32, u32) -> u32) -> Result<(), Trap> {
    let value = op(m.x(inst.rs1()) as u32, m.x(inst.rs2()) as u32);
    m.set_x(inst.rd(), value as i32 as u64);
    Ok(())
}

#[inline]
fn branch(m: &mut Machine, inst: u32, taken: impl FnOnce(u64, u64, Xlen) -> bool) -> Result<(), Trap> {
    if taken(m.x(inst.rs1()), m.x(inst.rs2()), m.xlen()) {
        m.process_branch(b_imm(inst));
    }
    Ok(())
}

#[inline]
fn load(m: &mut Machine, inst: u32, width: Width, signed: bool) -> Result<(), Trap> {
    let address = m.x(inst.rs1()).wrapping_add(i_imm(inst) as u64);
    let raw = m.load(address, width)?;
    let bits = (width.bytes() * 8) as u32;
    m.set_x(inst.rd(), if signed { sext(raw, bits) } else { raw });
    Ok(())
}

#[inline]
fn store(m: &mut Machine, inst: u32, width: Width) -> Result<(), Trap> {
    let address = m.x(inst.rs1()).wrapping_add(s_imm(inst) as u64);
    m.store(address, width, m.x(inst.rs2()))
}

fn lui(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    m.set_x(inst.rd(), u_imm(inst) as u64);
    Ok(())
}

fn auipc(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let here = m.pc().wrapping_sub(m.instruction_length());
    m.set_x(inst.rd(), here.wrapping_add(u_imm(inst) as u64));
    Ok(())
}

fn jal(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    m.process_return_address(inst.rd());
    m.process_branch(j_imm(inst));
    Ok(())
}

fn jalr(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let target = m.x(inst.rs1()).wrapping_add(i_imm(inst) as u64) & !1;
    m.process_return_address(inst.rd());
    m.process_jump(target);
    Ok(())
}

fn beq(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    branch(m, inst, |a, b, _| a == b)
}

fn bne(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    branch(m, inst, |a, b, _| a != b)
}

fn blt(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    branch(m, inst, |a, b, _| (a as i64) < (b as i64))
}

fn bge(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    branch(m, inst, |a, b, _| (a as i64) >= (b as i64))
}

fn bltu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    branch(m, inst, |a, b, xlen| a & xlen.mask() < b & xlen.mask())
}

fn bgeu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    branch(m, inst, |a, b, xlen| a & xlen.mask() >= b & xlen.mask())
}

fn lb(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    load(m, inst, Width::Byte, true)
}

fn lh(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    load(m, inst, Width::Half, true)
}

fn lw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    load(m, inst, Width::Word, true)
}

fn ld(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    load(m, inst, Width::Double, false)
}

fn lbu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    load(m, inst, Width::Byte, false)
}

fn lhu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    load(m, inst, Width::Half, false)
}

fn lwu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    load(m, inst, Width::Word, false)
}

fn sb(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    store(m, inst, Width::Byte)
}

fn sh(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    store(m, inst, Width::Half)
}

fn sw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    store(m, inst, Width::Word)
}

fn sd(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    store(m, inst, Width::Double)
}

fn addi(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    immediate_op(m, inst, |a, imm, _| a.wrapping_add(imm as u64))
}

fn slti(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    immediate_op(m, inst, |a, imm, _| u64::from((a as i64) < imm))
}

fn sltiu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    immediate_op(m, inst, |a, imm, xlen| {
        u64::from(a & xlen.mask() < (imm as u64) & xlen.mask())
    })
}

fn xori(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    immediate_op(m, inst, |a, imm, _| a ^ imm as u64)
}

fn ori(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    immediate_op(m, inst, |a, imm, _| a | imm as u64)
}

fn andi(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    immediate_op(m, inst, |a, imm, _| a & imm as u64)
}

fn slli(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let shamt = inst.shamt(6);
    immediate_op(m, inst, |a, _, _| a << shamt)
}

fn srli(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let shamt = inst.shamt(6);
    immediate_op(m, inst, |a, _, xlen| (a & xlen.mask()) >> shamt)
}

fn srai(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let shamt = inst.shamt(6);
    immediate_op(m, inst, |a, _, _| ((a as i64) >> shamt) as u64)
}

fn add(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, _| a.wrapping_add(b))
}

fn sub(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, _| a.wrapping_sub(b))
}

fn sll(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, xlen| a << (b & shift_mask(xlen)))
}

fn slt(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, _| u64::from((a as i64) < (b as i64)))
}

fn sltu(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, xlen| u64::from(a & xlen.mask() < b & xlen.mask()))
}

fn xor(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, _| a ^ b)
}

fn srl(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, xlen| (a & xlen.mask()) >> (b & shift_mask(xlen)))
}

fn sra(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, xlen| ((a as i64) >> (b & shift_mask(xlen))) as u64)
}

fn or(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, _| a | b)
}

fn and(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    register_op(m, inst, |a, b, _| a & b)
}

fn addiw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    immediate_op(m, inst, |a, imm, _| (a as i32).wrapping_add(imm as i32) as u64)
}

fn slliw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let shamt = inst.shamt(5);
    immediate_op(m, inst, |a, _, _| ((a as u32) << shamt) as i32 as u64)
}

fn srliw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let shamt = inst.shamt(5);
    immediate_op(m, inst, |a, _, _| ((a as u32) >> shamt) as i32 as u64)
}

fn sraiw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    let shamt = inst.shamt(5);
    immediate_op(m, inst, |a, _, _| ((a as i32) >> shamt) as u64)
}

fn addw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    word_op(m, inst, u32::wrapping_add)
}

fn subw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    word_op(m, inst, u32::wrapping_sub)
}

fn sllw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    word_op(m, inst, |a, b| a << (b & 0x1F))
}

fn srlw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    word_op(m, inst, |a, b| a >> (b & 0x1F))
}

fn sraw(m: &mut Machine, inst: u32) -> Result<(), Trap> {
    word_op(m, inst, |a, b| ((a as i32) >> (b & 0x1F)) as u32)
}
