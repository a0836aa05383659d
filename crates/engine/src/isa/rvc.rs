//! Compressed instruction expansion.
//!
//! A parcel whose low two bits are not `11` is a 16-bit instruction. [`expand`]
//! rewrites it to the 32-bit encoding with the same effect, which then goes
//! through ordinary matching. The instruction length stays 2 so that branches
//! and links are computed relative to the compressed instruction.
//!
//! Reserved and illegal parcels (including the all-zero parcel) expand to
//! `None`. Which encodings exist depends on XLEN and the FP extensions: on RV32
//! funct3 `001` of quadrant 1 is `c.jal`, on RV64 it is `c.addiw`.

use super::decode::sign_extend;
use crate::config::{Extensions, Xlen};

/// Quadrant 0 (bits 1:0 = 00).
const QUADRANT_0: u16 = 0b00;
/// Quadrant 1 (bits 1:0 = 01).
const QUADRANT_1: u16 = 0b01;
/// Quadrant 2 (bits 1:0 = 10).
const QUADRANT_2: u16 = 0b10;

const OP_LOAD: u32 = 0x03;
const OP_LOAD_FP: u32 = 0x07;
const OP_IMM: u32 = 0x13;
const OP_IMM_32: u32 = 0x1B;
const OP_STORE: u32 = 0x23;
const OP_STORE_FP: u32 = 0x27;
const OP_REG: u32 = 0x33;
const OP_LUI: u32 = 0x37;
const OP_REG_32: u32 = 0x3B;
const OP_BRANCH: u32 = 0x63;
const OP_JALR: u32 = 0x67;
const OP_JAL: u32 = 0x6F;

/// `ebreak`.
const EBREAK: u32 = 0x0010_0073;

/// Stack pointer.
const SP: u32 = 2;

/// Return address.
const RA: u32 = 1;

/// Returns true if `parcel` starts a 16-bit instruction.
#[inline]
pub const fn is_compressed(parcel: u16) -> bool {
    parcel & 0b11 != 0b11
}

/// Expands a 16-bit instruction to its 32-bit equivalent.
pub fn expand(parcel: u16, xlen: Xlen, extensions: &Extensions) -> Option<u32> {
    if parcel == 0 {
        return None;
    }
    let inst = u32::from(parcel);
    let funct3 = bits(inst, 15, 13);
    let rv64 = xlen == Xlen::Rv64;
    match parcel & 0b11 {
        QUADRANT_0 => quadrant_0(inst, funct3, rv64, extensions),
        QUADRANT_1 => quadrant_1(inst, funct3, rv64),
        QUADRANT_2 => quadrant_2(inst, funct3, rv64, extensions),
        _ => None,
    }
}

fn quadrant_0(inst: u32, funct3: u32, rv64: bool, extensions: &Extensions) -> Option<u32> {
    let rs1 = compact(inst, 7);
    let rd = compact(inst, 2);
    // Word offset: uimm[5:3] = inst[12:10], uimm[2] = inst[6], uimm[6] = inst[5].
    let word = bits(inst, 12, 10) << 3 | bits(inst, 6, 6) << 2 | bits(inst, 5, 5) << 6;
    // Double offset: uimm[5:3] = inst[12:10], uimm[7:6] = inst[6:5].
    let double = bits(inst, 12, 10) << 3 | bits(inst, 6, 5) << 6;
    match funct3 {
        0b000 => {
            let imm = bits(inst, 12, 11) << 4
                | bits(inst, 10, 7) << 6
                | bits(inst, 6, 6) << 2
                | bits(inst, 5, 5) << 3;
            (imm != 0).then(|| i_type(imm, SP, 0b000, rd, OP_IMM))
        }
        0b001 => extensions
            .has_d()
            .then(|| i_type(double, rs1, 0b011, rd, OP_LOAD_FP)),
        0b010 => Some(i_type(word, rs1, 0b010, rd, OP_LOAD)),
        0b011 if rv64 => Some(i_type(double, rs1, 0b011, rd, OP_LOAD)),
        0b011 => extensions
            .has_f()
            .then(|| i_type(word, rs1, 0b010, rd, OP_LOAD_FP)),
        0b101 => extensions
            .has_d()
            .then(|| s_type(double, rd, rs1, 0b011, OP_STORE_FP)),
        0b110 => Some(s_type(word, rd, rs1, 0b010, OP_STORE)),
        0b111 if rv64 => Some(s_type(double, rd, rs1, 0b011, OP_STORE)),
        0b111 => extensions
            .has_f()
            .then(|| s_type(word, rd, rs1, 0b010, OP_STORE_FP)),
        _ => None,
    }
}

fn quadrant_1(inst: u32, funct3: u32, rv64: bool) -> Option<u32> {
    let rd = bits(inst, 11, 7);
    let imm6 = sign_extend(bits(inst, 12, 12) << 5 | bits(inst, 6, 2), 6) as u32;
    match funct3 {
        0b000 => Some(i_type(imm6, rd, 0b000, rd, OP_IMM)),
        0b001 if rv64 => (rd != 0).then(|| i_type(imm6, rd, 0b000, rd, OP_IMM_32)),
        0b001 => Some(j_type(jump_offset(inst), RA)),
        0b010 => Some(i_type(imm6, 0, 0b000, rd, OP_IMM)),
        0b011 if rd == SP => {
            let imm = sign_extend(
                bits(inst, 12, 12) << 9
                    | bits(inst, 6, 6) << 4
                    | bits(inst, 5, 5) << 6
                    | bits(inst, 4, 3) << 7
                    | bits(inst, 2, 2) << 5,
                10,
            ) as u32;
            (imm != 0).then(|| i_type(imm, SP, 0b000, SP, OP_IMM))
        }
        0b011 => (imm6 != 0 && rd != 0).then(|| (imm6 << 12) | (rd << 7) | OP_LUI),
        0b100 => misc_alu(inst, rv64),
        0b101 => Some(j_type(jump_offset(inst), 0)),
        0b110 | 0b111 => {
            let offset = sign_extend(
                bits(inst, 12, 12) << 8
                    | bits(inst, 11, 10) << 3
                    | bits(inst, 6, 5) << 6
                    | bits(inst, 4, 3) << 1
                    | bits(inst, 2, 2) << 5,
                9,
            ) as u32;
            Some(b_type(offset, 0, compact(inst, 7), funct3 & 1))
        }
        _ => None,
    }
}

fn misc_alu(inst: u32, rv64: bool) -> Option<u32> {
    let rd = compact(inst, 7);
    let rs2 = compact(inst, 2);
    let high = bits(inst, 12, 12);
    let shamt = high << 5 | bits(inst, 6, 2);
    match bits(inst, 11, 10) {
        0b00 if rv64 || high == 0 => Some(i_type(shamt, rd, 0b101, rd, OP_IMM)),
        0b01 if rv64 || high == 0 => Some(i_type(0x400 | shamt, rd, 0b101, rd, OP_IMM)),
        0b10 => {
            let imm = sign_extend(shamt, 6) as u32;
            Some(i_type(imm, rd, 0b111, rd, OP_IMM))
        }
        0b11 => match (high, bits(inst, 6, 5)) {
            (0, 0b00) => Some(r_type(0x20, rs2, rd, 0b000, rd, OP_REG)),
            (0, 0b01) => Some(r_type(0, rs2, rd, 0b100, rd, OP_REG)),
            (0, 0b10) => Some(r_type(0, rs2, rd, 0b110, rd, OP_REG)),
            (0, 0b11) => Some(r_type(0, rs2, rd, 0b111, rd, OP_REG)),
            (1, 0b00) if rv64 => Some(r_type(0x20, rs2, rd, 0b000, rd, OP_REG_32)),
            (1, 0b01) if rv64 => Some(r_type(0, rs2, rd, 0b000, rd, OP_REG_32)),
            _ => None,
        },
        _ => None,
    }
}

fn quadrant_2(inst: u32, funct3: u32, rv64: bool, extensions: &Extensions) -> Option<u32> {
    let rd = bits(inst, 11, 7);
    let rs2 = bits(inst, 6, 2);
    let high = bits(inst, 12, 12);
    // uimm[5] = inst[12], uimm[4:2] = inst[6:4], uimm[7:6] = inst[3:2].
    let word_load = high << 5 | bits(inst, 6, 4) << 2 | bits(inst, 3, 2) << 6;
    // uimm[5] = inst[12], uimm[4:3] = inst[6:5], uimm[8:6] = inst[4:2].
    let double_load = high << 5 | bits(inst, 6, 5) << 3 | bits(inst, 4, 2) << 6;
    // uimm[5:2] = inst[12:9], uimm[7:6] = inst[8:7].
    let word_store = bits(inst, 12, 9) << 2 | bits(inst, 8, 7) << 6;
    // uimm[5:3] = inst[12:10], uimm[8:6] = inst[9:7].
    let double_store = bits(inst, 12, 10) << 3 | bits(inst, 9, 7) << 6;
    match funct3 {
        0b000 => {
            let shamt = high << 5 | rs2;
            (rd != 0 && (rv64 || high == 0)).then(|| i_type(shamt, rd, 0b001, rd, OP_IMM))
        }
        0b001 => extensions
            .has_d()
            .then(|| i_type(double_load, SP, 0b011, rd, OP_LOAD_FP)),
        0b010 => (rd != 0).then(|| i_type(word_load, SP, 0b010, rd, OP_LOAD)),
        0b011 if rv64 => (rd != 0).then(|| i_type(double_load, SP, 0b011, rd, OP_LOAD)),
        0b011 => extensions
            .has_f()
            .then(|| i_type(word_load, SP, 0b010, rd, OP_LOAD_FP)),
        0b100 => match (high, rd, rs2) {
            (0, 0, 0) => None,
            (0, rs1, 0) => Some(i_type(0, rs1, 0b000, 0, OP_JALR)),
            (0, rd, rs2) => Some(r_type(0, rs2, 0, 0b000, rd, OP_REG)),
            (_, 0, 0) => Some(EBREAK),
            (_, rs1, 0) => Some(i_type(0, rs1, 0b000, RA, OP_JALR)),
            (_, rd, rs2) => Some(r_type(0, rs2, rd, 0b000, rd, OP_REG)),
        },
        0b101 => extensions
            .has_d()
            .then(|| s_type(double_store, rs2, SP, 0b011, OP_STORE_FP)),
        0b110 => Some(s_type(word_store, rs2, SP, 0b010, OP_STORE)),
        0b111 if rv64 => Some(s_type(double_store, rs2, SP, 0b011, OP_STORE)),
        0b111 => extensions
            .has_f()
            .then(|| s_type(word_store, rs2, SP, 0b010, OP_STORE_FP)),
        _ => None,
    }
}

/// Bits `high..=low` of `value`, right-aligned.
#[inline]
const fn bits(value: u32, high: u32, low: u32) -> u32 {
    (value >> low) & ((1 << (high - low + 1)) - 1)
}

/// One of `x8`-`x15`, from the 3-bit field at `low`.
#[inline]
const fn compact(inst: u32, low: u32) -> u32 {
    8 + bits(inst, low + 2, low)
}

/// `c.j`/`c.jal` offset, sign-extended.
fn jump_offset(inst: u32) -> u32 {
    sign_extend(
        bits(inst, 12, 12) << 11
            | bits(inst, 11, 11) << 4
            | bits(inst, 10, 9) << 8
            | bits(inst, 8, 8) << 10
            | bits(inst, 7, 7) << 6
            | bits(inst, 6, 6) << 7
            | bits(inst, 5, 3) << 1
            | bits(inst, 2, 2) << 5,
        12,
    ) as u32
}

#[inline]
const fn i_type(imm: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (imm & 0xFFF) << 20 | rs1 << 15 | funct3 << 12 | rd << 7 | opcode
}

#[inline]
const fn s_type(imm: u32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
    ((imm >> 5) & 0x7F) << 25 | rs2 << 20 | rs1 << 15 | funct3 << 12 | (imm & 0x1F) << 7 | opcode
}

#[inline]
const fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    funct7 << 25 | rs2 << 20 | rs1 << 15 | funct3 << 12 | rd << 7 | opcode
}

#[inline]
const fn b_type(offset: u32, rs2: u32, rs1: u32, funct3: u32) -> u32 {
    ((offset >> 12) & 1) << 31
        | ((offset >> 5) & 0x3F) << 25
        | rs2 << 20
        | rs1 << 15
        | funct3 << 12
        | ((offset >> 1) & 0xF) << 8
        | ((offset >> 11) & 1) << 7
        | OP_BRANCH
}

#[inline]
const fn j_type(offset: u32, rd: u32) -> u32 {
    ((offset >> 20) & 1) << 31
        | ((offset >> 1) & 0x3FF) << 21
        | ((offset >> 11) & 1) << 20
        | ((offset >> 12) & 0xFF) << 12
        | rd << 7
        | OP_JAL
}
