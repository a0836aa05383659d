//! Instruction field extraction.
//!
//! [`InstructionBits`] pulls register, function and CSR fields out of a 32-bit
//! encoding; the `*_imm` functions reassemble and sign-extend the immediates of
//! the I, S, B, U and J formats.

/// Bit mask for extracting the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;

/// Bit mask for a 5-bit register field.
const REG_MASK: u32 = 0x1F;

/// Bit mask for extracting the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;

/// Bit mask for extracting the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;

/// Bit mask for extracting the CSR address field (bits 20-31).
pub const CSR_MASK: u32 = 0xFFF;

/// Field accessors for a 32-bit instruction encoding.
pub trait InstructionBits {
    /// Opcode field (bits 0-6).
    fn opcode(&self) -> u32;

    /// Destination register (bits 7-11).
    fn rd(&self) -> usize;

    /// First source register (bits 15-19).
    fn rs1(&self) -> usize;

    /// Second source register (bits 20-24).
    fn rs2(&self) -> usize;

    /// Third source register of fused multiply-add (bits 27-31).
    fn rs3(&self) -> usize;

    /// funct3 field (bits 12-14).
    fn funct3(&self) -> u32;

    /// funct7 field (bits 25-31).
    fn funct7(&self) -> u32;

    /// Floating-point rounding mode field; shares bits 12-14 with funct3.
    fn rm(&self) -> u8;

    /// CSR address (bits 20-31).
    fn csr(&self) -> u32;

    /// Shift amount of an immediate shift, `bits` wide.
    fn shamt(&self, bits: u32) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs3(&self) -> usize {
        ((self >> 27) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    #[inline(always)]
    fn rm(&self) -> u8 {
        self.funct3() as u8
    }

    #[inline(always)]
    fn csr(&self) -> u32 {
        (self >> 20) & CSR_MASK
    }

    #[inline(always)]
    fn shamt(&self, bits: u32) -> u32 {
        (self >> 20) & ((1 << bits) - 1)
    }
}

/// I-type immediate: `imm[11:0] | rs1 | funct3 | rd | opcode`.
///
/// Used for loads, `jalr`, and immediate arithmetic.
#[inline]
pub fn i_imm(inst: u32) -> i64 {
    i64::from((inst as i32) >> 20)
}

/// S-type immediate: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`.
#[inline]
pub fn s_imm(inst: u32) -> i64 {
    let low = (inst >> 7) & 0x1F;
    let high = (inst >> 25) & 0x7F;
    sign_extend((high << 5) | low, 12)
}

/// B-type immediate: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`.
///
/// Always even; the offset is relative to the branch itself.
#[inline]
pub fn b_imm(inst: u32) -> i64 {
    let bit_11 = (inst >> 7) & 1;
    let bits_4_1 = (inst >> 8) & 0xF;
    let bits_10_5 = (inst >> 25) & 0x3F;
    let bit_12 = (inst >> 31) & 1;
    sign_extend(
        (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1),
        13,
    )
}

/// U-type immediate: `imm[31:12] | rd | opcode`, already shifted into place.
#[inline]
pub fn u_imm(inst: u32) -> i64 {
    i64::from((inst & 0xFFFF_F000) as i32)
}

/// J-type immediate: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`.
#[inline]
pub fn j_imm(inst: u32) -> i64 {
    let bits_19_12 = (inst >> 12) & 0xFF;
    let bit_11 = (inst >> 20) & 1;
    let bits_10_1 = (inst >> 21) & 0x3FF;
    let bit_20 = (inst >> 31) & 1;
    sign_extend(
        (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1),
        21,
    )
}

/// Sign-extends the low `bits` of `value` to 64 bits.
#[inline]
pub fn sign_extend(value: u32, bits: u32) -> i64 {
    let shift = 32 - bits;
    i64::from(((value << shift) as i32) >> shift)
}
