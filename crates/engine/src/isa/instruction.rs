//! Instruction records.
//!
//! A [`BasicInstruction`] is one row of an instruction table: its mnemonic,
//! operand format, the `(mask, match)` pair that recognises its encodings, and
//! the function that executes it against a [`Machine`]. Tables are plain
//! `static` arrays built with `const` constructors, one per extension.
//!
//! [`ExtendedInstruction`]s are assembler pseudo-instructions. They never
//! execute; they exist so that mnemonic lookup covers what a user can type.

use std::fmt;

use crate::common::Trap;
use crate::machine::Machine;

/// Executes one decoded instruction. The PC already points past it.
pub type Execute = fn(&mut Machine, u32) -> Result<(), Trap>;

/// Operand layout of an encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// `rd, rs1, rs2`.
    R,
    /// `rd, rs1, rs2, rs3` (fused multiply-add).
    R4,
    /// `rd, rs1, imm` or `rd, imm(rs1)`.
    I,
    /// `rs2, imm(rs1)`.
    S,
    /// `rs1, rs2, label`.
    B,
    /// `rd, imm`.
    U,
    /// `rd, label`.
    J,
    /// No operands.
    None,
}

/// Extension that contributes an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Base integer set.
    I,
    /// Integer multiply/divide.
    M,
    /// Single-precision floating point.
    F,
    /// Double-precision floating point.
    D,
    /// CSR access.
    Zicsr,
    /// Instruction-fetch fence.
    Zifencei,
    /// User-level trap return.
    N,
}

/// Register widths an instruction exists for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Availability {
    /// RV32 and RV64.
    Both,
    /// RV32 only (e.g. the 5-bit shift-immediate encodings).
    Rv32Only,
    /// RV64 only (e.g. `addw`, `ld`).
    Rv64Only,
}

/// One executable instruction.
#[derive(Clone, Copy)]
pub struct BasicInstruction {
    /// Lower-case mnemonic.
    pub mnemonic: &'static str,
    /// Operand layout.
    pub format: Format,
    /// Bits that identify the instruction.
    pub mask: u32,
    /// Value of the identifying bits.
    pub matches: u32,
    /// One-line description for listings.
    pub description: &'static str,
    /// Contributing extension.
    pub extension: Extension,
    /// Register widths it exists for.
    pub availability: Availability,
    /// Semantics.
    pub execute: Execute,
}

impl BasicInstruction {
    /// Table row available on both widths.
    pub const fn new(
        mnemonic: &'static str,
        format: Format,
        mask: u32,
        matches: u32,
        extension: Extension,
        description: &'static str,
        execute: Execute,
    ) -> Self {
        Self {
            mnemonic,
            format,
            mask,
            matches,
            description,
            extension,
            availability: Availability::Both,
            execute,
        }
    }

    /// Restricts the row to one register width.
    pub const fn only(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Returns true if `word` is an encoding of this instruction.
    #[inline]
    pub const fn accepts(&self, word: u32) -> bool {
        word & self.mask == self.matches
    }

    /// Number of identifying bits; more bits means more specific.
    pub const fn specificity(&self) -> u32 {
        self.mask.count_ones()
    }
}

impl fmt::Debug for BasicInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicInstruction")
            .field("mnemonic", &self.mnemonic)
            .field("format", &self.format)
            .field("mask", &format_args!("{:#010x}", self.mask))
            .field("matches", &format_args!("{:#010x}", self.matches))
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

/// An assembler pseudo-instruction and its expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtendedInstruction {
    /// Lower-case mnemonic.
    pub mnemonic: &'static str,
    /// Example operand syntax, e.g. `li t1,-100`.
    pub example: &'static str,
    /// Basic instructions it expands to, in template syntax.
    pub expansion: &'static [&'static str],
    /// One-line description for listings.
    pub description: &'static str,
}

/// Result of a mnemonic lookup.
#[derive(Clone, Copy, Debug)]
pub enum Operator<'a> {
    /// A table instruction.
    Basic(&'a BasicInstruction),
    /// A pseudo-instruction.
    Extended(&'a ExtendedInstruction),
}

impl Operator<'_> {
    /// Mnemonic of either kind.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Basic(instruction) => instruction.mnemonic,
            Self::Extended(instruction) => instruction.mnemonic,
        }
    }

    /// Description of either kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Basic(instruction) => instruction.description,
            Self::Extended(instruction) => instruction.description,
        }
    }
}
