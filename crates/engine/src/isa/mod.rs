//! Instruction Set Architecture definitions.
//!
//! This module holds everything needed to turn an instruction word into an
//! effect on a [`Machine`](crate::machine::Machine):
//! 1. **Decoding:** bit-field accessors and immediate reconstruction.
//! 2. **Tables:** one static table per extension, each row carrying its
//!    `(mask, match)` pair and execute function.
//! 3. **Compressed:** expansion of 16-bit parcels to 32-bit encodings.
//! 4. **Matching:** the configured [`InstructionSet`] and its mask groups.

/// Instruction field accessors and immediates.
pub mod decode;

/// Table rows and pseudo-instruction records.
pub mod instruction;

/// Assembler pseudo-instructions.
pub mod pseudo;

/// Double-precision floating point.
pub mod rv32d;

/// Single-precision floating point.
pub mod rv32f;

/// Base integer instructions.
pub mod rv32i;

/// Integer multiply and divide.
pub mod rv32m;

/// Compressed instruction expansion.
pub mod rvc;

/// Instruction matching.
pub mod set;

/// System and CSR instructions.
pub mod system;

pub use self::instruction::{
    Availability, BasicInstruction, Execute, ExtendedInstruction, Extension, Format, Operator,
};
pub use self::set::{InstructionSet, MatchMap};
