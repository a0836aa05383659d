//! The integer register file `x0`..`x31`.
//!
//! `x0` is hardwired to zero. `sp` and `gp` reset to the configured stack and
//! global pointers; every other register resets to zero.

use super::{Register, RegisterFile, RegisterKind};
use crate::config::Config;

/// Register x0 (zero register, always zero).
pub const ZERO: u32 = 0;
/// Register x1 (return address, ra).
pub const RA: u32 = 1;
/// Register x2 (stack pointer, sp).
pub const SP: u32 = 2;
/// Register x3 (global pointer, gp).
pub const GP: u32 = 3;
/// Register x10 (first argument/return value, a0).
pub const A0: u32 = 10;
/// Register x11 (second argument, a1).
pub const A1: u32 = 11;
/// Register x17 (environment call number, a7).
pub const A7: u32 = 17;

/// Numeric names, indexed by register number.
const NAMES: [&str; 32] = [
    "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12", "x13", "x14",
    "x15", "x16", "x17", "x18", "x19", "x20", "x21", "x22", "x23", "x24", "x25", "x26", "x27",
    "x28", "x29", "x30", "x31",
];

/// ABI names, indexed by register number. `x8` also answers to `fp`.
const ABI_NAMES: [&[&str]; 32] = [
    &["zero"],
    &["ra"],
    &["sp"],
    &["gp"],
    &["tp"],
    &["t0"],
    &["t1"],
    &["t2"],
    &["s0", "fp"],
    &["s1"],
    &["a0"],
    &["a1"],
    &["a2"],
    &["a3"],
    &["a4"],
    &["a5"],
    &["a6"],
    &["a7"],
    &["s2"],
    &["s3"],
    &["s4"],
    &["s5"],
    &["s6"],
    &["s7"],
    &["s8"],
    &["s9"],
    &["s10"],
    &["s11"],
    &["t3"],
    &["t4"],
    &["t5"],
    &["t6"],
];

/// Builds the integer register file for `config`.
pub fn integer_registers(config: &Config) -> RegisterFile {
    let xlen = config.general.xlen;
    let registers = (0..32u32)
        .map(|number| {
            let default = match number {
                SP => xlen.normalize(config.memory.stack_pointer),
                GP => xlen.normalize(config.memory.global_pointer),
                _ => 0,
            };
            let register = Register::new(NAMES[number as usize], Some(number), default)
                .with_aliases(ABI_NAMES[number as usize]);
            if number == ZERO {
                register.with_kind(RegisterKind::Hardwired)
            } else {
                register
            }
        })
        .collect();
    RegisterFile::new(Some('x'), registers)
}

/// ABI name of integer register `number` (`x8` is reported as `s0`).
pub fn abi_name(number: u32) -> &'static str {
    ABI_NAMES
        .get(number as usize)
        .and_then(|names| names.first())
        .copied()
        .unwrap_or("?")
}
