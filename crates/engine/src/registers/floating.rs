//! The floating-point register file `f0`..`f31`.
//!
//! Registers hold raw 64-bit images. When the D extension is enabled binary32
//! values are stored NaN-boxed; see [`crate::float::boxing`].

use super::{Register, RegisterFile};

const NAMES: [&str; 32] = [
    "f0", "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12", "f13", "f14",
    "f15", "f16", "f17", "f18", "f19", "f20", "f21", "f22", "f23", "f24", "f25", "f26", "f27",
    "f28", "f29", "f30", "f31",
];

static ABI_NAMES: [&str; 32] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7", "fs0", "fs1", "fa0", "fa1", "fa2",
    "fa3", "fa4", "fa5", "fa6", "fa7", "fs2", "fs3", "fs4", "fs5", "fs6", "fs7", "fs8", "fs9",
    "fs10", "fs11", "ft8", "ft9", "ft10", "ft11",
];

/// Builds the floating-point register file, every register reset to zero.
pub fn floating_registers() -> RegisterFile {
    let registers = (0..32usize)
        .map(|number| {
            Register::new(NAMES[number], Some(number as u32), 0)
                .with_aliases(std::slice::from_ref(&ABI_NAMES[number]))
        })
        .collect();
    RegisterFile::new(Some('f'), registers)
}
