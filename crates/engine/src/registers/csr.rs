//! Control and status registers.
//!
//! This module defines the user-level CSR space of the simulated hart. It provides:
//! 1. **Address Definitions:** Constants for the user trap setup/handling CSRs,
//!    the floating-point CSRs, and the counters.
//! 2. **Field Masks:** `ustatus` enable bits and the `fcsr` field layout.
//! 3. **Register File:** [`csr_registers`], which wires `fflags` and `frm` as
//!    views of `fcsr` and makes the counters read-only.

use super::{Register, RegisterFile, RegisterId, RegisterKind};
use crate::config::{Config, Xlen};

/// User status register CSR address.
pub const USTATUS: u32 = 0x000;

/// Floating-point accrued exceptions CSR address (view of `fcsr[4:0]`).
pub const FFLAGS: u32 = 0x001;

/// Floating-point dynamic rounding mode CSR address (view of `fcsr[7:5]`).
pub const FRM: u32 = 0x002;

/// Floating-point control and status register CSR address.
pub const FCSR: u32 = 0x003;

/// User interrupt enable register CSR address.
pub const UIE: u32 = 0x004;

/// User trap vector base address CSR address.
pub const UTVEC: u32 = 0x005;

/// User scratch register CSR address.
pub const USCRATCH: u32 = 0x040;

/// User exception program counter CSR address.
pub const UEPC: u32 = 0x041;

/// User trap cause CSR address.
pub const UCAUSE: u32 = 0x042;

/// User trap value CSR address.
pub const UTVAL: u32 = 0x043;

/// User interrupt pending CSR address.
pub const UIP: u32 = 0x044;

/// Cycle counter CSR address.
pub const CYCLE: u32 = 0xC00;

/// Wall-clock timer CSR address.
pub const TIME: u32 = 0xC01;

/// Instructions-retired counter CSR address.
pub const INSTRET: u32 = 0xC02;

/// Upper half of `cycle` (RV32 only).
pub const CYCLEH: u32 = 0xC80;

/// Upper half of `time` (RV32 only).
pub const TIMEH: u32 = 0xC81;

/// Upper half of `instret` (RV32 only).
pub const INSTRETH: u32 = 0xC82;

/// `ustatus.UIE`: user interrupts (and trap delivery) enabled.
pub const USTATUS_UIE: u64 = 1 << 0;

/// `ustatus.UPIE`: `UIE` before the current trap was taken.
pub const USTATUS_UPIE: u64 = 1 << 4;

/// `fflags` field of `fcsr`.
pub const FCSR_FFLAGS_MASK: u64 = 0x1F;

/// Position of the `frm` field in `fcsr`.
pub const FCSR_FRM_SHIFT: u32 = 5;

/// `frm` field mask, right-aligned.
pub const FCSR_FRM_MASK: u64 = 0x7;

/// Builds the CSR file.
///
/// The RV32 `*h` counter halves are present only for [`Xlen::Rv32`].
pub fn csr_registers(config: &Config) -> RegisterFile {
    let mut registers = vec![
        Register::new("ustatus", Some(USTATUS), 0).with_kind(RegisterKind::Masked {
            fixed: !(USTATUS_UIE | USTATUS_UPIE),
        }),
        Register::new("fcsr", Some(FCSR), 0).with_kind(RegisterKind::Masked { fixed: !0xFF }),
    ];
    let fcsr = RegisterId(registers.len() - 1);
    registers.extend([
        Register::new("fflags", Some(FFLAGS), 0).with_kind(RegisterKind::Linked {
            backing: fcsr,
            mask: FCSR_FFLAGS_MASK,
            shift: 0,
        }),
        Register::new("frm", Some(FRM), 0).with_kind(RegisterKind::Linked {
            backing: fcsr,
            mask: FCSR_FRM_MASK,
            shift: FCSR_FRM_SHIFT,
        }),
        Register::new("uie", Some(UIE), 0),
        Register::new("utvec", Some(UTVEC), 0),
        Register::new("uscratch", Some(USCRATCH), 0),
        Register::new("uepc", Some(UEPC), 0),
        Register::new("ucause", Some(UCAUSE), 0),
        Register::new("utval", Some(UTVAL), 0),
        Register::new("uip", Some(UIP), 0),
        Register::new("cycle", Some(CYCLE), 0).with_kind(RegisterKind::ReadOnly),
        Register::new("time", Some(TIME), 0).with_kind(RegisterKind::ReadOnly),
        Register::new("instret", Some(INSTRET), 0).with_kind(RegisterKind::ReadOnly),
    ]);
    if config.general.xlen == Xlen::Rv32 {
        registers.extend([
            Register::new("cycleh", Some(CYCLEH), 0).with_kind(RegisterKind::ReadOnly),
            Register::new("timeh", Some(TIMEH), 0).with_kind(RegisterKind::ReadOnly),
            Register::new("instreth", Some(INSTRETH), 0).with_kind(RegisterKind::ReadOnly),
        ]);
    }
    RegisterFile::new(None, registers)
}

/// Returns true if `number` encodes a read-only CSR (bits 11:10 are `11`).
pub const fn is_read_only_address(number: u32) -> bool {
    (number >> 10) & 0b11 == 0b11
}
