//! Rounding environment: rounding mode plus accrued exception flags.
//!
//! RISC-V defines five rounding modes (`frm`, unprivileged spec §11.2):
//!
//! | Value | Mode | Description                             |
//! |-------|------|-----------------------------------------|
//! | 0b000 | RNE  | Round to Nearest, ties to Even          |
//! | 0b001 | RTZ  | Round towards Zero                      |
//! | 0b010 | RDN  | Round Down (towards −∞)                 |
//! | 0b011 | RUP  | Round Up (towards +∞)                   |
//! | 0b100 | RMM  | Round to Nearest, ties to Max Magnitude |
//!
//! and five accrued exception flags (`fflags`):
//!
//! | Bit | Flag | Description         |
//! |-----|------|---------------------|
//! |  4  | NV   | Invalid Operation   |
//! |  3  | DZ   | Divide by Zero      |
//! |  2  | OF   | Overflow            |
//! |  1  | UF   | Underflow           |
//! |  0  | NX   | Inexact             |
//!
//! An [`Environment`] is threaded by `&mut` through every float operation. Flags
//! are only ever added during an operation; the caller clears them between
//! independent operations.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// IEEE 754 rounding direction, encoded as in `frm`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundingMode {
    /// Round to Nearest, ties to Even (default IEEE mode).
    #[default]
    Rne = 0b000,
    /// Round towards Zero.
    Rtz = 0b001,
    /// Round Down (towards −∞).
    Rdn = 0b010,
    /// Round Up (towards +∞).
    Rup = 0b011,
    /// Round to Nearest, ties to Max Magnitude (away from zero).
    Rmm = 0b100,
}

impl RoundingMode {
    /// Decodes a 3-bit rounding mode field from an instruction or `frm`.
    ///
    /// Returns `None` for reserved encodings (0b101, 0b110) and the dynamic
    /// sentinel (0b111), which must be resolved to `frm` by the caller.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x7 {
            0b000 => Some(Self::Rne),
            0b001 => Some(Self::Rtz),
            0b010 => Some(Self::Rdn),
            0b011 => Some(Self::Rup),
            0b100 => Some(Self::Rmm),
            _ => None,
        }
    }

    /// Returns the 3-bit `frm` encoding of this mode.
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Floating-point exception flags (RISC-V `fflags`).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    /// No exceptions raised.
    pub const NONE: Self = Self(0);
    /// Invalid Operation.
    pub const INVALID: Self = Self(1 << 4);
    /// Divide by Zero.
    pub const DIVIDE_BY_ZERO: Self = Self(1 << 3);
    /// Overflow.
    pub const OVERFLOW: Self = Self(1 << 2);
    /// Underflow.
    pub const UNDERFLOW: Self = Self(1 << 1);
    /// Inexact.
    pub const INEXACT: Self = Self(1 << 0);

    /// Builds a flag set from the low five bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    /// Returns the raw 5-bit flag value for writing into `fflags`.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 5] = [
            (Flags::INVALID, "NV"),
            (Flags::DIVIDE_BY_ZERO, "DZ"),
            (Flags::OVERFLOW, "OF"),
            (Flags::UNDERFLOW, "UF"),
            (Flags::INEXACT, "NX"),
        ];
        let mut list = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                let _ = list.entry(&format_args!("{name}"));
            }
        }
        list.finish()
    }
}

/// Rounding mode and accrued flags for a chain of float operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    /// Rounding direction applied by every rounding step.
    pub mode: RoundingMode,
    /// Exceptions raised so far.
    pub flags: Flags,
}

impl Environment {
    /// Creates an environment with the given mode and no flags raised.
    pub fn new(mode: RoundingMode) -> Self {
        Self {
            mode,
            flags: Flags::NONE,
        }
    }

    /// Raises `flags` in addition to those already set.
    #[inline]
    pub fn raise(&mut self, flags: Flags) {
        self.flags |= flags;
    }

    /// Returns true if the `invalid` flag has been raised.
    pub fn invalid(&self) -> bool {
        self.flags.contains(Flags::INVALID)
    }

    /// Returns true if the `inexact` flag has been raised.
    pub fn inexact(&self) -> bool {
        self.flags.contains(Flags::INEXACT)
    }

    /// Returns true if the `overflow` flag has been raised.
    pub fn overflow(&self) -> bool {
        self.flags.contains(Flags::OVERFLOW)
    }

    /// Returns true if the `underflow` flag has been raised.
    pub fn underflow(&self) -> bool {
        self.flags.contains(Flags::UNDERFLOW)
    }

    /// Returns true if the `divide_by_zero` flag has been raised.
    pub fn divide_by_zero(&self) -> bool {
        self.flags.contains(Flags::DIVIDE_BY_ZERO)
    }
}
