//! Trap and error definitions.
//!
//! Two layers of failure exist in the engine:
//! 1. **Traps:** synchronous RISC-V exceptions raised by an instruction. They are
//!    values, returned from execute callbacks and either delivered to the user
//!    trap handler or wrapped in a [`SimulationException`] that stops the run.
//! 2. **Library errors:** misuse of the engine API (writing a read-only register,
//!    building an instruction set with overlapping encodings, issuing a control
//!    command in the wrong state).
//!
//! IEEE floating-point exceptions are neither; they accrue in `fflags`.

use std::fmt;

use thiserror::Error;

/// RISC-V synchronous exception.
///
/// Each variant carries the value written to `utval` when the trap is delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Fetch from an address that is not 2- or 4-byte aligned as required.
    InstructionAddressMisaligned(u64),

    /// Fetch from outside the loaded text segment.
    InstructionAccessFault(u64),

    /// No instruction matches the encoding, the encoding uses a reserved field,
    /// or a CSR access is not permitted. Carries the encoding.
    IllegalInstruction(u32),

    /// `ebreak`. Carries the program counter of the instruction.
    Breakpoint(u64),

    /// Load from a misaligned address.
    LoadAddressMisaligned(u64),

    /// Load from an address outside the address space.
    LoadAccessFault(u64),

    /// Store to a misaligned address.
    StoreAddressMisaligned(u64),

    /// Store to an address outside the address space.
    StoreAccessFault(u64),

    /// `ecall` with no service to handle it.
    EnvironmentCallFromUMode,
}

impl Trap {
    /// Exception code written to `ucause`.
    pub const fn cause(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(_) => 0,
            Self::InstructionAccessFault(_) => 1,
            Self::IllegalInstruction(_) => 2,
            Self::Breakpoint(_) => 3,
            Self::LoadAddressMisaligned(_) => 4,
            Self::LoadAccessFault(_) => 5,
            Self::StoreAddressMisaligned(_) => 6,
            Self::StoreAccessFault(_) => 7,
            Self::EnvironmentCallFromUMode => 8,
        }
    }

    /// Trap value written to `utval`.
    pub const fn value(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(addr)
            | Self::InstructionAccessFault(addr)
            | Self::Breakpoint(addr)
            | Self::LoadAddressMisaligned(addr)
            | Self::LoadAccessFault(addr)
            | Self::StoreAddressMisaligned(addr)
            | Self::StoreAccessFault(addr) => *addr,
            Self::IllegalInstruction(inst) => *inst as u64,
            Self::EnvironmentCallFromUMode => 0,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAddressMisaligned(addr) => {
                write!(f, "InstructionAddressMisaligned({addr:#x})")
            }
            Self::InstructionAccessFault(addr) => write!(f, "InstructionAccessFault({addr:#x})"),
            Self::IllegalInstruction(inst) => write!(f, "IllegalInstruction({inst:#010x})"),
            Self::Breakpoint(pc) => write!(f, "Breakpoint({pc:#x})"),
            Self::LoadAddressMisaligned(addr) => write!(f, "LoadAddressMisaligned({addr:#x})"),
            Self::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Self::StoreAddressMisaligned(addr) => write!(f, "StoreAddressMisaligned({addr:#x})"),
            Self::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
            Self::EnvironmentCallFromUMode => write!(f, "EnvironmentCallFromUMode"),
        }
    }
}

impl std::error::Error for Trap {}

/// A trap that ended the simulation, with the context needed to report it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationException {
    /// The trap that was raised.
    pub trap: Trap,
    /// Address of the instruction that raised it.
    pub pc: u64,
    /// Mnemonic of that instruction, when it was decoded.
    pub mnemonic: Option<&'static str>,
}

impl fmt::Display for SimulationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at pc {:#x}", self.trap, self.pc)?;
        if let Some(mnemonic) = self.mnemonic {
            write!(f, " ({mnemonic})")?;
        }
        Ok(())
    }
}

impl std::error::Error for SimulationException {}

/// Register file misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// Ordinary write to a register that only accepts backdoor writes.
    #[error("register `{0}` is read-only")]
    ReadOnly(&'static str),
    /// Name or number does not resolve to a register.
    #[error("no register named `{0}`")]
    Unknown(String),
}

/// Instruction set construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionSetError {
    /// Two enabled instructions accept a common encoding.
    #[error("`{first}` and `{second}` both match encoding {witness:#010x}")]
    Overlap {
        /// Mnemonic of the instruction registered first.
        first: &'static str,
        /// Mnemonic of the instruction registered second.
        second: &'static str,
        /// An encoding accepted by both.
        witness: u32,
    },
    /// An entry whose match value has bits outside its mask.
    #[error("`{0}` has match bits outside its mask")]
    MalformedEntry(&'static str),
}

/// Failure of the execution-control API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The requested operation is not valid in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// What was requested.
        operation: &'static str,
        /// Display form of the state the simulator was in.
        state: String,
    },
    /// `backstep` with an empty undo log.
    #[error("no executed instruction to step back over")]
    NothingToUndo,
    /// The program does not fit its segment.
    #[error("program of {size} bytes does not fit at {base:#x}")]
    ProgramTooLarge {
        /// Requested load address.
        base: u64,
        /// Image size in bytes.
        size: usize,
    },
    /// The execution thread has exited.
    #[error("execution thread is gone")]
    Disconnected,
    /// A trap stopped the simulation.
    #[error(transparent)]
    Exception(#[from] SimulationException),
    /// Register access failed.
    #[error(transparent)]
    Register(#[from] RegisterError),
    /// The instruction set could not be built.
    #[error(transparent)]
    InstructionSet(#[from] InstructionSetError),
}
