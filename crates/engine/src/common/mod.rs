//! Types shared by every layer of the engine.
//!
//! Currently this is the error vocabulary:
//! 1. **Traps:** architectural exceptions raised while executing an instruction.
//! 2. **Exceptions:** a trap annotated with the address and mnemonic that raised it.
//! 3. **Library errors:** register, instruction-set and execution-control failures.

/// Trap, exception and library error types.
pub mod error;

pub use error::{InstructionSetError, RegisterError, SimError, SimulationException, Trap};
