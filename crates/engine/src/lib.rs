//! RISC-V instruction-set simulator core.
//!
//! This crate implements the architectural core of an educational RV32/RV64
//! simulator with the following:
//! 1. **Float:** Bit-exact software IEEE 754 binary32/binary64 arithmetic,
//!    comparisons and conversions, rounded once from an exact intermediate.
//! 2. **Registers:** Integer, floating-point and CSR files with masked, linked
//!    and read-only registers, change notices and backdoor writes.
//! 3. **ISA:** Instruction tables for I/M/F/D/Zicsr, compressed expansion, and
//!    mask-grouped instruction matching.
//! 4. **Machine:** Hart state, sparse memory, trap delivery and the undo log.
//! 5. **Simulation:** The step/run/pause/reset/backstep state machine and an
//!    execution thread.

/// Common types (traps, simulation exceptions, library errors).
pub mod common;
/// Simulator configuration (ISA width, extensions, memory layout, execution policy).
pub mod config;
/// Software floating point (exact values, formats, arithmetic, conversions).
pub mod float;
/// Instruction set (decode, tables, compressed expansion, matching).
pub mod isa;
/// Hart state (registers, memory, control flow, traps, backstep).
pub mod machine;
/// Publish/subscribe notices with per-subscriber credit.
pub mod notice;
/// Register files and register views.
pub mod registers;
/// Execution loop and execution thread.
pub mod sim;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Architectural state passed to every instruction.
pub use crate::machine::Machine;
/// Execution engine; construct with `Simulator::new`.
pub use crate::sim::Simulator;
