//! # Unit Components
//!
//! Tests organised by engine layer, from the float core up to the execution
//! thread.




/// Instruction matching, semantics and compressed expansion.
pub mod isa;

/// Hart state: memory, control flow, traps and the undo log.
pub mod machine;
