

/// Trap delivery, `uret`, and environment calls.
pub mod traps;
