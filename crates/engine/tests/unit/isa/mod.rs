
/// Compressed programs.
pub mod rvc;
