//! Configuration for the simulation engine.
//!
//! This module defines the structures used to parameterize a simulation. It provides:
//! 1. **Defaults:** The conventional RARS-compatible memory layout.
//! 2. **Structures:** General (ISA width, extensions, tracing), memory layout, and execution policy.
//! 3. **Parsing:** JSON input via [`Config::from_json`]; every field may be omitted.
//!
//! Embedders that do not need external configuration use `Config::default()`.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants.
mod defaults {
    /// Start of the text segment.
    pub const TEXT_BASE: u64 = 0x0040_0000;

    /// Start of the static data segment.
    pub const DATA_BASE: u64 = 0x1001_0000;

    /// Initial stack pointer (`sp`).
    pub const STACK_POINTER: u64 = 0x7fff_effc;

    /// Initial global pointer (`gp`), the middle of the first 64 KiB of data.
    pub const GLOBAL_POINTER: u64 = 0x1000_8000;

    /// Executed instructions kept in the undo log.
    pub const BACKSTEP_CAPACITY: usize = 2000;
}

/// Configuration could not be parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input is not valid configuration JSON.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Integer register width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Xlen {
    /// 32-bit registers (RV32).
    #[default]
    #[serde(alias = "RV32", alias = "32")]
    Rv32,
    /// 64-bit registers (RV64).
    #[serde(alias = "RV64", alias = "64")]
    Rv64,
}

impl Xlen {
    /// Register width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }

    /// Mask of the architecturally visible register bits.
    pub const fn mask(self) -> u64 {
        match self {
            Self::Rv32 => 0xFFFF_FFFF,
            Self::Rv64 => u64::MAX,
        }
    }

    /// Canonical register image: RV32 values are kept sign-extended from bit 31.
    #[inline]
    pub const fn normalize(self, value: u64) -> u64 {
        match self {
            Self::Rv32 => value as u32 as i32 as i64 as u64,
            Self::Rv64 => value,
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use rvisa_engine::config::{Config, Xlen};
///
/// let config = Config::from_json(r#"{
///     "general": { "xlen": "Rv64", "extensions": { "c": true } },
///     "execution": { "backstep_capacity": 0 }
/// }"#).unwrap();
/// assert_eq!(config.general.xlen, Xlen::Rv64);
/// assert!(config.general.extensions.c);
/// assert!(config.general.extensions.d);
/// assert_eq!(config.execution.backstep_capacity, 0);
/// assert_eq!(config.memory.text_base, 0x0040_0000);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// ISA selection and tracing.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory layout.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Execution policy.
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl Config {
    /// Parses a JSON configuration; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Default configuration for a 64-bit machine.
    pub fn rv64() -> Self {
        let mut config = Self::default();
        config.general.xlen = Xlen::Rv64;
        config
    }
}

/// Enabled standard extensions beyond the base integer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Extensions {
    /// Integer multiply/divide.
    pub m: bool,
    /// Single-precision floating point.
    pub f: bool,
    /// Double-precision floating point. Implies `f`.
    pub d: bool,
    /// Compressed instructions.
    pub c: bool,
}

impl Extensions {
    /// Single-precision instructions are available (F, or D which implies it).
    pub const fn has_f(&self) -> bool {
        self.f || self.d
    }

    /// Floating-point registers are 64 bits wide and hold NaN-boxed singles.
    pub const fn has_d(&self) -> bool {
        self.d
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            m: true,
            f: true,
            d: true,
            c: false,
        }
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Register width.
    #[serde(default)]
    pub xlen: Xlen,

    /// Enabled extensions.
    #[serde(default)]
    pub extensions: Extensions,

    /// Emit a `trace` event for every executed instruction.
    #[serde(default)]
    pub trace_instructions: bool,
}

/// Memory layout.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Load address of the program text; the initial PC.
    #[serde(default = "MemoryConfig::default_text_base")]
    pub text_base: u64,

    /// Load address of the static data.
    #[serde(default = "MemoryConfig::default_data_base")]
    pub data_base: u64,

    /// Reset value of `sp`.
    #[serde(default = "MemoryConfig::default_stack_pointer")]
    pub stack_pointer: u64,

    /// Reset value of `gp`.
    #[serde(default = "MemoryConfig::default_global_pointer")]
    pub global_pointer: u64,

    /// Bytes of addressable memory starting at address 0. Loads and stores
    /// reaching past it raise access faults. Absent means the whole address
    /// space.
    #[serde(default)]
    pub size: Option<u64>,
}

impl MemoryConfig {
    fn default_text_base() -> u64 {
        defaults::TEXT_BASE
    }

    fn default_data_base() -> u64 {
        defaults::DATA_BASE
    }

    fn default_stack_pointer() -> u64 {
        defaults::STACK_POINTER
    }

    fn default_global_pointer() -> u64 {
        defaults::GLOBAL_POINTER
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            text_base: defaults::TEXT_BASE,
            data_base: defaults::DATA_BASE,
            stack_pointer: defaults::STACK_POINTER,
            global_pointer: defaults::GLOBAL_POINTER,
            size: None,
        }
    }
}

/// Execution policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Executed instructions retained for `backstep`; 0 disables the undo log.
    #[serde(default = "ExecutionConfig::default_backstep_capacity")]
    pub backstep_capacity: usize,

    /// Step budget applied by `run` when the caller passes none.
    #[serde(default)]
    pub max_steps: Option<u64>,

    /// Deliver traps to `utvec` when user interrupts are enabled, instead of
    /// stopping the simulation.
    #[serde(default = "ExecutionConfig::default_trap_handling")]
    pub trap_handling: bool,
}

impl ExecutionConfig {
    fn default_backstep_capacity() -> usize {
        defaults::BACKSTEP_CAPACITY
    }

    fn default_trap_handling() -> bool {
        true
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            backstep_capacity: defaults::BACKSTEP_CAPACITY,
            max_steps: None,
            trap_handling: true,
        }
    }
}
