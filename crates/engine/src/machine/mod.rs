//! Architectural state of one simulated hart.
//!
//! The [`Machine`] is the explicit simulation context: configuration, the three
//! register files, the program counter, memory, and the undo log. Instruction
//! callbacks receive it by `&mut` and use:
//! 1. **Register access:** notifying writes that are also logged for backstep,
//!    plus silent backdoor writes for state restoration.
//! 2. **Memory access:** aligned little-endian loads and logged stores.
//! 3. **Control flow:** [`Machine::process_branch`], [`Machine::process_jump`],
//!    and [`Machine::process_return_address`]. The PC already points past the
//!    executing instruction when its callback runs.
//! 4. **Traps:** user-mode delivery through `utvec` and `uret`.

/// Bounded undo log.
pub mod backstep;

/// Sparse byte-addressable memory.
pub mod memory;

use std::fmt;

use tracing::debug;

use self::backstep::{Backstep, Bank, Change};
use self::memory::{Memory, Width};
use crate::common::{RegisterError, Trap};
use crate::config::{Config, Xlen};
use crate::float::{Flags, RegisterImage, RoundingMode};
use crate::registers::csr::{self, csr_registers};
use crate::registers::floating::floating_registers;
use crate::registers::integer::{self, integer_registers};
use crate::registers::{RegisterFile, RegisterId};

/// Service handler for `ecall`s the engine does not implement itself.
///
/// The core only knows the exit services (`a7 = 10` and `a7 = 93`). Anything
/// else is offered to the installed handler, which reads its arguments from and
/// writes its results to the machine's registers.
pub trait EcallHandler: Send {
    /// Handles service `service`. Returns `Ok(false)` for an unknown service,
    /// which becomes an environment-call trap.
    fn handle(&mut self, service: u64, machine: &mut Machine) -> Result<bool, Trap>;
}

/// Service number that exits with code 0.
const ECALL_EXIT: u64 = 10;

/// Service number that exits with the code in `a0`.
const ECALL_EXIT2: u64 = 93;

/// State of one hart.
pub struct Machine {
    config: Config,
    xlen: Xlen,
    integer: RegisterFile,
    floating: RegisterFile,
    csr: RegisterFile,
    pc: u64,
    instruction_length: u64,
    memory: Memory,
    undo: Backstep,
    cycles: u64,
    retired: u64,
    exit_code: Option<i32>,
    ecall_handler: Option<Box<dyn EcallHandler>>,
}

impl Machine {
    /// Creates a machine in its reset state with empty memory.
    pub fn new(config: &Config) -> Self {
        let mut machine = Self {
            config: config.clone(),
            xlen: config.general.xlen,
            integer: integer_registers(config),
            floating: floating_registers(),
            csr: csr_registers(config),
            pc: config.memory.text_base,
            instruction_length: 4,
            memory: Memory::new(),
            undo: Backstep::new(config.execution.backstep_capacity),
            cycles: 0,
            retired: 0,
            exit_code: None,
            ecall_handler: None,
        };
        machine.sync_counters();
        machine
    }

    /// Configuration the machine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register width.
    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    /// Program counter. Inside an instruction callback this is the address of
    /// the next sequential instruction.
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Moves the PC without logging; for loaders and debuggers.
    pub fn set_pc(&mut self, pc: u64) {
        self.pc = self.xlen.normalize(pc);
    }

    /// Length in bytes of the executing instruction (2 or 4).
    pub fn instruction_length(&self) -> u64 {
        self.instruction_length
    }

    pub(crate) fn set_instruction_length(&mut self, length: u64) {
        self.instruction_length = length;
    }

    /// Integer register file, for listeners and name lookup.
    pub fn integer_registers(&self) -> &RegisterFile {
        &self.integer
    }

    /// Floating-point register file.
    pub fn floating_registers(&self) -> &RegisterFile {
        &self.floating
    }

    /// Control and status register file.
    pub fn csr_registers(&self) -> &RegisterFile {
        &self.csr
    }

    /// Backing memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Backing memory for unlogged edits (program loading, debugger pokes).
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Cycles executed since reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Instructions retired since reset.
    pub fn retired(&self) -> u64 {
        self.retired
    }

    // Integer registers.

    /// Reads `x{reg}`.
    #[inline]
    pub fn x(&self, reg: usize) -> u64 {
        self.integer.value(RegisterId(reg))
    }

    /// Writes `x{reg}`, sign-extending on RV32. Writes to `x0` are discarded.
    pub fn set_x(&mut self, reg: usize, value: u64) {
        if reg == integer::ZERO as usize {
            return;
        }
        let id = RegisterId(reg);
        if let Ok(previous) = self.integer.update(id, self.xlen.normalize(value)) {
            self.undo.record(Change::Register {
                bank: Bank::Integer,
                id,
                previous,
            });
        }
    }

    // Floating-point registers.

    /// Raw image of `f{reg}`.
    #[inline]
    pub fn f_raw(&self, reg: usize) -> u64 {
        self.floating.value(RegisterId(reg))
    }

    /// Writes the raw image of `f{reg}`.
    pub fn set_f_raw(&mut self, reg: usize, raw: u64) {
        let id = RegisterId(reg);
        if let Ok(previous) = self.floating.update(id, raw) {
            self.undo.record(Change::Register {
                bank: Bank::Floating,
                id,
                previous,
            });
        }
    }

    /// Reads `f{reg}` as format `F`, unboxing binary32 values when registers
    /// are 64 bits wide.
    pub fn f<F: RegisterImage>(&self, reg: usize) -> F {
        F::from_register(self.f_raw(reg), self.config.general.extensions.has_d())
    }

    /// Writes `f{reg}` in format `F`, NaN-boxing binary32 values when needed.
    pub fn set_f<F: RegisterImage>(&mut self, reg: usize, value: F) {
        let raw = value.to_register(self.config.general.extensions.has_d());
        self.set_f_raw(reg, raw);
    }

    // CSRs.

    /// Reads CSR `number`; `None` if it does not exist.
    pub fn csr(&self, number: u32) -> Option<u64> {
        self.csr.register_by_number(number).map(|id| self.csr.value(id))
    }

    /// Ordinary CSR write, logged and notifying. Returns the previous value.
    ///
    /// Fails for unknown CSRs and for the read-only address range.
    pub fn set_csr(&mut self, number: u32, value: u64) -> Result<u64, RegisterError> {
        let id = self
            .csr
            .register_by_number(number)
            .ok_or_else(|| RegisterError::Unknown(format!("csr {number:#05x}")))?;
        if csr::is_read_only_address(number) {
            return Err(RegisterError::ReadOnly(self.csr.get(id).name()));
        }
        let previous = self.csr.update(id, self.xlen.normalize(value))?;
        self.undo.record(Change::Register {
            bank: Bank::Csr,
            id,
            previous,
        });
        Ok(previous)
    }

    /// Resolves an instruction's `rm` field. `7` selects `frm`; reserved
    /// encodings and a reserved `frm` give `None`.
    pub fn rounding_mode(&self, rm: u8) -> Option<RoundingMode> {
        if rm == 0b111 {
            let frm = self.csr(csr::FRM).unwrap_or(0);
            RoundingMode::from_bits(frm as u8)
        } else {
            RoundingMode::from_bits(rm)
        }
    }

    /// ORs IEEE exception flags into `fflags`.
    pub fn accrue_flags(&mut self, flags: Flags) {
        if flags.is_empty() {
            return;
        }
        let current = self.csr(csr::FFLAGS).unwrap_or(0);
        let _ = self.set_csr(csr::FFLAGS, current | u64::from(flags.bits()));
    }

    // Named access for collaborators.

    /// Reads any register by name (`x5`, `t0`, `fa0`, `fcsr`, ...).
    pub fn register_value(&self, name: &str) -> Result<u64, RegisterError> {
        let (bank, id) = self.lookup(name)?;
        Ok(self.file(bank).value(id))
    }

    /// Ordinary write by name, logged and notifying. Returns the previous value.
    pub fn set_register(&mut self, name: &str, value: u64) -> Result<u64, RegisterError> {
        let (bank, id) = self.lookup(name)?;
        let value = match bank {
            Bank::Floating => value,
            Bank::Integer | Bank::Csr => self.xlen.normalize(value),
        };
        let previous = self.file_mut(bank).update(id, value)?;
        self.undo.record(Change::Register { bank, id, previous });
        Ok(previous)
    }

    /// Backdoor write by name: no read-only check, no notification, no undo.
    pub fn set_register_backdoor(&mut self, name: &str, value: u64) -> Result<u64, RegisterError> {
        let (bank, id) = self.lookup(name)?;
        Ok(self.file_mut(bank).update_backdoor(id, value))
    }

    fn lookup(&self, name: &str) -> Result<(Bank, RegisterId), RegisterError> {
        [Bank::Integer, Bank::Floating, Bank::Csr]
            .into_iter()
            .find_map(|bank| self.file(bank).register_by_name(name).map(|id| (bank, id)))
            .ok_or_else(|| RegisterError::Unknown(name.to_owned()))
    }

    fn file(&self, bank: Bank) -> &RegisterFile {
        match bank {
            Bank::Integer => &self.integer,
            Bank::Floating => &self.floating,
            Bank::Csr => &self.csr,
        }
    }

    fn file_mut(&mut self, bank: Bank) -> &mut RegisterFile {
        match bank {
            Bank::Integer => &mut self.integer,
            Bank::Floating => &mut self.floating,
            Bank::Csr => &mut self.csr,
        }
    }

    // Memory.

    /// Loads `width` bytes, zero-extended. The address is truncated to XLEN.
    pub fn load(&self, address: u64, width: Width) -> Result<u64, Trap> {
        let address = address & self.xlen.mask();
        if !width.is_aligned(address) {
            return Err(Trap::LoadAddressMisaligned(address));
        }
        if !self.is_mapped(address, width) {
            return Err(Trap::LoadAccessFault(address));
        }
        Ok(self.memory.read(address, width))
    }

    /// Stores the low `width` bytes of `value`, logging the overwritten bytes.
    pub fn store(&mut self, address: u64, width: Width, value: u64) -> Result<(), Trap> {
        let address = address & self.xlen.mask();
        if !width.is_aligned(address) {
            return Err(Trap::StoreAddressMisaligned(address));
        }
        if !self.is_mapped(address, width) {
            return Err(Trap::StoreAccessFault(address));
        }
        let previous = self.memory.write(address, width, value);
        self.undo.record(Change::Memory {
            address,
            width,
            previous,
        });
        Ok(())
    }

    /// Returns true if the whole access lies inside `memory.size`.
    fn is_mapped(&self, address: u64, width: Width) -> bool {
        self.config.memory.size.is_none_or(|size| {
            address
                .checked_add(width.bytes())
                .is_some_and(|end| end <= size)
        })
    }

    // Control flow.

    /// PC-relative transfer: `PC + displacement - instruction length`, undoing
    /// the advance already applied by fetch.
    pub fn process_branch(&mut self, displacement: i64) {
        let target = self
            .pc
            .wrapping_add(displacement as u64)
            .wrapping_sub(self.instruction_length);
        self.pc = self.xlen.normalize(target);
    }

    /// Absolute transfer to `target`.
    pub fn process_jump(&mut self, target: u64) {
        self.pc = self.xlen.normalize(target);
    }

    /// Writes the current PC (the return address) to `x{rd}`.
    pub fn process_return_address(&mut self, rd: usize) {
        self.set_x(rd, self.pc);
    }

    // Environment calls and exit.

    /// Installs the handler for services beyond exit.
    pub fn set_ecall_handler(&mut self, handler: Box<dyn EcallHandler>) {
        self.ecall_handler = Some(handler);
    }

    /// Removes the installed handler.
    pub fn take_ecall_handler(&mut self) -> Option<Box<dyn EcallHandler>> {
        self.ecall_handler.take()
    }

    /// Dispatches an `ecall` on the service number in `a7`.
    pub fn environment_call(&mut self) -> Result<(), Trap> {
        let service = self.x(integer::A7 as usize);
        match service {
            ECALL_EXIT => {
                self.request_exit(0);
                Ok(())
            }
            ECALL_EXIT2 => {
                let code = self.x(integer::A0 as usize) as i32;
                self.request_exit(code);
                Ok(())
            }
            _ => {
                let Some(mut handler) = self.ecall_handler.take() else {
                    return Err(Trap::EnvironmentCallFromUMode);
                };
                let handled = handler.handle(service, self);
                self.ecall_handler = Some(handler);
                if handled? {
                    Ok(())
                } else {
                    Err(Trap::EnvironmentCallFromUMode)
                }
            }
        }
    }

    /// Asks the execution loop to stop with `code` after this instruction.
    pub fn request_exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    /// Consumes a pending exit request.
    pub fn take_exit(&mut self) -> Option<i32> {
        self.exit_code.take()
    }

    // Traps.

    /// Delivers `trap`, raised by the instruction at `pc`, to the user trap
    /// handler. Returns `false` (and changes nothing) when trap handling is off,
    /// `ustatus.UIE` is clear, or `utvec` is zero.
    pub fn deliver_trap(&mut self, trap: &Trap, pc: u64) -> bool {
        if !self.config.execution.trap_handling {
            return false;
        }
        let status = self.csr(csr::USTATUS).unwrap_or(0);
        let vector = self.csr(csr::UTVEC).unwrap_or(0);
        if status & csr::USTATUS_UIE == 0 || vector == 0 {
            return false;
        }
        let _ = self.set_csr(csr::UEPC, pc);
        let _ = self.set_csr(csr::UCAUSE, trap.cause());
        let _ = self.set_csr(csr::UTVAL, trap.value());
        let _ = self.set_csr(
            csr::USTATUS,
            (status & !csr::USTATUS_UIE) | csr::USTATUS_UPIE,
        );
        self.process_jump(vector & !0b11);
        debug!(cause = trap.cause(), pc, handler = self.pc, "trap delivered");
        true
    }

    /// `uret`: restores `UIE` from `UPIE` and resumes at `uepc`.
    pub fn trap_return(&mut self) {
        let status = self.csr(csr::USTATUS).unwrap_or(0);
        let enabled = if status & csr::USTATUS_UPIE == 0 {
            0
        } else {
            csr::USTATUS_UIE
        };
        let _ = self.set_csr(
            csr::USTATUS,
            (status & !csr::USTATUS_UIE) | enabled | csr::USTATUS_UPIE,
        );
        let epc = self.csr(csr::UEPC).unwrap_or(0);
        self.process_jump(epc);
    }

    // Step bookkeeping.

    pub(crate) fn begin_step(&mut self, pc: u64) {
        self.undo.begin(pc, self.cycles, self.retired);
    }

    /// Closes the undo record and advances the counters.
    pub(crate) fn commit_step(&mut self, retired: bool) {
        self.undo.commit();
        self.cycles = self.cycles.wrapping_add(1);
        if retired {
            self.retired = self.retired.wrapping_add(1);
        }
        self.sync_counters();
    }

    /// Number of instructions that can be stepped back over.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Reverts the most recent instruction. Returns the PC it was fetched from.
    pub fn backstep(&mut self) -> Option<u64> {
        let record = self.undo.pop()?;
        for change in record.changes.iter().rev() {
            match *change {
                Change::Register { bank, id, previous } => {
                    let _ = self.file_mut(bank).update_backdoor(id, previous);
                }
                Change::Memory {
                    address,
                    width,
                    previous,
                } => {
                    let _ = self.memory.write(address, width, previous);
                }
            }
        }
        self.pc = record.pc;
        self.cycles = record.cycles;
        self.retired = record.retired;
        self.exit_code = None;
        self.sync_counters();
        Some(record.pc)
    }

    /// Restores every register to its default, the PC to the text base, and
    /// clears the counters and the undo log. Memory is left to the caller.
    pub fn reset(&mut self) {
        self.integer.reset();
        self.floating.reset();
        self.csr.reset();
        self.pc = self.xlen.normalize(self.config.memory.text_base);
        self.instruction_length = 4;
        self.undo.clear();
        self.cycles = 0;
        self.retired = 0;
        self.exit_code = None;
        self.sync_counters();
    }

    /// Mirrors the internal counters into the read-only counter CSRs. `time`
    /// follows `cycle` so runs are reproducible.
    fn sync_counters(&mut self) {
        let counters = [
            (csr::CYCLE, csr::CYCLEH, self.cycles),
            (csr::TIME, csr::TIMEH, self.cycles),
            (csr::INSTRET, csr::INSTRETH, self.retired),
        ];
        for (low, high, value) in counters {
            let (low_value, high_value) = match self.xlen {
                Xlen::Rv32 => (
                    self.xlen.normalize(value),
                    Some(self.xlen.normalize(value >> 32)),
                ),
                Xlen::Rv64 => (value, None),
            };
            if let Some(id) = self.csr.register_by_number(low) {
                let _ = self.csr.update_backdoor(id, low_value);
            }
            if let (Some(id), Some(high_value)) = (self.csr.register_by_number(high), high_value) {
                let _ = self.csr.update_backdoor(id, high_value);
            }
        }
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("xlen", &self.xlen)
            .field("pc", &format_args!("{:#x}", self.pc))
            .field("cycles", &self.cycles)
            .field("retired", &self.retired)
            .field("undo_depth", &self.undo.len())
            .field("ecall_handler", &self.ecall_handler.is_some())
            .finish_non_exhaustive()
    }
}
