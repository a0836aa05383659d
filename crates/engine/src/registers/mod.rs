//! Register model shared by the integer, floating-point, and CSR files.
//!
//! A [`RegisterFile`] owns a fixed list of [`Register`]s addressed by
//! [`RegisterId`] (the position in the file). Special behaviour is a
//! [`RegisterKind`] rather than a subtype:
//! 1. **Hardwired:** writes are discarded (`x0`).
//! 2. **Masked:** bits in the fixed mask keep their value on ordinary writes.
//! 3. **Read-only:** ordinary writes fail; only backdoor writes change it.
//! 4. **Linked:** a view of `mask` bits at `shift` inside another register of
//!    the same file, resolved by id. Writes read-modify-write the backing value.
//!
//! Ordinary writes return the previous value and publish a [`RegisterNotice`]
//! on the register's own channel; a write that changes a backing register also
//! notifies every linked view whose field changed. Backdoor writes are silent.

/// The 32 integer registers.
pub mod integer;

/// The 32 floating-point registers.
pub mod floating;

/// Control and status registers.
pub mod csr;

use std::fmt;

use crate::common::RegisterError;
use crate::notice::{Publisher, Subscription};

/// Position of a register in its file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterId(pub usize);

/// Write behaviour of a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterKind {
    /// Every bit is writable.
    Plain,
    /// Always reads as its default; writes are ignored.
    Hardwired,
    /// Bits set in `fixed` are preserved by ordinary writes.
    Masked {
        /// Bits that ordinary writes cannot change.
        fixed: u64,
    },
    /// Ordinary writes are rejected.
    ReadOnly,
    /// Field view of another register: `(backing >> shift) & mask`.
    Linked {
        /// Register holding the storage.
        backing: RegisterId,
        /// Field mask, right-aligned.
        mask: u64,
        /// Position of the field's lowest bit in the backing register.
        shift: u32,
    },
}

/// Change published for an ordinary register write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterNotice {
    /// Primary name of the register.
    pub name: &'static str,
    /// Register number, if it has one.
    pub number: Option<u32>,
    /// Value before the write.
    pub previous: u64,
    /// Value after the write.
    pub value: u64,
}

/// One architectural register.
#[derive(Debug)]
pub struct Register {
    name: &'static str,
    aliases: &'static [&'static str],
    number: Option<u32>,
    default: u64,
    value: u64,
    kind: RegisterKind,
    publisher: Publisher<RegisterNotice>,
}

impl Register {
    /// Creates a plain register.
    pub fn new(name: &'static str, number: Option<u32>, default: u64) -> Self {
        Self {
            name,
            aliases: &[],
            number,
            default,
            value: default,
            kind: RegisterKind::Plain,
            publisher: Publisher::new(),
        }
    }

    /// Sets the alternative names accepted by name lookup.
    #[must_use]
    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets the write behaviour.
    #[must_use]
    pub fn with_kind(mut self, kind: RegisterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Primary name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Alternative names.
    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    /// Register number; `None` for unnumbered registers.
    pub fn number(&self) -> Option<u32> {
        self.number
    }

    /// Write behaviour.
    pub fn kind(&self) -> RegisterKind {
        self.kind
    }

    /// Value restored by reset.
    pub fn default_value(&self) -> u64 {
        self.default
    }

    /// Subscribes to ordinary writes of this register.
    pub fn subscribe(&self) -> Subscription<RegisterNotice> {
        self.publisher.subscribe()
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }

    fn notify(&self, previous: u64, value: u64) {
        if self.publisher.is_idle() {
            return;
        }
        self.publisher.publish(&RegisterNotice {
            name: self.name,
            number: self.number,
            previous,
            value,
        });
    }
}

/// A listener attached to every register of a file.
///
/// Returned by [`RegisterFile::add_registers_listener`]; pass it back to
/// [`RegisterFile::delete_registers_listener`] to detach it from all of them.
#[derive(Debug)]
pub struct RegistersListener {
    subscription: Subscription<RegisterNotice>,
}

impl RegistersListener {
    /// The shared subscription; grant credit and read notices through it.
    pub fn subscription(&self) -> &Subscription<RegisterNotice> {
        &self.subscription
    }
}

/// Fixed set of registers with lookup by number and by name.
#[derive(Debug)]
pub struct RegisterFile {
    prefix: Option<char>,
    registers: Vec<Register>,
}

impl RegisterFile {
    /// Creates a file. `prefix` enables `x5`-style names resolved by number.
    pub fn new(prefix: Option<char>, registers: Vec<Register>) -> Self {
        debug_assert!(
            registers.iter().enumerate().all(|(i, a)| {
                registers[i + 1..].iter().all(|b| a.name != b.name)
            }),
            "duplicate register name"
        );
        Self { prefix, registers }
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Returns true if the file has no registers.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// All registers in file order.
    pub fn iter(&self) -> impl Iterator<Item = (RegisterId, &Register)> {
        self.registers
            .iter()
            .enumerate()
            .map(|(index, register)| (RegisterId(index), register))
    }

    /// The register with the given id.
    ///
    /// # Panics
    ///
    /// Ids come from this file's lookups; a foreign id out of range panics.
    pub fn get(&self, id: RegisterId) -> &Register {
        &self.registers[id.0]
    }

    /// Finds a register by number.
    pub fn register_by_number(&self, number: u32) -> Option<RegisterId> {
        self.registers
            .iter()
            .position(|register| register.number == Some(number))
            .map(RegisterId)
    }

    /// Finds a register by name or alias, case-insensitively. With a prefix
    /// configured, `<prefix><number>` also resolves through the number.
    pub fn register_by_name(&self, name: &str) -> Option<RegisterId> {
        if let Some(index) = self
            .registers
            .iter()
            .position(|register| register.answers_to(name))
        {
            return Some(RegisterId(index));
        }
        let prefix = self.prefix?;
        let digits = name.strip_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.register_by_number(digits.parse().ok()?)
    }

    /// Resolves a name to an id or reports it as unknown.
    pub fn resolve(&self, name: &str) -> Result<RegisterId, RegisterError> {
        self.register_by_name(name)
            .ok_or_else(|| RegisterError::Unknown(name.to_owned()))
    }

    /// Current value; linked registers read their field of the backing register.
    pub fn value(&self, id: RegisterId) -> u64 {
        let register = &self.registers[id.0];
        match register.kind {
            RegisterKind::Linked {
                backing,
                mask,
                shift,
            } => (self.registers[backing.0].value >> shift) & mask,
            _ => register.value,
        }
    }

    /// Value by name, for collaborators that address registers textually.
    pub fn value_by_name(&self, name: &str) -> Result<u64, RegisterError> {
        Ok(self.value(self.resolve(name)?))
    }

    /// Ordinary write. Returns the previous value.
    ///
    /// Hardwired registers ignore the write; read-only registers reject it.
    pub fn update(&mut self, id: RegisterId, value: u64) -> Result<u64, RegisterError> {
        let Register { name, kind, .. } = self.registers[id.0];
        let previous = self.value(id);
        match kind {
            RegisterKind::Plain => {
                self.store(id, value, None);
            }
            RegisterKind::Hardwired => {}
            RegisterKind::Masked { fixed } => {
                self.store(id, (previous & fixed) | (value & !fixed), None);
            }
            RegisterKind::ReadOnly => return Err(RegisterError::ReadOnly(name)),
            RegisterKind::Linked {
                backing,
                mask,
                shift,
            } => {
                let old = self.registers[backing.0].value;
                let field = mask << shift;
                self.store(backing, (old & !field) | ((value & mask) << shift), Some(id));
                self.registers[id.0].notify(previous, value & mask);
            }
        }
        Ok(previous)
    }

    /// Write that bypasses read-only protection, masks, and notification.
    ///
    /// Used for restoring state (reset, backstep) and for counters the engine
    /// maintains itself. Hardwired registers still ignore it.
    pub fn update_backdoor(&mut self, id: RegisterId, value: u64) -> u64 {
        let previous = self.value(id);
        match self.registers[id.0].kind {
            RegisterKind::Hardwired => {}
            RegisterKind::Linked {
                backing,
                mask,
                shift,
            } => {
                let slot = &mut self.registers[backing.0].value;
                *slot = (*slot & !(mask << shift)) | ((value & mask) << shift);
            }
            _ => self.registers[id.0].value = value,
        }
        previous
    }

    /// Restores every register to its default silently.
    pub fn reset(&mut self) {
        for register in &mut self.registers {
            register.value = register.default;
        }
    }

    /// Subscribes one listener to every register in the file.
    pub fn add_registers_listener(&self) -> RegistersListener {
        let subscription = Subscription::detached();
        for register in &self.registers {
            register.publisher.attach(&subscription);
        }
        RegistersListener { subscription }
    }

    /// Detaches a listener from every register in the file.
    pub fn delete_registers_listener(&self, listener: &RegistersListener) {
        for register in &self.registers {
            register.publisher.detach(&listener.subscription);
        }
    }

    /// Stores a raw value and notifies the register and every view of it
    /// whose field changed, except `written`, which the caller notifies.
    fn store(&mut self, id: RegisterId, value: u64, written: Option<RegisterId>) {
        let previous = self.registers[id.0].value;
        self.registers[id.0].value = value;
        self.registers[id.0].notify(previous, value);
        for (index, view) in self.registers.iter().enumerate() {
            if written == Some(RegisterId(index)) {
                continue;
            }
            if let RegisterKind::Linked {
                backing,
                mask,
                shift,
            } = view.kind
            {
                let before = (previous >> shift) & mask;
                let after = (value >> shift) & mask;
                if backing == id && before != after {
                    view.notify(before, after);
                }
            }
        }
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, register) in self.iter() {
            writeln!(f, "{:<10}{:#018x}", register.name, self.value(id))?;
        }
        Ok(())
    }
}
