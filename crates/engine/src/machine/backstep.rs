//! Bounded undo log.
//!
//! Every executed instruction opens a [`StepRecord`] holding the PC it was
//! fetched from, the counter values before it ran, and each register or memory
//! mutation it made, in order. Undoing a record replays the changes in reverse
//! with backdoor writes. The oldest record is dropped once the log is full.

use std::collections::VecDeque;

use super::memory::Width;
use crate::registers::RegisterId;

/// Register file a change belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bank {
    /// `x0`-`x31`.
    Integer,
    /// `f0`-`f31`.
    Floating,
    /// Control and status registers.
    Csr,
}

/// One reversible mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// A register write; `previous` is the value read through the same id.
    Register {
        /// File of the register.
        bank: Bank,
        /// Register written.
        id: RegisterId,
        /// Value before the write.
        previous: u64,
    },
    /// A memory store.
    Memory {
        /// Masked effective address.
        address: u64,
        /// Store width.
        width: Width,
        /// Bytes before the store, zero-extended.
        previous: u64,
    },
}

/// Mutations of one executed instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRecord {
    /// PC the instruction was fetched from.
    pub pc: u64,
    /// Cycle counter before the instruction.
    pub cycles: u64,
    /// Retired-instruction counter before the instruction.
    pub retired: u64,
    /// Changes in execution order.
    pub changes: Vec<Change>,
}

/// Undo log of the most recent instructions.
#[derive(Debug)]
pub struct Backstep {
    capacity: usize,
    records: VecDeque<StepRecord>,
    open: Option<StepRecord>,
}

impl Backstep {
    /// Creates a log holding at most `capacity` instructions; zero disables it.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(256)),
            open: None,
        }
    }

    /// Maximum number of records kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Opens the record of the next instruction.
    pub fn begin(&mut self, pc: u64, cycles: u64, retired: u64) {
        if self.capacity == 0 {
            return;
        }
        self.open = Some(StepRecord {
            pc,
            cycles,
            retired,
            changes: Vec::new(),
        });
    }

    /// Appends a change to the open record. Changes outside a step are not
    /// undoable and are dropped.
    pub fn record(&mut self, change: Change) {
        if let Some(open) = &mut self.open {
            open.changes.push(change);
        }
    }

    /// Closes the open record, evicting the oldest one if the log is full.
    pub fn commit(&mut self) {
        let Some(record) = self.open.take() else {
            return;
        };
        if self.records.len() == self.capacity {
            let _ = self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Removes the most recent record.
    pub fn pop(&mut self) -> Option<StepRecord> {
        self.records.pop_back()
    }

    /// Discards every record, including an open one.
    pub fn clear(&mut self) {
        self.records.clear();
        self.open = None;
    }

    /// Number of undoable instructions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing can be undone.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
