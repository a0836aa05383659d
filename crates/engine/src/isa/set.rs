//! The enabled instruction set and its decoder.
//!
//! [`InstructionSet::new`] collects the table rows that exist for the
//! configured XLEN and extensions, validates them, and groups them into
//! [`MatchMap`]s: one map per distinct mask, keyed by match value. Decoding a
//! word is then one hash lookup per mask group, trying groups with more mask
//! bits first and breaking ties by numeric mask.

use std::collections::HashMap;

use tracing::debug;

use super::instruction::{Availability, BasicInstruction, Extension, ExtendedInstruction, Operator};
use super::{pseudo, rv32d, rv32f, rv32i, rv32m, system};
use crate::common::InstructionSetError;
use crate::config::{Config, Extensions, Xlen};

/// Instructions sharing one mask, keyed by their match value.
#[derive(Debug, Clone)]
pub struct MatchMap {
    mask: u32,
    specificity: u32,
    entries: HashMap<u32, usize>,
}

impl MatchMap {
    fn new(row: &BasicInstruction) -> Self {
        Self {
            mask: row.mask,
            specificity: row.specificity(),
            entries: HashMap::new(),
        }
    }

    /// The shared mask.
    pub const fn mask(&self) -> u32 {
        self.mask
    }

    /// Identifying bits shared by every instruction in the group.
    pub const fn specificity(&self) -> u32 {
        self.specificity
    }

    /// Number of instructions in the group.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index into [`InstructionSet::basic_instructions`] of the row accepting
    /// `word`, if this group has one.
    #[inline]
    pub fn find(&self, word: u32) -> Option<usize> {
        self.entries.get(&(word & self.mask)).copied()
    }
}

/// Decoder and mnemonic index for one configuration.
#[derive(Debug, Clone)]
pub struct InstructionSet {
    basic: Vec<BasicInstruction>,
    extended: Vec<ExtendedInstruction>,
    maps: Vec<MatchMap>,
}

impl InstructionSet {
    /// Builds the set for `config`.
    ///
    /// Fails if a row has match bits outside its mask, or if two enabled rows
    /// accept a common encoding.
    pub fn new(config: &Config) -> Result<Self, InstructionSetError> {
        let xlen = config.general.xlen;
        let extensions = &config.general.extensions;
        let basic: Vec<BasicInstruction> = [
            rv32i::INSTRUCTIONS,
            rv32m::INSTRUCTIONS,
            rv32f::INSTRUCTIONS,
            rv32d::INSTRUCTIONS,
            system::INSTRUCTIONS,
        ]
        .into_iter()
        .flatten()
        .filter(|row| enabled(row, xlen, extensions))
        .copied()
        .collect();

        for row in &basic {
            if row.matches & !row.mask != 0 {
                return Err(InstructionSetError::MalformedEntry(row.mnemonic));
            }
        }
        check_disjoint(&basic)?;

        let mut maps: Vec<MatchMap> = Vec::new();
        for (index, row) in basic.iter().enumerate() {
            let position = match maps.iter().position(|map| map.mask == row.mask) {
                Some(position) => position,
                None => {
                    maps.push(MatchMap::new(row));
                    maps.len() - 1
                }
            };
            let _ = maps[position].entries.insert(row.matches, index);
        }
        maps.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then(a.mask.cmp(&b.mask))
        });

        let extended: Vec<ExtendedInstruction> = pseudo::INSTRUCTIONS
            .iter()
            .filter(|row| pseudo_enabled(row, xlen, extensions))
            .copied()
            .collect();

        debug!(
            basic = basic.len(),
            extended = extended.len(),
            groups = maps.len(),
            xlen = xlen.bits(),
            "instruction set built"
        );
        Ok(Self {
            basic,
            extended,
            maps,
        })
    }

    /// Decodes a 32-bit instruction word.
    pub fn find_by_binary_code(&self, word: u32) -> Option<&BasicInstruction> {
        self.maps
            .iter()
            .find_map(|map| map.find(word))
            .map(|index| &self.basic[index])
    }

    /// Every instruction and pseudo-instruction named `name`, ignoring case.
    pub fn match_operator(&self, name: &str) -> Vec<Operator<'_>> {
        self.operators()
            .filter(|operator| operator.mnemonic().eq_ignore_ascii_case(name))
            .collect()
    }

    /// Every instruction and pseudo-instruction whose mnemonic starts with
    /// `prefix`, ignoring case.
    pub fn prefix_match_operator(&self, prefix: &str) -> Vec<Operator<'_>> {
        let prefix = prefix.to_ascii_lowercase();
        self.operators()
            .filter(|operator| operator.mnemonic().starts_with(&prefix))
            .collect()
    }

    /// Enabled table rows, in table order.
    pub fn basic_instructions(&self) -> &[BasicInstruction] {
        &self.basic
    }

    /// Enabled pseudo-instructions.
    pub fn extended_instructions(&self) -> &[ExtendedInstruction] {
        &self.extended
    }

    /// Mask groups in lookup order.
    pub fn match_maps(&self) -> &[MatchMap] {
        &self.maps
    }

    fn operators(&self) -> impl Iterator<Item = Operator<'_>> {
        self.basic
            .iter()
            .map(Operator::Basic)
            .chain(self.extended.iter().map(Operator::Extended))
    }
}

fn enabled(row: &BasicInstruction, xlen: Xlen, extensions: &Extensions) -> bool {
    let width = match row.availability {
        Availability::Both => true,
        Availability::Rv32Only => xlen == Xlen::Rv32,
        Availability::Rv64Only => xlen == Xlen::Rv64,
    };
    let extension = match row.extension {
        Extension::I | Extension::Zicsr | Extension::Zifencei | Extension::N => true,
        Extension::M => extensions.m,
        Extension::F => extensions.has_f(),
        Extension::D => extensions.has_d(),
    };
    width && extension
}

/// Pseudo-instructions follow the extension of the instructions they expand
/// to, which is visible in their mnemonic.
fn pseudo_enabled(row: &ExtendedInstruction, xlen: Xlen, extensions: &Extensions) -> bool {
    let mnemonic = row.mnemonic;
    if mnemonic == "sext.w" {
        return xlen == Xlen::Rv64;
    }
    if mnemonic.ends_with(".d") {
        return extensions.has_d();
    }
    if mnemonic.ends_with(".s") || mnemonic.starts_with("fr") || mnemonic.starts_with("fs") {
        return extensions.has_f();
    }
    true
}

/// Two rows overlap when they agree on every bit both masks fix.
fn check_disjoint(rows: &[BasicInstruction]) -> Result<(), InstructionSetError> {
    for (i, first) in rows.iter().enumerate() {
        for second in &rows[i + 1..] {
            let common = first.mask & second.mask;
            if common & (first.matches ^ second.matches) == 0 {
                return Err(InstructionSetError::Overlap {
                    first: first.mnemonic,
                    second: second.mnemonic,
                    witness: first.matches | second.matches,
                });
            }
        }
    }
    Ok(())
}
