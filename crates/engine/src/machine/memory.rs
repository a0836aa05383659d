//! Sparse byte-addressable memory.
//!
//! The address space is the full 64-bit range, backed by 4 KiB pages allocated
//! on first write. Unwritten bytes read as zero. Multi-byte accesses are
//! little-endian and may straddle pages; alignment is checked by the caller.

use std::collections::HashMap;

/// Page size in bytes.
const PAGE_SIZE: usize = 4096;

/// Page number shift.
const PAGE_SHIFT: u32 = 12;

/// Width of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8 bits.
    Byte = 1,
    /// 16 bits.
    Half = 2,
    /// 32 bits.
    Word = 4,
    /// 64 bits.
    Double = 8,
}

impl Width {
    /// Size in bytes.
    #[inline]
    pub const fn bytes(self) -> u64 {
        self as u64
    }

    /// Returns true if `address` is naturally aligned for this width.
    #[inline]
    pub const fn is_aligned(self, address: u64) -> bool {
        address % self.bytes() == 0
    }
}

/// Sparse memory image.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    pages: HashMap<u64, Box<[u8; PAGE_SIZE]>>,
}

impl Memory {
    /// Creates an empty memory; every byte reads as zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a byte.
    pub fn read_u8(&self, address: u64) -> u8 {
        self.pages
            .get(&(address >> PAGE_SHIFT))
            .map_or(0, |page| page[(address as usize) & (PAGE_SIZE - 1)])
    }

    /// Writes a byte.
    pub fn write_u8(&mut self, address: u64, value: u8) {
        let page = self
            .pages
            .entry(address >> PAGE_SHIFT)
            .or_insert_with(|| Box::new([0; PAGE_SIZE]));
        page[(address as usize) & (PAGE_SIZE - 1)] = value;
    }

    /// Reads `width` bytes little-endian, zero-extended.
    pub fn read(&self, address: u64, width: Width) -> u64 {
        (0..width.bytes()).fold(0, |value, i| {
            value | u64::from(self.read_u8(address.wrapping_add(i))) << (8 * i)
        })
    }

    /// Writes the low `width` bytes of `value` little-endian and returns the
    /// bytes it replaced.
    pub fn write(&mut self, address: u64, width: Width, value: u64) -> u64 {
        let previous = self.read(address, width);
        for i in 0..width.bytes() {
            self.write_u8(address.wrapping_add(i), (value >> (8 * i)) as u8);
        }
        previous
    }

    /// Reads a half-word.
    pub fn read_u16(&self, address: u64) -> u16 {
        self.read(address, Width::Half) as u16
    }

    /// Reads a word.
    pub fn read_u32(&self, address: u64) -> u32 {
        self.read(address, Width::Word) as u32
    }

    /// Reads a double-word.
    pub fn read_u64(&self, address: u64) -> u64 {
        self.read(address, Width::Double)
    }

    /// Copies `data` to consecutive addresses starting at `base`.
    pub fn load(&mut self, base: u64, data: &[u8]) {
        for (offset, byte) in (0u64..).zip(data) {
            self.write_u8(base.wrapping_add(offset), *byte);
        }
    }

    /// Copies `len` bytes starting at `base`.
    pub fn read_bytes(&self, base: u64, len: usize) -> Vec<u8> {
        (0..len as u64)
            .map(|offset| self.read_u8(base.wrapping_add(offset)))
            .collect()
    }

    /// Drops every page.
    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
