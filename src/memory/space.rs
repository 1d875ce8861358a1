//! Sparse address space of the program image
//!
//! This module provides the byte-level storage behind every value:
//! - Named blocks mapped at fixed base addresses
//! - Read-only blocks for string literals
//! - Unmapped guard gaps between consecutive blocks
//!
//! # Error Handling
//!
//! Any read touching a byte outside every mapped block fails with
//! [`InspectError::UnreadableMemory`] naming the first unmapped byte. The
//! address space itself never changes shape after loading; only the contents
//! of writable blocks do.

use super::value::Address;
use super::{GLOBALS_BASE, GUARD_GAP, RODATA_BASE};
use crate::explore::InspectError;
use std::collections::BTreeMap;

/// A contiguous run of mapped memory
#[derive(Debug, Clone)]
pub struct MemoryBlock {
    pub name: String,
    data: Vec<u8>,
    writable: bool,
}

impl MemoryBlock {
    pub fn new(name: impl Into<String>, size: usize, writable: bool) -> Self {
        MemoryBlock {
            name: name.into(),
            data: vec![0; size],
            writable,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The address space
#[derive(Debug, Clone)]
pub struct AddressSpace {
    blocks: BTreeMap<Address, MemoryBlock>,
    next_global: Address,
    next_rodata: Address,
}

impl AddressSpace {
    pub fn new() -> Self {
        AddressSpace {
            blocks: BTreeMap::new(),
            next_global: GLOBALS_BASE,
            next_rodata: RODATA_BASE,
        }
    }

    /// Map a zero-filled writable block for a global variable
    pub fn allocate_global(&mut self, name: &str, size: usize) -> Address {
        let addr = self.next_global;
        self.blocks
            .insert(addr, MemoryBlock::new(name, size, true));
        self.next_global += size as u64 + GUARD_GAP;
        addr
    }

    /// Map a read-only block holding `bytes`
    pub fn allocate_rodata(&mut self, name: &str, bytes: &[u8]) -> Address {
        let addr = self.next_rodata;
        let mut block = MemoryBlock::new(name, bytes.len(), false);
        block.data.copy_from_slice(bytes);
        self.blocks.insert(addr, block);
        self.next_rodata += bytes.len() as u64 + GUARD_GAP;
        addr
    }

    /// Get all blocks keyed by base address
    pub fn blocks(&self) -> &BTreeMap<Address, MemoryBlock> {
        &self.blocks
    }

    /// Find the block containing `addr`
    fn block_containing(&self, addr: Address) -> Option<(Address, &MemoryBlock)> {
        let (&base, block) = self.blocks.range(..=addr).next_back()?;
        let offset = addr - base;
        if offset < block.len() as u64 || (block.is_empty() && offset == 0) {
            Some((base, block))
        } else {
            None
        }
    }

    /// Name of the block containing `addr`, if any
    pub fn block_name(&self, addr: Address) -> Option<&str> {
        self.block_containing(addr).map(|(_, block)| block.name.as_str())
    }

    /// Check that `size` bytes starting at `addr` are mapped
    ///
    /// A zero-sized check still requires `addr` itself to be mapped.
    pub fn check_readable(&self, addr: Address, size: usize) -> Result<(), InspectError> {
        if size == 0 {
            return self
                .block_containing(addr)
                .map(|_| ())
                .ok_or(InspectError::UnreadableMemory { address: addr });
        }
        self.visit(addr, size, |_, _| ())
    }

    /// Read multiple bytes starting at an address
    pub fn read(&self, addr: Address, size: usize) -> Result<Vec<u8>, InspectError> {
        self.check_readable(addr, size)?;
        let mut bytes = Vec::with_capacity(size);
        self.visit(addr, size, |block, range| {
            bytes.extend_from_slice(&block.data[range])
        })?;
        Ok(bytes)
    }

    /// Write multiple bytes starting at an address
    pub fn write(&mut self, addr: Address, bytes: &[u8]) -> Result<(), InspectError> {
        self.check_readable(addr, bytes.len())?;

        let mut cursor = addr;
        let mut written = 0;
        while written < bytes.len() {
            let (&base, block) = self
                .blocks
                .range_mut(..=cursor)
                .next_back()
                .ok_or(InspectError::UnreadableMemory { address: cursor })?;
            if !block.writable {
                return Err(InspectError::invalid(format!(
                    "Cannot write to read-only memory at address 0x{:x}",
                    cursor
                )));
            }
            let offset = (cursor - base) as usize;
            let chunk = (block.len() - offset).min(bytes.len() - written);
            block.data[offset..offset + chunk].copy_from_slice(&bytes[written..written + chunk]);
            written += chunk;
            cursor += chunk as u64;
        }

        Ok(())
    }

    /// Walk the mapped chunks covering `[addr, addr + size)`
    fn visit<F>(&self, addr: Address, size: usize, mut f: F) -> Result<(), InspectError>
    where
        F: FnMut(&MemoryBlock, std::ops::Range<usize>),
    {
        let mut cursor = addr;
        let mut remaining = size;
        while remaining > 0 {
            let (base, block) = self
                .block_containing(cursor)
                .ok_or(InspectError::UnreadableMemory { address: cursor })?;
            let offset = (cursor - base) as usize;
            let chunk = (block.len() - offset).min(remaining);
            // An empty block maps its base address but no bytes
            if chunk == 0 {
                return Err(InspectError::UnreadableMemory { address: cursor });
            }
            f(block, offset..offset + chunk);
            remaining -= chunk;
            cursor = cursor
                .checked_add(chunk as u64)
                .ok_or(InspectError::UnreadableMemory { address: cursor })?;
        }
        Ok(())
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}
