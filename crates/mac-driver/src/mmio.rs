// SPDX-License-Identifier: AGPL-3.0-only

//! Direct memory-mapped register access
//!
//! For targets where the MAC block is already visible in the address space
//! (bare metal, or a mapping obtained elsewhere). Accesses are single
//! volatile 32-bit loads and stores at `base + reg.offset()`.

use crate::backend::{BackendType, RegisterBlock};
use crate::error::{MacError, Result};
use mac_chip::{map, Register};
use std::ptr::NonNull;

/// MAC register block at a fixed address
#[derive(Debug)]
pub struct MmioRegisters {
    base: NonNull<u32>,
}

// SAFETY: Send - the handle is the sole owner of the block (see from_raw) and
// all accesses take &mut self.
unsafe impl Send for MmioRegisters {}

impl MmioRegisters {
    /// Wrap a pointer to the first register of the block.
    ///
    /// # Safety
    ///
    /// `base` must point to a live MAC register block (or memory standing in
    /// for one) valid for volatile reads and writes of `map::WINDOW_SIZE`
    /// bytes for the lifetime of the returned value, and no other handle may
    /// access the block concurrently.
    pub const unsafe fn from_raw(base: NonNull<u32>) -> Self {
        Self { base }
    }

    /// Wrap the block at a numeric address.
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::from_raw`] for the address `base`.
    ///
    /// # Errors
    ///
    /// Returns [`MacError::InvalidConfig`] if `base` is null or unaligned.
    pub unsafe fn at_address(base: usize) -> Result<Self> {
        if !map::is_valid_base(base as u64) {
            return Err(MacError::invalid_config(format!(
                "base address {base:#x} is not a word-aligned, non-null address"
            )));
        }
        let ptr = NonNull::new(base as *mut u32)
            .ok_or_else(|| MacError::invalid_config("null base address"))?;
        // SAFETY: forwarded to the caller.
        Ok(unsafe { Self::from_raw(ptr) })
    }

    /// Address of the first register
    pub fn base(&self) -> usize {
        self.base.as_ptr() as usize
    }
}

impl RegisterBlock for MmioRegisters {
    fn read(&mut self, reg: Register) -> u32 {
        // SAFETY: read_volatile necessary for MMIO - hardware can change value.
        // Invariants: (1) base valid per from_raw contract; (2) reg.index() < 6
        // stays inside the block; (3) u32 aligned.
        unsafe { self.base.as_ptr().add(reg.index()).read_volatile() }
    }

    fn write(&mut self, reg: Register, value: u32) {
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side effects.
        // Invariants as in read().
        unsafe { self.base.as_ptr().add(reg.index()).write_volatile(value) }
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mmio
    }
}
