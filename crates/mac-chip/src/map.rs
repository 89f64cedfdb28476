// SPDX-License-Identifier: AGPL-3.0-only

//! Placement of the MAC register block in the physical address space.
//!
//! ```text
//! Region          Base          Size    Contents
//! ──────────────  ────────────  ──────  ──────────────────────────────
//! User domain     0x2000_0000   ...     memory-mapped accelerators
//!   MAC block     0x2000_1000   0x18    six 32-bit registers
//! ```
//!
//! The base is a default only; drivers take the address at construction.

use crate::regs::{BLOCK_SIZE, REGISTER_WIDTH};

/// Base address of the user peripheral domain on the reference SoC.
pub const USER_DOMAIN_BASE: u64 = 0x2000_0000;

/// Default base address of the MAC register block.
pub const DEFAULT_BASE: u64 = USER_DOMAIN_BASE + 0x1000;

/// Bytes a mapping must cover to reach every register.
pub const WINDOW_SIZE: usize = BLOCK_SIZE;

/// Whether `base` is a legal block base (register-aligned, non-null).
#[must_use]
pub const fn is_valid_base(base: u64) -> bool {
    base != 0 && base % REGISTER_WIDTH as u64 == 0
}
