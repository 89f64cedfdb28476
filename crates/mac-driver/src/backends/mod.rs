// SPDX-License-Identifier: AGPL-3.0-only

//! Register block implementations
//!
//! - **DevMem**: physical window mapped through `/dev/mem` (userspace on Linux)
//! - **Software**: cycle-free model of the MAC for CI and runner tests
//!
//! Bare-metal targets with the block already in their address space use
//! [`crate::mmio::MmioRegisters`] directly.

pub mod mmap;
pub mod software;

pub use mmap::MappedRegion;
pub use software::{BusEvent, Fault, SimStats, SoftwareMac};
