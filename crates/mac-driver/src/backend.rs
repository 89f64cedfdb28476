// SPDX-License-Identifier: AGPL-3.0-only

//! Register block abstraction
//!
//! The driver talks to the device only through [`RegisterBlock`], which
//! exposes the six named registers and nothing else. Hardware and the
//! software model are interchangeable behind it.

use crate::backends::{MappedRegion, SoftwareMac};
use crate::config::HarnessConfig;
use crate::error::Result;
use mac_chip::Register;
use std::fmt::Debug;

/// Access to one MAC register block.
///
/// Every call is one device access: implementations must not cache reads,
/// merge writes, or reorder accesses relative to program order.
pub trait RegisterBlock: Debug + Send {
    /// Read the current 32-bit contents of `reg`.
    fn read(&mut self, reg: Register) -> u32;

    /// Store a 32-bit value into `reg`.
    fn write(&mut self, reg: Register, value: u32);

    /// Get backend type for logging
    fn backend_type(&self) -> BackendType;
}

impl<R: RegisterBlock + ?Sized> RegisterBlock for Box<R> {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value);
    }

    fn backend_type(&self) -> BackendType {
        (**self).backend_type()
    }
}

impl<R: RegisterBlock + ?Sized> RegisterBlock for &mut R {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value);
    }

    fn backend_type(&self) -> BackendType {
        (**self).backend_type()
    }
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Raw pointer into an address space where the block is already mapped
    Mmio,

    /// Userspace mapping of the physical window through a memory device node
    DevMem,

    /// Software model of the accelerator, no hardware required
    Software,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mmio => write!(f, "MMIO"),
            Self::DevMem => write!(f, "DevMem"),
            Self::Software => write!(f, "Software (simulated MAC)"),
        }
    }
}

/// Backend selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendSelection {
    /// Simulated device, for CI and bring-up without silicon
    #[default]
    Software,

    /// Map the configured physical base through the memory device node
    DevMem,
}

/// Build the register block the configuration asks for
///
/// # Errors
///
/// Returns error if the configuration is invalid or the hardware window
/// cannot be mapped.
pub fn select_backend(config: &HarnessConfig) -> Result<Box<dyn RegisterBlock>> {
    config.validate()?;

    match config.backend {
        BackendSelection::Software => {
            tracing::info!(
                "Using software backend (latency {} polls, fault {:?})",
                config.sim_latency,
                config.sim_fault
            );
            let sim = SoftwareMac::new()
                .with_latency(config.sim_latency)
                .with_fault(config.sim_fault);
            Ok(Box::new(sim))
        }

        BackendSelection::DevMem => {
            tracing::info!(
                "Using {} backend at {:#x}",
                config.mem_device.display(),
                config.base
            );
            MappedRegion::map(&config.mem_device, config.base)
                .map(|r| Box::new(r) as Box<dyn RegisterBlock>)
        }
    }
}
