// SPDX-License-Identifier: AGPL-3.0-only

//! Harness configuration
//!
//! Everything the original firmware compiled in (base address, the
//! unbounded poll) is a field here, so the same runner can target silicon
//! or the software model.

use crate::backend::BackendSelection;
use crate::backends::Fault;
use crate::error::{MacError, Result};
use mac_chip::map;
use std::path::PathBuf;
use tracing::debug;

/// Default memory device node used to reach physical addresses.
pub const DEFAULT_MEM_DEVICE: &str = "/dev/mem";

/// Default status reads before the software model raises DONE.
pub const DEFAULT_SIM_LATENCY: u32 = 4;

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Which register block to drive
    pub backend: BackendSelection,

    /// Physical base address of the register block
    pub base: u64,

    /// Device node mapped by the `DevMem` backend
    pub mem_device: PathBuf,

    /// Upper bound on status polls per operation; `None` spins forever
    pub max_polls: Option<u64>,

    /// Software model: status reads that return not-done after START
    pub sim_latency: u32,

    /// Software model: injected misbehaviour
    pub sim_fault: Fault,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            backend: BackendSelection::Software,
            base: map::DEFAULT_BASE,
            mem_device: PathBuf::from(DEFAULT_MEM_DEVICE),
            max_polls: None,
            sim_latency: DEFAULT_SIM_LATENCY,
            sim_fault: Fault::None,
        }
    }
}

impl HarnessConfig {
    /// Select the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendSelection) -> Self {
        self.backend = backend;
        self
    }

    /// Set the physical base address.
    #[must_use]
    pub fn with_base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    /// Set the memory device node.
    #[must_use]
    pub fn with_mem_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.mem_device = path.into();
        self
    }

    /// Bound the busy-poll. `None` keeps the unbounded spin.
    #[must_use]
    pub fn with_max_polls(mut self, max_polls: Option<u64>) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Set the software model latency.
    #[must_use]
    pub fn with_sim_latency(mut self, polls: u32) -> Self {
        self.sim_latency = polls;
        self
    }

    /// Set the software model fault.
    #[must_use]
    pub fn with_sim_fault(mut self, fault: Fault) -> Self {
        self.sim_fault = fault;
        self
    }

    /// Create configuration for tests: software model, bounded polling
    #[cfg(test)]
    pub fn minimal() -> Self {
        Self::default().with_sim_latency(1).with_max_polls(Some(64))
    }

    /// Check the configuration before any device access
    ///
    /// # Errors
    ///
    /// Returns [`MacError::InvalidConfig`] for an unaligned or null base, or
    /// a zero poll bound.
    pub fn validate(&self) -> Result<()> {
        if !map::is_valid_base(self.base) {
            return Err(MacError::invalid_config(format!(
                "base address {:#x} is not a word-aligned, non-null address",
                self.base
            )));
        }
        if self.max_polls == Some(0) {
            return Err(MacError::invalid_config("max polls must be at least 1"));
        }
        if self.backend == BackendSelection::Software && self.base != map::DEFAULT_BASE {
            debug!("Base {:#x} ignored by the software backend", self.base);
        }
        Ok(())
    }
}
