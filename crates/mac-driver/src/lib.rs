// SPDX-License-Identifier: AGPL-3.0-only

//! Driver and diagnostic runner for the memory-mapped MAC accelerator.
//!
//! The accelerator computes `result = a * b + c` on 32-bit operands. Software
//! writes the operands, sets `CONTROL.START`, polls `STATUS.DONE`, and reads
//! `RESULT`. This crate wraps that handshake and runs the bring-up vectors
//! against it.
//!
//! # Backends
//!
//! ```text
//! Hardware:
//!   MappedRegion  — physical window via /dev/mem (Linux userspace)
//!   MmioRegisters — block already in the address space (bare metal)
//!
//! Development / CI:
//!   SoftwareMac   — in-memory model with latency and fault injection
//! ```
//!
//! # Quick start
//!
//! ```
//! use mac_driver::{MacAccelerator, SoftwareMac, TestRunner, DEFAULT_VECTORS};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let accel = MacAccelerator::new(SoftwareMac::new()).with_max_polls(Some(1_000));
//! let mut runner = TestRunner::new(accel, std::io::stdout());
//! let summary = runner.run_suite(&DEFAULT_VECTORS)?;
//! assert!(summary.all_passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod accelerator;
mod backend;
pub mod backends;
mod config;
mod error;
pub mod mmio;
mod runner;

pub use accelerator::MacAccelerator;
pub use backend::{select_backend, BackendSelection, BackendType, RegisterBlock};
pub use backends::{BusEvent, Fault, MappedRegion, SimStats, SoftwareMac};
pub use config::{HarnessConfig, DEFAULT_MEM_DEVICE, DEFAULT_SIM_LATENCY};
pub use error::{MacError, Result};
pub use mmio::MmioRegisters;
pub use runner::{SuiteSummary, TestOutcome, TestRunner, TestVector, Verdict, DEFAULT_VECTORS};

/// Register model (re-exported from mac-chip).
pub use mac_chip::{map, regs, Register};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        HarnessConfig, MacAccelerator, MacError, RegisterBlock, Result, SoftwareMac, TestRunner,
        TestVector, Verdict, DEFAULT_VECTORS,
    };
}
