// SPDX-License-Identifier: AGPL-3.0-only

//! MAC accelerator driver
//!
//! One [`MacAccelerator`] owns one register block. The device protocol is:
//!
//! ```text
//! IDLE ──write A,B,C──► ARMED ──start()──► COMPUTING ──is_done()=1──► DONE
//!   ▲                                        │    ▲                     │
//!   │                                        └────┘ is_done()=0         │
//!   └──────────────────────── read_result() ────────────────────────────┘
//! ```
//!
//! The hardware gives no liveness guarantee. With no poll bound,
//! [`MacAccelerator::wait_done`] spins until DONE exactly like the firmware
//! harness; a bound turns a stuck device into [`MacError::PollTimeout`].

use crate::backend::{select_backend, RegisterBlock};
use crate::config::HarnessConfig;
use crate::error::{MacError, Result};
use mac_chip::regs::{control, status};
use mac_chip::{mac, Register};
use tracing::debug;

/// Driver for one MAC register block
#[derive(Debug)]
pub struct MacAccelerator<R> {
    regs: R,
    max_polls: Option<u64>,
}

impl<R: RegisterBlock> MacAccelerator<R> {
    /// Take ownership of a register block. Polling is unbounded.
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            max_polls: None,
        }
    }

    /// Bound [`Self::wait_done`] to `max_polls` status reads (`None` = spin forever).
    ///
    /// Every wait reads `STATUS` at least once, so a bound of 0 is raised to 1.
    #[must_use]
    pub const fn with_max_polls(mut self, max_polls: Option<u64>) -> Self {
        self.max_polls = match max_polls {
            Some(0) => Some(1),
            other => other,
        };
        self
    }

    /// Configured poll bound
    pub const fn max_polls(&self) -> Option<u64> {
        self.max_polls
    }

    /// Store `value`'s bit pattern in `OPERAND_A`.
    pub fn write_operand_a(&mut self, value: i32) {
        self.regs.write(Register::OperandA, mac::operand_bits(value));
    }

    /// Store `value`'s bit pattern in `OPERAND_B`.
    pub fn write_operand_b(&mut self, value: i32) {
        self.regs.write(Register::OperandB, mac::operand_bits(value));
    }

    /// Store `value`'s bit pattern in `OPERAND_C`.
    pub fn write_operand_c(&mut self, value: i32) {
        self.regs.write(Register::OperandC, mac::operand_bits(value));
    }

    /// Set `CONTROL.START`: the device latches the operands and computes.
    pub fn start(&mut self) {
        self.regs.write(Register::Control, control::START);
    }

    /// Fresh read of `STATUS.DONE`.
    pub fn is_done(&mut self) -> bool {
        self.regs.read(Register::Status) & status::DONE != 0
    }

    /// Raw `RESULT` word.
    ///
    /// Only meaningful once [`Self::is_done`] has returned true since the last
    /// [`Self::start`]; earlier reads return whatever the register holds.
    pub fn read_result(&mut self) -> u32 {
        self.regs.read(Register::Result)
    }

    /// Busy-poll until DONE, returning the number of status reads.
    ///
    /// # Errors
    ///
    /// Returns [`MacError::PollTimeout`] if a poll bound is set and every
    /// read within it saw DONE clear. Never returns an error when unbounded.
    pub fn wait_done(&mut self) -> Result<u64> {
        let mut polls: u64 = 0;
        loop {
            polls += 1;
            if self.is_done() {
                return Ok(polls);
            }
            if self.max_polls.is_some_and(|limit| polls >= limit) {
                return Err(MacError::PollTimeout { polls });
            }
            std::hint::spin_loop();
        }
    }

    /// Run one full operation and return the raw result.
    ///
    /// # Errors
    ///
    /// Propagates [`MacError::PollTimeout`] from [`Self::wait_done`].
    pub fn compute(&mut self, a: i32, b: i32, c: i32) -> Result<u32> {
        self.write_operand_a(a);
        self.write_operand_b(b);
        self.write_operand_c(c);
        self.start();
        let polls = self.wait_done()?;
        let result = self.read_result();
        debug!("MAC {a} * {b} + {c} = {result:#x} after {polls} polls");
        Ok(result)
    }

    /// Borrow the register block
    pub const fn registers(&self) -> &R {
        &self.regs
    }

    /// Release the register block
    pub fn into_inner(self) -> R {
        self.regs
    }
}

impl MacAccelerator<Box<dyn RegisterBlock>> {
    /// Open the configured backend and apply the configured poll bound.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the backend cannot
    /// be opened (see [`select_backend`]).
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let regs = select_backend(config)?;
        debug!(
            "{} accelerator, max polls {:?}",
            regs.backend_type(),
            config.max_polls
        );
        Ok(Self::new(regs).with_max_polls(config.max_polls))
    }
}
