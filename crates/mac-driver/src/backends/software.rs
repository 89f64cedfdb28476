// SPDX-License-Identifier: AGPL-3.0-only

//! Software (simulated) MAC backend
//!
//! Implements [`RegisterBlock`] with an in-memory model of the accelerator,
//! so the driver and runner can be exercised without silicon:
//!
//! 1. **CI without hardware**: the default suite runs against this model
//!    and must PASS, exactly as on a healthy device.
//!
//! 2. **Protocol checking**: counters are always kept; with
//!    [`SoftwareMac::with_trace`] every access is also recorded. Tests assert
//!    the runner writes all operands before START and never reads `RESULT`
//!    before `STATUS.DONE`.
//!
//! 3. **Failure paths**: [`Fault`] injects a corrupted result or a device
//!    that never completes.
//!
//! ## Timing model
//!
//! ```text
//! write CONTROL.START ─► latch operands, DONE := 0, countdown := latency
//! read STATUS         ─► countdown > 0 : countdown -= 1, return 0
//!                        countdown = 0 : commit RESULT, DONE := 1
//! ```
//!
//! DONE is sticky until the next START, so a run of status reads is always
//! `0* 1*`. `RESULT` holds the previous value until the commit, which is
//! what a premature read observes.

use crate::backend::{BackendType, RegisterBlock};
use mac_chip::regs::{control, status};
use mac_chip::{mac, Register};
use tracing::debug;

/// Misbehaviour injected into the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    /// Behave like a healthy device
    #[default]
    None,
    /// Flip these bits of every committed result
    CorruptResult {
        /// XOR mask applied to the correct result
        xor: u32,
    },
    /// Accept START but never raise DONE
    NeverComplete,
}

/// One register access seen by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Software read `value` from the register
    Read(Register, u32),
    /// Software wrote `value` to the register
    Write(Register, u32),
}

/// Access counters kept by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    /// START triggers accepted
    pub starts: u64,
    /// Writes to the three operand registers
    pub operand_writes: u64,
    /// Reads of `STATUS`
    pub status_polls: u64,
    /// Reads of `RESULT`
    pub result_reads: u64,
    /// Reads of `RESULT` while DONE was clear
    pub premature_result_reads: u64,
    /// Writes to read-only registers (dropped)
    pub ignored_writes: u64,
    /// Reads of write-only registers (return zero)
    pub ignored_reads: u64,
}

/// Software model of the MAC accelerator.
#[derive(Debug, Default)]
pub struct SoftwareMac {
    /// Operand registers A, B, C as written
    operands: [u32; 3],
    /// Committed `RESULT`
    result: u32,
    /// Value latched at START, committed when DONE rises
    pending: Option<u32>,
    /// Status reads left before DONE rises
    countdown: u32,
    /// `STATUS.DONE`
    done: bool,

    latency: u32,
    fault: Fault,

    stats: SimStats,
    /// Access log, only filled when tracing is on. An unbounded spin on a
    /// traced model grows this without limit.
    trace: Option<Vec<BusEvent>>,
}

impl SoftwareMac {
    /// Create a model that raises DONE on the first status read after START.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of status reads that return not-done after each START.
    #[must_use]
    pub fn with_latency(mut self, polls: u32) -> Self {
        self.latency = polls;
        self
    }

    /// Inject a fault.
    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    /// Record every access, for ordering checks.
    #[must_use]
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled.then(Vec::new);
        self
    }

    /// Access counters.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Every access since construction (or the last [`Self::clear_trace`]).
    /// Empty unless built [`Self::with_trace`].
    pub fn trace(&self) -> &[BusEvent] {
        self.trace.as_deref().unwrap_or_default()
    }

    /// Drop the recorded trace, keeping device state and counters.
    pub fn clear_trace(&mut self) {
        if let Some(trace) = &mut self.trace {
            trace.clear();
        }
    }

    fn record(&mut self, event: BusEvent) {
        if let Some(trace) = &mut self.trace {
            trace.push(event);
        }
    }

    /// Current `STATUS.DONE` without counting as a poll.
    pub const fn done(&self) -> bool {
        self.done
    }

    /// Operand registers as last written, as signed values.
    pub fn operands(&self) -> [i32; 3] {
        self.operands.map(mac::signed)
    }

    fn start(&mut self) {
        let [a, b, c] = self.operands();
        let correct = mac::expected(a, b, c);
        let latched = match self.fault {
            Fault::CorruptResult { xor } => correct ^ xor,
            Fault::None | Fault::NeverComplete => correct,
        };

        self.stats.starts += 1;
        self.done = false;
        self.countdown = self.latency;
        self.pending = match self.fault {
            Fault::NeverComplete => None,
            Fault::None | Fault::CorruptResult { .. } => Some(latched),
        };

        debug!(
            "sim: START a={a} b={b} c={c}, DONE in {} polls",
            self.countdown
        );
    }

    fn poll_status(&mut self) -> u32 {
        self.stats.status_polls += 1;

        if !self.done {
            if let Some(value) = self.pending {
                if self.countdown == 0 {
                    self.result = value;
                    self.pending = None;
                    self.done = true;
                } else {
                    self.countdown -= 1;
                }
            }
        }

        if self.done {
            status::DONE
        } else {
            0
        }
    }
}

impl RegisterBlock for SoftwareMac {
    fn read(&mut self, reg: Register) -> u32 {
        let value = match reg {
            Register::Status => self.poll_status(),
            Register::Result => {
                self.stats.result_reads += 1;
                if !self.done {
                    self.stats.premature_result_reads += 1;
                }
                self.result
            }
            Register::OperandA | Register::OperandB | Register::OperandC | Register::Control => {
                self.stats.ignored_reads += 1;
                0
            }
        };
        self.record(BusEvent::Read(reg, value));
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.record(BusEvent::Write(reg, value));
        match reg {
            Register::OperandA => self.operands[0] = value,
            Register::OperandB => self.operands[1] = value,
            Register::OperandC => self.operands[2] = value,
            Register::Control => {
                if value & control::START != 0 {
                    self.start();
                }
                return;
            }
            Register::Result | Register::Status => {
                self.stats.ignored_writes += 1;
                return;
            }
        }
        self.stats.operand_writes += 1;
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Software
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(sim: &mut SoftwareMac, a: i32, b: i32, c: i32) {
        sim.write(Register::OperandA, mac::operand_bits(a));
        sim.write(Register::OperandB, mac::operand_bits(b));
        sim.write(Register::OperandC, mac::operand_bits(c));
    }

    #[test]
    fn computes_on_start_only() {
        let mut sim = SoftwareMac::new();
        load(&mut sim, 5, 3, 2);
        assert_eq!(sim.read(Register::Status), 0);
        assert_eq!(sim.stats().starts, 0);

        sim.write(Register::Control, control::START);
        assert_eq!(sim.read(Register::Status), status::DONE);
        assert_eq!(sim.read(Register::Result), 17);
        assert_eq!(sim.stats().premature_result_reads, 0);
    }

    #[test]
    fn done_is_monotonic_after_latency() {
        let mut sim = SoftwareMac::new().with_latency(3);
        load(&mut sim, 7, 4, 1);
        sim.write(Register::Control, control::START);

        let polls: Vec<u32> = (0..8).map(|_| sim.read(Register::Status)).collect();
        assert_eq!(polls, [0, 0, 0, 1, 1, 1, 1, 1]);
        assert_eq!(sim.read(Register::Result), 29);
    }

    #[test]
    fn premature_read_returns_stale_result() {
        let mut sim = SoftwareMac::new().with_latency(2);
        load(&mut sim, 5, 3, 2);
        sim.write(Register::Control, control::START);
        while sim.read(Register::Status) == 0 {}
        assert_eq!(sim.read(Register::Result), 17);

        load(&mut sim, 7, 4, 1);
        sim.write(Register::Control, control::START);
        assert_eq!(sim.read(Register::Result), 17);
        assert_eq!(sim.stats().premature_result_reads, 1);
    }

    #[test]
    fn control_without_start_bit_is_ignored() {
        let mut sim = SoftwareMac::new();
        load(&mut sim, 1, 1, 1);
        sim.write(Register::Control, 0);
        sim.write(Register::Control, 0xFFFF_FFFE);
        assert_eq!(sim.stats().starts, 0);
        assert_eq!(sim.read(Register::Status), 0);
    }

    #[test]
    fn faults() {
        let mut sim = SoftwareMac::new().with_fault(Fault::CorruptResult { xor: 0x1 });
        load(&mut sim, 5, 3, 2);
        sim.write(Register::Control, control::START);
        assert_eq!(sim.read(Register::Status), status::DONE);
        assert_eq!(sim.read(Register::Result), 16);

        let mut sim = SoftwareMac::new().with_fault(Fault::NeverComplete);
        load(&mut sim, 5, 3, 2);
        sim.write(Register::Control, control::START);
        assert!((0..1000).all(|_| sim.read(Register::Status) == 0));
    }

    #[test]
    fn wrong_direction_accesses_are_dropped() {
        let mut sim = SoftwareMac::new();
        sim.write(Register::Result, 0xDEAD_BEEF);
        sim.write(Register::Status, status::DONE);
        assert_eq!(sim.read(Register::OperandA), 0);
        assert_eq!(sim.read(Register::Control), 0);
        assert!(!sim.done());
        assert_eq!(sim.stats().ignored_writes, 2);
        assert_eq!(sim.stats().ignored_reads, 2);
    }

    #[test]
    fn trace_records_program_order() {
        let mut sim = SoftwareMac::new().with_trace(true);
        load(&mut sim, -3, 6, 10);
        sim.write(Register::Control, control::START);
        sim.read(Register::Status);
        sim.read(Register::Result);

        assert_eq!(
            sim.trace(),
            [
                BusEvent::Write(Register::OperandA, 0xFFFF_FFFD),
                BusEvent::Write(Register::OperandB, 6),
                BusEvent::Write(Register::OperandC, 10),
                BusEvent::Write(Register::Control, control::START),
                BusEvent::Read(Register::Status, status::DONE),
                BusEvent::Read(Register::Result, 0xFFFF_FFF8),
            ]
        );
        sim.clear_trace();
        assert!(sim.trace().is_empty());
        assert_eq!(sim.stats().result_reads, 1);
    }

    #[test]
    fn untraced_spin_keeps_no_log() {
        let mut sim = SoftwareMac::new().with_fault(Fault::NeverComplete);
        load(&mut sim, 5, 3, 2);
        sim.write(Register::Control, control::START);
        for _ in 0..100_000 {
            assert_eq!(sim.read(Register::Status), 0);
        }
        assert!(sim.trace().is_empty());
        assert_eq!(sim.stats().status_polls, 100_000);
    }
}
