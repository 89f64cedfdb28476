// SPDX-License-Identifier: AGPL-3.0-only

//! Register map for the MAC accelerator.
//!
//! ```text
//! Offset  Name        Access  Contents
//! ──────  ──────────  ──────  ─────────────────────────────────────
//! +0x00   OPERAND_A   W       multiplicand (i32 bit pattern)
//! +0x04   OPERAND_B   W       multiplier   (i32 bit pattern)
//! +0x08   OPERAND_C   W       addend       (i32 bit pattern)
//! +0x0C   RESULT      R       a * b + c, valid once STATUS.DONE is set
//! +0x10   STATUS      R       bit 0 = DONE
//! +0x14   CONTROL     W       bit 0 = START
//! ```
//!
//! All registers are 32 bits wide and naturally aligned.

// ── Operands ─────────────────────────────────────────────────────────────────

/// Operand A (multiplicand).
pub const OPERAND_A: usize = 0x00;
/// Operand B (multiplier).
pub const OPERAND_B: usize = 0x04;
/// Operand C (addend).
pub const OPERAND_C: usize = 0x08;

// ── Result and handshake ─────────────────────────────────────────────────────

/// Result register. Contents are unspecified until `STATUS.DONE` is set.
pub const RESULT: usize = 0x0C;
/// Status register.
pub const STATUS: usize = 0x10;
/// Control register.
pub const CONTROL: usize = 0x14;

/// Width of one register in bytes.
pub const REGISTER_WIDTH: usize = 4;

/// Total span of the register block in bytes.
pub const BLOCK_SIZE: usize = CONTROL + REGISTER_WIDTH;

// ── Status register bit definitions ──────────────────────────────────────────

pub mod status {
    //! `STATUS` bit fields.

    /// Computation finished; `RESULT` is valid.
    pub const DONE: u32 = 1 << 0;
}

// ── Control register bit definitions ─────────────────────────────────────────

pub mod control {
    //! `CONTROL` bit fields.

    /// Latch the operands and begin `a * b + c`.
    pub const START: u32 = 1 << 0;
}

/// Direction a register may be accessed from software.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Software writes, the device reads.
    WriteOnly,
    /// The device writes, software reads.
    ReadOnly,
}

/// One of the six registers of the block.
///
/// Callers name registers through this enum; byte offsets are only ever
/// derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// `+0x00`, write-only.
    OperandA,
    /// `+0x04`, write-only.
    OperandB,
    /// `+0x08`, write-only.
    OperandC,
    /// `+0x0C`, read-only.
    Result,
    /// `+0x10`, read-only.
    Status,
    /// `+0x14`, write-only.
    Control,
}

impl Register {
    /// Every register, in offset order.
    pub const ALL: [Self; 6] = [
        Self::OperandA,
        Self::OperandB,
        Self::OperandC,
        Self::Result,
        Self::Status,
        Self::Control,
    ];

    /// Byte offset from the block base.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::OperandA => OPERAND_A,
            Self::OperandB => OPERAND_B,
            Self::OperandC => OPERAND_C,
            Self::Result => RESULT,
            Self::Status => STATUS,
            Self::Control => CONTROL,
        }
    }

    /// Word index from the block base (offset / 4).
    #[must_use]
    pub const fn index(self) -> usize {
        self.offset() / REGISTER_WIDTH
    }

    /// Software access direction.
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Result | Self::Status => Access::ReadOnly,
            Self::OperandA | Self::OperandB | Self::OperandC | Self::Control => Access::WriteOnly,
        }
    }

    /// Datasheet name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OperandA => "OPERAND_A",
            Self::OperandB => "OPERAND_B",
            Self::OperandC => "OPERAND_C",
            Self::Result => "RESULT",
            Self::Status => "STATUS",
            Self::Control => "CONTROL",
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_match_datasheet() {
        assert_eq!(OPERAND_A, 0x00);
        assert_eq!(OPERAND_B, 0x04);
        assert_eq!(OPERAND_C, 0x08);
        assert_eq!(RESULT, 0x0C);
        assert_eq!(STATUS, 0x10);
        assert_eq!(CONTROL, 0x14);
        assert_eq!(BLOCK_SIZE, 0x18);
    }

    #[test]
    fn registers_are_aligned_and_distinct() {
        for (i, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.offset() % REGISTER_WIDTH, 0, "{reg} unaligned");
            assert_eq!(reg.index(), i);
        }
    }

    #[test]
    fn access_directions() {
        assert_eq!(Register::Result.access(), Access::ReadOnly);
        assert_eq!(Register::Status.access(), Access::ReadOnly);
        assert_eq!(Register::Control.access(), Access::WriteOnly);
        assert_eq!(Register::OperandB.access(), Access::WriteOnly);
    }

    #[test]
    fn handshake_bits_are_bit_zero() {
        assert_eq!(status::DONE, 1);
        assert_eq!(control::START, 1);
    }
}
