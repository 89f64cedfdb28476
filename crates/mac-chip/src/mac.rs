// SPDX-License-Identifier: AGPL-3.0-only

//! Reference arithmetic of the MAC datapath.
//!
//! The block multiplies and adds in 32-bit two's complement and drops any
//! carry out, so the reference is `a.wrapping_mul(b).wrapping_add(c)`
//! reinterpreted as the unsigned bit pattern that lands in `RESULT`.

/// Expected `RESULT` contents for operands `(a, b, c)`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn expected(a: i32, b: i32, c: i32) -> u32 {
    a.wrapping_mul(b).wrapping_add(c) as u32
}

/// Bit pattern written to an operand register for a signed value.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn operand_bits(value: i32) -> u32 {
    value as u32
}

/// Signed interpretation of a raw `RESULT` word.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn signed(result: u32) -> i32 {
    result as i32
}
