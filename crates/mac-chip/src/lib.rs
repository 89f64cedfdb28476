// SPDX-License-Identifier: AGPL-3.0-only

//! Silicon model for the MAC (multiply-accumulate) accelerator.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the block: register offsets, bit definitions, the default
//! memory map, and the arithmetic the datapath performs.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`regs`] | Register map: six 32-bit cells, offsets and bit fields |
//! | [`map`] | Where the block lives in the physical address space |
//! | [`mac`] | Reference `a * b + c` arithmetic, bit-exact with the datapath |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod mac;
pub mod map;
pub mod regs;

pub use regs::{Access, Register};
