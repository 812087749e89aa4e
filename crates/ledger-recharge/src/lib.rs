// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! C4 Recharge Reference Map: append-only recharge declarations and their
//! cross-references to C1 flows.
//!
//! A recharge carries no settlement weight of its own; it exists to be
//! linked against flow amounts so the C5 audit correlator can detect
//! recharges with no matching flow and flows with no matching recharge.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

/// Recharge registry error kinds.
pub mod error;
/// Recharge-to-flow links.
pub mod link;
/// Recharge record types.
pub mod record;
/// The append-only, hash-chained recharge record registry.
pub mod registry;

pub use error::RechargeError;
pub use link::{create_recharge_link, CreateLinkInput, LinkRegistry, RechargeLink};
pub use record::{AppendRechargeInput, AppendRechargeResult, RechargeRecord, RechargeSource, RechargeStatus};
pub use registry::RechargeRegistry;
