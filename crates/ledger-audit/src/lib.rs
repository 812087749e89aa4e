// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! C5 Audit Correlator: a deterministic report over C1 flows, C4 recharges,
//! and C3 attribution, classifying each flow's correlation.
//!
//! Pure; no recomputation. Inputs are effective records and frozen results
//! the caller already holds; this crate only classifies and counts them.
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

/// Audit correlator error kinds.
pub mod error;
/// Audit row types.
pub mod row;
/// The audit correlation engine.
pub mod session;

pub use error::AuditError;
pub use row::{AttributionBreakdownRef, AuditFlag, AuditRow, AuditStatus};
pub use session::{build_audit_session, AuditSummary, IntegrityInputs};
