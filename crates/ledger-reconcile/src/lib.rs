// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! C2 Reconciliation Engine: pure derivation of a per-period
//! [`PeriodReconciliationResult`] from a [`ledger_flow::FlowRegistry`], plus
//! hash-chained settlement snapshots frozen from that result.
//!
//! Nothing in this crate mutates a registry, reads a clock, or performs I/O.
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

/// Discrepancy findings surfaced during reconciliation.
pub mod discrepancy;
/// The pure reconciliation algorithm.
pub mod engine;
/// Reconciliation engine error kinds.
pub mod error;
/// Reconciliation periods.
pub mod period;
/// The frozen per-period result type.
pub mod result;
/// Hash-chained settlement snapshots.
pub mod snapshot;
/// Per-party and per-bucket aggregation.
pub mod summary;

pub use discrepancy::{Discrepancy, DiscrepancyKind, Severity};
pub use engine::reconcile_period;
pub use error::ReconcileError;
pub use period::Period;
pub use result::{PeriodReconciliationResult, ReconciliationStatus};
pub use snapshot::{create_snapshots_from_reconciliation, verify_snapshot_chain, verify_snapshot_checksum, SettlementSnapshot};
pub use summary::{FlowSummary, SettlementTotal};
