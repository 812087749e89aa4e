// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! C3 Attribution Engine: pure allocation of each flow's amount to a fixed
//! set of parties by basis points, with optional secondary distribution
//! across an agent referral hierarchy.
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

/// Attribution entries and per-flow results.
pub mod entry;
/// Attribution engine error kinds.
pub mod error;
/// The pure attribution algorithms.
pub mod engine;
/// Agent referral hierarchies.
pub mod hierarchy;
/// The frozen per-period result type.
pub mod period_result;
/// Attribution rules and rule sets.
pub mod rule;
/// Hash-chained attribution snapshots.
pub mod snapshot;

pub use engine::{attribute_flow, attribute_period, attribute_to_agent_hierarchy};
pub use entry::{AttributionEntry, FlowAttributionResult};
pub use error::AttributionError;
pub use hierarchy::{validate_hierarchy_is_dag, AgentHierarchy, AgentHierarchyNode, MAX_HIERARCHY_DEPTH};
pub use period_result::PeriodAttributionResult;
pub use rule::{AttributionRule, AttributionRuleSet, BASIS_POINTS_TOTAL, MAX_RULES_PER_SET};
pub use snapshot::{create_snapshot_from_attribution, AttributionSnapshot};
