// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! L0 Flow Registry (C1): append-only, hash-chained storage of flow records
//! and their status transitions.
//!
//! Nothing in this crate reads a clock or performs I/O. Every timestamp is a
//! caller-supplied parameter; every operation is synchronous and either
//! appends a fully-computed record or leaves the registry untouched.
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

/// A `RwLock`-guarded wrapper for concurrent callers.
pub mod concurrent;
/// Flow registry error kinds.
pub mod error;
/// Flow record types.
pub mod record;
/// The append-only, hash-chained flow record registry.
pub mod registry;

pub use concurrent::ConcurrentFlowRegistry;
pub use error::FlowError;
pub use record::{AppendFlowInput, AppendResult, Direction, FlowRecord, FlowStatus, FlowType};
pub use registry::FlowRegistry;
