// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared identifiers, canonical serialization, and error vocabulary for the
//! ledger stack.
//!
//! `ledger-core` has no knowledge of flows, reconciliation, attribution,
//! recharges, or audits — it only provides the vocabulary every downstream
//! crate builds on: branded identifiers ([`ids`]), party identity
//! ([`party`]), the canonical checksum algorithm ([`canonical`]), the shared
//! error code set ([`error`]), and out-of-domain term hygiene ([`guard`]).
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

/// Canonical serialization and the `simple_hash` determinism witness.
pub mod canonical;
/// Shared error vocabulary: stable string codes and structured detail maps.
pub mod error;
/// Out-of-domain term hygiene.
pub mod guard;
/// Branded string identifiers shared across the ledger stack.
pub mod ids;
/// Party identity shared as a foreign key by flows, rules, and hierarchies.
pub mod party;

pub use canonical::{checksum, simple_hash, to_canonical_string, CanonicalEncode, CanonicalValue, GENESIS_HASH};
pub use error::{CodedError, ErrorCode};
pub use guard::{
    assert_no_audit_forbidden_concepts, assert_no_default_forbidden_concepts,
    assert_no_forbidden_concepts, ForbiddenConceptError, AUDIT_FORBIDDEN_TERMS,
    DEFAULT_FORBIDDEN_TERMS,
};
pub use ids::{
    AuditRowId, AuditSessionId, EntryId, ExternalRefId, FlowId, HierarchyId, LinkId, PartyId,
    PeriodId, RechargeId, RuleSetId, SessionId, SnapshotId,
};
pub use party::{Bucket, Party, PartyType};
