// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared error vocabulary: stable string codes and structured detail maps.
//!
//! Each component crate (`ledger-flow`, `ledger-reconcile`, ...) defines its
//! own `thiserror`-derived error enum, following `echo-cas::CasError` and
//! `warp-core::tick_patch::TickPatchError` (a closed enum, one variant per
//! failure mode, each carrying the fields needed to explain itself). What
//! this module adds is the cross-component contract: every such enum also
//! implements [`CodedError`], exposing a stable [`ErrorCode`] and an opaque
//! `details()` map, so a caller above all five components (an audit report,
//! a CLI, a log line) can handle failures uniformly without matching on five
//! unrelated enums.

use std::collections::BTreeMap;

/// A stable, component-spanning error code.
///
/// Codes are part of the external contract: renaming a variant changes its
/// `as_str()` output, which downstream consumers may match on. Treat this
/// enum the way `warp-core` treats `TickPatchError` — additive, never
/// renaming a published variant.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum ErrorCode {
    // ── flow registry (C1) ──────────────────────────────────────────────
    /// A flow with this identifier already exists in the registry.
    DuplicateFlowId,
    /// No flow with this identifier exists.
    FlowNotFound,
    /// The requested lifecycle transition is not legal from the flow's
    /// current status.
    InvalidStatusTransition,
    /// A timestamp field was zero or otherwise not a valid instant.
    InvalidTimestamp,
    /// An amount field failed its validity check.
    InvalidAmount,

    // ── reconciliation engine (C2) ───────────────────────────────────────
    /// A period's boundary timestamps are inconsistent (end before start,
    /// or either bound non-positive).
    InvalidPeriod,
    /// The requested period has no effective flow records to reconcile.
    NoDataForPeriod,
    /// A numeric field that must be an integer was not one.
    NonIntegerValue,
    /// No snapshot with the requested identifier exists.
    SnapshotNotFound,
    /// A party's declared type is not one of the recognized variants.
    InvalidPartyType,

    // ── attribution engine (C3) ──────────────────────────────────────────
    /// A rule's basis points fall outside `[0, 10000]`.
    InvalidBasisPoints,
    /// A rule set's basis points do not sum to 10000, or its entry count
    /// falls outside `[1, 100]`.
    InvalidRuleSetTotal,
    /// A rule set's entry count falls outside the permitted range.
    ///
    /// Not named in the closed Attribution error set but needed to report
    /// the `|rules| \in [1, 100]` violation distinctly from a bad basis-point
    /// sum.
    RuleCountOutOfRange,
    /// Resolving a hierarchy node revisited a node already on the current
    /// path.
    HierarchyCycleDetected,
    /// Resolving a hierarchy node exceeded the maximum permitted depth.
    InvalidHierarchyLevel,
    /// A referenced parent agent does not exist in the hierarchy.
    ParentAgentNotFound,
    /// A hierarchy was constructed with the same agent id more than once.
    DuplicateAgent,
    /// The sum of an attribution result's entries did not equal the
    /// original amount being distributed.
    AmountMismatch,

    // ── recharge reference map (C4) ───────────────────────────────────────
    /// A recharge with this identifier already exists in the registry.
    DuplicateRechargeId,
    /// No recharge with this identifier exists.
    RechargeNotFound,
    /// A link with this identifier already exists in the link registry.
    DuplicateLinkId,
    /// No link with this identifier exists.
    LinkNotFound,

    // ── audit correlator (C5) ─────────────────────────────────────────────
    /// An audit session identifier was empty or otherwise malformed.
    InvalidSessionId,
    /// An audit session with this identifier already exists.
    DuplicateSession,
    /// No audit session with this identifier exists.
    SessionNotFound,
    /// An input to an audit operation was structurally invalid.
    InvalidInput,

    // ── cross-cutting ─────────────────────────────────────────────────────
    /// A recomputed checksum did not match the stored checksum.
    ChecksumMismatch,
    /// A hash-chain link did not match the previous record's checksum.
    ChainBroken,
    /// A string field contained a forbidden out-of-domain term.
    ForbiddenTermDetected,
}

impl ErrorCode {
    /// The stable `SCREAMING_SNAKE_CASE` code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateFlowId => "DUPLICATE_FLOW_ID",
            Self::FlowNotFound => "FLOW_NOT_FOUND",
            Self::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            Self::InvalidTimestamp => "INVALID_TIMESTAMP",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidPeriod => "INVALID_PERIOD",
            Self::NoDataForPeriod => "NO_DATA_FOR_PERIOD",
            Self::NonIntegerValue => "NON_INTEGER_VALUE",
            Self::SnapshotNotFound => "SNAPSHOT_NOT_FOUND",
            Self::InvalidPartyType => "INVALID_PARTY_TYPE",
            Self::InvalidBasisPoints => "INVALID_BASIS_POINTS",
            Self::InvalidRuleSetTotal => "INVALID_RULE_SET_TOTAL",
            Self::RuleCountOutOfRange => "RULE_COUNT_OUT_OF_RANGE",
            Self::HierarchyCycleDetected => "HIERARCHY_CYCLE_DETECTED",
            Self::InvalidHierarchyLevel => "INVALID_HIERARCHY_LEVEL",
            Self::ParentAgentNotFound => "PARENT_AGENT_NOT_FOUND",
            Self::DuplicateAgent => "DUPLICATE_AGENT",
            Self::AmountMismatch => "AMOUNT_MISMATCH",
            Self::DuplicateRechargeId => "DUPLICATE_RECHARGE_ID",
            Self::RechargeNotFound => "RECHARGE_NOT_FOUND",
            Self::DuplicateLinkId => "DUPLICATE_LINK_ID",
            Self::LinkNotFound => "LINK_NOT_FOUND",
            Self::InvalidSessionId => "INVALID_SESSION_ID",
            Self::DuplicateSession => "DUPLICATE_SESSION",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
            Self::ChecksumMismatch => "CHECKSUM_MISMATCH",
            Self::ChainBroken => "CHAIN_BROKEN",
            Self::ForbiddenTermDetected => "FORBIDDEN_TERM_DETECTED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every component error enum to expose a stable code and an
/// opaque map of structured detail fields (e.g. `{"flowId": "f-1"}`).
///
/// The default `details()` is empty; component enums override it per variant
/// for whichever fields are useful to a caller that only sees the code.
pub trait CodedError: std::error::Error {
    /// The stable code for this error value.
    fn code(&self) -> ErrorCode;

    /// Structured, string-valued detail fields for this error value.
    fn details(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable_strings() {
        assert_eq!(ErrorCode::DuplicateFlowId.as_str(), "DUPLICATE_FLOW_ID");
        assert_eq!(ErrorCode::ChainBroken.as_str(), "CHAIN_BROKEN");
        assert_eq!(ErrorCode::ForbiddenTermDetected.as_str(), "FORBIDDEN_TERM_DETECTED");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ErrorCode::NoDataForPeriod.to_string(), ErrorCode::NoDataForPeriod.as_str());
    }
}
