// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Audit row types: one row per flow in an audit session's scope.

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::{AuditRowId, AuditSessionId, FlowId, PartyId, PartyType, RechargeId};

/// A condition an audit row carries alongside its [`AuditStatus`].
///
/// Flags are findings, not errors: a row with flags still completes and is
/// reported, it just explains why its status is not `MATCHED`.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AuditFlag {
    /// The flow has no recharge link at all.
    FlowNoRecharge,
    /// A recharge link exists whose recharge has no corresponding flow
    /// (reserved for recharge-centric audit views; unreachable when
    /// iterating flow-first).
    RechargeNoFlow,
    /// The flow has no attribution entries.
    FlowNoAttribution,
    /// An attribution entry exists with no corresponding flow (reserved
    /// for attribution-centric audit views; unreachable when iterating
    /// flow-first).
    AttributionNoFlow,
    /// A party appears in the flow's attribution but not in any linked
    /// recharge's party.
    PartyMismatch,
    /// The flow's linked recharge exists but is not `CONFIRMED`.
    RechargeNotConfirmed,
    /// The flow itself is not `CONFIRMED`.
    FlowNotConfirmed,
    /// The flow resolves to more than one link in the link registry.
    MultipleAttributions,
    /// One of this row's inputs failed checksum verification.
    ChecksumFailed,
}

impl AuditFlag {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FlowNoRecharge => "FLOW_NO_RECHARGE",
            Self::RechargeNoFlow => "RECHARGE_NO_FLOW",
            Self::FlowNoAttribution => "FLOW_NO_ATTRIBUTION",
            Self::AttributionNoFlow => "ATTRIBUTION_NO_FLOW",
            Self::PartyMismatch => "PARTY_MISMATCH",
            Self::RechargeNotConfirmed => "RECHARGE_NOT_CONFIRMED",
            Self::FlowNotConfirmed => "FLOW_NOT_CONFIRMED",
            Self::MultipleAttributions => "MULTIPLE_ATTRIBUTIONS",
            Self::ChecksumFailed => "CHECKSUM_FAILED",
        }
    }

    /// Whether this flag should prevent an otherwise-eligible row from
    /// being classified `MATCHED`.
    #[must_use]
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::PartyMismatch | Self::MultipleAttributions | Self::ChecksumFailed)
    }
}

impl CanonicalEncode for AuditFlag {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// A row's overall correlation status.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AuditStatus {
    /// Recharge and attribution are both present, confirmed, and free of
    /// critical flags.
    Matched,
    /// Some but not all expected correlations are present.
    Partial,
    /// A correlation was expected but is absent (e.g. an unconfirmed
    /// recharge).
    Missing,
    /// The flow has neither a recharge link nor attribution.
    Orphan,
}

impl AuditStatus {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "MATCHED",
            Self::Partial => "PARTIAL",
            Self::Missing => "MISSING",
            Self::Orphan => "ORPHAN",
        }
    }
}

impl CanonicalEncode for AuditStatus {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// One `(partyId, partyType)` pair that received attribution for a flow.
/// Carries no amounts by design: the audit layer correlates identity, not
/// value.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct AttributionBreakdownRef {
    /// The party that received attribution.
    pub party_id: PartyId,
    /// That party's role.
    pub party_type: PartyType,
}

impl CanonicalEncode for AttributionBreakdownRef {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("partyId", self.party_id.as_str().to_canonical()),
            ("partyType", self.party_type.to_canonical()),
        ])
    }
}

/// One row of a deterministic audit report: a single flow's correlation
/// against recharges and attribution.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AuditRow {
    /// Identifier for this row.
    pub row_id: AuditRowId,
    /// The session this row belongs to.
    pub session_id: AuditSessionId,
    /// This row's position in the session, ascending with the source
    /// flow's `sequence`.
    pub sequence: u64,
    /// The flow this row reports on.
    pub flow_id: FlowId,
    /// The recharge linked to this flow, if any, chosen canonically
    /// (lowest `rechargeId`) when more than one link exists.
    pub recharge_id: Option<RechargeId>,
    /// Parties that received attribution for this flow.
    pub attribution_breakdown: Vec<AttributionBreakdownRef>,
    /// This row's correlation classification.
    pub audit_status: AuditStatus,
    /// Findings explaining the classification.
    pub flags: Vec<AuditFlag>,
    /// Checksum over every field above except itself.
    pub checksum: String,
}

impl AuditRow {
    pub(crate) fn canonical_for_checksum(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("rowId", self.row_id.as_str().to_canonical()),
            ("sessionId", self.session_id.as_str().to_canonical()),
            ("sequence", self.sequence.to_canonical()),
            ("flowId", self.flow_id.as_str().to_canonical()),
            ("rechargeId", self.recharge_id.as_ref().map(|id| id.as_str().to_string()).to_canonical()),
            ("attributionBreakdown", CanonicalValue::array(self.attribution_breakdown.iter().map(CanonicalEncode::to_canonical))),
            ("auditStatus", self.audit_status.to_canonical()),
            ("flags", CanonicalValue::array(self.flags.iter().map(CanonicalEncode::to_canonical))),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_flags_block_matched_classification() {
        assert!(AuditFlag::PartyMismatch.is_critical());
        assert!(AuditFlag::MultipleAttributions.is_critical());
        assert!(AuditFlag::ChecksumFailed.is_critical());
        assert!(!AuditFlag::FlowNoRecharge.is_critical());
        assert!(!AuditFlag::RechargeNotConfirmed.is_critical());
    }

    #[test]
    fn stable_labels_match_closed_vocabulary() {
        assert_eq!(AuditStatus::Matched.as_str(), "MATCHED");
        assert_eq!(AuditFlag::FlowNoRecharge.as_str(), "FLOW_NO_RECHARGE");
    }
}
