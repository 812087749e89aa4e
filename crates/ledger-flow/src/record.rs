// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flow record types: the unit of storage in the L0 registry.

use std::collections::BTreeMap;

use ledger_core::{
    canonical::{CanonicalEncode, CanonicalValue},
    FlowId, PartyId, PartyType, SessionId,
};
use serde::{Deserialize, Serialize};

/// The kind of value-movement reference a flow records.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum FlowType {
    /// A buy-in reference.
    BuyinRef,
    /// A cash-out reference.
    CashoutRef,
    /// A rake reference.
    RakeRef,
    /// An adjustment reference.
    AdjustRef,
}

impl FlowType {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuyinRef => "BUYIN_REF",
            Self::CashoutRef => "CASHOUT_REF",
            Self::RakeRef => "RAKE_REF",
            Self::AdjustRef => "ADJUST_REF",
        }
    }
}

impl CanonicalEncode for FlowType {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// The direction of a flow relative to its party.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Value reference moving in.
    In,
    /// Value reference moving out.
    Out,
}

impl Direction {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

impl CanonicalEncode for Direction {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// A flow record's lifecycle status.
///
/// Legal transitions: `Pending -> Confirmed`, `Pending -> Void`, `Confirmed
/// -> Void`. `Void` is terminal.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum FlowStatus {
    /// Declared but not yet confirmed.
    Pending,
    /// Confirmed as effective.
    Confirmed,
    /// Voided; terminal.
    Void,
}

impl FlowStatus {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Void => "VOID",
        }
    }

    /// Whether `self -> next` is a legal lifecycle transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed) | (Self::Pending, Self::Void) | (Self::Confirmed, Self::Void)
        )
    }
}

impl CanonicalEncode for FlowStatus {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// Caller-supplied fields for a new flow record (pre-append).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AppendFlowInput {
    /// Identifier for the new flow. Must be unused in the registry.
    pub flow_id: FlowId,
    /// Upstream session that produced this flow.
    pub session_id: SessionId,
    /// Party identifier the flow is recorded against.
    pub party_id: PartyId,
    /// Party's role.
    pub party_type: PartyType,
    /// Flow kind.
    pub flow_type: FlowType,
    /// Direction relative to the party.
    pub direction: Direction,
    /// Reference amount.
    pub amount: u64,
    /// Caller-supplied instant; must be a strictly positive integer.
    pub injected_timestamp: u64,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional free-text metadata, checked for forbidden terms alongside
    /// `description`.
    pub metadata: Option<BTreeMap<String, String>>,
}

/// A flow record as stored in the append-only log.
///
/// Every append produces a new `FlowRecord`: a status change (`confirm_flow`/
/// `void_flow`) appends a new record for the same `flow_id` rather than
/// mutating the existing one. The *effective* record for a `flow_id` is the
/// one with the highest `sequence`.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Identifier for this flow.
    pub flow_id: FlowId,
    /// Upstream session that produced this flow.
    pub session_id: SessionId,
    /// Party identifier the flow is recorded against.
    pub party_id: PartyId,
    /// Party's role.
    pub party_type: PartyType,
    /// Flow kind.
    pub flow_type: FlowType,
    /// Direction relative to the party.
    pub direction: Direction,
    /// Reference amount.
    pub amount: u64,
    /// Current lifecycle status as of this record.
    pub status: FlowStatus,
    /// Instant this flow was injected, as supplied by the caller.
    pub injected_timestamp: u64,
    /// Instant this flow was confirmed, if it has been.
    pub confirmed_timestamp: Option<u64>,
    /// Instant this flow was voided, if it has been.
    pub voided_timestamp: Option<u64>,
    /// Strictly increasing position of this record in the registry's log.
    pub sequence: u64,
    /// Checksum of every field in this record except itself, including
    /// `previous_checksum`.
    pub checksum: String,
    /// The registry's chain tip immediately before this record was
    /// appended; `ledger_core::GENESIS_HASH` for the first record.
    pub previous_checksum: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional free-text metadata.
    pub metadata: Option<BTreeMap<String, String>>,
}

impl FlowRecord {
    /// Builds the canonical value tree used to compute this record's
    /// checksum: every field above except `checksum` itself.
    pub(crate) fn canonical_for_checksum(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("flowId", self.flow_id.as_str().to_canonical()),
            ("sessionId", self.session_id.as_str().to_canonical()),
            ("partyId", self.party_id.as_str().to_canonical()),
            ("partyType", self.party_type.to_canonical()),
            ("type", self.flow_type.to_canonical()),
            ("direction", self.direction.to_canonical()),
            ("amount", self.amount.to_canonical()),
            ("status", self.status.to_canonical()),
            ("injectedTimestamp", self.injected_timestamp.to_canonical()),
            ("confirmedTimestamp", self.confirmed_timestamp.to_canonical()),
            ("voidedTimestamp", self.voided_timestamp.to_canonical()),
            ("sequence", self.sequence.to_canonical()),
            ("previousChecksum", self.previous_checksum.to_canonical()),
            ("description", self.description.to_canonical()),
            ("metadata", metadata_to_canonical(self.metadata.as_ref())),
        ])
    }
}

fn metadata_to_canonical(metadata: Option<&BTreeMap<String, String>>) -> CanonicalValue {
    match metadata {
        None => CanonicalValue::Null,
        Some(map) => {
            let mut fields = std::collections::BTreeMap::new();
            for (k, v) in map {
                fields.insert(k.clone(), CanonicalValue::String(v.clone()));
            }
            CanonicalValue::Object(fields)
        }
    }
}

/// Result of a successful `append_flow`/`confirm_flow`/`void_flow` call.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AppendResult {
    /// The record that was appended.
    pub record: FlowRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── 1. lifecycle transitions ─────────────────────────────────────────

    #[test]
    fn pending_can_reach_confirmed_or_void() {
        assert!(FlowStatus::Pending.can_transition_to(FlowStatus::Confirmed));
        assert!(FlowStatus::Pending.can_transition_to(FlowStatus::Void));
    }

    #[test]
    fn confirmed_can_only_reach_void() {
        assert!(FlowStatus::Confirmed.can_transition_to(FlowStatus::Void));
        assert!(!FlowStatus::Confirmed.can_transition_to(FlowStatus::Pending));
    }

    #[test]
    fn void_is_terminal() {
        assert!(!FlowStatus::Void.can_transition_to(FlowStatus::Pending));
        assert!(!FlowStatus::Void.can_transition_to(FlowStatus::Confirmed));
        assert!(!FlowStatus::Void.can_transition_to(FlowStatus::Void));
    }

    // ── 2. labels used in canonical serialization ────────────────────────

    #[test]
    fn stable_labels_match_spec_vocabulary() {
        assert_eq!(FlowType::BuyinRef.as_str(), "BUYIN_REF");
        assert_eq!(Direction::In.as_str(), "IN");
        assert_eq!(FlowStatus::Pending.as_str(), "PENDING");
    }
}
