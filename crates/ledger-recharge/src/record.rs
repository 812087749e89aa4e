// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recharge record types: the unit of storage in the C4 registry.

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::{ExternalRefId, PartyId, RechargeId};
use serde::{Deserialize, Serialize};

/// Where a recharge reference originated.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum RechargeSource {
    /// Declared from an external payment processor or bank feed.
    External,
    /// Declared by an operator through manual entry.
    Manual,
    /// Reserved for a reference kind not yet in use.
    Future,
}

impl RechargeSource {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::External => "EXTERNAL",
            Self::Manual => "MANUAL",
            Self::Future => "FUTURE",
        }
    }
}

impl CanonicalEncode for RechargeSource {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// A recharge record's lifecycle status.
///
/// Legal transitions: `Declared -> Confirmed`, `Declared -> Voided`,
/// `Confirmed -> Voided`. `Voided` is terminal.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum RechargeStatus {
    /// Declared but not yet confirmed.
    Declared,
    /// Confirmed as effective.
    Confirmed,
    /// Voided; terminal.
    Voided,
}

impl RechargeStatus {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Declared => "DECLARED",
            Self::Confirmed => "CONFIRMED",
            Self::Voided => "VOIDED",
        }
    }

    /// Whether `self -> next` is a legal lifecycle transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Declared, Self::Confirmed) | (Self::Declared, Self::Voided) | (Self::Confirmed, Self::Voided)
        )
    }
}

impl CanonicalEncode for RechargeStatus {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// Caller-supplied fields for a new recharge record (pre-append).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AppendRechargeInput {
    /// Identifier for the new recharge. Must be unused in the registry.
    pub recharge_id: RechargeId,
    /// Where this reference originated.
    pub source: RechargeSource,
    /// Party the recharge is recorded against.
    pub party_id: PartyId,
    /// Reference amount.
    pub reference_amount: u64,
    /// Optional identifier from the originating external system.
    pub external_reference_id: Option<ExternalRefId>,
    /// Caller-supplied instant; must be a strictly positive integer.
    pub declared_timestamp: u64,
}

/// A recharge record as stored in the append-only log.
///
/// Every append produces a new `RechargeRecord`: a status change
/// (`confirm_recharge`/`void_recharge`) appends a new record for the same
/// `recharge_id` rather than mutating the existing one. The *effective*
/// record for a `recharge_id` is the one with the highest `sequence`.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct RechargeRecord {
    /// Identifier for this recharge.
    pub recharge_id: RechargeId,
    /// Where this reference originated.
    pub source: RechargeSource,
    /// Current lifecycle status as of this record.
    pub status: RechargeStatus,
    /// Party the recharge is recorded against.
    pub party_id: PartyId,
    /// Reference amount. Carries no settlement weight of its own; it
    /// exists to be linked against flow amounts for audit purposes.
    pub reference_amount: u64,
    /// Optional identifier from the originating external system.
    pub external_reference_id: Option<ExternalRefId>,
    /// Strictly increasing position of this record in the registry's log.
    pub sequence: u64,
    /// Instant this recharge was declared, as supplied by the caller.
    pub declared_timestamp: u64,
    /// Instant this recharge was confirmed, if it has been.
    pub confirmed_timestamp: Option<u64>,
    /// Instant this recharge was voided, if it has been.
    pub voided_timestamp: Option<u64>,
    /// Checksum of every field in this record except itself, including
    /// `previous_checksum`.
    pub checksum: String,
    /// The registry's chain tip immediately before this record was
    /// appended; `ledger_core::GENESIS_HASH` for the first record.
    pub previous_checksum: String,
}

impl RechargeRecord {
    /// Builds the canonical value tree used to compute this record's
    /// checksum: every field above except `checksum` itself.
    pub(crate) fn canonical_for_checksum(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("rechargeId", self.recharge_id.as_str().to_canonical()),
            ("source", self.source.to_canonical()),
            ("status", self.status.to_canonical()),
            ("partyId", self.party_id.as_str().to_canonical()),
            ("referenceAmount", self.reference_amount.to_canonical()),
            (
                "externalReferenceId",
                self.external_reference_id.as_ref().map(|id| id.as_str().to_string()).to_canonical(),
            ),
            ("sequence", self.sequence.to_canonical()),
            ("declaredTimestamp", self.declared_timestamp.to_canonical()),
            ("confirmedTimestamp", self.confirmed_timestamp.to_canonical()),
            ("voidedTimestamp", self.voided_timestamp.to_canonical()),
            ("previousChecksum", self.previous_checksum.to_canonical()),
        ])
    }
}

/// Result of a successful `append_recharge`/`confirm_recharge`/
/// `void_recharge` call.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AppendRechargeResult {
    /// The record that was appended.
    pub record: RechargeRecord,
}
