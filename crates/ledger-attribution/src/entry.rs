// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attribution entries: one party's allocated share of one flow's amount.

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::{EntryId, FlowId, PartyId, PartyType, RuleSetId};

/// A single party's allocated share of a flow's amount.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AttributionEntry {
    /// This entry's identifier.
    pub entry_id: EntryId,
    /// The receiving party.
    pub party_id: PartyId,
    /// The receiving party's type.
    pub party_type: PartyType,
    /// The amount allocated to this party.
    pub amount: u64,
    /// The flow this allocation was derived from.
    pub source_flow_id: FlowId,
    /// The rule set this allocation followed.
    pub rule_set_id: RuleSetId,
    /// The basis points actually applied to produce `amount` (before any
    /// remainder was added).
    pub applied_basis_points: u16,
    /// The full amount being distributed across the rule set.
    pub original_amount: u64,
}

impl CanonicalEncode for AttributionEntry {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("entryId", self.entry_id.as_str().to_canonical()),
            ("partyId", self.party_id.as_str().to_canonical()),
            ("partyType", self.party_type.to_canonical()),
            ("amount", self.amount.to_canonical()),
            ("sourceFlowId", self.source_flow_id.as_str().to_canonical()),
            ("ruleSetId", self.rule_set_id.as_str().to_canonical()),
            ("appliedBasisPoints", u32::from(self.applied_basis_points).to_canonical()),
            ("originalAmount", self.original_amount.to_canonical()),
        ])
    }
}

/// The result of attributing one flow's amount across a rule set.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FlowAttributionResult {
    /// The flow this result was derived from.
    pub source_flow_id: FlowId,
    /// The full amount that was distributed.
    pub original_amount: u64,
    /// The allocated entries, in rule-set order.
    pub entries: Vec<AttributionEntry>,
    /// `sum(entries.amount)`; always equal to `original_amount`.
    pub total_attributed: u64,
    /// `original_amount - total_attributed`; always zero.
    pub remainder: u64,
}

impl CanonicalEncode for FlowAttributionResult {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("sourceFlowId", self.source_flow_id.as_str().to_canonical()),
            ("originalAmount", self.original_amount.to_canonical()),
            ("entries", CanonicalValue::array(self.entries.iter().map(CanonicalEncode::to_canonical))),
            ("totalAttributed", self.total_attributed.to_canonical()),
            ("remainder", self.remainder.to_canonical()),
        ])
    }
}
