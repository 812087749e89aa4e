// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Immutable, hash-chained attribution snapshots, one per (period, rule
//! set).

use std::collections::BTreeMap;

use ledger_core::canonical::{checksum, CanonicalEncode, CanonicalValue, GENESIS_HASH};
use ledger_core::{HierarchyId, PartyId, PartyType, PeriodId, RuleSetId};

use crate::entry::AttributionEntry;
use crate::period_result::PeriodAttributionResult;

/// An immutable snapshot frozen from a [`PeriodAttributionResult`]: the
/// flattened entries plus per-party-type and per-party totals, in
/// `(partyType, partyId)` order.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AttributionSnapshot {
    /// The period this snapshot summarizes.
    pub period_id: PeriodId,
    /// The rule set every entry was attributed against.
    pub rule_set_id: RuleSetId,
    /// The agent hierarchy used for secondary distribution, if any.
    pub hierarchy_id: Option<HierarchyId>,
    /// Every entry from every attributed flow, flattened in flow-processing
    /// order.
    pub entries: Vec<AttributionEntry>,
    /// Total amount received by each party type, ascending by
    /// [`PartyType`].
    pub totals_by_party_type: BTreeMap<PartyType, u64>,
    /// Total amount received by each party, ascending by `(partyType,
    /// partyId)`.
    pub totals_by_party: Vec<(PartyType, PartyId, u64)>,
    /// When this snapshot was frozen.
    pub created_timestamp: u64,
    /// The predecessor snapshot's checksum, or [`GENESIS_HASH`] for the
    /// first snapshot in a chain.
    pub previous_hash: String,
    /// Deterministic checksum over every field above.
    pub checksum: String,
}

impl CanonicalEncode for AttributionSnapshot {
    fn to_canonical(&self) -> CanonicalValue {
        let by_type: BTreeMap<String, CanonicalValue> =
            self.totals_by_party_type.iter().map(|(t, amount)| (t.as_str().to_string(), amount.to_canonical())).collect();
        let by_party = CanonicalValue::array(self.totals_by_party.iter().map(|(party_type, party_id, amount)| {
            CanonicalValue::object([
                ("partyType", party_type.to_canonical()),
                ("partyId", party_id.as_str().to_canonical()),
                ("amount", amount.to_canonical()),
            ])
        }));
        CanonicalValue::object([
            ("periodId", self.period_id.as_str().to_canonical()),
            ("ruleSetId", self.rule_set_id.as_str().to_canonical()),
            ("hierarchyId", self.hierarchy_id.as_ref().map(|id| id.as_str().to_string()).to_canonical()),
            ("entries", CanonicalValue::array(self.entries.iter().map(CanonicalEncode::to_canonical))),
            ("totalsByPartyType", CanonicalValue::Object(by_type)),
            ("totalsByParty", by_party),
            ("createdTimestamp", self.created_timestamp.to_canonical()),
            ("previousHash", self.previous_hash.to_canonical()),
        ])
    }
}

/// Flattens `period_result`'s flow results into a single frozen snapshot.
#[must_use]
pub fn create_snapshot_from_attribution(
    period_result: &PeriodAttributionResult,
    previous_hash: Option<&str>,
    created_timestamp: u64,
    hierarchy_id: Option<HierarchyId>,
) -> AttributionSnapshot {
    let entries: Vec<AttributionEntry> = period_result.flow_results.iter().flat_map(|r| r.entries.clone()).collect();

    let mut totals_by_party_type: BTreeMap<PartyType, u64> = BTreeMap::new();
    let mut party_totals: BTreeMap<(PartyType, PartyId), u64> = BTreeMap::new();
    for entry in &entries {
        *totals_by_party_type.entry(entry.party_type).or_insert(0) += entry.amount;
        *party_totals.entry((entry.party_type, entry.party_id.clone())).or_insert(0) += entry.amount;
    }
    let totals_by_party: Vec<(PartyType, PartyId, u64)> =
        party_totals.into_iter().map(|((party_type, party_id), amount)| (party_type, party_id, amount)).collect();

    let mut snapshot = AttributionSnapshot {
        period_id: period_result.period_id.clone(),
        rule_set_id: period_result.rule_set_id.clone(),
        hierarchy_id,
        entries,
        totals_by_party_type,
        totals_by_party,
        created_timestamp,
        previous_hash: previous_hash.map_or_else(|| GENESIS_HASH.to_string(), ToString::to_string),
        checksum: String::new(),
    };
    snapshot.checksum = checksum("attr_", &snapshot);
    snapshot
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use ledger_core::FlowId;

    use crate::engine::attribute_flow;
    use crate::rule::AttributionRule;
    use crate::rule::AttributionRuleSet;

    fn period_result() -> PeriodAttributionResult {
        let rules = vec![
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("platform-1"),
                party_type: PartyType::Platform,
                basis_points: 10_000,
                label: None,
            },
        ];
        let set = AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap();
        let flow_result = attribute_flow(&FlowId::new("f1"), 100, &set, "f1").unwrap();
        PeriodAttributionResult {
            period_id: PeriodId::new("p1"),
            rule_set_id: RuleSetId::new("rs1"),
            total_original_amount: flow_result.original_amount,
            total_attributed: flow_result.total_attributed,
            flow_results: vec![flow_result],
            flow_count: 1,
            checksum: String::new(),
        }
    }

    #[test]
    fn snapshot_totals_sum_to_period_total() {
        let result = period_result();
        let snapshot = create_snapshot_from_attribution(&result, None, 10, None);
        let total: u64 = snapshot.totals_by_party_type.values().sum();
        assert_eq!(total, 100);
        assert_eq!(snapshot.previous_hash, GENESIS_HASH);
    }

    #[test]
    fn checksum_is_stable_across_recomputation() {
        let result = period_result();
        let a = create_snapshot_from_attribution(&result, None, 10, None);
        let b = create_snapshot_from_attribution(&result, None, 10, None);
        assert_eq!(a.checksum, b.checksum);
    }
}
