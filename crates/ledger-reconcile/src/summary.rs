// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-party and per-bucket aggregation.

use std::collections::{BTreeMap, BTreeSet};

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::FlowId;
use ledger_flow::{Direction, FlowRecord, FlowStatus, FlowType};

/// Per-(party, period) aggregation over effective flow records.
///
/// Totals are computed over non-void records only; counts are computed over
/// every effective record regardless of status.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FlowSummary {
    /// Sum of `amount` over non-void records with `direction = IN`.
    pub total_in: u64,
    /// Sum of `amount` over non-void records with `direction = OUT`.
    pub total_out: u64,
    /// `total_in - total_out`; a reference, not a balance, and may be
    /// negative.
    pub net_reference: i128,
    /// Count of effective records by [`FlowType`].
    pub counts_by_type: BTreeMap<FlowType, u64>,
    /// Count of effective records by [`FlowStatus`].
    pub counts_by_status: BTreeMap<FlowStatus, u64>,
    /// Identifiers of every effective record folded into this summary.
    pub flow_ids: BTreeSet<FlowId>,
}

impl FlowSummary {
    /// Folds `records` (assumed to already be filtered to one party and one
    /// period) into a summary.
    #[must_use]
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FlowRecord>,
    {
        let mut summary = Self {
            total_in: 0,
            total_out: 0,
            net_reference: 0,
            counts_by_type: BTreeMap::new(),
            counts_by_status: BTreeMap::new(),
            flow_ids: BTreeSet::new(),
        };
        for record in records {
            if record.status != FlowStatus::Void {
                match record.direction {
                    Direction::In => summary.total_in += record.amount,
                    Direction::Out => summary.total_out += record.amount,
                }
            }
            *summary.counts_by_type.entry(record.flow_type).or_insert(0) += 1;
            *summary.counts_by_status.entry(record.status).or_insert(0) += 1;
            summary.flow_ids.insert(record.flow_id.clone());
        }
        summary.net_reference = i128::from(summary.total_in) - i128::from(summary.total_out);
        summary
    }
}

impl CanonicalEncode for FlowSummary {
    fn to_canonical(&self) -> CanonicalValue {
        let by_type: BTreeMap<String, CanonicalValue> =
            self.counts_by_type.iter().map(|(k, v)| (k.as_str().to_string(), v.to_canonical())).collect();
        let by_status: BTreeMap<String, CanonicalValue> =
            self.counts_by_status.iter().map(|(k, v)| (k.as_str().to_string(), v.to_canonical())).collect();
        CanonicalValue::object([
            ("totalIn", self.total_in.to_canonical()),
            ("totalOut", self.total_out.to_canonical()),
            ("netReference", CanonicalValue::Integer(self.net_reference)),
            ("countsByType", CanonicalValue::Object(by_type)),
            ("countsByStatus", CanonicalValue::Object(by_status)),
            (
                "flowIds",
                CanonicalValue::array(self.flow_ids.iter().map(|id| id.as_str().to_canonical())),
            ),
        ])
    }
}

/// Per-(bucket, period) settlement aggregation, computed over non-void
/// records via the exact (not simplified) routine: amounts partitioned by
/// `type` and `direction`.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct SettlementTotal {
    /// Sum of `amount` over non-void `RAKE_REF` records with `direction =
    /// IN`.
    pub total_rake_in: u64,
    /// Sum of `amount` over non-void `ADJUST_REF` records with `direction =
    /// IN`.
    pub total_adjust_in: u64,
    /// Sum of `amount` over non-void `ADJUST_REF` records with `direction =
    /// OUT`.
    pub total_adjust_out: u64,
    /// `total_rake_in + total_adjust_in - total_adjust_out`.
    pub net_settlement: i128,
    /// Count of distinct parties folded into this bucket.
    pub party_count: u64,
    /// Count of effective flow records folded into this bucket.
    pub flow_count: u64,
}

impl SettlementTotal {
    /// Folds `records` (assumed pre-filtered to one bucket and one period)
    /// into a settlement total, counting `party_count` over the distinct
    /// `party_id`s observed.
    #[must_use]
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FlowRecord>,
    {
        let mut total_rake_in = 0u64;
        let mut total_adjust_in = 0u64;
        let mut total_adjust_out = 0u64;
        let mut flow_count = 0u64;
        let mut parties = BTreeSet::new();
        for record in records {
            if record.status == FlowStatus::Void {
                continue;
            }
            flow_count += 1;
            parties.insert(record.party_id.clone());
            match (record.flow_type, record.direction) {
                (FlowType::RakeRef, Direction::In) => total_rake_in += record.amount,
                (FlowType::AdjustRef, Direction::In) => total_adjust_in += record.amount,
                (FlowType::AdjustRef, Direction::Out) => total_adjust_out += record.amount,
                _ => {}
            }
        }
        let net_settlement = i128::from(total_rake_in) + i128::from(total_adjust_in) - i128::from(total_adjust_out);
        Self {
            total_rake_in,
            total_adjust_in,
            total_adjust_out,
            net_settlement,
            party_count: parties.len() as u64,
            flow_count,
        }
    }
}

impl CanonicalEncode for SettlementTotal {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("totalRakeIn", self.total_rake_in.to_canonical()),
            ("totalAdjustIn", self.total_adjust_in.to_canonical()),
            ("totalAdjustOut", self.total_adjust_out.to_canonical()),
            ("netSettlement", CanonicalValue::Integer(self.net_settlement)),
            ("partyCount", self.party_count.to_canonical()),
            ("flowCount", self.flow_count.to_canonical()),
        ])
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use ledger_core::{PartyId, PartyType, SessionId};

    fn record(flow_type: FlowType, direction: Direction, amount: u64, status: FlowStatus) -> FlowRecord {
        FlowRecord {
            flow_id: FlowId::new("f"),
            session_id: SessionId::new("s"),
            party_id: PartyId::new("p"),
            party_type: PartyType::Platform,
            flow_type,
            direction,
            amount,
            status,
            injected_timestamp: 10,
            confirmed_timestamp: None,
            voided_timestamp: None,
            sequence: 0,
            checksum: String::new(),
            previous_checksum: String::new(),
            description: None,
            metadata: None,
        }
    }

    // ── 1. void records are excluded from totals but counted ────────────

    #[test]
    fn void_records_excluded_from_totals_but_present_in_counts() {
        let records = vec![record(FlowType::RakeRef, Direction::In, 100, FlowStatus::Void)];
        let summary = FlowSummary::from_records(&records);
        assert_eq!(summary.total_in, 0);
        assert_eq!(*summary.counts_by_status.get(&FlowStatus::Void).unwrap(), 1);
    }

    // ── 2. net_reference and net_settlement can be negative ─────────────

    #[test]
    fn net_reference_can_go_negative() {
        let records = vec![
            record(FlowType::BuyinRef, Direction::In, 50, FlowStatus::Confirmed),
            record(FlowType::CashoutRef, Direction::Out, 200, FlowStatus::Confirmed),
        ];
        let summary = FlowSummary::from_records(&records);
        assert_eq!(summary.net_reference, -150);
    }

    #[test]
    fn settlement_total_partitions_by_type_and_direction() {
        let records = vec![
            record(FlowType::RakeRef, Direction::In, 100, FlowStatus::Confirmed),
            record(FlowType::AdjustRef, Direction::In, 10, FlowStatus::Confirmed),
            record(FlowType::AdjustRef, Direction::Out, 30, FlowStatus::Confirmed),
        ];
        let total = SettlementTotal::from_records(&records);
        assert_eq!(total.total_rake_in, 100);
        assert_eq!(total.total_adjust_in, 10);
        assert_eq!(total.total_adjust_out, 30);
        assert_eq!(total.net_settlement, 80);
    }
}
