// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The frozen result of reconciling one period.

use std::collections::BTreeMap;

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::{Bucket, PartyId, PeriodId};
use ledger_flow::FlowStatus;

use crate::discrepancy::Discrepancy;
use crate::summary::{FlowSummary, SettlementTotal};

/// The overall health of a reconciled period.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ReconciliationStatus {
    /// No pending records and no discrepancy of severity `ERROR` or above.
    Balanced,
    /// At least one discrepancy of severity `ERROR` or above, with no
    /// pending records.
    Imbalanced,
    /// At least one effective record is still `PENDING`.
    Incomplete,
}

impl ReconciliationStatus {
    /// Stable label used in canonical serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "BALANCED",
            Self::Imbalanced => "IMBALANCED",
            Self::Incomplete => "INCOMPLETE",
        }
    }
}

impl CanonicalEncode for ReconciliationStatus {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// The frozen result of [`crate::engine::reconcile_period`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PeriodReconciliationResult {
    /// The period this result was derived from.
    pub period_id: PeriodId,
    /// Overall status, derived from pending records and discrepancy
    /// severities.
    pub status: ReconciliationStatus,
    /// The combined platform summary, keyed by the representative (first
    /// seen by insertion order) platform `partyId`. `None` if no platform
    /// flows fell in the period.
    pub platform_summary: Option<(PartyId, FlowSummary)>,
    /// Per-club summaries, ascending by `partyId`.
    pub club_summaries: Vec<(PartyId, FlowSummary)>,
    /// Per-agent summaries, ascending by `partyId`.
    pub agent_summaries: Vec<(PartyId, FlowSummary)>,
    /// One [`SettlementTotal`] per bucket that had at least one effective
    /// record in the period.
    pub settlement_totals: BTreeMap<Bucket, SettlementTotal>,
    /// Findings surfaced while reconciling; never fatal.
    pub discrepancies: Vec<Discrepancy>,
    /// Count of effective records in the period by status.
    pub counts_by_status: BTreeMap<FlowStatus, u64>,
    /// Deterministic checksum over every field above, in the fixed order
    /// used by [`CanonicalEncode::to_canonical`].
    pub checksum: String,
}

impl CanonicalEncode for PeriodReconciliationResult {
    fn to_canonical(&self) -> CanonicalValue {
        let platform_summary = self.platform_summary.as_ref().map_or(CanonicalValue::Null, |(id, summary)| {
            CanonicalValue::object([("partyId", id.as_str().to_canonical()), ("summary", summary.to_canonical())])
        });
        let club_summaries = CanonicalValue::array(self.club_summaries.iter().map(|(id, summary)| {
            CanonicalValue::object([("partyId", id.as_str().to_canonical()), ("summary", summary.to_canonical())])
        }));
        let agent_summaries = CanonicalValue::array(self.agent_summaries.iter().map(|(id, summary)| {
            CanonicalValue::object([("partyId", id.as_str().to_canonical()), ("summary", summary.to_canonical())])
        }));
        let settlement_totals: BTreeMap<String, CanonicalValue> = self
            .settlement_totals
            .iter()
            .map(|(bucket, total)| (bucket.as_str().to_string(), total.to_canonical()))
            .collect();
        let counts_by_status: BTreeMap<String, CanonicalValue> =
            self.counts_by_status.iter().map(|(status, count)| (status.as_str().to_string(), count.to_canonical())).collect();
        CanonicalValue::object([
            ("periodId", self.period_id.as_str().to_canonical()),
            ("status", self.status.to_canonical()),
            ("platformSummary", platform_summary),
            ("clubSummaries", club_summaries),
            ("agentSummaries", agent_summaries),
            ("settlementTotals", CanonicalValue::Object(settlement_totals)),
            ("discrepancies", CanonicalValue::array(self.discrepancies.iter().map(CanonicalEncode::to_canonical))),
            ("countsByStatus", CanonicalValue::Object(counts_by_status)),
        ])
    }
}
