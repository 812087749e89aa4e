// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The frozen result of attributing every confirmed flow in one period
//! against one rule set.

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::{PeriodId, RuleSetId};

use crate::entry::FlowAttributionResult;

/// Per (period, rule set): every flow's attribution result plus period-level
/// totals.
///
/// Invariant: `total_attributed == total_original_amount` (conservation
/// holds per flow, so it holds summed over the period).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PeriodAttributionResult {
    /// The period these flows were drawn from.
    pub period_id: PeriodId,
    /// The rule set every flow was attributed against.
    pub rule_set_id: RuleSetId,
    /// One result per attributed flow, in the order flows were processed.
    pub flow_results: Vec<FlowAttributionResult>,
    /// `sum(flow_results.original_amount)`.
    pub total_original_amount: u64,
    /// `sum(flow_results.total_attributed)`; always equal to
    /// `total_original_amount`.
    pub total_attributed: u64,
    /// `flow_results.len()`.
    pub flow_count: u64,
    /// Deterministic checksum over every field above.
    pub checksum: String,
}

impl CanonicalEncode for PeriodAttributionResult {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("periodId", self.period_id.as_str().to_canonical()),
            ("ruleSetId", self.rule_set_id.as_str().to_canonical()),
            ("flowResults", CanonicalValue::array(self.flow_results.iter().map(CanonicalEncode::to_canonical))),
            ("totalOriginalAmount", self.total_original_amount.to_canonical()),
            ("totalAttributed", self.total_attributed.to_canonical()),
            ("flowCount", self.flow_count.to_canonical()),
        ])
    }
}
