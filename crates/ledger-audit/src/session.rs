// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The audit correlation engine: derives one [`AuditRow`] per flow in scope
//! and rolls them up into an [`AuditSummary`].

use std::collections::BTreeMap;

use ledger_core::canonical::{checksum, CanonicalEncode, CanonicalValue};
use ledger_core::{AuditRowId, AuditSessionId};
use ledger_flow::{FlowRecord, FlowRegistry, FlowStatus};
use ledger_attribution::PeriodAttributionResult;
use ledger_recharge::{LinkRegistry, RechargeRegistry, RechargeStatus};
use tracing::{debug, instrument};

use crate::error::AuditError;
use crate::row::{AttributionBreakdownRef, AuditFlag, AuditRow, AuditStatus};

/// Whether each of a session's input sources passed its own chain/checksum
/// verification before audit rows were derived from it.
///
/// The audit layer performs no recomputation of its own (spec: "Pure; no
/// recomputation"); callers run `verify_integrity` on the flow and recharge
/// registries (and re-derive the attribution snapshot to compare checksums)
/// and report the outcome here. A `false` field marks every row in the
/// session with `ChecksumFailed` and forces it out of `Matched`.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct IntegrityInputs {
    /// Whether the flow registry's hash chain verified.
    pub flows_ok: bool,
    /// Whether the recharge registry's hash chain verified.
    pub recharges_ok: bool,
    /// Whether the attribution result's checksum verified.
    pub attribution_ok: bool,
}

impl IntegrityInputs {
    /// All sources verified.
    #[must_use]
    pub const fn all_ok() -> Self {
        Self { flows_ok: true, recharges_ok: true, attribution_ok: true }
    }

    fn any_failed(self) -> bool {
        !(self.flows_ok && self.recharges_ok && self.attribution_ok)
    }
}

/// Roll-up counts and the overall pass/fail verdict for a session.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AuditSummary {
    /// The session these rows belong to.
    pub session_id: AuditSessionId,
    /// `true` when no row is `MISSING` or `ORPHAN`.
    pub passed: bool,
    /// Row count per [`AuditStatus`].
    pub counts_by_status: BTreeMap<AuditStatus, u64>,
    /// Row count per [`AuditFlag`] (a row may contribute to more than one).
    pub counts_by_flag: BTreeMap<AuditFlag, u64>,
    /// Every row, ascending by `sequence`.
    pub rows: Vec<AuditRow>,
    /// Deterministic checksum over the session's rows and counts.
    pub checksum: String,
}

impl CanonicalEncode for AuditStatus {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

impl CanonicalEncode for AuditSummary {
    fn to_canonical(&self) -> CanonicalValue {
        let by_status: BTreeMap<String, CanonicalValue> =
            self.counts_by_status.iter().map(|(s, n)| (s.as_str().to_string(), n.to_canonical())).collect();
        let by_flag: BTreeMap<String, CanonicalValue> =
            self.counts_by_flag.iter().map(|(f, n)| (f.as_str().to_string(), n.to_canonical())).collect();
        CanonicalValue::object([
            ("sessionId", self.session_id.as_str().to_canonical()),
            ("passed", self.passed.to_canonical()),
            ("countsByStatus", CanonicalValue::Object(by_status)),
            ("countsByFlag", CanonicalValue::Object(by_flag)),
            ("rows", CanonicalValue::array(self.rows.iter().map(CanonicalEncode::to_canonical))),
        ])
    }
}

/// Builds a deterministic audit session over `flows` (effective records,
/// caller-scoped to a period), correlating each against `recharges`,
/// `links`, and `attribution`.
///
/// # Errors
///
/// Returns [`AuditError::InvalidSessionId`] if `session_id` is empty, or
/// [`AuditError::InvalidInput`] if `flows` is empty.
#[instrument(skip(flows, recharges, links, attribution), fields(session_id = %session_id))]
pub fn build_audit_session(
    session_id: &AuditSessionId,
    flows: &[&FlowRecord],
    recharges: &RechargeRegistry,
    links: &LinkRegistry,
    attribution: &PeriodAttributionResult,
    integrity: IntegrityInputs,
) -> Result<AuditSummary, AuditError> {
    if session_id.as_str().is_empty() {
        return Err(AuditError::InvalidSessionId { session_id: session_id.clone() });
    }
    if flows.is_empty() {
        return Err(AuditError::InvalidInput { reason: "no flows in scope".to_string() });
    }

    let mut ordered: Vec<&FlowRecord> = flows.to_vec();
    ordered.sort_by_key(|f| f.sequence);

    let checksum_failed = integrity.any_failed();
    let mut rows = Vec::with_capacity(ordered.len());
    for flow in ordered {
        let row = build_row(session_id, flow, recharges, links, attribution, checksum_failed);
        rows.push(row);
    }

    let mut counts_by_status: BTreeMap<AuditStatus, u64> = BTreeMap::new();
    let mut counts_by_flag: BTreeMap<AuditFlag, u64> = BTreeMap::new();
    for row in &rows {
        *counts_by_status.entry(row.audit_status).or_insert(0) += 1;
        for flag in &row.flags {
            *counts_by_flag.entry(*flag).or_insert(0) += 1;
        }
    }
    let passed = !counts_by_status.contains_key(&AuditStatus::Missing) && !counts_by_status.contains_key(&AuditStatus::Orphan);

    let mut summary = AuditSummary {
        session_id: session_id.clone(),
        passed,
        counts_by_status,
        counts_by_flag,
        rows,
        checksum: String::new(),
    };
    summary.checksum = checksum("asum_", &summary);
    debug!(passed, rows = summary.rows.len(), "audit session built");
    Ok(summary)
}

fn build_row(
    session_id: &AuditSessionId,
    flow: &FlowRecord,
    recharges: &RechargeRegistry,
    links: &LinkRegistry,
    attribution: &PeriodAttributionResult,
    checksum_failed: bool,
) -> AuditRow {
    let linked = links.trace_flow_to_recharges(&flow.flow_id);
    let mut linked_recharge_ids: Vec<_> = linked.iter().map(|l| l.recharge_id.clone()).collect();
    linked_recharge_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    linked_recharge_ids.dedup();
    let recharge_id = linked_recharge_ids.first().cloned();

    let breakdown: Vec<AttributionBreakdownRef> = attribution
        .flow_results
        .iter()
        .find(|r| r.source_flow_id == flow.flow_id)
        .map(|r| {
            r.entries
                .iter()
                .map(|e| AttributionBreakdownRef { party_id: e.party_id.clone(), party_type: e.party_type })
                .collect()
        })
        .unwrap_or_default();

    let mut flags = Vec::new();
    let has_recharge_link = recharge_id.is_some();
    let mut recharge_confirmed = false;
    if let Some(id) = &recharge_id {
        match recharges.get_recharge(id) {
            Some(record) if record.status == RechargeStatus::Confirmed => recharge_confirmed = true,
            Some(_) => flags.push(AuditFlag::RechargeNotConfirmed),
            None => {}
        }
    } else {
        flags.push(AuditFlag::FlowNoRecharge);
    }

    let has_attribution = !breakdown.is_empty();
    if !has_attribution {
        flags.push(AuditFlag::FlowNoAttribution);
    }

    let flow_confirmed = flow.status == FlowStatus::Confirmed;
    if !flow_confirmed {
        flags.push(AuditFlag::FlowNotConfirmed);
    }

    if linked_recharge_ids.len() > 1 {
        flags.push(AuditFlag::MultipleAttributions);
    }

    if has_recharge_link && has_attribution {
        let linked_party_ids: Vec<_> = linked.iter().map(|l| recharges.get_recharge(&l.recharge_id).map(|r| r.party_id.clone())).collect();
        let attributed_matches_linked_party =
            breakdown.iter().any(|b| linked_party_ids.iter().any(|p| p.as_ref() == Some(&b.party_id)));
        if !attributed_matches_linked_party {
            flags.push(AuditFlag::PartyMismatch);
        }
    }

    if checksum_failed {
        flags.push(AuditFlag::ChecksumFailed);
    }

    let critical = flags.iter().any(|f| f.is_critical());
    let audit_status = if !has_recharge_link && !has_attribution {
        AuditStatus::Orphan
    } else if !has_recharge_link || !has_attribution {
        AuditStatus::Missing
    } else if recharge_confirmed && flow_confirmed && !critical {
        AuditStatus::Matched
    } else {
        AuditStatus::Partial
    };

    let mut row = AuditRow {
        row_id: AuditRowId::new(format!("{}:{}", session_id.as_str(), flow.flow_id.as_str())),
        session_id: session_id.clone(),
        sequence: flow.sequence,
        flow_id: flow.flow_id.clone(),
        recharge_id,
        attribution_breakdown: breakdown,
        audit_status,
        flags,
        checksum: String::new(),
    };
    row.checksum = checksum("arow_", &row.canonical_for_checksum());
    row
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use ledger_attribution::{attribute_flow, AttributionRule, AttributionRuleSet};
    use ledger_core::{FlowId, PartyId, PartyType, PeriodId, RuleSetId, SessionId};
    use ledger_flow::record::{AppendFlowInput, Direction, FlowType};
    use ledger_recharge::{create_recharge_link, AppendRechargeInput, CreateLinkInput, RechargeSource};

    fn flow_registry() -> FlowRegistry {
        let mut flows = FlowRegistry::new();
        flows
            .append_flow(AppendFlowInput {
                flow_id: FlowId::new("f1"),
                session_id: SessionId::new("s1"),
                party_id: PartyId::new("party-1"),
                party_type: PartyType::Club,
                flow_type: FlowType::BuyinRef,
                direction: Direction::In,
                amount: 1000,
                injected_timestamp: 1,
                description: None,
                metadata: None,
            })
            .unwrap();
        flows.confirm_flow(&FlowId::new("f1"), 2).unwrap();
        flows
    }

    fn attribution_result() -> PeriodAttributionResult {
        let rules = vec![AttributionRule {
            rule_set_id: RuleSetId::new("rs1"),
            party_id: PartyId::new("party-1"),
            party_type: PartyType::Club,
            basis_points: 10_000,
            label: None,
        }];
        let set = AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap();
        let flow_result = attribute_flow(&FlowId::new("f1"), 1000, &set, "f1").unwrap();
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
    fn fully_correlated_confirmed_flow_is_matched() {
        let flows = flow_registry();
        let mut recharges = RechargeRegistry::new();
        recharges
            .append_recharge(AppendRechargeInput {
                recharge_id: ledger_core::RechargeId::new("r1"),
                source: RechargeSource::External,
                party_id: PartyId::new("party-1"),
                reference_amount: 1000,
                external_reference_id: None,
                declared_timestamp: 1,
            })
            .unwrap();
        recharges.confirm_recharge(&ledger_core::RechargeId::new("r1"), 2).unwrap();

        let mut links = LinkRegistry::new();
        create_recharge_link(
            &mut links,
            &recharges,
            &flows,
            CreateLinkInput {
                link_id: ledger_core::LinkId::new("l1"),
                recharge_id: ledger_core::RechargeId::new("r1"),
                linked_flow_ids: vec![FlowId::new("f1")],
                linked_timestamp: 2,
            },
        )
        .unwrap();

        let attribution = attribution_result();
        let flow_record = flows.get_flow(&FlowId::new("f1")).unwrap();
        let summary = build_audit_session(
            &AuditSessionId::new("sess-1"),
            &[flow_record],
            &recharges,
            &links,
            &attribution,
            IntegrityInputs::all_ok(),
        )
        .unwrap();

        assert!(summary.passed);
        assert_eq!(summary.rows[0].audit_status, AuditStatus::Matched);
        assert!(summary.rows[0].flags.is_empty());
    }

    #[test]
    fn flow_with_no_recharge_and_no_attribution_is_orphan() {
        let flows = flow_registry();
        let recharges = RechargeRegistry::new();
        let links = LinkRegistry::new();
        let attribution = PeriodAttributionResult {
            period_id: PeriodId::new("p1"),
            rule_set_id: RuleSetId::new("rs1"),
            total_original_amount: 0,
            total_attributed: 0,
            flow_results: Vec::new(),
            flow_count: 0,
            checksum: String::new(),
        };
        let flow_record = flows.get_flow(&FlowId::new("f1")).unwrap();
        let summary = build_audit_session(
            &AuditSessionId::new("sess-1"),
            &[flow_record],
            &recharges,
            &links,
            &attribution,
            IntegrityInputs::all_ok(),
        )
        .unwrap();

        assert!(!summary.passed);
        assert_eq!(summary.rows[0].audit_status, AuditStatus::Orphan);
        assert!(summary.rows[0].flags.contains(&AuditFlag::FlowNoRecharge));
        assert!(summary.rows[0].flags.contains(&AuditFlag::FlowNoAttribution));
    }

    #[test]
    fn failed_integrity_marks_every_row_checksum_failed() {
        let flows = flow_registry();
        let recharges = RechargeRegistry::new();
        let links = LinkRegistry::new();
        let attribution = attribution_result();
        let flow_record = flows.get_flow(&FlowId::new("f1")).unwrap();
        let integrity = IntegrityInputs { flows_ok: false, recharges_ok: true, attribution_ok: true };
        let summary = build_audit_session(
            &AuditSessionId::new("sess-1"),
            &[flow_record],
            &recharges,
            &links,
            &attribution,
            integrity,
        )
        .unwrap();

        assert!(summary.rows[0].flags.contains(&AuditFlag::ChecksumFailed));
        assert_ne!(summary.rows[0].audit_status, AuditStatus::Matched);
    }

    #[test]
    fn empty_scope_is_rejected() {
        let recharges = RechargeRegistry::new();
        let links = LinkRegistry::new();
        let attribution = attribution_result();
        let err = build_audit_session(
            &AuditSessionId::new("sess-1"),
            &[],
            &recharges,
            &links,
            &attribution,
            IntegrityInputs::all_ok(),
        )
        .unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput { .. }));
    }
}
