// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pure basis-point allocation: flows in, entries out, nothing mutated.

use std::collections::BTreeMap;

use ledger_core::canonical::checksum;
use ledger_core::{FlowId, PartyId, PartyType, PeriodId, RuleSetId};
use ledger_flow::{FlowRecord, FlowStatus};
use tracing::{debug, instrument};

use crate::entry::{AttributionEntry, FlowAttributionResult};
use crate::error::AttributionError;
use crate::hierarchy::AgentHierarchy;
use crate::period_result::PeriodAttributionResult;
use crate::rule::{AttributionRuleSet, BASIS_POINTS_TOTAL};

fn floor_share(amount: u64, basis_points: u16) -> u64 {
    (u128::from(amount) * u128::from(basis_points) / u128::from(BASIS_POINTS_TOTAL))
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Distributes `amount` across `rule_set`'s rules by basis points. Each
/// rule's share is `floor(amount * basisPoints / 10000)`; the floor
/// remainder is added to the first entry (the platform, by rule-set
/// convention).
///
/// # Errors
///
/// Returns [`AttributionError::AmountMismatch`] if the entries' amounts do
/// not sum to `amount`. Given the floor-plus-remainder construction this is
/// not reachable in practice; the check is kept because conservation is the
/// property this function exists to guarantee.
pub fn attribute_flow(
    flow_id: &FlowId,
    amount: u64,
    rule_set: &AttributionRuleSet,
    entry_id_prefix: &str,
) -> Result<FlowAttributionResult, AttributionError> {
    let shares: Vec<u64> = rule_set.rules.iter().map(|rule| floor_share(amount, rule.basis_points)).collect();
    let floored_total: u64 = shares.iter().sum();
    let remainder = amount.saturating_sub(floored_total);

    let entries: Vec<AttributionEntry> = rule_set
        .rules
        .iter()
        .zip(shares.iter())
        .enumerate()
        .map(|(i, (rule, &share))| AttributionEntry {
            entry_id: ledger_core::EntryId::new(format!("{entry_id_prefix}-{i}")),
            party_id: rule.party_id.clone(),
            party_type: rule.party_type,
            amount: if i == 0 { share + remainder } else { share },
            source_flow_id: flow_id.clone(),
            rule_set_id: rule_set.rule_set_id.clone(),
            applied_basis_points: rule.basis_points,
            original_amount: amount,
        })
        .collect();

    let total_attributed: u64 = entries.iter().map(|e| e.amount).sum();
    if total_attributed != amount {
        return Err(AttributionError::AmountMismatch { flow_id: flow_id.clone(), expected: amount, actual: total_attributed });
    }

    Ok(FlowAttributionResult {
        source_flow_id: flow_id.clone(),
        original_amount: amount,
        entries,
        total_attributed,
        remainder: amount - total_attributed,
    })
}

/// Distributes `agent_amount` across `leaf_agent_id`'s chain to the root.
/// Each ancestor's share is `floor(agent_amount * node.share_basis_points /
/// 10000)`; the floor remainder is added to the leaf's entry (first in
/// leaf-to-root order).
///
/// # Errors
///
/// Returns an error from [`AgentHierarchy::chain_from_leaf`], or
/// [`AttributionError::AmountMismatch`] (see [`attribute_flow`] for why this
/// is not reachable in practice).
pub fn attribute_to_agent_hierarchy(
    flow_id: &FlowId,
    agent_amount: u64,
    hierarchy: &AgentHierarchy,
    leaf_agent_id: &PartyId,
    rule_set_id: &RuleSetId,
    entry_id_prefix: &str,
) -> Result<Vec<AttributionEntry>, AttributionError> {
    let chain = hierarchy.chain_from_leaf(leaf_agent_id)?;
    let shares: Vec<u64> = chain.iter().map(|node| floor_share(agent_amount, node.share_basis_points)).collect();
    let floored_total: u64 = shares.iter().sum();
    let remainder = agent_amount.saturating_sub(floored_total);

    let entries: Vec<AttributionEntry> = chain
        .iter()
        .zip(shares.iter())
        .enumerate()
        .map(|(i, (node, &share))| AttributionEntry {
            entry_id: ledger_core::EntryId::new(format!("{entry_id_prefix}-{i}")),
            party_id: node.agent_id.clone(),
            party_type: PartyType::Agent,
            amount: if i == 0 { share + remainder } else { share },
            source_flow_id: flow_id.clone(),
            rule_set_id: rule_set_id.clone(),
            applied_basis_points: node.share_basis_points,
            original_amount: agent_amount,
        })
        .collect();

    let total_attributed: u64 = entries.iter().map(|e| e.amount).sum();
    if total_attributed != agent_amount {
        return Err(AttributionError::AmountMismatch { flow_id: flow_id.clone(), expected: agent_amount, actual: total_attributed });
    }
    Ok(entries)
}

/// Attributes every confirmed flow in `flows` against `rule_set`, optionally
/// expanding each flow's `AGENT` entry into a leaf-to-root hierarchy
/// distribution when `hierarchy` and a leaf mapping for that flow are both
/// present.
///
/// `flows` must be effective records (e.g.
/// [`ledger_flow::FlowRegistry::get_records_by_status`] or
/// [`ledger_flow::FlowRegistry::get_all_records`] pre-filtered to the
/// latest record per `flowId`) — the raw append log conflates a flow's
/// history with its current state, and a flow later voided would otherwise
/// still be attributed from its stale `CONFIRMED` entry.
///
/// # Errors
///
/// Returns the first error raised by [`attribute_flow`] or
/// [`attribute_to_agent_hierarchy`].
#[instrument(skip(flows, rule_set, hierarchy, flow_to_leaf_agent))]
pub fn attribute_period(
    period_id: &PeriodId,
    flows: &[FlowRecord],
    rule_set: &AttributionRuleSet,
    hierarchy: Option<&AgentHierarchy>,
    flow_to_leaf_agent: Option<&BTreeMap<FlowId, PartyId>>,
) -> Result<PeriodAttributionResult, AttributionError> {
    let mut flow_results = Vec::new();
    for flow in flows {
        if flow.status != FlowStatus::Confirmed {
            continue;
        }
        let prefix = format!("{}-entry", flow.flow_id.as_str());
        let mut result = attribute_flow(&flow.flow_id, flow.amount, rule_set, &prefix)?;

        if let (Some(hierarchy), Some(mapping)) = (hierarchy, flow_to_leaf_agent) {
            if let Some(leaf_agent_id) = mapping.get(&flow.flow_id) {
                if let Some(agent_index) = result.entries.iter().position(|e| e.party_type == PartyType::Agent) {
                    let agent_amount = result.entries[agent_index].amount;
                    let hierarchy_prefix = format!("{}-hier", flow.flow_id.as_str());
                    let hierarchy_entries = attribute_to_agent_hierarchy(
                        &flow.flow_id,
                        agent_amount,
                        hierarchy,
                        leaf_agent_id,
                        &rule_set.rule_set_id,
                        &hierarchy_prefix,
                    )?;
                    result.entries.splice(agent_index..=agent_index, hierarchy_entries);
                    result.total_attributed = result.entries.iter().map(|e| e.amount).sum();
                }
            }
        }

        flow_results.push(result);
    }

    let total_original_amount: u64 = flow_results.iter().map(|r| r.original_amount).sum();
    let total_attributed: u64 = flow_results.iter().map(|r| r.total_attributed).sum();
    let flow_count = flow_results.len() as u64;

    debug!(period_id = %period_id, flow_count, "period attributed");

    Ok(PeriodAttributionResult {
        period_id: period_id.clone(),
        rule_set_id: rule_set.rule_set_id.clone(),
        flow_results,
        total_original_amount,
        total_attributed,
        flow_count,
        checksum: String::new(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use ledger_core::{PartyId, RuleSetId};
    use ledger_flow::{AppendFlowInput, Direction, FlowRegistry, FlowType};

    use crate::hierarchy::AgentHierarchyNode;
    use crate::rule::AttributionRule;

    fn rule_set() -> AttributionRuleSet {
        let rules = vec![
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("platform-1"),
                party_type: PartyType::Platform,
                basis_points: 6000,
                label: None,
            },
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("agent-root"),
                party_type: PartyType::Agent,
                basis_points: 4000,
                label: None,
            },
        ];
        AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap()
    }

    // ── 1. flow attribution conserves the total amount ───────────────────

    #[test]
    fn attribute_flow_conserves_total_and_assigns_remainder_to_first_entry() {
        let set = rule_set();
        let result = attribute_flow(&FlowId::new("f1"), 10, &set, "f1").unwrap();
        assert_eq!(result.total_attributed, 10);
        assert_eq!(result.remainder, 0);
        // 10 * 6000 / 10000 = 6 (floor), 10 * 4000/10000 = 4 (floor); sum = 10, no remainder to add.
        assert_eq!(result.entries[0].amount, 6);
        assert_eq!(result.entries[1].amount, 4);
    }

    #[test]
    fn attribute_flow_assigns_floor_remainder_to_first_entry() {
        let set = rule_set();
        // 7 * 6000/10000 = 4.2 -> 4; 7 * 4000/10000 = 2.8 -> 2; floored total 6, remainder 1 -> first entry.
        let result = attribute_flow(&FlowId::new("f1"), 7, &set, "f1").unwrap();
        assert_eq!(result.entries[0].amount, 5);
        assert_eq!(result.entries[1].amount, 2);
        assert_eq!(result.total_attributed, 7);
    }

    // ── scenario S1: rule-set split ────────────────────────────────────────

    #[test]
    fn scenario_s1_rule_set_split() {
        let rules = vec![
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("platform-1"),
                party_type: PartyType::Platform,
                basis_points: 5000,
                label: None,
            },
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("club-1"),
                party_type: PartyType::Club,
                basis_points: 3000,
                label: None,
            },
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("agent-1"),
                party_type: PartyType::Agent,
                basis_points: 2000,
                label: None,
            },
        ];
        let set = AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap();
        let result = attribute_flow(&FlowId::new("f1"), 10_000, &set, "f1").unwrap();
        let amounts: Vec<u64> = result.entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![5000, 3000, 2000]);
        assert_eq!(result.remainder, 0);
        assert_eq!(result.total_attributed, 10_000);
    }

    // ── scenario S2: rounding remainder ─────────────────────────────────────

    #[test]
    fn scenario_s2_rounding_remainder() {
        let rules = vec![
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("platform-1"),
                party_type: PartyType::Platform,
                basis_points: 5000,
                label: None,
            },
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("club-1"),
                party_type: PartyType::Club,
                basis_points: 3000,
                label: None,
            },
            AttributionRule {
                rule_set_id: RuleSetId::new("rs1"),
                party_id: PartyId::new("agent-1"),
                party_type: PartyType::Agent,
                basis_points: 2000,
                label: None,
            },
        ];
        let set = AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap();
        let result = attribute_flow(&FlowId::new("f1"), 10_001, &set, "f1").unwrap();
        let amounts: Vec<u64> = result.entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![5001, 3000, 2000]);
        assert_eq!(result.total_attributed, 10_001);
    }

    // ── 2. hierarchy distribution ─────────────────────────────────────────

    #[test]
    fn hierarchy_distribution_conserves_the_agent_amount() {
        let nodes = vec![
            AgentHierarchyNode {
                agent_id: PartyId::new("agent-root"),
                parent_agent_id: None,
                level: 0,
                share_basis_points: 3000,
            },
            AgentHierarchyNode {
                agent_id: PartyId::new("agent-leaf"),
                parent_agent_id: Some(PartyId::new("agent-root")),
                level: 1,
                share_basis_points: 7000,
            },
        ];
        let hierarchy = ledger_core::HierarchyId::new("h1");
        let hierarchy = AgentHierarchy::new(hierarchy, nodes).unwrap();
        let entries = attribute_to_agent_hierarchy(
            &FlowId::new("f1"),
            100,
            &hierarchy,
            &PartyId::new("agent-leaf"),
            &RuleSetId::new("rs1"),
            "f1-hier",
        )
        .unwrap();
        let total: u64 = entries.iter().map(|e| e.amount).sum();
        assert_eq!(total, 100);
        assert_eq!(entries[0].party_id.as_str(), "agent-leaf");
    }

    // ── 3. period attribution skips pending and void flows ───────────────

    #[test]
    fn attribute_period_only_includes_confirmed_flows() {
        let mut registry = FlowRegistry::new();
        registry
            .append_flow(AppendFlowInput {
                flow_id: FlowId::new("f1"),
                session_id: ledger_core::SessionId::new("s1"),
                party_id: PartyId::new("platform-1"),
                party_type: PartyType::Platform,
                flow_type: FlowType::RakeRef,
                direction: Direction::In,
                amount: 10,
                injected_timestamp: 1,
                description: None,
                metadata: None,
            })
            .unwrap();
        registry.confirm_flow(&FlowId::new("f1"), 2).unwrap();
        registry
            .append_flow(AppendFlowInput {
                flow_id: FlowId::new("f2"),
                session_id: ledger_core::SessionId::new("s1"),
                party_id: PartyId::new("platform-1"),
                party_type: PartyType::Platform,
                flow_type: FlowType::RakeRef,
                direction: Direction::In,
                amount: 20,
                injected_timestamp: 3,
                description: None,
                metadata: None,
            })
            .unwrap();

        let set = rule_set();
        let flows: Vec<FlowRecord> = registry.get_records_by_status(FlowStatus::Confirmed).into_iter().cloned().collect();
        let result = attribute_period(&PeriodId::new("p1"), &flows, &set, None, None).unwrap();
        assert_eq!(result.flow_count, 1);
        assert_eq!(result.total_original_amount, 10);
    }
}
