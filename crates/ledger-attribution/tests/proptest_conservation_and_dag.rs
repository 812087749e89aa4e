// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property tests over the two invariants attribution exists to guarantee:
//! conservation of amount under basis-point splitting, and cycle rejection
//! in agent hierarchies, across arbitrary-but-valid rule sets and forests.

use ledger_attribution::{attribute_flow, AgentHierarchy, AgentHierarchyNode, AttributionError, AttributionRule, AttributionRuleSet};
use ledger_core::{FlowId, PartyId, PartyType, RuleSetId};
use proptest::prelude::*;

/// Builds a rule set whose basis points sum to exactly 10000 by
/// stick-breaking a sorted sequence of cut points in `[0, 10000]`.
fn rule_set_strategy() -> impl Strategy<Value = AttributionRuleSet> {
    (1usize..8).prop_flat_map(|n| {
        prop::collection::vec(0u16..=10_000, n - 1).prop_map(move |mut cuts| {
            cuts.push(10_000);
            cuts.push(0);
            cuts.sort_unstable();
            let rules: Vec<AttributionRule> = cuts
                .windows(2)
                .enumerate()
                .map(|(i, w)| AttributionRule {
                    rule_set_id: RuleSetId::new("rs1"),
                    party_id: PartyId::new(format!("p{i}")),
                    party_type: PartyType::Platform,
                    basis_points: w[1] - w[0],
                    label: None,
                })
                .collect();
            AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None)
                .expect("stick-broken shares always sum to exactly 10000")
        })
    })
}

/// A forest of up to 8 agents: node `i` (`i > 0`) either has no parent or
/// one chosen from `0..i`, so no chain can exceed 8 hops — always within
/// `MAX_HIERARCHY_DEPTH` and never cyclic by construction.
fn forest_strategy() -> impl Strategy<Value = Vec<AgentHierarchyNode>> {
    (2usize..=8).prop_flat_map(|n| {
        prop::collection::vec(any::<usize>(), n - 1).prop_map(move |raw| {
            let mut nodes = vec![AgentHierarchyNode {
                agent_id: PartyId::new("a0"),
                parent_agent_id: None,
                level: 0,
                share_basis_points: 10_000,
            }];
            for i in 1..n {
                let pick = raw[i - 1];
                let parent_agent_id = if pick % 2 == 0 { None } else { Some(PartyId::new(format!("a{}", pick % i))) };
                nodes.push(AgentHierarchyNode {
                    agent_id: PartyId::new(format!("a{i}")),
                    parent_agent_id,
                    level: 0,
                    share_basis_points: 10_000,
                });
            }
            nodes
        })
    })
}

/// A pure ring of `2..=6` agents, each pointing to the next: always a
/// cycle, regardless of its length.
fn cycle_strategy() -> impl Strategy<Value = Vec<AgentHierarchyNode>> {
    (2usize..=6).prop_map(|len| {
        (0..len)
            .map(|i| AgentHierarchyNode {
                agent_id: PartyId::new(format!("a{i}")),
                parent_agent_id: Some(PartyId::new(format!("a{}", (i + 1) % len))),
                level: 0,
                share_basis_points: 10_000,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn attribute_flow_always_conserves_the_original_amount(rule_set in rule_set_strategy(), amount in 0u64..1_000_000_000) {
        let result = attribute_flow(&FlowId::new("f1"), amount, &rule_set, "f1").unwrap();
        let total: u64 = result.entries.iter().map(|e| e.amount).sum();
        prop_assert_eq!(total, amount);
        prop_assert_eq!(result.remainder, 0);
    }

    #[test]
    fn rule_set_basis_points_always_sum_to_exactly_10000(rule_set in rule_set_strategy()) {
        let total: u32 = rule_set.rules.iter().map(|r| u32::from(r.basis_points)).sum();
        prop_assert_eq!(total, 10_000);
    }

    #[test]
    fn acyclic_forests_up_to_the_depth_limit_are_always_accepted(nodes in forest_strategy()) {
        let result = AgentHierarchy::new(ledger_core::HierarchyId::new("h1"), nodes);
        prop_assert!(result.is_ok());
    }

    #[test]
    fn any_ring_of_parent_pointers_is_always_rejected_as_a_cycle(nodes in cycle_strategy()) {
        let err = AgentHierarchy::new(ledger_core::HierarchyId::new("h1"), nodes).unwrap_err();
        prop_assert!(matches!(err, AttributionError::HierarchyCycleDetected { .. }));
    }
}
