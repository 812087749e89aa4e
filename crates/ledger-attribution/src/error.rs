// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attribution engine error kinds.

use std::collections::BTreeMap;

use ledger_core::{CodedError, ErrorCode, FlowId, HierarchyId, PartyId, RuleSetId};
use thiserror::Error;

/// Errors raised while building rule sets, hierarchies, or attributing
/// flows.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AttributionError {
    /// A rule's `basisPoints` fell outside `[0, 10000]`.
    #[error("invalid basis points {basis_points} for rule set {rule_set_id:?}")]
    InvalidBasisPoints {
        /// The rule set the offending rule belongs to.
        rule_set_id: RuleSetId,
        /// The offending value.
        basis_points: u32,
    },

    /// A rule set's basis points did not sum to 10000.
    #[error("rule set {rule_set_id:?} basis points sum to {actual_total}, expected 10000")]
    InvalidRuleSetTotal {
        /// The offending rule set.
        rule_set_id: RuleSetId,
        /// The sum actually computed.
        actual_total: u32,
    },

    /// A rule set's entry count fell outside `[1, 100]`.
    #[error("rule set {rule_set_id:?} has {rule_count} rules, expected 1..=100")]
    RuleCountOutOfRange {
        /// The offending rule set.
        rule_set_id: RuleSetId,
        /// The entry count actually observed.
        rule_count: usize,
    },

    /// Resolving an agent's parent chain revisited a node already on the
    /// path.
    #[error("hierarchy {hierarchy_id:?} cycle detected at agent {agent_id:?}")]
    HierarchyCycleDetected {
        /// The hierarchy containing the cycle.
        hierarchy_id: HierarchyId,
        /// The agent at which the cycle was detected.
        agent_id: PartyId,
    },

    /// Resolving an agent's parent chain exceeded `MAX_HIERARCHY_DEPTH`.
    #[error("hierarchy {hierarchy_id:?} exceeds max depth at agent {agent_id:?}")]
    InvalidHierarchyLevel {
        /// The hierarchy whose depth was exceeded.
        hierarchy_id: HierarchyId,
        /// The agent at which the depth limit was hit.
        agent_id: PartyId,
    },

    /// An agent node named a `parentAgentId` absent from the hierarchy.
    #[error("hierarchy {hierarchy_id:?} references unknown parent agent {parent_agent_id:?}")]
    ParentAgentNotFound {
        /// The hierarchy missing the parent.
        hierarchy_id: HierarchyId,
        /// The missing parent identifier.
        parent_agent_id: PartyId,
    },

    /// A hierarchy was constructed with the same agent id more than once.
    #[error("hierarchy {hierarchy_id:?} has duplicate agent {agent_id:?}")]
    DuplicateAgent {
        /// The offending hierarchy.
        hierarchy_id: HierarchyId,
        /// The duplicated agent identifier.
        agent_id: PartyId,
    },

    /// The sum of a flow's or period's attributed entries did not equal the
    /// amount being distributed.
    #[error("attribution amount mismatch for flow {flow_id:?}: expected {expected}, got {actual}")]
    AmountMismatch {
        /// The flow whose attribution failed to conserve.
        flow_id: FlowId,
        /// The amount that should have been fully attributed.
        expected: u64,
        /// The sum actually attributed.
        actual: u64,
    },
}

impl CodedError for AttributionError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidBasisPoints { .. } => ErrorCode::InvalidBasisPoints,
            Self::InvalidRuleSetTotal { .. } => ErrorCode::InvalidRuleSetTotal,
            Self::RuleCountOutOfRange { .. } => ErrorCode::RuleCountOutOfRange,
            Self::HierarchyCycleDetected { .. } => ErrorCode::HierarchyCycleDetected,
            Self::InvalidHierarchyLevel { .. } => ErrorCode::InvalidHierarchyLevel,
            Self::ParentAgentNotFound { .. } => ErrorCode::ParentAgentNotFound,
            Self::DuplicateAgent { .. } => ErrorCode::DuplicateAgent,
            Self::AmountMismatch { .. } => ErrorCode::AmountMismatch,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        match self {
            Self::InvalidBasisPoints { rule_set_id, basis_points } => {
                details.insert("ruleSetId".to_string(), rule_set_id.as_str().to_string());
                details.insert("basisPoints".to_string(), basis_points.to_string());
            }
            Self::InvalidRuleSetTotal { rule_set_id, actual_total } => {
                details.insert("ruleSetId".to_string(), rule_set_id.as_str().to_string());
                details.insert("actualTotal".to_string(), actual_total.to_string());
            }
            Self::RuleCountOutOfRange { rule_set_id, rule_count } => {
                details.insert("ruleSetId".to_string(), rule_set_id.as_str().to_string());
                details.insert("ruleCount".to_string(), rule_count.to_string());
            }
            Self::HierarchyCycleDetected { hierarchy_id, agent_id }
            | Self::InvalidHierarchyLevel { hierarchy_id, agent_id } => {
                details.insert("hierarchyId".to_string(), hierarchy_id.as_str().to_string());
                details.insert("agentId".to_string(), agent_id.as_str().to_string());
            }
            Self::ParentAgentNotFound { hierarchy_id, parent_agent_id } => {
                details.insert("hierarchyId".to_string(), hierarchy_id.as_str().to_string());
                details.insert("parentAgentId".to_string(), parent_agent_id.as_str().to_string());
            }
            Self::DuplicateAgent { hierarchy_id, agent_id } => {
                details.insert("hierarchyId".to_string(), hierarchy_id.as_str().to_string());
                details.insert("agentId".to_string(), agent_id.as_str().to_string());
            }
            Self::AmountMismatch { flow_id, expected, actual } => {
                details.insert("flowId".to_string(), flow_id.as_str().to_string());
                details.insert("expected".to_string(), expected.to_string());
                details.insert("actual".to_string(), actual.to_string());
            }
        }
        details
    }
}
