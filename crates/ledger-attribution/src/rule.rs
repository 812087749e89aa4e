// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attribution rules and rule sets: fixed basis-point splits of a flow's
//! amount across a set of parties.

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::{PartyId, PartyType, RuleSetId};

use crate::error::AttributionError;

/// The maximum number of rules permitted in one rule set.
pub const MAX_RULES_PER_SET: usize = 100;

/// Total basis points a conforming rule set's rules must sum to.
pub const BASIS_POINTS_TOTAL: u16 = 10_000;

/// One party's fixed share of a rule set's distribution.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AttributionRule {
    /// The rule set this rule belongs to.
    pub rule_set_id: RuleSetId,
    /// The receiving party.
    pub party_id: PartyId,
    /// The receiving party's type.
    pub party_type: PartyType,
    /// This rule's share, in basis points (1 bp = 0.01%).
    pub basis_points: u16,
    /// Optional human-readable label.
    pub label: Option<String>,
}

impl CanonicalEncode for AttributionRule {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("ruleSetId", self.rule_set_id.as_str().to_canonical()),
            ("partyId", self.party_id.as_str().to_canonical()),
            ("partyType", self.party_type.to_canonical()),
            ("basisPoints", u32::from(self.basis_points).to_canonical()),
            ("label", self.label.to_canonical()),
        ])
    }
}

/// A validated, immutable set of [`AttributionRule`]s whose basis points sum
/// to exactly [`BASIS_POINTS_TOTAL`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AttributionRuleSet {
    /// This rule set's identifier.
    pub rule_set_id: RuleSetId,
    /// The rules, in the fixed order attribution entries will follow.
    pub rules: Vec<AttributionRule>,
    /// The validated sum of `rules[..].basis_points`; always
    /// [`BASIS_POINTS_TOTAL`].
    pub total_basis_points: u16,
    /// When this rule set was created.
    pub created_at: u64,
    /// Optional human-readable label.
    pub label: Option<String>,
}

impl AttributionRuleSet {
    /// Validates and builds a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`AttributionError::RuleCountOutOfRange`] if `rules.len()` is
    /// not in `1..=MAX_RULES_PER_SET`, [`AttributionError::InvalidBasisPoints`]
    /// if any rule's basis points exceed [`BASIS_POINTS_TOTAL`], or
    /// [`AttributionError::InvalidRuleSetTotal`] if the rules' basis points
    /// do not sum to exactly [`BASIS_POINTS_TOTAL`].
    pub fn new(
        rule_set_id: RuleSetId,
        rules: Vec<AttributionRule>,
        created_at: u64,
        label: Option<String>,
    ) -> Result<Self, AttributionError> {
        if rules.is_empty() || rules.len() > MAX_RULES_PER_SET {
            return Err(AttributionError::RuleCountOutOfRange { rule_set_id, rule_count: rules.len() });
        }
        for rule in &rules {
            if rule.basis_points > BASIS_POINTS_TOTAL {
                return Err(AttributionError::InvalidBasisPoints {
                    rule_set_id,
                    basis_points: u32::from(rule.basis_points),
                });
            }
        }
        let total: u32 = rules.iter().map(|r| u32::from(r.basis_points)).sum();
        if total != u32::from(BASIS_POINTS_TOTAL) {
            return Err(AttributionError::InvalidRuleSetTotal { rule_set_id, actual_total: total });
        }
        Ok(Self { rule_set_id, rules, total_basis_points: BASIS_POINTS_TOTAL, created_at, label })
    }
}

impl CanonicalEncode for AttributionRuleSet {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("ruleSetId", self.rule_set_id.as_str().to_canonical()),
            ("rules", CanonicalValue::array(self.rules.iter().map(CanonicalEncode::to_canonical))),
            ("totalBasisPoints", u32::from(self.total_basis_points).to_canonical()),
            ("createdAt", self.created_at.to_canonical()),
            ("label", self.label.to_canonical()),
        ])
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn rule(party_id: &str, party_type: PartyType, basis_points: u16) -> AttributionRule {
        AttributionRule {
            rule_set_id: RuleSetId::new("rs1"),
            party_id: PartyId::new(party_id),
            party_type,
            basis_points,
            label: None,
        }
    }

    #[test]
    fn rejects_empty_rule_set() {
        let err = AttributionRuleSet::new(RuleSetId::new("rs1"), Vec::new(), 1, None).unwrap_err();
        assert!(matches!(err, AttributionError::RuleCountOutOfRange { .. }));
    }

    #[test]
    fn rejects_basis_points_not_summing_to_10000() {
        let rules = vec![rule("p1", PartyType::Platform, 5000), rule("p2", PartyType::Club, 4000)];
        let err = AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap_err();
        assert!(matches!(err, AttributionError::InvalidRuleSetTotal { actual_total: 9000, .. }));
    }

    #[test]
    fn accepts_rules_summing_to_exactly_10000() {
        let rules = vec![rule("p1", PartyType::Platform, 6000), rule("p2", PartyType::Club, 4000)];
        let set = AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap();
        assert_eq!(set.total_basis_points, BASIS_POINTS_TOTAL);
    }

    // ── scenario S3: invalid rule set ────────────────────────────────────

    #[test]
    fn scenario_s3_invalid_rule_set() {
        let rules = vec![
            rule("platform-1", PartyType::Platform, 5000),
            rule("club-1", PartyType::Club, 3000),
            rule("agent-1", PartyType::Agent, 1000),
        ];
        let err = AttributionRuleSet::new(RuleSetId::new("rs1"), rules, 1, None).unwrap_err();
        assert!(matches!(err, AttributionError::InvalidRuleSetTotal { actual_total: 9000, .. }));
    }
}
