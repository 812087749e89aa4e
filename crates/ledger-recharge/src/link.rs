// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recharge-to-flow links: cross-references between C4 recharges and C1
//! flows, carrying no value of their own.

use std::collections::BTreeMap;

use ledger_core::canonical::{checksum, CanonicalEncode, CanonicalValue};
use ledger_core::{FlowId, LinkId, RechargeId};
use ledger_flow::FlowRegistry;
use tracing::{debug, instrument, warn};

use crate::error::RechargeError;
use crate::registry::RechargeRegistry;

/// Caller-supplied fields for a new recharge-to-flow link.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CreateLinkInput {
    /// Identifier for the new link. Must be unused in the link registry.
    pub link_id: LinkId,
    /// The recharge being linked. Must already exist in the recharge
    /// registry.
    pub recharge_id: RechargeId,
    /// The flows being linked against it. Each must already exist in the
    /// flow registry.
    pub linked_flow_ids: Vec<FlowId>,
    /// Caller-supplied instant; must be a strictly positive integer.
    pub linked_timestamp: u64,
}

/// A cross-reference from one recharge to one or more flows.
///
/// Unlike [`crate::record::RechargeRecord`] and `ledger_flow`'s flow
/// records, a link moves no value and is not hash-chained against prior
/// links: it exists purely so an auditor can trace a recharge to the flows
/// it was declared to explain, and back.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RechargeLink {
    /// Identifier for this link.
    pub link_id: LinkId,
    /// The recharge this link references.
    pub recharge_id: RechargeId,
    /// The flows this link references.
    pub linked_flow_ids: Vec<FlowId>,
    /// Sum of `amount` over every flow in `linked_flow_ids`, as observed at
    /// link-creation time.
    pub linked_reference_total: u64,
    /// Instant this link was created, as supplied by the caller.
    pub linked_timestamp: u64,
    /// Checksum over every field above except itself.
    pub checksum: String,
}

impl RechargeLink {
    fn canonical_for_checksum(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("linkId", self.link_id.as_str().to_canonical()),
            ("rechargeId", self.recharge_id.as_str().to_canonical()),
            ("linkedFlowIds", CanonicalValue::array(self.linked_flow_ids.iter().map(|id| id.as_str().to_canonical()))),
            ("linkedReferenceTotal", self.linked_reference_total.to_canonical()),
            ("linkedTimestamp", self.linked_timestamp.to_canonical()),
        ])
    }
}

/// Append-only log of [`RechargeLink`]s, indexed by `link_id`.
#[derive(Clone, Default, Debug)]
pub struct LinkRegistry {
    links: Vec<RechargeLink>,
    by_id: BTreeMap<LinkId, usize>,
    by_recharge: BTreeMap<RechargeId, Vec<usize>>,
    by_flow: BTreeMap<FlowId, Vec<usize>>,
}

impl LinkRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&mut self, link: RechargeLink) {
        let idx = self.links.len();
        self.by_id.insert(link.link_id.clone(), idx);
        self.by_recharge.entry(link.recharge_id.clone()).or_default().push(idx);
        for flow_id in &link.linked_flow_ids {
            self.by_flow.entry(flow_id.clone()).or_default().push(idx);
        }
        self.links.push(link);
    }

    /// Appends a pre-built link, the raw primitive behind
    /// [`create_recharge_link`]: it rejects a duplicate `link_id` but does
    /// not verify that `link.recharge_id` or any `link.linked_flow_ids`
    /// entry exists anywhere. Most callers want the validated variant.
    ///
    /// # Errors
    ///
    /// Returns [`RechargeError::DuplicateLinkId`] if `link.link_id` is
    /// already present.
    #[instrument(skip(self, link), fields(link_id = %link.link_id))]
    pub fn append_link(&mut self, link: RechargeLink) -> Result<(), RechargeError> {
        if self.by_id.contains_key(&link.link_id) {
            warn!(code = "DUPLICATE_LINK_ID", "rejected duplicate link append");
            return Err(RechargeError::DuplicateLinkId { link_id: link.link_id });
        }
        self.append(link);
        Ok(())
    }

    /// Looks up a link by its own identifier.
    #[must_use]
    pub fn get_link(&self, link_id: &LinkId) -> Option<&RechargeLink> {
        self.by_id.get(link_id).map(|&idx| &self.links[idx])
    }

    /// Every link that references `recharge_id`, in insertion order.
    #[must_use]
    pub fn trace_recharge_to_flows(&self, recharge_id: &RechargeId) -> Vec<&RechargeLink> {
        self.by_recharge.get(recharge_id).into_iter().flatten().map(|&idx| &self.links[idx]).collect()
    }

    /// Every link that references `flow_id`, in insertion order.
    #[must_use]
    pub fn trace_flow_to_recharges(&self, flow_id: &FlowId) -> Vec<&RechargeLink> {
        self.by_flow.get(flow_id).into_iter().flatten().map(|&idx| &self.links[idx]).collect()
    }

    /// The full log, in insertion order.
    #[must_use]
    pub fn get_all_links(&self) -> &[RechargeLink] {
        &self.links
    }
}

/// Creates a link between a recharge and one or more flows, verifying both
/// sides exist and computing the reference total from the flows' current
/// effective amounts.
///
/// # Errors
///
/// Returns [`RechargeError::DuplicateLinkId`] if `input.link_id` is already
/// present, [`RechargeError::RechargeNotFound`] if `input.recharge_id` is
/// unknown to `recharges`, [`RechargeError::LinkedFlowNotFound`] if any
/// entry of `input.linked_flow_ids` is unknown to `flows`, or
/// [`RechargeError::InvalidTimestamp`] if `input.linked_timestamp` is zero.
#[instrument(skip(links, recharges, flows, input), fields(link_id = %input.link_id))]
pub fn create_recharge_link(
    links: &mut LinkRegistry,
    recharges: &RechargeRegistry,
    flows: &FlowRegistry,
    input: CreateLinkInput,
) -> Result<RechargeLink, RechargeError> {
    if input.linked_timestamp == 0 {
        warn!(code = "INVALID_TIMESTAMP", "rejected link with zero timestamp");
        return Err(RechargeError::InvalidTimestamp { timestamp: input.linked_timestamp });
    }
    if recharges.get_recharge(&input.recharge_id).is_none() {
        warn!(code = "RECHARGE_NOT_FOUND", "rejected link to unknown recharge");
        return Err(RechargeError::RechargeNotFound { recharge_id: input.recharge_id });
    }

    let mut linked_reference_total: u64 = 0;
    for flow_id in &input.linked_flow_ids {
        let flow = flows.get_flow(flow_id).ok_or_else(|| {
            warn!(code = "FLOW_NOT_FOUND", flow_id = %flow_id, "rejected link to unknown flow");
            RechargeError::LinkedFlowNotFound { flow_id: flow_id.clone() }
        })?;
        linked_reference_total = linked_reference_total.saturating_add(flow.amount);
    }

    let mut link = RechargeLink {
        link_id: input.link_id,
        recharge_id: input.recharge_id,
        linked_flow_ids: input.linked_flow_ids,
        linked_reference_total,
        linked_timestamp: input.linked_timestamp,
        checksum: String::new(),
    };
    link.checksum = checksum("link_", &link.canonical_for_checksum());

    debug!(checksum = %link.checksum, "recharge link created");
    links.append_link(link.clone())?;
    Ok(link)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use ledger_core::{PartyId, PartyType, SessionId};
    use ledger_flow::record::{AppendFlowInput, Direction, FlowType};

    use crate::record::{AppendRechargeInput, RechargeSource};

    fn flows_with_one() -> FlowRegistry {
        let mut flows = FlowRegistry::new();
        flows
            .append_flow(AppendFlowInput {
                flow_id: FlowId::new("f1"),
                session_id: SessionId::new("s1"),
                party_id: PartyId::new("party-1"),
                party_type: PartyType::Club,
                flow_type: FlowType::BuyinRef,
                direction: Direction::In,
                amount: 500,
                injected_timestamp: 1,
                description: None,
                metadata: None,
            })
            .unwrap();
        flows
    }

    fn recharges_with_one() -> RechargeRegistry {
        let mut recharges = RechargeRegistry::new();
        recharges
            .append_recharge(AppendRechargeInput {
                recharge_id: RechargeId::new("r1"),
                source: RechargeSource::External,
                party_id: PartyId::new("party-1"),
                reference_amount: 500,
                external_reference_id: None,
                declared_timestamp: 1,
            })
            .unwrap();
        recharges
    }

    #[test]
    fn link_computes_reference_total_from_flow_amounts() {
        let flows = flows_with_one();
        let recharges = recharges_with_one();
        let mut links = LinkRegistry::new();
        let link = create_recharge_link(
            &mut links,
            &recharges,
            &flows,
            CreateLinkInput {
                link_id: LinkId::new("l1"),
                recharge_id: RechargeId::new("r1"),
                linked_flow_ids: vec![FlowId::new("f1")],
                linked_timestamp: 2,
            },
        )
        .unwrap();
        assert_eq!(link.linked_reference_total, 500);
    }

    #[test]
    fn unknown_flow_is_rejected() {
        let flows = flows_with_one();
        let recharges = recharges_with_one();
        let mut links = LinkRegistry::new();
        let err = create_recharge_link(
            &mut links,
            &recharges,
            &flows,
            CreateLinkInput {
                link_id: LinkId::new("l1"),
                recharge_id: RechargeId::new("r1"),
                linked_flow_ids: vec![FlowId::new("missing")],
                linked_timestamp: 2,
            },
        )
        .unwrap_err();
        assert!(matches!(err, RechargeError::LinkedFlowNotFound { .. }));
    }

    #[test]
    fn trace_recharge_to_flows_and_back() {
        let flows = flows_with_one();
        let recharges = recharges_with_one();
        let mut links = LinkRegistry::new();
        create_recharge_link(
            &mut links,
            &recharges,
            &flows,
            CreateLinkInput {
                link_id: LinkId::new("l1"),
                recharge_id: RechargeId::new("r1"),
                linked_flow_ids: vec![FlowId::new("f1")],
                linked_timestamp: 2,
            },
        )
        .unwrap();

        let by_recharge = links.trace_recharge_to_flows(&RechargeId::new("r1"));
        assert_eq!(by_recharge.len(), 1);
        let by_flow = links.trace_flow_to_recharges(&FlowId::new("f1"));
        assert_eq!(by_flow.len(), 1);
        assert_eq!(by_flow[0].link_id.as_str(), "l1");
    }

    #[test]
    fn duplicate_link_id_is_rejected() {
        let flows = flows_with_one();
        let recharges = recharges_with_one();
        let mut links = LinkRegistry::new();
        let make = || CreateLinkInput {
            link_id: LinkId::new("l1"),
            recharge_id: RechargeId::new("r1"),
            linked_flow_ids: vec![FlowId::new("f1")],
            linked_timestamp: 2,
        };
        create_recharge_link(&mut links, &recharges, &flows, make()).unwrap();
        let err = create_recharge_link(&mut links, &recharges, &flows, make()).unwrap_err();
        assert!(matches!(err, RechargeError::DuplicateLinkId { .. }));
    }

    #[test]
    fn append_link_accepts_a_raw_link_without_verifying_its_references() {
        let mut links = LinkRegistry::new();
        let mut link = RechargeLink {
            link_id: LinkId::new("l1"),
            recharge_id: RechargeId::new("unverified-recharge"),
            linked_flow_ids: vec![FlowId::new("unverified-flow")],
            linked_reference_total: 0,
            linked_timestamp: 2,
            checksum: String::new(),
        };
        link.checksum = checksum("link_", &link.canonical_for_checksum());
        links.append_link(link).unwrap();
        assert_eq!(links.get_link(&LinkId::new("l1")).unwrap().recharge_id.as_str(), "unverified-recharge");
    }

    #[test]
    fn append_link_rejects_a_duplicate_link_id() {
        let mut links = LinkRegistry::new();
        let build = || RechargeLink {
            link_id: LinkId::new("l1"),
            recharge_id: RechargeId::new("r1"),
            linked_flow_ids: vec![],
            linked_reference_total: 0,
            linked_timestamp: 1,
            checksum: String::new(),
        };
        links.append_link(build()).unwrap();
        let err = links.append_link(build()).unwrap_err();
        assert!(matches!(err, RechargeError::DuplicateLinkId { .. }));
    }
}
