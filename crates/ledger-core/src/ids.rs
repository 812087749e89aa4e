// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Branded string identifiers shared across the ledger stack.
//!
//! Each identifier is a `#[repr(transparent)]` newtype over an owned
//! `String`, following the `NodeId`/`TypeId` pattern in `warp-core::ident`:
//! a dedicated wrapper per identifier kind prevents accidental mixing (a
//! `FlowId` can never be handed to an API expecting a `PartyId`), and the
//! inner string is reachable only through an explicit accessor — never via
//! `Deref` or an implicit conversion.

use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[repr(transparent)]
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, serde::Serialize, serde::Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wraps an owned or borrowed string as this identifier kind.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrows the identifier's inner text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the owned inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

define_id!(FlowId, "Identifier for a flow record in the L0 registry.");
define_id!(SessionId, "Identifier for an upstream game/table session that produced a flow.");
define_id!(PartyId, "Identifier for a party (platform, club, agent, or player).");
define_id!(RechargeId, "Identifier for a recharge record in the L3 registry.");
define_id!(LinkId, "Identifier for a recharge-to-flow link.");
define_id!(ExternalRefId, "Identifier for an external reference attached to a recharge.");
define_id!(PeriodId, "Identifier for a reconciliation period.");
define_id!(SnapshotId, "Identifier for a settlement or attribution snapshot.");
define_id!(RuleSetId, "Identifier for an attribution rule set.");
define_id!(HierarchyId, "Identifier for an agent hierarchy.");
define_id!(EntryId, "Identifier for an attribution entry.");
define_id!(AuditSessionId, "Identifier for an audit correlation session.");
define_id!(AuditRowId, "Identifier for a single audit row within a session.");

#[cfg(test)]
mod tests {
    use super::*;

    // ── 1. accessors round-trip ──────────────────────────────────────────

    #[test]
    fn as_str_and_into_inner_round_trip() {
        let id = FlowId::new("flow-1");
        assert_eq!(id.as_str(), "flow-1");
        assert_eq!(id.clone().into_inner(), "flow-1".to_string());
        assert_eq!(id.to_string(), "flow-1");
    }

    // ── 2. distinct id kinds do not unify under type inference ──────────

    #[test]
    fn distinct_kinds_carry_distinct_text() {
        let flow = FlowId::new("same-text");
        let party = PartyId::new("same-text");
        assert_eq!(flow.as_str(), party.as_str());
    }

    // ── 3. ordering is lexicographic over the inner string ──────────────

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![PartyId::new("club-2"), PartyId::new("club-10"), PartyId::new("club-1")];
        ids.sort();
        assert_eq!(ids, vec![PartyId::new("club-1"), PartyId::new("club-10"), PartyId::new("club-2")]);
    }
}
