// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Party identity shared as a foreign key by flows, rules, and hierarchies.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalEncode;
use crate::ids::PartyId;

/// The role a party plays in the settlement graph.
///
/// `PLATFORM` is the house; `CLUB` and `AGENT` are intermediaries; `PLAYER`
/// is the terminal party. Ordering here is the canonical bucket ordering
/// used wherever settlement totals are grouped (`PLATFORM` < `CLUB` <
/// `AGENT` < `PLAYER`).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum PartyType {
    /// The platform itself.
    Platform,
    /// A club (a venue/operator grouping players under it).
    Club,
    /// An agent within a club's or platform's referral hierarchy.
    Agent,
    /// A terminal player.
    Player,
}

impl PartyType {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "PLATFORM",
            Self::Club => "CLUB",
            Self::Agent => "AGENT",
            Self::Player => "PLAYER",
        }
    }
}

impl CanonicalEncode for PartyType {
    fn to_canonical(&self) -> crate::canonical::CanonicalValue {
        crate::canonical::CanonicalValue::String(self.as_str().to_string())
    }
}

/// A party identity: `(partyId, partyType)`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Party {
    /// The party's opaque identifier.
    pub party_id: PartyId,
    /// The party's role.
    pub party_type: PartyType,
}

impl Party {
    /// Builds a new party identity.
    #[must_use]
    pub fn new(party_id: PartyId, party_type: PartyType) -> Self {
        Self { party_id, party_type }
    }
}

/// One of the three settlement aggregation buckets.
///
/// Distinct from [`PartyType`]: a `PLAYER` party never forms its own
/// settlement bucket (§3 "Settlement total" only names `PLATFORM`, `CLUB`,
/// `AGENT`).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum Bucket {
    /// The platform bucket.
    Platform,
    /// A club bucket.
    Club,
    /// An agent bucket.
    Agent,
}

impl Bucket {
    /// Stable label used in canonical serialization and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "PLATFORM",
            Self::Club => "CLUB",
            Self::Agent => "AGENT",
        }
    }

    /// Maps a [`PartyType`] to its settlement bucket, if it has one.
    ///
    /// Returns `None` for `PLAYER`, which is never a settlement bucket.
    #[must_use]
    pub const fn from_party_type(party_type: PartyType) -> Option<Self> {
        match party_type {
            PartyType::Platform => Some(Self::Platform),
            PartyType::Club => Some(Self::Club),
            PartyType::Agent => Some(Self::Agent),
            PartyType::Player => None,
        }
    }
}

impl CanonicalEncode for Bucket {
    fn to_canonical(&self) -> crate::canonical::CanonicalValue {
        crate::canonical::CanonicalValue::String(self.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_from_party_type_excludes_player() {
        assert_eq!(Bucket::from_party_type(PartyType::Platform), Some(Bucket::Platform));
        assert_eq!(Bucket::from_party_type(PartyType::Club), Some(Bucket::Club));
        assert_eq!(Bucket::from_party_type(PartyType::Agent), Some(Bucket::Agent));
        assert_eq!(Bucket::from_party_type(PartyType::Player), None);
    }

    #[test]
    fn party_type_ordering_matches_bucket_precedence() {
        let mut types = vec![PartyType::Agent, PartyType::Platform, PartyType::Club, PartyType::Player];
        types.sort();
        assert_eq!(types, vec![PartyType::Platform, PartyType::Club, PartyType::Agent, PartyType::Player]);
    }
}
