// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The append-only, hash-chained recharge record registry.

use std::collections::BTreeMap;

use ledger_core::canonical::{checksum, GENESIS_HASH};
use ledger_core::{PartyId, RechargeId};
use tracing::{debug, instrument, warn};

use crate::error::RechargeError;
use crate::record::{AppendRechargeInput, AppendRechargeResult, RechargeRecord, RechargeStatus};

/// Append-only, hash-chained log of [`RechargeRecord`]s.
///
/// This type is single-writer and not `Sync`. Nothing here moves value; a
/// recharge is a reference a reconciler cross-checks against flows, never a
/// settlement input in its own right.
#[derive(Clone, Default, Debug)]
pub struct RechargeRegistry {
    records: Vec<RechargeRecord>,
    effective: BTreeMap<RechargeId, usize>,
}

impl RechargeRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain tip: the `checksum` of the last appended record, or
    /// [`GENESIS_HASH`] if the registry is empty.
    #[must_use]
    pub fn last_checksum(&self) -> String {
        self.records.last().map_or_else(|| GENESIS_HASH.to_string(), |r| r.checksum.clone())
    }

    /// Appends a new recharge record.
    ///
    /// # Errors
    ///
    /// Returns [`RechargeError::DuplicateRechargeId`] if `input.recharge_id`
    /// is already present, or [`RechargeError::InvalidTimestamp`] if
    /// `input.declared_timestamp` is zero.
    #[instrument(skip(self, input), fields(recharge_id = %input.recharge_id))]
    pub fn append_recharge(&mut self, input: AppendRechargeInput) -> Result<AppendRechargeResult, RechargeError> {
        if self.effective.contains_key(&input.recharge_id) {
            warn!(code = "DUPLICATE_RECHARGE_ID", "rejected duplicate recharge append");
            return Err(RechargeError::DuplicateRechargeId { recharge_id: input.recharge_id });
        }
        if input.declared_timestamp == 0 {
            warn!(code = "INVALID_TIMESTAMP", "rejected recharge append with zero timestamp");
            return Err(RechargeError::InvalidTimestamp { timestamp: input.declared_timestamp });
        }

        let sequence = self.records.len() as u64;
        let previous_checksum = self.last_checksum();
        let mut record = RechargeRecord {
            recharge_id: input.recharge_id,
            source: input.source,
            status: RechargeStatus::Declared,
            party_id: input.party_id,
            reference_amount: input.reference_amount,
            external_reference_id: input.external_reference_id,
            sequence,
            declared_timestamp: input.declared_timestamp,
            confirmed_timestamp: None,
            voided_timestamp: None,
            checksum: String::new(),
            previous_checksum,
        };
        record.checksum = checksum("", &record.canonical_for_checksum());

        debug!(sequence, checksum = %record.checksum, "recharge appended");
        self.effective.insert(record.recharge_id.clone(), self.records.len());
        self.records.push(record.clone());
        Ok(AppendRechargeResult { record })
    }

    /// Transitions `recharge_id` from `Declared` to `Confirmed` by appending
    /// a new record.
    ///
    /// # Errors
    ///
    /// Returns [`RechargeError::RechargeNotFound`] if no recharge exists
    /// with that id, or [`RechargeError::InvalidStatusTransition`] if the
    /// effective record is not `Declared`.
    #[instrument(skip(self))]
    pub fn confirm_recharge(&mut self, recharge_id: &RechargeId, ts: u64) -> Result<AppendRechargeResult, RechargeError> {
        self.transition(recharge_id, RechargeStatus::Confirmed, ts)
    }

    /// Transitions `recharge_id` to `Voided` by appending a new record.
    /// Legal from either `Declared` or `Confirmed`.
    ///
    /// # Errors
    ///
    /// Returns [`RechargeError::RechargeNotFound`] if no recharge exists
    /// with that id, or [`RechargeError::InvalidStatusTransition`] if the
    /// effective record is already `Voided`.
    #[instrument(skip(self))]
    pub fn void_recharge(&mut self, recharge_id: &RechargeId, ts: u64) -> Result<AppendRechargeResult, RechargeError> {
        self.transition(recharge_id, RechargeStatus::Voided, ts)
    }

    fn transition(&mut self, recharge_id: &RechargeId, to: RechargeStatus, ts: u64) -> Result<AppendRechargeResult, RechargeError> {
        if ts == 0 {
            warn!(code = "INVALID_TIMESTAMP", "rejected transition with zero timestamp");
            return Err(RechargeError::InvalidTimestamp { timestamp: ts });
        }
        let current =
            self.get_recharge(recharge_id).ok_or_else(|| RechargeError::RechargeNotFound { recharge_id: recharge_id.clone() })?;
        if !current.status.can_transition_to(to) {
            warn!(code = "INVALID_STATUS_TRANSITION", from = ?current.status, to = ?to, "rejected illegal transition");
            return Err(RechargeError::InvalidStatusTransition {
                recharge_id: recharge_id.clone(),
                from: current.status,
                to,
            });
        }

        let sequence = self.records.len() as u64;
        let previous_checksum = self.last_checksum();
        let mut record = current.clone();
        record.status = to;
        record.sequence = sequence;
        record.previous_checksum = previous_checksum;
        match to {
            RechargeStatus::Confirmed => record.confirmed_timestamp = Some(ts),
            RechargeStatus::Voided => record.voided_timestamp = Some(ts),
            RechargeStatus::Declared => unreachable!("transition target is never Declared"),
        }
        record.checksum = checksum("", &record.canonical_for_checksum());

        debug!(sequence, checksum = %record.checksum, "recharge transitioned");
        self.effective.insert(record.recharge_id.clone(), self.records.len());
        self.records.push(record.clone());
        Ok(AppendRechargeResult { record })
    }

    /// Looks up the effective (latest-by-sequence) record for
    /// `recharge_id`.
    #[must_use]
    pub fn get_recharge(&self, recharge_id: &RechargeId) -> Option<&RechargeRecord> {
        self.effective.get(recharge_id).map(|&idx| &self.records[idx])
    }

    /// The raw append log, ordered by `sequence`.
    #[must_use]
    pub fn get_all_records(&self) -> &[RechargeRecord] {
        &self.records
    }

    /// Effective records whose `party_id` matches, ascending by `sequence`.
    #[must_use]
    pub fn get_records_by_party(&self, party_id: &PartyId) -> Vec<&RechargeRecord> {
        self.effective_records().filter(|r| &r.party_id == party_id).collect()
    }

    /// Effective records currently in `status`, ascending by `sequence`.
    #[must_use]
    pub fn get_records_by_status(&self, status: RechargeStatus) -> Vec<&RechargeRecord> {
        self.effective_records().filter(|r| r.status == status).collect()
    }

    fn effective_records(&self) -> impl Iterator<Item = &RechargeRecord> {
        let mut indices: Vec<usize> = self.effective.values().copied().collect();
        indices.sort_unstable();
        indices.into_iter().map(move |idx| &self.records[idx])
    }

    /// Recomputes every record's checksum and verifies chain linkage.
    ///
    /// # Errors
    ///
    /// Returns the first [`RechargeError::ChecksumMismatch`] or
    /// [`RechargeError::ChainBroken`] found, scanning in ascending
    /// `sequence` order.
    pub fn verify_integrity(&self) -> Result<(), RechargeError> {
        let mut expected_previous = GENESIS_HASH.to_string();
        for record in &self.records {
            if record.previous_checksum != expected_previous {
                return Err(RechargeError::ChainBroken {
                    sequence: record.sequence,
                    expected_previous,
                    actual_previous: record.previous_checksum.clone(),
                });
            }
            let recomputed = checksum("", &record.canonical_for_checksum());
            if recomputed != record.checksum {
                return Err(RechargeError::ChecksumMismatch {
                    sequence: record.sequence,
                    expected: recomputed,
                    actual: record.checksum.clone(),
                });
            }
            expected_previous = record.checksum.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use ledger_core::PartyId;

    use crate::record::RechargeSource;

    fn input(recharge_id: &str, amount: u64, ts: u64) -> AppendRechargeInput {
        AppendRechargeInput {
            recharge_id: RechargeId::new(recharge_id),
            source: RechargeSource::External,
            party_id: PartyId::new("party-1"),
            reference_amount: amount,
            external_reference_id: None,
            declared_timestamp: ts,
        }
    }

    #[test]
    fn first_append_chains_from_genesis() {
        let mut registry = RechargeRegistry::new();
        let result = registry.append_recharge(input("r1", 100, 10)).unwrap();
        assert_eq!(result.record.sequence, 0);
        assert_eq!(result.record.previous_checksum, GENESIS_HASH);
        assert_eq!(registry.last_checksum(), result.record.checksum);
    }

    #[test]
    fn duplicate_recharge_id_is_rejected_and_registry_unchanged() {
        let mut registry = RechargeRegistry::new();
        registry.append_recharge(input("r1", 100, 10)).unwrap();
        let before = registry.last_checksum();
        let err = registry.append_recharge(input("r1", 999, 99)).unwrap_err();
        assert!(matches!(err, RechargeError::DuplicateRechargeId { .. }));
        assert_eq!(registry.last_checksum(), before);
    }

    #[test]
    fn confirm_then_void_appends_new_records_without_mutating_prior() {
        let mut registry = RechargeRegistry::new();
        registry.append_recharge(input("r1", 100, 10)).unwrap();
        let confirmed = registry.confirm_recharge(&RechargeId::new("r1"), 11).unwrap();
        assert_eq!(confirmed.record.status, RechargeStatus::Confirmed);

        let voided = registry.void_recharge(&RechargeId::new("r1"), 12).unwrap();
        assert_eq!(voided.record.status, RechargeStatus::Voided);
        assert_eq!(registry.get_all_records().len(), 3);
    }

    #[test]
    fn voided_is_terminal_on_the_registry() {
        let mut registry = RechargeRegistry::new();
        registry.append_recharge(input("r1", 100, 10)).unwrap();
        registry.void_recharge(&RechargeId::new("r1"), 11).unwrap();
        let err = registry.void_recharge(&RechargeId::new("r1"), 12).unwrap_err();
        assert!(matches!(err, RechargeError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn verify_integrity_detects_tampered_checksum() {
        let mut registry = RechargeRegistry::new();
        registry.append_recharge(input("r1", 100, 10)).unwrap();
        registry.records[0].checksum = "deadbeef".to_string();
        let err = registry.verify_integrity().unwrap_err();
        assert!(matches!(err, RechargeError::ChecksumMismatch { .. }));
    }
}
