// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The append-only, hash-chained flow record registry.

use std::collections::BTreeMap;

use ledger_core::canonical::{checksum, to_canonical_string, GENESIS_HASH};
use ledger_core::{FlowId, PartyId, SessionId};
use tracing::{debug, instrument, warn};

use crate::error::FlowError;
use crate::record::{AppendFlowInput, AppendResult, FlowRecord, FlowStatus};

/// Append-only, hash-chained log of [`FlowRecord`]s.
///
/// This type is single-writer and not `Sync`; wrap it in
/// [`crate::concurrent::ConcurrentFlowRegistry`] for use across threads.
#[derive(Clone, Default, Debug)]
pub struct FlowRegistry {
    records: Vec<FlowRecord>,
    effective: BTreeMap<FlowId, usize>,
}

impl FlowRegistry {
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

    /// Appends a new flow record.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::DuplicateFlowId`] if `input.flow_id` is already
    /// present, or [`FlowError::InvalidTimestamp`] if
    /// `input.injected_timestamp` is zero.
    #[instrument(skip(self, input), fields(flow_id = %input.flow_id))]
    pub fn append_flow(&mut self, input: AppendFlowInput) -> Result<AppendResult, FlowError> {
        if self.effective.contains_key(&input.flow_id) {
            warn!(code = "DUPLICATE_FLOW_ID", "rejected duplicate flow append");
            return Err(FlowError::DuplicateFlowId { flow_id: input.flow_id });
        }
        if input.injected_timestamp == 0 {
            warn!(code = "INVALID_TIMESTAMP", "rejected flow append with zero timestamp");
            return Err(FlowError::InvalidTimestamp { timestamp: input.injected_timestamp });
        }

        let sequence = self.records.len() as u64;
        let previous_checksum = self.last_checksum();
        let mut record = FlowRecord {
            flow_id: input.flow_id,
            session_id: input.session_id,
            party_id: input.party_id,
            party_type: input.party_type,
            flow_type: input.flow_type,
            direction: input.direction,
            amount: input.amount,
            status: FlowStatus::Pending,
            injected_timestamp: input.injected_timestamp,
            confirmed_timestamp: None,
            voided_timestamp: None,
            sequence,
            checksum: String::new(),
            previous_checksum,
            description: input.description,
            metadata: input.metadata,
        };
        record.checksum = checksum("", &record.canonical_for_checksum());

        debug!(sequence, checksum = %record.checksum, "flow appended");
        self.effective.insert(record.flow_id.clone(), self.records.len());
        self.records.push(record.clone());
        Ok(AppendResult { record })
    }

    /// Transitions `flow_id` from `Pending` to `Confirmed` by appending a new
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::FlowNotFound`] if no flow exists with that id, or
    /// [`FlowError::InvalidStatusTransition`] if the effective record is not
    /// `Pending`.
    #[instrument(skip(self))]
    pub fn confirm_flow(&mut self, flow_id: &FlowId, ts: u64) -> Result<AppendResult, FlowError> {
        self.transition(flow_id, FlowStatus::Confirmed, ts)
    }

    /// Transitions `flow_id` to `Void` by appending a new record. Legal from
    /// either `Pending` or `Confirmed`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::FlowNotFound`] if no flow exists with that id, or
    /// [`FlowError::InvalidStatusTransition`] if the effective record is
    /// already `Void`.
    #[instrument(skip(self))]
    pub fn void_flow(&mut self, flow_id: &FlowId, ts: u64) -> Result<AppendResult, FlowError> {
        self.transition(flow_id, FlowStatus::Void, ts)
    }

    fn transition(&mut self, flow_id: &FlowId, to: FlowStatus, ts: u64) -> Result<AppendResult, FlowError> {
        if ts == 0 {
            warn!(code = "INVALID_TIMESTAMP", "rejected transition with zero timestamp");
            return Err(FlowError::InvalidTimestamp { timestamp: ts });
        }
        let current = self.get_flow(flow_id).ok_or_else(|| FlowError::FlowNotFound { flow_id: flow_id.clone() })?;
        if !current.status.can_transition_to(to) {
            warn!(code = "INVALID_STATUS_TRANSITION", from = ?current.status, to = ?to, "rejected illegal transition");
            return Err(FlowError::InvalidStatusTransition {
                flow_id: flow_id.clone(),
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
            FlowStatus::Confirmed => record.confirmed_timestamp = Some(ts),
            FlowStatus::Void => record.voided_timestamp = Some(ts),
            FlowStatus::Pending => unreachable!("transition target is never Pending"),
        }
        record.checksum = checksum("", &record.canonical_for_checksum());

        debug!(sequence, checksum = %record.checksum, "flow transitioned");
        self.effective.insert(record.flow_id.clone(), self.records.len());
        self.records.push(record.clone());
        Ok(AppendResult { record })
    }

    /// Looks up the effective (latest-by-sequence) record for `flow_id`.
    #[must_use]
    pub fn get_flow(&self, flow_id: &FlowId) -> Option<&FlowRecord> {
        self.effective.get(flow_id).map(|&idx| &self.records[idx])
    }

    /// The raw append log, ordered by `sequence`.
    #[must_use]
    pub fn get_all_records(&self) -> &[FlowRecord] {
        &self.records
    }

    /// Effective records whose `party_id` matches, ascending by `sequence`.
    #[must_use]
    pub fn get_records_by_party(&self, party_id: &PartyId) -> Vec<&FlowRecord> {
        self.effective_records().filter(|r| &r.party_id == party_id).collect()
    }

    /// Effective records whose `injected_timestamp` falls in `[start, end]`
    /// inclusive, ascending by `sequence`.
    #[must_use]
    pub fn get_records_by_time_window(&self, start: u64, end: u64) -> Vec<&FlowRecord> {
        self.effective_records().filter(|r| r.injected_timestamp >= start && r.injected_timestamp <= end).collect()
    }

    /// Effective records produced by `session_id`, ascending by `sequence`.
    #[must_use]
    pub fn get_records_by_source(&self, session_id: &SessionId) -> Vec<&FlowRecord> {
        self.effective_records().filter(|r| &r.session_id == session_id).collect()
    }

    /// Effective records currently in `status`, ascending by `sequence`.
    #[must_use]
    pub fn get_records_by_status(&self, status: FlowStatus) -> Vec<&FlowRecord> {
        self.effective_records().filter(|r| r.status == status).collect()
    }

    fn effective_records(&self) -> impl Iterator<Item = &FlowRecord> {
        let mut indices: Vec<usize> = self.effective.values().copied().collect();
        indices.sort_unstable();
        indices.into_iter().map(move |idx| &self.records[idx])
    }

    /// Recomputes every record's checksum and verifies chain linkage.
    ///
    /// # Errors
    ///
    /// Returns the first [`FlowError::ChecksumMismatch`] or
    /// [`FlowError::ChainBroken`] found, scanning in ascending `sequence`
    /// order.
    pub fn verify_integrity(&self) -> Result<(), FlowError> {
        let mut expected_previous = GENESIS_HASH.to_string();
        for record in &self.records {
            if record.previous_checksum != expected_previous {
                return Err(FlowError::ChainBroken {
                    sequence: record.sequence,
                    expected_previous,
                    actual_previous: record.previous_checksum.clone(),
                });
            }
            let recomputed = checksum("", &record.canonical_for_checksum());
            if recomputed != record.checksum {
                return Err(FlowError::ChecksumMismatch {
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

#[must_use]
pub(crate) fn canonical_debug_string(record: &FlowRecord) -> String {
    to_canonical_string(&record.canonical_for_checksum())
}
