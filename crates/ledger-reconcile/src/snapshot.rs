// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Immutable, hash-chained settlement snapshots, one per party per period.

use ledger_core::canonical::{checksum, CanonicalEncode, CanonicalValue, GENESIS_HASH};
use ledger_core::{Bucket, PartyId, PartyType, PeriodId, SnapshotId};

use crate::discrepancy::Discrepancy;
use crate::error::ReconcileError;
use crate::result::{PeriodReconciliationResult, ReconciliationStatus};
use crate::summary::{FlowSummary, SettlementTotal};

/// An immutable, per-party settlement snapshot frozen from a
/// [`PeriodReconciliationResult`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SettlementSnapshot {
    /// This snapshot's identifier.
    pub snapshot_id: SnapshotId,
    /// The period this snapshot was frozen from.
    pub period_id: PeriodId,
    /// The party this snapshot summarizes (the representative `partyId` for
    /// the combined platform snapshot).
    pub party_id: PartyId,
    /// The party's type.
    pub party_type: PartyType,
    /// The settlement bucket this snapshot belongs to.
    pub bucket: Bucket,
    /// This party's flow summary for the period.
    pub flow_summary: FlowSummary,
    /// This bucket's settlement total for the period.
    pub settlement_total: SettlementTotal,
    /// The period's overall reconciliation status, carried onto every
    /// snapshot produced from it.
    pub status: ReconciliationStatus,
    /// Discrepancies whose `affected_flow_ids` intersect this snapshot's
    /// flow set.
    pub discrepancies: Vec<Discrepancy>,
    /// When this snapshot was frozen.
    pub created_timestamp: u64,
    /// The predecessor snapshot's checksum, or [`GENESIS_HASH`] for the
    /// first snapshot in a batch.
    pub previous_snapshot_hash: String,
    /// Deterministic checksum over every field above.
    pub checksum: String,
}

impl SettlementSnapshot {
    fn canonical_for_checksum(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("snapshotId", self.snapshot_id.as_str().to_canonical()),
            ("periodId", self.period_id.as_str().to_canonical()),
            ("partyId", self.party_id.as_str().to_canonical()),
            ("partyType", self.party_type.to_canonical()),
            ("bucket", self.bucket.to_canonical()),
            ("flowSummary", self.flow_summary.to_canonical()),
            ("settlementTotal", self.settlement_total.to_canonical()),
            ("status", self.status.to_canonical()),
            ("discrepancies", CanonicalValue::array(self.discrepancies.iter().map(CanonicalEncode::to_canonical))),
            ("createdTimestamp", self.created_timestamp.to_canonical()),
            ("previousSnapshotHash", self.previous_snapshot_hash.to_canonical()),
        ])
    }
}

fn snapshot_id_for(period_id: &PeriodId, party_id: &PartyId) -> SnapshotId {
    SnapshotId::new(format!("{}:{}", period_id.as_str(), party_id.as_str()))
}

fn discrepancies_for(all: &[Discrepancy], flow_ids: &std::collections::BTreeSet<ledger_core::FlowId>) -> Vec<Discrepancy> {
    all.iter().filter(|d| d.affected_flow_ids.iter().any(|id| flow_ids.contains(id))).cloned().collect()
}

/// Freezes one [`SettlementSnapshot`] per party present in `result`, in the
/// fixed order: platform (if present), then clubs by `partyId`, then agents
/// by `partyId`. Each snapshot's `previous_snapshot_hash` equals its
/// predecessor's `checksum`; the first uses `previous_hash` (or
/// [`GENESIS_HASH`] if `None`).
#[must_use]
pub fn create_snapshots_from_reconciliation(
    result: &PeriodReconciliationResult,
    created_timestamp: u64,
    previous_hash: Option<&str>,
) -> Vec<SettlementSnapshot> {
    let mut snapshots = Vec::new();
    let mut previous = previous_hash.map_or_else(|| GENESIS_HASH.to_string(), ToString::to_string);

    let mut entries: Vec<(PartyId, PartyType, Bucket, &FlowSummary)> = Vec::new();
    if let Some((party_id, summary)) = &result.platform_summary {
        entries.push((party_id.clone(), PartyType::Platform, Bucket::Platform, summary));
    }
    for (party_id, summary) in &result.club_summaries {
        entries.push((party_id.clone(), PartyType::Club, Bucket::Club, summary));
    }
    for (party_id, summary) in &result.agent_summaries {
        entries.push((party_id.clone(), PartyType::Agent, Bucket::Agent, summary));
    }

    for (party_id, party_type, bucket, summary) in entries {
        let Some(settlement_total) = result.settlement_totals.get(&bucket).copied() else {
            continue;
        };
        let snapshot_id = snapshot_id_for(&result.period_id, &party_id);
        let discrepancies = discrepancies_for(&result.discrepancies, &summary.flow_ids);
        let mut snapshot = SettlementSnapshot {
            snapshot_id,
            period_id: result.period_id.clone(),
            party_id,
            party_type,
            bucket,
            flow_summary: summary.clone(),
            settlement_total,
            status: result.status,
            discrepancies,
            created_timestamp,
            previous_snapshot_hash: previous.clone(),
            checksum: String::new(),
        };
        snapshot.checksum = checksum("snap_", &snapshot.canonical_for_checksum());
        previous = snapshot.checksum.clone();
        snapshots.push(snapshot);
    }

    snapshots
}

/// Recomputes `snapshot`'s checksum and compares it to the stored value.
///
/// # Errors
///
/// Returns [`ReconcileError::ChecksumMismatch`] if the recomputed checksum
/// does not match.
pub fn verify_snapshot_checksum(snapshot: &SettlementSnapshot) -> Result<(), ReconcileError> {
    let recomputed = checksum("snap_", &snapshot.canonical_for_checksum());
    if recomputed != snapshot.checksum {
        return Err(ReconcileError::ChecksumMismatch {
            snapshot_id: snapshot.snapshot_id.clone(),
            expected: recomputed,
            actual: snapshot.checksum.clone(),
        });
    }
    Ok(())
}

/// Verifies an ordered batch of snapshots: the first must chain from
/// [`GENESIS_HASH`], every subsequent `previous_snapshot_hash` must equal
/// its predecessor's `checksum`, and every `checksum` must recompute
/// exactly.
///
/// # Errors
///
/// Returns the first [`ReconcileError::ChainBroken`] or
/// [`ReconcileError::ChecksumMismatch`] found, scanning in order.
pub fn verify_snapshot_chain(snapshots: &[SettlementSnapshot]) -> Result<(), ReconcileError> {
    let mut expected_previous = GENESIS_HASH.to_string();
    for snapshot in snapshots {
        if snapshot.previous_snapshot_hash != expected_previous {
            return Err(ReconcileError::ChainBroken {
                snapshot_id: snapshot.snapshot_id.clone(),
                expected_previous,
                actual_previous: snapshot.previous_snapshot_hash.clone(),
            });
        }
        verify_snapshot_checksum(snapshot)?;
        expected_previous = snapshot.checksum.clone();
    }
    Ok(())
}
