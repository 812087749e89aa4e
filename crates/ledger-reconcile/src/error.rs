// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reconciliation engine error kinds.

use std::collections::BTreeMap;

use ledger_core::{CodedError, ErrorCode, SnapshotId};
use thiserror::Error;

/// Errors raised while reconciling a period or verifying settlement
/// snapshots.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ReconcileError {
    /// A period's bounds were not strictly increasing positive integers.
    #[error("invalid period: start_ts={start_ts}, end_ts={end_ts}")]
    InvalidPeriod {
        /// The offending start instant.
        start_ts: u64,
        /// The offending end instant.
        end_ts: u64,
    },

    /// No effective flow record fell within the period's bounds.
    #[error("no effective flow records in period")]
    NoDataForPeriod,

    /// A snapshot referenced by identifier does not exist in the provided
    /// set.
    #[error("snapshot not found: {snapshot_id:?}")]
    SnapshotNotFound {
        /// The identifier that was not found.
        snapshot_id: SnapshotId,
    },

    /// A recomputed snapshot checksum did not match the stored value.
    #[error("checksum mismatch for snapshot {snapshot_id:?}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The snapshot whose checksum failed to recompute.
        snapshot_id: SnapshotId,
        /// The recomputed checksum.
        expected: String,
        /// The stored checksum.
        actual: String,
    },

    /// A snapshot's `previous_snapshot_hash` did not equal its predecessor's
    /// checksum (or the genesis hash, for the first snapshot).
    #[error("snapshot chain broken at {snapshot_id:?}: expected previous {expected_previous}, got {actual_previous}")]
    ChainBroken {
        /// The snapshot whose chain link failed to verify.
        snapshot_id: SnapshotId,
        /// The checksum the predecessor actually produced (or the genesis
        /// hash, for the first snapshot).
        expected_previous: String,
        /// The `previous_snapshot_hash` stored on the offending snapshot.
        actual_previous: String,
    },
}

impl CodedError for ReconcileError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPeriod { .. } => ErrorCode::InvalidPeriod,
            Self::NoDataForPeriod => ErrorCode::NoDataForPeriod,
            Self::SnapshotNotFound { .. } => ErrorCode::SnapshotNotFound,
            Self::ChecksumMismatch { .. } => ErrorCode::ChecksumMismatch,
            Self::ChainBroken { .. } => ErrorCode::ChainBroken,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        match self {
            Self::InvalidPeriod { start_ts, end_ts } => {
                details.insert("startTs".to_string(), start_ts.to_string());
                details.insert("endTs".to_string(), end_ts.to_string());
            }
            Self::NoDataForPeriod => {}
            Self::SnapshotNotFound { snapshot_id } => {
                details.insert("snapshotId".to_string(), snapshot_id.as_str().to_string());
            }
            Self::ChecksumMismatch { snapshot_id, expected, actual } => {
                details.insert("snapshotId".to_string(), snapshot_id.as_str().to_string());
                details.insert("expected".to_string(), expected.clone());
                details.insert("actual".to_string(), actual.clone());
            }
            Self::ChainBroken { snapshot_id, expected_previous, actual_previous } => {
                details.insert("snapshotId".to_string(), snapshot_id.as_str().to_string());
                details.insert("expectedPrevious".to_string(), expected_previous.clone());
                details.insert("actualPrevious".to_string(), actual_previous.clone());
            }
        }
        details
    }
}
