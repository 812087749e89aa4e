// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flow registry error kinds.

use std::collections::BTreeMap;

use ledger_core::{CodedError, ErrorCode, FlowId};
use thiserror::Error;

use crate::record::FlowStatus;

/// Errors raised by the flow registry's append and lookup operations.
///
/// spec.md §4.1 lists `InvalidAmount` among `append_flow`'s failure modes,
/// and [`ErrorCode::InvalidAmount`] exists for vocabulary parity with that
/// list, but no variant of this enum constructs it: `amount` is typed `u64`,
/// so "not a non-negative integer" is structurally unreachable here (see
/// `DESIGN.md`).
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum FlowError {
    /// `flow_id` was already present in the registry.
    #[error("flow id already exists: {flow_id:?}")]
    DuplicateFlowId {
        /// The identifier that collided.
        flow_id: FlowId,
    },

    /// No flow exists with the requested identifier.
    #[error("flow not found: {flow_id:?}")]
    FlowNotFound {
        /// The identifier that was not found.
        flow_id: FlowId,
    },

    /// The requested status transition is not legal from the flow's current
    /// status.
    #[error("cannot transition flow {flow_id:?} from {from:?} to {to:?}")]
    InvalidStatusTransition {
        /// The flow being transitioned.
        flow_id: FlowId,
        /// Its current status.
        from: FlowStatus,
        /// The status the caller requested.
        to: FlowStatus,
    },

    /// `injected_timestamp` (or `confirmed_timestamp`/`voided_timestamp`)
    /// was zero.
    #[error("timestamp must be a strictly positive integer, got {timestamp}")]
    InvalidTimestamp {
        /// The offending value.
        timestamp: u64,
    },

    /// `verify_integrity` recomputed a record's checksum and it did not
    /// match the stored value.
    #[error("checksum mismatch at sequence {sequence}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The sequence position of the offending record.
        sequence: u64,
        /// The recomputed checksum.
        expected: String,
        /// The stored checksum.
        actual: String,
    },

    /// `verify_integrity` found a record whose `previous_checksum` did not
    /// equal its predecessor's `checksum`.
    #[error("chain broken at sequence {sequence}: expected previous {expected_previous}, got {actual_previous}")]
    ChainBroken {
        /// The sequence position of the offending record.
        sequence: u64,
        /// The checksum the predecessor actually produced.
        expected_previous: String,
        /// The `previous_checksum` stored on the offending record.
        actual_previous: String,
    },
}

impl CodedError for FlowError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateFlowId { .. } => ErrorCode::DuplicateFlowId,
            Self::FlowNotFound { .. } => ErrorCode::FlowNotFound,
            Self::InvalidStatusTransition { .. } => ErrorCode::InvalidStatusTransition,
            Self::InvalidTimestamp { .. } => ErrorCode::InvalidTimestamp,
            Self::ChecksumMismatch { .. } => ErrorCode::ChecksumMismatch,
            Self::ChainBroken { .. } => ErrorCode::ChainBroken,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        match self {
            Self::DuplicateFlowId { flow_id } | Self::FlowNotFound { flow_id } => {
                details.insert("flowId".to_string(), flow_id.as_str().to_string());
            }
            Self::InvalidStatusTransition { flow_id, from, to } => {
                details.insert("flowId".to_string(), flow_id.as_str().to_string());
                details.insert("from".to_string(), from.as_str().to_string());
                details.insert("to".to_string(), to.as_str().to_string());
            }
            Self::InvalidTimestamp { timestamp } => {
                details.insert("timestamp".to_string(), timestamp.to_string());
            }
            Self::ChecksumMismatch { sequence, expected, actual } => {
                details.insert("sequence".to_string(), sequence.to_string());
                details.insert("expected".to_string(), expected.clone());
                details.insert("actual".to_string(), actual.clone());
            }
            Self::ChainBroken { sequence, expected_previous, actual_previous } => {
                details.insert("sequence".to_string(), sequence.to_string());
                details.insert("expectedPrevious".to_string(), expected_previous.clone());
                details.insert("actualPrevious".to_string(), actual_previous.clone());
            }
        }
        details
    }
}
