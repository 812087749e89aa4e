// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recharge reference map error kinds.

use std::collections::BTreeMap;

use ledger_core::{CodedError, ErrorCode, FlowId, LinkId, RechargeId};
use thiserror::Error;

use crate::record::RechargeStatus;

/// Errors raised by the recharge registry or the recharge-link registry.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum RechargeError {
    /// A recharge with this identifier already exists.
    #[error("duplicate recharge id: {recharge_id:?}")]
    DuplicateRechargeId {
        /// The duplicated identifier.
        recharge_id: RechargeId,
    },

    /// No recharge with this identifier exists.
    #[error("recharge not found: {recharge_id:?}")]
    RechargeNotFound {
        /// The identifier that was not found.
        recharge_id: RechargeId,
    },

    /// The requested lifecycle transition is not legal from the recharge's
    /// current status.
    #[error("invalid status transition for {recharge_id:?}: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        /// The recharge the illegal transition was attempted on.
        recharge_id: RechargeId,
        /// The status the recharge was actually in.
        from: RechargeStatus,
        /// The status that was requested.
        to: RechargeStatus,
    },

    /// A timestamp field was zero or otherwise not a valid instant.
    #[error("invalid timestamp: {timestamp}")]
    InvalidTimestamp {
        /// The offending value.
        timestamp: u64,
    },

    /// A link with this identifier already exists.
    #[error("duplicate link id: {link_id:?}")]
    DuplicateLinkId {
        /// The duplicated identifier.
        link_id: LinkId,
    },

    /// No link with this identifier exists.
    #[error("link not found: {link_id:?}")]
    LinkNotFound {
        /// The identifier that was not found.
        link_id: LinkId,
    },

    /// `create_recharge_link` referenced a `flowId` absent from the flow
    /// registry.
    #[error("linked flow not found: {flow_id:?}")]
    LinkedFlowNotFound {
        /// The missing flow identifier.
        flow_id: FlowId,
    },

    /// A recomputed checksum did not match the stored value.
    #[error("checksum mismatch at sequence {sequence}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The sequence number of the offending record.
        sequence: u64,
        /// The recomputed checksum.
        expected: String,
        /// The stored checksum.
        actual: String,
    },

    /// A record's `previousChecksum` did not match its predecessor's
    /// checksum.
    #[error("chain broken at sequence {sequence}: expected previous {expected_previous}, got {actual_previous}")]
    ChainBroken {
        /// The sequence number of the offending record.
        sequence: u64,
        /// The checksum the predecessor actually produced.
        expected_previous: String,
        /// The `previousChecksum` stored on the offending record.
        actual_previous: String,
    },
}

impl CodedError for RechargeError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateRechargeId { .. } => ErrorCode::DuplicateRechargeId,
            Self::RechargeNotFound { .. } => ErrorCode::RechargeNotFound,
            Self::InvalidStatusTransition { .. } => ErrorCode::InvalidStatusTransition,
            Self::InvalidTimestamp { .. } => ErrorCode::InvalidTimestamp,
            Self::DuplicateLinkId { .. } => ErrorCode::DuplicateLinkId,
            Self::LinkNotFound { .. } => ErrorCode::LinkNotFound,
            Self::LinkedFlowNotFound { .. } => ErrorCode::FlowNotFound,
            Self::ChecksumMismatch { .. } => ErrorCode::ChecksumMismatch,
            Self::ChainBroken { .. } => ErrorCode::ChainBroken,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        match self {
            Self::DuplicateRechargeId { recharge_id } | Self::RechargeNotFound { recharge_id } => {
                details.insert("rechargeId".to_string(), recharge_id.as_str().to_string());
            }
            Self::InvalidStatusTransition { recharge_id, from, to } => {
                details.insert("rechargeId".to_string(), recharge_id.as_str().to_string());
                details.insert("from".to_string(), from.as_str().to_string());
                details.insert("to".to_string(), to.as_str().to_string());
            }
            Self::InvalidTimestamp { timestamp } => {
                details.insert("timestamp".to_string(), timestamp.to_string());
            }
            Self::DuplicateLinkId { link_id } | Self::LinkNotFound { link_id } => {
                details.insert("linkId".to_string(), link_id.as_str().to_string());
            }
            Self::LinkedFlowNotFound { flow_id } => {
                details.insert("flowId".to_string(), flow_id.as_str().to_string());
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
