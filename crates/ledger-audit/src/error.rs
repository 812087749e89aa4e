// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Audit correlator error kinds.

use std::collections::BTreeMap;

use ledger_core::{AuditSessionId, CodedError, ErrorCode};
use thiserror::Error;

/// Errors raised while building or replaying an audit session.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AuditError {
    /// A session identifier was empty.
    #[error("invalid session id: {session_id:?}")]
    InvalidSessionId {
        /// The offending identifier.
        session_id: AuditSessionId,
    },

    /// An audit session with this identifier already exists.
    #[error("duplicate session: {session_id:?}")]
    DuplicateSession {
        /// The duplicated identifier.
        session_id: AuditSessionId,
    },

    /// No audit session with this identifier exists.
    #[error("session not found: {session_id:?}")]
    SessionNotFound {
        /// The identifier that was not found.
        session_id: AuditSessionId,
    },

    /// A period's boundary timestamps are inconsistent.
    #[error("invalid period: start {start_ts}, end {end_ts}")]
    InvalidPeriod {
        /// The declared start instant.
        start_ts: u64,
        /// The declared end instant.
        end_ts: u64,
    },

    /// A timestamp field was zero or otherwise not a valid instant.
    #[error("invalid timestamp: {timestamp}")]
    InvalidTimestamp {
        /// The offending value.
        timestamp: u64,
    },

    /// An input to an audit operation was structurally invalid.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Human-readable explanation of what was wrong.
        reason: String,
    },
}

impl CodedError for AuditError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidSessionId { .. } => ErrorCode::InvalidSessionId,
            Self::DuplicateSession { .. } => ErrorCode::DuplicateSession,
            Self::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            Self::InvalidPeriod { .. } => ErrorCode::InvalidPeriod,
            Self::InvalidTimestamp { .. } => ErrorCode::InvalidTimestamp,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
        }
    }

    fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        match self {
            Self::InvalidSessionId { session_id } | Self::DuplicateSession { session_id } | Self::SessionNotFound { session_id } => {
                details.insert("sessionId".to_string(), session_id.as_str().to_string());
            }
            Self::InvalidPeriod { start_ts, end_ts } => {
                details.insert("startTs".to_string(), start_ts.to_string());
                details.insert("endTs".to_string(), end_ts.to_string());
            }
            Self::InvalidTimestamp { timestamp } => {
                details.insert("timestamp".to_string(), timestamp.to_string());
            }
            Self::InvalidInput { reason } => {
                details.insert("reason".to_string(), reason.clone());
            }
        }
        details
    }
}
