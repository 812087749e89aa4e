// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A `RwLock`-guarded wrapper for concurrent callers.
//!
//! [`FlowRegistry`](crate::FlowRegistry) itself is single-writer and not
//! `Sync`. [`ConcurrentFlowRegistry`] wraps it behind a [`RwLock`] so several
//! threads can share one registry; the write guard is held only for the
//! duration of a single append (checksum included), never across a whole
//! `Result`-returning call, so a reader can never observe a record whose
//! checksum has not yet been computed.

use std::sync::{RwLock, RwLockReadGuard};

use ledger_core::FlowId;

use crate::error::FlowError;
use crate::record::{AppendFlowInput, AppendResult, FlowRecord, FlowStatus};
use crate::registry::FlowRegistry;

/// Thread-safe wrapper around [`FlowRegistry`].
#[derive(Default, Debug)]
pub struct ConcurrentFlowRegistry {
    inner: RwLock<FlowRegistry>,
}

impl ConcurrentFlowRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`FlowRegistry::append_flow`].
    ///
    /// # Errors
    ///
    /// See [`FlowRegistry::append_flow`].

    pub fn append_flow(&self, input: AppendFlowInput) -> Result<AppendResult, FlowError> {
        self.write().append_flow(input)
    }

    /// See [`FlowRegistry::confirm_flow`].
    ///
    /// # Errors
    ///
    /// See [`FlowRegistry::confirm_flow`].

    pub fn confirm_flow(&self, flow_id: &FlowId, ts: u64) -> Result<AppendResult, FlowError> {
        self.write().confirm_flow(flow_id, ts)
    }

    /// See [`FlowRegistry::void_flow`].
    ///
    /// # Errors
    ///
    /// See [`FlowRegistry::void_flow`].

    pub fn void_flow(&self, flow_id: &FlowId, ts: u64) -> Result<AppendResult, FlowError> {
        self.write().void_flow(flow_id, ts)
    }

    /// Looks up the effective record for `flow_id`, cloned out from under the
    /// read guard.

    #[must_use]
    pub fn get_flow(&self, flow_id: &FlowId) -> Option<FlowRecord> {
        self.read().get_flow(flow_id).cloned()
    }

    /// Effective records currently in `status`, cloned out from under the
    /// read guard.

    #[must_use]
    pub fn get_records_by_status(&self, status: FlowStatus) -> Vec<FlowRecord> {
        self.read().get_records_by_status(status).into_iter().cloned().collect()
    }

    /// The registry's current chain tip.

    #[must_use]
    pub fn last_checksum(&self) -> String {
        self.read().last_checksum()
    }

    /// Recomputes every record's checksum and verifies chain linkage.
    ///
    /// # Errors
    ///
    /// See [`FlowRegistry::verify_integrity`].

    pub fn verify_integrity(&self) -> Result<(), FlowError> {
        self.read().verify_integrity()
    }

    fn read(&self) -> RwLockReadGuard<'_, FlowRegistry> {
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FlowRegistry> {
        self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use ledger_core::{PartyId, PartyType, SessionId};

    use crate::record::{Direction, FlowType};

    #[test]
    fn append_and_read_round_trip_through_the_lock() {
        let registry = ConcurrentFlowRegistry::new();
        let input = AppendFlowInput {
            flow_id: FlowId::new("f1"),
            session_id: SessionId::new("s1"),
            party_id: PartyId::new("p1"),
            party_type: PartyType::Platform,
            flow_type: FlowType::RakeRef,
            direction: Direction::In,
            amount: 100,
            injected_timestamp: 10,
            description: None,
            metadata: None,
        };
        registry.append_flow(input).unwrap();
        assert!(registry.get_flow(&FlowId::new("f1")).is_some());
        assert!(registry.verify_integrity().is_ok());
    }
}
