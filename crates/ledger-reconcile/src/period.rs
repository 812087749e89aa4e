// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reconciliation periods.

use ledger_core::PeriodId;

use crate::error::ReconcileError;

/// A half-open-by-value time window to reconcile (`start_ts < end_ts`,
/// filtering is inclusive on both ends — see [`crate::engine::reconcile_period`]).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Period {
    /// Identifier for this period.
    pub period_id: PeriodId,
    /// Inclusive start instant.
    pub start_ts: u64,
    /// Inclusive end instant.
    pub end_ts: u64,
    /// Optional human-readable label.
    pub label: Option<String>,
}

impl Period {
    /// Builds a period, validating `start_ts < end_ts` and that both are
    /// strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidPeriod`] if the bounds are not
    /// strictly increasing positive integers.
    pub fn new(period_id: PeriodId, start_ts: u64, end_ts: u64, label: Option<String>) -> Result<Self, ReconcileError> {
        if start_ts == 0 || end_ts == 0 || start_ts >= end_ts {
            return Err(ReconcileError::InvalidPeriod { start_ts, end_ts });
        }
        Ok(Self { period_id, start_ts, end_ts, label })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_increasing_bounds() {
        assert!(Period::new(PeriodId::new("p1"), 10, 10, None).is_err());
        assert!(Period::new(PeriodId::new("p1"), 20, 10, None).is_err());
    }

    #[test]
    fn rejects_zero_bounds() {
        assert!(Period::new(PeriodId::new("p1"), 0, 10, None).is_err());
    }

    #[test]
    fn accepts_increasing_positive_bounds() {
        assert!(Period::new(PeriodId::new("p1"), 10, 20, None).is_ok());
    }
}
