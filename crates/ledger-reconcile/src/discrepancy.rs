// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Discrepancies: findings emitted by reconciliation, never hard errors.

use std::collections::BTreeMap;

use ledger_core::canonical::{CanonicalEncode, CanonicalValue};
use ledger_core::FlowId;

/// The kind of discrepancy detected during reconciliation.
///
/// `NonIntegerValue` and `DuplicateReference` are carried for vocabulary
/// parity with the source system; `u64` amounts and the registry's
/// per-`flowId` effective-record map make both structurally unreachable in
/// this implementation (see `DESIGN.md`).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum DiscrepancyKind {
    /// An amount field was not representable as an integer.
    NonIntegerValue,
    /// A flow record was not yet confirmed.
    StatusInconsistency,
    /// The same `flowId` appeared twice among effective records.
    DuplicateReference,
}

impl DiscrepancyKind {
    /// Stable label used in canonical serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonIntegerValue => "NON_INTEGER_VALUE",
            Self::StatusInconsistency => "STATUS_INCONSISTENCY",
            Self::DuplicateReference => "DUPLICATE_REFERENCE",
        }
    }
}

impl CanonicalEncode for DiscrepancyKind {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// Severity of a discrepancy finding.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    /// Informational; no action implied.
    Info,
    /// Worth a human's attention.
    Warning,
    /// A correctness problem in the reconciled data.
    Error,
    /// A severe correctness problem; drives `IMBALANCED` status.
    Critical,
}

impl Severity {
    /// Stable label used in canonical serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Whether this severity is at least `ERROR`.
    #[must_use]
    pub const fn is_at_least_error(self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }
}

impl CanonicalEncode for Severity {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.as_str().to_string())
    }
}

/// A reconciliation finding. Never fatal: it travels in the result.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Discrepancy {
    /// The kind of finding.
    pub kind: DiscrepancyKind,
    /// Severity of the finding.
    pub severity: Severity,
    /// Human-readable explanation.
    pub message: String,
    /// Flow identifiers this finding concerns.
    pub affected_flow_ids: Vec<FlowId>,
    /// Expected value, if applicable.
    pub expected: Option<String>,
    /// Actual value, if applicable.
    pub actual: Option<String>,
    /// Structured detail fields, if applicable.
    pub details: Option<BTreeMap<String, String>>,
}

impl CanonicalEncode for Discrepancy {
    fn to_canonical(&self) -> CanonicalValue {
        let details = self.details.as_ref().map_or(CanonicalValue::Null, |map| {
            let fields: BTreeMap<String, CanonicalValue> =
                map.iter().map(|(k, v)| (k.clone(), CanonicalValue::String(v.clone()))).collect();
            CanonicalValue::Object(fields)
        });
        CanonicalValue::object([
            ("type", self.kind.to_canonical()),
            ("severity", self.severity.to_canonical()),
            ("message", self.message.to_canonical()),
            (
                "affectedFlowIds",
                CanonicalValue::array(self.affected_flow_ids.iter().map(|id| id.as_str().to_canonical())),
            ),
            ("expected", self.expected.to_canonical()),
            ("actual", self.actual.to_canonical()),
            ("details", details),
        ])
    }
}
