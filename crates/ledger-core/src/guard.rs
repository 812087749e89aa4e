// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Out-of-domain term hygiene.
//!
//! The ledger stack models settlement *references*, not money movement: it
//! never touches a payment rail, a wallet, or a chain. [`assert_no_forbidden_concepts`]
//! is a cheap text guard callers can run over free-text fields (labels,
//! external reference strings) to catch drift toward those concepts before
//! it reaches a checksum.

use std::fmt;

/// Default out-of-domain terms, checked case-insensitively as substrings.
pub const DEFAULT_FORBIDDEN_TERMS: &[&str] = &[
    "payment",
    "wallet",
    "crypto",
    "blockchain",
    "usdt",
    "transfer",
    "deposit",
    "withdraw",
    "balance",
    "credit",
    "debit",
    "transaction",
];

/// Additional terms forbidden specifically in the audit correlator's
/// free-text fields, on top of [`DEFAULT_FORBIDDEN_TERMS`].
pub const AUDIT_FORBIDDEN_TERMS: &[&str] = &["settle", "payout"];

/// A free-text field contained an out-of-domain term.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ForbiddenConceptError {
    /// The field name the text came from.
    pub field: String,
    /// The forbidden term that matched.
    pub term: String,
}

impl fmt::Display for ForbiddenConceptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' contains forbidden term '{}'", self.field, self.term)
    }
}

impl std::error::Error for ForbiddenConceptError {}

/// Checks `text` against `terms` case-insensitively, as substrings.
///
/// # Errors
///
/// Returns [`ForbiddenConceptError`] naming the first matching term, in
/// `terms` order.
pub fn assert_no_forbidden_concepts(
    field: &str,
    text: &str,
    terms: &[&str],
) -> Result<(), ForbiddenConceptError> {
    let lowered = text.to_lowercase();
    for term in terms {
        if lowered.contains(&term.to_lowercase()) {
            return Err(ForbiddenConceptError {
                field: field.to_string(),
                term: (*term).to_string(),
            });
        }
    }
    Ok(())
}

/// Convenience wrapper checking `text` against [`DEFAULT_FORBIDDEN_TERMS`].
///
/// # Errors
///
/// See [`assert_no_forbidden_concepts`].
pub fn assert_no_default_forbidden_concepts(
    field: &str,
    text: &str,
) -> Result<(), ForbiddenConceptError> {
    assert_no_forbidden_concepts(field, text, DEFAULT_FORBIDDEN_TERMS)
}

/// Convenience wrapper checking `text` against [`DEFAULT_FORBIDDEN_TERMS`]
/// plus [`AUDIT_FORBIDDEN_TERMS`], for the audit correlator's fields.
///
/// # Errors
///
/// See [`assert_no_forbidden_concepts`].
pub fn assert_no_audit_forbidden_concepts(
    field: &str,
    text: &str,
) -> Result<(), ForbiddenConceptError> {
    let combined: Vec<&str> = DEFAULT_FORBIDDEN_TERMS
        .iter()
        .copied()
        .chain(AUDIT_FORBIDDEN_TERMS.iter().copied())
        .collect();
    assert_no_forbidden_concepts(field, text, &combined)
}
