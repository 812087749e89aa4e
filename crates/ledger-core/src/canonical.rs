// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical serialization and the `simple_hash` determinism witness.
//!
//! Every checksum in the ledger stack is computed the same way: build a
//! [`CanonicalValue`] tree for the record, render it with [`to_canonical_string`],
//! and hash the rendered string with [`simple_hash`]. This mirrors the source
//! system's recursive JSON-like stringifier (sorted object keys, arrays in
//! order, primitives stringified canonically) byte-for-byte, because the
//! checksum is a *determinism witness*, not a tamper defence — reimplementing
//! it any other way would silently change every checksum it produces.
//!
//! # String escaping (observed quirk, preserved intentionally)
//!
//! The source does not escape embedded quotes inside string values — a label
//! containing `"` is rendered verbatim inside its surrounding quotes. This is
//! a known source-level limitation (see `spec.md` §9, Open Questions): two
//! distinct records can in principle render to the same canonical string if a
//! label's content is crafted adversarially. We replicate it exactly rather
//! than silently "fixing" it, because fixing it would make checksums
//! incompatible with the reference behavior this crate exists to reproduce.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Genesis previous-checksum value: the `previousChecksum` of the first
/// record appended to any hash-chained registry.
pub const GENESIS_HASH: &str = "00000000";

/// A canonical, order-preserving value tree used purely for checksum
/// computation (never for wire transport — there is no wire format here).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CanonicalValue {
    /// Absent/optional value.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer value, rendered via its canonical decimal representation.
    ///
    /// `i128` is wide enough to carry every signed or unsigned integer field
    /// in the ledger's data model (`u64` amounts, `u16` basis points, signed
    /// net references) without precision loss.
    Integer(i128),
    /// String value, rendered unescaped between double quotes.
    String(String),
    /// Ordered list of values.
    Array(Vec<CanonicalValue>),
    /// Key-sorted mapping. `BTreeMap<String, _>` already iterates in
    /// ascending byte order for ASCII keys, which is exactly the ordering
    /// the canonical form requires.
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    /// Builds an object from an iterator of `(key, value)` pairs.
    pub fn object<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, CanonicalValue)>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in fields {
            map.insert(key.to_string(), value);
        }
        Self::Object(map)
    }

    /// Builds an array from an iterator of values.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = CanonicalValue>,
    {
        Self::Array(items.into_iter().collect())
    }
}

/// Implemented by every type that contributes to a checksum.
pub trait CanonicalEncode {
    /// Renders `self` into the canonical value tree.
    fn to_canonical(&self) -> CanonicalValue;
}

impl CanonicalEncode for CanonicalValue {
    fn to_canonical(&self) -> CanonicalValue {
        self.clone()
    }
}

impl CanonicalEncode for bool {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::Bool(*self)
    }
}

impl CanonicalEncode for str {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.to_string())
    }
}

impl CanonicalEncode for String {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::String(self.clone())
    }
}

macro_rules! impl_canonical_int {
    ($($t:ty),+) => {
        $(
            impl CanonicalEncode for $t {
                fn to_canonical(&self) -> CanonicalValue {
                    CanonicalValue::Integer(i128::from(*self))
                }
            }
        )+
    };
}

impl_canonical_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl<T: CanonicalEncode> CanonicalEncode for Option<T> {
    fn to_canonical(&self) -> CanonicalValue {
        match self {
            Some(inner) => inner.to_canonical(),
            None => CanonicalValue::Null,
        }
    }
}

impl<T: CanonicalEncode> CanonicalEncode for [T] {
    fn to_canonical(&self) -> CanonicalValue {
        CanonicalValue::Array(self.iter().map(CanonicalEncode::to_canonical).collect())
    }
}

impl<T: CanonicalEncode> CanonicalEncode for Vec<T> {
    fn to_canonical(&self) -> CanonicalValue {
        self.as_slice().to_canonical()
    }
}

/// Renders a [`CanonicalValue`] into its canonical string form.
///
/// Encoding rules (preserved exactly from the source stringifier):
/// - `null`/absent encodes as the literal `null`.
/// - strings encode as `"<text>"` with **no escaping**.
/// - integers encode via their canonical decimal representation.
/// - booleans encode as `true`/`false`.
/// - arrays encode as `[item,item]`.
/// - objects encode as `{"k":v,...}` with ASCII-sorted keys.
#[must_use]
pub fn to_canonical_string(value: &CanonicalValue) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &CanonicalValue, out: &mut String) {
    match value {
        CanonicalValue::Null => out.push_str("null"),
        CanonicalValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        CanonicalValue::Integer(n) => {
            let _ = write!(out, "{n}");
        }
        CanonicalValue::String(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        CanonicalValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        CanonicalValue::Object(fields) => {
            out.push('{');
            for (i, (key, val)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('"');
                out.push_str(key);
                out.push_str("\":");
                write_canonical(val, out);
            }
            out.push('}');
        }
    }
}

/// The 32-bit determinism witness hash.
///
/// `hash = 0; for codepoint in s.chars(): hash = ((hash << 5) - hash +
/// codepoint) mod 2^32`. Not cryptographic — collisions are expected to be
/// findable; its only job is to catch non-replayable computations.
#[must_use]
pub fn simple_hash(s: &str) -> u32 {
    let mut hash: u32 = 0;
    for ch in s.chars() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(ch as u32);
    }
    hash
}

/// Computes a tagged, zero-padded checksum for an encodable value.
///
/// `tag` is a short module prefix (e.g. `"rview_"`, `"snap_"`, `"attr_"`) and
/// may be empty. The result is always `tag` followed by exactly 8 lowercase
/// hex digits.
#[must_use]
pub fn checksum(tag: &str, value: &dyn CanonicalEncode) -> String {
    let rendered = to_canonical_string(&value.to_canonical());
    let hash = simple_hash(&rendered);
    format!("{tag}{hash:08x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── 1. primitive rendering ───────────────────────────────────────────

    #[test]
    fn renders_null_bool_integer_string() {
        assert_eq!(to_canonical_string(&CanonicalValue::Null), "null");
        assert_eq!(to_canonical_string(&CanonicalValue::Bool(true)), "true");
        assert_eq!(to_canonical_string(&CanonicalValue::Bool(false)), "false");
        assert_eq!(to_canonical_string(&CanonicalValue::Integer(42)), "42");
        assert_eq!(to_canonical_string(&CanonicalValue::Integer(-7)), "-7");
        assert_eq!(
            to_canonical_string(&CanonicalValue::String("hi".to_string())),
            "\"hi\""
        );
    }

    // ── 2. arrays preserve order ──────────────────────────────────────────

    #[test]
    fn renders_arrays_in_order() {
        let value = CanonicalValue::array([
            CanonicalValue::Integer(3),
            CanonicalValue::Integer(1),
            CanonicalValue::Integer(2),
        ]);
        assert_eq!(to_canonical_string(&value), "[3,1,2]");
    }

    // ── 3. objects sort keys ascending regardless of insertion order ────

    #[test]
    fn renders_objects_with_sorted_keys() {
        let value = CanonicalValue::object([
            ("zeta", CanonicalValue::Integer(1)),
            ("alpha", CanonicalValue::Integer(2)),
            ("mid", CanonicalValue::Bool(true)),
        ]);
        assert_eq!(to_canonical_string(&value), "{\"alpha\":2,\"mid\":true,\"zeta\":1}");
    }

    // ── 4. no escaping of embedded quotes (documented quirk) ─────────────

    #[test]
    fn does_not_escape_embedded_quotes() {
        let value = CanonicalValue::String("say \"hi\"".to_string());
        assert_eq!(to_canonical_string(&value), "\"say \"hi\"\"");
    }

    // ── 5. simple_hash is deterministic and matches the reference formula ─

    #[test]
    fn simple_hash_matches_reference_formula() {
        let mut expected: u32 = 0;
        for ch in "abc".chars() {
            expected = expected.wrapping_shl(5).wrapping_sub(expected).wrapping_add(ch as u32);
        }
        assert_eq!(simple_hash("abc"), expected);
        assert_eq!(simple_hash("abc"), simple_hash("abc"));
    }

    #[test]
    fn simple_hash_of_empty_string_is_zero() {
        assert_eq!(simple_hash(""), 0);
    }

    // ── 6. checksum formatting: tag + 8 lowercase hex digits ─────────────

    #[test]
    fn checksum_is_tag_plus_eight_hex_digits() {
        let value = CanonicalValue::Integer(0);
        let cs = checksum("snap_", &value);
        assert!(cs.starts_with("snap_"));
        let hex_part = &cs["snap_".len()..];
        assert_eq!(hex_part.len(), 8);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn checksum_without_tag_is_bare_hex() {
        let value = CanonicalValue::Integer(7);
        let cs = checksum("", &value);
        assert_eq!(cs.len(), 8);
    }

    // ── 7. determinism across repeated calls ─────────────────────────────

    #[test]
    fn checksum_is_deterministic() {
        let value = CanonicalValue::object([
            ("amount", CanonicalValue::Integer(100)),
            ("flag", CanonicalValue::Bool(false)),
        ]);
        let a = checksum("attr_", &value);
        let b = checksum("attr_", &value);
        assert_eq!(a, b);
    }

    #[test]
    fn genesis_hash_is_eight_zero_digits() {
        assert_eq!(GENESIS_HASH, "00000000");
        assert_eq!(GENESIS_HASH.len(), 8);
    }
}
