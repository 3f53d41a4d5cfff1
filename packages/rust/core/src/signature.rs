//! Filter signatures.
//!
//! A [`Signature`] is the comparable token for an item's optional filter.
//! Equality is purely syntactic: two filters match iff their canonical forms
//! are identical, and an absent filter only matches another absent filter.

use std::fmt;

use sha2::{Digest, Sha256};

use dashtree_shared::Filter;

/// Comparable token derived from an optional [`Filter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    /// The item carries no filter.
    Absent,
    /// Canonical form of the item's filter.
    Canonical(String),
}

impl Signature {
    /// Short SHA-256 hex prefix of the canonical form, for logs.
    pub fn fingerprint(&self) -> String {
        match self {
            Self::Absent => "none".to_string(),
            Self::Canonical(form) => {
                let digest = Sha256::digest(form.as_bytes());
                format!("{digest:x}")[..12].to_string()
            }
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("<no filter>"),
            Self::Canonical(form) => f.write_str(form),
        }
    }
}

/// Compute the signature of an optional filter.
pub fn signature(filter: Option<&Filter>) -> Signature {
    match filter {
        Some(filter) => Signature::Canonical(filter.canonical()),
        None => Signature::Absent,
    }
}

/// Whether two signatures denote the same filter.
pub fn equal(a: &Signature, b: &Signature) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_filter_is_equal() {
        let f = Filter::from("wave == 1");
        assert!(equal(&signature(Some(&f)), &signature(Some(&f))));
    }

    #[test]
    fn absent_only_matches_absent() {
        let f = Filter::from("");
        assert!(equal(&signature(None), &signature(None)));
        assert!(!equal(&signature(None), &signature(Some(&f))));
    }

    #[test]
    fn equivalent_but_different_syntax_is_not_equal() {
        let a = Filter::from("wave == 1");
        let b = Filter::from("1 == wave");
        assert!(!equal(&signature(Some(&a)), &signature(Some(&b))));
    }

    #[test]
    fn structured_key_order_is_irrelevant() {
        let a = Filter::Structured(json!({"a": 1, "b": [1, 2]}));
        let b = Filter::Structured(json!({"b": [1, 2], "a": 1}));
        assert!(equal(&signature(Some(&a)), &signature(Some(&b))));
    }

    #[test]
    fn fingerprint_is_short_and_stable() {
        let f = Filter::from("w1");
        let fp = signature(Some(&f)).fingerprint();
        assert_eq!(fp.len(), 12);
        assert_eq!(fp, signature(Some(&f)).fingerprint());
        assert_eq!(signature(None).fingerprint(), "none");
    }
}
