//! Provenance tags for canon findings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used when a finding has no citation
pub const UNVERIFIED: &str = "UNVERIFIED";

/// Where a canon finding came from
///
/// Serialised as the bare citation string, or [`UNVERIFIED`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provenance {
    /// Source citation (URL, document title, notebook reference)
    Cited(String),
    /// Explicitly uncited
    Unverified,
}

impl Provenance {
    /// Create citation tag
    #[inline]
    #[must_use]
    pub fn cited(citation: impl Into<String>) -> Self {
        Self::Cited(citation.into())
    }

    /// Whether the tag carries a real citation
    #[inline]
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Cited(c) if !c.trim().is_empty())
    }

    /// A `Cited` tag with a blank citation counts as missing
    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Cited(c) if c.trim().is_empty())
    }
}

impl From<String> for Provenance {
    fn from(value: String) -> Self {
        if value == UNVERIFIED {
            Self::Unverified
        } else {
            Self::Cited(value)
        }
    }
}

impl From<Provenance> for String {
    fn from(value: Provenance) -> Self {
        match value {
            Provenance::Cited(c) => c,
            Provenance::Unverified => UNVERIFIED.to_string(),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cited(c) => write!(f, "source: {c}"),
            Self::Unverified => f.write_str(UNVERIFIED),
        }
    }
}

/// A canon field value together with its provenance tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sourced<T> {
    /// The finding itself
    pub value: T,
    /// Citation or `UNVERIFIED`
    pub provenance: Provenance,
}

impl<T> Sourced<T> {
    /// Wrap a value with a tag
    #[inline]
    #[must_use]
    pub fn new(value: T, provenance: Provenance) -> Self {
        Self { value, provenance }
    }

    /// Wrap a value with a citation
    #[inline]
    #[must_use]
    pub fn cited(value: T, citation: impl Into<String>) -> Self {
        Self::new(value, Provenance::cited(citation))
    }

    /// Wrap a value as explicitly uncited
    #[inline]
    #[must_use]
    pub fn unverified(value: T) -> Self {
        Self::new(value, Provenance::Unverified)
    }

    /// Re-tag the value as uncited, keeping its content
    #[inline]
    #[must_use]
    pub fn into_unverified(self) -> Self {
        Self::unverified(self.value)
    }
}

impl<T: Default> Default for Sourced<T> {
    fn default() -> Self {
        Self::unverified(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_roundtrips_through_json() {
        let json = serde_json::to_string(&Provenance::Unverified).unwrap();
        assert_eq!(json, "\"UNVERIFIED\"");

        let back: Provenance = serde_json::from_str("\"https://ruff.rs/docs\"").unwrap();
        assert_eq!(back, Provenance::cited("https://ruff.rs/docs"));
    }

    #[test]
    fn blank_citation_is_missing() {
        assert!(Provenance::cited("  ").is_missing());
        assert!(!Provenance::cited("PEP 8").is_missing());
        assert!(!Provenance::Unverified.is_missing());
        assert!(!Provenance::Unverified.is_verified());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Provenance::cited("PEP 8").to_string(), "source: PEP 8");
        assert_eq!(Provenance::Unverified.to_string(), "UNVERIFIED");
    }

    #[test]
    fn into_unverified_keeps_value() {
        let s = Sourced::cited(vec![1, 2], "doc").into_unverified();
        assert_eq!(s.value, vec![1, 2]);
        assert_eq!(s.provenance, Provenance::Unverified);
    }
}
