//! Input validation errors
//!
//! Raised before any merge work starts when a [`ScopeCard`](crate::ScopeCard),
//! [`CanonExtract`](crate::CanonExtract) or [`LocalOverlay`](crate::LocalOverlay)
//! violates one of its invariants. The error always names the offending field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRecord {
    /// Accepted problem boundary
    ScopeCard,
    /// Externally sourced findings
    CanonExtract,
    /// Local constraints
    LocalOverlay,
}

impl InputRecord {
    /// Stable snake_case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScopeCard => "scope_card",
            Self::CanonExtract => "canon_extract",
            Self::LocalOverlay => "local_overlay",
        }
    }
}

impl fmt::Display for InputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input invariant was violated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {record}.{field}: {reason}")]
pub struct InputValidationError {
    /// Record holding the bad field
    pub record: InputRecord,
    /// Field name
    pub field: &'static str,
    /// What is wrong with it
    pub reason: String,
}

impl InputValidationError {
    /// Create new validation error
    #[inline]
    #[must_use]
    pub fn new(record: InputRecord, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            record,
            field,
            reason: reason.into(),
        }
    }

    /// Error on a scope card field
    #[inline]
    #[must_use]
    pub fn scope(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(InputRecord::ScopeCard, field, reason)
    }

    /// Error on a canon extract field
    #[inline]
    #[must_use]
    pub fn canon(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(InputRecord::CanonExtract, field, reason)
    }

    /// Error on a local overlay field
    #[inline]
    #[must_use]
    pub fn overlay(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(InputRecord::LocalOverlay, field, reason)
    }

    /// Dotted path of the offending field, e.g. `scope_card.triggers`
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}.{}", self.record, self.field)
    }
}
