//! Error types for SkillForge Core
//!
//! Provides error handling for:
//! - Invalid input records
//! - Illegal stage transitions
//! - Incomplete interviews
//! - Knowledge-service failures (always recovered by the offline fallback)
//! - Collaborator, persistence and configuration failures

use crate::interview::InterviewQuestion;
use crate::stage::Stage;
use sf_model::InputValidationError;
use std::path::PathBuf;

/// Main orchestrator error type
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// An input record violated an invariant
    #[error(transparent)]
    InvalidInput(#[from] InputValidationError),

    /// The pipeline was driven out of order
    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    /// Interview answers are missing; the run stays suspended
    #[error("interview incomplete: missing {}", format_questions(.missing))]
    InterviewIncomplete {
        /// Unanswered questions
        missing: Vec<InterviewQuestion>,
    },

    /// A caller-supplied collaborator failed
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        /// Which collaborator
        collaborator: &'static str,
        /// Rendered cause chain
        message: String,
    },

    /// Persisting artifacts failed
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ForgeError {
    /// Wrap a collaborator failure, keeping the whole cause chain
    #[must_use]
    pub fn collaborator(collaborator: &'static str, error: &anyhow::Error) -> Self {
        Self::Collaborator {
            collaborator,
            message: format!("{error:#}"),
        }
    }

    /// Whether retrying the same call may succeed
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InterviewIncomplete { .. } | Self::Collaborator { .. } | Self::Sink(_)
        )
    }

    /// Whether the caller must change its input before retrying
    #[inline]
    #[must_use]
    pub fn requires_caller(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::InterviewIncomplete { .. } | Self::Config(_)
        )
    }
}

fn format_questions(questions: &[InterviewQuestion]) -> String {
    questions
        .iter()
        .map(InterviewQuestion::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stage machine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// Transition not in the allowed table
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition {
        /// Current stage
        from: Stage,
        /// Requested stage
        to: Stage,
    },

    /// Operation called in the wrong stage
    #[error("expected stage {expected}, pipeline is at {actual}")]
    WrongStage {
        /// Stage the operation needs
        expected: Stage,
        /// Stage the pipeline is at
        actual: Stage,
    },
}

/// Knowledge-service failures
///
/// Never surfaced to callers: every variant triggers the offline fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceFailure {
    /// No answer within the configured bound
    #[error("knowledge service timed out after {after_ms}ms")]
    Timeout {
        /// Bound that elapsed
        after_ms: u64,
    },

    /// Connection could not be established
    #[error("knowledge service unreachable: {0}")]
    Unreachable(String),

    /// Credentials rejected
    #[error("knowledge service rejected credentials: {0}")]
    AuthFailure(String),

    /// Response did not decode into a valid canon extract
    #[error("knowledge service returned malformed canon: {0}")]
    Malformed(String),
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding failed
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SinkError {
    /// Create I/O error
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_model::InputRecord;

    #[test]
    fn classification_helpers() {
        let invalid = ForgeError::from(InputValidationError::new(
            InputRecord::ScopeCard,
            "goal",
            "too short",
        ));
        assert!(invalid.requires_caller());
        assert!(!invalid.is_recoverable());
        assert_eq!(invalid.to_string(), "invalid scope_card.goal: too short");

        let missing = ForgeError::InterviewIncomplete {
            missing: vec![InterviewQuestion::Priority, InterviewQuestion::Failures],
        };
        assert!(missing.is_recoverable());
        assert_eq!(
            missing.to_string(),
            "interview incomplete: missing priority, failures"
        );
    }

    #[test]
    fn collaborator_keeps_cause_chain() {
        let err = anyhow::anyhow!("disk full").context("writing scope");
        let forge = ForgeError::collaborator("scope source", &err);
        assert_eq!(forge.to_string(), "scope source failed: writing scope: disk full");
    }
}
