//! Orchestrator stage machine

use crate::error::StageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Waiting for an accepted scope card
    Scope,
    /// Scope accepted; degrees of freedom analysed
    FreedomAnalysis,
    /// Querying the knowledge service
    ExternalCanon,
    /// Service failed or timed out; canon synthesised locally
    OfflineFallback,
    /// Canon fields copied into the contract
    ContractExtraction,
    /// Suspended until interview answers arrive
    LocalOverlay,
    /// Merging inputs into a document
    Compile,
    /// Gates evaluated; terminal
    Validate,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 8] = [
        Self::Scope,
        Self::FreedomAnalysis,
        Self::ExternalCanon,
        Self::OfflineFallback,
        Self::ContractExtraction,
        Self::LocalOverlay,
        Self::Compile,
        Self::Validate,
    ];

    /// Stable snake_case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::FreedomAnalysis => "freedom_analysis",
            Self::ExternalCanon => "external_canon",
            Self::OfflineFallback => "offline_fallback",
            Self::ContractExtraction => "contract_extraction",
            Self::LocalOverlay => "local_overlay",
            Self::Compile => "compile",
            Self::Validate => "validate",
        }
    }

    /// Whether no transition leaves this stage
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        allowed_transitions(*self).is_empty()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a stage transition
///
/// # Errors
/// Returns [`StageError::IllegalTransition`] when `to` is not reachable from `from`.
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), StageError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StageError::IllegalTransition { from, to })
    }
}

/// Stages reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: Stage) -> Vec<Stage> {
    use Stage::*;
    match from {
        Scope => vec![FreedomAnalysis],
        FreedomAnalysis => vec![ExternalCanon],
        ExternalCanon => vec![ContractExtraction, OfflineFallback],
        OfflineFallback => vec![ContractExtraction],
        ContractExtraction => vec![LocalOverlay],
        LocalOverlay => vec![Compile],
        Compile => vec![Validate],
        Validate => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        let path = [
            Stage::Scope,
            Stage::FreedomAnalysis,
            Stage::ExternalCanon,
            Stage::ContractExtraction,
            Stage::LocalOverlay,
            Stage::Compile,
            Stage::Validate,
        ];
        for pair in path.windows(2) {
            assert!(validate_transition(pair[0], pair[1]).is_ok());
        }
        assert!(Stage::Validate.is_terminal());
    }

    #[test]
    fn skipping_stages_is_illegal() {
        let err = validate_transition(Stage::Scope, Stage::Compile).unwrap_err();
        assert_eq!(err.to_string(), "illegal transition scope -> compile");
        assert!(validate_transition(Stage::FreedomAnalysis, Stage::OfflineFallback).is_err());
    }
}
