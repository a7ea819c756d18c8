//! Degrees-of-freedom analysis
//!
//! Sizes the scope boundary to decide how prescriptive the generated skill
//! should be, and which supporting resources it is likely to need.

use serde::{Deserialize, Serialize};
use sf_model::{OutputForm, ScopeCard};

/// Boundary size up to which a scope counts as simple
const LOW_BOUNDARY: usize = 6;

/// Trigger count up to which a scope counts as simple
const LOW_TRIGGERS: usize = 5;

/// Boundary size up to which a scope counts as moderate
const MEDIUM_BOUNDARY: usize = 12;

/// How much latitude the skill leaves its user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreedomLevel {
    /// Fixed, scripted steps
    Low,
    /// Parametric scripts plus references
    Medium,
    /// Framework with worked examples
    High,
}

/// Supporting material the skill is likely to need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedResources {
    /// Number of helper scripts
    pub scripts: usize,
    /// Reference documents to create
    pub references: Vec<String>,
    /// One-line authoring guidance
    pub guidance: String,
}

/// Result of the freedom analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreedomAnalysis {
    /// Latitude level
    pub level: FreedomLevel,
    /// Why this level was chosen
    pub rationale: String,
    /// Suggested supporting material
    pub resources: SuggestedResources,
}

impl FreedomAnalysis {
    /// Analyse an accepted scope card
    #[must_use]
    pub fn analyze(scope: &ScopeCard) -> Self {
        let boundary = scope.boundary_size();
        let level = if boundary <= LOW_BOUNDARY && scope.triggers.len() <= LOW_TRIGGERS {
            FreedomLevel::Low
        } else if boundary <= MEDIUM_BOUNDARY {
            FreedomLevel::Medium
        } else {
            FreedomLevel::High
        };

        let (rationale, guidance) = match level {
            FreedomLevel::Low => (
                "simple, well-defined scope; use scripts with fixed steps",
                "keep the workflow linear and script every step",
            ),
            FreedomLevel::Medium => (
                "moderate complexity; use parametric scripts plus references",
                "parameterise the scripts and move detail into reference files",
            ),
            FreedomLevel::High => (
                "complex, context-dependent scope; use a framework plus examples",
                "describe the decision framework and back it with worked examples",
            ),
        };

        let mut references = Vec::new();
        if scope.output_form == OutputForm::Template {
            references.push("templates.md".to_string());
        }
        if !scope.must_not_cover.is_empty() {
            references.push("edge_cases.md".to_string());
        }
        references.push("failure_modes.md".to_string());

        Self {
            level,
            rationale: format!("{rationale} ({boundary} boundary items)"),
            resources: SuggestedResources {
                scripts: usize::from(level == FreedomLevel::Low),
                references,
                guidance: guidance.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_test_utils::healthy_scope;

    #[test]
    fn minimal_scope_is_low_freedom() {
        let analysis = FreedomAnalysis::analyze(&healthy_scope());
        assert_eq!(analysis.level, FreedomLevel::Low);
        assert_eq!(analysis.resources.scripts, 1);
        assert_eq!(
            analysis.resources.references,
            vec!["edge_cases.md".to_string(), "failure_modes.md".to_string()]
        );
    }

    #[test]
    fn extra_triggers_raise_level() {
        let mut scope = healthy_scope();
        scope.triggers.push("tidy python".to_string());
        assert_eq!(FreedomAnalysis::analyze(&scope).level, FreedomLevel::Medium);
    }

    #[test]
    fn wide_boundary_is_high_freedom() {
        let scope = healthy_scope()
            .with_must_cover((0..7).map(|i| format!("case {i}")))
            .with_must_not_cover((0..7).map(|i| format!("excluded {i}")));
        let analysis = FreedomAnalysis::analyze(&scope);
        assert_eq!(analysis.level, FreedomLevel::High);
        assert_eq!(analysis.resources.scripts, 0);
    }
}
