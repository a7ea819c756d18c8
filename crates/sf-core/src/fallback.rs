//! Offline canon synthesis
//!
//! Used when the knowledge service fails or times out. Everything produced
//! here is derived from the scope card alone, so every field is tagged
//! `UNVERIFIED` and the extract is marked as fallback-sourced.

use sf_model::{
    CanonExtract, CanonOrigin, DecisionPoint, FailureMode, Provenance, ScopeCard, SourceRef,
    Template,
};

/// Generic failures every procedure is exposed to: (symptom, root cause, fix)
const GENERIC_FAILURES: [(&str, &str, &str); 5] = [
    (
        "Expected behavior not achieved",
        "Prerequisites or inputs are missing or wrong",
        "Verify prerequisites and inputs",
    ),
    (
        "Output format unexpected",
        "The output specification was not followed",
        "Check the output specification",
    ),
    (
        "Process fails silently",
        "Errors are swallowed without being logged",
        "Enable verbose logging for debugging",
    ),
    (
        "Performance issues",
        "Configuration does not fit the input size",
        "Optimize configuration or split large inputs",
    ),
    (
        "Integration errors",
        "A dependent system changed or is incompatible",
        "Verify compatibility with dependent systems",
    ),
];

/// Edge cases that apply to any procedure
const GENERIC_EDGE_CASES: [&str; 2] = [
    "Empty or malformed inputs",
    "Boundary conditions and limits",
];

/// Synthesises a canon extract from the scope card
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineKnowledge;

impl OfflineKnowledge {
    /// Create new offline generator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build an all-`UNVERIFIED` extract for `scope`
    #[must_use]
    pub fn generate(&self, scope: &ScopeCard) -> CanonExtract {
        let covered: Vec<&str> = scope.must_cover.iter().map(|s| s.trim()).collect();
        let applied = if covered.is_empty() {
            "your use case".to_string()
        } else {
            covered.iter().take(2).copied().collect::<Vec<_>>().join(", ")
        };

        let quickstart = [
            format!("Understand {}", scope.goal.trim()),
            format!("Apply to: {applied}"),
            "Validate results".to_string(),
        ];

        let decision_points = covered
            .iter()
            .take(5)
            .map(|item| {
                DecisionPoint::new(
                    format!("{item} applies to your case"),
                    format!("apply the {item} guidance"),
                )
            })
            .collect();

        let templates = covered
            .iter()
            .take(3)
            .map(|item| {
                Template::new(
                    format!("Template for {item}"),
                    format!("[Example implementation for {item}]"),
                )
            })
            .collect();

        let failure_modes = GENERIC_FAILURES
            .iter()
            .map(|(symptom, cause, fix)| FailureMode::new(*symptom, *cause, *fix))
            .collect();

        let edge_cases = GENERIC_EDGE_CASES
            .iter()
            .map(|s| (*s).to_string())
            .chain(
                scope
                    .must_not_cover
                    .iter()
                    .take(2)
                    .map(|item| {
                        format!("Requests that need {} (explicitly excluded)", item.trim())
                    }),
            )
            .collect::<Vec<_>>();

        CanonExtract::empty(CanonOrigin::OfflineFallback)
            .with_quickstart(quickstart, Provenance::Unverified)
            .with_decision_points(decision_points, Provenance::Unverified)
            .with_templates(templates, Provenance::Unverified)
            .with_failure_modes(failure_modes, Provenance::Unverified)
            .with_edge_cases(edge_cases, Provenance::Unverified)
            .with_sources(vec![
                SourceRef {
                    title: "Best Practices".to_string(),
                    url: None,
                },
                SourceRef {
                    title: "Common Patterns".to_string(),
                    url: None,
                },
            ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_test_utils::healthy_scope;

    #[test]
    fn fallback_is_fully_unverified() {
        let canon = OfflineKnowledge::new().generate(&healthy_scope());
        assert!(canon.is_fallback());
        assert!(canon.is_fully_unverified());
        assert!(canon.validate().is_ok());
    }

    #[test]
    fn fallback_meets_content_minimums() {
        let canon = OfflineKnowledge::new().generate(&healthy_scope());
        assert_eq!(canon.quickstart_steps.value.len(), 3);
        assert_eq!(
            canon.quickstart_steps.value[1],
            "Apply to: style violations, unused imports"
        );
        assert_eq!(canon.templates.value.len(), 3);
        assert_eq!(canon.failure_modes.value.len(), 5);
        assert_eq!(canon.edge_cases.value.len(), 4);
    }
}
