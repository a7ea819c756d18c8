//! Canon extract: externally sourced best-practice findings
//!
//! Produced either by a knowledge-service backend or by the offline fallback
//! generator. Every field is wrapped in [`Sourced`] so the absence of a
//! citation is always explicit.

use crate::error::InputValidationError;
use crate::provenance::{Provenance, Sourced};
use serde::{Deserialize, Serialize};

/// Expected number of quickstart steps
pub const QUICKSTART_STEPS: usize = 3;

/// A condition → action pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPoint {
    /// When this branch applies
    pub condition: String,
    /// What to do
    pub action: String,
}

impl DecisionPoint {
    /// Create new decision point
    #[inline]
    #[must_use]
    pub fn new(condition: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            action: action.into(),
        }
    }
}

/// Named reusable snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Display name
    pub name: String,
    /// Snippet body, rendered verbatim inside a code fence
    pub body: String,
}

impl Template {
    /// Create new template
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// Failure-mode risk class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    /// Ordinary failure
    #[default]
    Standard,
    /// Brittle failure that needs a scripted, deterministic response
    High,
}

/// Known failure with diagnosis and fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMode {
    /// What the user observes
    pub symptom: String,
    /// Why it happens
    pub root_cause: String,
    /// How to fix it
    pub fix: String,
    /// Risk class
    #[serde(default)]
    pub risk: Risk,
}

impl FailureMode {
    /// Create standard-risk failure mode
    #[inline]
    #[must_use]
    pub fn new(
        symptom: impl Into<String>,
        root_cause: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            symptom: symptom.into(),
            root_cause: root_cause.into(),
            fix: fix.into(),
            risk: Risk::Standard,
        }
    }

    /// Mark as high risk
    #[inline]
    #[must_use]
    pub fn high_risk(mut self) -> Self {
        self.risk = Risk::High;
        self
    }

    /// Whether symptom, root cause and fix are all present
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.symptom.trim().is_empty()
            && !self.root_cause.trim().is_empty()
            && !self.fix.trim().is_empty()
    }
}

/// Reference material consulted by the knowledge service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Title of the source
    pub title: String,
    /// Location, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// How a canon extract was produced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonOrigin {
    /// Returned by a knowledge-service backend
    Service {
        /// Backend identifier
        backend: String,
    },
    /// Synthesised locally because the service was unavailable
    OfflineFallback,
}

impl CanonOrigin {
    /// Origin for a named backend
    #[inline]
    #[must_use]
    pub fn service(backend: impl Into<String>) -> Self {
        Self::Service {
            backend: backend.into(),
        }
    }
}

/// Externally sourced best-practice findings for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonExtract {
    /// Ordered quickstart steps (three expected)
    pub quickstart_steps: Sourced<Vec<String>>,
    /// Condition → action pairs
    pub decision_points: Sourced<Vec<DecisionPoint>>,
    /// Reusable snippets
    pub templates: Sourced<Vec<Template>>,
    /// Known failures
    pub failure_modes: Sourced<Vec<FailureMode>>,
    /// Free-text edge cases
    pub edge_cases: Sourced<Vec<String>>,
    /// Tools the canon recommends by default
    #[serde(default)]
    pub recommended_tools: Sourced<Vec<String>>,
    /// Output format the canon recommends by default
    #[serde(default)]
    pub output_format: Sourced<Option<String>>,
    /// Material consulted
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    /// How this extract was produced
    pub origin: CanonOrigin,
}

impl CanonExtract {
    /// Create extract with every field empty and uncited
    #[must_use]
    pub fn empty(origin: CanonOrigin) -> Self {
        Self {
            quickstart_steps: Sourced::default(),
            decision_points: Sourced::default(),
            templates: Sourced::default(),
            failure_modes: Sourced::default(),
            edge_cases: Sourced::default(),
            recommended_tools: Sourced::default(),
            output_format: Sourced::default(),
            sources: Vec::new(),
            origin,
        }
    }

    /// With quickstart steps
    #[must_use]
    pub fn with_quickstart<I, S>(mut self, steps: I, provenance: Provenance) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quickstart_steps = Sourced::new(steps.into_iter().map(Into::into).collect(), provenance);
        self
    }

    /// With decision points
    #[must_use]
    pub fn with_decision_points(mut self, points: Vec<DecisionPoint>, provenance: Provenance) -> Self {
        self.decision_points = Sourced::new(points, provenance);
        self
    }

    /// With templates
    #[must_use]
    pub fn with_templates(mut self, templates: Vec<Template>, provenance: Provenance) -> Self {
        self.templates = Sourced::new(templates, provenance);
        self
    }

    /// With failure modes
    #[must_use]
    pub fn with_failure_modes(mut self, modes: Vec<FailureMode>, provenance: Provenance) -> Self {
        self.failure_modes = Sourced::new(modes, provenance);
        self
    }

    /// With edge cases
    #[must_use]
    pub fn with_edge_cases<I, S>(mut self, cases: I, provenance: Provenance) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_cases = Sourced::new(cases.into_iter().map(Into::into).collect(), provenance);
        self
    }

    /// With recommended tools
    #[must_use]
    pub fn with_recommended_tools<I, S>(mut self, tools: I, provenance: Provenance) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommended_tools = Sourced::new(tools.into_iter().map(Into::into).collect(), provenance);
        self
    }

    /// With recommended output format
    #[must_use]
    pub fn with_output_format(mut self, format: impl Into<String>, provenance: Provenance) -> Self {
        self.output_format = Sourced::new(Some(format.into()), provenance);
        self
    }

    /// With consulted sources
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<SourceRef>) -> Self {
        self.sources = sources;
        self
    }

    /// Whether this extract came from the offline fallback path
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, CanonOrigin::OfflineFallback)
    }

    /// Whether every field is explicitly uncited
    #[must_use]
    pub fn is_fully_unverified(&self) -> bool {
        self.provenance_tags()
            .iter()
            .all(|(_, p)| matches!(p, Provenance::Unverified))
    }

    /// `(field, provenance)` for every tagged field
    #[must_use]
    pub fn provenance_tags(&self) -> [(&'static str, &Provenance); 7] {
        [
            ("quickstart_steps", &self.quickstart_steps.provenance),
            ("decision_points", &self.decision_points.provenance),
            ("templates", &self.templates.provenance),
            ("failure_modes", &self.failure_modes.provenance),
            ("edge_cases", &self.edge_cases.provenance),
            ("recommended_tools", &self.recommended_tools.provenance),
            ("output_format", &self.output_format.provenance),
        ]
    }

    /// Check the provenance invariant
    ///
    /// Counts are not checked here; shortfalls surface as gate failures on
    /// the compiled document.
    ///
    /// # Errors
    /// Returns an error naming the first non-empty field whose provenance tag
    /// carries a blank citation.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        let populated = [
            !self.quickstart_steps.value.is_empty(),
            !self.decision_points.value.is_empty(),
            !self.templates.value.is_empty(),
            !self.failure_modes.value.is_empty(),
            !self.edge_cases.value.is_empty(),
            !self.recommended_tools.value.is_empty(),
            self.output_format
                .value
                .as_deref()
                .is_some_and(|f| !f.trim().is_empty()),
        ];

        for ((field, provenance), populated) in self.provenance_tags().into_iter().zip(populated) {
            if populated && provenance.is_missing() {
                return Err(InputValidationError::canon(
                    field,
                    "non-empty field has a blank citation; use UNVERIFIED when no source exists",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extract_is_valid_and_unverified() {
        let canon = CanonExtract::empty(CanonOrigin::OfflineFallback);
        assert!(canon.validate().is_ok());
        assert!(canon.is_fully_unverified());
        assert!(canon.is_fallback());
    }

    #[test]
    fn blank_citation_on_populated_field_rejected() {
        let canon = CanonExtract::empty(CanonOrigin::service("fixture"))
            .with_edge_cases(["empty file"], Provenance::cited(""));
        let err = canon.validate().unwrap_err();
        assert_eq!(err.field, "edge_cases");
    }

    #[test]
    fn blank_citation_on_empty_field_tolerated() {
        let canon = CanonExtract::empty(CanonOrigin::service("fixture"))
            .with_edge_cases(Vec::<String>::new(), Provenance::cited(""));
        assert!(canon.validate().is_ok());
    }

    #[test]
    fn failure_mode_completeness() {
        assert!(FailureMode::new("a", "b", "c").is_complete());
        assert!(!FailureMode::new("a", " ", "c").is_complete());
        assert_eq!(FailureMode::new("a", "b", "c").high_risk().risk, Risk::High);
    }

    #[test]
    fn risk_defaults_when_absent_in_json() {
        let mode: FailureMode =
            serde_json::from_str(r#"{"symptom":"s","root_cause":"r","fix":"f"}"#).unwrap();
        assert_eq!(mode.risk, Risk::Standard);
    }
}
