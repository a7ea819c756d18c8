//! Scope card: the accepted problem boundary
//!
//! A scope card is built by an external collaborator and handed to the core
//! only once it satisfies every minimum below. [`ScopeCard::validate`] is the
//! gatekeeper the compiler runs before touching any other input.

use crate::error::InputValidationError;
use crate::text::{contains_word, contains_word_prefix};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Minimum trimmed goal length in characters
pub const MIN_GOAL_CHARS: usize = 10;

/// Minimum number of trigger phrases
pub const MIN_TRIGGERS: usize = 5;

/// Minimum number of must-cover items
pub const MIN_MUST_COVER: usize = 3;

/// Minimum number of must-not-cover items
pub const MIN_MUST_NOT_COVER: usize = 3;

/// Words and phrases that make a success criterion checkable
const MEASURABLE_MARKERS: &[&str] = &[
    "zero",
    "all",
    "every",
    "each",
    "within",
    "at least",
    "at most",
    "less than",
    "more than",
    "fewer than",
    "no",
    "none",
    "under",
    "per",
];

/// Stems matched in any inflection ("passes", "failed")
const MEASURABLE_STEMS: &[&str] = &["pass", "fail"];

/// Shape of the generated skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputForm {
    /// Fill-in template or artifact
    Template,
    /// Executable script
    Script,
    /// Guided decision tree
    DecisionTree,
    /// Symptom → fix table
    TroubleshootingTable,
}

impl OutputForm {
    /// All forms in declaration order
    pub const ALL: [OutputForm; 4] = [
        Self::Template,
        Self::Script,
        Self::DecisionTree,
        Self::TroubleshootingTable,
    ];

    /// Stable kebab-case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Script => "script",
            Self::DecisionTree => "decision-tree",
            Self::TroubleshootingTable => "troubleshooting-table",
        }
    }
}

impl fmt::Display for OutputForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputForm {
    type Err = InputValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|form| form.as_str() == normalized)
            .ok_or_else(|| {
                InputValidationError::scope(
                    "output_form",
                    format!(
                        "'{s}' is not one of template, script, decision-tree, troubleshooting-table"
                    ),
                )
            })
    }
}

/// Accepted problem boundary for one generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCard {
    /// One-sentence goal
    pub goal: String,
    /// Phrases a user would say to invoke the skill
    pub triggers: Vec<String>,
    /// Scenarios the skill must handle
    pub must_cover: IndexSet<String>,
    /// Scenarios the skill must explicitly refuse
    pub must_not_cover: IndexSet<String>,
    /// Shape of the generated skill
    pub output_form: OutputForm,
    /// Measurable definition of success
    pub success_criteria: String,
}

impl ScopeCard {
    /// Create scope card with empty trigger and coverage lists
    #[inline]
    #[must_use]
    pub fn new(
        goal: impl Into<String>,
        output_form: OutputForm,
        success_criteria: impl Into<String>,
    ) -> Self {
        Self {
            goal: goal.into(),
            triggers: Vec::new(),
            must_cover: IndexSet::new(),
            must_not_cover: IndexSet::new(),
            output_form,
            success_criteria: success_criteria.into(),
        }
    }

    /// With trigger phrases
    #[must_use]
    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    /// With must-cover items
    #[must_use]
    pub fn with_must_cover<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_cover = items.into_iter().map(Into::into).collect();
        self
    }

    /// With must-not-cover items
    #[must_use]
    pub fn with_must_not_cover<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_not_cover = items.into_iter().map(Into::into).collect();
        self
    }

    /// Total number of coverage items on both sides of the boundary
    #[inline]
    #[must_use]
    pub fn boundary_size(&self) -> usize {
        self.must_cover.len() + self.must_not_cover.len()
    }

    /// Check every scope card invariant
    ///
    /// # Errors
    /// Returns the first violated invariant, naming the field.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        let goal_len = self.goal.trim().chars().count();
        if goal_len < MIN_GOAL_CHARS {
            return Err(InputValidationError::scope(
                "goal",
                format!("must be at least {MIN_GOAL_CHARS} characters, got {goal_len}"),
            ));
        }

        if self.triggers.len() < MIN_TRIGGERS {
            return Err(InputValidationError::scope(
                "triggers",
                format!(
                    "need {MIN_TRIGGERS}+ trigger phrases, got {}",
                    self.triggers.len()
                ),
            ));
        }
        let mut seen = HashSet::new();
        for trigger in &self.triggers {
            let key = normalize(trigger);
            if key.is_empty() {
                return Err(InputValidationError::scope("triggers", "blank trigger phrase"));
            }
            if !seen.insert(key) {
                return Err(InputValidationError::scope(
                    "triggers",
                    format!("duplicate trigger phrase '{}'", trigger.trim()),
                ));
            }
        }

        check_items("must_cover", &self.must_cover, MIN_MUST_COVER)?;
        check_items("must_not_cover", &self.must_not_cover, MIN_MUST_NOT_COVER)?;

        let covered: HashSet<String> = self.must_cover.iter().map(|i| normalize(i)).collect();
        if let Some(overlap) = self
            .must_not_cover
            .iter()
            .find(|item| covered.contains(&normalize(item)))
        {
            return Err(InputValidationError::scope(
                "must_not_cover",
                format!("'{}' also appears in must_cover", overlap.trim()),
            ));
        }

        if self.success_criteria.trim().is_empty() {
            return Err(InputValidationError::scope(
                "success_criteria",
                "must not be empty",
            ));
        }
        if !is_measurable(&self.success_criteria) {
            return Err(InputValidationError::scope(
                "success_criteria",
                "must describe a measurable condition (a number, threshold or pass/fail check)",
            ));
        }

        Ok(())
    }
}

fn check_items(
    field: &'static str,
    items: &IndexSet<String>,
    min: usize,
) -> Result<(), InputValidationError> {
    if items.len() < min {
        return Err(InputValidationError::scope(
            field,
            format!("need {min}+ items, got {}", items.len()),
        ));
    }
    if items.iter().any(|i| i.trim().is_empty()) {
        return Err(InputValidationError::scope(field, "blank item"));
    }
    Ok(())
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether a success criterion names something checkable
#[must_use]
pub fn is_measurable(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit() || c == '%')
        || MEASURABLE_MARKERS.iter().any(|m| contains_word(text, m))
        || MEASURABLE_STEMS.iter().any(|s| contains_word_prefix(text, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ScopeCard {
        ScopeCard::new(
            "lint Python code",
            OutputForm::Script,
            "zero lint errors on the sample project",
        )
        .with_triggers(["lint python", "check style", "run ruff", "fix pep8", "python linter"])
        .with_must_cover(["style checks", "import sorting", "unused variables"])
        .with_must_not_cover(["type checking", "formatting other languages", "security audits"])
    }

    #[test]
    fn valid_card_passes() {
        assert!(card().validate().is_ok());
    }

    #[test]
    fn short_goal_rejected() {
        let mut c = card();
        c.goal = "lint".to_string();
        assert_eq!(c.validate().unwrap_err().field, "goal");
    }

    #[test]
    fn too_few_triggers_rejected() {
        let c = card().with_triggers(["a", "b"]);
        let err = c.validate().unwrap_err();
        assert_eq!(err.field, "triggers");
        assert!(err.reason.contains("got 2"));
    }

    #[test]
    fn duplicate_triggers_rejected() {
        let c = card().with_triggers(["lint", "Lint ", "b", "c", "d"]);
        assert!(c.validate().unwrap_err().reason.contains("duplicate"));
    }

    #[test]
    fn overlapping_boundary_rejected() {
        let c = card().with_must_not_cover(["Style Checks", "x", "y"]);
        let err = c.validate().unwrap_err();
        assert_eq!(err.field, "must_not_cover");
    }

    #[test]
    fn unmeasurable_criteria_rejected() {
        let mut c = card();
        c.success_criteria = "users like it".to_string();
        assert_eq!(c.validate().unwrap_err().field, "success_criteria");
    }

    #[test]
    fn output_form_parsing() {
        assert_eq!("decision_tree".parse::<OutputForm>().unwrap(), OutputForm::DecisionTree);
        assert_eq!(
            "Troubleshooting Table".parse::<OutputForm>().unwrap(),
            OutputForm::TroubleshootingTable
        );
        assert!("mixed".parse::<OutputForm>().is_err());
    }

    #[test]
    fn measurable_heuristic() {
        assert!(is_measurable("95% of files pass"));
        assert!(is_measurable("every file checked in under 2s"));
        assert!(!is_measurable("it feels nicer"));
    }

    #[test]
    fn measurable_markers_match_whole_words() {
        assert!(!is_measurable("teach users the basics"));
        assert!(!is_measurable("paper cuts go away"));
        assert!(!is_measurable("the piano sounds right"));
        assert!(!is_measurable("bypass the old checker"));
        assert!(is_measurable("no warnings remain"));
        assert!(is_measurable("each module passes review"));
        assert!(is_measurable("one report per run"));
    }
}
