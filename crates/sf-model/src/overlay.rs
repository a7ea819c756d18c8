//! Local overlay: organization and user constraints
//!
//! Compliance constraints are absolute. Tool requirements, format spec and
//! priority are preferences that override canon defaults but never
//! compliance.

use crate::error::InputValidationError;
use crate::text::{contains_word, contains_word_prefix};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Words and phrases that make a compliance rule a prohibition wherever they appear
const PROHIBITION_PHRASES: &[&str] = &[
    "never",
    "do not",
    "does not",
    "don't",
    "must not",
    "mustn't",
    "cannot",
    "can't",
    "may not",
    "not allowed",
    "not permitted",
    "ban",
    "bans",
    "banned",
];

/// Word stems that mark a prohibition in any inflection
const PROHIBITION_STEMS: &[&str] = &["forbid", "prohibit", "disallow"];

/// What the overlay optimises for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Fast results even if imperfect
    Speed,
    /// Verified and precise results
    Accuracy,
    /// Transparent reasoning
    Explainability,
    /// Uniform results
    Consistency,
}

impl Priority {
    /// All priorities in declaration order
    pub const ALL: [Priority; 4] = [
        Self::Speed,
        Self::Accuracy,
        Self::Explainability,
        Self::Consistency,
    ];

    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Accuracy => "accuracy",
            Self::Explainability => "explainability",
            Self::Consistency => "consistency",
        }
    }

    /// One-line description used in the workflow note
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Speed => "speed is most important; get fast results even if imperfect",
            Self::Accuracy => "accuracy is critical; results must be verified and precise",
            Self::Explainability => "explainability matters; reasoning must be transparent",
            Self::Consistency => "consistency is key; results must be uniform across runs",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = InputValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                InputValidationError::overlay(
                    "priority",
                    format!(
                        "'{}' is not exactly one of speed, accuracy, explainability, consistency",
                        s.trim()
                    ),
                )
            })
    }
}

/// Required and forbidden tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequirements {
    /// Tools that must be used
    #[serde(default)]
    pub required: IndexSet<String>,
    /// Tools that must not be used
    #[serde(default)]
    pub forbidden: IndexSet<String>,
}

impl ToolRequirements {
    /// Whether neither list has entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }

    /// Whether `tool` is forbidden (case-insensitive)
    #[must_use]
    pub fn forbids(&self, tool: &str) -> bool {
        self.forbidden.iter().any(|f| f.eq_ignore_ascii_case(tool.trim()))
    }
}

/// Output format requirements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FormatSpec {
    /// No requirement
    #[default]
    None,
    /// Prose requirement
    FreeText(String),
    /// Key → value requirements
    Structured(IndexMap<String, String>),
}

impl FormatSpec {
    /// Whether the spec constrains anything
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        match self {
            Self::None => true,
            Self::FreeText(text) => text.trim().is_empty(),
            Self::Structured(map) => map.is_empty(),
        }
    }

    /// Look up a structured key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Structured(map) => map.get(key).map(String::as_str),
            _ => None,
        }
    }

    /// Single-line description, `None` when unconstrained
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        if self.is_none() {
            return None;
        }
        match self {
            Self::None => None,
            Self::FreeText(text) => Some(text.trim().to_string()),
            Self::Structured(map) => Some(
                map.iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }
}

/// Organization and user constraints for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOverlay {
    /// Hard rules that nothing may override
    #[serde(default)]
    pub compliance_constraints: IndexSet<String>,
    /// Required and forbidden tools
    #[serde(default)]
    pub tool_requirements: ToolRequirements,
    /// Output format requirements
    #[serde(default)]
    pub format_spec: FormatSpec,
    /// Single optimisation target
    pub priority: Priority,
    /// Symptoms seen locally, in reported order
    #[serde(default)]
    pub known_failure_patterns: Vec<String>,
}

impl LocalOverlay {
    /// Create overlay with only a priority
    #[inline]
    #[must_use]
    pub fn new(priority: Priority) -> Self {
        Self {
            compliance_constraints: IndexSet::new(),
            tool_requirements: ToolRequirements::default(),
            format_spec: FormatSpec::None,
            priority,
            known_failure_patterns: Vec::new(),
        }
    }

    /// With compliance constraints
    #[must_use]
    pub fn with_compliance<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compliance_constraints = rules.into_iter().map(Into::into).collect();
        self
    }

    /// With required tools
    #[must_use]
    pub fn with_required_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_requirements.required = tools.into_iter().map(Into::into).collect();
        self
    }

    /// With forbidden tools
    #[must_use]
    pub fn with_forbidden_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_requirements.forbidden = tools.into_iter().map(Into::into).collect();
        self
    }

    /// With format spec
    #[inline]
    #[must_use]
    pub fn with_format(mut self, format: FormatSpec) -> Self {
        self.format_spec = format;
        self
    }

    /// With known failure patterns
    #[must_use]
    pub fn with_failure_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_failure_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// First compliance rule that bans `term`, if any
    #[must_use]
    pub fn compliance_ban(&self, term: &str) -> Option<&str> {
        self.compliance_constraints
            .iter()
            .find(|rule| prohibits(rule, term))
            .map(String::as_str)
    }

    /// Check overlay invariants
    ///
    /// # Errors
    /// Returns an error when a list holds a blank entry, when a tool is both
    /// required and forbidden, or when a required tool is banned by a
    /// compliance rule.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        if self.compliance_constraints.iter().any(|r| r.trim().is_empty()) {
            return Err(InputValidationError::overlay(
                "compliance_constraints",
                "blank rule",
            ));
        }

        let tools = &self.tool_requirements;
        if tools
            .required
            .iter()
            .chain(tools.forbidden.iter())
            .any(|t| t.trim().is_empty())
        {
            return Err(InputValidationError::overlay("tool_requirements", "blank tool name"));
        }
        if let Some(both) = tools.required.iter().find(|t| tools.forbids(t)) {
            return Err(InputValidationError::overlay(
                "tool_requirements",
                format!("'{both}' is both required and forbidden"),
            ));
        }
        for tool in &tools.required {
            if let Some(rule) = self.compliance_ban(tool) {
                return Err(InputValidationError::overlay(
                    "tool_requirements",
                    format!("required tool '{tool}' is banned by compliance rule '{rule}'"),
                ));
            }
        }

        if self.known_failure_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(InputValidationError::overlay(
                "known_failure_patterns",
                "blank pattern",
            ));
        }
        Ok(())
    }
}

/// Whether a compliance rule is a prohibition naming `term` as a whole word
///
/// A rule prohibits when it opens with "no" or carries a prohibition phrase
/// anywhere ("Using pylint is forbidden on customer code").
#[must_use]
pub fn prohibits(rule: &str, term: &str) -> bool {
    let rule = rule.trim().to_lowercase();
    let is_prohibition = rule.starts_with("no ")
        || PROHIBITION_PHRASES.iter().any(|p| contains_word(&rule, p))
        || PROHIBITION_STEMS.iter().any(|s| contains_word_prefix(&rule, s));
    is_prohibition && contains_word(&rule, term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parsing() {
        assert_eq!(" Accuracy ".parse::<Priority>().unwrap(), Priority::Accuracy);
        let err = "balanced".parse::<Priority>().unwrap_err();
        assert_eq!(err.field, "priority");
    }

    #[test]
    fn prohibition_detection() {
        assert!(prohibits("Never use pip for installs", "pip"));
        assert!(prohibits("No cloud services", "cloud"));
        assert!(!prohibits("Never use pipenv", "pip"));
        assert!(!prohibits("Always use pip", "pip"));
    }

    #[test]
    fn prohibition_phrased_mid_rule() {
        assert!(prohibits("Using pylint is forbidden on customer code", "pylint"));
        assert!(prohibits("Uploading to AWS is not allowed", "aws"));
        assert!(prohibits("pylint: banned in CI", "pylint"));
        assert!(prohibits("Teams must not call black directly", "black"));
        assert!(!prohibits("Using pylint is encouraged", "pylint"));
        assert!(!prohibits("Using pylintrc is forbidden", "pylint"));
    }

    #[test]
    fn required_and_forbidden_overlap_rejected() {
        let overlay = LocalOverlay::new(Priority::Speed)
            .with_required_tools(["ruff"])
            .with_forbidden_tools(["Ruff"]);
        assert_eq!(overlay.validate().unwrap_err().field, "tool_requirements");
    }

    #[test]
    fn required_tool_banned_by_compliance_rejected() {
        let overlay = LocalOverlay::new(Priority::Speed)
            .with_compliance(["Do not send code to pylint servers"])
            .with_required_tools(["pylint"]);
        let err = overlay.validate().unwrap_err();
        assert!(err.reason.contains("banned by compliance"));
    }

    #[test]
    fn format_description() {
        let mut map = IndexMap::new();
        map.insert("step_prefix".to_string(), "Run:".to_string());
        map.insert("encoding".to_string(), "utf-8".to_string());
        let spec = FormatSpec::Structured(map);
        assert_eq!(spec.describe().unwrap(), "step_prefix: Run:; encoding: utf-8");
        assert_eq!(spec.get("step_prefix"), Some("Run:"));
        assert!(FormatSpec::FreeText("  ".into()).is_none());
    }
}
