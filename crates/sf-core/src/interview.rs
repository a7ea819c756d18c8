//! Local-overlay interview
//!
//! Five questions collect the organization's constraints. Answers are kept
//! as raw text until all five are present, then parsed into a
//! [`LocalOverlay`]. Blank answers mean "none", except for the priority,
//! which must name exactly one value.

use crate::error::ForgeError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sf_model::{FormatSpec, LocalOverlay, Priority, ScopeCard};

/// Answers that explicitly mean "nothing to declare"
const NONE_ANSWERS: &[&str] = &["", "none", "n/a", "na", "no", "-"];

/// One interview question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewQuestion {
    /// Red lines that must never be crossed
    Compliance,
    /// Required and forbidden tools
    Tools,
    /// Fixed output format
    Format,
    /// Single optimisation target
    Priority,
    /// Locally observed failure points
    Failures,
}

impl InterviewQuestion {
    /// All questions in asking order
    pub const ALL: [InterviewQuestion; 5] = [
        Self::Compliance,
        Self::Tools,
        Self::Format,
        Self::Priority,
        Self::Failures,
    ];

    /// Stable snake_case id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliance => "compliance",
            Self::Tools => "tools",
            Self::Format => "format",
            Self::Priority => "priority",
            Self::Failures => "failures",
        }
    }

    /// Question text
    #[must_use]
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Compliance => {
                "What are your organization's compliance requirements or red lines? (What must NOT happen?)"
            }
            Self::Tools => "Which tools MUST you use? Which are FORBIDDEN?",
            Self::Format => "Is the output format fixed? Any naming or structure requirements?",
            Self::Priority => {
                "What's your top priority: speed, accuracy, explainability, or consistency?"
            }
            Self::Failures => "What are the common failure points in your context? (one per line)",
        }
    }

    /// Example answer
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Compliance => "Never use cloud services; Cannot delete data",
            Self::Tools => "Must use: ruff, pytest. Cannot use: pylint",
            Self::Format => "step_prefix: Run:",
            Self::Priority => "accuracy",
            Self::Failures => "Timeouts with large files",
        }
    }
}

/// Raw interview answers, keyed by question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewAnswers {
    answers: IndexMap<InterviewQuestion, String>,
}

impl InterviewAnswers {
    /// Empty answer set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any previous one
    pub fn record(&mut self, question: InterviewQuestion, answer: impl Into<String>) {
        self.answers.insert(question, answer.into());
    }

    /// With an answer
    #[must_use]
    pub fn with(mut self, question: InterviewQuestion, answer: impl Into<String>) -> Self {
        self.record(question, answer);
        self
    }

    /// Raw answer for a question
    #[must_use]
    pub fn get(&self, question: InterviewQuestion) -> Option<&str> {
        self.answers.get(&question).map(String::as_str)
    }

    /// Unanswered questions in asking order
    #[must_use]
    pub fn missing(&self) -> Vec<InterviewQuestion> {
        InterviewQuestion::ALL
            .into_iter()
            .filter(|q| !self.answers.contains_key(q))
            .collect()
    }

    /// Whether all five questions have an answer
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Parse the answers into an overlay
    ///
    /// # Errors
    /// [`ForgeError::InterviewIncomplete`] while any answer is missing, or
    /// [`ForgeError::InvalidInput`] when the priority or the resulting overlay
    /// is invalid.
    pub fn to_overlay(&self) -> Result<LocalOverlay, ForgeError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ForgeError::InterviewIncomplete { missing });
        }
        let answer = |q| self.get(q).unwrap_or_default();

        let priority: Priority = answer(InterviewQuestion::Priority).parse()?;
        let (required, forbidden) = parse_tools(answer(InterviewQuestion::Tools));

        let overlay = LocalOverlay::new(priority)
            .with_compliance(split_entries(answer(InterviewQuestion::Compliance), true))
            .with_required_tools(required)
            .with_forbidden_tools(forbidden)
            .with_format(parse_format(answer(InterviewQuestion::Format)))
            .with_failure_patterns(split_entries(answer(InterviewQuestion::Failures), false));
        overlay.validate()?;
        Ok(overlay)
    }
}

fn is_none(answer: &str) -> bool {
    NONE_ANSWERS.contains(&answer.trim().to_lowercase().as_str())
}

/// Lines (and, optionally, `;`-separated clauses) of an answer
fn split_entries(answer: &str, split_semicolons: bool) -> Vec<String> {
    if is_none(answer) {
        return Vec::new();
    }
    answer
        .lines()
        .flat_map(|line| {
            if split_semicolons {
                line.split(';').collect::<Vec<_>>()
            } else {
                vec![line]
            }
        })
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// "Must use: a, b. Cannot use: c" → (required, forbidden)
///
/// An answer with neither marker is read as a list of required tools.
#[must_use]
pub fn parse_tools(answer: &str) -> (Vec<String>, Vec<String>) {
    if is_none(answer) {
        return (Vec::new(), Vec::new());
    }
    let lower = answer.to_ascii_lowercase();
    let must = lower.find("must use:");
    let cannot = lower.find("cannot use:");

    let segment = |start: usize, marker: &str, other: Option<usize>| -> Vec<String> {
        let begin = start + marker.len();
        let end = other.filter(|o| *o > start).unwrap_or(answer.len());
        list(&answer[begin..end])
    };

    match (must, cannot) {
        (None, None) => (list(answer), Vec::new()),
        (Some(m), c) => (
            segment(m, "must use:", c),
            c.map(|c| segment(c, "cannot use:", Some(m))).unwrap_or_default(),
        ),
        (None, Some(c)) => (Vec::new(), segment(c, "cannot use:", None)),
    }
}

fn list(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(|t| t.trim().trim_end_matches(['.', ';']).trim())
        .filter(|t| !t.is_empty() && !is_none(t))
        .map(str::to_string)
        .collect()
}

/// Format answer: `key: value` lines become a structured spec, anything else free text
#[must_use]
pub fn parse_format(answer: &str) -> FormatSpec {
    if is_none(answer) {
        return FormatSpec::None;
    }
    let lines: Vec<&str> = answer
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let pairs: Option<IndexMap<String, String>> = lines
        .iter()
        .map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            let is_key = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            is_key.then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect();
    match pairs {
        Some(map) if !map.is_empty() => FormatSpec::Structured(map),
        _ => FormatSpec::FreeText(lines.join(" ")),
    }
}

/// Asks the interview questions
#[async_trait]
pub trait Interviewer: Send + Sync {
    /// Collect answers for `questions` about `scope`
    async fn interview(
        &self,
        scope: &ScopeCard,
        questions: &[InterviewQuestion],
    ) -> anyhow::Result<InterviewAnswers>;
}

/// Interviewer that answers from a fixed set
#[derive(Debug, Clone, Default)]
pub struct ScriptedInterviewer {
    answers: InterviewAnswers,
}

impl ScriptedInterviewer {
    /// Create from prepared answers
    #[inline]
    #[must_use]
    pub fn new(answers: InterviewAnswers) -> Self {
        Self { answers }
    }
}

#[async_trait]
impl Interviewer for ScriptedInterviewer {
    async fn interview(
        &self,
        _scope: &ScopeCard,
        _questions: &[InterviewQuestion],
    ) -> anyhow::Result<InterviewAnswers> {
        Ok(self.answers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete() -> InterviewAnswers {
        InterviewAnswers::new()
            .with(InterviewQuestion::Compliance, "")
            .with(InterviewQuestion::Tools, "none")
            .with(InterviewQuestion::Format, "")
            .with(InterviewQuestion::Priority, "Accuracy")
            .with(InterviewQuestion::Failures, "")
    }

    #[test]
    fn blank_answers_mean_none() {
        let overlay = complete().to_overlay().unwrap();
        assert_eq!(overlay, LocalOverlay::new(Priority::Accuracy));
    }

    #[test]
    fn missing_answers_keep_run_suspended() {
        let answers = InterviewAnswers::new().with(InterviewQuestion::Priority, "speed");
        match answers.to_overlay() {
            Err(ForgeError::InterviewIncomplete { missing }) => assert_eq!(
                missing,
                vec![
                    InterviewQuestion::Compliance,
                    InterviewQuestion::Tools,
                    InterviewQuestion::Format,
                    InterviewQuestion::Failures,
                ]
            ),
            other => panic!("expected suspension, got {other:?}"),
        }
    }

    #[test]
    fn blank_priority_rejected() {
        let answers = complete().with(InterviewQuestion::Priority, "  ");
        let err = answers.to_overlay().unwrap_err();
        assert!(err.requires_caller());
    }

    #[test]
    fn tool_answer_parsing() {
        assert_eq!(
            parse_tools("Must use: ruff, pytest. Cannot use: pylint, flake8"),
            (
                vec!["ruff".to_string(), "pytest".to_string()],
                vec!["pylint".to_string(), "flake8".to_string()]
            )
        );
        assert_eq!(
            parse_tools("cannot use: AWS"),
            (vec![], vec!["AWS".to_string()])
        );
        assert_eq!(parse_tools("ruff"), (vec!["ruff".to_string()], vec![]));
    }

    #[test]
    fn format_answer_parsing() {
        assert_eq!(parse_format("n/a"), FormatSpec::None);
        assert_eq!(
            parse_format("Must be JSON with keys id and name"),
            FormatSpec::FreeText("Must be JSON with keys id and name".to_string())
        );
        match parse_format("step_prefix: Run:\nencoding: utf-8") {
            FormatSpec::Structured(map) => {
                assert_eq!(map.get("step_prefix").map(String::as_str), Some("Run:"));
                assert_eq!(map.len(), 2);
            }
            other => panic!("expected structured spec, got {other:?}"),
        }
    }

    #[test]
    fn compliance_and_failures_split_into_entries() {
        let overlay = complete()
            .with(InterviewQuestion::Compliance, "Never use cloud services; Cannot delete data")
            .with(InterviewQuestion::Failures, "Timeouts with large files\n\nEncoding errors")
            .to_overlay()
            .unwrap();
        assert_eq!(overlay.compliance_constraints.len(), 2);
        assert_eq!(
            overlay.known_failure_patterns,
            vec!["Timeouts with large files".to_string(), "Encoding errors".to_string()]
        );
    }
}
