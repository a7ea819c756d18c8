//! Quickstart executability: exactly three imperative steps

use super::QualityGate;
use sf_model::{Document, GateName, GateResult, Item, SectionName, QUICKSTART_STEPS};

/// Sequencing words allowed before the verb
const SEQUENCE_WORDS: &[&str] = &["first", "then", "next", "finally", "now", "please"];

/// Words that cannot open an imperative sentence
const NON_VERB_OPENERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "it", "its", "you", "your", "we", "our",
    "i", "my", "they", "there", "here", "step", "steps", "if", "when", "should", "is", "are",
];

/// Passes when the quickstart holds exactly three imperative sentences
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickstartGate;

impl QualityGate for QuickstartGate {
    fn name(&self) -> GateName {
        GateName::QuickstartExecutable
    }

    fn check(&self, doc: &Document) -> GateResult {
        let steps: Vec<&str> = doc
            .section(SectionName::Quickstart)
            .iter()
            .filter_map(|i| match i {
                Item::Step { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if steps.len() != QUICKSTART_STEPS {
            return GateResult::fail(
                format!(
                    "quickstart_executable: found {} steps, need exactly {QUICKSTART_STEPS}",
                    steps.len()
                ),
                "provide exactly three ordered steps in the canon quickstart",
            );
        }

        for (i, step) in steps.iter().enumerate() {
            if let Some(reason) = imperative_violation(step) {
                return GateResult::fail(
                    format!(
                        "quickstart_executable: step {} is not an imperative sentence ({reason})",
                        i + 1
                    ),
                    "rewrite the step as one sentence starting with a verb",
                );
            }
        }
        GateResult::pass(format!(
            "quickstart_executable: {QUICKSTART_STEPS} imperative steps"
        ))
    }
}

/// Why `step` is not a single imperative sentence, if it is not
#[must_use]
pub fn imperative_violation(step: &str) -> Option<&'static str> {
    let text = step.trim();
    if text.is_empty() {
        return Some("empty");
    }
    if text.ends_with('?') {
        return Some("question");
    }
    let body = text.trim_end_matches(['.', '!']);
    if [". ", "? ", "! "].iter().any(|sep| body.contains(sep)) {
        return Some("more than one sentence");
    }

    let opener = body
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .find(|w| !w.is_empty() && !SEQUENCE_WORDS.contains(&w.as_str()));
    let Some(opener) = opener else {
        return Some("no verb");
    };

    if !opener.chars().next().is_some_and(char::is_alphabetic) {
        return Some("does not start with a word");
    }
    if NON_VERB_OPENERS.contains(&opener.as_str()) {
        return Some("does not start with a verb");
    }
    if opener.len() > 5 && opener.ends_with("ing") {
        return Some("starts with a gerund");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imperative_detection() {
        assert_eq!(imperative_violation("Install ruff."), None);
        assert_eq!(imperative_violation("Then run ruff check."), None);
        assert_eq!(imperative_violation("Run: Lint the code."), None);
        assert_eq!(imperative_violation("Did it work?"), Some("question"));
        assert_eq!(
            imperative_violation("Install ruff. Run it."),
            Some("more than one sentence")
        );
        assert_eq!(
            imperative_violation("The linter runs."),
            Some("does not start with a verb")
        );
        assert_eq!(
            imperative_violation("Installing ruff."),
            Some("starts with a gerund")
        );
        assert_eq!(imperative_violation("  "), Some("empty"));
    }
}
