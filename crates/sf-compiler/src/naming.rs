//! Frontmatter name, title and description

/// Words dropped from the skill name
const NAME_STOP_WORDS: &[&str] = &["a", "the", "for", "skill", "create", "make", "build"];

/// Words kept in the skill name
const NAME_WORDS: usize = 3;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Triggers quoted in the description
const DESCRIPTION_TRIGGERS: usize = 3;

/// Kebab-case name derived from the goal, e.g. "lint-python-code"
#[must_use]
pub fn skill_name(goal: &str) -> String {
    let cleaned: String = goal
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !NAME_STOP_WORDS.contains(w))
        .take(NAME_WORDS)
        .collect();
    if words.is_empty() {
        "skill".to_string()
    } else {
        words.join("-")
    }
}

/// Goal with its first letter capitalised
#[must_use]
pub fn skill_title(goal: &str) -> String {
    capitalize(goal.split_whitespace().collect::<Vec<_>>().join(" ").as_str())
}

/// "Goal. Triggers: a, b, c. Uses: x." capped at 200 characters
#[must_use]
pub fn short_description(goal: &str, triggers: &[String], tools: &[String]) -> String {
    let mut text = skill_title(goal).trim_end_matches('.').to_string();
    text.push('.');

    let quoted: Vec<&str> = triggers
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(DESCRIPTION_TRIGGERS)
        .collect();
    if !quoted.is_empty() {
        text.push_str(&format!(" Triggers: {}.", quoted.join(", ")));
    }
    if !tools.is_empty() {
        text.push_str(&format!(" Uses: {}.", tools.join(", ")));
    }

    if text.chars().count() > MAX_DESCRIPTION_CHARS {
        let cut: String = text.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
        text = format!("{}...", cut.trim_end());
    }
    text
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_drops_stop_words_and_punctuation() {
        assert_eq!(skill_name("lint Python code"), "lint-python-code");
        assert_eq!(skill_name("Create a skill for parsing CSV files safely"), "parsing-csv-files");
        assert_eq!(skill_name("the skill!"), "skill");
    }

    #[test]
    fn description_quotes_first_three_triggers() {
        let triggers: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
        let d = short_description("lint Python code", &triggers, &["ruff".to_string()]);
        assert_eq!(d, "Lint Python code. Triggers: a, b, c. Uses: ruff.");
    }

    #[test]
    fn description_is_capped() {
        let goal = "x".repeat(400);
        let d = short_description(&goal, &[], &[]);
        assert_eq!(d.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(d.ends_with("..."));
    }
}
