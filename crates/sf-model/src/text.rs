//! Word-boundary matching shared by compliance bans and criteria checks

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `needle` occurs in `haystack` as a whole word or phrase, ignoring case
#[must_use]
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word(haystack, needle, true)
}

/// Whether some word in `haystack` starts with `stem`, ignoring case
///
/// `forbid` matches "forbidden" and "Forbids" but not "unforbidden".
#[must_use]
pub fn contains_word_prefix(haystack: &str, stem: &str) -> bool {
    find_word(haystack, stem, false)
}

fn find_word(haystack: &str, needle: &str, whole: bool) -> bool {
    let haystack = haystack.to_lowercase();
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle.as_str()).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_word_char) && (!whole || !after.is_some_and(is_word_char))
    })
}
