//! Text normalization shared by indexing and querying.

/// Lowercase `text` and replace every character outside `[a-z ]` with a space.
pub fn normalize_lowercase(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c == ' ' { c } else { ' ' })
        .collect()
}

/// Keep `[A-Za-z ]` as-is and replace everything else with a space.
pub fn normalize_case_sensitive(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphabetic() || c == ' ' { c } else { ' ' })
        .collect()
}

/// Non-empty words of already-normalized text.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(' ').filter(|word| !word.is_empty())
}

/// Lowercase letters of `text` with word boundaries removed.
pub fn letters_only(text: &str) -> String {
    normalize_lowercase(text)
        .chars()
        .filter(|c| *c != ' ')
        .collect()
}
