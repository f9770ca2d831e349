//! Input word cleanup.

use tracing::info;

/// Most words a single passage request may use.
pub const MAX_WORDS: usize = 50;

/// Surfaced to the caller when the word list was cut down to [`MAX_WORDS`].
pub const TRUNCATION_ALERT: &str = "输入单词超过50个，已仅使用前50个单词。";

/// Keep alphanumerics, hyphens and spaces.
pub fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == ' ')
        .collect()
}

/// Words ready for a passage prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWords {
    pub words: Vec<String>,
    pub alert: Option<String>,
}

/// Truncate to the first [`MAX_WORDS`] entries, then sanitize and drop empties.
pub fn prepare_words(words: &[String]) -> PreparedWords {
    let alert = if words.len() > MAX_WORDS {
        info!(
            "Received {} words, using the first {}",
            words.len(),
            MAX_WORDS
        );
        Some(TRUNCATION_ALERT.to_string())
    } else {
        None
    };

    let words = words
        .iter()
        .take(MAX_WORDS)
        .map(|w| sanitize_word(w))
        .filter(|w| !w.is_empty())
        .collect();

    PreparedWords { words, alert }
}
