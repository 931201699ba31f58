//! Text normalization and sentence segmentation ahead of synthesis.

use once_cell::sync::Lazy;
use regex::Regex;

/// Everything outside word characters, whitespace, basic punctuation and the
/// Vietnamese diacritic alphabet.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[^\w\s.,!?;:()\-",
        "àáảãạăắằẳẵặâấầẩẫậèéẻẽẹêếềểễệìíỉĩịòóỏõọôốồổỗộơớờởỡợùúủũụưứừửữựỳýỷỹỵđ",
        "ÀÁẢÃẠĂẮẰẲẴẶÂẤẦẨẪẬÈÉẺẼẸÊẾỀỂỄỆÌÍỈĨỊÒÓỎÕỌÔỐỒỔỖỘƠỚỜỞỠỢÙÚỦŨỤƯỨỪỬỮỰỲÝỶỸỴĐ",
        "]",
    ))
    .expect("character allow-list is a valid pattern")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Normalize text for the TTS endpoint.
///
/// Strips characters outside the allow-list, collapses whitespace, and makes
/// sure non-empty output ends with a sentence terminator. Idempotent.
pub fn preprocess(text: &str) -> String {
    let filtered = DISALLOWED.replace_all(text, "");
    let collapsed = WHITESPACE.replace_all(&filtered, " ");
    let mut out = collapsed.trim().to_string();
    if let Some(last) = out.chars().last() {
        if !TERMINATORS.contains(&last) {
            out.push('.');
        }
    }
    out
}

/// Length in characters, the unit the endpoint limit is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text on literal periods, dropping empty segments.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
