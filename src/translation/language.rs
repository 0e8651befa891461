//! Script-based direction detection for Korean ↔ Japanese translation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static JAPANESE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Hiragana}\p{Katakana}]").expect("valid kana regex"));
static KOREAN_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Hangul}").expect("valid hangul regex"));

/// Language a message gets translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetLanguage {
    Japanese,
    Korean,
}

impl TargetLanguage {
    /// BCP-47 code sent as `targetLanguageCode`
    pub fn code(&self) -> &'static str {
        match self {
            TargetLanguage::Japanese => "ja",
            TargetLanguage::Korean => "ko",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetLanguage::Japanese => "Japanese",
            TargetLanguage::Korean => "Korean",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Decide which way to translate `text`.
///
/// - Hangul only: translate into Japanese
/// - Hiragana/Katakana only: translate into Korean
/// - both or neither: `None`, nothing to do
///
/// Kanji alone is not enough to call a message Japanese since it also shows
/// up in Chinese and in Korean hanja.
pub fn detect_target(text: &str) -> Option<TargetLanguage> {
    let has_korean = KOREAN_SCRIPT.is_match(text);
    let has_japanese = JAPANESE_SCRIPT.is_match(text);

    match (has_korean, has_japanese) {
        (true, false) => Some(TargetLanguage::Japanese),
        (false, true) => Some(TargetLanguage::Korean),
        _ => None,
    }
}
