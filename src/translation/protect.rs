//! Placeholder protection for expressions the translator mangles.
//!
//! Currency amounts get their unit converted literally (`5만원` becomes
//! `5万ウォン`, not a yen amount) and laughter runs (`ㅋㅋㅋ`, `www`) are
//! swapped for the target language's equivalent of the same length. Both are
//! replaced by opaque `__CUR{i}__` / `__LAU{i}__` tokens before translation
//! and restored by index afterwards.

use super::language::TargetLanguage;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Longer units come first so "만원" is not matched as a bare "원".
// Digits and spaces are ASCII only; full-width amounts go to the translator.
static KOREAN_WON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:(\d[\d,.]*\s*))(만(?-u:\s*)원|천(?-u:\s*)원|억(?-u:\s*)원|조(?-u:\s*)원|원)").expect("valid won regex")
});
static JAPANESE_YEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:(\d[\d,.]*\s*))(万(?-u:\s*)円|千(?-u:\s*)円|億(?-u:\s*)円|兆(?-u:\s*)円|円)").expect("valid yen regex")
});
static KOREAN_LAUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ㅋ{2,}|ㅎ{2,}").expect("valid korean laughter regex"));
static JAPANESE_LAUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"w{3,}").expect("valid japanese laughter regex"));

const CURRENCY_TAG: &str = "CUR";
const LAUGHTER_TAG: &str = "LAU";

/// Won units mapped to their Japanese rendering (Korean → Japanese).
fn won_to_japanese(unit: &str) -> Option<&'static str> {
    match unit {
        "만원" => Some("万ウォン"),
        "천원" => Some("千ウォン"),
        "억원" => Some("億ウォン"),
        "조원" => Some("兆ウォン"),
        "원" => Some("ウォン"),
        _ => None,
    }
}

/// Yen units mapped to their Korean rendering (Japanese → Korean).
fn yen_to_korean(unit: &str) -> Option<&'static str> {
    match unit {
        "万円" => Some("만엔"),
        "千円" => Some("천엔"),
        "億円" => Some("억엔"),
        "兆円" => Some("조엔"),
        "円" => Some("엔"),
        _ => None,
    }
}

fn placeholder(tag: &str, index: usize) -> String {
    format!("__{}{}__", tag, index)
}

/// Text with protected spans swapped out, plus what to put back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedText {
    /// Text to send to the translator
    pub text: String,
    /// Restoration values for `__CUR{i}__`, by index
    pub currency: Vec<String>,
    /// Restoration values for `__LAU{i}__`, by index
    pub laughter: Vec<String>,
}

impl ProtectedText {
    /// Protect currency amounts, then laughter, for translation into `target`.
    pub fn new(text: &str, target: TargetLanguage) -> Self {
        let (text, currency) = protect_currency(text, target);
        let (text, laughter) = protect_laughter(&text, target);
        Self {
            text,
            currency,
            laughter,
        }
    }

    /// Put the protected values back into a translated string.
    pub fn restore(&self, translated: &str) -> String {
        let text = restore_placeholders(translated, LAUGHTER_TAG, &self.laughter);
        restore_placeholders(&text, CURRENCY_TAG, &self.currency)
    }
}

/// Replace source-language currency amounts with `__CUR{i}__` tokens.
///
/// The returned values already carry the target-language unit.
pub fn protect_currency(text: &str, target: TargetLanguage) -> (String, Vec<String>) {
    type UnitMap = fn(&str) -> Option<&'static str>;
    let (re, unit_map) = match target {
        TargetLanguage::Japanese => (&*KOREAN_WON, won_to_japanese as UnitMap),
        TargetLanguage::Korean => (&*JAPANESE_YEN, yen_to_korean as UnitMap),
    };

    let mut replacements = Vec::new();
    let result = re.replace_all(text, |caps: &Captures| {
        let number = caps[1].trim();
        let unit = caps[2].replace(' ', "");

        match unit_map(&unit) {
            Some(target_unit) => {
                let token = placeholder(CURRENCY_TAG, replacements.len());
                replacements.push(format!("{}{}", number, target_unit));
                token
            }
            None => caps[0].to_string(),
        }
    });

    (result.into_owned(), replacements)
}

/// Replace laughter runs with `__LAU{i}__` tokens.
///
/// Korean `ㅋㅋ`/`ㅎㅎ` become `w` of the same length for Japanese; Japanese
/// `www` becomes `ㅋ` for Korean, except a run directly followed by `.`,
/// which is a `www.` host and left alone.
pub fn protect_laughter(text: &str, target: TargetLanguage) -> (String, Vec<String>) {
    let (re, laugh_char) = match target {
        TargetLanguage::Japanese => (&*KOREAN_LAUGH, "w"),
        TargetLanguage::Korean => (&*JAPANESE_LAUGH, "ㅋ"),
    };

    let mut replacements = Vec::new();
    let mut out = String::with_capacity(text.len());
    let mut prev = 0;

    for m in re.find_iter(text) {
        if target == TargetLanguage::Korean && text[m.end()..].starts_with('.') {
            continue;
        }

        out.push_str(&text[prev..m.start()]);
        out.push_str(&placeholder(LAUGHTER_TAG, replacements.len()));
        replacements.push(laugh_char.repeat(m.as_str().chars().count()));
        prev = m.end();
    }
    out.push_str(&text[prev..]);

    (out, replacements)
}

/// Substitute `__{tag}{i}__` with `values[i]`.
fn restore_placeholders(text: &str, tag: &str, values: &[String]) -> String {
    values
        .iter()
        .enumerate()
        .fold(text.to_string(), |acc, (i, value)| {
            acc.replace(&placeholder(tag, i), value)
        })
}
