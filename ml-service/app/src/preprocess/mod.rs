//! Text normalization shared by the trainer and the classification endpoint.
//!
//! Both sides must run the exact same steps in the same order, otherwise the TF-IDF
//! features drift and predictions degrade without any error. The pipeline artifact
//! records the [`Language`] it was trained with so the serving process can rebuild an
//! identical [`Preprocessor`].
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

mod stopwords;

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("compile digit pattern"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("compile punctuation pattern"));

/// Language whose stop-word list is applied during preprocessing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spanish => "spanish",
            Self::English => "english",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unsupported preprocessing language: {0}")]
pub struct UnsupportedLanguage(String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "spanish" | "es" => Ok(Self::Spanish),
            "english" | "en" => Ok(Self::English),
            _ => Err(UnsupportedLanguage(raw.to_string())),
        }
    }
}

/// Normalizes raw document text into a whitespace-joined token string.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    language: Language,
    stopwords: HashSet<&'static str>,
}

impl Preprocessor {
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            language,
            stopwords: stopwords::for_language(language),
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Runs the normalization steps in order: lower-case, strip digit runs, strip
    /// punctuation, NFC compose, split on word boundaries, drop stop-words, drop
    /// single-character tokens, join with single spaces.
    ///
    /// Composition runs after the strips: removing a character between a base letter and
    /// a combining mark leaves a decomposed pair that must be composed in this pass.
    ///
    /// Missing input yields an empty string. The output is a fixed point: feeding it back
    /// in returns it unchanged.
    #[must_use]
    pub fn preprocess(&self, text: Option<&str>) -> String {
        let Some(text) = text else {
            return String::new();
        };

        let lowered = text.to_lowercase();
        let without_digits = DIGIT_RUNS.replace_all(&lowered, "");
        let stripped = NON_WORD.replace_all(&without_digits, "");
        let cleaned: String = stripped.nfc().collect();

        cleaned
            .split_word_bounds()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter(|token| !self.stopwords.contains(token))
            .filter(|token| token.chars().count() > 1)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
