use std::collections::HashSet;

use super::Language;

const SPANISH: &str = include_str!("../../resources/stopwords/spanish.txt");
const ENGLISH: &str = include_str!("../../resources/stopwords/english.txt");

pub(super) fn for_language(language: Language) -> HashSet<&'static str> {
    let raw = match language {
        Language::Spanish => SPANISH,
        Language::English => ENGLISH,
    };
    raw.lines()
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .collect()
}
