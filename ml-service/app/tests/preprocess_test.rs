use ml_service::preprocess::{Language, Preprocessor};
use proptest::prelude::*;

const SPANISH_STOPWORDS: &str = include_str!("../resources/stopwords/spanish.txt");

proptest! {
    #[test]
    fn preprocessing_is_idempotent(
        text in r#"[a-zA-ZáéíóúüñÁÉÍÓÚÑ0-9\x{0300}-\x{036F} .,;:!?¿¡'"()-]{0,120}"#
    ) {
        let preprocessor = Preprocessor::new(Language::Spanish);
        let once = preprocessor.preprocess(Some(&text));
        let twice = preprocessor.preprocess(Some(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn marks_split_from_their_base_are_composed(
        prefix in "[a-z]{0,6}",
        base in "[aeiou]",
        gap in "[0-9.,;!?]{1,3}",
        suffix in "[a-z]{1,6}",
    ) {
        let preprocessor = Preprocessor::new(Language::English);
        let text = format!("{prefix}{base}{gap}\u{301}{suffix}");
        let once = preprocessor.preprocess(Some(&text));
        prop_assert!(!once.contains('\u{301}'), "decomposed output {:?}", once);
        prop_assert_eq!(preprocessor.preprocess(Some(&once)), once);
    }

    #[test]
    fn output_tokens_are_clean(text in "\\PC{0,120}") {
        let preprocessor = Preprocessor::new(Language::Spanish);
        let output = preprocessor.preprocess(Some(&text));

        prop_assert!(!output.starts_with(' ') && !output.ends_with(' '));
        prop_assert!(!output.contains("  "));
        for token in output.split(' ').filter(|t| !t.is_empty()) {
            prop_assert!(token.chars().count() > 1, "short token {:?}", token);
            prop_assert!(!token.chars().any(|c| c.is_ascii_digit() || c.is_ascii_punctuation() && c != '_'));
            prop_assert!(!SPANISH_STOPWORDS.lines().any(|w| w == token), "stopword {:?}", token);
        }
    }

    #[test]
    fn arbitrary_input_never_panics(text in any::<String>()) {
        let preprocessor = Preprocessor::new(Language::English);
        let _ = preprocessor.preprocess(Some(&text));
    }
}
