//! TF-IDF vectorizer with smoothed idf and l2-normalized rows.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::ModelError;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("compile token pattern"));

/// Sparse feature row as `(column, weight)` pairs sorted by column.
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    index: HashMap<String, usize>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and document frequencies of `documents`.
    ///
    /// The vocabulary is sorted lexicographically, so column indices are stable for a
    /// given corpus.
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyVocabulary`] when no document contains a token of two
    /// or more word characters.
    pub fn fit(documents: &[String]) -> Result<Self, ModelError> {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let lowered = document.to_lowercase();
            let unique: BTreeSet<&str> = tokens(&lowered).collect();
            for token in unique {
                *doc_freq.entry(token.to_string()).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        #[allow(clippy::cast_precision_loss)]
        let total_docs = documents.len() as f64;
        let (vocabulary, idf): (Vec<String>, Vec<f64>) = doc_freq
            .into_iter()
            .map(|(term, df)| {
                #[allow(clippy::cast_precision_loss)]
                let df = df as f64;
                let idf = ((1.0 + total_docs) / (1.0 + df)).ln() + 1.0;
                (term, idf)
            })
            .unzip();

        info!(
            total_docs = documents.len(),
            vocabulary_size = vocabulary.len(),
            "fitted tf-idf vocabulary"
        );

        Ok(Self::from_parts(vocabulary, idf))
    }

    pub(crate) fn from_parts(vocabulary: Vec<String>, idf: Vec<f64>) -> Self {
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        Self {
            vocabulary,
            idf,
            index,
        }
    }

    #[must_use]
    pub fn transform(&self, document: &str) -> SparseVector {
        let lowered = document.to_lowercase();
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens(&lowered) {
            if let Some(&column) = self.index.get(token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(column, count)| (column, count * self.idf[column]))
            .collect();

        let norm = row.iter().map(|(_, value)| value * value).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut row {
                *value /= norm;
            }
        }
        row
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    #[must_use]
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    TOKEN.find_iter(text).map(|found| found.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "factura pago cliente".to_string(),
            "factura envio".to_string(),
            "contrato cliente".to_string(),
        ]
    }

    #[test]
    fn vocabulary_is_sorted_with_smoothed_idf() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        assert_eq!(
            vectorizer.vocabulary(),
            &["cliente", "contrato", "envio", "factura", "pago"]
        );
        // df(factura) = 2, n = 3 -> ln(4 / 3) + 1
        let expected = (4.0_f64 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf()[3] - expected).abs() < 1e-12);
        // df(pago) = 1 -> ln(4 / 2) + 1
        assert!((vectorizer.idf()[4] - (2.0_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn rows_are_unit_length_and_ignore_unknown_terms() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        let row = vectorizer.transform("factura factura desconocido pago");
        let columns: Vec<usize> = row.iter().map(|(column, _)| *column).collect();
        assert_eq!(columns, vec![3, 4]);
        let norm: f64 = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_character_tokens_are_not_features() {
        let vectorizer = TfidfVectorizer::fit(&["a b cc".to_string()]).unwrap();
        assert_eq!(vectorizer.vocabulary(), &["cc"]);
    }

    #[test]
    fn empty_corpus_has_no_vocabulary() {
        let error = TfidfVectorizer::fit(&[String::new(), "x".to_string()]).unwrap_err();
        assert!(matches!(error, ModelError::EmptyVocabulary));
    }

    #[test]
    fn unknown_document_maps_to_empty_row() {
        let vectorizer = TfidfVectorizer::fit(&corpus()).unwrap();
        assert!(vectorizer.transform("nada conocido").is_empty());
    }
}
