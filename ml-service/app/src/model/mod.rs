//! Fitted TF-IDF + linear SVM pipeline.
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

mod artifact;
pub mod svm;
pub mod tfidf;

use artifact::{ARTIFACT_VERSION, MachineWeights, ModelArtifact};
pub use svm::{LinearSvc, SvmOptions};
pub use tfidf::{SparseVector, TfidfVectorizer};

use crate::preprocess::{Language, Preprocessor};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found at {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("failed to access model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize model artifact: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("training texts produced an empty vocabulary")]
    EmptyVocabulary,

    #[error("at least two categories are required to fit a classifier, found {0}")]
    TooFewClasses(usize),

    #[error("got {texts} texts but {labels} labels")]
    LengthMismatch { texts: usize, labels: usize },
}

/// The fitted pipeline: the preprocessing language, the vectorizer and the classifier.
///
/// Immutable once built, so a single instance can be shared across request handlers.
#[derive(Debug, Clone)]
pub struct ClassificationModel {
    language: Language,
    vectorizer: TfidfVectorizer,
    classifier: LinearSvc,
}

impl ClassificationModel {
    /// Fits the vectorizer and the classifier on already preprocessed `texts`.
    ///
    /// # Errors
    /// See [`TfidfVectorizer::fit`] and [`LinearSvc::fit`].
    pub fn fit(
        texts: &[String],
        labels: &[String],
        language: Language,
        options: &SvmOptions,
    ) -> Result<Self, ModelError> {
        if texts.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                texts: texts.len(),
                labels: labels.len(),
            });
        }

        let vectorizer = TfidfVectorizer::fit(texts)?;
        let rows: Vec<SparseVector> = texts
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect();
        let classifier = LinearSvc::fit(&rows, labels, vectorizer.len(), options)?;

        Ok(Self {
            language,
            vectorizer,
            classifier,
        })
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// A preprocessor configured exactly as the one used during training.
    #[must_use]
    pub fn preprocessor(&self) -> Preprocessor {
        Preprocessor::new(self.language)
    }

    /// Categories seen during training, sorted.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    #[must_use]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Predicts the category of an already preprocessed text.
    #[must_use]
    pub fn predict(&self, preprocessed: &str) -> &str {
        let row = self.vectorizer.transform(preprocessed);
        &self.classifier.classes()[self.classifier.predict(&row)]
    }

    /// Category probabilities for an already preprocessed text, most likely first.
    #[must_use]
    pub fn predict_proba(&self, preprocessed: &str) -> Vec<(String, f64)> {
        let row = self.vectorizer.transform(preprocessed);
        let mut ranked: Vec<(String, f64)> = self
            .classifier
            .classes()
            .iter()
            .cloned()
            .zip(self.classifier.predict_proba(&row))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Writes the pipeline as a single JSON artifact, creating parent directories.
    ///
    /// # Errors
    /// Returns [`ModelError::Io`] or [`ModelError::Serde`] when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let io_error = |source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let artifact = ModelArtifact {
            version: ARTIFACT_VERSION,
            language: self.language,
            vocabulary: self.vectorizer.vocabulary().to_vec(),
            idf: self.vectorizer.idf().to_vec(),
            classes: self.classifier.classes().to_vec(),
            machines: self
                .classifier
                .machines()
                .iter()
                .map(MachineWeights::from)
                .collect(),
        };

        let file = fs::File::create(path).map_err(io_error)?;
        serde_json::to_writer(BufWriter::new(file), &artifact)?;
        info!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Loads and validates a pipeline artifact.
    ///
    /// # Errors
    /// Returns [`ModelError::ArtifactNotFound`] when the file does not exist and
    /// [`ModelError::InvalidArtifact`] when its contents are inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelError::ArtifactNotFound(path.to_path_buf())
            } else {
                ModelError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))?;
        artifact.validate()?;

        let dimension = artifact.vocabulary.len();
        let vectorizer = TfidfVectorizer::from_parts(artifact.vocabulary, artifact.idf);
        let classifier = LinearSvc::from_parts(
            artifact.classes,
            dimension,
            artifact.machines.into_iter().map(Into::into).collect(),
        );

        info!(
            path = %path.display(),
            language = %artifact.language,
            classes = classifier.classes().len(),
            vocabulary_size = dimension,
            "loaded model artifact"
        );

        Ok(Self {
            language: artifact.language,
            vectorizer,
            classifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> ClassificationModel {
        let texts: Vec<String> = [
            "balance ingresos trimestre",
            "ingresos gastos balance",
            "presupuesto gastos ingresos",
            "partido liga goles",
            "goles jugadores partido",
            "liga campeonato jugadores",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        let labels: Vec<String> = ["finanzas", "finanzas", "finanzas", "deportes", "deportes", "deportes"]
            .iter()
            .map(ToString::to_string)
            .collect();
        ClassificationModel::fit(&texts, &labels, Language::Spanish, &SvmOptions::default())
            .unwrap()
    }

    #[test]
    fn predicts_training_vocabulary() {
        let model = fitted();
        assert_eq!(model.classes(), &["deportes", "finanzas"]);
        assert_eq!(model.predict("ingresos balance"), "finanzas");
        assert_eq!(model.predict("goles partido"), "deportes");
    }

    #[test]
    fn probabilities_are_ranked() {
        let model = fitted();
        let ranked = model.predict_proba("ingresos gastos");
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].1 >= ranked[1].1);
        let total: f64 = ranked.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn artifact_round_trip_keeps_predictions() {
        let model = fitted();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trained_model.json");

        model.save(&path).unwrap();
        let loaded = ClassificationModel::load(&path).unwrap();

        assert_eq!(loaded.classes(), model.classes());
        assert_eq!(loaded.language(), Language::Spanish);
        for text in ["ingresos balance", "goles partido", "texto desconocido"] {
            assert_eq!(loaded.predict(text), model.predict(text));
        }
    }

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let error = ClassificationModel::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(error, ModelError::ArtifactNotFound(_)));
    }

    #[test]
    fn inconsistent_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(
            &path,
            r#"{"version":1,"language":"spanish","vocabulary":["uno"],"idf":[1.0,2.0],
                "classes":["a","b"],"machines":[]}"#,
        )
        .unwrap();
        let error = ClassificationModel::load(&path).unwrap_err();
        assert!(matches!(error, ModelError::InvalidArtifact(_)));
    }
}
