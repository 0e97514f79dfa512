//! Offline fitting of the classification pipeline from a labeled CSV.
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

pub mod dataset;
pub mod report;
pub mod split;

pub use dataset::{DatasetColumns, TrainingExample, load_dataset};
pub use report::ClassificationReport;
pub use split::{Split, stratified_split};

use crate::model::{ClassificationModel, ModelError, SvmOptions};
use crate::preprocess::{Language, Preprocessor};

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training dataset not found at {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("column {column:?} is missing from {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("failed to read training dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("training dataset contains no labeled rows")]
    EmptyDataset,

    #[error("invalid train/test split: {0}")]
    InvalidSplit(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    pub columns: DatasetColumns,
    pub test_size: f64,
    pub seed: u64,
    pub language: Language,
}

/// Summary of a finished training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub report: ClassificationReport,
    pub classes: Vec<String>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub output_path: PathBuf,
}

/// Loads the dataset, fits on a stratified train partition, scores the held-out partition
/// and writes the fitted pipeline to `config.output_path`.
///
/// # Errors
/// Any [`TrainingError`]; nothing is written when an earlier step fails.
pub fn run_training(config: &TrainingConfig) -> Result<TrainingOutcome, TrainingError> {
    let examples = load_dataset(&config.data_path, &config.columns)?;
    if examples.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }

    let preprocessor = Preprocessor::new(config.language);
    let (texts, labels): (Vec<String>, Vec<String>) = examples
        .into_iter()
        .map(|example| {
            (
                preprocessor.preprocess(example.raw_text.as_deref()),
                example.category,
            )
        })
        .unzip();
    info!(
        rows = texts.len(),
        language = %config.language,
        "preprocessed training texts"
    );

    let split = stratified_split(&labels, config.test_size, config.seed)?;
    info!(
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        seed = config.seed,
        "split dataset"
    );

    let pick = |indices: &[usize], source: &[String]| -> Vec<String> {
        indices.iter().map(|&i| source[i].clone()).collect()
    };
    let train_texts = pick(&split.train, &texts);
    let train_labels = pick(&split.train, &labels);
    let test_texts = pick(&split.test, &texts);
    let test_labels = pick(&split.test, &labels);

    let options = SvmOptions {
        seed: config.seed,
        ..SvmOptions::default()
    };
    let model = ClassificationModel::fit(&train_texts, &train_labels, config.language, &options)?;

    let predicted: Vec<String> = test_texts
        .iter()
        .map(|text| model.predict(text).to_string())
        .collect();
    let report = ClassificationReport::from_predictions(&test_labels, &predicted);
    info!(accuracy = report.accuracy, "evaluated held-out split");

    model.save(&config.output_path)?;
    info!(path = %config.output_path.display(), "model written");

    Ok(TrainingOutcome {
        report,
        classes: model.classes().to_vec(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        output_path: config.output_path.clone(),
    })
}
