use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use ml_service::app::tracing::init_tracing;
use ml_service::preprocess::Language;
use ml_service::training::{DatasetColumns, TrainingConfig, run_training};
use ml_service::training::dataset::{DEFAULT_LABEL_COLUMN, DEFAULT_TEXT_COLUMN};

/// Fit the document classifier on a labeled CSV and write the pipeline artifact.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Labeled training data (CSV with a header row)
    #[arg(long, env = "TRAIN_DATA_PATH", default_value = "training/data/reportes.csv")]
    data: PathBuf,

    /// Where the fitted pipeline is written
    #[arg(long, env = "ML_MODEL_PATH", default_value = "model/trained_model.json")]
    output: PathBuf,

    /// Column holding the raw document text
    #[arg(long, env = "TRAIN_TEXT_COLUMN", default_value = DEFAULT_TEXT_COLUMN)]
    text_column: String,

    /// Column holding the category label
    #[arg(long, env = "TRAIN_LABEL_COLUMN", default_value = DEFAULT_LABEL_COLUMN)]
    label_column: String,

    /// Fraction of rows held out for evaluation
    #[arg(long, env = "TRAIN_TEST_SIZE", default_value = "0.2")]
    test_size: f64,

    /// Seed for the split and the classifier
    #[arg(long, env = "TRAIN_SEED", default_value = "42")]
    seed: u64,

    /// Stop-word language used by the preprocessor
    #[arg(long, env = "TRAIN_LANGUAGE", default_value = "spanish")]
    language: Language,
}

fn main() {
    init_tracing();

    if let Err(error) = run(Cli::parse()) {
        tracing::error!(error = %format!("{error:#}"), "training failed");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = TrainingConfig {
        data_path: cli.data,
        output_path: cli.output,
        columns: DatasetColumns {
            text: cli.text_column,
            label: cli.label_column,
        },
        test_size: cli.test_size,
        seed: cli.seed,
        language: cli.language,
    };

    let outcome = run_training(&config)
        .with_context(|| format!("training from {}", config.data_path.display()))?;

    println!("{}", outcome.report);
    tracing::info!(
        path = %outcome.output_path.display(),
        classes = ?outcome.classes,
        train_rows = outcome.train_rows,
        test_rows = outcome.test_rows,
        "model trained and saved"
    );
    Ok(())
}
