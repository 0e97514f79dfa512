use std::collections::BTreeSet;
use std::path::Path;

use tracing::{info, warn};

use super::TrainingError;

pub const DEFAULT_TEXT_COLUMN: &str = "texto_documento";
pub const DEFAULT_LABEL_COLUMN: &str = "categoria";

/// Header names of the text and label columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetColumns {
    pub text: String,
    pub label: String,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_COLUMN.to_string(),
            label: DEFAULT_LABEL_COLUMN.to_string(),
        }
    }
}

/// One labeled row. An empty text cell is kept as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub raw_text: Option<String>,
    pub category: String,
}

/// Reads labeled examples from a CSV file with a header row.
///
/// # Errors
/// Returns [`TrainingError::DatasetNotFound`] when `path` does not exist,
/// [`TrainingError::MissingColumn`] when either column is absent from the header and
/// [`TrainingError::Csv`] on malformed input.
pub fn load_dataset(
    path: &Path,
    columns: &DatasetColumns,
) -> Result<Vec<TrainingExample>, TrainingError> {
    if !path.exists() {
        return Err(TrainingError::DatasetNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or_else(|| TrainingError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            })
    };
    let text_index = column_index(&columns.text)?;
    let label_index = column_index(&columns.label)?;

    let mut examples = Vec::new();
    let mut skipped = 0_usize;
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let Some(category) = record
            .get(label_index)
            .map(str::trim)
            .filter(|category| !category.is_empty())
        else {
            skipped += 1;
            warn!(row = line + 1, "skipping row without a category");
            continue;
        };

        let raw_text = record
            .get(text_index)
            .filter(|text| !text.trim().is_empty())
            .map(ToString::to_string);

        examples.push(TrainingExample {
            raw_text,
            category: category.to_string(),
        });
    }

    let categories: BTreeSet<&str> = examples.iter().map(|e| e.category.as_str()).collect();
    info!(
        path = %path.display(),
        rows = examples.len(),
        skipped,
        categories = ?categories,
        "loaded training dataset"
    );

    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_default_columns_and_keeps_blank_text() {
        let file = write_csv(
            "id,texto_documento,categoria\n\
             1,\"Balance del trimestre, con ingresos\",finanzas\n\
             2,,deportes\n",
        );
        let examples = load_dataset(file.path(), &DatasetColumns::default()).unwrap();
        assert_eq!(
            examples,
            vec![
                TrainingExample {
                    raw_text: Some("Balance del trimestre, con ingresos".to_string()),
                    category: "finanzas".to_string(),
                },
                TrainingExample {
                    raw_text: None,
                    category: "deportes".to_string(),
                },
            ]
        );
    }

    #[test]
    fn rows_without_category_are_skipped() {
        let file = write_csv("texto_documento,categoria\nuno,finanzas\ndos,\ntres\n");
        let examples = load_dataset(file.path(), &DatasetColumns::default()).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].category, "finanzas");
    }

    #[test]
    fn custom_columns_are_honoured() {
        let file = write_csv("body,label\nhello world,greeting\n");
        let columns = DatasetColumns {
            text: "body".to_string(),
            label: "label".to_string(),
        };
        let examples = load_dataset(file.path(), &columns).unwrap();
        assert_eq!(examples[0].raw_text.as_deref(), Some("hello world"));
    }

    #[test]
    fn missing_column_is_reported() {
        let file = write_csv("texto,categoria\nuno,finanzas\n");
        let error = load_dataset(file.path(), &DatasetColumns::default()).unwrap_err();
        assert!(
            matches!(error, TrainingError::MissingColumn { ref column, .. } if column == "texto_documento")
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let error =
            load_dataset(&dir.path().join("reportes.csv"), &DatasetColumns::default()).unwrap_err();
        assert!(matches!(error, TrainingError::DatasetNotFound(_)));
    }
}
