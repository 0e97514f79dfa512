use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Default, Clone, Copy)]
struct LabelStats {
    true_positive: usize,
    false_positive: usize,
    false_negative: usize,
    support: usize,
}

/// Precision, recall and F1 of one category, or of an average row.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScores {
    pub category: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-category scores of a held-out evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub categories: Vec<CategoryScores>,
    pub accuracy: f64,
    pub macro_avg: CategoryScores,
    pub weighted_avg: CategoryScores,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl ClassificationReport {
    /// Builds the report from aligned expected and predicted labels. Categories that only
    /// appear among the predictions get a row with zero support.
    #[must_use]
    pub fn from_predictions(expected: &[String], predicted: &[String]) -> Self {
        let labels: BTreeSet<&str> = expected
            .iter()
            .chain(predicted)
            .map(String::as_str)
            .collect();
        let mut per_label: BTreeMap<&str, LabelStats> =
            labels.into_iter().map(|label| (label, LabelStats::default())).collect();

        let mut correct = 0_usize;
        for (truth, guess) in expected.iter().zip(predicted) {
            if let Some(stats) = per_label.get_mut(truth.as_str()) {
                stats.support += 1;
            }
            if truth == guess {
                correct += 1;
                if let Some(stats) = per_label.get_mut(truth.as_str()) {
                    stats.true_positive += 1;
                }
            } else {
                if let Some(stats) = per_label.get_mut(truth.as_str()) {
                    stats.false_negative += 1;
                }
                if let Some(stats) = per_label.get_mut(guess.as_str()) {
                    stats.false_positive += 1;
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let categories: Vec<CategoryScores> = per_label
            .into_iter()
            .map(|(label, stats)| {
                let tp = stats.true_positive as f64;
                let precision = ratio(tp, tp + stats.false_positive as f64);
                let recall = ratio(tp, tp + stats.false_negative as f64);
                CategoryScores {
                    category: label.to_string(),
                    precision,
                    recall,
                    f1: ratio(2.0 * precision * recall, precision + recall),
                    support: stats.support,
                }
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let weighted_avg = average("weighted avg", &categories, |row| row.support as f64);
        let macro_avg = average("macro avg", &categories, |_| 1.0);

        #[allow(clippy::cast_precision_loss)]
        let accuracy = ratio(correct as f64, expected.len().min(predicted.len()) as f64);

        Self {
            categories,
            accuracy,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WEIGHTED: &str = "weighted avg";
        let width = self
            .categories
            .iter()
            .map(|row| row.category.chars().count())
            .max()
            .unwrap_or(0)
            .max(WEIGHTED.len());

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for row in &self.categories {
            write_row(f, row, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, &self.macro_avg, width)?;
        write_row(f, &self.weighted_avg, width)
    }
}

fn average(
    name: &str,
    categories: &[CategoryScores],
    weight: impl Fn(&CategoryScores) -> f64,
) -> CategoryScores {
    let weight_sum: f64 = categories.iter().map(&weight).sum();
    let mean = |metric: fn(&CategoryScores) -> f64| {
        ratio(
            categories.iter().map(|row| metric(row) * weight(row)).sum(),
            weight_sum,
        )
    };
    CategoryScores {
        category: name.to_string(),
        precision: mean(|row| row.precision),
        recall: mean(|row| row.recall),
        f1: mean(|row| row.f1),
        support: categories.iter().map(|row| row.support).sum(),
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &CategoryScores, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        row.category, row.precision, row.recall, row.f1, row.support
    )
}
