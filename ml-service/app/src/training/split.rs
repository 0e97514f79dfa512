//! Stratified train/test split.
use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::TrainingError;

/// Row indices of each partition, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits row indices so that every class keeps roughly its share in both partitions.
///
/// The test partition holds `ceil(test_size * n)` rows. Each class first receives the
/// floor of its proportional share, clamped so it keeps at least one row on each side;
/// leftover slots go to the classes with the largest remaining share, ties to the
/// lexicographically first class.
///
/// # Errors
/// Returns [`TrainingError::InvalidSplit`] when `test_size` is outside `(0, 1)`, a class
/// has fewer than two rows, or either partition would be smaller than the number of
/// classes.
pub fn stratified_split(
    labels: &[String],
    test_size: f64,
    seed: u64,
) -> Result<Split, TrainingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::InvalidSplit(format!(
            "test size must be between 0 and 1, got {test_size}"
        )));
    }

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        groups.entry(label.as_str()).or_default().push(index);
    }

    if let Some((label, members)) = groups.iter().find(|(_, members)| members.len() < 2) {
        return Err(TrainingError::InvalidSplit(format!(
            "category {label:?} has {} example(s); at least 2 are required",
            members.len()
        )));
    }

    let total = labels.len();
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let test_total = (test_size * total as f64).ceil() as usize;
    let train_total = total - test_total;
    let class_count = groups.len();
    if test_total < class_count || train_total < class_count {
        return Err(TrainingError::InvalidSplit(format!(
            "{total} examples cannot be split into {train_total} train / {test_total} test rows \
             covering all {class_count} categories"
        )));
    }

    let allocation = allocate(&groups, total, test_total);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(train_total);
    let mut test = Vec::with_capacity(test_total);
    for (members, take) in groups.into_values().zip(allocation) {
        let mut members = members;
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }
    train.sort_unstable();
    test.sort_unstable();

    Ok(Split { train, test })
}

/// Number of test rows per class, in the iteration order of `groups`.
fn allocate(groups: &BTreeMap<&str, Vec<usize>>, total: usize, test_total: usize) -> Vec<usize> {
    #[allow(clippy::cast_precision_loss)]
    let shares: Vec<f64> = groups
        .values()
        .map(|members| test_total as f64 * members.len() as f64 / total as f64)
        .collect();
    let capacity: Vec<usize> = groups.values().map(|members| members.len() - 1).collect();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut allocation: Vec<usize> = shares
        .iter()
        .zip(&capacity)
        .map(|(share, &cap)| (share.floor() as usize).clamp(1, cap))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let remainder = |allocation: &[usize], class: usize| shares[class] - allocation[class] as f64;

    let mut assigned: usize = allocation.iter().sum();
    while assigned < test_total {
        let mut best: Option<usize> = None;
        for class in 0..allocation.len() {
            if allocation[class] >= capacity[class] {
                continue;
            }
            if best.is_none_or(|b| remainder(&allocation, class) > remainder(&allocation, b)) {
                best = Some(class);
            }
        }
        let Some(class) = best else { break };
        allocation[class] += 1;
        assigned += 1;
    }
    while assigned > test_total {
        let mut worst: Option<usize> = None;
        for class in 0..allocation.len() {
            if allocation[class] <= 1 {
                continue;
            }
            if worst.is_none_or(|w| remainder(&allocation, class) < remainder(&allocation, w)) {
                worst = Some(class);
            }
        }
        let Some(class) = worst else { break };
        allocation[class] -= 1;
        assigned -= 1;
    }

    allocation
}
