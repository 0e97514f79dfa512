//! Linear support vector classifier.
//!
//! Multi-class problems are decomposed one-vs-one. Each binary machine is trained with
//! dual coordinate descent on the hinge loss, and carries a Platt sigmoid fitted on
//! cross-validated decision values so the classifier can report class probabilities.
use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use super::ModelError;
use super::tfidf::SparseVector;

const MIN_PAIRWISE_PROBABILITY: f64 = 1e-7;

/// Hyper-parameters for [`LinearSvc::fit`].
#[derive(Debug, Clone, Copy)]
pub struct SvmOptions {
    /// Penalty for margin violations.
    pub c: f64,
    /// Stop once the projected gradient gap falls below this value.
    pub tolerance: f64,
    pub max_epochs: usize,
    /// Folds used to collect decision values for the probability sigmoid.
    pub probability_folds: usize,
    pub seed: u64,
}

impl Default for SvmOptions {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 0.1,
            max_epochs: 1000,
            probability_folds: 5,
            seed: 42,
        }
    }
}

/// One binary machine of the one-vs-one ensemble. A positive decision value votes for
/// `positive`.
#[derive(Debug, Clone)]
pub(crate) struct BinaryMachine {
    pub(crate) positive: usize,
    pub(crate) negative: usize,
    pub(crate) weights: Vec<f64>,
    pub(crate) bias: f64,
    pub(crate) prob_a: f64,
    pub(crate) prob_b: f64,
}

impl BinaryMachine {
    fn decision(&self, row: &SparseVector) -> f64 {
        decision_value(&self.weights, self.bias, row)
    }

    fn positive_probability(&self, row: &SparseVector) -> f64 {
        sigmoid_predict(self.decision(row), self.prob_a, self.prob_b)
            .clamp(MIN_PAIRWISE_PROBABILITY, 1.0 - MIN_PAIRWISE_PROBABILITY)
    }
}

#[derive(Debug, Clone)]
pub struct LinearSvc {
    classes: Vec<String>,
    dimension: usize,
    machines: Vec<BinaryMachine>,
}

impl LinearSvc {
    /// Fits one binary machine per pair of classes.
    ///
    /// # Errors
    /// Fails when `rows` and `labels` differ in length or fewer than two distinct labels
    /// are present.
    pub fn fit(
        rows: &[SparseVector],
        labels: &[String],
        dimension: usize,
        options: &SvmOptions,
    ) -> Result<Self, ModelError> {
        if rows.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                texts: rows.len(),
                labels: labels.len(),
            });
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() < 2 {
            return Err(ModelError::TooFewClasses(classes.len()));
        }

        let class_of: Vec<usize> = labels
            .iter()
            .map(|label| classes.partition_point(|class| class < label))
            .collect();

        let mut rng = StdRng::seed_from_u64(options.seed);
        let mut machines = Vec::with_capacity(classes.len() * (classes.len() - 1) / 2);

        for positive in 0..classes.len() {
            for negative in positive + 1..classes.len() {
                let mut pair_rows = Vec::new();
                let mut targets = Vec::new();
                for (row, &class) in rows.iter().zip(&class_of) {
                    if class == positive {
                        pair_rows.push(row);
                        targets.push(1.0);
                    } else if class == negative {
                        pair_rows.push(row);
                        targets.push(-1.0);
                    }
                }

                let (prob_a, prob_b) =
                    fit_probability(&pair_rows, &targets, dimension, options, &mut rng);
                let (weights, bias) =
                    train_binary(&pair_rows, &targets, dimension, options, &mut rng);

                debug!(
                    positive = %classes[positive],
                    negative = %classes[negative],
                    samples = pair_rows.len(),
                    prob_a,
                    prob_b,
                    "trained pairwise machine"
                );

                machines.push(BinaryMachine {
                    positive,
                    negative,
                    weights,
                    bias,
                    prob_a,
                    prob_b,
                });
            }
        }

        info!(
            classes = classes.len(),
            machines = machines.len(),
            samples = rows.len(),
            "fitted one-vs-one linear svm"
        );

        Ok(Self {
            classes,
            dimension,
            machines,
        })
    }

    pub(crate) fn from_parts(
        classes: Vec<String>,
        dimension: usize,
        machines: Vec<BinaryMachine>,
    ) -> Self {
        Self {
            classes,
            dimension,
            machines,
        }
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub(crate) fn machines(&self) -> &[BinaryMachine] {
        &self.machines
    }

    /// Returns the index of the class with the most pairwise votes. Ties resolve to the
    /// lowest index.
    #[must_use]
    pub fn predict(&self, row: &SparseVector) -> usize {
        let mut votes = vec![0_usize; self.classes.len()];
        for machine in &self.machines {
            if machine.decision(row) > 0.0 {
                votes[machine.positive] += 1;
            } else {
                votes[machine.negative] += 1;
            }
        }

        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        best
    }

    /// Class probabilities in class-index order, summing to one.
    #[must_use]
    pub fn predict_proba(&self, row: &SparseVector) -> Vec<f64> {
        let k = self.classes.len();
        let mut pairwise = vec![vec![0.0; k]; k];
        for machine in &self.machines {
            let p = machine.positive_probability(row);
            pairwise[machine.positive][machine.negative] = p;
            pairwise[machine.negative][machine.positive] = 1.0 - p;
        }
        couple_pairwise(&pairwise)
    }
}

fn decision_value(weights: &[f64], bias: f64, row: &SparseVector) -> f64 {
    row.iter()
        .filter_map(|&(column, value)| weights.get(column).map(|w| w * value))
        .sum::<f64>()
        + bias
}

/// Dual coordinate descent for the L1-loss SVM. The bias is learned as the weight of a
/// constant feature.
fn train_binary(
    rows: &[&SparseVector],
    targets: &[f64],
    dimension: usize,
    options: &SvmOptions,
    rng: &mut StdRng,
) -> (Vec<f64>, f64) {
    let mut weights = vec![0.0; dimension];
    let mut bias = 0.0;
    let mut alpha = vec![0.0; rows.len()];
    let diagonal: Vec<f64> = rows
        .iter()
        .map(|row| row.iter().map(|(_, v)| v * v).sum::<f64>() + 1.0)
        .collect();
    let mut order: Vec<usize> = (0..rows.len()).collect();

    for epoch in 0..options.max_epochs {
        order.shuffle(rng);
        let mut gap_max = f64::NEG_INFINITY;
        let mut gap_min = f64::INFINITY;

        for &i in &order {
            let gradient = targets[i] * decision_value(&weights, bias, rows[i]) - 1.0;
            let projected = if alpha[i] <= 0.0 {
                gradient.min(0.0)
            } else if alpha[i] >= options.c {
                gradient.max(0.0)
            } else {
                gradient
            };
            gap_max = gap_max.max(projected);
            gap_min = gap_min.min(projected);

            if projected.abs() > 1e-12 {
                let previous = alpha[i];
                alpha[i] = (alpha[i] - gradient / diagonal[i]).clamp(0.0, options.c);
                let step = (alpha[i] - previous) * targets[i];
                for &(column, value) in rows[i] {
                    weights[column] += step * value;
                }
                bias += step;
            }
        }

        if gap_max - gap_min < options.tolerance {
            debug!(epochs = epoch + 1, "binary svm converged");
            break;
        }
    }

    (weights, bias)
}

/// Collects out-of-fold decision values and fits a Platt sigmoid on them.
fn fit_probability(
    rows: &[&SparseVector],
    targets: &[f64],
    dimension: usize,
    options: &SvmOptions,
    rng: &mut StdRng,
) -> (f64, f64) {
    let total = rows.len();
    let folds = options.probability_folds.clamp(1, total.max(1));
    let mut permutation: Vec<usize> = (0..total).collect();
    permutation.shuffle(rng);
    let mut decisions = vec![0.0; total];

    for fold in 0..folds {
        let begin = fold * total / folds;
        let end = (fold + 1) * total / folds;

        let mut fold_rows = Vec::with_capacity(total - (end - begin));
        let mut fold_targets = Vec::with_capacity(total - (end - begin));
        for &index in permutation[..begin].iter().chain(&permutation[end..]) {
            fold_rows.push(rows[index]);
            fold_targets.push(targets[index]);
        }

        let positives = fold_targets.iter().filter(|&&t| t > 0.0).count();
        let negatives = fold_targets.len() - positives;

        let held_out = &permutation[begin..end];
        match (positives, negatives) {
            (0, 0) => held_out.iter().for_each(|&index| decisions[index] = 0.0),
            (_, 0) => held_out.iter().for_each(|&index| decisions[index] = 1.0),
            (0, _) => held_out.iter().for_each(|&index| decisions[index] = -1.0),
            _ => {
                let (weights, bias) =
                    train_binary(&fold_rows, &fold_targets, dimension, options, rng);
                for &index in held_out {
                    decisions[index] = decision_value(&weights, bias, rows[index]);
                }
            }
        }
    }

    sigmoid_train(&decisions, targets)
}

/// Platt scaling with the Newton method and backtracking line search of Lin, Lin and
/// Weng (2007). Returns `(A, B)` for `P(y = 1 | f) = 1 / (1 + exp(A f + B))`.
fn sigmoid_train(decisions: &[f64], targets: &[f64]) -> (f64, f64) {
    const MAX_ITERATIONS: usize = 100;
    const MIN_STEP: f64 = 1e-10;
    const SIGMA: f64 = 1e-12;
    const EPSILON: f64 = 1e-5;

    #[allow(clippy::cast_precision_loss)]
    let prior_positive = targets.iter().filter(|&&t| t > 0.0).count() as f64;
    #[allow(clippy::cast_precision_loss)]
    let prior_negative = targets.len() as f64 - prior_positive;

    let high_target = (prior_positive + 1.0) / (prior_positive + 2.0);
    let low_target = 1.0 / (prior_negative + 2.0);
    let smoothed: Vec<f64> = targets
        .iter()
        .map(|&t| if t > 0.0 { high_target } else { low_target })
        .collect();

    let objective = |a: f64, b: f64| -> f64 {
        decisions
            .iter()
            .zip(&smoothed)
            .map(|(&f, &t)| {
                let f_apb = f * a + b;
                if f_apb >= 0.0 {
                    t * f_apb + (-f_apb).exp().ln_1p()
                } else {
                    (t - 1.0) * f_apb + f_apb.exp().ln_1p()
                }
            })
            .sum()
    };

    let mut a = 0.0;
    let mut b = ((prior_negative + 1.0) / (prior_positive + 1.0)).ln();
    let mut value = objective(a, b);

    for _ in 0..MAX_ITERATIONS {
        let mut h11 = SIGMA;
        let mut h22 = SIGMA;
        let mut h21 = 0.0;
        let mut g1 = 0.0;
        let mut g2 = 0.0;
        for (&f, &t) in decisions.iter().zip(&smoothed) {
            let f_apb = f * a + b;
            let (p, q) = if f_apb >= 0.0 {
                let e = (-f_apb).exp();
                (e / (1.0 + e), 1.0 / (1.0 + e))
            } else {
                let e = f_apb.exp();
                (1.0 / (1.0 + e), e / (1.0 + e))
            };
            let d2 = p * q;
            h11 += f * f * d2;
            h22 += d2;
            h21 += f * d2;
            let d1 = t - p;
            g1 += f * d1;
            g2 += d1;
        }

        if g1.abs() < EPSILON && g2.abs() < EPSILON {
            break;
        }

        let det = h11 * h22 - h21 * h21;
        let delta_a = -(h22 * g1 - h21 * g2) / det;
        let delta_b = -(-h21 * g1 + h11 * g2) / det;
        let descent = g1 * delta_a + g2 * delta_b;

        let mut step = 1.0;
        while step >= MIN_STEP {
            let candidate_a = a + step * delta_a;
            let candidate_b = b + step * delta_b;
            let candidate = objective(candidate_a, candidate_b);
            if candidate < value + 0.0001 * step * descent {
                a = candidate_a;
                b = candidate_b;
                value = candidate;
                break;
            }
            step /= 2.0;
        }

        if step < MIN_STEP {
            debug!("platt scaling line search failed");
            break;
        }
    }

    (a, b)
}

fn sigmoid_predict(decision: f64, a: f64, b: f64) -> f64 {
    let f_apb = decision * a + b;
    if f_apb >= 0.0 {
        let e = (-f_apb).exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + f_apb.exp())
    }
}

/// Couples pairwise probabilities `r[i][j] = P(i | i or j)` into class probabilities
/// (Wu, Lin and Weng 2004, method 2).
fn couple_pairwise(pairwise: &[Vec<f64>]) -> Vec<f64> {
    let k = pairwise.len();
    #[allow(clippy::cast_precision_loss)]
    let k_f = k as f64;
    let max_iterations = 100.max(k);
    let epsilon = 0.005 / k_f;

    let mut q = vec![vec![0.0; k]; k];
    for t in 0..k {
        for j in 0..k {
            if j == t {
                continue;
            }
            q[t][t] += pairwise[j][t] * pairwise[j][t];
            q[t][j] = -pairwise[j][t] * pairwise[t][j];
        }
    }

    let mut p = vec![1.0 / k_f; k];
    let mut qp = vec![0.0; k];

    for _ in 0..max_iterations {
        let mut pqp = 0.0;
        for t in 0..k {
            qp[t] = (0..k).map(|j| q[t][j] * p[j]).sum();
            pqp += p[t] * qp[t];
        }

        let max_error = qp
            .iter()
            .map(|value| (value - pqp).abs())
            .fold(0.0, f64::max);
        if max_error < epsilon {
            break;
        }

        for t in 0..k {
            let diff = (-qp[t] + pqp) / q[t][t];
            p[t] += diff;
            pqp = (pqp + diff * (diff * q[t][t] + 2.0 * qp[t])) / (1.0 + diff) / (1.0 + diff);
            for j in 0..k {
                qp[j] = (qp[j] + diff * q[t][j]) / (1.0 + diff);
                p[j] /= 1.0 + diff;
            }
        }
    }

    p
}
