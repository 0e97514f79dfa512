//! On-disk representation of a fitted pipeline.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ModelError;
use super::svm::BinaryMachine;
use crate::preprocess::Language;

pub(crate) const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ModelArtifact {
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) language: Language,
    pub(crate) vocabulary: Vec<String>,
    pub(crate) idf: Vec<f64>,
    pub(crate) classes: Vec<String>,
    pub(crate) machines: Vec<MachineWeights>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MachineWeights {
    pub(crate) positive: usize,
    pub(crate) negative: usize,
    pub(crate) weights: Vec<f64>,
    pub(crate) bias: f64,
    pub(crate) prob_a: f64,
    pub(crate) prob_b: f64,
}

impl From<&BinaryMachine> for MachineWeights {
    fn from(machine: &BinaryMachine) -> Self {
        Self {
            positive: machine.positive,
            negative: machine.negative,
            weights: machine.weights.clone(),
            bias: machine.bias,
            prob_a: machine.prob_a,
            prob_b: machine.prob_b,
        }
    }
}

impl From<MachineWeights> for BinaryMachine {
    fn from(weights: MachineWeights) -> Self {
        Self {
            positive: weights.positive,
            negative: weights.negative,
            weights: weights.weights,
            bias: weights.bias,
            prob_a: weights.prob_a,
            prob_b: weights.prob_b,
        }
    }
}

fn invalid(message: impl Into<String>) -> ModelError {
    ModelError::InvalidArtifact(message.into())
}

impl ModelArtifact {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.version != ARTIFACT_VERSION {
            return Err(invalid(format!(
                "unsupported artifact version {} (expected {ARTIFACT_VERSION})",
                self.version
            )));
        }
        if self.vocabulary.is_empty() {
            return Err(invalid("vocabulary is empty"));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(invalid("idf length does not match vocabulary"));
        }
        if self.classes.len() < 2 {
            return Err(invalid("at least two classes are required"));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(invalid("classes must be sorted and unique"));
        }

        let expected_machines = self.classes.len() * (self.classes.len() - 1) / 2;
        if self.machines.len() != expected_machines {
            return Err(invalid(format!(
                "expected {expected_machines} pairwise machines, found {}",
                self.machines.len()
            )));
        }
        let mut pairs = BTreeSet::new();
        for machine in &self.machines {
            if machine.positive >= machine.negative || machine.negative >= self.classes.len() {
                return Err(invalid(format!(
                    "machine pair ({}, {}) is out of range",
                    machine.positive, machine.negative
                )));
            }
            if machine.weights.len() != self.vocabulary.len() {
                return Err(invalid("machine weight length does not match vocabulary"));
            }
            if !pairs.insert((machine.positive, machine.negative)) {
                return Err(invalid(format!(
                    "machine pair ({}, {}) appears more than once",
                    machine.positive, machine.negative
                )));
            }
        }
        Ok(())
    }
}
