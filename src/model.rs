use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::features::FeatureTable;
use crate::pipeline::{Dataset, RowKey};
use crate::valuation::ProbabilityRow;

pub trait ProbabilityModel {
    fn fit(&mut self, features: &FeatureTable, outcomes: &[bool]) -> Result<()>;

    /// One probability in `[0, 1]` per feature row.
    fn predict(&self, features: &FeatureTable) -> Vec<f64>;
}

/// Predicts the training positive rate for every row.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BaseRateModel {
    pub rate: f64,
}

impl ProbabilityModel for BaseRateModel {
    fn fit(&mut self, features: &FeatureTable, outcomes: &[bool]) -> Result<()> {
        check_fit_inputs(features, outcomes)?;
        let positives = outcomes.iter().filter(|y| **y).count();
        self.rate = if outcomes.is_empty() {
            0.0
        } else {
            positives as f64 / outcomes.len() as f64
        };
        debug!(rows = outcomes.len(), rate = self.rate, "fitted base-rate model");
        Ok(())
    }

    fn predict(&self, features: &FeatureTable) -> Vec<f64> {
        vec![self.rate; features.len()]
    }
}

/// Runs both models over a dataset and keys the results by row.
pub fn predict_probabilities(
    scores_model: &dyn ProbabilityModel,
    concedes_model: &dyn ProbabilityModel,
    dataset: &Dataset,
) -> Result<Vec<ProbabilityRow>> {
    dataset.check_aligned()?;
    let scores = scores_model.predict(&dataset.features);
    let concedes = concedes_model.predict(&dataset.features);
    keyed_probabilities(&dataset.keys, &scores, &concedes)
}

/// Pairs externally produced probability series with their row keys.
pub fn keyed_probabilities(
    keys: &[RowKey],
    scores: &[f64],
    concedes: &[f64],
) -> Result<Vec<ProbabilityRow>> {
    if scores.len() != keys.len() || concedes.len() != keys.len() {
        return Err(PipelineError::Misaligned(format!(
            "keys={} scores={} concedes={}",
            keys.len(),
            scores.len(),
            concedes.len()
        )));
    }
    Ok(keys
        .iter()
        .zip(scores.iter().zip(concedes))
        .map(|(key, (s, c))| ProbabilityRow {
            key: *key,
            scores: *s,
            concedes: *c,
        })
        .collect())
}

fn check_fit_inputs(features: &FeatureTable, outcomes: &[bool]) -> Result<()> {
    if features.len() != outcomes.len() {
        return Err(PipelineError::Misaligned(format!(
            "{} feature rows but {} outcomes",
            features.len(),
            outcomes.len()
        )));
    }
    Ok(())
}
