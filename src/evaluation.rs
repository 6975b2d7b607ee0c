use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BinaryMetrics {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub accuracy: f64,
    pub roc_auc: f64,
    pub base_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

/// Brier, log loss, accuracy at 0.5 and ROC AUC of binary predictions.
/// Empty or mismatched inputs give an all-zero value.
pub fn evaluate(predictions: &[f64], outcomes: &[bool]) -> BinaryMetrics {
    if predictions.is_empty() || predictions.len() != outcomes.len() {
        return BinaryMetrics::default();
    }

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;
    let mut positives = 0usize;

    for (p, y) in predictions.iter().zip(outcomes) {
        let p = p.clamp(0.0, 1.0);
        let target = if *y { 1.0 } else { 0.0 };
        brier_sum += (p - target).powi(2);

        let actual_prob = (if *y { p } else { 1.0 - p }).clamp(1e-12, 1.0);
        log_loss_sum += -actual_prob.ln();

        if (p >= 0.5) == *y {
            correct += 1;
        }
        if *y {
            positives += 1;
        }
    }

    let n = predictions.len() as f64;
    BinaryMetrics {
        samples: predictions.len(),
        brier: brier_sum / n,
        log_loss: log_loss_sum / n,
        accuracy: correct as f64 / n,
        roc_auc: roc_auc(predictions, outcomes),
        base_rate: positives as f64 / n,
    }
}

/// Rank-based AUC with tied scores sharing their average rank. 0.5 when only
/// one class is present.
pub fn roc_auc(predictions: &[f64], outcomes: &[bool]) -> f64 {
    let n_pos = outcomes.iter().filter(|y| **y).count();
    let n_neg = outcomes.len() - n_pos;
    if n_pos == 0 || n_neg == 0 || predictions.len() != outcomes.len() {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..predictions.len()).collect();
    order.sort_by(|a, b| predictions[*a].total_cmp(&predictions[*b]));

    let mut pos_rank_sum = 0.0_f64;
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && predictions[order[end]] == predictions[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group covers ranks start+1..=end.
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for idx in &order[start..end] {
            if outcomes[*idx] {
                pos_rank_sum += avg_rank;
            }
        }
        start = end;
    }

    let n_pos = n_pos as f64;
    (pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg as f64)
}

pub fn calibration_bins(
    predictions: &[f64],
    outcomes: &[bool],
    bins: usize,
) -> Vec<CalibrationBin> {
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (p, y) in predictions.iter().zip(outcomes) {
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += p;
        if *y {
            actual_sum[idx] += 1.0;
        }
    }

    (0..bins)
        .map(|i| {
            let count = counts[i];
            let (avg_pred, actual_rate) = if count > 0 {
                (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
            } else {
                (0.0, 0.0)
            };
            CalibrationBin {
                bucket_start: i as f64 / bins as f64,
                bucket_end: (i + 1) as f64 / bins as f64,
                count,
                avg_pred,
                actual_rate,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_ranking_has_unit_auc() {
        let preds = [0.1, 0.2, 0.8, 0.9];
        let ys = [false, false, true, true];
        assert!((roc_auc(&preds, &ys) - 1.0).abs() < 1e-12);
        let m = evaluate(&preds, &ys);
        assert_eq!(m.samples, 4);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.base_rate, 0.5);
    }

    #[test]
    fn constant_predictions_give_half_auc() {
        let preds = [0.3; 6];
        let ys = [true, false, false, true, false, false];
        assert!((roc_auc(&preds, &ys) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn mismatched_inputs_are_empty() {
        assert_eq!(evaluate(&[0.1, 0.2], &[true]), BinaryMetrics::default());
        assert_eq!(evaluate(&[], &[]).samples, 0);
    }

    #[test]
    fn bins_cover_unit_interval() {
        let bins = calibration_bins(&[0.05, 0.95, 1.0], &[false, true, true], 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[9].count, 2);
        assert_eq!(bins[9].actual_rate, 1.0);
    }
}
