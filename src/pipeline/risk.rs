//! Out-of-spec evaluation and synthesized quality metrics

use rand::Rng;

use crate::entities::{Classification, FeatureRange, NewMeasurement, RiskFactors};

/// Risk added per out-of-spec measurement
pub const RISK_PER_ANOMALY: f64 = 0.05;

/// Cap on the anomaly adjustment
pub const MAX_ANOMALY_ADJUSTMENT: f64 = 0.25;

/// Chance a passing lot gets an elevated "false positive" prediction
pub const FALSE_POSITIVE_RATE: f64 = 0.05;

/// Anomalies reported in `risk_factors`
pub const TOP_RISK_FACTORS: usize = 5;

/// An out-of-spec reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anomaly {
    /// Zero-based feature index
    pub index: usize,
    /// Signed distance from the range midpoint
    pub deviation: f64,
}

/// Measurements of one record checked against the loaded ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub measurements: Vec<NewMeasurement>,
    pub anomalies: Vec<Anomaly>,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Produce one measurement per range. Values beyond the end of `values`
/// are treated as missing.
pub fn evaluate_measurements(values: &[Option<f64>], ranges: &[FeatureRange]) -> Evaluation {
    let mut eval = Evaluation {
        measurements: Vec::with_capacity(ranges.len()),
        anomalies: Vec::new(),
    };

    for (index, range) in ranges.iter().enumerate() {
        let value = values.get(index).copied().flatten();
        let mut is_out_of_spec = false;

        if let (Some(v), Some(midpoint)) = (value, range.midpoint()) {
            if !range.contains(v) {
                is_out_of_spec = true;
                eval.anomalies.push(Anomaly {
                    index,
                    deviation: v - midpoint,
                });
            }
        }

        eval.measurements.push(NewMeasurement {
            feature_id: range.feature_id,
            value,
            is_out_of_spec,
        });
    }

    eval
}

/// Quality score: 85–100 for passing lots, 40–75 for failures
pub fn quality_score<R: Rng>(rng: &mut R, classification: Classification) -> f64 {
    let score = match classification {
        Classification::Pass => rng.random_range(85.0..=100.0),
        Classification::Fail => rng.random_range(40.0..=75.0),
    };
    round_to(score, 2)
}

/// Prediction before the anomaly adjustment
pub fn base_risk<R: Rng>(rng: &mut R, classification: Classification) -> f64 {
    match classification {
        Classification::Fail => 0.75 + rng.random_range(-0.15..=0.20),
        Classification::Pass => {
            if rng.random::<f64>() < FALSE_POSITIVE_RATE {
                rng.random_range(0.5..=0.7)
            } else {
                rng.random_range(0.0..=0.4)
            }
        }
    }
}

/// Add the anomaly adjustment to a base prediction and clamp to [0, 1]
pub fn adjust_risk(base: f64, anomaly_count: usize) -> f64 {
    let adjustment = (anomaly_count as f64 * RISK_PER_ANOMALY).min(MAX_ANOMALY_ADJUSTMENT);
    round_to((base + adjustment).clamp(0.0, 1.0), 4)
}

/// Synthesized failure probability for a lot
pub fn predicted_risk<R: Rng>(
    rng: &mut R,
    classification: Classification,
    anomaly_count: usize,
) -> f64 {
    adjust_risk(base_risk(rng, classification), anomaly_count)
}

/// Risk on a 0–100 scale
pub fn risk_score(predicted_risk: f64) -> f64 {
    round_to(predicted_risk * 100.0, 2)
}

/// Share of total deviation held by each of the five largest anomalies,
/// keyed `F{index}_high` / `F{index}_low`. `None` without anomalies.
pub fn risk_factors(anomalies: &[Anomaly]) -> Option<RiskFactors> {
    if anomalies.is_empty() {
        return None;
    }

    let mut top: Vec<Anomaly> = anomalies.to_vec();
    top.sort_by(|a, b| b.deviation.abs().total_cmp(&a.deviation.abs()));
    top.truncate(TOP_RISK_FACTORS);

    let total: f64 = top.iter().map(|a| a.deviation.abs()).sum();
    if total == 0.0 {
        return None;
    }

    Some(
        top.iter()
            .map(|a| {
                let direction = if a.deviation > 0.0 { "high" } else { "low" };
                (
                    format!("F{}_{}", a.index, direction),
                    round_to(a.deviation.abs() / total, 4),
                )
            })
            .collect(),
    )
}
