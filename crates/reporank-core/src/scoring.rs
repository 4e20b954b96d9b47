//! Per-repository scoring.
//!
//! [`ScoreCalculator`] turns one repository's classification records into a
//! [`RepoScore`] under a mode's weights:
//!
//! ```text
//! impact     = mean(severity) / 3 * w.impact
//! confidence = calibrated(mean(confidence), n) * w.confidence
//! security   = share(security changes) * w.security_bias
//! feature    = share(feature changes) * w.feature_bias
//! score      = round3((impact + confidence + security + feature) * 10)
//! ```
//!
//! Small samples are discounted: the calibration factor ramps from 0.68 at
//! one record to 1.0 at [`FULL_SAMPLE_SIZE`] records and stays there.

use serde::{Deserialize, Serialize};

use crate::domain::{ChangeType, ClassificationRecord, Mode};
use crate::weights::{CriteriaWeights, WeightTable};

/// Sample size at which the confidence discount disappears.
pub const FULL_SAMPLE_SIZE: usize = 5;

const MAX_SEVERITY: f64 = 3.0;
const SCORE_SCALE: f64 = 10.0;

/// Score of one repository, without its identity or rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoScore {
    pub score: f64,
    pub confidence: f64,
    pub sample_size: usize,
    /// `None` only when there were no records.
    pub security_ratio: Option<f64>,
    pub feature_ratio: Option<f64>,
}

impl RepoScore {
    /// Score of a repository with no records.
    pub fn empty() -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            sample_size: 0,
            security_ratio: None,
            feature_ratio: None,
        }
    }
}

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Discount an average confidence for small samples, clamped to `[0, 1]` and rounded.
pub fn calibrate_confidence(avg_confidence: f64, sample_size: usize) -> f64 {
    let sample_factor = (sample_size as f64 / FULL_SAMPLE_SIZE as f64).min(1.0);
    let calibrated = avg_confidence * (0.6 + 0.4 * sample_factor);
    round3(calibrated.clamp(0.0, 1.0))
}

/// Computes a repository's score under a mode, using an explicit weight table.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: WeightTable,
}

impl ScoreCalculator {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// The weight row used for `mode`.
    pub fn weights_for(&self, mode: Mode) -> CriteriaWeights {
        self.weights.weights_for(mode)
    }

    /// Score one repository's records. The caller guarantees they all share a repo.
    pub fn score<'a, I>(&self, mode: Mode, records: I) -> RepoScore
    where
        I: IntoIterator<Item = &'a ClassificationRecord>,
    {
        let mut sample_size = 0usize;
        let mut severity_sum = 0u64;
        let mut confidence_sum = 0.0f64;
        let mut security_count = 0usize;
        let mut feature_count = 0usize;

        for record in records {
            sample_size += 1;
            severity_sum += u64::from(record.impact_level().severity());
            confidence_sum += record.confidence();
            match record.change_type() {
                ChangeType::Security => security_count += 1,
                ChangeType::Feature => feature_count += 1,
                _ => {}
            }
        }

        if sample_size == 0 {
            return RepoScore::empty();
        }

        let w = self.weights_for(mode);
        let n = sample_size as f64;

        let impact_component = (severity_sum as f64 / n / MAX_SEVERITY) * w.impact;

        let calibrated = calibrate_confidence(confidence_sum / n, sample_size);
        let confidence_component = calibrated * w.confidence;

        let security_ratio = security_count as f64 / n;
        let feature_ratio = feature_count as f64 / n;
        let security_component = security_ratio * w.security_bias;
        let feature_component = feature_ratio * w.feature_bias;

        let total =
            impact_component + confidence_component + security_component + feature_component;

        RepoScore {
            score: round3(total * SCORE_SCALE),
            confidence: calibrated,
            sample_size,
            security_ratio: Some(round3(security_ratio)),
            feature_ratio: Some(round3(feature_ratio)),
        }
    }
}
