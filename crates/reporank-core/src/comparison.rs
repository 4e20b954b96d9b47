//! Comparison run assembly.
//!
//! [`ComparisonRunBuilder`] partitions a batch by repository, scores each
//! partition, and orders the results. Ordering is by score descending with
//! an explicit secondary key: the repository's first-appearance index in the
//! batch. Equal scores therefore keep input order, independent of sort
//! stability.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::{
    ClassificationBatch, ClassificationRecord, ComparisonRun, Mode, ScoredRepository,
};
use crate::scoring::ScoreCalculator;

/// Builds a [`ComparisonRun`] for one mode from a batch of records.
#[derive(Debug, Clone, Default)]
pub struct ComparisonRunBuilder {
    calculator: ScoreCalculator,
}

impl ComparisonRunBuilder {
    pub fn new(calculator: ScoreCalculator) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Score and rank every repository in `batch` under `mode`.
    ///
    /// The returned run has no rank shifts or notifications attached.
    pub fn build(&self, mode: Mode, batch: &ClassificationBatch) -> ComparisonRun {
        let partitions = partition_by_repo(batch.records());

        let mut results: Vec<(usize, ScoredRepository)> = partitions
            .iter()
            .enumerate()
            .map(|(first_seen, (repo_url, records))| {
                let scored = self.calculator.score(mode, records.iter().copied());
                (
                    first_seen,
                    ScoredRepository {
                        repo_url: repo_url.to_string(),
                        score: scored.score,
                        confidence: scored.confidence,
                        sample_size: scored.sample_size,
                        security_ratio: scored.security_ratio,
                        feature_ratio: scored.feature_ratio,
                        rank: 0,
                    },
                )
            })
            .collect();

        results.sort_by(|(ia, a), (ib, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(ia.cmp(ib))
        });

        let results = results
            .into_iter()
            .enumerate()
            .map(|(pos, (_, mut entry))| {
                entry.rank = (pos + 1) as u32;
                entry
            })
            .collect();

        ComparisonRun {
            mode,
            criteria_weights: self.calculator.weights_for(mode),
            repositories: partitions.iter().map(|(u, _)| u.to_string()).collect(),
            results,
            rank_shifts: Vec::new(),
            notifications: Vec::new(),
        }
    }
}

/// Group records by repository, in order of each repository's first appearance.
pub fn partition_by_repo(
    records: &[ClassificationRecord],
) -> Vec<(&str, Vec<&ClassificationRecord>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<(&str, Vec<&ClassificationRecord>)> = Vec::new();
    for record in records {
        let url = record.repo_url();
        match index.get(url) {
            Some(&i) => partitions[i].1.push(record),
            None => {
                index.insert(url, partitions.len());
                partitions.push((url, vec![record]));
            }
        }
    }
    partitions
}
