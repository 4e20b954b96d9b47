//! Classification records: the engine's only input.
//!
//! Records arrive loosely typed from the analysis collaborator as
//! [`RawClassification`]. Converting one into a [`ClassificationRecord`] is
//! the single validation point: a missing `repo_url` or an out-of-range
//! confidence rejects the record, while unknown enum labels degrade to
//! documented defaults (`other` change type, `low` impact).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::RecordError;
use crate::config::repo_key;

/// Kind of change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Feature,
    Fix,
    Security,
    Docs,
    Maintenance,
    Other,
}

impl ChangeType {
    /// Unknown labels map to `Other`.
    pub fn parse_lenient(label: &str) -> ChangeType {
        match label.trim().to_ascii_lowercase().as_str() {
            "feature" => ChangeType::Feature,
            "fix" => ChangeType::Fix,
            "security" => ChangeType::Security,
            "docs" => ChangeType::Docs,
            "maintenance" => ChangeType::Maintenance,
            _ => ChangeType::Other,
        }
    }
}

/// Judged impact of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    /// Unknown labels map to `Low`.
    pub fn parse_lenient(label: &str) -> ImpactLevel {
        match label.trim().to_ascii_lowercase().as_str() {
            "medium" => ImpactLevel::Medium,
            "high" => ImpactLevel::High,
            _ => ImpactLevel::Low,
        }
    }

    /// Integer severity: low=1, medium=2, high=3.
    pub fn severity(&self) -> u8 {
        match self {
            ImpactLevel::Low => 1,
            ImpactLevel::Medium => 2,
            ImpactLevel::High => 3,
        }
    }
}

/// A probability-like value guaranteed to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);

    pub fn new(value: f64) -> Result<Self, RecordError> {
        if !value.is_finite() {
            return Err(RecordError::ConfidenceNotFinite);
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(RecordError::ConfidenceOutOfRange { value });
        }
        Ok(Confidence(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = RecordError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Confidence::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> f64 {
        c.0
    }
}

/// Wire shape produced by the analysis collaborator.
///
/// Every field is optional; extra fields (`summary`, `rationale`, `model`,
/// ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawClassification {
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub change_type: Option<String>,
    #[serde(default)]
    pub impact_level: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// One validated judgment about one change to one repository.
///
/// Fields are private: a record is built once at the boundary and is
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawClassification")]
pub struct ClassificationRecord {
    repo_url: String,
    change_type: ChangeType,
    impact_level: ImpactLevel,
    confidence: Confidence,
}

impl ClassificationRecord {
    pub fn new(
        repo_url: impl Into<String>,
        change_type: ChangeType,
        impact_level: ImpactLevel,
        confidence: f64,
    ) -> Result<Self, RecordError> {
        let repo_url = repo_url.into().trim().to_string();
        if repo_url.is_empty() {
            return Err(RecordError::MissingRepoUrl);
        }
        Ok(Self {
            repo_url,
            change_type,
            impact_level,
            confidence: Confidence::new(confidence)?,
        })
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn impact_level(&self) -> ImpactLevel {
        self.impact_level
    }

    pub fn confidence(&self) -> f64 {
        self.confidence.value()
    }
}

impl TryFrom<RawClassification> for ClassificationRecord {
    type Error = RecordError;

    fn try_from(raw: RawClassification) -> Result<Self, Self::Error> {
        let change_type = raw
            .change_type
            .as_deref()
            .map(ChangeType::parse_lenient)
            .unwrap_or(ChangeType::Other);
        let impact_level = raw
            .impact_level
            .as_deref()
            .map(ImpactLevel::parse_lenient)
            .unwrap_or(ImpactLevel::Low);
        ClassificationRecord::new(
            raw.repo_url.unwrap_or_default(),
            change_type,
            impact_level,
            raw.confidence.unwrap_or(0.0),
        )
    }
}

/// A record that failed validation, with its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Zero-based position in the submitted sequence.
    pub index: usize,
    pub repo_url: Option<String>,
    pub reason: String,
}

/// An immutable batch of validated records gathered in one ingestion cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationBatch {
    records: Vec<ClassificationRecord>,
}

impl ClassificationBatch {
    pub fn new(records: Vec<ClassificationRecord>) -> Self {
        Self { records }
    }

    /// Validate raw records, keeping the good ones and reporting the rest.
    pub fn from_raw<I>(raw: I) -> (Self, Vec<RejectedRecord>)
    where
        I: IntoIterator<Item = RawClassification>,
    {
        Self::collect(raw.into_iter().map(Ok).enumerate())
    }

    /// Parse line-delimited JSON, one raw record per line.
    ///
    /// Blank lines are skipped. A line that is not a JSON object is rejected
    /// like any other invalid record; `index` is the zero-based line number.
    pub fn from_json_lines(input: &str) -> (Self, Vec<RejectedRecord>) {
        let parsed = input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                let raw = serde_json::from_str::<RawClassification>(line.trim())
                    .map_err(|e| RecordError::Malformed(e.to_string()));
                (index, raw)
            });
        Self::collect(parsed)
    }

    fn collect<I>(items: I) -> (Self, Vec<RejectedRecord>)
    where
        I: IntoIterator<Item = (usize, Result<RawClassification, RecordError>)>,
    {
        let mut records = Vec::new();
        let mut rejected = Vec::new();
        for (index, item) in items {
            let (repo_url, outcome) = match item {
                Ok(raw) => (raw.repo_url.clone(), ClassificationRecord::try_from(raw)),
                Err(e) => (None, Err(e)),
            };
            match outcome {
                Ok(record) => records.push(record),
                Err(e) => rejected.push(RejectedRecord {
                    index,
                    repo_url,
                    reason: e.to_string(),
                }),
            }
        }
        (Self { records }, rejected)
    }

    /// A new batch containing only records for the given repositories.
    ///
    /// URLs are matched by [`repo_key`], so `https://github.com/o/a.git`
    /// selects records for `https://github.com/o/a`.
    pub fn retain_repos(&self, repos: &[String]) -> Self {
        let wanted: HashSet<String> = repos.iter().map(|u| repo_key(u)).collect();
        Self {
            records: self
                .records
                .iter()
                .filter(|r| wanted.contains(&repo_key(r.repo_url())))
                .cloned()
                .collect(),
        }
    }

    pub fn records(&self) -> &[ClassificationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ClassificationRecord> for ClassificationBatch {
    fn from_iter<T: IntoIterator<Item = ClassificationRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(repo: Option<&str>, conf: Option<f64>) -> RawClassification {
        RawClassification {
            repo_url: repo.map(str::to_string),
            change_type: Some("feature".to_string()),
            impact_level: Some("high".to_string()),
            confidence: conf,
        }
    }

    #[test]
    fn unknown_labels_degrade_to_defaults() {
        let record = ClassificationRecord::try_from(RawClassification {
            repo_url: Some("https://github.com/a/b".to_string()),
            change_type: Some("refactor".to_string()),
            impact_level: Some("catastrophic".to_string()),
            confidence: Some(0.4),
        })
        .unwrap();
        assert_eq!(record.change_type(), ChangeType::Other);
        assert_eq!(record.impact_level(), ImpactLevel::Low);
    }

    #[test]
    fn missing_confidence_defaults_to_zero() {
        let record = ClassificationRecord::try_from(raw(Some("r"), None)).unwrap();
        assert_eq!(record.confidence(), 0.0);
    }

    #[test]
    fn empty_repo_url_is_rejected() {
        assert_eq!(
            ClassificationRecord::try_from(raw(Some("   "), Some(0.5))).unwrap_err(),
            RecordError::MissingRepoUrl
        );
        assert_eq!(
            ClassificationRecord::try_from(raw(None, Some(0.5))).unwrap_err(),
            RecordError::MissingRepoUrl
        );
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(matches!(
            ClassificationRecord::try_from(raw(Some("r"), Some(1.01))).unwrap_err(),
            RecordError::ConfidenceOutOfRange { .. }
        ));
        assert!(matches!(
            ClassificationRecord::try_from(raw(Some("r"), Some(-0.1))).unwrap_err(),
            RecordError::ConfidenceOutOfRange { .. }
        ));
        assert_eq!(
            Confidence::new(f64::NAN).unwrap_err(),
            RecordError::ConfidenceNotFinite
        );
    }

    #[test]
    fn boundary_confidences_are_accepted() {
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(1.0).is_ok());
    }

    #[test]
    fn repo_url_is_trimmed() {
        let record = ClassificationRecord::new(
            "  https://github.com/a/b ",
            ChangeType::Fix,
            ImpactLevel::Low,
            0.1,
        )
        .unwrap();
        assert_eq!(record.repo_url(), "https://github.com/a/b");
    }

    #[test]
    fn batch_keeps_valid_and_reports_rejected() {
        let (batch, rejected) = ClassificationBatch::from_raw(vec![
            raw(Some("a"), Some(0.9)),
            raw(None, Some(0.9)),
            raw(Some("b"), Some(2.0)),
            raw(Some("c"), Some(0.1)),
        ]);
        assert_eq!(batch.len(), 2);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].index, 1);
        assert_eq!(rejected[0].repo_url, None);
        assert_eq!(rejected[1].index, 2);
        assert_eq!(rejected[1].repo_url.as_deref(), Some("b"));
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let ok: ClassificationRecord = serde_json::from_value(json!({
            "repo_url": "https://github.com/a/b",
            "change_type": "security",
            "impact_level": "medium",
            "confidence": 0.7,
            "summary": "ignored extra field",
        }))
        .unwrap();
        assert_eq!(ok.change_type(), ChangeType::Security);

        let bad = serde_json::from_value::<ClassificationRecord>(json!({
            "repo_url": "https://github.com/a/b",
            "confidence": 3.0,
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn json_lines_reject_malformed_lines_by_line_number() {
        let input = concat!(
            "{\"repo_url\": \"a\", \"impact_level\": \"high\", \"confidence\": 0.9}\n",
            "\n",
            "not json\n",
            "{\"repo_url\": \"b\", \"confidence\": \"high\"}\n",
            "{\"repo_url\": \"c\", \"change_type\": \"fix\"}\n",
        );
        let (batch, rejected) = ClassificationBatch::from_json_lines(input);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[0].impact_level(), ImpactLevel::High);
        assert_eq!(batch.records()[1].repo_url(), "c");

        let lines: Vec<usize> = rejected.iter().map(|r| r.index).collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(rejected[0].reason.starts_with("malformed record"));
    }

    #[test]
    fn retain_repos_filters_batch() {
        let batch: ClassificationBatch = ["a", "b", "a", "c"]
            .iter()
            .map(|u| ClassificationRecord::new(*u, ChangeType::Fix, ImpactLevel::Low, 0.5).unwrap())
            .collect();
        let kept = batch.retain_repos(&["a".to_string(), "c".to_string()]);
        assert_eq!(kept.len(), 3);
        assert!(kept.records().iter().all(|r| r.repo_url() != "b"));
    }

    #[test]
    fn retain_repos_matches_equivalent_github_urls() {
        let batch: ClassificationBatch = ["https://github.com/o/a", "https://github.com/o/b"]
            .iter()
            .map(|u| ClassificationRecord::new(*u, ChangeType::Fix, ImpactLevel::Low, 0.5).unwrap())
            .collect();
        let list = "https://github.com/o/a.git,https://github.com/o/b/";
        let monitored = crate::config::parse_monitored_repos(list).unwrap();

        let kept = batch.retain_repos(&monitored);
        assert_eq!(kept.len(), 2);
        // Records keep their own spelling of the URL.
        assert_eq!(kept.records()[0].repo_url(), "https://github.com/o/a");

        let only_b = batch.retain_repos(&["https://github.com/O/B".to_string()]);
        assert_eq!(only_b.len(), 1);
    }
}
