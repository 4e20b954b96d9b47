//! Engine configuration and monitored-repository parsing.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ConfigError, Mode};
use crate::weights::WeightTable;

/// Everything that parameterises a ranking cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub weights: WeightTable,
    /// Smallest absolute rank change that is reported.
    pub min_shift: u32,
    /// Modes computed per cycle, in reporting order.
    pub modes: Vec<Mode>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: WeightTable::default(),
            min_shift: 1,
            modes: Mode::ALL.to_vec(),
        }
    }
}

impl EngineConfig {
    pub fn with_weights(mut self, weights: WeightTable) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_min_shift(mut self, min_shift: u32) -> Self {
        self.min_shift = min_shift;
        self
    }

    /// Replace the mode list. Duplicates are dropped, keeping first occurrence.
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = Mode>) -> Self {
        let mut unique = Vec::new();
        for mode in modes {
            if !unique.contains(&mode) {
                unique.push(mode);
            }
        }
        self.modes = unique;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_shift == 0 {
            return Err(ConfigError::ZeroMinShift);
        }
        if self.modes.is_empty() {
            return Err(ConfigError::NoModes);
        }
        Ok(())
    }
}

fn github_repo_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$")
            .expect("static GitHub URL pattern is valid")
    })
}

/// Split a GitHub repository URL into `(owner, name)`.
pub fn parse_owner_repo(repo_url: &str) -> Option<(String, String)> {
    let caps = github_repo_url_re().captures(repo_url.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Comparison key for a repository URL.
///
/// GitHub URLs reduce to a lowercase `owner/name`, so `.git` suffixes,
/// trailing slashes and scheme differences compare equal. Anything else
/// compares as its trimmed text.
pub fn repo_key(repo_url: &str) -> String {
    match parse_owner_repo(repo_url) {
        Some((owner, name)) => format!(
            "{}/{}",
            owner.to_ascii_lowercase(),
            name.to_ascii_lowercase()
        ),
        None => repo_url.trim().to_string(),
    }
}

/// Parse a comma-separated list of GitHub repository URLs.
///
/// Entries are trimmed, blanks skipped, and duplicates dropped keeping the
/// first occurrence (by [`repo_key`]). Any invalid entry fails the whole list.
pub fn parse_monitored_repos(list: &str) -> Result<Vec<String>, ConfigError> {
    let entries: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let invalid: Vec<String> = entries
        .iter()
        .filter(|s| !github_repo_url_re().is_match(s))
        .map(|s| s.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(ConfigError::InvalidRepoUrls { urls: invalid });
    }

    let mut repos: Vec<String> = Vec::new();
    for entry in entries {
        if !repos.iter().any(|r| repo_key(r) == repo_key(entry)) {
            repos.push(entry.to_string());
        }
    }
    Ok(repos)
}

/// Parse a comma-separated list of mode labels (strict).
pub fn parse_modes(list: &str) -> Result<Vec<Mode>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
