//! Scoring modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// A named weighting profile controlling how score components combine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Executive,
    Technical,
    Security,
    #[serde(alias = "use_case")]
    Usecase,
}

impl Mode {
    /// Every supported mode, in declaration order.
    pub const ALL: [Mode; 4] = [
        Mode::Executive,
        Mode::Technical,
        Mode::Security,
        Mode::Usecase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Executive => "executive",
            Mode::Technical => "technical",
            Mode::Security => "security",
            Mode::Usecase => "usecase",
        }
    }

    /// Parse a label, mapping anything unrecognised to `Executive`.
    ///
    /// Use this for labels coming from upstream data; use `FromStr` for
    /// operator input where a typo should be reported.
    pub fn parse_lenient(label: &str) -> Mode {
        label.parse().unwrap_or(Mode::Executive)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executive" => Ok(Mode::Executive),
            "technical" => Ok(Mode::Technical),
            "security" => Ok(Mode::Security),
            "usecase" | "use_case" => Ok(Mode::Usecase),
            _ => Err(ConfigError::UnknownMode {
                label: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_labels_and_alias() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!("use_case".parse::<Mode>().unwrap(), Mode::Usecase);
        assert_eq!(" Security ".parse::<Mode>().unwrap(), Mode::Security);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        let err = "board".parse::<Mode>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownMode {
                label: "board".to_string()
            }
        );
    }

    #[test]
    fn lenient_parse_falls_back_to_executive() {
        assert_eq!(Mode::parse_lenient("board"), Mode::Executive);
        assert_eq!(Mode::parse_lenient(""), Mode::Executive);
        assert_eq!(Mode::parse_lenient("technical"), Mode::Technical);
    }

    #[test]
    fn serde_uses_lowercase_labels() {
        assert_eq!(
            serde_json::to_string(&Mode::Usecase).unwrap(),
            "\"usecase\""
        );
        let m: Mode = serde_json::from_str("\"use_case\"").unwrap();
        assert_eq!(m, Mode::Usecase);
    }
}
