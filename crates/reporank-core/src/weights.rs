//! Per-mode weight table.
//!
//! The table is an explicit value handed to the scorer. Looking up a mode
//! with no row returns the fallback mode's row (executive by default), so
//! scoring never fails on a table that only covers some modes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, Mode};

/// Magnitudes of the four score components for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriteriaWeights {
    pub impact: f64,
    pub confidence: f64,
    #[serde(default)]
    pub feature_bias: f64,
    #[serde(default)]
    pub security_bias: f64,
}

impl CriteriaWeights {
    pub const EXECUTIVE: CriteriaWeights = CriteriaWeights::new(0.6, 0.4, 0.0, 0.0);
    pub const TECHNICAL: CriteriaWeights = CriteriaWeights::new(0.5, 0.2, 0.3, 0.0);
    pub const SECURITY: CriteriaWeights = CriteriaWeights::new(0.5, 0.2, 0.0, 0.3);
    pub const USECASE: CriteriaWeights = CriteriaWeights::new(0.5, 0.3, 0.2, 0.0);

    pub const fn new(impact: f64, confidence: f64, feature_bias: f64, security_bias: f64) -> Self {
        Self {
            impact,
            confidence,
            feature_bias,
            security_bias,
        }
    }

    fn validate(&self, mode: Mode) -> Result<(), ConfigError> {
        let components = [
            ("impact", self.impact),
            ("confidence", self.confidence),
            ("feature_bias", self.feature_bias),
            ("security_bias", self.security_bias),
        ];
        for (component, value) in components {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    mode: mode.to_string(),
                    component,
                });
            }
        }
        Ok(())
    }
}

/// Finite mapping from mode to weights, with an explicit fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    rows: BTreeMap<Mode, CriteriaWeights>,
    fallback: Mode,
}

impl Default for WeightTable {
    fn default() -> Self {
        let rows = BTreeMap::from([
            (Mode::Executive, CriteriaWeights::EXECUTIVE),
            (Mode::Technical, CriteriaWeights::TECHNICAL),
            (Mode::Security, CriteriaWeights::SECURITY),
            (Mode::Usecase, CriteriaWeights::USECASE),
        ]);
        Self {
            rows,
            fallback: Mode::Executive,
        }
    }
}

impl WeightTable {
    /// A table with only the given rows. Missing modes use `fallback`'s row.
    pub fn from_rows(
        rows: BTreeMap<Mode, CriteriaWeights>,
        fallback: Mode,
    ) -> Result<Self, ConfigError> {
        for (mode, weights) in &rows {
            weights.validate(*mode)?;
        }
        Ok(Self { rows, fallback })
    }

    /// Overlay rows from a JSON object keyed by mode label onto the default table.
    ///
    /// ```json
    /// {"security": {"impact": 0.4, "confidence": 0.2, "security_bias": 0.4}}
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let overrides: BTreeMap<String, CriteriaWeights> = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidWeightTable(e.to_string()))?;

        let mut table = Self::default();
        for (label, weights) in overrides {
            let mode: Mode = label.parse()?;
            weights.validate(mode)?;
            table.rows.insert(mode, weights);
        }
        Ok(table)
    }

    /// Weights for `mode`, or the fallback row when `mode` has none.
    pub fn weights_for(&self, mode: Mode) -> CriteriaWeights {
        self.rows
            .get(&mode)
            .or_else(|| self.rows.get(&self.fallback))
            .copied()
            .unwrap_or(CriteriaWeights::EXECUTIVE)
    }

    /// Weights for a free-form mode label; unknown labels use the fallback row.
    pub fn weights_for_label(&self, label: &str) -> CriteriaWeights {
        match label.parse::<Mode>() {
            Ok(mode) => self.weights_for(mode),
            Err(_) => self.weights_for(self.fallback),
        }
    }

    pub fn fallback(&self) -> Mode {
        self.fallback
    }

    pub fn rows(&self) -> impl Iterator<Item = (Mode, CriteriaWeights)> + '_ {
        self.rows.iter().map(|(m, w)| (*m, *w))
    }
}
