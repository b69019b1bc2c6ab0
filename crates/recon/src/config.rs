use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ReconError;
use crate::model::{CorrelationBasis, SurveyYear};
use crate::reconcile::ReconcileOptions;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    /// Source file per year, keyed by the year ("2015" = "2015.csv").
    /// Years left out fall back to `<year>.csv`.
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
    #[serde(default)]
    pub join: JoinConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub correlation: CorrelationConfig,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct JoinConfig {
    #[serde(default = "default_min_match_ratio")]
    pub min_match_ratio: f64,
}

fn default_min_match_ratio() -> f64 {
    ReconcileOptions::default().min_match_ratio
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            min_match_ratio: default_min_match_ratio(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Decimal places kept in the display table.
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 {
    2
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorrelationConfig {
    #[serde(default)]
    pub basis: CorrelationBasis,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        for (key, path) in &self.sources {
            key.parse::<SurveyYear>().map_err(|_| {
                ReconError::ConfigValidation(format!("sources: '{key}' is not a supported year (2015-2020)"))
            })?;
            if path.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("sources: empty path for {key}")));
            }
        }

        let ratio = self.join.min_match_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "join.min_match_ratio must be in (0, 1], got {ratio}"
            )));
        }

        if self.output.precision > 10 {
            return Err(ReconError::ConfigValidation(format!(
                "output.precision must be at most 10, got {}",
                self.output.precision
            )));
        }

        Ok(())
    }

    /// Configured path for a year, or `<year>.csv`.
    pub fn source_path(&self, year: SurveyYear) -> String {
        self.sources
            .iter()
            .find(|(key, _)| key.parse::<SurveyYear>().ok() == Some(year))
            .map(|(_, path)| path.clone())
            .unwrap_or_else(|| format!("{year}.csv"))
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            min_match_ratio: self.join.min_match_ratio,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
