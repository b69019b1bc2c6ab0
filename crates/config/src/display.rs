// Display settings
// Loaded from ~/.config/wellbeing/display.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid display settings: {0}")]
    Parse(String),

    #[error("invalid display settings: {0}")]
    Invalid(String),
}

/// How the rendering collaborator presents tables and maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Page sizes offered by interactive tables.
    pub length_menu: Vec<usize>,

    /// Tables larger than this (serialized) are downsampled by the renderer.
    pub max_bytes: usize,

    /// Countries shown in comparison charts.
    pub top_n: usize,

    pub colorscale: String,

    /// Map projection type.
    pub projection: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            length_menu: vec![5, 10, 20, 50, 100, 200, 500],
            max_bytes: 1 << 20,
            top_n: 10,
            colorscale: "viridis".into(),
            projection: "natural earth".into(),
        }
    }
}

impl DisplaySettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wellbeing")
            .join("display.toml")
    }

    /// Load from the user's config dir, falling back to defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no display settings, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "using default display settings");
                Self::default()
            }
        }
    }

    /// Load an explicit file. Unlike [`DisplaySettings::load`], errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, DisplayError> {
        let contents = fs::read_to_string(path).map_err(|source| DisplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(input: &str) -> Result<Self, DisplayError> {
        let settings: Self = toml::from_str(input).map_err(|e| DisplayError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), DisplayError> {
        if self.length_menu.is_empty() || self.length_menu.contains(&0) {
            return Err(DisplayError::Invalid("length_menu needs at least one non-zero page size".into()));
        }
        if self.top_n == 0 {
            return Err(DisplayError::Invalid("top_n must be at least 1".into()));
        }
        if self.colorscale.trim().is_empty() || self.projection.trim().is_empty() {
            return Err(DisplayError::Invalid("colorscale and projection must be named".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let s = DisplaySettings::default();
        assert_eq!(s.length_menu, vec![5, 10, 20, 50, 100, 200, 500]);
        assert_eq!(s.max_bytes, 1_048_576);
        assert_eq!(s.top_n, 10);
        assert_eq!(s.colorscale, "viridis");
        assert_eq!(s.projection, "natural earth");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s = DisplaySettings::from_toml("top_n = 5\nlength_menu = [7]\n").unwrap();
        assert_eq!(s.top_n, 5);
        assert_eq!(s.length_menu, vec![7]);
        assert_eq!(s.colorscale, "viridis");
    }

    #[test]
    fn rejects_zero_top_n() {
        let err = DisplaySettings::from_toml("top_n = 0").unwrap_err();
        assert!(matches!(err, DisplayError::Invalid(_)));
    }

    #[test]
    fn rejects_wrong_type() {
        let err = DisplaySettings::from_toml("max_bytes = \"big\"").unwrap_err();
        assert!(matches!(err, DisplayError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("display.toml");
        fs::write(&path, "colorscale = \"cividis\"\nprojection = \"orthographic\"\n").unwrap();

        let s = DisplaySettings::load_from(&path).unwrap();
        assert_eq!(s.colorscale, "cividis");
        assert_eq!(s.projection, "orthographic");
        assert_eq!(s.max_bytes, 1 << 20);

        let missing = DisplaySettings::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(missing.to_string().contains("absent.toml"));
    }

    #[test]
    fn config_path_is_namespaced() {
        let path = DisplaySettings::config_path();
        assert!(path.ends_with("wellbeing/display.toml"));
    }
}
