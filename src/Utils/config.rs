//! # Sorter configuration
//!
//! Numerical tolerances and grids used by the sort criteria, kept in one JSON file
//! so that a run can be reproduced. A missing file means default settings.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "pdep": {"tolerance_pct": 20.0, "check_temperatures": [500.0, 1000.0, 1500.0], "p_low": null, "p_high": null},
//!   "rate_grid": {"temperatures": [500.0, 1000.0, 1500.0], "pressures": [1.0, 10.0, 100.0]},
//!   "channel_numbering": "PerPes",
//!   "submech": {"max_depth": 1},
//!   "prompt": {"model_type": "rovib_dos", "reference_temperature": 298.15, "dh": null, "look_for_prompt_chains": false}
//! }
//! ```
use crate::Mechanism::rate_data::RateGrid;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pressure-dependence test settings; `p_low`/`p_high` default to the extreme tabulated pressures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdepConfig {
    pub tolerance_pct: f64,
    pub check_temperatures: Vec<f64>,
    pub p_low: Option<f64>,
    pub p_high: Option<f64>,
}

impl Default for PdepConfig {
    fn default() -> Self {
        Self {
            tolerance_pct: 20.0,
            check_temperatures: vec![500.0, 1000.0, 1500.0],
            p_low: None,
            p_high: None,
        }
    }
}

/// How channel indices are counted inside a PES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelNumbering {
    /// one running index over the whole PES
    #[default]
    PerPes,
    /// restart at 0 in each sub-PES
    PerSubPes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmechConfig {
    pub max_depth: usize,
}

impl Default for SubmechConfig {
    fn default() -> Self {
        Self { max_depth: 1 }
    }
}

/// Prompt-dissociation grouping options: energy threshold `dh` in kcal/mol (no filtering
/// when absent) and whether to follow dissociation chains beyond the first radical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub model_type: String,
    pub reference_temperature: f64,
    pub dh: Option<f64>,
    pub look_for_prompt_chains: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            model_type: "rovib_dos".to_string(),
            reference_temperature: 298.15,
            dh: None,
            look_for_prompt_chains: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    pub pdep: PdepConfig,
    pub rate_grid: RateGrid,
    pub channel_numbering: ChannelNumbering,
    pub submech: SubmechConfig,
    pub prompt: PromptConfig,
}

impl SorterConfig {
    /// Loads the configuration, falling back to defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        info!("sorter config loaded from {}", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults() {
        let c = SorterConfig::default();
        assert_eq!(c.pdep.tolerance_pct, 20.0);
        assert_eq!(c.channel_numbering, ChannelNumbering::PerPes);
        assert_eq!(c.prompt.model_type, "rovib_dos");
        assert_eq!(c.submech.max_depth, 1);
        assert_eq!(c.rate_grid.pressures, vec![1.0, 10.0, 100.0]);
    }

    #[test]
    fn save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let mut c = SorterConfig::default();
        c.prompt.dh = Some(30.0);
        c.channel_numbering = ChannelNumbering::PerSubPes;
        c.save(file.path()).unwrap();
        let back = SorterConfig::load(file.path()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"pdep": {{"tolerance_pct": 5.0}}, "prompt": {{"look_for_prompt_chains": true}}}}"#).unwrap();
        let c = SorterConfig::load(file.path()).unwrap();
        assert_eq!(c.pdep.tolerance_pct, 5.0);
        assert_eq!(c.pdep.check_temperatures, vec![500.0, 1000.0, 1500.0]);
        assert!(c.prompt.look_for_prompt_chains);
        assert_eq!(c.prompt.reference_temperature, 298.15);
    }

    #[test]
    fn missing_file_and_bad_json() {
        let c = SorterConfig::load("definitely_not_here_sorter_config.json").unwrap();
        assert_eq!(c, SorterConfig::default());
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(SorterConfig::load(file.path()), Err(ConfigError::Json(_))));
    }
}
