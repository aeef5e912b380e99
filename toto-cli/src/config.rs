use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use toto_analysis::backtest::{CandidateSet, DEFAULT_CANDIDATE, DEFAULT_POSITION_RANGES, PositionRange};
use toto_analysis::generator::DEFAULT_SIMULATED_DRAWS;
use toto_analysis::interval::DEFAULT_CONFIDENCE;
use toto_db::store::{DEFAULT_RESULTS_FILE, DEFAULT_SIMULATED_FILE};

pub const DEFAULT_CONFIG_FILE: &str = "toto.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub results_file: PathBuf,
    pub simulated_file: PathBuf,
    pub simulated_draws: usize,
    pub seed: Option<u64>,
    pub confidence_level: f64,
    pub candidate: Vec<u8>,
    pub position_ranges: Vec<PositionRange>,
    /// Refuse to analyse a file that had invalid rows.
    pub strict: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            results_file: PathBuf::from(DEFAULT_RESULTS_FILE),
            simulated_file: PathBuf::from(DEFAULT_SIMULATED_FILE),
            simulated_draws: DEFAULT_SIMULATED_DRAWS,
            seed: None,
            confidence_level: DEFAULT_CONFIDENCE,
            candidate: DEFAULT_CANDIDATE.to_vec(),
            position_ranges: DEFAULT_POSITION_RANGES.to_vec(),
            strict: false,
        }
    }
}

impl AnalysisConfig {
    pub fn candidate_set(&self) -> Result<CandidateSet> {
        CandidateSet::new(&self.candidate).context("Invalid candidate numbers in configuration")
    }
}

/// Falls back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    if !path.exists() {
        log::debug!("no configuration at {}, using defaults", path.display());
        return Ok(AnalysisConfig::default());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read configuration {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&json)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;
    log::info!("configuration loaded from {}", path.display());
    Ok(config)
}

pub fn save_config(config: &AnalysisConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).with_context(|| format!("Cannot write configuration {}", path.display()))?;
    Ok(())
}
