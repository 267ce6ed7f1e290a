use serde::Deserialize;
use std::path::Path;

use crate::dimension::Dimension;

/// Top-level config loaded from `sr-pulse.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PulseConfig {
    #[serde(default = "default_z_score_warning")]
    pub z_score_warning: f64,
    #[serde(default = "default_z_score_critical")]
    pub z_score_critical: f64,
    #[serde(default = "default_trend_significance")]
    pub trend_significance: f64,
    #[serde(default = "default_variation_threshold_percent")]
    pub variation_threshold_percent: f64,
    #[serde(default = "default_surge_alarming")]
    pub surge_alarming: f64,
    #[serde(default = "default_surge_critical")]
    pub surge_critical: f64,
    #[serde(default = "default_widespread_region_count")]
    pub widespread_region_count: u32,
    #[serde(default = "default_baseline_windows")]
    pub baseline_windows: Vec<u32>,
    #[serde(default = "default_connection_pool_size")]
    pub connection_pool_size: u32,
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<Dimension>,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            z_score_warning: default_z_score_warning(),
            z_score_critical: default_z_score_critical(),
            trend_significance: default_trend_significance(),
            variation_threshold_percent: default_variation_threshold_percent(),
            surge_alarming: default_surge_alarming(),
            surge_critical: default_surge_critical(),
            widespread_region_count: default_widespread_region_count(),
            baseline_windows: default_baseline_windows(),
            connection_pool_size: default_connection_pool_size(),
            dimensions: default_dimensions(),
        }
    }
}

fn default_z_score_warning() -> f64 {
    2.0
}

fn default_z_score_critical() -> f64 {
    3.0
}

fn default_trend_significance() -> f64 {
    0.05
}

fn default_variation_threshold_percent() -> f64 {
    15.0
}

fn default_surge_alarming() -> f64 {
    20.0
}

fn default_surge_critical() -> f64 {
    50.0
}

fn default_widespread_region_count() -> u32 {
    3
}

fn default_baseline_windows() -> Vec<u32> {
    vec![7, 14, 30]
}

fn default_connection_pool_size() -> u32 {
    5
}

fn default_dimensions() -> Vec<Dimension> {
    Dimension::ALL.to_vec()
}

impl PulseConfig {
    /// Load config from a TOML file. Returns defaults if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: PulseConfig = toml::from_str(&contents)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }
}
