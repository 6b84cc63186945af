use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::histogram::{ReconstructionConfig, FRAGMENT_TAG};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSettings {
    /// Literal marker in front of each base64 fragment.
    #[serde(default = "HistogramSettings::default_fragment_tag")]
    pub fragment_tag: String,
    #[serde(flatten)]
    pub reconstruction: ReconstructionConfig,
}

impl HistogramSettings {
    fn default_fragment_tag() -> String {
        FRAGMENT_TAG.to_string()
    }
}

impl Default for HistogramSettings {
    fn default() -> Self {
        Self {
            fragment_tag: Self::default_fragment_tag(),
            reconstruction: ReconstructionConfig::default(),
        }
    }
}

/// Sampling of the closed-form (Gaussian) volume curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default = "DistributionConfig::default_samples")]
    pub samples: usize,
    /// RBC x range in fL.
    #[serde(default = "DistributionConfig::default_rbc_range")]
    pub rbc_range: [f64; 2],
    /// PLT x range in fL.
    #[serde(default = "DistributionConfig::default_plt_range")]
    pub plt_range: [f64; 2],
}

impl DistributionConfig {
    fn default_samples() -> usize {
        1000
    }
    fn default_rbc_range() -> [f64; 2] {
        [0.0, 200.0]
    }
    fn default_plt_range() -> [f64; 2] {
        [0.0, 30.0]
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            samples: Self::default_samples(),
            rbc_range: Self::default_rbc_range(),
            plt_range: Self::default_plt_range(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Write every n-th curve sample into HTML data tables.
    #[serde(default = "ExportConfig::default_html_table_stride")]
    pub html_table_stride: usize,
}

impl ExportConfig {
    fn default_html_table_stride() -> usize {
        20
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            html_table_stride: Self::default_html_table_stride(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub histogram: HistogramSettings,
    #[serde(default)]
    pub distribution: DistributionConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .histogram
            .reconstruction
            .validate()
            .with_context(|| format!("validating config {}", path.display()))?;
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing or broken file yields defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => {
                log::info!("loaded config from {}", path.display());
                cfg
            }
            Err(err) => {
                log::warn!("{err:#}. Using defaults.");
                Self::default()
            }
        }
    }
}
