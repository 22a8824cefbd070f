use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::classify::{Thresholds, DEFAULT_IDLE_THRESHOLD, DEFAULT_SENSITIVITY};
use crate::engine::EngineConfig;
use crate::gait::DEFAULT_GAIT_WINDOW;
use crate::ingest::{SourceConfig, DEFAULT_CHANNELS, DEFAULT_RATE_HZ, DEFAULT_SOURCE_URL};

const DEFAULT_ARMED: bool = true;
const DEFAULT_CALIBRATION_SAMPLES: usize = 50;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct OmnisenseConfigFile {
    armed: Option<bool>,
    classifier: Option<ClassifierConfigFile>,
    calibration: Option<CalibrationConfigFile>,
    gait: Option<GaitConfigFile>,
    source: Option<SourceConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ClassifierConfigFile {
    sensitivity: Option<f64>,
    idle_threshold: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CalibrationConfigFile {
    samples: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct GaitConfigFile {
    window: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SourceConfigFile {
    url: Option<String>,
    channels: Option<usize>,
    rate_hz: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct OmnisenseConfig {
    pub armed: bool,
    pub sensitivity: f64,
    pub idle_threshold: f64,
    pub calibration_samples: usize,
    pub gait_window: usize,
    pub source: SourceConfig,
}

impl OmnisenseConfig {
    /// Load from the file named by `OMNISENSE_CONFIG` (if set), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("OMNISENSE_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Load from an explicit file (or defaults when `None`), then apply
    /// environment overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => OmnisenseConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: OmnisenseConfigFile) -> Self {
        let classifier = file.classifier.unwrap_or_default();
        let source = file.source.unwrap_or_default();
        Self {
            armed: file.armed.unwrap_or(DEFAULT_ARMED),
            sensitivity: classifier.sensitivity.unwrap_or(DEFAULT_SENSITIVITY),
            idle_threshold: classifier
                .idle_threshold
                .unwrap_or(DEFAULT_IDLE_THRESHOLD),
            calibration_samples: file
                .calibration
                .and_then(|c| c.samples)
                .unwrap_or(DEFAULT_CALIBRATION_SAMPLES),
            gait_window: file
                .gait
                .and_then(|g| g.window)
                .unwrap_or(DEFAULT_GAIT_WINDOW),
            source: SourceConfig {
                url: source
                    .url
                    .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
                channels: source.channels.unwrap_or(DEFAULT_CHANNELS),
                rate_hz: source.rate_hz.unwrap_or(DEFAULT_RATE_HZ),
                seed: source.seed,
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(sensitivity) = std::env::var("OMNISENSE_SENSITIVITY") {
            self.sensitivity = sensitivity
                .trim()
                .parse()
                .map_err(|_| anyhow!("OMNISENSE_SENSITIVITY must be a number"))?;
        }
        if let Ok(armed) = std::env::var("OMNISENSE_ARMED") {
            self.armed = parse_bool(&armed)
                .ok_or_else(|| anyhow!("OMNISENSE_ARMED must be true/false (or 1/0)"))?;
        }
        if let Ok(url) = std::env::var("OMNISENSE_SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source.url = url;
            }
        }
        if let Ok(rate) = std::env::var("OMNISENSE_RATE_HZ") {
            self.source.rate_hz = rate
                .trim()
                .parse()
                .map_err(|_| anyhow!("OMNISENSE_RATE_HZ must be an integer"))?;
        }
        Ok(())
    }

    /// Check invariants. Call again after applying command-line overrides.
    pub fn validate(&self) -> Result<()> {
        self.thresholds()?;
        if self.calibration_samples == 0 {
            return Err(anyhow!("calibration.samples must be at least 1"));
        }
        if self.gait_window == 0 {
            return Err(anyhow!("gait.window must be at least 1"));
        }
        if self.source.channels == 0 {
            return Err(anyhow!("source.channels must be at least 1"));
        }
        if self.source.rate_hz == 0 {
            return Err(anyhow!("source.rate_hz must be at least 1"));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Result<Thresholds> {
        Ok(Thresholds::new(self.idle_threshold, self.sensitivity)?)
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            thresholds: self.thresholds()?,
            armed: self.armed,
        })
    }
}

fn read_config_file(path: &Path) -> Result<OmnisenseConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_file() {
        let cfg = OmnisenseConfig::from_file(OmnisenseConfigFile::default());
        assert!(cfg.armed);
        assert_eq!(cfg.sensitivity, 0.75);
        assert_eq!(cfg.idle_threshold, 0.1);
        assert_eq!(cfg.calibration_samples, 50);
        assert_eq!(cfg.gait_window, DEFAULT_GAIT_WINDOW);
        assert_eq!(cfg.source.url, "stub://cycle");
        assert_eq!(cfg.source.channels, 64);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn source_defaults_match_source_config() {
        let cfg = OmnisenseConfig::from_file(OmnisenseConfigFile::default());
        assert_eq!(cfg.source, SourceConfig::default());
        assert_eq!(cfg.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(cfg.source.rate_hz, DEFAULT_RATE_HZ);
    }

    #[test]
    fn validate_accepts_small_positive_sensitivity() {
        let mut cfg = OmnisenseConfig::from_file(OmnisenseConfigFile::default());
        cfg.sensitivity = 0.05;
        assert!(cfg.validate().is_ok());
        cfg.sensitivity = 0.0;
        assert!(cfg.validate().is_err());
        cfg.sensitivity = 0.75;
        cfg.idle_threshold = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_sizes() {
        let mut cfg = OmnisenseConfig::from_file(OmnisenseConfigFile::default());
        cfg.gait_window = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parses_bool_spellings() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let parsed: Result<OmnisenseConfigFile, _> = toml::from_str("sensitivty = 0.8\n");
        assert!(parsed.is_err());
    }
}
