//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/therapy/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::GlucoseUnit;
use crate::{Error, Result};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub guardrails: GuardrailConfig,

    #[serde(default)]
    pub presets: PresetConfig,
}

/// Display preferences
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub unit: GlucoseUnit,
}

/// Safety bounds applied to user-entered override settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuardrailConfig {
    #[serde(default = "default_scale_factor_min")]
    pub insulin_needs_scale_factor_min: f64,

    #[serde(default = "default_scale_factor_max")]
    pub insulin_needs_scale_factor_max: f64,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            insulin_needs_scale_factor_min: default_scale_factor_min(),
            insulin_needs_scale_factor_max: default_scale_factor_max(),
        }
    }
}

impl GuardrailConfig {
    /// True when `factor` passes the configured bounds
    pub fn allows_scale_factor(&self, factor: f64) -> bool {
        factor >= self.insulin_needs_scale_factor_min
            && factor <= self.insulin_needs_scale_factor_max
    }
}

/// Preset defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default = "default_duration_seconds")]
    pub default_duration_seconds: f64,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            default_duration_seconds: default_duration_seconds(),
        }
    }
}

// Default value functions
fn default_scale_factor_min() -> f64 {
    0.1
}

fn default_scale_factor_max() -> f64 {
    2.0
}

fn default_duration_seconds() -> f64 {
    3600.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject nonsensical guardrail or preset values
    pub fn validate(&self) -> Result<()> {
        if self.guardrails.insulin_needs_scale_factor_min <= 0.0 {
            return Err(Error::Config(
                "insulin_needs_scale_factor_min must be positive".into(),
            ));
        }
        if self.guardrails.insulin_needs_scale_factor_max
            < self.guardrails.insulin_needs_scale_factor_min
        {
            return Err(Error::Config(
                "insulin_needs_scale_factor_max must be >= the minimum".into(),
            ));
        }
        if self.presets.default_duration_seconds <= 0.0 {
            return Err(Error::Config(
                "default_duration_seconds must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("therapy").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.guardrails.insulin_needs_scale_factor_min, 0.1);
        assert_eq!(config.guardrails.insulin_needs_scale_factor_max, 2.0);
        assert_eq!(config.presets.default_duration_seconds, 3600.0);
        assert_eq!(config.display.unit, GlucoseUnit::MilligramsPerDeciliter);
    }

    #[test]
    fn test_guardrail_bounds() {
        let config = Config::default();
        assert!(config.guardrails.allows_scale_factor(0.5));
        assert!(config.guardrails.allows_scale_factor(2.0));
        assert!(!config.guardrails.allows_scale_factor(0.05));
        assert!(!config.guardrails.allows_scale_factor(2.5));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::default();
        config.save_to(&path).unwrap();
        let parsed = Config::load_from(&path).unwrap();

        assert_eq!(
            config.guardrails.insulin_needs_scale_factor_max,
            parsed.guardrails.insulin_needs_scale_factor_max
        );
        assert_eq!(
            config.presets.default_duration_seconds,
            parsed.presets.default_duration_seconds
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[guardrails]
insulin_needs_scale_factor_max = 1.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.guardrails.insulin_needs_scale_factor_max, 1.5);
        assert_eq!(config.guardrails.insulin_needs_scale_factor_min, 0.1); // default
        assert_eq!(config.presets.default_duration_seconds, 3600.0); // default
    }

    #[test]
    fn test_invalid_guardrails_rejected() {
        let toml_str = r#"
[guardrails]
insulin_needs_scale_factor_min = 1.0
insulin_needs_scale_factor_max = 0.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }
}
