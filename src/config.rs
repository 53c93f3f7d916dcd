//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.logaz.toml` files.

use crate::analysis::Thresholds;
use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".logaz.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Anomaly thresholds and report sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Percentage of entries one level may reach before it is flagged.
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate_threshold: f64,

    /// Percentage of entries one client may reach before it is flagged.
    #[serde(default = "default_ip_access_threshold")]
    pub ip_access_threshold: f64,

    /// Number of clients listed in the most-active table.
    #[serde(default = "default_top_ips")]
    pub top_ips: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            error_rate_threshold: default_error_rate_threshold(),
            ip_access_threshold: default_ip_access_threshold(),
            top_ips: default_top_ips(),
        }
    }
}

fn default_error_rate_threshold() -> f64 {
    10.0
}

fn default_ip_access_threshold() -> f64 {
    20.0
}

fn default_top_ips() -> usize {
    5
}

impl AnalysisConfig {
    /// Thresholds for the anomaly detector.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            error_rate: self.error_rate_threshold,
            ip_access_rate: self.ip_access_threshold,
        }
    }

    /// Reject values the command line would also refuse.
    pub fn validate(&self) -> Result<()> {
        if self.top_ips == 0 {
            bail!("top_ips must be at least 1");
        }

        for (key, pct) in [
            ("error_rate_threshold", self.error_rate_threshold),
            ("ip_access_threshold", self.ip_access_threshold),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                bail!("{} must be between 0 and 100, got {}", key, pct);
            }
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .analysis
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if let Some(top) = args.top {
            self.analysis.top_ips = top;
        }
        if let Some(threshold) = args.error_threshold {
            self.analysis.error_rate_threshold = threshold;
        }
        if let Some(threshold) = args.ip_threshold {
            self.analysis.ip_access_threshold = threshold;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.error_rate_threshold, 10.0);
        assert_eq!(config.analysis.ip_access_threshold, 20.0);
        assert_eq!(config.analysis.top_ips, 5);
        assert_eq!(config.general.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
format = "json"

[analysis]
error_rate_threshold = 5.5
top_ips = 10
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.analysis.error_rate_threshold, 5.5);
        assert_eq!(config.analysis.ip_access_threshold, 20.0);
        assert_eq!(config.analysis.top_ips, 10);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("error_rate_threshold"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.analysis.top_ips, 5);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[analysis]\nip_access_threshold = 35.0\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.analysis.ip_access_threshold, 35.0);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not = [valid").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_cli_overrides_only_explicit_values() {
        let mut config: Config =
            toml::from_str("[analysis]\nerror_rate_threshold = 3.0\ntop_ips = 8\n").unwrap();

        let args = Args::parse_from(["logaz", "access.log", "--top", "2"]);
        config.merge_with_args(&args);

        assert_eq!(config.analysis.top_ips, 2);
        assert_eq!(config.analysis.error_rate_threshold, 3.0);
        assert_eq!(config.general.format, OutputFormat::Text);

        let thresholds = config.analysis.thresholds();
        assert_eq!(thresholds.error_rate, 3.0);
        assert_eq!(thresholds.ip_access_rate, 20.0);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let config: Config = toml::from_str("[analysis]\ntop_ips = 0\n").unwrap();
        assert!(config.analysis.validate().is_err());

        let config: Config =
            toml::from_str("[analysis]\nerror_rate_threshold = -5.0\n").unwrap();
        assert!(config.analysis.validate().is_err());

        let config: Config =
            toml::from_str("[analysis]\nip_access_threshold = 250.0\n").unwrap();
        let err = config.analysis.validate().unwrap_err();
        assert!(err.to_string().contains("ip_access_threshold"));

        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[analysis]\ntop_ips = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("top_ips must be at least 1"));
    }
}
