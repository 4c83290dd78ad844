//! Configuration management with YAML support

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::siting::ScoringWeights;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Default owner stamped on new projects
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub currency: CurrencyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub siting: SitingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Baseline horizon used when a project has no target end date
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: u64,
}

/// CAD -> USD exchange rate lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,

    /// Tried in order; the first valid answer wins
    #[serde(default = "default_rate_providers")]
    pub providers: Vec<RateProviderConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateProviderConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitingConfig {
    #[serde(default)]
    pub weights: ScoringWeights,
}

// Default value functions
fn default_database_path() -> String {
    "~/.local/share/voltbuild/voltbuild.db".to_string()
}

fn default_horizon_days() -> u64 {
    180
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_fallback_rate() -> f64 {
    0.74
}

fn default_rate_providers() -> Vec<RateProviderConfig> {
    vec![
        RateProviderConfig {
            name: "exchangerate-api".to_string(),
            url: "https://api.exchangerate-api.com/v4/latest/CAD".to_string(),
        },
        RateProviderConfig {
            name: "open-er-api".to_string(),
            url: "https://open.er-api.com/v6/latest/CAD".to_string(),
        },
        RateProviderConfig {
            name: "frankfurter".to_string(),
            url: "https://api.frankfurter.app/latest?from=CAD&to=USD".to_string(),
        },
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: default_horizon_days(),
        }
    }
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            fallback_rate: default_fallback_rate(),
            providers: default_rate_providers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./voltbuild.yaml (current directory)
    /// 3. ~/.config/voltbuild/voltbuild.yaml
    pub fn load(path: &str) -> Result<Self> {
        let mut search_paths = vec![
            PathBuf::from(shellexpand::tilde(path).to_string()),
            PathBuf::from("voltbuild.yaml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("voltbuild").join("voltbuild.yaml"));
        }

        for search_path in &search_paths {
            if search_path.exists() {
                let content = std::fs::read_to_string(search_path)
                    .with_context(|| format!("reading {}", search_path.display()))?;
                let config: Config = serde_yaml::from_str(&content)
                    .with_context(|| format!("parsing {}", search_path.display()))?;
                config
                    .siting
                    .weights
                    .validate()
                    .with_context(|| format!("siting weights in {}", search_path.display()))?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.path).to_string();
        PathBuf::from(expanded)
    }

    /// Owner for new projects: configured value, then $USER, then "local"
    pub fn owner_id(&self) -> String {
        self.owner
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "local".to_string())
    }
}
