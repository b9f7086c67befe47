//! Application configuration for rigmate.
//!
//! User config lives at `~/.rigmate/rigmate.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigmateError};
use crate::types::{UseCase, WeightVector};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "rigmate.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".rigmate";

// ---------------------------------------------------------------------------
// Config structs (matching rigmate.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Currency conversion rates for price normalization.
    #[serde(default)]
    pub rates: RatesConfig,

    /// Per-use-case score weight vectors.
    #[serde(default)]
    pub weights: WeightsConfig,

    /// Build-assembly tuning.
    #[serde(default)]
    pub assembly: AssemblyConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Catalog database path.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Default build budget in DZD.
    #[serde(default = "default_budget")]
    pub budget_dzd: u64,

    /// Default use case for `build` when none is given.
    #[serde(default = "default_use_case")]
    pub use_case: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            budget_dzd: default_budget(),
            use_case: default_use_case(),
        }
    }
}

fn default_db_path() -> String {
    "~/.rigmate/catalog.db".into()
}
fn default_budget() -> u64 {
    250_000
}
fn default_use_case() -> String {
    "balanced".into()
}

/// `[rates]` section: conversion into DZD for listings priced in
/// foreign currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default = "default_usd_rate")]
    pub usd_to_dzd: f64,

    #[serde(default = "default_eur_rate")]
    pub eur_to_dzd: f64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            usd_to_dzd: default_usd_rate(),
            eur_to_dzd: default_eur_rate(),
        }
    }
}

fn default_usd_rate() -> f64 {
    134.0
}
fn default_eur_rate() -> f64 {
    145.0
}

/// `[weights]` section: `[gaming, productivity, ai]` vectors per use case.
/// These are policy knobs, not contracts; only the weighted sum's use in
/// utility ranking is load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_gaming_weights")]
    pub gaming: WeightVector,

    #[serde(default = "default_productivity_weights")]
    pub productivity: WeightVector,

    #[serde(default = "default_ai_weights")]
    pub ai: WeightVector,

    #[serde(default = "default_balanced_weights")]
    pub balanced: WeightVector,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            gaming: default_gaming_weights(),
            productivity: default_productivity_weights(),
            ai: default_ai_weights(),
            balanced: default_balanced_weights(),
        }
    }
}

impl WeightsConfig {
    /// Resolve the weight vector for a use case.
    pub fn for_use_case(&self, use_case: UseCase) -> WeightVector {
        match use_case {
            UseCase::Gaming => self.gaming,
            UseCase::Productivity => self.productivity,
            UseCase::Ai => self.ai,
            UseCase::Balanced => self.balanced,
        }
    }
}

fn default_gaming_weights() -> WeightVector {
    [0.7, 0.2, 0.1]
}
fn default_productivity_weights() -> WeightVector {
    [0.1, 0.7, 0.2]
}
fn default_ai_weights() -> WeightVector {
    [0.1, 0.2, 0.7]
}
fn default_balanced_weights() -> WeightVector {
    [0.34, 0.33, 0.33]
}

/// `[assembly]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Maximum backtrack attempts per assembly run before settling for a
    /// best-effort PARTIAL result.
    #[serde(default = "default_backtrack_cap")]
    pub backtrack_cap: u32,

    /// Minimum token-overlap similarity for fuzzy name matches.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            backtrack_cap: default_backtrack_cap(),
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

fn default_backtrack_cap() -> u32 {
    32
}
fn default_fuzzy_threshold() -> f64 {
    0.5
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.rigmate/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RigmateError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.rigmate/rigmate.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RigmateError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RigmateError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RigmateError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RigmateError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RigmateError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` in a configured path.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
