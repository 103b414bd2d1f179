//! TOML-based application configuration.
//!
//! Stores:
//! - The study channel to track
//! - Reward pricing (unit threshold and millisecond debit)
//! - Accrual timing (tick period and optimistic cap)
//! - Chat surface details (command prefix, currency name, reward API)
//!
//! Configuration is stored at `<data dir>/config.toml`. Environment
//! variables override file values at startup, see [`Config::apply_env`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use super::snapshot::SNAPSHOT_FILE_NAME;
use crate::accrual::{DEFAULT_OPTIMISTIC_CAP_MS, DEFAULT_TICK_PERIOD_MS, MS_PER_UNIT};
use crate::error::ConfigError;

/// Reward pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Units a member must hold to redeem.
    #[serde(default = "default_reward_cost_units")]
    pub reward_cost_units: u64,
    /// Milliseconds debited per redemption.
    #[serde(default = "default_reward_cost_ms")]
    pub reward_cost_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Voice channel whose members accrue study time. Required to run.
    #[serde(default)]
    pub study_channel_id: Option<String>,
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    #[serde(default = "default_optimistic_cap_ms")]
    pub optimistic_cap_ms: u64,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default = "default_currency_name")]
    pub currency_name: String,
    #[serde(default = "default_reward_api_url")]
    pub reward_api_url: String,
    /// Snapshot file override. Defaults to `<data dir>/data.json`.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Validated redemption pricing, handed to the command facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPricing {
    pub cost_units: u64,
    pub cost_ms: u64,
}

impl Default for RewardPricing {
    fn default() -> Self {
        Self {
            cost_units: default_reward_cost_units(),
            cost_ms: default_reward_cost_ms(),
        }
    }
}

// Default functions
fn default_reward_cost_units() -> u64 {
    10
}
fn default_reward_cost_ms() -> u64 {
    10 * 60 * 1000
}
fn default_tick_period_ms() -> u64 {
    DEFAULT_TICK_PERIOD_MS
}
fn default_optimistic_cap_ms() -> u64 {
    DEFAULT_OPTIMISTIC_CAP_MS
}
fn default_command_prefix() -> String {
    "!".into()
}
fn default_currency_name() -> String {
    "Grizzly Gems".into()
}
fn default_reward_api_url() -> String {
    "https://api.thecatapi.com/v1/images/search".into()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            reward_cost_units: default_reward_cost_units(),
            reward_cost_ms: default_reward_cost_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            study_channel_id: None,
            pricing: PricingConfig::default(),
            tick_period_ms: default_tick_period_ms(),
            optimistic_cap_ms: default_optimistic_cap_ms(),
            command_prefix: default_command_prefix(),
            currency_name: default_currency_name(),
            reward_api_url: default_reward_api_url(),
            snapshot_path: None,
        }
    }
}

/// Environment overrides: (variable, dot-path key). Earlier entries for the
/// same key win.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("STUDYBEAR_STUDY_CHANNEL_ID", "study_channel_id"),
    ("STUDY_CHANNEL_ID", "study_channel_id"),
    ("STUDYBEAR_REWARD_COST_UNITS", "pricing.reward_cost_units"),
    ("STUDYBEAR_REWARD_COST_MS", "pricing.reward_cost_ms"),
    ("STUDYBEAR_TICK_PERIOD_MS", "tick_period_ms"),
    ("STUDYBEAR_OPTIMISTIC_CAP_MS", "optimistic_cap_ms"),
    ("STUDYBEAR_SNAPSHOT_PATH", "snapshot_path"),
];

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let new_value = match obj.get(part) {
                    Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    Some(serde_json::Value::Number(_)) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?
                            .into(),
                    ),
                    Some(_) => serde_json::Value::String(value.into()),
                    None => return Err(unknown()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Location of the config file.
    pub fn file_path() -> Result<PathBuf, ConfigError> {
        Self::path()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value in memory by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied: Vec<&str> = Vec::new();
        for &(var, key) in ENV_OVERRIDES {
            if applied.contains(&key) {
                continue;
            }
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                self.set_value(key, value.trim())?;
                applied.push(key);
            }
        }
        Ok(())
    }

    /// Load from disk and apply the process environment.
    pub fn load_with_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|var| std::env::var(var).ok())?;
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// The configured study channel.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` when no channel is configured.
    pub fn study_channel_id(&self) -> Result<&str, ConfigError> {
        self.study_channel_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigError::MissingKey("study_channel_id".into()))
    }

    /// Check everything the bot needs before it starts ticking.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.study_channel_id()?;
        if self.tick_period_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tick_period_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.optimistic_cap_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "optimistic_cap_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        self.pricing()?;
        if self.command_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "command_prefix".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Redemption pricing.
    ///
    /// # Errors
    ///
    /// The debit may not exceed what the unit threshold guarantees the
    /// member holds, otherwise a validated redemption could overdraw.
    pub fn pricing(&self) -> Result<RewardPricing, ConfigError> {
        let PricingConfig {
            reward_cost_units,
            reward_cost_ms,
        } = self.pricing;
        if reward_cost_ms > reward_cost_units.saturating_mul(MS_PER_UNIT) {
            return Err(ConfigError::InvalidValue {
                key: "pricing.reward_cost_ms".into(),
                message: format!(
                    "{reward_cost_ms} ms exceeds the {reward_cost_units} unit threshold"
                ),
            });
        }
        Ok(RewardPricing {
            cost_units: reward_cost_units,
            cost_ms: reward_cost_ms,
        })
    }

    /// Where the registry snapshot lives.
    pub fn snapshot_file(&self) -> Result<PathBuf, ConfigError> {
        match &self.snapshot_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(SNAPSHOT_FILE_NAME)),
        }
    }
}
