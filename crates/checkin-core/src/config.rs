//! TOML-based application configuration.
//!
//! Stores:
//! - Wallet provider endpoint and an optional fixed account
//! - Contract address
//! - Target network and whether to auto-switch the wallet to it
//! - Transaction receipt polling
//! - Whether the client runs embedded in a host container
//!
//! Configuration is stored at `~/.config/daily-checkin/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chain::Network;
use crate::error::{ConfigError, Result};

/// Wallet provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// JSON-RPC endpoint of the wallet (Frame listens on 1248 by default).
    #[serde(default = "default_provider_url")]
    pub url: String,
    /// Act as this account instead of asking the wallet. Empty means ask.
    #[serde(default)]
    pub account: String,
}

/// Contract configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractConfig {
    #[serde(default = "default_contract_address")]
    pub address: String,
}

/// Receipt polling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionConfig {
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
}

/// Embedding host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Emit a `ready` event once the first state is shown.
    #[serde(default)]
    pub embedded: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/daily-checkin/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub transaction: TransactionConfig,
    #[serde(default)]
    pub host: HostConfig,
}

fn default_provider_url() -> String {
    "http://127.0.0.1:1248".into()
}
fn default_contract_address() -> String {
    "0x074F7bf0837ef40E042b14749Bd43bC0aCc30Aed".into()
}
fn default_receipt_poll_ms() -> u64 {
    2_000
}
fn default_receipt_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_provider_url(),
            account: String::new(),
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: default_contract_address(),
        }
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            receipt_poll_ms: default_receipt_poll_ms(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
        }
    }
}

/// Returns the configuration directory.
///
/// `DAILY_CHECKIN_CONFIG_DIR` overrides the location; otherwise
/// `~/.config/daily-checkin[-dev]/` based on `DAILY_CHECKIN_ENV`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("DAILY_CHECKIN_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join(".config");
            let env =
                std::env::var("DAILY_CHECKIN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("daily-checkin-dev")
            } else {
                base_dir.join("daily-checkin")
            }
        }
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

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
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(e.to_string()))?
                        .into(),
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// fails [`Config::validate`].
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// as the type already stored under it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transaction.receipt_poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "transaction.receipt_poll_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Fixed account, if configured.
    pub fn account(&self) -> Option<&str> {
        let account = self.provider.account.trim();
        (!account.is_empty()).then_some(account)
    }
}
