//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Default lockdown duration and tick cadence
//! - Whether starting a lockdown asks for confirmation
//! - The emergency password
//! - Optional numbers for the call/message shortcuts
//!
//! Configuration is stored at `~/.config/techdetox/config.toml`. Lockdown
//! progress itself is never written here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::emergency::{FixedPassword, DEFAULT_EMERGENCY_PASSWORD};
use crate::error::ConfigError;
use crate::lockdown::{DEFAULT_HOURS, DEFAULT_MINUTES};

/// Lockdown defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockdownSettings {
    #[serde(default = "default_hours")]
    pub default_hours: u64,
    #[serde(default = "default_minutes")]
    pub default_minutes: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_true")]
    pub confirm_start: bool,
}

/// Emergency override configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencySettings {
    #[serde(default = "default_password")]
    pub password: String,
}

/// Communication shortcut targets. Empty means "open the app without a number".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactsSettings {
    #[serde(default)]
    pub dialer_number: String,
    #[serde(default)]
    pub messaging_number: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/techdetox/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lockdown: LockdownSettings,
    #[serde(default)]
    pub emergency: EmergencySettings,
    #[serde(default)]
    pub contacts: ContactsSettings,
}

fn default_hours() -> u64 {
    DEFAULT_HOURS
}
fn default_minutes() -> u64 {
    DEFAULT_MINUTES
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_password() -> String {
    DEFAULT_EMERGENCY_PASSWORD.into()
}

impl Default for LockdownSettings {
    fn default() -> Self {
        Self {
            default_hours: default_hours(),
            default_minutes: default_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
            confirm_start: true,
        }
    }
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            password: default_password(),
        }
    }
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
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a non-negative integer")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot set a whole section".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `~/.config/techdetox[-dev]/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be resolved or created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Set a config value by key in memory. Call [`save`](Self::save) to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn emergency_credential(&self) -> FixedPassword {
        FixedPassword::new(self.emergency.password.clone())
    }

    pub fn dialer_number(&self) -> Option<&str> {
        Some(self.contacts.dialer_number.as_str()).filter(|n| !n.trim().is_empty())
    }

    pub fn messaging_number(&self) -> Option<&str> {
        Some(self.contacts.messaging_number.as_str()).filter(|n| !n.trim().is_empty())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.lockdown.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emergency::CredentialCheck;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.lockdown.default_hours, 5);
        assert_eq!(parsed.emergency.password, "1234");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[lockdown]\ndefault_hours = 2\n").unwrap();
        assert_eq!(parsed.lockdown.default_hours, 2);
        assert_eq!(parsed.lockdown.default_minutes, 0);
        assert_eq!(parsed.lockdown.tick_interval_ms, 1000);
        assert!(parsed.lockdown.confirm_start);
        assert_eq!(parsed.emergency.password, "1234");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("lockdown.confirm_start").as_deref(), Some("true"));
        assert_eq!(cfg.get("lockdown.default_hours").as_deref(), Some("5"));
        assert_eq!(cfg.get("emergency.password").as_deref(), Some("1234"));
        assert!(cfg.get("lockdown.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("lockdown.confirm_start", "false").unwrap();
        cfg.set("lockdown.default_minutes", "45").unwrap();
        cfg.set("contacts.dialer_number", "+15550100").unwrap();
        assert!(!cfg.lockdown.confirm_start);
        assert_eq!(cfg.lockdown.default_minutes, 45);
        assert_eq!(cfg.dialer_number(), Some("+15550100"));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("lockdown.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("lockdown.confirm_start", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("lockdown.default_hours", "-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("lockdown", "x"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn emergency_credential_uses_configured_password() {
        let mut cfg = Config::default();
        cfg.set("emergency.password", "letmeout").unwrap();
        assert!(cfg.emergency_credential().verify("letmeout"));
        assert!(!cfg.emergency_credential().verify("1234"));
    }

    #[test]
    fn blank_contacts_mean_no_number() {
        let cfg = Config::default();
        assert_eq!(cfg.dialer_number(), None);
        assert_eq!(cfg.messaging_number(), None);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.lockdown.default_hours, 5);
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("emergency.password", "open-sesame").unwrap();
        cfg.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.emergency.password, "open-sesame");
    }

    #[test]
    fn load_from_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "lockdown = [not toml").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn tick_interval_is_never_zero() {
        let mut cfg = Config::default();
        cfg.lockdown.tick_interval_ms = 0;
        assert_eq!(cfg.tick_interval(), std::time::Duration::from_millis(1));
    }
}
