//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clipboard::ClipboardBackend;
use crate::core::errors::{PwoError, Result};
use crate::options::policy::PolicyConstraint;

/// Upper limit for the copy confirmation lifetime.
pub const MAX_NOTICE_TIMEOUT_SECS: u64 = 300;
/// Upper limit for the preferences write debounce.
pub const MAX_WRITE_DEBOUNCE_MS: u64 = 60_000;

/// Full pwopts configuration model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub store: StoreConfig,
    pub tracking: TrackingConfig,
    pub clipboard: ClipboardConfig,
    /// Policy applied to every session unless the command line supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyConstraint>,
}

/// Filesystem paths used by pwopts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub preferences_file: PathBuf,
    pub tracking_log: PathBuf,
    pub tracking_fallback_log: Option<PathBuf>,
}

/// Preferences persistence knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Coalesce saves arriving within this window. Zero writes every edit.
    pub write_debounce_ms: u64,
}

/// Usage tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackingConfig {
    pub enabled: bool,
    /// Report events under the autofill stream.
    pub autofill: bool,
}

/// Copy behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClipboardConfig {
    pub backend: ClipboardBackend,
    pub notice_timeout_secs: u64,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[PWO-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("pwopts");
        let data = home_dir.join(".local").join("share").join("pwopts");
        Self {
            config_file: cfg.join("config.toml"),
            preferences_file: cfg.join("preferences.json"),
            tracking_log: data.join("tracking.jsonl"),
            tracking_fallback_log: Some(env::temp_dir().join("pwopts-tracking.jsonl")),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            autofill: false,
        }
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            backend: ClipboardBackend::Osc52,
            notice_timeout_secs: 2,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn write_debounce(&self) -> Duration {
        Duration::from_millis(self.write_debounce_ms)
    }
}

impl ClipboardConfig {
    #[must_use]
    pub const fn notice_timeout(&self) -> Duration {
        Duration::from_secs(self.notice_timeout_secs)
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| PwoError::io(&path_buf, source))?;
            toml::from_str::<Self>(&raw)?
        } else if path.is_some() {
            return Err(PwoError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for log correlation.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // paths
        if let Some(raw) = lookup("PWO_PREFERENCES_FILE") {
            self.paths.preferences_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("PWO_TRACKING_LOG") {
            self.paths.tracking_log = PathBuf::from(raw);
        }

        // store
        if let Some(raw) = lookup("PWO_STORE_WRITE_DEBOUNCE_MS") {
            self.store.write_debounce_ms = parse_env_u64("PWO_STORE_WRITE_DEBOUNCE_MS", &raw)?;
        }

        // tracking
        if let Some(raw) = lookup("PWO_TRACKING_ENABLED") {
            self.tracking.enabled = parse_env_bool("PWO_TRACKING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("PWO_TRACKING_AUTOFILL") {
            self.tracking.autofill = parse_env_bool("PWO_TRACKING_AUTOFILL", &raw)?;
        }

        // clipboard
        if let Some(raw) = lookup("PWO_CLIPBOARD_BACKEND") {
            self.clipboard.backend = parse_backend("PWO_CLIPBOARD_BACKEND", &raw)?;
        }
        if let Some(raw) = lookup("PWO_CLIPBOARD_NOTICE_TIMEOUT_SECS") {
            self.clipboard.notice_timeout_secs =
                parse_env_u64("PWO_CLIPBOARD_NOTICE_TIMEOUT_SECS", &raw)?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.clipboard.notice_timeout_secs > MAX_NOTICE_TIMEOUT_SECS {
            return Err(PwoError::InvalidConfig {
                details: format!(
                    "clipboard.notice_timeout_secs must be <= {MAX_NOTICE_TIMEOUT_SECS}, got {}",
                    self.clipboard.notice_timeout_secs
                ),
            });
        }
        if self.store.write_debounce_ms > MAX_WRITE_DEBOUNCE_MS {
            return Err(PwoError::InvalidConfig {
                details: format!(
                    "store.write_debounce_ms must be <= {MAX_WRITE_DEBOUNCE_MS}, got {}",
                    self.store.write_debounce_ms
                ),
            });
        }
        if self.paths.preferences_file.as_os_str().is_empty() {
            return Err(PwoError::InvalidConfig {
                details: "paths.preferences_file must not be empty".to_string(),
            });
        }
        if let Some(policy) = &self.policy
            && policy.min_length > policy.max_length
            && policy.max_length != 0
        {
            eprintln!(
                "[PWO-CONFIG] WARNING: policy.min_length {} exceeds max_length {}, length range ignored",
                policy.min_length, policy.max_length
            );
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|error| PwoError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| PwoError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_backend(name: &str, raw: &str) -> Result<ClipboardBackend> {
    match raw.trim() {
        "osc52" => Ok(ClipboardBackend::Osc52),
        "none" => Ok(ClipboardBackend::None),
        other => Err(PwoError::ConfigParse {
            context: "env",
            details: format!("{name}={other:?}: expected \"osc52\" or \"none\""),
        }),
    }
}
