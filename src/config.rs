//! Engine configuration.
//!
//! Loaded once per process from JSON or the environment. Missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rights::Mode;

/// Environment variable selecting the permission mode (`rw` or `crud`).
pub const ENV_MODE: &str = "NSP_MODE";
/// Environment variable naming the group whose grants unauthenticated principals receive.
pub const ENV_GUEST_GROUP: &str = "NSP_GUEST_GROUP";

pub const DEFAULT_GUEST_GROUP: &str = "Guest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NspConfig {
    pub mode: Mode,
    pub guest_group: String,
}

impl Default for NspConfig {
    fn default() -> Self {
        NspConfig {
            mode: Mode::Rw,
            guest_group: DEFAULT_GUEST_GROUP.to_string(),
        }
    }
}

impl NspConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reads `NSP_MODE` and `NSP_GUEST_GROUP`, defaulting whatever is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`NspConfig::from_env`] but reading variables through `lookup`.
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` for an unknown mode or an empty guest group name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = NspConfig::default();
        if let Some(raw) = lookup(ENV_MODE) {
            config.mode = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_MODE.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(group) = lookup(ENV_GUEST_GROUP) {
            if group.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_GUEST_GROUP.to_string(),
                    value: group,
                });
            }
            config.guest_group = group;
        }
        tracing::debug!("Loaded config: mode={:?}, guest_group={}", config.mode, config.guest_group);
        Ok(config)
    }
}
