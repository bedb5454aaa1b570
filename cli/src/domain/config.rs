//! Domain types and validators for lens-deploy configuration.
//!
//! Pure functions only; no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::sizing::ResourceSizing;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.lens-deploy/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DeployConfig {
    pub defaults: TargetDefaults,
    pub sizing: ResourceSizing,
    pub verify: VerifySettings,
    pub build: BuildSettings,
}

/// Fallbacks for target flags that were not given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TargetDefaults {
    pub prefix: Option<String>,
    pub location: String,
    pub image_name: String,
}

impl Default for TargetDefaults {
    fn default() -> Self {
        Self {
            prefix: None,
            location: "germanywestcentral".to_owned(),
            image_name: "bundestag-lens".to_owned(),
        }
    }
}

/// Settle periods and request timeout for the post-deploy check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifySettings {
    /// Wait before probing when no image was built.
    pub fast_settle_secs: u64,
    /// Wait before probing after a new image was rolled out.
    pub full_settle_secs: u64,
    pub timeout_secs: u64,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            fast_settle_secs: 30,
            full_settle_secs: 60,
            timeout_secs: 30,
        }
    }
}

impl VerifySettings {
    #[must_use]
    pub fn settle(&self, rebuilt: bool) -> Duration {
        Duration::from_secs(if rebuilt {
            self.full_settle_secs
        } else {
            self.fast_settle_secs
        })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build executor tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSettings {
    /// Upper bound on the registry cache pull before building without cache.
    pub cache_pull_timeout_secs: u64,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            cache_pull_timeout_secs: 60,
        }
    }
}

impl BuildSettings {
    #[must_use]
    pub fn cache_pull_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_pull_timeout_secs)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validate a loaded configuration.
///
/// # Errors
///
/// Returns an error naming the first invalid key.
pub fn validate_config(config: &DeployConfig) -> Result<()> {
    config.sizing.validate()?;
    if config.verify.timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "verify.timeout_secs",
            value: "0".to_owned(),
            hint: "The health request needs a timeout of at least one second.",
        }
        .into());
    }
    if config.build.cache_pull_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "build.cache_pull_timeout_secs",
            value: "0".to_owned(),
            hint: "Use a positive number of seconds.",
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
