//! Container sizing and scale range applied on every update.

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// CPU, memory and replica range for the container app.
///
/// Defaults are cost-optimised: a fractional core and `min_replicas = 0`
/// so the app scales to zero when idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSizing {
    /// CPU cores, as the control plane expects them (e.g. `"0.5"`).
    pub cpu: String,
    /// Memory quantity (e.g. `"1.0Gi"`).
    pub memory: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
}

impl Default for ResourceSizing {
    fn default() -> Self {
        Self {
            cpu: "0.5".to_owned(),
            memory: "1.0Gi".to_owned(),
            min_replicas: 0,
            max_replicas: 3,
        }
    }
}

const MIN_CPU: f64 = 0.25;
const MAX_CPU: f64 = 4.0;

impl ResourceSizing {
    /// Validate the replica range and quantity formats.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cpu_ok = self
            .cpu
            .parse::<f64>()
            .is_ok_and(|c| (MIN_CPU..=MAX_CPU).contains(&c));
        if !cpu_ok {
            return Err(ConfigError::InvalidValue {
                key: "sizing.cpu",
                value: self.cpu.clone(),
                hint: "Use a core count between 0.25 and 4.0, e.g. \"0.5\".",
            });
        }
        let mem_ok = self
            .memory
            .strip_suffix("Gi")
            .and_then(|m| m.parse::<f64>().ok())
            .is_some_and(|m| m > 0.0);
        if !mem_ok {
            return Err(ConfigError::InvalidValue {
                key: "sizing.memory",
                value: self.memory.clone(),
                hint: "Use a quantity in Gi, e.g. \"1.0Gi\".",
            });
        }
        if self.max_replicas == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sizing.max_replicas",
                value: self.max_replicas.to_string(),
                hint: "max_replicas must be at least 1.",
            });
        }
        if self.min_replicas > self.max_replicas {
            return Err(ConfigError::InvalidValue {
                key: "sizing.min_replicas",
                value: self.min_replicas.to_string(),
                hint: "min_replicas must not exceed max_replicas.",
            });
        }
        Ok(())
    }
}
