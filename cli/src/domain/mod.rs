//! Domain layer: pure deployment rules, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod changes;
pub mod config;
pub mod env;
pub mod error;
pub mod fingerprint;
pub mod inputs;
pub mod sizing;
pub mod target;
pub mod tier;
pub mod verify;

pub use config::{DeployConfig, validate_config};
pub use env::{EnvironmentConfig, Secrets};
pub use error::{ConfigError, DeployError, TargetError};
pub use fingerprint::FileDigest;
pub use inputs::BuildInputs;
pub use sizing::ResourceSizing;
pub use target::{DeploymentTarget, TargetSpec};
pub use tier::TierFlags;
