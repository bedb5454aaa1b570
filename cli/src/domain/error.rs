//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use lens_deploy_common::{DeploymentMode, ResourceKind};
use thiserror::Error;

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Fatal conditions that abort a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(
        "{kind} '{name}' does not exist (mode: {mode}).\n\
         Create it first, or re-run with --mode new to let lens-deploy create it."
    )]
    ResourceMissing {
        kind: ResourceKind,
        name: String,
        mode: DeploymentMode,
    },

    #[error("Required file missing: {path} ({role}).")]
    MissingInput { path: String, role: &'static str },

    #[error("Not logged in to the cloud CLI. Run 'az login' and retry.\n{detail}")]
    NotAuthenticated { detail: String },

    #[error("Registry login failed for '{registry}'.\n{detail}")]
    RegistryAuthFailed { registry: String, detail: String },

    #[error("--skip-build deploys an already published image; pass --image-tag <tag>.")]
    SkipBuildWithoutTag,

    #[error("Image {image} was built but could not be pushed.\n{detail}")]
    PublishFailed { image: String, detail: String },

    #[error("Remote build of {image} failed.\n{detail}")]
    BuildFailed { image: String, detail: String },

    #[error("Failed to {stage} on container app '{app}'.\n{detail}")]
    UpdateFailed {
        stage: &'static str,
        app: String,
        detail: String,
    },
}

impl DeployError {
    /// Stable machine-readable code for JSON error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ResourceMissing { .. } => "RESOURCE_MISSING",
            Self::MissingInput { .. } => "MISSING_INPUT",
            Self::NotAuthenticated { .. } => "NOT_AUTHENTICATED",
            Self::RegistryAuthFailed { .. } => "REGISTRY_AUTH_FAILED",
            Self::SkipBuildWithoutTag => "SKIP_BUILD_WITHOUT_TAG",
            Self::PublishFailed { .. } => "PUBLISH_FAILED",
            Self::BuildFailed { .. } => "BUILD_FAILED",
            Self::UpdateFailed { .. } => "UPDATE_FAILED",
        }
    }
}

// ── Target naming errors ──────────────────────────────────────────────────────

/// Invalid resource names, raised before any remote call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error(
        "Invalid prefix '{0}': start with a letter, then lowercase letters, digits and hyphens (2-20 chars)."
    )]
    InvalidPrefix(String),

    #[error(
        "Invalid registry name '{0}': must be 5-50 lowercase alphanumeric characters (no hyphens)."
    )]
    InvalidRegistry(String),

    #[error("Invalid {kind} name '{name}': use lowercase letters, digits and hyphens.")]
    InvalidName { kind: ResourceKind, name: String },

    #[error("Invalid image reference part '{0}'.")]
    InvalidImage(String),

    #[error(
        "No prefix given. Pass --prefix, set LENS_DEPLOY_PREFIX, or set defaults.prefix in the config file."
    )]
    NoPrefix,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: &'static str,
        value: String,
        hint: &'static str,
    },
}
