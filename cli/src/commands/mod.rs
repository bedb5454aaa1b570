//! Command implementations and the argument groups they share.

pub mod deploy;
pub mod fingerprint;
pub mod plan;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use crate::domain::config::TargetDefaults;
use crate::domain::{BuildInputs, DeploymentTarget, TargetSpec, TierFlags};

/// Format of the generated image tag.
pub const TAG_FORMAT: &str = "%Y%m%d%H%M%S";

/// Names of the remote resources and the image.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Short prefix from which all resource names are derived
    #[arg(long, env = "LENS_DEPLOY_PREFIX")]
    pub prefix: Option<String>,

    /// Resource group name [default: rg-<prefix>]
    #[arg(long)]
    pub resource_group: Option<String>,

    /// Container registry name [default: acr<prefix without hyphens>]
    #[arg(long)]
    pub registry: Option<String>,

    /// Container Apps environment name [default: <prefix>-env]
    #[arg(long)]
    pub environment: Option<String>,

    /// Container app name [default: <prefix>-app]
    #[arg(long)]
    pub app: Option<String>,

    /// Azure region for newly created resources
    #[arg(long)]
    pub location: Option<String>,

    /// Image repository name
    #[arg(long)]
    pub image_name: Option<String>,

    /// Image tag [default: current UTC time as YYYYMMDDHHMMSS]
    #[arg(long)]
    pub image_tag: Option<String>,
}

impl TargetArgs {
    /// Derive the target, filling gaps from the config defaults.
    ///
    /// Returns the target and whether the image tag was given explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if no prefix is available for an unnamed resource or
    /// any name violates the platform naming rules.
    pub fn resolve(&self, defaults: &TargetDefaults) -> Result<(DeploymentTarget, bool)> {
        let generated;
        let image_tag = match self.image_tag.as_deref() {
            Some(tag) => tag,
            None => {
                generated = Utc::now().format(TAG_FORMAT).to_string();
                generated.as_str()
            }
        };
        let spec = TargetSpec {
            prefix: self.prefix.as_deref().or(defaults.prefix.as_deref()),
            resource_group: self.resource_group.as_deref(),
            registry: self.registry.as_deref(),
            environment: self.environment.as_deref(),
            app: self.app.as_deref(),
            location: self.location.as_deref().unwrap_or(&defaults.location),
            image_name: self.image_name.as_deref().unwrap_or(&defaults.image_name),
            image_tag,
        };
        let target = DeploymentTarget::derive(&spec)?;
        Ok((target, self.image_tag.is_some()))
    }
}

/// Where the sources live and which build inputs to use.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Root of the application source tree
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Use Dockerfile.optimized and requirements-optimized.txt
    #[arg(long)]
    pub use_optimized: bool,
}

impl SourceArgs {
    /// Canonical source root.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn root(&self) -> Result<PathBuf> {
        self.source
            .canonicalize()
            .with_context(|| format!("source directory {}", self.source.display()))
    }

    #[must_use]
    pub fn inputs(&self) -> BuildInputs {
        BuildInputs::select(self.use_optimized)
    }
}

/// Build tier flags. Several may be given; precedence picks one.
#[derive(Args, Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TierArgs {
    /// Only apply configuration and environment; never build or change the image
    #[arg(long)]
    pub config_only: bool,

    /// Deploy the already published --image-tag without building
    #[arg(long)]
    pub skip_build: bool,

    /// Always build, ignoring change detection
    #[arg(long)]
    pub force_rebuild: bool,

    /// Build only when sources changed since the last deploy
    #[arg(long)]
    pub fast: bool,
}

impl From<TierArgs> for TierFlags {
    fn from(args: TierArgs) -> Self {
        Self {
            config_only: args.config_only,
            skip_build: args.skip_build,
            force_rebuild: args.force_rebuild,
            fast: args.fast,
        }
    }
}
