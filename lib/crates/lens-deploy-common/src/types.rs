use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Strategy governing whether and how a new image is produced during one run.
///
/// Variants are listed in precedence order: when several tier flags are set,
/// the earliest variant wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuildTier {
    ConfigOnly,
    SkipBuild,
    ForceRebuild,
    FastDeploy,
    Standard,
}

impl BuildTier {
    /// All tiers in precedence order.
    pub const ALL: [Self; 5] = [
        Self::ConfigOnly,
        Self::SkipBuild,
        Self::ForceRebuild,
        Self::FastDeploy,
        Self::Standard,
    ];

    /// Whether this tier may invoke the build executor.
    #[must_use]
    pub fn may_build(self) -> bool {
        matches!(self, Self::ForceRebuild | Self::FastDeploy | Self::Standard)
    }
}

impl fmt::Display for BuildTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ConfigOnly => "config-only",
            Self::SkipBuild => "skip-build",
            Self::ForceRebuild => "force-rebuild",
            Self::FastDeploy => "fast",
            Self::Standard => "standard",
        };
        f.write_str(s)
    }
}

/// Whether the run may create missing resources.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Create any missing resource.
    New,
    /// Require every resource to exist already.
    #[default]
    Existing,
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Existing => f.write_str("existing"),
        }
    }
}

/// The four remote resources making up a deployment target, in creation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ResourceGroup,
    Registry,
    Environment,
    Application,
}

impl ResourceKind {
    pub const ORDERED: [Self; 4] = [
        Self::ResourceGroup,
        Self::Registry,
        Self::Environment,
        Self::Application,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ResourceGroup => "resource group",
            Self::Registry => "registry",
            Self::Environment => "container apps environment",
            Self::Application => "container app",
        };
        f.write_str(s)
    }
}

/// How the deployed image was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum BuildPath {
    /// No build ran this time.
    NotBuilt,
    /// Built with the local docker daemon and pushed.
    Local { cache_hit: bool },
    /// Delegated to the registry build service.
    Remote,
}

/// Result of change detection under the fast tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Detection {
    /// Fingerprint matches the previous run.
    Unchanged,
    /// Fingerprint differs from the previous run.
    Changed,
    /// No usable fingerprint; every changed path was non-critical.
    ClassifiedSkip,
    /// No usable fingerprint; critical paths changed (or VCS gave no answer).
    ClassifiedRebuild { critical: Vec<String> },
}

impl Detection {
    /// Whether this outcome means the build can be skipped.
    #[must_use]
    pub fn skips_build(&self) -> bool {
        matches!(self, Self::Unchanged | Self::ClassifiedSkip)
    }
}

/// Outcome of the post-deploy health request. None of these fail a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyStatus {
    /// HTTP 200 and an expected content marker.
    Pass,
    /// Reachable, but the response did not look like the application.
    SoftWarn { reason: String },
    /// The request failed or no public address exists.
    Unreachable { reason: String },
}

/// Build decision computed without touching remote resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanReport {
    pub tier: BuildTier,
    /// Whether a deploy with the same inputs would build an image.
    pub build: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Tier flags that lost on precedence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_flags: Vec<String>,
}

/// Final summary of a deployment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub tier: BuildTier,
    pub mode: DeploymentMode,
    pub resource_group: String,
    pub app: String,
    /// Image reference applied to the app, or `None` when the image was left untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub build: BuildPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub verify: VerifyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub finished_at: DateTime<Utc>,
}
