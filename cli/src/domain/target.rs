//! Deployment target naming: derivation from a prefix and validation.
//!
//! Pure functions only. Every derived or supplied name is checked against the
//! hosting platform's naming rules before any remote call is made.

use std::sync::LazyLock;

use lens_deploy_common::ResourceKind;
use regex::Regex;

use crate::domain::error::TargetError;

/// Floating tag used only to seed layer caching for the next build.
pub const CACHE_TAG: &str = "cache";

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z][a-z0-9-]{0,18}[a-z0-9]$").expect("valid regex")
});

static REGISTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]{5,50}$").expect("valid regex")
});

/// Container app and environment names (2-32 chars, no leading/trailing hyphen).
static APP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z][a-z0-9-]{0,30}[a-z0-9]$").expect("valid regex")
});

static GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._()-]{0,89}[A-Za-z0-9_()-]$").expect("valid regex")
});

static IMAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]+([._/-][a-z0-9]+)*$").expect("valid regex")
});

static IMAGE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("valid regex")
});

/// Identifies the remote resource graph a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub resource_group: String,
    pub location: String,
    pub registry: String,
    pub environment: String,
    pub app: String,
    pub image_name: String,
    pub image_tag: String,
}

/// Explicit names and defaults from which a `DeploymentTarget` is derived.
#[derive(Debug, Default, Clone)]
pub struct TargetSpec<'a> {
    pub prefix: Option<&'a str>,
    pub resource_group: Option<&'a str>,
    pub registry: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub app: Option<&'a str>,
    pub location: &'a str,
    pub image_name: &'a str,
    pub image_tag: &'a str,
}

impl DeploymentTarget {
    /// Derive the target from `spec`, filling unspecified names from the prefix:
    /// `rg-<prefix>`, `acr<prefix without hyphens>`, `<prefix>-env`, `<prefix>-app`.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is needed but no prefix was given, or if any
    /// resulting name violates the platform naming rules.
    pub fn derive(spec: &TargetSpec<'_>) -> Result<Self, TargetError> {
        let prefix = match spec.prefix {
            Some(p) => {
                if !PREFIX_RE.is_match(p) {
                    return Err(TargetError::InvalidPrefix(p.to_owned()));
                }
                Some(p)
            }
            None => None,
        };

        let pick = |explicit: Option<&str>, derive: fn(&str) -> String| {
            explicit
                .map(str::to_owned)
                .or_else(|| prefix.map(derive))
                .ok_or(TargetError::NoPrefix)
        };

        let target = Self {
            resource_group: pick(spec.resource_group, |p| format!("rg-{p}"))?,
            location: spec.location.to_owned(),
            registry: pick(spec.registry, |p| format!("acr{}", p.replace('-', "")))?,
            environment: pick(spec.environment, |p| format!("{p}-env"))?,
            app: pick(spec.app, |p| format!("{p}-app"))?,
            image_name: spec.image_name.to_owned(),
            image_tag: spec.image_tag.to_owned(),
        };
        target.validate()?;
        Ok(target)
    }

    /// Check every name against the platform naming rules.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), TargetError> {
        if !GROUP_RE.is_match(&self.resource_group) {
            return Err(TargetError::InvalidName {
                kind: ResourceKind::ResourceGroup,
                name: self.resource_group.clone(),
            });
        }
        if !REGISTRY_RE.is_match(&self.registry) {
            return Err(TargetError::InvalidRegistry(self.registry.clone()));
        }
        for (kind, name) in [
            (ResourceKind::Environment, &self.environment),
            (ResourceKind::Application, &self.app),
        ] {
            if !APP_NAME_RE.is_match(name) {
                return Err(TargetError::InvalidName {
                    kind,
                    name: name.clone(),
                });
            }
        }
        if !IMAGE_NAME_RE.is_match(&self.image_name) {
            return Err(TargetError::InvalidImage(self.image_name.clone()));
        }
        if !IMAGE_TAG_RE.is_match(&self.image_tag) || self.image_tag == CACHE_TAG {
            return Err(TargetError::InvalidImage(self.image_tag.clone()));
        }
        Ok(())
    }

    /// Name of the target resource of the given kind.
    #[must_use]
    pub fn name_of(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::ResourceGroup => &self.resource_group,
            ResourceKind::Registry => &self.registry,
            ResourceKind::Environment => &self.environment,
            ResourceKind::Application => &self.app,
        }
    }

    /// Versioned image reference on the given registry server.
    #[must_use]
    pub fn image_ref(&self, server: &str) -> String {
        format!("{server}/{}:{}", self.image_name, self.image_tag)
    }

    /// Floating cache image reference on the given registry server.
    #[must_use]
    pub fn cache_ref(&self, server: &str) -> String {
        format!("{server}/{}:{CACHE_TAG}", self.image_name)
    }

    /// Key under which this target's fingerprint record is stored.
    #[must_use]
    pub fn record_key(&self) -> String {
        format!("{}--{}", self.resource_group, self.app)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
