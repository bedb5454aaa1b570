//! Build strategy selection: tier resolution plus change detection.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use lens_deploy_common::{BuildTier, Detection};

use crate::application::ports::{FingerprintStore, ProgressReporter, SourceTree, VersionControl};
use crate::application::services::fingerprint;
use crate::domain::BuildInputs;
use crate::domain::changes;
use crate::domain::fingerprint::Comparison;

/// Whether this run builds, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub tier: BuildTier,
    pub build: bool,
    /// Change-detection outcome; only the fast tier runs detection.
    pub detection: Option<Detection>,
    /// Fingerprint computed during detection, if any.
    pub fingerprint: Option<String>,
}

/// Decide whether `tier` builds.
///
/// Config-only, skip-build and force-rebuild are explicit overrides and never
/// consult detection; standard always builds; fast consults the fingerprint
/// engine and falls back to the change classifier.
pub async fn plan_build(
    tier: BuildTier,
    tree: &impl SourceTree,
    store: &impl FingerprintStore,
    vcs: &impl VersionControl,
    key: &str,
    inputs: &BuildInputs,
    reporter: &impl ProgressReporter,
) -> BuildPlan {
    let build = match tier {
        BuildTier::ConfigOnly | BuildTier::SkipBuild => false,
        BuildTier::ForceRebuild | BuildTier::Standard => true,
        BuildTier::FastDeploy => {
            let (detection, fingerprint) = detect(tree, store, vcs, key, inputs, reporter).await;
            return BuildPlan {
                tier,
                build: !detection.skips_build(),
                detection: Some(detection),
                fingerprint,
            };
        }
    };
    BuildPlan {
        tier,
        build,
        detection: None,
        fingerprint: None,
    }
}

async fn detect(
    tree: &impl SourceTree,
    store: &impl FingerprintStore,
    vcs: &impl VersionControl,
    key: &str,
    inputs: &BuildInputs,
    reporter: &impl ProgressReporter,
) -> (Detection, Option<String>) {
    reporter.step("checking for source changes...");
    let eval = fingerprint::evaluate(tree, store, key, inputs, reporter).await;
    let detection = match eval.comparison {
        Some(Comparison::Match) => {
            reporter.success("sources unchanged since last deploy");
            Detection::Unchanged
        }
        Some(Comparison::Differs) => {
            reporter.success("sources changed since last deploy");
            Detection::Changed
        }
        Some(Comparison::NoHistory) | None => classify_changes(tree, vcs, reporter).await,
    };
    (detection, eval.digest)
}

/// Classify the version-control change set. Any failure defaults to rebuild.
pub async fn classify_changes(
    tree: &impl SourceTree,
    vcs: &impl VersionControl,
    reporter: &impl ProgressReporter,
) -> Detection {
    let paths = match vcs.changed_paths(tree.root()).await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "version control status unavailable");
            reporter.warn("no fingerprint history and git status unavailable; rebuilding");
            return Detection::ClassifiedRebuild {
                critical: Vec::new(),
            };
        }
    };
    let detection = changes::classify(&paths);
    match &detection {
        Detection::ClassifiedSkip => {
            reporter.success("only documentation/tooling files changed");
        }
        Detection::ClassifiedRebuild { critical } if critical.is_empty() => {
            reporter.warn("no fingerprint history and no reported changes; rebuilding");
        }
        Detection::ClassifiedRebuild { critical } => {
            tracing::debug!(?critical, "critical paths changed");
            reporter.success(&format!("{} build-relevant file(s) changed", critical.len()));
        }
        Detection::Unchanged | Detection::Changed => {}
    }
    detection
}
