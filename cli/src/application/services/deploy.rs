//! Application service: the deploy use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::Result;
use chrono::Utc;
use lens_deploy_common::{BuildPath, BuildTier, DeploymentMode, DeploymentReport, VerifyStatus};

use crate::application::ports::{
    BuildRequest, CloudPlatform, FingerprintStore, HttpProbe, ImageBuilder, ProgressReporter,
    SourceTree, VersionControl,
};
use crate::application::services::{build, fingerprint, plan, resources, updater, verify};
use crate::domain::error::DeployError;
use crate::domain::tier;
use crate::domain::{BuildInputs, DeployConfig, DeploymentTarget, EnvironmentConfig, TierFlags};

/// Inputs of one deploy run that are not ports.
pub struct DeployOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub target: &'a DeploymentTarget,
    pub mode: DeploymentMode,
    pub flags: TierFlags,
    pub inputs: BuildInputs,
    /// Whether the image tag was given explicitly rather than generated.
    pub explicit_tag: bool,
    pub env: &'a EnvironmentConfig,
    pub config: &'a DeployConfig,
}

/// Resolve the build tier once, reporting flags that lost on precedence.
///
/// Returns the tier and the warnings to carry into the report.
///
/// # Errors
///
/// Returns [`DeployError::SkipBuildWithoutTag`] when skip-build wins and no
/// image tag was given.
pub fn resolve_tier(
    flags: &TierFlags,
    explicit_tag: bool,
    reporter: &impl ProgressReporter,
) -> Result<(BuildTier, Vec<String>)> {
    let chosen = tier::resolve(flags);
    let warnings: Vec<String> = tier::overridden(flags)
        .into_iter()
        .map(|flag| format!("{flag} ignored: --{chosen} takes precedence"))
        .collect();
    for w in &warnings {
        reporter.warn(w);
    }
    if chosen == BuildTier::SkipBuild && !explicit_tag {
        return Err(DeployError::SkipBuildWithoutTag.into());
    }
    tracing::debug!(tier = %chosen, "build tier resolved");
    Ok((chosen, warnings))
}

/// Check that every local input a build needs is present.
///
/// # Errors
///
/// Returns [`DeployError::MissingInput`] naming the first missing file.
pub fn preflight(tree: &impl SourceTree, inputs: &BuildInputs) -> Result<()> {
    for (path, role) in inputs.required_files() {
        if !tree.exists(path) {
            return Err(DeployError::MissingInput {
                path: path.to_owned(),
                role,
            }
            .into());
        }
    }
    Ok(())
}

/// Drive the target into a running state matching the source tree.
///
/// Stages run strictly in order: tier resolution, local preflight, identity
/// check, resource lifecycle, build decision, build, update, fingerprint
/// refresh, verification. Any fatal error aborts the remaining stages.
///
/// # Errors
///
/// Returns the first fatal error; see [`DeployError`] for the taxonomy.
#[allow(clippy::too_many_lines)]
pub async fn deploy(
    cloud: &impl CloudPlatform,
    builder: &impl ImageBuilder,
    tree: &impl SourceTree,
    vcs: &impl VersionControl,
    store: &impl FingerprintStore,
    probe: &impl HttpProbe,
    opts: DeployOptions<'_, impl ProgressReporter>,
) -> Result<DeploymentReport> {
    let DeployOptions {
        reporter,
        target,
        mode,
        flags,
        inputs,
        explicit_tag,
        env,
        config,
    } = opts;

    let (tier, mut warnings) = resolve_tier(&flags, explicit_tag, reporter)?;
    if tier.may_build() {
        preflight(tree, &inputs)?;
    }

    reporter.step("checking cloud sign-in...");
    let account = cloud
        .account()
        .await
        .map_err(|e| DeployError::NotAuthenticated {
            detail: format!("{e:#}"),
        })?;
    reporter.success(&format!("signed in as {account}"));

    let resources =
        resources::ensure_resources(cloud, target, mode, &config.sizing, reporter).await?;
    let server = resources.registry_server.as_str();
    let key = target.record_key();

    let plan = plan::plan_build(tier, tree, store, vcs, &key, &inputs, reporter).await;

    let (image, build_path) = if plan.build {
        let request = BuildRequest {
            context: tree.root(),
            descriptor: inputs.descriptor,
            registry: &target.registry,
            server,
            repository: &target.image_name,
            tag: &target.image_tag,
        };
        let path = build::build_and_publish(
            builder,
            cloud,
            &request,
            config.build.cache_pull_timeout(),
            reporter,
        )
        .await?;
        (Some(request.image_ref()), path)
    } else if tier == BuildTier::SkipBuild {
        reporter.success("build skipped; deploying the existing image");
        (Some(target.image_ref(server)), BuildPath::NotBuilt)
    } else {
        reporter.success("build skipped; image left unchanged");
        (None, BuildPath::NotBuilt)
    };

    warnings.extend(
        updater::apply_update(
            cloud,
            target,
            image.as_deref(),
            &config.sizing,
            env,
            reporter,
        )
        .await?,
    );

    let digest = if tier.may_build() {
        refresh_fingerprint(tree, store, &key, &inputs, plan.fingerprint, &mut warnings, reporter)
            .await
    } else {
        None
    };

    let rebuilt = build_path != BuildPath::NotBuilt;
    let verification = verify::verify_deployment(
        cloud,
        probe,
        target,
        config.verify.settle(rebuilt),
        config.verify.timeout(),
        reporter,
    )
    .await;
    if let VerifyStatus::SoftWarn { reason } | VerifyStatus::Unreachable { reason } =
        &verification.status
    {
        warnings.push(format!("verification: {reason}"));
    }

    Ok(DeploymentReport {
        tier,
        mode,
        resource_group: target.resource_group.clone(),
        app: target.app.clone(),
        image,
        build: build_path,
        detection: plan.detection,
        fingerprint: digest,
        verify: verification.status,
        url: verification.url,
        warnings,
        finished_at: Utc::now(),
    })
}

/// Record the fingerprint of what was just deployed. Failures only warn.
async fn refresh_fingerprint(
    tree: &impl SourceTree,
    store: &impl FingerprintStore,
    key: &str,
    inputs: &BuildInputs,
    known: Option<String>,
    warnings: &mut Vec<String>,
    reporter: &impl ProgressReporter,
) -> Option<String> {
    let digest = match known {
        Some(d) => d,
        None => match fingerprint::compute(tree, inputs) {
            Ok(d) => d,
            Err(e) => {
                let msg = format!("fingerprint not recorded: {e:#}");
                reporter.warn(&msg);
                warnings.push(msg);
                return None;
            }
        },
    };
    if let Err(e) = fingerprint::persist(store, key, &digest).await {
        let msg = format!("fingerprint not recorded: {e:#}");
        reporter.warn(&msg);
        warnings.push(msg);
    }
    Some(digest)
}
