//! Build executor: produce and publish the image under both tags.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::Result;
use lens_deploy_common::BuildPath;

use crate::application::ports::{
    BuildRequest, ImageBuilder, ProgressReporter, RegistryAuth, RemoteBuilder,
};
use crate::domain::error::DeployError;

/// Build `request` and publish the versioned and cache tags.
///
/// With a local daemon available: log in to the registry, warm the layer
/// cache with a pull bounded by `cache_timeout`, build, then push the
/// versioned tag followed by the cache tag. Without a daemon, or when the
/// local build step fails, the registry build service builds and pushes
/// both tags instead.
///
/// # Errors
///
/// Returns [`DeployError::RegistryAuthFailed`] if registry login fails,
/// [`DeployError::PublishFailed`] if a push fails after a successful local
/// build, and [`DeployError::BuildFailed`] if the remote build fails.
pub async fn build_and_publish<C>(
    builder: &impl ImageBuilder,
    cloud: &C,
    request: &BuildRequest<'_>,
    cache_timeout: Duration,
    reporter: &impl ProgressReporter,
) -> Result<BuildPath>
where
    C: RegistryAuth + RemoteBuilder,
{
    if builder.available().await {
        if let Some(path) = build_locally(builder, cloud, request, cache_timeout, reporter).await? {
            return Ok(path);
        }
    } else {
        tracing::info!("local docker daemon not reachable");
        reporter.warn("docker is not available locally; using the registry build service");
    }
    build_remotely(cloud, request, reporter).await
}

/// Local path. `Ok(None)` means the build step failed and the caller should
/// fall back to the remote build.
async fn build_locally(
    builder: &impl ImageBuilder,
    auth: &impl RegistryAuth,
    request: &BuildRequest<'_>,
    cache_timeout: Duration,
    reporter: &impl ProgressReporter,
) -> Result<Option<BuildPath>> {
    reporter.step(&format!("logging in to registry {}...", request.registry));
    auth.registry_login(request.registry)
        .await
        .map_err(|e| DeployError::RegistryAuthFailed {
            registry: request.registry.to_owned(),
            detail: format!("{e:#}"),
        })?;

    let cache_ref = request.cache_ref();
    let cache_hit = pull_cache(builder, &cache_ref, cache_timeout, reporter).await;

    let image = request.image_ref();
    reporter.step(&format!("building {image}..."));
    let cache_from = cache_hit.then_some(cache_ref.as_str());
    if let Err(e) = builder.build(request, cache_from).await {
        tracing::warn!(error = %format!("{e:#}"), "local build failed");
        reporter.warn("local build failed; falling back to the registry build service");
        return Ok(None);
    }
    reporter.success(&format!("built {image}"));

    for tag in [&image, &cache_ref] {
        reporter.step(&format!("pushing {tag}..."));
        builder
            .push(tag)
            .await
            .map_err(|e| DeployError::PublishFailed {
                image: tag.clone(),
                detail: format!("{e:#}"),
            })?;
    }
    reporter.success(&format!("pushed {image}"));
    Ok(Some(BuildPath::Local { cache_hit }))
}

/// Pull the cache image, giving up after `timeout`. Returns whether the
/// cache is available for the build.
///
/// On expiry the pull future is dropped, which terminates the child process.
pub async fn pull_cache(
    builder: &impl ImageBuilder,
    cache_ref: &str,
    timeout: Duration,
    reporter: &impl ProgressReporter,
) -> bool {
    reporter.step("pulling layer cache...");
    match tokio::time::timeout(timeout, builder.pull(cache_ref)).await {
        Ok(Ok(())) => {
            reporter.success("layer cache ready");
            true
        }
        Ok(Err(e)) => {
            tracing::info!(error = %format!("{e:#}"), cache_ref, "cache pull failed");
            reporter.warn("no layer cache available; building from scratch");
            false
        }
        Err(_) => {
            tracing::info!(?timeout, cache_ref, "cache pull timed out");
            reporter.warn(&format!(
                "layer cache pull exceeded {}s; building without cache",
                timeout.as_secs()
            ));
            false
        }
    }
}

async fn build_remotely(
    cloud: &impl RemoteBuilder,
    request: &BuildRequest<'_>,
    reporter: &impl ProgressReporter,
) -> Result<BuildPath> {
    let image = request.image_ref();
    reporter.step(&format!("building {image} in registry {}...", request.registry));
    cloud
        .remote_build(request)
        .await
        .map_err(|e| DeployError::BuildFailed {
            image: image.clone(),
            detail: format!("{e:#}"),
        })?;
    reporter.success(&format!("remote build pushed {image}"));
    Ok(BuildPath::Remote)
}
