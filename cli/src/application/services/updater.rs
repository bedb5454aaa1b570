//! Deployment updater: roll the image, sizing and environment onto the app.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::{AppUpdater, ProgressReporter};
use crate::domain::error::DeployError;
use crate::domain::{DeploymentTarget, EnvironmentConfig, ResourceSizing};

/// Apply `image` (or only the sizing when `None`), merge `env`, and restart
/// the active revision.
///
/// Returns warnings that do not fail the run.
///
/// # Errors
///
/// Returns [`DeployError::UpdateFailed`] if the container or environment
/// update is rejected. Earlier stages are not rolled back.
pub async fn apply_update(
    cloud: &impl AppUpdater,
    target: &DeploymentTarget,
    image: Option<&str>,
    sizing: &ResourceSizing,
    env: &EnvironmentConfig,
    reporter: &impl ProgressReporter,
) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    let app = &target.app;

    match image {
        Some(image) => reporter.step(&format!("updating {app} to {image}...")),
        None => reporter.step(&format!("applying configuration to {app} (image unchanged)...")),
    }
    cloud
        .update_container(target, image, sizing)
        .await
        .map_err(|e| DeployError::UpdateFailed {
            stage: if image.is_some() { "update image" } else { "apply sizing" },
            app: app.clone(),
            detail: format!("{e:#}"),
        })?;
    reporter.success(&format!(
        "{app}: cpu {} / memory {} / replicas {}-{}",
        sizing.cpu, sizing.memory, sizing.min_replicas, sizing.max_replicas
    ));

    tracing::debug!(?env, "merging environment");
    cloud
        .merge_env(target, env)
        .await
        .map_err(|e| DeployError::UpdateFailed {
            stage: "set environment variables",
            app: app.clone(),
            detail: format!("{e:#}"),
        })?;
    reporter.success(&format!("{} environment variable(s) set", env.len()));

    reporter.step("restarting active revision...");
    match cloud.restart(target).await {
        Ok(()) => reporter.success("revision restarted"),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), app = %app, "restart failed");
            let msg = format!(
                "restart of {app} failed; the new revision may take longer to pick up changes"
            );
            reporter.warn(&msg);
            warnings.push(msg);
        }
    }
    Ok(warnings)
}
