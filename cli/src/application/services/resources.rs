//! Resource lifecycle: make sure the target's resource graph exists.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use lens_deploy_common::{DeploymentMode, ResourceKind};

use crate::application::ports::{
    AppSpec, ProgressReporter, ResourceInspector, ResourceProvisioner,
};
use crate::domain::error::DeployError;
use crate::domain::inputs::TARGET_PORT;
use crate::domain::{DeploymentTarget, ResourceSizing};

/// Public image the app is bound to until the first real image is pushed.
pub const PLACEHOLDER_IMAGE: &str = "mcr.microsoft.com/k8se/quickstart:latest";

/// What `ensure_resources` found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOutcome {
    /// Registry login server for later stages.
    pub registry_server: String,
    /// Resources created by this call, in creation order.
    pub created: Vec<ResourceKind>,
}

/// Guarantee that resource group, registry, environment and app exist.
///
/// In `New` mode missing resources are created in dependency order; present
/// ones are left alone, so repeated calls are no-ops. In `Existing` mode the
/// first missing resource aborts the run before anything is mutated.
///
/// # Errors
///
/// Returns [`DeployError::ResourceMissing`] in `Existing` mode, or the
/// underlying control-plane error if a query or creation fails.
pub async fn ensure_resources<P>(
    cloud: &P,
    target: &DeploymentTarget,
    mode: DeploymentMode,
    sizing: &ResourceSizing,
    reporter: &impl ProgressReporter,
) -> Result<ResourceOutcome>
where
    P: ResourceInspector + ResourceProvisioner,
{
    match mode {
        DeploymentMode::Existing => {
            reporter.step("checking existing resources...");
            for kind in ResourceKind::ORDERED {
                if !probe(cloud, kind, target).await? {
                    return Err(DeployError::ResourceMissing {
                        kind,
                        name: target.name_of(kind).to_owned(),
                        mode,
                    }
                    .into());
                }
            }
            let registry_server = registry_server(cloud, target).await?;
            reporter.success("all resources present");
            Ok(ResourceOutcome {
                registry_server,
                created: Vec::new(),
            })
        }
        DeploymentMode::New => {
            let mut created = Vec::new();
            let mut server = None;
            for kind in ResourceKind::ORDERED {
                if !probe(cloud, kind, target).await? {
                    reporter.step(&format!("creating {kind} '{}'...", target.name_of(kind)));
                    create(cloud, kind, target, sizing, server.as_deref()).await?;
                    reporter.success(&format!("{kind} '{}' created", target.name_of(kind)));
                    created.push(kind);
                }
                if kind == ResourceKind::Registry {
                    server = Some(registry_server(cloud, target).await?);
                }
            }
            let registry_server = match server {
                Some(s) => s,
                None => registry_server(cloud, target).await?,
            };
            if created.is_empty() {
                reporter.success("all resources present");
            }
            Ok(ResourceOutcome {
                registry_server,
                created,
            })
        }
    }
}

async fn probe(
    cloud: &impl ResourceInspector,
    kind: ResourceKind,
    target: &DeploymentTarget,
) -> Result<bool> {
    cloud
        .exists(kind, target)
        .await
        .with_context(|| format!("checking {kind} '{}'", target.name_of(kind)))
}

async fn registry_server(
    cloud: &impl ResourceInspector,
    target: &DeploymentTarget,
) -> Result<String> {
    let server = cloud
        .registry_server(target)
        .await
        .with_context(|| format!("resolving login server of registry '{}'", target.registry))?;
    anyhow::ensure!(
        !server.trim().is_empty(),
        "registry '{}' reported an empty login server",
        target.registry
    );
    Ok(server.trim().to_owned())
}

async fn create(
    cloud: &impl ResourceProvisioner,
    kind: ResourceKind,
    target: &DeploymentTarget,
    sizing: &ResourceSizing,
    registry_server: Option<&str>,
) -> Result<()> {
    let result = match kind {
        ResourceKind::ResourceGroup => cloud.create_resource_group(target).await,
        ResourceKind::Registry => cloud.create_registry(target).await,
        ResourceKind::Environment => cloud.create_environment(target).await,
        ResourceKind::Application => {
            let server = registry_server
                .ok_or_else(|| anyhow::anyhow!("registry server unknown before app creation"))?;
            cloud
                .create_application(
                    target,
                    &AppSpec {
                        placeholder_image: PLACEHOLDER_IMAGE,
                        target_port: TARGET_PORT,
                        sizing,
                        registry_server: server,
                    },
                )
                .await
        }
    };
    result.with_context(|| format!("creating {kind} '{}'", target.name_of(kind)))
}
