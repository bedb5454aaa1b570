//! Hosting platform infrastructure: implements the cloud ports over the
//! Azure CLI (`az`).
//!
//! Every call goes through the injected `CommandRunner`, so the adapter is
//! exercised in tests without the real CLI.

use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use lens_deploy_common::ResourceKind;

use crate::application::ports::{
    AppSpec, AppUpdater, BuildRequest, CommandRunner, Identity, RegistryAuth, RemoteBuilder,
    ResourceInspector, ResourceProvisioner,
};
use crate::domain::{DeploymentTarget, EnvironmentConfig, ResourceSizing};
use crate::infra::command_runner::failure_detail;

const AZ: &str = "az";

/// Resource creation can take several minutes (environments especially).
const CREATE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
/// Revision rollouts triggered by `containerapp update`.
const UPDATE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Remote build including the push of both tags.
const REMOTE_BUILD_TIMEOUT: Duration = Duration::from_secs(45 * 60);

/// `az` CLI adapter implementing every cloud port.
pub struct AzCli<R> {
    runner: R,
}

impl<R: CommandRunner> AzCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn raw(&self, args: &[&str], timeout: Option<Duration>) -> Result<Output> {
        let result = match timeout {
            Some(t) => self.runner.run_with_timeout(AZ, args, t).await,
            None => self.runner.run(AZ, args).await,
        };
        result.with_context(|| format!("running {}", describe(args)))
    }

    /// Run and require success, returning trimmed stdout.
    async fn tsv(&self, args: &[&str], timeout: Option<Duration>) -> Result<String> {
        let output = self.raw(args, timeout).await?;
        if !output.status.success() {
            anyhow::bail!("{} failed: {}", describe(args), failure_detail(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    /// Run a `show` query; a not-found failure maps to `Ok(None)`.
    async fn show(&self, args: &[&str]) -> Result<Option<String>> {
        let output = self.raw(args, None).await?;
        if output.status.success() {
            return Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_owned()));
        }
        let detail = failure_detail(&output);
        if is_not_found(&detail) {
            return Ok(None);
        }
        anyhow::bail!("{} failed: {detail}", describe(args))
    }
}

/// `az <subcommands>` without flags, for messages.
fn describe(args: &[&str]) -> String {
    let head: Vec<&str> = args
        .iter()
        .copied()
        .take_while(|a| !a.starts_with('-'))
        .take(3)
        .collect();
    format!("az {}", head.join(" "))
}

/// Whether `az` stderr reports a missing resource.
#[must_use]
pub fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    ["notfound", "not found", "could not be found"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Sizing flags shared by `containerapp create` and `containerapp update`.
fn sizing_args(sizing: &ResourceSizing) -> Vec<String> {
    vec![
        "--cpu".to_owned(),
        sizing.cpu.clone(),
        "--memory".to_owned(),
        sizing.memory.clone(),
        "--min-replicas".to_owned(),
        sizing.min_replicas.to_string(),
        "--max-replicas".to_owned(),
        sizing.max_replicas.to_string(),
    ]
}

/// Arguments of `az containerapp update` for an image and/or sizing change.
#[must_use]
pub fn update_args(
    target: &DeploymentTarget,
    image: Option<&str>,
    sizing: &ResourceSizing,
) -> Vec<String> {
    let mut args: Vec<String> = [
        "containerapp",
        "update",
        "--name",
        target.app.as_str(),
        "--resource-group",
        target.resource_group.as_str(),
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();
    if let Some(image) = image {
        args.push("--image".to_owned());
        args.push(image.to_owned());
    }
    args.extend(sizing_args(sizing));
    args.extend(["--output".to_owned(), "none".to_owned()]);
    args
}

/// Arguments of `az containerapp create` bound to the placeholder image.
#[must_use]
pub fn create_app_args(
    target: &DeploymentTarget,
    spec: &AppSpec<'_>,
    username: &str,
    password: &str,
) -> Vec<String> {
    let port = spec.target_port.to_string();
    let mut args: Vec<String> = [
        "containerapp",
        "create",
        "--name",
        target.app.as_str(),
        "--resource-group",
        target.resource_group.as_str(),
        "--environment",
        target.environment.as_str(),
        "--image",
        spec.placeholder_image,
        "--target-port",
        port.as_str(),
        "--ingress",
        "external",
        "--registry-server",
        spec.registry_server,
        "--registry-username",
        username,
        "--registry-password",
        password,
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();
    args.extend(sizing_args(spec.sizing));
    args.extend(["--output".to_owned(), "none".to_owned()]);
    args
}

/// Arguments of `az acr build` publishing both tags.
#[must_use]
pub fn remote_build_args(request: &BuildRequest<'_>) -> Vec<String> {
    let [versioned, cache] = request.repo_tags();
    vec![
        "acr".to_owned(),
        "build".to_owned(),
        "--registry".to_owned(),
        request.registry.to_owned(),
        "--image".to_owned(),
        versioned,
        "--image".to_owned(),
        cache,
        "--file".to_owned(),
        request
            .context
            .join(request.descriptor)
            .to_string_lossy()
            .into_owned(),
        request.context.to_string_lossy().into_owned(),
    ]
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

impl<R: CommandRunner> Identity for AzCli<R> {
    async fn account(&self) -> Result<String> {
        let name = self
            .tsv(&["account", "show", "--query", "user.name", "--output", "tsv"], None)
            .await?;
        anyhow::ensure!(!name.is_empty(), "no signed-in account");
        Ok(name)
    }
}

impl<R: CommandRunner> ResourceInspector for AzCli<R> {
    async fn exists(&self, kind: ResourceKind, target: &DeploymentTarget) -> Result<bool> {
        let rg = target.resource_group.as_str();
        let found = match kind {
            ResourceKind::ResourceGroup => {
                let out = self
                    .tsv(&["group", "exists", "--name", rg, "--output", "tsv"], None)
                    .await?;
                return Ok(out.eq_ignore_ascii_case("true"));
            }
            ResourceKind::Registry => {
                self.show(&[
                    "acr",
                    "show",
                    "--name",
                    target.registry.as_str(),
                    "--resource-group",
                    rg,
                    "--query",
                    "name",
                    "--output",
                    "tsv",
                ])
                .await?
            }
            ResourceKind::Environment => {
                self.show(&[
                    "containerapp",
                    "env",
                    "show",
                    "--name",
                    target.environment.as_str(),
                    "--resource-group",
                    rg,
                    "--query",
                    "name",
                    "--output",
                    "tsv",
                ])
                .await?
            }
            ResourceKind::Application => {
                self.show(&[
                    "containerapp",
                    "show",
                    "--name",
                    target.app.as_str(),
                    "--resource-group",
                    rg,
                    "--query",
                    "name",
                    "--output",
                    "tsv",
                ])
                .await?
            }
        };
        Ok(found.is_some_and(|name| !name.is_empty()))
    }

    async fn registry_server(&self, target: &DeploymentTarget) -> Result<String> {
        self.tsv(
            &[
                "acr",
                "show",
                "--name",
                target.registry.as_str(),
                "--resource-group",
                target.resource_group.as_str(),
                "--query",
                "loginServer",
                "--output",
                "tsv",
            ],
            None,
        )
        .await
    }

    async fn app_address(&self, target: &DeploymentTarget) -> Result<Option<String>> {
        let fqdn = self
            .tsv(
                &[
                    "containerapp",
                    "show",
                    "--name",
                    target.app.as_str(),
                    "--resource-group",
                    target.resource_group.as_str(),
                    "--query",
                    "properties.configuration.ingress.fqdn",
                    "--output",
                    "tsv",
                ],
                None,
            )
            .await?;
        Ok((!fqdn.is_empty()).then_some(fqdn))
    }
}

impl<R: CommandRunner> ResourceProvisioner for AzCli<R> {
    async fn create_resource_group(&self, target: &DeploymentTarget) -> Result<()> {
        self.tsv(
            &[
                "group",
                "create",
                "--name",
                target.resource_group.as_str(),
                "--location",
                target.location.as_str(),
                "--output",
                "none",
            ],
            Some(CREATE_TIMEOUT),
        )
        .await
        .map(drop)
    }

    async fn create_registry(&self, target: &DeploymentTarget) -> Result<()> {
        self.tsv(
            &[
                "acr",
                "create",
                "--name",
                target.registry.as_str(),
                "--resource-group",
                target.resource_group.as_str(),
                "--location",
                target.location.as_str(),
                "--sku",
                "Basic",
                "--admin-enabled",
                "true",
                "--output",
                "none",
            ],
            Some(CREATE_TIMEOUT),
        )
        .await
        .map(drop)
    }

    async fn create_environment(&self, target: &DeploymentTarget) -> Result<()> {
        self.tsv(
            &[
                "containerapp",
                "env",
                "create",
                "--name",
                target.environment.as_str(),
                "--resource-group",
                target.resource_group.as_str(),
                "--location",
                target.location.as_str(),
                "--output",
                "none",
            ],
            Some(CREATE_TIMEOUT),
        )
        .await
        .map(drop)
    }

    async fn create_application(
        &self,
        target: &DeploymentTarget,
        spec: &AppSpec<'_>,
    ) -> Result<()> {
        let username = self
            .tsv(
                &[
                    "acr",
                    "credential",
                    "show",
                    "--name",
                    target.registry.as_str(),
                    "--query",
                    "username",
                    "--output",
                    "tsv",
                ],
                None,
            )
            .await
            .context("reading registry admin user")?;
        let password = self
            .tsv(
                &[
                    "acr",
                    "credential",
                    "show",
                    "--name",
                    target.registry.as_str(),
                    "--query",
                    "passwords[0].value",
                    "--output",
                    "tsv",
                ],
                None,
            )
            .await
            .context("reading registry admin password")?;
        let args = create_app_args(target, spec, &username, &password);
        self.tsv(&as_strs(&args), Some(CREATE_TIMEOUT)).await.map(drop)
    }
}

impl<R: CommandRunner> AppUpdater for AzCli<R> {
    async fn update_container(
        &self,
        target: &DeploymentTarget,
        image: Option<&str>,
        sizing: &ResourceSizing,
    ) -> Result<()> {
        let args = update_args(target, image, sizing);
        self.tsv(&as_strs(&args), Some(UPDATE_TIMEOUT)).await.map(drop)
    }

    async fn merge_env(&self, target: &DeploymentTarget, env: &EnvironmentConfig) -> Result<()> {
        if env.is_empty() {
            return Ok(());
        }
        let pairs = env.to_pairs();
        let mut args = vec![
            "containerapp",
            "update",
            "--name",
            target.app.as_str(),
            "--resource-group",
            target.resource_group.as_str(),
            "--set-env-vars",
        ];
        args.extend(pairs.iter().map(String::as_str));
        args.extend(["--output", "none"]);
        self.tsv(&args, Some(UPDATE_TIMEOUT)).await.map(drop)
    }

    async fn restart(&self, target: &DeploymentTarget) -> Result<()> {
        let revision = self
            .tsv(
                &[
                    "containerapp",
                    "revision",
                    "list",
                    "--name",
                    target.app.as_str(),
                    "--resource-group",
                    target.resource_group.as_str(),
                    "--query",
                    "[?properties.active].name | [0]",
                    "--output",
                    "tsv",
                ],
                None,
            )
            .await?;
        anyhow::ensure!(!revision.is_empty(), "no active revision");
        self.tsv(
            &[
                "containerapp",
                "revision",
                "restart",
                "--name",
                target.app.as_str(),
                "--resource-group",
                target.resource_group.as_str(),
                "--revision",
                revision.as_str(),
                "--output",
                "none",
            ],
            Some(UPDATE_TIMEOUT),
        )
        .await
        .map(drop)
    }
}

impl<R: CommandRunner> RegistryAuth for AzCli<R> {
    async fn registry_login(&self, registry: &str) -> Result<()> {
        self.tsv(&["acr", "login", "--name", registry], None)
            .await
            .map(drop)
    }
}

impl<R: CommandRunner> RemoteBuilder for AzCli<R> {
    async fn remote_build(&self, request: &BuildRequest<'_>) -> Result<()> {
        let args = remote_build_args(request);
        self.tsv(&as_strs(&args), Some(REMOTE_BUILD_TIMEOUT))
            .await
            .map(drop)
    }
}
