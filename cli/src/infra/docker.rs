//! Local image builder: implements `ImageBuilder` over the `docker` CLI.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{BuildRequest, CommandRunner, ImageBuilder};
use crate::infra::command_runner::failure_detail;

const DOCKER: &str = "docker";

/// `docker info` answers quickly when the daemon is up.
const PROBE_TIMEOUT: Duration = Duration::from_secs(15);
/// The pull is bounded by the caller; this only guards against a hung daemon.
const PULL_TIMEOUT: Duration = Duration::from_secs(600);
const BUILD_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const PUSH_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// `docker` CLI adapter.
pub struct DockerCli<R> {
    runner: R,
}

impl<R: CommandRunner> DockerCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn checked(&self, args: &[&str], timeout: Duration) -> Result<()> {
        let output = self
            .runner
            .run_with_timeout(DOCKER, args, timeout)
            .await
            .with_context(|| format!("docker {}", args.first().copied().unwrap_or_default()))?;
        if output.status.success() {
            return Ok(());
        }
        anyhow::bail!(
            "docker {} failed: {}",
            args.first().copied().unwrap_or_default(),
            failure_detail(&output)
        )
    }
}

/// Arguments of `docker build` for `request`.
#[must_use]
pub fn build_args(request: &BuildRequest<'_>, cache_from: Option<&str>) -> Vec<String> {
    let context = request.context.to_string_lossy().into_owned();
    let descriptor = request.context.join(request.descriptor);
    let mut args = vec![
        "build".to_owned(),
        "--file".to_owned(),
        descriptor.to_string_lossy().into_owned(),
        "--build-arg".to_owned(),
        "BUILDKIT_INLINE_CACHE=1".to_owned(),
        "--tag".to_owned(),
        request.image_ref(),
        "--tag".to_owned(),
        request.cache_ref(),
    ];
    if let Some(cache) = cache_from {
        args.push("--cache-from".to_owned());
        args.push(cache.to_owned());
    }
    args.push(context);
    args
}

impl<R: CommandRunner> ImageBuilder for DockerCli<R> {
    async fn available(&self) -> bool {
        match self
            .runner
            .run_with_timeout(DOCKER, &["info", "--format", "{{.ServerVersion}}"], PROBE_TIMEOUT)
            .await
        {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!(error = %format!("{e:#}"), "docker probe failed");
                false
            }
        }
    }

    async fn pull(&self, image: &str) -> Result<()> {
        self.checked(&["pull", image], PULL_TIMEOUT).await
    }

    async fn build(&self, request: &BuildRequest<'_>, cache_from: Option<&str>) -> Result<()> {
        let args = build_args(request, cache_from);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.checked(&args, BUILD_TIMEOUT).await
    }

    async fn push(&self, image: &str) -> Result<()> {
        self.checked(&["push", image], PUSH_TIMEOUT).await
    }
}
