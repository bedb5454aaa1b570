//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared types crate -
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::target::CACHE_TAG;
use crate::domain::{DeployConfig, DeploymentTarget, EnvironmentConfig, ResourceSizing};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Parameters for creating the container app before the real image exists.
pub struct AppSpec<'a> {
    /// Public image the app is first bound to.
    pub placeholder_image: &'a str,
    /// Port the real application will listen on.
    pub target_port: u16,
    pub sizing: &'a ResourceSizing,
    /// Login server of the registry the real image will be pulled from.
    pub registry_server: &'a str,
}

/// One image build: where the sources are and which tags to publish.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    /// Build context directory.
    pub context: &'a Path,
    /// Dockerfile path relative to `context`.
    pub descriptor: &'a str,
    /// Registry resource name.
    pub registry: &'a str,
    /// Registry login server, e.g. `acrlens.azurecr.io`.
    pub server: &'a str,
    pub repository: &'a str,
    /// Versioned tag.
    pub tag: &'a str,
}

impl BuildRequest<'_> {
    /// Fully qualified versioned reference.
    #[must_use]
    pub fn image_ref(&self) -> String {
        format!("{}/{}:{}", self.server, self.repository, self.tag)
    }

    /// Fully qualified floating cache reference.
    #[must_use]
    pub fn cache_ref(&self) -> String {
        format!("{}/{}:{CACHE_TAG}", self.server, self.repository)
    }

    /// `repository:tag` pairs for both tags, versioned first.
    #[must_use]
    pub fn repo_tags(&self) -> [String; 2] {
        [
            format!("{}:{}", self.repository, self.tag),
            format!("{}:{CACHE_TAG}", self.repository),
        ]
    }
}

/// Status and body of an HTTP GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

// ── Cloud Port Traits ─────────────────────────────────────────────────────────

/// Signed-in identity of the control-plane CLI.
#[allow(async_fn_in_trait)]
pub trait Identity {
    /// Return the signed-in account name.
    ///
    /// # Errors
    ///
    /// Returns an error if no account is signed in.
    async fn account(&self) -> Result<String>;
}

/// Read-only queries against the resource graph.
#[allow(async_fn_in_trait)]
pub trait ResourceInspector {
    /// Whether the resource of `kind` for `target` exists.
    async fn exists(
        &self,
        kind: lens_deploy_common::ResourceKind,
        target: &DeploymentTarget,
    ) -> Result<bool>;
    /// Login server address of the target registry.
    async fn registry_server(&self, target: &DeploymentTarget) -> Result<String>;
    /// Public HTTPS address of the app, if ingress exposes one.
    async fn app_address(&self, target: &DeploymentTarget) -> Result<Option<String>>;
}

/// Resource creation with fixed defaults.
#[allow(async_fn_in_trait)]
pub trait ResourceProvisioner {
    async fn create_resource_group(&self, target: &DeploymentTarget) -> Result<()>;
    /// Basic tier with admin credentials enabled.
    async fn create_registry(&self, target: &DeploymentTarget) -> Result<()>;
    async fn create_environment(&self, target: &DeploymentTarget) -> Result<()>;
    async fn create_application(&self, target: &DeploymentTarget, spec: &AppSpec<'_>)
    -> Result<()>;
}

/// Mutations of the running container app.
#[allow(async_fn_in_trait)]
pub trait AppUpdater {
    /// Apply sizing and, when `image` is given, the new image reference.
    async fn update_container(
        &self,
        target: &DeploymentTarget,
        image: Option<&str>,
        sizing: &ResourceSizing,
    ) -> Result<()>;
    /// Merge `env` into the app's variables; keys not named are left alone.
    async fn merge_env(&self, target: &DeploymentTarget, env: &EnvironmentConfig) -> Result<()>;
    /// Restart the active revision.
    async fn restart(&self, target: &DeploymentTarget) -> Result<()>;
}

/// Registry authentication for the local image builder.
#[allow(async_fn_in_trait)]
pub trait RegistryAuth {
    async fn registry_login(&self, registry: &str) -> Result<()>;
}

/// Build-and-push delegated to the registry's build service.
#[allow(async_fn_in_trait)]
pub trait RemoteBuilder {
    async fn remote_build(&self, request: &BuildRequest<'_>) -> Result<()>;
}

/// Composite trait: everything the pipeline needs from the hosting platform.
pub trait CloudPlatform:
    Identity + ResourceInspector + ResourceProvisioner + AppUpdater + RegistryAuth + RemoteBuilder
{
}

/// Blanket implementation: any type implementing all sub-traits is a `CloudPlatform`.
impl<T> CloudPlatform for T where
    T: Identity
        + ResourceInspector
        + ResourceProvisioner
        + AppUpdater
        + RegistryAuth
        + RemoteBuilder
{
}

// ── Local Build Port ──────────────────────────────────────────────────────────

/// Local container image builder.
#[allow(async_fn_in_trait)]
pub trait ImageBuilder {
    /// Whether a local build daemon is reachable.
    async fn available(&self) -> bool;
    /// Pull an image. Dropping the returned future cancels the pull.
    async fn pull(&self, image: &str) -> Result<()>;
    /// Build `request`, tagging both the versioned and the cache reference.
    async fn build(&self, request: &BuildRequest<'_>, cache_from: Option<&str>) -> Result<()>;
    async fn push(&self, image: &str) -> Result<()>;
}

// ── Source and Change Detection Ports ─────────────────────────────────────────

/// Read access to the source tree being deployed. Paths are relative to the
/// root and `/`-separated.
pub trait SourceTree {
    fn root(&self) -> &Path;
    fn exists(&self, path: &str) -> bool;
    /// Recursively list regular files under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be walked.
    fn list_files(&self, dir: &str) -> Result<Vec<String>>;
    /// SHA-256 of one file as lowercase hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn sha256(&self, path: &str) -> Result<String>;
}

/// Version-control status query.
#[allow(async_fn_in_trait)]
pub trait VersionControl {
    /// Staged, unstaged, untracked and last-commit paths (may contain duplicates).
    async fn changed_paths(&self, root: &Path) -> Result<Vec<String>>;
}

/// Single-record key-value store for fingerprints.
#[allow(async_fn_in_trait)]
pub trait FingerprintStore {
    /// Load the record for `key`, returning `None` if none was written yet.
    async fn load(&self, key: &str) -> Result<Option<String>>;
    /// Overwrite the record for `key`.
    async fn save(&self, key: &str, digest: &str) -> Result<()>;
}

// ── Verification Port ─────────────────────────────────────────────────────────

/// One bounded HTTP GET against the deployed application.
#[allow(async_fn_in_trait)]
pub trait HttpProbe {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading the configuration file.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<DeployConfig>;
    /// Path of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<std::path::PathBuf>;
}
