//! Deploy command: wire the production adapters into the deploy service.

use anyhow::Result;
use clap::Args;
use lens_deploy_common::DeploymentMode;

use crate::app::AppContext;
use crate::application::services::deploy::{DeployOptions, deploy};
use crate::commands::{SourceArgs, TargetArgs, TierArgs};
use crate::domain::{EnvironmentConfig, Secrets};
use crate::infra::azure::AzCli;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::docker::DockerCli;
use crate::infra::fs::LocalSourceTree;
use crate::infra::git::GitCli;
use crate::infra::http::ReqwestProbe;
use crate::infra::state::FileFingerprintStore;
use crate::output::human::HumanRenderer;
use crate::output::{TerminalReporter, json};

/// Secrets forwarded to the application as environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct SecretArgs {
    /// OpenAI API key for the Q&A assistant
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Bundestag DIP API key
    #[arg(long, env = "BUNDESTAG_API_KEY", hide_env_values = true)]
    pub bundestag_api_key: Option<String>,
}

impl From<SecretArgs> for Secrets {
    fn from(args: SecretArgs) -> Self {
        Self {
            openai_api_key: args.openai_api_key,
            bundestag_api_key: args.bundestag_api_key,
        }
    }
}

/// Arguments for the deploy command.
#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub tier: TierArgs,

    #[command(flatten)]
    pub secrets: SecretArgs,

    /// Create missing resources (new) or require them to exist (existing)
    #[arg(long, value_enum, default_value_t = DeploymentMode::Existing)]
    pub mode: DeploymentMode,
}

/// Entry point for `lens-deploy deploy`.
///
/// # Errors
///
/// Returns the first fatal error of the deploy pipeline.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<()> {
    let (target, explicit_tag) = args.target.resolve(&app.config.defaults)?;
    let root = args.source.root()?;
    let env = EnvironmentConfig::build(&Secrets::from(args.secrets.clone()));

    let cloud = AzCli::new(TokioCommandRunner::default());
    let builder = DockerCli::new(TokioCommandRunner::default());
    let vcs = GitCli::new(TokioCommandRunner::default());
    let tree = LocalSourceTree::new(&root);
    let store = FileFingerprintStore::for_source(&root);
    let probe = ReqwestProbe::new()?;

    if !app.is_json() {
        app.output.header(&format!(
            "Deploying {} to {}/{} ({} mode)",
            target.image_name, target.resource_group, target.app, args.mode
        ));
    }

    let reporter = TerminalReporter::new(&app.output);
    let report = deploy(
        &cloud,
        &builder,
        &tree,
        &vcs,
        &store,
        &probe,
        DeployOptions {
            reporter: &reporter,
            target: &target,
            mode: args.mode,
            flags: args.tier.into(),
            inputs: args.source.inputs(),
            explicit_tag,
            env: &env,
            config: &app.config,
        },
    )
    .await?;
    drop(reporter);

    if app.is_json() {
        println!("{}", json::format(&report)?);
    } else {
        HumanRenderer::new(&app.output).render_report(&report);
    }
    Ok(())
}
