//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags, OutputMode};
use crate::commands;
use crate::infra::config::YamlConfigStore;

/// Deploy the Bundestag.AI Lens app to Azure Container Apps
#[derive(Parser)]
#[command(
    name = "lens-deploy",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (any non-empty `NO_COLOR` other than "0"/"false")
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log external commands and decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the source tree to the hosting environment
    Deploy(commands::deploy::DeployArgs),

    /// Show the build decision without touching remote resources
    Plan(commands::plan::PlanArgs),

    /// Print the content fingerprint of the build inputs
    Fingerprint(commands::fingerprint::FingerprintArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let flags = OutputFlags {
            no_color,
            quiet,
            json,
        };
        let context = || AppContext::new(&flags, &YamlConfigStore);
        match command {
            Command::Version => commands::version::run(if json {
                OutputMode::Json
            } else {
                OutputMode::Human
            }),
            Command::Deploy(args) => commands::deploy::run(&context()?, &args).await,
            Command::Plan(args) => commands::plan::run(&context()?, &args).await,
            Command::Fingerprint(args) => commands::fingerprint::run(&context()?, &args),
        }
    }
}
