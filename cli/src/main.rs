//! lens-deploy - Deploy the Bundestag.AI Lens app to Azure Container Apps

use clap::Parser;
use lens_deploy::cli::Cli;
use lens_deploy::domain::{ConfigError, DeployError, TargetError};
use lens_deploy::output::json;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;

    if let Err(e) = cli.run().await {
        tracing::debug!(error = ?e, "command failed");
        if json_mode {
            match json::format_error(&format!("{e:#}"), error_code(&e)) {
                Ok(doc) => println!("{doc}"),
                Err(_) => eprintln!("Error: {e:#}"),
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr; stdout is reserved for results.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "lens_deploy=debug"
    } else {
        "lens_deploy=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(err) = e.downcast_ref::<DeployError>() {
        err.code()
    } else if e.downcast_ref::<TargetError>().is_some() {
        "INVALID_TARGET"
    } else if e.downcast_ref::<ConfigError>().is_some() {
        "INVALID_CONFIG"
    } else {
        "DEPLOY_FAILED"
    }
}
