//! Plan command: resolve the tier and build decision locally.

use anyhow::Result;
use clap::Args;
use lens_deploy_common::PlanReport;

use crate::app::AppContext;
use crate::application::services::deploy::{preflight, resolve_tier};
use crate::application::services::plan::plan_build;
use crate::commands::{SourceArgs, TargetArgs, TierArgs};
use crate::domain::TierFlags;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::LocalSourceTree;
use crate::infra::git::GitCli;
use crate::infra::state::FileFingerprintStore;
use crate::output::human::HumanRenderer;
use crate::output::{TerminalReporter, json};

/// Arguments for the plan command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub tier: TierArgs,
}

/// Entry point for `lens-deploy plan`.
///
/// Reads the fingerprint record but never writes it.
///
/// # Errors
///
/// Returns an error on invalid names, conflicting flags, or missing inputs.
pub async fn run(app: &AppContext, args: &PlanArgs) -> Result<()> {
    let (target, explicit_tag) = args.target.resolve(&app.config.defaults)?;
    let root = args.source.root()?;
    let inputs = args.source.inputs();
    let tree = LocalSourceTree::new(&root);
    let store = FileFingerprintStore::for_source(&root);
    let vcs = GitCli::new(TokioCommandRunner::default());
    let flags: TierFlags = args.tier.into();

    let reporter = TerminalReporter::new(&app.output);
    let (tier, ignored_flags) = resolve_tier(&flags, explicit_tag, &reporter)?;
    if tier.may_build() {
        preflight(&tree, &inputs)?;
    }
    let plan = plan_build(
        tier,
        &tree,
        &store,
        &vcs,
        &target.record_key(),
        &inputs,
        &reporter,
    )
    .await;
    drop(reporter);

    let report = PlanReport {
        tier: plan.tier,
        build: plan.build,
        detection: plan.detection,
        fingerprint: plan.fingerprint,
        ignored_flags,
    };
    if app.is_json() {
        println!("{}", json::format(&report)?);
    } else {
        HumanRenderer::new(&app.output).render_plan(&report, &target);
    }
    Ok(())
}
