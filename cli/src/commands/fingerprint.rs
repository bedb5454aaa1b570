//! Fingerprint command: print the digest of the build inputs.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::fingerprint::compute;
use crate::commands::SourceArgs;
use crate::infra::fs::LocalSourceTree;

/// Arguments for the fingerprint command.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Entry point for `lens-deploy fingerprint`.
///
/// # Errors
///
/// Returns an error if the source tree cannot be fingerprinted.
pub fn run(app: &AppContext, args: &FingerprintArgs) -> Result<()> {
    let root = args.source.root()?;
    let inputs = args.source.inputs();
    let digest = compute(&LocalSourceTree::new(&root), &inputs)?;

    if app.is_json() {
        let doc = serde_json::json!({
            "fingerprint": digest,
            "descriptor": inputs.descriptor,
            "manifest": inputs.manifest,
        });
        println!("{}", crate::output::json::format(&doc)?);
    } else {
        // Bare digest on stdout so it can be captured by scripts.
        println!("{digest}");
    }
    Ok(())
}
