//! Version command

use anyhow::Result;

use crate::app::OutputMode;

/// Run the version command. Needs no configuration, so it takes the mode only.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(mode: OutputMode) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    match mode {
        OutputMode::Json => {
            let doc = serde_json::json!({ "version": version });
            println!("{}", crate::output::json::format(&doc)?);
        }
        OutputMode::Human => println!("lens-deploy {version}"),
    }
    Ok(())
}
