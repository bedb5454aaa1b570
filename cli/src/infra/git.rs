//! Version control infrastructure: implements `VersionControl` over `git`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, VersionControl};
use crate::infra::command_runner::failure_detail;

/// `git` CLI adapter.
pub struct GitCli<R> {
    runner: R,
}

impl<R: CommandRunner> GitCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn names(&self, root: &str, args: &[&str]) -> Result<Vec<String>> {
        let mut full = vec!["-C", root];
        full.extend_from_slice(args);
        let output = self
            .runner
            .run("git", &full)
            .await
            .with_context(|| format!("git {}", args.join(" ")))?;
        anyhow::ensure!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            failure_detail(&output)
        );
        Ok(parse_name_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// One path per non-blank line.
#[must_use]
pub fn parse_name_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

impl<R: CommandRunner> VersionControl for GitCli<R> {
    async fn changed_paths(&self, root: &Path) -> Result<Vec<String>> {
        let root = root.to_string_lossy();
        let mut paths = self.names(&root, &["diff", "--name-only", "--cached"]).await?;
        paths.extend(self.names(&root, &["diff", "--name-only"]).await?);
        paths.extend(
            self.names(&root, &["ls-files", "--others", "--exclude-standard"])
                .await?,
        );
        // A repository without commits has no HEAD; that part is simply empty.
        match self
            .names(&root, &["show", "--name-only", "--pretty=format:", "HEAD"])
            .await
        {
            Ok(last) => paths.extend(last),
            Err(e) => tracing::debug!(error = %format!("{e:#}"), "no last commit"),
        }
        Ok(paths)
    }
}
