//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use crate::application::ports::CommandRunner;
use crate::domain::env::is_secret;

/// Default timeout for short control-plane queries (`az ... show`, `git diff`).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(120);

/// Flags whose following argument is a credential.
const SECRET_FLAGS: &[&str] = &["--password", "-p", "--registry-password"];

/// Production `CommandRunner`: uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// On Windows, `tokio::time::timeout` around `.output().await` does NOT kill
/// the child process when the timeout fires; the future is dropped but the
/// OS process keeps running. This implementation uses `tokio::select!` with
/// explicit `child.kill()` to guarantee the process is terminated. Every
/// child is also spawned with `kill_on_drop`, so dropping the returned
/// future (e.g. from an outer `tokio::time::timeout`) terminates it too.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, args = %redact_args(args).join(" "), ?timeout, "running");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        let output = tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                Ok::<_, anyhow::Error>(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result?,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                tracing::warn!(program, ?timeout, "command timed out and was killed");
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        };
        tracing::debug!(program, status = ?output.status.code(), "finished");
        Ok(output)
    }
}

/// Mask credential values before an argument list is logged.
#[must_use]
pub fn redact_args(args: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            out.push("***".to_owned());
            mask_next = false;
            continue;
        }
        mask_next = SECRET_FLAGS.contains(arg);
        match arg.split_once('=') {
            Some((key, _)) if is_secret(key) => out.push(format!("{key}=***")),
            _ => out.push((*arg).to_owned()),
        }
    }
    out
}

/// Trimmed stderr (falling back to stdout) for error messages.
#[must_use]
pub fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_owned()
    } else {
        stderr.to_owned()
    }
}
