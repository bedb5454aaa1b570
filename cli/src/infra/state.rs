//! Infrastructure implementation of the `FingerprintStore` port.
//!
//! `FileFingerprintStore` keeps one single-line record per target key and
//! writes atomically (temp file + rename) via `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::FingerprintStore;

/// Directory (relative to the source root) holding fingerprint records.
pub const RECORD_DIR: &str = ".lens-deploy/fingerprints";

/// Fingerprint records stored as `<dir>/<key>.sha256`.
pub struct FileFingerprintStore {
    dir: PathBuf,
}

impl FileFingerprintStore {
    /// Store under `<source_root>/.lens-deploy/fingerprints`.
    #[must_use]
    pub fn for_source(source_root: &Path) -> Self {
        Self::with_dir(source_root.join(RECORD_DIR))
    }

    /// Store with an explicit directory (used in tests).
    #[must_use]
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, key: &str) -> Result<PathBuf> {
        anyhow::ensure!(
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')'))
                && !key.starts_with('.'),
            "invalid fingerprint key '{key}'"
        );
        Ok(self.dir.join(format!("{key}.sha256")))
    }
}

fn load_sync(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content.trim().to_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

fn save_sync(path: &Path, digest: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let temp_path = path.with_extension("sha256.tmp");
    std::fs::write(&temp_path, format!("{digest}\n"))
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}

impl FingerprintStore for FileFingerprintStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key)?;
        tokio::task::spawn_blocking(move || load_sync(&path))
            .await
            .context("fingerprint load task panicked")?
    }

    async fn save(&self, key: &str, digest: &str) -> Result<()> {
        let path = self.record_path(key)?;
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || save_sync(&path, &digest))
            .await
            .context("fingerprint save task panicked")?
    }
}
