//! Filesystem infrastructure: implements `SourceTree` over a local checkout.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::application::ports::SourceTree;
use crate::domain::fingerprint::hex_encode;

/// Source tree rooted at a local directory.
pub struct LocalSourceTree {
    root: PathBuf,
}

impl LocalSourceTree {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg))
    }
}

impl SourceTree for LocalSourceTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let base = self.resolve(dir);
        anyhow::ensure!(base.is_dir(), "{} is not a directory", base.display());
        let mut files = Vec::new();
        for entry in WalkDir::new(&base).follow_links(false) {
            let entry = entry.with_context(|| format!("walking {}", base.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .with_context(|| format!("{} escapes the source root", entry.path().display()))?;
            files.push(to_slash(rel));
        }
        Ok(files)
    }

    fn sha256(&self, path: &str) -> Result<String> {
        sha256_file(&self.resolve(path))
    }
}

/// `/`-separated rendering of a relative path on every platform.
fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute the SHA-256 hex digest of a file.
///
/// Reads the file in 64 KB chunks to avoid loading large files into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 65536];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex_encode(&hasher.finalize()))
}
