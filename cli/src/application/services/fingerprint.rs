//! Fingerprint engine: digest the build inputs and compare with the last run.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{FingerprintStore, ProgressReporter, SourceTree};
use crate::domain::BuildInputs;
use crate::domain::fingerprint::{self, Comparison, FileDigest, is_build_relevant};
use crate::domain::inputs::SOURCE_DIR;

/// Result of comparing the current build inputs with the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Fresh fingerprint, or `None` when no decision is possible.
    pub digest: Option<String>,
    /// `None` exactly when `digest` is `None`.
    pub comparison: Option<Comparison>,
}

/// Compute the fingerprint of the application sources, the dependency
/// manifest and the build descriptor.
///
/// # Errors
///
/// Returns an error when no valid fingerprint can be produced: the source
/// directory cannot be walked or holds no files, or any input file cannot
/// be read.
pub fn compute(tree: &impl SourceTree, inputs: &BuildInputs) -> Result<String> {
    let mut paths = tree
        .list_files(SOURCE_DIR)
        .with_context(|| format!("listing {SOURCE_DIR}/"))?;
    paths.retain(|p| is_build_relevant(p));
    anyhow::ensure!(!paths.is_empty(), "no source files under {SOURCE_DIR}/");
    paths.push(inputs.manifest.to_owned());
    paths.push(inputs.descriptor.to_owned());

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let digest = tree
            .sha256(&path)
            .with_context(|| format!("hashing {path}"))?;
        files.push(FileDigest { path, digest });
    }
    fingerprint::combine(&files).ok_or_else(|| anyhow::anyhow!("empty file set"))
}

/// Compute the current fingerprint and compare it with the stored record.
///
/// Never fails: an uncomputable fingerprint or an unreadable record is
/// reported as a warning and surfaces as "no decision" / "no history".
pub async fn evaluate(
    tree: &impl SourceTree,
    store: &impl FingerprintStore,
    key: &str,
    inputs: &BuildInputs,
    reporter: &impl ProgressReporter,
) -> Evaluation {
    let digest = match compute(tree, inputs) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "fingerprint unavailable");
            reporter.warn(&format!("fingerprint unavailable ({e:#})"));
            return Evaluation {
                digest: None,
                comparison: None,
            };
        }
    };

    let stored = match store.load(key).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), key, "cannot read fingerprint record");
            reporter.warn("previous fingerprint unreadable; treating as first run");
            None
        }
    };

    let comparison = fingerprint::compare(&digest, stored.as_deref());
    tracing::debug!(%digest, ?comparison, key, "fingerprint evaluated");
    Evaluation {
        digest: Some(digest),
        comparison: Some(comparison),
    }
}

/// Overwrite the stored record for `key`.
///
/// # Errors
///
/// Returns an error if the store rejects the write.
pub async fn persist(store: &impl FingerprintStore, key: &str, digest: &str) -> Result<()> {
    store
        .save(key, digest)
        .await
        .with_context(|| format!("saving fingerprint for {key}"))
}
