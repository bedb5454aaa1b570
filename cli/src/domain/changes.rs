//! Change classification for the version-control fallback.
//!
//! Used only when no fingerprint decision is possible. A path is critical
//! (forces a rebuild) unless it is documentation or tooling configuration.

use std::collections::BTreeSet;

use lens_deploy_common::Detection;

use crate::domain::inputs::is_dependency_manifest;

const NON_CRITICAL_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "rst"];

const NON_CRITICAL_FILES: &[&str] = &[
    ".gitignore",
    ".dockerignore",
    ".gitattributes",
    ".editorconfig",
    ".pre-commit-config.yaml",
    ".gitlab-ci.yml",
    "LICENSE",
];

/// Top-level directories whose contents never reach the image. `.lens-deploy`
/// holds this tool's own fingerprint records.
const NON_CRITICAL_DIRS: &[&str] = &[
    "docs",
    ".vscode",
    ".idea",
    ".github",
    ".devcontainer",
    ".lens-deploy",
];

/// Normalise a VCS-reported path: `/` separators, no leading `./`.
fn normalise(path: &str) -> String {
    let p = path.trim().replace('\\', "/");
    p.strip_prefix("./").map_or_else(|| p.clone(), str::to_owned)
}

/// Whether a change to `path` requires a new image.
#[must_use]
pub fn is_critical(path: &str) -> bool {
    let path = normalise(path);
    if is_dependency_manifest(&path) {
        return true;
    }
    if let Some(first) = path.split('/').next() {
        if path.contains('/') && NON_CRITICAL_DIRS.contains(&first) {
            return false;
        }
    }
    let file_name = path.rsplit('/').next().unwrap_or(&path);
    if NON_CRITICAL_FILES.contains(&file_name) {
        return false;
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    !matches!(ext, Some(e) if NON_CRITICAL_EXTENSIONS.contains(&e.as_str()))
}

/// Classify a change set.
///
/// Paths are deduplicated. An empty set means version control gave no
/// answer, which defaults to a rebuild.
pub fn classify<I, S>(paths: I) -> Detection
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = paths
        .into_iter()
        .map(|p| normalise(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect();

    if unique.is_empty() {
        return Detection::ClassifiedRebuild {
            critical: Vec::new(),
        };
    }

    let critical: Vec<String> = unique.into_iter().filter(|p| is_critical(p)).collect();
    if critical.is_empty() {
        Detection::ClassifiedSkip
    } else {
        Detection::ClassifiedRebuild { critical }
    }
}
