//! Local build inputs: descriptor/manifest pair, source directory, entry point.

/// Application source directory, relative to the source root.
pub const SOURCE_DIR: &str = "src";

/// Deployable entry point, relative to the source root.
pub const ENTRY_POINT: &str = "src/web/streamlit_app_modular.py";

/// Port the application listens on inside the container.
pub const TARGET_PORT: u16 = 8501;

/// The build descriptor and dependency manifest used for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInputs {
    /// Dockerfile path, relative to the source root.
    pub descriptor: &'static str,
    /// Python dependency manifest, relative to the source root.
    pub manifest: &'static str,
}

impl BuildInputs {
    pub const STANDARD: Self = Self {
        descriptor: "Dockerfile",
        manifest: "requirements.txt",
    };

    /// Smaller artifact: slimmer base image and trimmed dependency set.
    pub const OPTIMIZED: Self = Self {
        descriptor: "Dockerfile.optimized",
        manifest: "requirements-optimized.txt",
    };

    /// Pick the pair for the `--use-optimized` flag.
    #[must_use]
    pub fn select(optimized: bool) -> Self {
        if optimized { Self::OPTIMIZED } else { Self::STANDARD }
    }

    /// Files that must exist locally before a build may start, with their role.
    #[must_use]
    pub fn required_files(&self) -> [(&'static str, &'static str); 3] {
        [
            (self.descriptor, "build descriptor"),
            (self.manifest, "dependency manifest"),
            (ENTRY_POINT, "application entry point"),
        ]
    }
}

/// Whether `path` (relative, `/`-separated) is one of the dependency manifests.
#[must_use]
pub fn is_dependency_manifest(path: &str) -> bool {
    path == BuildInputs::STANDARD.manifest || path == BuildInputs::OPTIMIZED.manifest
}
