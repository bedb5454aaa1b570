//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once from the global flags and the configuration
//! file, so command handlers never parse flags or read config themselves.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::DeployConfig;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
#[allow(clippy::struct_excessive_bools)]
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Loaded configuration, or defaults when no file exists.
    pub config: DeployConfig,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// JSON mode implies quiet terminal output so that stdout carries only
    /// the JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but is invalid.
    pub fn new(flags: &OutputFlags, config_store: &impl ConfigStore) -> Result<Self> {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            config: config_store.load()?,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
}
