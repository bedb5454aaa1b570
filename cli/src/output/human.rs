//! Human-readable terminal renderer.

use lens_deploy_common::{BuildPath, DeploymentReport, Detection, PlanReport, VerifyStatus};

use crate::domain::DeploymentTarget;
use crate::output::OutputContext;

/// Renders result documents as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the final summary of a deploy run.
    pub fn render_report(&self, report: &DeploymentReport) {
        println!();
        self.ctx.header("Deployment summary:");
        self.ctx.kv("Tier:      ", &report.tier.to_string());
        self.ctx.kv(
            "Target:    ",
            &format!("{}/{}", report.resource_group, report.app),
        );
        self.ctx.kv(
            "Image:     ",
            report.image.as_deref().unwrap_or("(unchanged)"),
        );
        self.ctx.kv("Build:     ", &build_path_display(&report.build));
        if let Some(detection) = &report.detection {
            self.ctx.kv("Changes:   ", &detection_display(detection));
        }
        if let Some(fp) = &report.fingerprint {
            self.ctx.kv("Fingerprint:", short_digest(fp));
        }
        if let Some(url) = &report.url {
            self.ctx.kv("URL:       ", url);
        }

        if !report.warnings.is_empty() {
            println!();
            self.ctx.header("Warnings:");
            for w in &report.warnings {
                self.ctx.warn(w);
            }
        }

        println!();
        match &report.verify {
            VerifyStatus::Pass => self.ctx.success("Deployment verified"),
            VerifyStatus::SoftWarn { reason } => {
                self.ctx.warn(&format!("Deployed, but verification is inconclusive: {reason}"));
            }
            VerifyStatus::Unreachable { reason } => {
                self.ctx.warn(&format!("Deployed, but the app could not be reached: {reason}"));
            }
        }
    }

    /// Render the result of `plan`.
    pub fn render_plan(&self, plan: &PlanReport, target: &DeploymentTarget) {
        println!();
        self.ctx.kv("Tier:      ", &plan.tier.to_string());
        self.ctx.kv(
            "Target:    ",
            &format!("{}/{}", target.resource_group, target.app),
        );
        if let Some(detection) = &plan.detection {
            self.ctx.kv("Changes:   ", &detection_display(detection));
        }
        if let Some(fp) = &plan.fingerprint {
            self.ctx.kv("Fingerprint:", short_digest(fp));
        }
        if plan.build {
            self.ctx.info("A deploy would build and push a new image.");
        } else {
            self.ctx.info("A deploy would not build a new image.");
        }
    }
}

/// One-line description of how the image was produced.
#[must_use]
pub fn build_path_display(path: &BuildPath) -> String {
    match path {
        BuildPath::NotBuilt => "skipped".to_owned(),
        BuildPath::Local { cache_hit: true } => "local (layer cache hit)".to_owned(),
        BuildPath::Local { cache_hit: false } => "local (no layer cache)".to_owned(),
        BuildPath::Remote => "registry build service".to_owned(),
    }
}

/// One-line description of the change-detection outcome.
#[must_use]
pub fn detection_display(detection: &Detection) -> String {
    match detection {
        Detection::Unchanged => "none since last deploy (fingerprint match)".to_owned(),
        Detection::Changed => "sources changed (fingerprint differs)".to_owned(),
        Detection::ClassifiedSkip => "documentation/tooling only (git)".to_owned(),
        Detection::ClassifiedRebuild { critical } if critical.is_empty() => {
            "unknown; rebuilding".to_owned()
        }
        Detection::ClassifiedRebuild { critical } => {
            let shown: Vec<&str> = critical.iter().take(3).map(String::as_str).collect();
            let more = critical.len().saturating_sub(shown.len());
            if more == 0 {
                format!("build-relevant: {}", shown.join(", "))
            } else {
                format!("build-relevant: {} (+{more} more)", shown.join(", "))
            }
        }
    }
}

/// First 12 hex digits of a digest.
#[must_use]
pub fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
