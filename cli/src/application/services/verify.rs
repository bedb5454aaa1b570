//! Verifier: one bounded health request against the public endpoint.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use lens_deploy_common::VerifyStatus;

use crate::application::ports::{HttpProbe, ProgressReporter, ResourceInspector};
use crate::domain::DeploymentTarget;
use crate::domain::verify::classify_response;

/// Final verification status and the probed URL, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub status: VerifyStatus,
    pub url: Option<String>,
}

/// Resolve the public address, wait `settle`, then issue one GET.
///
/// Never fails: every outcome is a status for the final summary.
pub async fn verify_deployment(
    cloud: &impl ResourceInspector,
    probe: &impl HttpProbe,
    target: &DeploymentTarget,
    settle: Duration,
    timeout: Duration,
    reporter: &impl ProgressReporter,
) -> Verification {
    let url = match cloud.app_address(target).await {
        Ok(Some(addr)) => public_url(&addr),
        Ok(None) => {
            return unreachable(None, "the app exposes no public address".to_owned(), reporter);
        }
        Err(e) => {
            return unreachable(None, format!("cannot resolve app address: {e:#}"), reporter);
        }
    };

    if !settle.is_zero() {
        reporter.step(&format!("waiting {}s for the revision to settle...", settle.as_secs()));
        tokio::time::sleep(settle).await;
    }

    reporter.step(&format!("checking {url}..."));
    let status = match probe.get(&url, timeout).await {
        Ok(resp) => classify_response(resp.status, &resp.body),
        Err(e) => return unreachable(Some(url), format!("{e:#}"), reporter),
    };
    match &status {
        VerifyStatus::Pass => reporter.success(&format!("{url} is serving the application")),
        VerifyStatus::SoftWarn { reason } | VerifyStatus::Unreachable { reason } => {
            reporter.warn(&format!("{url}: {reason}"));
        }
    }
    Verification {
        status,
        url: Some(url),
    }
}

fn unreachable(
    url: Option<String>,
    reason: String,
    reporter: &impl ProgressReporter,
) -> Verification {
    tracing::info!(reason = %reason, "verification could not reach the app");
    reporter.warn(&format!("app unreachable: {reason}"));
    Verification {
        status: VerifyStatus::Unreachable { reason },
        url,
    }
}

/// Ingress reports a bare FQDN; probe it over HTTPS.
#[must_use]
pub fn public_url(address: &str) -> String {
    let address = address.trim();
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_owned()
    } else {
        format!("https://{address}")
    }
}
