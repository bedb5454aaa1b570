//! Classification of the post-deploy health response.

use lens_deploy_common::VerifyStatus;

/// Case-insensitive markers that identify the deployed frontend.
pub const CONTENT_MARKERS: &[&str] = &["streamlit", "bundestag"];

/// Classify an HTTP response from the application's public address.
#[must_use]
pub fn classify_response(status: u16, body: &str) -> VerifyStatus {
    if status != 200 {
        return VerifyStatus::SoftWarn {
            reason: format!("HTTP {status}"),
        };
    }
    let lower = body.to_ascii_lowercase();
    if CONTENT_MARKERS.iter().any(|m| lower.contains(m)) {
        VerifyStatus::Pass
    } else {
        VerifyStatus::SoftWarn {
            reason: "reachable, but expected content markers are missing".to_owned(),
        }
    }
}
