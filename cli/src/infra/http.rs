//! HTTP infrastructure: implements `HttpProbe` with `reqwest`.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{HttpProbe, HttpResponse};

/// Upper bound on the body read for content classification.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// `reqwest`-backed probe with rustls.
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lens-deploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = response.status().as_u16();
        let bytes = read_capped(response, MAX_BODY_BYTES)
            .await
            .with_context(|| format!("reading body of {url}"))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        tracing::debug!(url, status, len = bytes.len(), "probe response");
        Ok(HttpResponse { status, body })
    }
}

/// Read at most `cap` bytes of the body, then drop the connection.
async fn read_capped(mut response: reqwest::Response, cap: usize) -> reqwest::Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = cap - buf.len();
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if buf.len() >= cap {
            break;
        }
    }
    Ok(buf)
}
