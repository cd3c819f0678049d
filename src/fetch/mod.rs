//! Retrieval of the published sheet export.
//!
//! One GET per call, no retry and no caching: every run sees the sheet as it
//! is right now.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::PipelineError;

/// Fetches `url` and returns the response body.
///
/// # Errors
///
/// [`PipelineError::SourceUnavailable`] on an unparseable URL, a transport
/// failure, or a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, PipelineError> {
    let parsed = url
        .parse()
        .map_err(|e| PipelineError::SourceUnavailable(format!("invalid URL '{url}': {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| PipelineError::SourceUnavailable(format!("request failed: {e}")))?;
    ensure_success(resp.status())?;

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| PipelineError::SourceUnavailable(format!("failed to read body: {e}")))?;
    debug!(bytes = bytes.len(), "Sheet export received");
    Ok(bytes.to_vec())
}

/// Loads sheet data from a local file path or fetches it over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>, PipelineError> {
    if is_remote(source) {
        fetch_bytes(client, source).await
    } else {
        std::fs::read(source).map_err(|e| {
            warn!(error = %e, "Local sheet export unreadable");
            PipelineError::SourceUnavailable(format!("cannot read '{source}': {e}"))
        })
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn ensure_success(status: StatusCode) -> Result<(), PipelineError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(PipelineError::SourceUnavailable(format!(
            "server returned status {status}"
        )))
    }
}
