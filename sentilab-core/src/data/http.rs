//! Shared HTTP plumbing for the provider adapters.

use super::provider::DataError;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Build the HTTP client an adapter holds for its lifetime.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, DataError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sentilab/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DataError::Config(format!("failed to build HTTP client: {e}")))
}

/// Send a GET request and decode the body as JSON.
///
/// Transport errors and non-2xx statuses are network failures, except HTTP 429
/// which is a rate limit. A body that is not JSON is a malformed response.
pub(crate) async fn get_json(
    request: reqwest::RequestBuilder,
    what: &str,
) -> Result<Value, DataError> {
    let resp = request
        .send()
        .await
        .map_err(|e| DataError::NetworkFailure(format!("{what}: {e}")))?;

    let status = resp.status();
    debug!(%status, what, "provider responded");

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DataError::RateLimited(format!("HTTP 429 for {what}")));
    }
    if !status.is_success() {
        return Err(DataError::NetworkFailure(format!("HTTP {status} for {what}")));
    }

    resp.json::<Value>()
        .await
        .map_err(|e| DataError::MalformedResponse(format!("{what}: {e}")))
}

/// Read a number that providers send either as a JSON number or as a string
/// (optionally with a trailing `%`).
pub(crate) fn loose_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
