//! Shared request/response plumbing for REST collaborators

use serde::de::DeserializeOwned;
use url::Url;

use crate::{AdapterError, Result};

/// Join a base URL and an API path, tolerating a trailing slash on the base
pub fn endpoint_url(base_url: &str, path: &str) -> Result<Url> {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{}/{}", base, path))?)
}

/// Send a prepared request and decode a JSON body
///
/// Transport failures, timeouts, non-2xx statuses and schema mismatches each
/// map to their own [`AdapterError`] variant.
pub async fn send_json<T>(endpoint: &str, request: reqwest::RequestBuilder, timeout_ms: u64) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|e| AdapterError::from_reqwest(endpoint, e, timeout_ms))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AdapterError::from_reqwest(endpoint, e, timeout_ms))?;

    if !status.is_success() {
        return Err(AdapterError::status(endpoint, status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| AdapterError::decode(endpoint, e))
}
