//! Shared HTTP send loop for the provider clients

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use super::LlmError;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// POST a JSON body, retrying transient failures with exponential backoff
///
/// A 429 is returned immediately as [`LlmError::RateLimited`] so the caller
/// sees the server's retry-after instead of burning attempts.
pub(super) async fn post_json(
    http: &Client,
    url: &str,
    headers: HeaderMap,
    body: &serde_json::Value,
    timeout: Duration,
) -> Result<Response, LlmError> {
    debug!(%url, "post_json: called");
    let mut last_error = None;

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
            warn!(attempt, backoff_ms = backoff, "post_json: retrying after transient error");
            tokio::time::sleep(Duration::from_millis(backoff)).await;
        }

        let response = match http.post(url).headers(headers.clone()).json(body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                debug!(attempt, "post_json: timeout");
                last_error = Some(LlmError::Timeout(timeout));
                continue;
            }
            Err(e) => {
                debug!(attempt, error = %e, "post_json: network error");
                last_error = Some(LlmError::Network(e));
                continue;
            }
        };

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            debug!(retry_after, "post_json: rate limited (429)");
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            let err = LlmError::ApiError { status, message };
            if err.is_retryable() && attempt < MAX_RETRIES {
                debug!(attempt, status, "post_json: retryable error");
                last_error = Some(err);
                continue;
            }
            debug!(%status, "post_json: API error");
            return Err(err);
        }

        debug!("post_json: success");
        return Ok(response);
    }

    Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
}
