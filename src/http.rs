//! Shared HTTP plumbing for the upstream APIs: one client with a per-request
//! timeout, and a retry loop with exponential backoff for transient failures.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Build the client used for every upstream request
pub fn build_client(http: &HttpConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(http.timeout())
        .user_agent(concat!("billroll/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// 429 and 5xx are worth another attempt; other failures are not
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

async fn api_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Error::Api { status, message }
}

/// Send a request, retrying transient failures. `make` rebuilds the request
/// for every attempt. `what` names the request in log output.
pub async fn send_with_retry<F>(http: &HttpConfig, what: &str, make: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt: u32 = 0;
    loop {
        let delay = match make().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) if is_retryable_status(response.status()) => {
                if attempt >= http.max_retries {
                    return Err(api_error(response).await);
                }
                let delay = retry_after(&response).unwrap_or_else(|| http.backoff(attempt));
                tracing::warn!(
                    request = what,
                    status = response.status().as_u16(),
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "transient upstream status, retrying"
                );
                delay
            }
            Ok(response) => return Err(api_error(response).await),
            Err(err) if is_retryable_transport(&err) && attempt < http.max_retries => {
                let delay = http.backoff(attempt);
                tracing::warn!(
                    request = what,
                    error = %err.without_url(),
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "upstream request failed, retrying"
                );
                delay
            }
            Err(err) => return Err(err.into()),
        };

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
