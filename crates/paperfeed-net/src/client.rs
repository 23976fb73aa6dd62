//! Shared blocking HTTP client with bounded retry.

use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use log::warn;
use thiserror::Error;

pub const RETRY_ATTEMPTS: u32 = 3;
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum NetError {
    #[error("build http client: {0}")]
    Build(reqwest::Error),
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    #[error("http status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("malformed response from {url}: {detail}")]
    Malformed { url: String, detail: String },
    #[error("retries exhausted for {url}")]
    Exhausted { url: String },
    #[error("io at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Transient failures are retried; everything else surfaces immediately.
fn is_transient(err: &NetError) -> bool {
    match err {
        NetError::Transport(_) => true,
        NetError::Status { status, .. } => {
            status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
        }
        _ => false,
    }
}

/// One configured blocking client, built at process start and passed by
/// reference to every network-calling component.
#[derive(Debug)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, NetError> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(concat!("paperfeed/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NetError::Build)?;
        Ok(Self { inner })
    }

    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.inner
    }

    /// GET with bounded retry on transient failures (connect/timeout/SSL,
    /// HTTP 5xx, 429): up to [`RETRY_ATTEMPTS`] attempts with a delay of
    /// `RETRY_BASE_DELAY * attempt` between them. Returns the first
    /// successful response; other 4xx statuses fail immediately.
    pub fn get_with_retries(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::blocking::Response, NetError> {
        for attempt in 1..=RETRY_ATTEMPTS {
            match self.get_once(url, params) {
                Ok(resp) => return Ok(resp),
                Err(err) if is_transient(&err) => {
                    warn!("attempt {attempt}/{RETRY_ATTEMPTS} failed for {url}: {err}");
                    thread::sleep(RETRY_BASE_DELAY * attempt);
                }
                Err(err) => return Err(err),
            }
        }
        Err(NetError::Exhausted {
            url: url.to_string(),
        })
    }

    /// GET a JSON document with retries. A body that fails to parse is
    /// [`NetError::Malformed`] and is not retried.
    pub fn get_json_with_retries(&self, url: &str) -> Result<serde_json::Value, NetError> {
        let resp = self.get_with_retries(url, &[])?;
        resp.json().map_err(|err| NetError::Malformed {
            url: url.to_string(),
            detail: err.to_string(),
        })
    }

    fn get_once(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::blocking::Response, NetError> {
        let mut request = self.inner.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }
        let resp = request.send().map_err(NetError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_transient() {
        use reqwest::StatusCode;
        let transient = [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
        ];
        for status in transient {
            let err = NetError::Status {
                status,
                url: "http://example.test".to_string(),
            };
            assert!(is_transient(&err), "status {status} must be transient");
        }
    }

    #[test]
    fn client_errors_and_malformed_bodies_are_not_retried() {
        let not_found = NetError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            url: "http://example.test".to_string(),
        };
        assert!(!is_transient(&not_found));

        let malformed = NetError::Malformed {
            url: "http://example.test".to_string(),
            detail: "bad json".to_string(),
        };
        assert!(!is_transient(&malformed));
    }
}
