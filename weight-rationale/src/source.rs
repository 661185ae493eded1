//! Shared plumbing for the evidence sources (fundamentals and news vendors).

use std::time::Duration;

use thiserror::Error;

/// Failure fetching or decoding vendor evidence.
///
/// Never escapes a retrieval stage; callers log it and continue with empty
/// evidence.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Vendor answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Source disabled or not configured
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// True when the failure came from the transport rather than the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        let message = weight_common::util::sanitize_for_log(&err.to_string());
        if err.is_decode() {
            Self::Decode(message)
        } else {
            Self::Network(message)
        }
    }
}

/// Browser-like agent string; some vendors reject default client agents.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Build an HTTP client with the given timeout.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Send a GET and return the body text, mapping non-success statuses.
pub(crate) async fn get_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, SourceError> {
    let response = client.get(url).query(query).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            body: weight_common::util::truncate_with_ellipsis(&body, 200),
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(SourceError::Network("reset".into()).is_transport());
        assert!(SourceError::Status { status: 503, body: String::new() }.is_transport());
        assert!(!SourceError::Decode("bad xml".into()).is_transport());
        assert!(!SourceError::Unavailable("disabled".into()).is_transport());
    }

    #[test]
    fn test_display() {
        let err = SourceError::Status { status: 429, body: "slow down".into() };
        assert_eq!(err.to_string(), "HTTP 429: slow down");
    }
}
