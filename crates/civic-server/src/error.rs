//! Errors raised by the outbound providers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The provider answered with a non-success status.
  #[error("{provider} returned {status}: {body}")]
  Status {
    provider: &'static str,
    status:   reqwest::StatusCode,
    body:     String,
  },

  #[error("malformed {provider} response: {reason}")]
  MalformedResponse {
    provider: &'static str,
    reason:   String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Turn a non-success response into [`Error::Status`], keeping the body for
/// the log.
pub(crate) async fn check_status(
  provider: &'static str,
  resp: reqwest::Response,
) -> Result<reqwest::Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { provider, status, body })
}
