//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message sent to clients when the store fails.
pub const STORE_FAILURE: &str = "Internal server error";

/// An error returned by an API handler. Every variant renders as
/// `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A server-side failure reported to the client with a fixed message.
  #[error("internal error: {0}")]
  Internal(String),

  /// An outbound provider failed.
  #[error("upstream error: {0}")]
  Upstream(String),

  /// An outbound provider is not configured.
  #[error("unavailable: {0}")]
  Unavailable(String),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        // The detail stays in the log; clients get a fixed message.
        error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, STORE_FAILURE.to_owned())
      }
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<civic_core::Error> for ApiError {
  fn from(e: civic_core::Error) -> Self {
    use civic_core::Error as E;
    match e {
      E::ClaimNotFound(_) => ApiError::NotFound(e.to_string()),
      E::UnsupportedLanguage(_) => ApiError::BadRequest("Invalid target language".into()),
      E::TranslationFailed(_) => ApiError::Upstream(e.to_string()),
      E::Serialization(_) => ApiError::Internal(e.to_string()),
      E::UnknownVerdict(_)
      | E::UnknownSortKey(_)
      | E::SubmissionInFlight(_)
      | E::EmptyDraft
      | E::MissingSignupFields
      | E::EmptyText
      | E::EmptyTerm => ApiError::BadRequest(e.to_string()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}
