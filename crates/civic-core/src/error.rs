//! Error types for `civic-core`.

use thiserror::Error;

use crate::claim::ClaimId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown verdict: {0:?}")]
  UnknownVerdict(String),

  #[error("unknown sort key: {0:?}")]
  UnknownSortKey(String),

  #[error("claim not found: {0}")]
  ClaimNotFound(ClaimId),

  #[error("a submission is already in flight ({0})")]
  SubmissionInFlight(ClaimId),

  #[error("cannot submit an empty claim")]
  EmptyDraft,

  #[error("Email, phone, and zip code are required")]
  MissingSignupFields,

  #[error("Text is required")]
  EmptyText,

  #[error("Term is required")]
  EmptyTerm,

  #[error("Invalid target language: {0:?}")]
  UnsupportedLanguage(String),

  #[error("Translation failed: {0}")]
  TranslationFailed(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
