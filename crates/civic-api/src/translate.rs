//! Translation endpoints and the service health check.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use civic_core::{
  provider::Translator,
  translate::{
    self as core_translate, ALL_LANGUAGES, CIVIC_LANGUAGES, TermRequest, TermTranslation,
    TranslationOutcome, TranslationRequest,
  },
};
use serde_json::{Map, Value, json};

use crate::{AppState, error::ApiError};

fn translator<S, N, T>(state: &AppState<S, N, T>) -> Result<&T, ApiError> {
  state
    .translator
    .as_deref()
    .ok_or_else(|| ApiError::Unavailable("Translation service is not configured".into()))
}

/// `POST /translate-text`
pub async fn translate_text<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  body: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationOutcome>, ApiError>
where
  T: Translator,
{
  let Json(request) = body?;
  request.validate()?;
  let outcome = core_translate::translate(translator(&state)?, &request).await?;
  Ok(Json(outcome))
}

/// `POST /translate-civic-term` — body: `{"term":"...","target_language":"spanish"}`.
pub async fn translate_term<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  body: Result<Json<TermRequest>, JsonRejection>,
) -> Result<Json<TermTranslation>, ApiError>
where
  T: Translator,
{
  let Json(request) = body?;
  request.to_translation()?.validate()?;
  let result = core_translate::translate_term(translator(&state)?, &request).await?;
  Ok(Json(result))
}

/// `GET /languages`
pub async fn languages() -> Json<Value> {
  let civic: Map<String, Value> = CIVIC_LANGUAGES
    .iter()
    .map(|l| (l.name.to_owned(), json!({ "native": l.native, "code": l.code })))
    .collect();
  Json(json!({
    "all_languages":   ALL_LANGUAGES,
    "civic_languages": civic,
    "total_count":     ALL_LANGUAGES.len(),
  }))
}

/// `GET /health`
pub async fn health<S, N, T>(State(state): State<AppState<S, N, T>>) -> Json<Value>
where
  T: Translator,
{
  let service = state
    .translator
    .as_deref()
    .map_or("unavailable", T::name);
  Json(json!({
    "status":              "healthy",
    "message":             "CivicLink service is running",
    "translation_service": service,
    "email_delivery":      state.notifier.is_some(),
    "total_languages":     ALL_LANGUAGES.len(),
    "civic_languages":     CIVIC_LANGUAGES.len(),
  }))
}
