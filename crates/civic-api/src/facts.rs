//! Handlers for `/facts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/facts/search` | `?q=`; case-insensitive literal match, newest first |
//! | `GET`  | `/facts/trending` | `?limit=`; ranked by trend score |
//! | `POST` | `/facts/submit` | Body: `{"claim":"..."}`; stored as `unverified` |
//! | `GET`  | `/facts/external` | `?q=`; external-source URLs |
//! | `POST` | `/facts` | Body: [`NewClaim`]; returns 201, broadcast live |
//! | `GET`  | `/facts/{id}` | Counts a view |
//! | `PUT`  | `/facts/{id}/verdict` | Body: [`VerdictUpdate`]; broadcast live |
//! | `POST` | `/facts/{id}/share` | Counts a share; returns share text and permalink |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use civic_core::{
  claim::{Claim, ClaimId, NewClaim, VerdictUpdate},
  store::{CivicStore, SEARCH_LIMIT},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiError};

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /facts/search?q=<term>` — an empty term returns no claims.
pub async fn search<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Claim>>, ApiError>
where
  S: CivicStore,
{
  let term = params.q.trim();
  if term.is_empty() {
    return Ok(Json(Vec::new()));
  }
  let claims = state
    .store
    .search_claims(term.to_owned(), SEARCH_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(claims))
}

// ─── Trending ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct TrendingParams {
  pub limit: Option<usize>,
}

/// `GET /facts/trending[?limit=n]`
pub async fn trending<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<Claim>>, ApiError>
where
  S: CivicStore,
{
  let limit = params.limit.unwrap_or(state.settings.trending_limit);
  let claims = state
    .store
    .trending_claims(limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(claims))
}

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  #[serde(default)]
  pub claim: String,
}

/// `POST /facts/submit` — queue a user-reported claim for fact-checking.
pub async fn submit<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<Claim>, ApiError>
where
  S: CivicStore,
{
  let Json(body) = body?;
  let text = body.claim.trim();
  if text.is_empty() {
    return Err(ApiError::BadRequest("Claim text is required".into()));
  }

  let claim = state
    .store
    .submit_claim(text.to_owned())
    .await
    .map_err(ApiError::store)?;
  info!(id = %claim.id, "claim submitted for review");
  Ok(Json(claim))
}

// ─── External sources ────────────────────────────────────────────────────────

/// `GET /facts/external?q=<term>`
pub async fn external<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: CivicStore,
{
  let term = params.q.trim();
  if term.is_empty() {
    return Ok(Json(Vec::new()));
  }
  let urls = state
    .store
    .external_sources(term.to_owned())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(urls))
}

// ─── Publish ─────────────────────────────────────────────────────────────────

/// `POST /facts` — returns 201 + the stored claim, and pushes it to live
/// subscribers.
pub async fn publish<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  body: Result<Json<NewClaim>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CivicStore,
{
  let Json(input) = body?;
  if input.claim.trim().is_empty() {
    return Err(ApiError::BadRequest("Claim text is required".into()));
  }

  let claim = state
    .store
    .publish_claim(input)
    .await
    .map_err(ApiError::store)?;
  info!(id = %claim.id, verdict = %claim.verdict, "claim published");
  state.broadcast(&claim);
  Ok((StatusCode::CREATED, Json(claim)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /facts/{id}`
pub async fn get_one<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  Path(raw): Path<String>,
) -> Result<Json<Claim>, ApiError>
where
  S: CivicStore,
{
  let id = ClaimId::from(raw.as_str());
  let claim = state
    .store
    .get_claim(id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("claim {id} not found")))?;
  Ok(Json(claim))
}

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// `PUT /facts/{id}/verdict` — body: `{"verdict":"false","explanation":"..."}`.
pub async fn set_verdict<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  Path(raw): Path<String>,
  body: Result<Json<VerdictUpdate>, JsonRejection>,
) -> Result<Json<Claim>, ApiError>
where
  S: CivicStore,
{
  let Json(update) = body?;
  let id = ClaimId::from(raw.as_str());
  let claim = state
    .store
    .set_verdict(id.clone(), update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("claim {id} not found")))?;
  info!(id = %claim.id, verdict = %claim.verdict, "verdict updated");
  state.broadcast(&claim);
  Ok(Json(claim))
}

// ─── Share ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareResponse {
  pub text:  String,
  pub url:   String,
  pub claim: Claim,
}

/// `POST /facts/{id}/share`
pub async fn share<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  Path(raw): Path<String>,
) -> Result<Json<ShareResponse>, ApiError>
where
  S: CivicStore,
{
  let id = ClaimId::from(raw.as_str());
  let claim = state
    .store
    .record_share(id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("claim {id} not found")))?;
  Ok(Json(ShareResponse {
    text:  claim.share_text(),
    url:   claim.permalink(&state.settings.public_base_url),
    claim,
  }))
}
