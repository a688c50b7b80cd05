//! `POST /waitlist` — waitlist intake.
//!
//! The sign-up row is the only required effect. The welcome email and its
//! log entry are best-effort: their failures are logged and never change
//! the response.

use axum::{
  Json, Router,
  extract::{State, rejection::JsonRejection},
  http::{
    HeaderName, Method, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
  },
  routing::post,
};
use civic_core::{
  provider::{Notifier, Translator},
  store::CivicStore,
  waitlist::{NewSignup, STATUS_SENT, WELCOME_TEMPLATE, WaitlistRequest, WaitlistResponse},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

use crate::{AppState, error::ApiError};

/// CORS policy for the sign-up form, which is served from another origin.
pub fn cors() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_headers([
      AUTHORIZATION,
      HeaderName::from_static("x-client-info"),
      HeaderName::from_static("apikey"),
      CONTENT_TYPE,
    ])
    .allow_methods([Method::POST, Method::OPTIONS])
}

pub fn router<S, N, T>() -> Router<AppState<S, N, T>>
where
  S: CivicStore + 'static,
  N: Notifier + 'static,
  T: Translator + 'static,
{
  Router::new()
    .route("/waitlist", post(join::<S, N, T>).options(preflight))
    .layer(cors())
}

/// Any `OPTIONS` request is answered 200; the CORS layer adds the headers.
pub async fn preflight() -> StatusCode { StatusCode::OK }

/// `POST /waitlist` — body: `{"email","phone","zipCode","language","isOrganizer"}`.
pub async fn join<S, N, T>(
  State(state): State<AppState<S, N, T>>,
  body: Result<Json<WaitlistRequest>, JsonRejection>,
) -> Result<Json<WaitlistResponse>, ApiError>
where
  S: CivicStore,
  N: Notifier,
{
  let Json(request) = body?;
  let signup = NewSignup::try_from(request).inspect_err(|_| {
    warn!("waitlist request missing required fields");
  })?;

  info!(email = %signup.email, "storing waitlist signup");
  let stored = state.store.add_signup(signup).await.map_err(|e| {
    error!(error = %e, "failed to store waitlist signup");
    ApiError::Internal("Failed to store signup".into())
  })?;
  info!(id = %stored.id, "waitlist signup stored");

  send_welcome(&state, &stored.email).await;

  Ok(Json(WaitlistResponse::joined(stored.id)))
}

/// Send the welcome email to `to` and log the delivery. Never fails.
async fn send_welcome<S, N, T>(state: &AppState<S, N, T>, to: &str)
where
  S: CivicStore,
  N: Notifier,
{
  let template = match state.store.email_template(WELCOME_TEMPLATE.to_owned()).await {
    Ok(Some(t)) => t,
    Ok(None) => {
      warn!(template = WELCOME_TEMPLATE, "email template missing; skipping welcome email");
      return;
    }
    Err(e) => {
      warn!(error = %e, "failed to load email template; skipping welcome email");
      return;
    }
  };

  let Some(notifier) = &state.notifier else {
    debug!("no email provider configured; skipping welcome email");
    return;
  };

  let email = template.welcome_for(to);
  if let Err(e) = notifier.send(&email).await {
    error!(error = %e, "failed to send welcome email");
    return;
  }
  info!("welcome email sent");

  if let Err(e) = state
    .store
    .record_sent_email(to.to_owned(), WELCOME_TEMPLATE.to_owned(), STATUS_SENT.to_owned())
    .await
  {
    warn!(error = %e, "failed to log sent email");
  }
}
