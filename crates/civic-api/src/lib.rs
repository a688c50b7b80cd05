//! JSON REST API for CivicLink.
//!
//! Exposes an axum [`Router`] backed by any [`civic_core::store::CivicStore`],
//! with the welcome-email [`Notifier`] and the [`Translator`] as optional
//! collaborators. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", civic_api::api_router(state.clone()))
//! ```

pub mod error;
pub mod facts;
pub mod stream;
pub mod translate;
pub mod waitlist;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use civic_core::{
  claim::Claim,
  provider::{Notifier, Translator},
  store::CivicStore,
};
use tokio::sync::broadcast;

pub use error::ApiError;

/// Capacity of the live claim channel. Slow subscribers skip missed events.
pub const EVENT_CAPACITY: usize = 64;

/// Default number of claims returned by the trending endpoint.
pub const DEFAULT_TRENDING_LIMIT: usize = 10;

// ─── State ───────────────────────────────────────────────────────────────────

/// Settings the handlers read but never change.
#[derive(Debug, Clone)]
pub struct ApiSettings {
  /// Base of the permalinks included in share responses.
  pub public_base_url: String,
  pub trending_limit:  usize,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      public_base_url: "http://localhost:8080".to_owned(),
      trending_limit:  DEFAULT_TRENDING_LIMIT,
    }
  }
}

/// Shared state threaded through all axum handlers.
pub struct AppState<S, N, T> {
  pub store:      Arc<S>,
  /// Claims published or re-verdicted; fanned out to stream subscribers.
  pub events:     broadcast::Sender<Claim>,
  pub notifier:   Option<Arc<N>>,
  pub translator: Option<Arc<T>>,
  pub settings:   Arc<ApiSettings>,
}

impl<S, N, T> AppState<S, N, T> {
  pub fn new(store: Arc<S>, settings: ApiSettings) -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self {
      store,
      events,
      notifier: None,
      translator: None,
      settings: Arc::new(settings),
    }
  }

  pub fn with_notifier(mut self, notifier: Arc<N>) -> Self {
    self.notifier = Some(notifier);
    self
  }

  pub fn with_translator(mut self, translator: Arc<T>) -> Self {
    self.translator = Some(translator);
    self
  }

  /// Send `claim` to every live subscriber.
  pub fn broadcast(&self, claim: &Claim) {
    if self.events.send(claim.clone()).is_err() {
      tracing::debug!(id = %claim.id, "no live subscribers for claim event");
    }
  }
}

// Manual impl: a derive would require `S`, `N` and `T` themselves to be
// `Clone`.
impl<S, N, T> Clone for AppState<S, N, T> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      events:     self.events.clone(),
      notifier:   self.notifier.clone(),
      translator: self.translator.clone(),
      settings:   Arc::clone(&self.settings),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N, T>(state: AppState<S, N, T>) -> Router<()>
where
  S: CivicStore + 'static,
  N: Notifier + 'static,
  T: Translator + 'static,
{
  Router::new()
    // Facts
    .route("/facts", post(facts::publish::<S, N, T>))
    .route("/facts/search", get(facts::search::<S, N, T>))
    .route("/facts/trending", get(facts::trending::<S, N, T>))
    .route("/facts/submit", post(facts::submit::<S, N, T>))
    .route("/facts/external", get(facts::external::<S, N, T>))
    .route("/facts/stream", get(stream::handler::<S, N, T>))
    .route("/facts/{id}", get(facts::get_one::<S, N, T>))
    .route("/facts/{id}/verdict", put(facts::set_verdict::<S, N, T>))
    .route("/facts/{id}/share", post(facts::share::<S, N, T>))
    // Translation
    .route("/translate-text", post(translate::translate_text::<S, N, T>))
    .route("/translate-civic-term", post(translate::translate_term::<S, N, T>))
    .route("/languages", get(translate::languages))
    .route("/health", get(translate::health::<S, N, T>))
    // Waitlist (with its own CORS policy)
    .merge(waitlist::router::<S, N, T>())
    .with_state(state)
}
