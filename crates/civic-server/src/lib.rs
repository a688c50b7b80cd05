//! CivicLink server: configuration, outbound providers and the top-level
//! router.
//!
//! The JSON API from [`civic_api`] is mounted under `/api`; every request is
//! traced with [`TraceLayer`].

pub mod deepl;
pub mod error;
pub mod mail;

pub use error::Error;

use std::path::PathBuf;

use axum::Router;
use civic_api::{ApiSettings, AppState, DEFAULT_TRENDING_LIMIT};
use civic_core::{
  provider::{Notifier, Translator},
  store::CivicStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CIVIC_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  #[serde(default = "default_public_base_url")]
  pub public_base_url: String,
  /// Insert the seed claims and welcome template into an empty database.
  #[serde(default = "default_true")]
  pub seed_demo_data:  bool,
  #[serde(default = "default_trending_limit")]
  pub trending_limit:  usize,
  /// Welcome emails are skipped when unset.
  #[serde(default)]
  pub resend:          Option<ResendConfig>,
  /// Translation endpoints answer 503 when unset.
  #[serde(default)]
  pub deepl:           Option<DeepLConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResendConfig {
  pub api_key:  String,
  #[serde(default = "default_sender")]
  pub from:     String,
  #[serde(default = "default_resend_endpoint")]
  pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeepLConfig {
  pub api_key:  String,
  #[serde(default = "default_deepl_endpoint")]
  pub endpoint: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/civiclink/civic.db") }
fn default_public_base_url() -> String { "http://localhost:8080".to_owned() }
fn default_true() -> bool { true }
fn default_trending_limit() -> usize { DEFAULT_TRENDING_LIMIT }
fn default_sender() -> String { "CivicLink <onboarding@resend.dev>".to_owned() }
fn default_resend_endpoint() -> String { "https://api.resend.com/emails".to_owned() }
fn default_deepl_endpoint() -> String { "https://api-free.deepl.com/v2/translate".to_owned() }

impl ServerConfig {
  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      public_base_url: self.public_base_url.clone(),
      trending_limit:  self.trending_limit,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn app<S, N, T>(state: AppState<S, N, T>) -> Router
where
  S: CivicStore + 'static,
  N: Notifier + 'static,
  T: Translator + 'static,
{
  Router::new()
    .nest("/api", civic_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
