//! civic-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `CIVIC_*` environment variables, opens the SQLite store, and serves the
//! CivicLink API over HTTP. Nested keys use a double underscore, e.g.
//! `CIVIC_DEEPL__API_KEY`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use civic_api::AppState;
use civic_server::{ServerConfig, deepl::DeepLTranslator, mail::ResendNotifier};
use civic_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "CivicLink fact-check, waitlist and translation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CIVIC")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  if server_cfg.seed_demo_data {
    let inserted = store
      .seed_demo_data()
      .await
      .context("failed to seed demo data")?;
    if inserted > 0 {
      tracing::info!(claims = inserted, "seeded empty store");
    }
  }

  // Build application state.
  let mut state: AppState<SqliteStore, ResendNotifier, DeepLTranslator> =
    AppState::new(Arc::new(store), server_cfg.api_settings());

  match server_cfg.resend.clone() {
    Some(cfg) => {
      let notifier = ResendNotifier::new(cfg).context("failed to build Resend client")?;
      state = state.with_notifier(Arc::new(notifier));
    }
    None => tracing::warn!("no [resend] section; welcome emails are disabled"),
  }
  match server_cfg.deepl.clone() {
    Some(cfg) => {
      let translator = DeepLTranslator::new(cfg).context("failed to build DeepL client")?;
      state = state.with_translator(Arc::new(translator));
    }
    None => tracing::warn!("no [deepl] section; translation is disabled"),
  }

  let app = civic_server::app(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
