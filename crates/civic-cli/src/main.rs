//! `civic` — terminal client for the CivicLink server.
//!
//! # Usage
//!
//! ```
//! civic --url http://localhost:8080
//! civic translate --to spanish "Polling places open at 7am."
//! civic join --email voter@example.com --phone 555-0100 --zip 94110
//! ```

mod app;
mod client;
mod stream;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::{App, AppEvent, Effect, Flow};
use civic_core::{
  seed::{seed_claims, seed_rumors},
  translate::TranslationRequest,
  waitlist::WaitlistRequest,
};
use clap::{Parser, Subcommand};
use client::ApiClient;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use stream::Subscription;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "civic", about = "Terminal client for the CivicLink server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the CivicLink server (default: http://localhost:8080).
  #[arg(long, env = "CIVIC_URL")]
  url: Option<String>,

  /// Write logs to this file.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Browse, search and submit fact-checks (default).
  Hub,

  /// Translate text through the server's translation service.
  Translate {
    /// Text to translate.
    text: String,

    /// Target language, as a code (`es`) or name (`spanish`).
    #[arg(long, default_value = "es")]
    to: String,

    /// Source language; `auto` detects it.
    #[arg(long, default_value = "auto")]
    from: String,
  },

  /// Join the CivicLink waitlist.
  Join {
    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: String,

    #[arg(long = "zip")]
    zip_code: String,

    /// Preferred language.
    #[arg(long)]
    language: Option<String>,

    /// Sign up as a community organizer.
    #[arg(long)]
    organizer: bool,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let command = args.command.unwrap_or(Command::Hub);
  init_tracing(args.log_file.as_deref(), matches!(command, Command::Hub))?;

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:8080".to_string());
  let client = ApiClient::new(base_url)?;

  match command {
    Command::Hub => run_hub(client).await,
    Command::Translate { text, to, from } => translate(&client, text, to, from).await,
    Command::Join { email, phone, zip_code, language, organizer } => {
      let request = WaitlistRequest {
        email,
        phone,
        zip_code,
        language,
        is_organizer: Some(organizer),
      };
      let resp = client.join_waitlist(&request).await?;
      println!("{} (id {})", resp.message, resp.id);
      Ok(())
    }
  }
}

/// Log to `log_file` when given. Otherwise one-shot commands log warnings to
/// stderr and the hub does not log, since the terminal belongs to the UI.
fn init_tracing(log_file: Option<&Path>, hub: bool) -> Result<()> {
  let filter = |default: LevelFilter| {
    EnvFilter::builder()
      .with_default_directive(default.into())
      .from_env_lossy()
  };

  match log_file {
    Some(path) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter(LevelFilter::INFO))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None if !hub => {
      tracing_subscriber::fmt()
        .with_env_filter(filter(LevelFilter::WARN))
        .with_writer(io::stderr)
        .init();
    }
    None => {}
  }
  Ok(())
}

// ─── One-shot commands ────────────────────────────────────────────────────────

async fn translate(client: &ApiClient, text: String, to: String, from: String) -> Result<()> {
  let request = TranslationRequest {
    text,
    target_language: to,
    source_language: from,
  };
  let outcome = client.translate(&request).await?;
  println!("{}", outcome.translated_text);
  eprintln!(
    "quality {:.0}%  ·  {} characters  ·  {} chunk(s)  ·  {}",
    outcome.quality_score * 100.0,
    outcome.total_characters,
    outcome.chunks_processed,
    outcome.translation_service,
  );
  Ok(())
}

// ─── Hub ──────────────────────────────────────────────────────────────────────

async fn run_hub(client: ApiClient) -> Result<()> {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut app = App::new(seed_claims(), seed_rumors());

  // Initial data and the live subscription; both report through `tx`.
  {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
      let result = client.trending().await.map_err(|e| e.to_string());
      let _ = tx.send(AppEvent::TrendingLoaded(result));
    });
  }
  let subscription = Subscription::open(client.clone(), tx.clone());

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app, &client, &tx, &mut rx).await;

  drop(subscription);

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  client: &ApiClient,
  tx: &UnboundedSender<AppEvent>,
  rx: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
  loop {
    let now = Instant::now();
    terminal.draw(|f| ui::draw(f, app, now)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    let now = Instant::now();
    if let Some(Event::Key(key)) = maybe_event {
      match app.handle_key(key, now) {
        Flow::Quit => break,
        Flow::Continue(effects) => dispatch(effects, client, tx),
      }
    }

    // Network results, one at a time.
    while let Ok(event) = rx.try_recv() {
      let effects = app.apply(event, now);
      dispatch(effects, client, tx);
    }

    let effects = app.tick(now);
    dispatch(effects, client, tx);
  }

  Ok(())
}

/// Spawn one task per effect; each reports back through `tx`.
fn dispatch(effects: Vec<Effect>, client: &ApiClient, tx: &UnboundedSender<AppEvent>) {
  for effect in effects {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
      let event = match effect {
        Effect::Search(ticket) => {
          let result = client.search(&ticket.term).await.map_err(|e| e.to_string());
          AppEvent::SearchDone { ticket, result }
        }
        Effect::Submit { local_id, text } => {
          let result = client.submit(&text).await.map_err(|e| e.to_string());
          AppEvent::Submitted { local_id, result }
        }
        Effect::FetchSources { id, query } => {
          let result = client
            .external_sources(&query)
            .await
            .map_err(|e| e.to_string());
          AppEvent::SourcesLoaded { id, result }
        }
        Effect::Share { id } => {
          let result = client.share(&id).await.map_err(|e| e.to_string());
          AppEvent::Shared { id, result }
        }
      };
      let _ = tx.send(event);
    });
  }
}
