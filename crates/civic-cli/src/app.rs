//! Application state machine and event dispatcher.
//!
//! [`App`] never touches the network. Key presses and network results come
//! in through [`App::handle_key`] and [`App::apply`]; any remote work they
//! call for goes back out as [`Effect`]s for the event loop to spawn.

use std::{collections::HashMap, time::Instant};

use chrono::Utc;
use civic_core::{
  Error as CoreError,
  claim::{Claim, ClaimId, TrendingRumor},
  debounce::{Debouncer, SEARCH_DEBOUNCE},
  feed::{FactFeed, SearchOutcome, SearchTicket},
  pipeline::cycle,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::client::Share;

// ─── Mode ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Moving through the claim list.
  Browse,
  /// Typing a search term.
  Search,
  /// Typing a claim to submit.
  Compose,
}

// ─── Effects and events ───────────────────────────────────────────────────────

/// Remote work requested by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  Search(SearchTicket),
  Submit { local_id: ClaimId, text: String },
  FetchSources { id: ClaimId, query: String },
  Share { id: ClaimId },
}

/// Results delivered back to the app by spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
  TrendingLoaded(Result<Vec<Claim>, String>),
  SearchDone {
    ticket: SearchTicket,
    result: Result<Vec<Claim>, String>,
  },
  Submitted {
    local_id: ClaimId,
    result:   Result<Claim, String>,
  },
  SourcesLoaded {
    id:     ClaimId,
    result: Result<Vec<String>, String>,
  },
  Shared {
    id:     ClaimId,
    result: Result<Share, String>,
  },
  Pushed(Claim),
  StreamClosed(String),
}

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
  Continue(Vec<Effect>),
  Quit,
}

/// The external-sources panel of one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
  Loading,
  Loaded(Vec<String>),
  Failed(String),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub feed: FactFeed,

  /// Rumors shown while no claim is selected.
  pub rumors: Vec<TrendingRumor>,

  pub mode: Mode,

  /// The search box contents; reaches the feed once input goes quiet.
  pub search_input: String,

  debouncer: Debouncer<String>,

  /// Cursor position within the visible list.
  pub cursor: usize,

  /// Open external-source panels, keyed by claim.
  pub sources: HashMap<ClaimId, Sources>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// An error shown in place of the status line until dismissed with `x`.
  pub notice: Option<String>,

  /// The latest share; shown with its claim.
  pub share: Option<Share>,

  /// Whether the live update stream is connected.
  pub live: bool,
}

impl App {
  pub fn new(claims: Vec<Claim>, rumors: Vec<TrendingRumor>) -> Self {
    Self {
      feed: FactFeed::new(claims),
      rumors,
      mode: Mode::Browse,
      search_input: String::new(),
      debouncer: Debouncer::new(SEARCH_DEBOUNCE),
      cursor: 0,
      sources: HashMap::new(),
      status_msg: String::new(),
      notice: None,
      share: None,
      live: true,
    }
  }

  /// The claim under the cursor, if any.
  pub fn selected(&self) -> Option<&Claim> { self.feed.view().get(self.cursor) }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event.
  pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Flow::Quit;
    }

    match self.mode {
      Mode::Browse => self.handle_browse_key(key),
      Mode::Search => Flow::Continue(self.handle_search_key(key, now)),
      Mode::Compose => Flow::Continue(self.handle_compose_key(key)),
    }
  }

  fn handle_browse_key(&mut self, key: KeyEvent) -> Flow {
    let mut effects = Vec::new();
    match key.code {
      KeyCode::Char('q') => return Flow::Quit,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.feed.view().len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      // Search
      KeyCode::Char('/') => {
        self.search_input = self.feed.search_term().to_owned();
        self.mode = Mode::Search;
      }
      KeyCode::Esc if self.feed.is_searching() => {
        self.search_input.clear();
        self.debouncer.cancel();
        self.feed.begin_search("");
        self.cursor = 0;
      }

      // Filters and sort
      KeyCode::Char('c') => {
        let next = cycle(
          &self.feed.filters().community,
          &self.feed.filter_options().communities,
        );
        self.feed.set_community(next);
        self.cursor = 0;
      }
      KeyCode::Char('l') => {
        let next = cycle(
          &self.feed.filters().language,
          &self.feed.filter_options().languages,
        );
        self.feed.set_language(next);
        self.cursor = 0;
      }
      KeyCode::Char('v') => {
        let next = cycle(
          &self.feed.filters().verdict,
          &self.feed.filter_options().verdicts,
        );
        self.feed.set_verdict(next);
        self.cursor = 0;
      }
      KeyCode::Char('s') => {
        self.feed.set_sort(self.feed.sort().next());
        self.cursor = 0;
      }

      // External sources
      KeyCode::Char('e') => effects.extend(self.toggle_sources()),

      // Share
      KeyCode::Char('S') => {
        if let Some(claim) = self.selected() {
          let id = claim.id.clone();
          self.status_msg = "Sharing…".into();
          effects.push(Effect::Share { id });
        }
      }
      KeyCode::Char('x') => self.notice = None,

      // Submit a claim
      KeyCode::Char('n') => {
        if self.feed.is_submitting() {
          self.status_msg = "A claim is already being submitted…".into();
        } else {
          self.mode = Mode::Compose;
          self.status_msg.clear();
        }
      }

      _ => {}
    }
    Flow::Continue(effects)
  }

  fn handle_search_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Effect> {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Browse;
        self.search_input.clear();
        self.debouncer.cancel();
        self.feed.begin_search("");
        self.cursor = 0;
      }
      KeyCode::Enter => self.mode = Mode::Browse,
      KeyCode::Backspace => {
        self.search_input.pop();
        self.debouncer.push(self.search_input.clone(), now);
      }
      KeyCode::Char(c) => {
        self.search_input.push(c);
        self.debouncer.push(self.search_input.clone(), now);
      }
      _ => {}
    }
    Vec::new()
  }

  fn handle_compose_key(&mut self, key: KeyEvent) -> Vec<Effect> {
    match key.code {
      KeyCode::Esc => self.mode = Mode::Browse,
      KeyCode::Backspace => {
        self.feed.draft_mut().pop();
      }
      KeyCode::Char(c) => self.feed.draft_mut().push(c),
      KeyCode::Enter => return self.submit(),
      _ => {}
    }
    Vec::new()
  }

  fn submit(&mut self) -> Vec<Effect> {
    match self.feed.begin_submission(Utc::now()) {
      Ok(submission) => {
        self.mode = Mode::Browse;
        self.cursor = 0;
        self.status_msg = "Submitting claim for review…".into();
        let mut effects = vec![Effect::Submit {
          local_id: submission.local_id,
          text:     submission.text,
        }];
        effects.extend(submission.research.map(Effect::Search));
        effects
      }
      Err(CoreError::EmptyDraft) => {
        self.status_msg = "Type a claim before submitting.".into();
        Vec::new()
      }
      Err(e) => {
        self.mode = Mode::Browse;
        self.status_msg = e.to_string();
        Vec::new()
      }
    }
  }

  /// Open or close the external-sources panel of the selected claim. Only
  /// opening fetches.
  fn toggle_sources(&mut self) -> Option<Effect> {
    let claim = self.selected()?;
    let id = claim.id.clone();
    let query = claim.claim.clone();
    if self.sources.remove(&id).is_some() {
      return None;
    }
    self.sources.insert(id.clone(), Sources::Loading);
    Some(Effect::FetchSources { id, query })
  }

  // ── Timers ────────────────────────────────────────────────────────────────

  /// Fire the debounced search once typing has paused.
  pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
    let Some(term) = self.debouncer.poll(now) else {
      return Vec::new();
    };
    self.cursor = 0;
    self.feed.begin_search(&term).map(Effect::Search).into_iter().collect()
  }

  // ── Network results ───────────────────────────────────────────────────────

  /// Apply a result delivered by a spawned task.
  pub fn apply(&mut self, event: AppEvent, now: Instant) -> Vec<Effect> {
    let research = match event {
      AppEvent::TrendingLoaded(Ok(claims)) => self.feed.merge_trending(claims),
      AppEvent::TrendingLoaded(Err(e)) => {
        warn!(error = %e, "trending claims unavailable; keeping seed collection");
        None
      }

      AppEvent::SearchDone { ticket, result } => {
        let results = result.unwrap_or_else(|e| {
          warn!(term = %ticket.term, error = %e, "remote search failed");
          Vec::new()
        });
        match self.feed.finish_search(&ticket, results) {
          SearchOutcome::Stale => {}
          SearchOutcome::Remote => self.cursor = 0,
          SearchOutcome::LocalFallback => {
            self.cursor = 0;
            self.status_msg = "No remote results; showing local matches.".into();
          }
        }
        None
      }

      AppEvent::Submitted { local_id, result } => {
        let confirmed = match result {
          Ok(claim) => {
            info!(%local_id, id = %claim.id, "claim submission confirmed");
            self.status_msg = "Claim submitted for review.".into();
            Some(claim)
          }
          Err(e) => {
            warn!(%local_id, error = %e, "claim submission failed");
            self.status_msg.clear();
            self.notice = Some(format!("Submission failed: {e}"));
            None
          }
        };
        self.feed.complete_submission(&local_id, confirmed)
      }

      AppEvent::SourcesLoaded { id, result } => {
        // Ignore results for panels closed in the meantime.
        if let Some(panel) = self.sources.get_mut(&id)
          && *panel == Sources::Loading
        {
          *panel = match result {
            Ok(urls) => Sources::Loaded(urls),
            Err(e) => {
              warn!(%id, error = %e, "external sources unavailable");
              Sources::Failed(e)
            }
          };
        }
        None
      }

      AppEvent::Shared { id, result } => {
        match result {
          Ok(share) => {
            info!(%id, shares = share.claim.share_count, "claim shared");
            self.feed.update(share.claim.clone());
            self.status_msg = format!("Share link: {}", share.url);
            self.share = Some(share);
          }
          Err(e) => {
            warn!(%id, error = %e, "share failed");
            self.status_msg.clear();
            self.notice = Some(format!("Share failed: {e}"));
          }
        }
        None
      }

      AppEvent::Pushed(claim) => self.feed.receive_push(claim, now),

      AppEvent::StreamClosed(reason) => {
        self.live = false;
        self.notice = Some(reason);
        None
      }
    };

    self.clamp_cursor();
    research.map(Effect::Search).into_iter().collect()
  }

  fn clamp_cursor(&mut self) {
    self.cursor = self.cursor.min(self.feed.view().len().saturating_sub(1));
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use civic_core::{
    claim::Verdict,
    pipeline::Selection,
    seed::{seed_claims, seed_rumors},
  };

  use super::*;

  fn app() -> App { App::new(seed_claims(), seed_rumors()) }

  fn press(app: &mut App, code: KeyCode, now: Instant) -> Flow {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now)
  }

  fn type_text(app: &mut App, text: &str, now: Instant) {
    for c in text.chars() {
      press(app, KeyCode::Char(c), now);
    }
  }

  fn only_search(effects: Vec<Effect>) -> SearchTicket {
    match <[Effect; 1]>::try_from(effects) {
      Ok([Effect::Search(ticket)]) => ticket,
      other => panic!("expected one search, got {other:?}"),
    }
  }

  fn ids(app: &App) -> Vec<ClaimId> { app.feed.view().iter().map(|c| c.id.clone()).collect() }

  fn server_claim(id: i64, text: &str) -> Claim {
    let mut c = Claim::pending(ClaimId::Int(id), text, Utc::now());
    c.verdict = Verdict::False;
    c
  }

  #[test]
  fn quits_on_q_and_ctrl_c() {
    let now = Instant::now();
    assert_eq!(press(&mut app(), KeyCode::Char('q'), now), Flow::Quit);

    let mut a = app();
    press(&mut a, KeyCode::Char('/'), now);
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(a.handle_key(ctrl_c, now), Flow::Quit);
  }

  #[test]
  fn search_is_debounced() {
    let mut a = app();
    let t0 = Instant::now();
    press(&mut a, KeyCode::Char('/'), t0);
    type_text(&mut a, "vo", t0);
    type_text(&mut a, "te", t0 + Duration::from_millis(200));

    assert!(a.tick(t0 + Duration::from_millis(400)).is_empty());
    let ticket = only_search(a.tick(t0 + Duration::from_millis(500)));
    assert_eq!(ticket.term, "vote");
    assert!(a.tick(t0 + Duration::from_secs(2)).is_empty());
  }

  #[test]
  fn stale_search_results_are_ignored() {
    let mut a = app();
    let t0 = Instant::now();
    press(&mut a, KeyCode::Char('/'), t0);
    type_text(&mut a, "photo", t0);
    let first = only_search(a.tick(t0 + SEARCH_DEBOUNCE));
    type_text(&mut a, "x", t0 + SEARCH_DEBOUNCE);
    let second = only_search(a.tick(t0 + SEARCH_DEBOUNCE * 2));

    a.apply(
      AppEvent::SearchDone { ticket: first, result: Ok(vec![server_claim(50, "old")]) },
      t0,
    );
    assert!(a.feed.view().iter().all(|c| c.id != ClaimId::Int(50)));

    a.apply(
      AppEvent::SearchDone { ticket: second, result: Ok(vec![server_claim(51, "new")]) },
      t0,
    );
    assert_eq!(ids(&a), vec![ClaimId::Int(51)]);
  }

  #[test]
  fn failed_search_falls_back_to_local_matches() {
    let mut a = app();
    let t0 = Instant::now();
    press(&mut a, KeyCode::Char('/'), t0);
    type_text(&mut a, "PHOTO", t0);
    let ticket = only_search(a.tick(t0 + SEARCH_DEBOUNCE));
    a.apply(AppEvent::SearchDone { ticket, result: Err("timeout".into()) }, t0);
    assert_eq!(ids(&a), vec![ClaimId::Int(3)]);

    press(&mut a, KeyCode::Esc, t0);
    assert_eq!(a.mode, Mode::Browse);
    assert_eq!(a.feed.view().len(), 3);
  }

  #[test]
  fn submission_is_optimistic_then_reconciled() {
    let mut a = app();
    let now = Instant::now();
    press(&mut a, KeyCode::Char('n'), now);
    assert_eq!(a.mode, Mode::Compose);
    type_text(&mut a, "Polls close at noon", now);

    let Flow::Continue(effects) = press(&mut a, KeyCode::Enter, now) else {
      panic!("unexpected quit");
    };
    let [Effect::Submit { local_id, text }] = effects.as_slice() else {
      panic!("unexpected effects: {effects:?}");
    };
    assert_eq!(text, "Polls close at noon");
    assert_eq!(a.mode, Mode::Browse);
    assert!(a.feed.draft().is_empty());
    assert_eq!(&a.feed.claims()[0].id, local_id);
    assert_eq!(a.feed.claims()[0].verdict, Verdict::Unverified);

    // The input is disabled while the claim is in flight.
    press(&mut a, KeyCode::Char('n'), now);
    assert_eq!(a.mode, Mode::Browse);

    let local_id = local_id.clone();
    a.apply(
      AppEvent::Submitted {
        local_id: local_id.clone(),
        result:   Ok(server_claim(4, "Polls close at noon")),
      },
      now,
    );
    assert_eq!(a.feed.claims()[0].id, ClaimId::Int(4));
    assert!(a.feed.get(&local_id).is_none());
    assert!(!a.feed.is_submitting());
  }

  #[test]
  fn failed_submission_keeps_pending_claim() {
    let mut a = app();
    let now = Instant::now();
    press(&mut a, KeyCode::Char('n'), now);
    type_text(&mut a, "Ballots are due Friday", now);
    let Flow::Continue(effects) = press(&mut a, KeyCode::Enter, now) else {
      panic!("unexpected quit");
    };
    let Some(Effect::Submit { local_id, .. }) = effects.into_iter().next() else {
      panic!("expected a submission");
    };
    let before = a.feed.claims()[0].clone();

    a.apply(
      AppEvent::Submitted { local_id, result: Err("502 Bad Gateway".into()) },
      now,
    );
    assert_eq!(a.feed.claims()[0], before);
    assert!(a.notice.as_deref().unwrap().starts_with("Submission failed"));
  }

  #[test]
  fn empty_draft_is_not_submitted() {
    let mut a = app();
    let now = Instant::now();
    press(&mut a, KeyCode::Char('n'), now);
    assert_eq!(press(&mut a, KeyCode::Enter, now), Flow::Continue(Vec::new()));
    assert_eq!(a.mode, Mode::Compose);
    assert_eq!(a.feed.claims().len(), 3);
  }

  #[test]
  fn push_shows_indicator_for_three_seconds() {
    let mut a = app();
    let now = Instant::now();
    a.apply(AppEvent::Pushed(server_claim(9, "Drop boxes are monitored")), now);
    assert_eq!(a.feed.claims()[0].id, ClaimId::Int(9));
    assert!(a.feed.refresh_indicator(now + Duration::from_secs(2)));
    assert!(!a.feed.refresh_indicator(now + Duration::from_secs(3)));
  }

  #[test]
  fn sources_fetch_only_when_opening() {
    let mut a = app();
    let now = Instant::now();
    let id = a.selected().unwrap().id.clone();

    let Flow::Continue(effects) = press(&mut a, KeyCode::Char('e'), now) else {
      panic!("unexpected quit");
    };
    assert!(matches!(effects.as_slice(), [Effect::FetchSources { id: i, .. }] if *i == id));
    assert_eq!(a.sources[&id], Sources::Loading);

    a.apply(
      AppEvent::SourcesLoaded { id: id.clone(), result: Ok(vec!["https://a.example".into()]) },
      now,
    );
    assert_eq!(a.sources[&id], Sources::Loaded(vec!["https://a.example".into()]));

    // Closing does not fetch; reopening fetches again.
    assert_eq!(press(&mut a, KeyCode::Char('e'), now), Flow::Continue(Vec::new()));
    assert!(!a.sources.contains_key(&id));
    let Flow::Continue(effects) = press(&mut a, KeyCode::Char('e'), now) else {
      panic!("unexpected quit");
    };
    assert_eq!(effects.len(), 1);
  }

  #[test]
  fn verdict_filter_cycles_through_present_values() {
    let mut a = app();
    let now = Instant::now();
    press(&mut a, KeyCode::Char('v'), now);
    assert_eq!(a.feed.filters().verdict, Selection::Only(Verdict::False));
    assert!(a.feed.view().iter().all(|c| c.verdict == Verdict::False));

    press(&mut a, KeyCode::Char('v'), now);
    press(&mut a, KeyCode::Char('v'), now);
    assert_eq!(a.feed.filters().verdict, Selection::All);
    assert_eq!(a.feed.view().len(), 3);
  }

  #[test]
  fn trending_merge_and_stream_close() {
    let mut a = app();
    let now = Instant::now();
    a.apply(AppEvent::TrendingLoaded(Ok(vec![server_claim(7, "Trending")])), now);
    assert_eq!(a.feed.claims().len(), 4);

    a.apply(AppEvent::TrendingLoaded(Err("offline".into())), now);
    assert_eq!(a.feed.claims().len(), 4);

    a.apply(AppEvent::StreamClosed("live updates ended".into()), now);
    assert!(!a.live);
    assert_eq!(a.notice.as_deref(), Some("live updates ended"));
  }

  fn share_of(claim: &Claim) -> Share {
    let mut claim = claim.clone();
    claim.share_count += 1;
    Share {
      text: claim.share_text(),
      url: format!("https://civiclink.example/fact-check/{}", claim.id),
      whatsapp: "https://wa.me/?text=Fact+Check".into(),
      sms: "sms:?body=Fact+Check".into(),
      claim,
    }
  }

  #[test]
  fn share_counts_and_shows_link() {
    let mut a = app();
    let now = Instant::now();
    let selected = a.selected().unwrap().clone();

    let Flow::Continue(effects) = press(&mut a, KeyCode::Char('S'), now) else {
      panic!("unexpected quit");
    };
    assert_eq!(effects, vec![Effect::Share { id: selected.id.clone() }]);

    a.apply(AppEvent::Shared { id: selected.id.clone(), result: Ok(share_of(&selected)) }, now);
    assert_eq!(
      a.feed.get(&selected.id).unwrap().share_count,
      selected.share_count + 1
    );
    assert_eq!(a.share.as_ref().unwrap().claim.id, selected.id);
    assert!(a.status_msg.contains("/fact-check/"));
    assert!(a.notice.is_none());
  }

  #[test]
  fn share_failure_is_a_dismissible_notice() {
    let mut a = app();
    let now = Instant::now();
    let selected = a.selected().unwrap().clone();
    press(&mut a, KeyCode::Char('S'), now);

    a.apply(
      AppEvent::Shared { id: selected.id.clone(), result: Err("connection refused".into()) },
      now,
    );
    assert_eq!(a.notice.as_deref(), Some("Share failed: connection refused"));
    assert!(a.share.is_none());
    assert_eq!(a.feed.get(&selected.id).unwrap().share_count, selected.share_count);

    press(&mut a, KeyCode::Char('x'), now);
    assert!(a.notice.is_none());
  }

  #[test]
  fn share_needs_a_selected_claim() {
    let mut a = App::new(Vec::new(), seed_rumors());
    assert_eq!(
      press(&mut a, KeyCode::Char('S'), Instant::now()),
      Flow::Continue(Vec::new())
    );
  }
}
