//! [`FactFeed`] — the state container behind the fact-check hub.
//!
//! The feed owns the claim collection, the filter/sort selections, the
//! active search and the submission draft. It is mutated only through the
//! transition methods below; each one recomputes the visible list.
//!
//! Remote calls are not made here. Transitions that need one hand back a
//! ticket ([`SearchTicket`], [`Submission`]) which the caller sends over the
//! network and later feeds back in with the response.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  claim::{Claim, ClaimId, Verdict},
  pipeline::{self, FilterOptions, Filters, Selection, SortKey},
  search,
};

/// How long the "new fact-checks available" indicator stays up after a push.
pub const REFRESH_INDICATOR: Duration = Duration::from_secs(3);

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// An issued remote search. Responses are accepted only for the most
/// recently issued ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
  pub seq:  u64,
  pub term: String,
}

/// What [`FactFeed::finish_search`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
  /// Remote results replaced the visible list.
  Remote,
  /// The remote search found nothing; local substring matches are shown.
  LocalFallback,
  /// A newer search was issued since; the response was discarded.
  Stale,
}

/// A submitted claim awaiting server confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
  /// Identifier of the provisional record; never changes.
  pub local_id: ClaimId,
  pub text:     String,
  /// Re-issued search, when a search was active while the collection changed.
  pub research: Option<SearchTicket>,
}

// ─── Feed ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FactFeed {
  claims:        Vec<Claim>,
  filters:       Filters,
  sort:          SortKey,
  search_term:   String,
  search_seq:    u64,
  view:          Vec<Claim>,
  draft:         String,
  in_flight:     Option<ClaimId>,
  refresh_until: Option<Instant>,
}

impl Default for FactFeed {
  fn default() -> Self { Self::new(Vec::new()) }
}

impl FactFeed {
  /// A feed over `claims` with no filters and the default sort.
  pub fn new(claims: Vec<Claim>) -> Self {
    let mut feed = Self {
      claims:        Vec::with_capacity(claims.len()),
      filters:       Filters::default(),
      sort:          SortKey::default(),
      search_term:   String::new(),
      search_seq:    0,
      view:          Vec::new(),
      draft:         String::new(),
      in_flight:     None,
      refresh_until: None,
    };
    for claim in claims.into_iter().rev() {
      feed.prepend(claim);
    }
    feed.refresh();
    feed
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The full working collection, most recent first.
  pub fn claims(&self) -> &[Claim] { &self.claims }

  /// The list to render: search results while a search is active, otherwise
  /// the filtered and sorted collection.
  pub fn view(&self) -> &[Claim] { &self.view }

  pub fn filters(&self) -> &Filters { &self.filters }

  pub fn sort(&self) -> SortKey { self.sort }

  pub fn search_term(&self) -> &str { &self.search_term }

  pub fn is_searching(&self) -> bool { !self.search_term.is_empty() }

  pub fn draft(&self) -> &str { &self.draft }

  pub fn is_submitting(&self) -> bool { self.in_flight.is_some() }

  pub fn get(&self, id: &ClaimId) -> Option<&Claim> {
    self.claims.iter().find(|c| &c.id == id)
  }

  pub fn filter_options(&self) -> FilterOptions {
    FilterOptions::from_claims(&self.claims)
  }

  /// Whether the "new fact-checks available" indicator is showing at `now`.
  pub fn refresh_indicator(&self, now: Instant) -> bool {
    self.refresh_until.is_some_and(|until| now < until)
  }

  // ── Filter / sort transitions ─────────────────────────────────────────────

  pub fn set_community(&mut self, community: Selection<String>) {
    self.filters.community = community;
    self.refresh();
  }

  pub fn set_language(&mut self, language: Selection<String>) {
    self.filters.language = language;
    self.refresh();
  }

  pub fn set_verdict(&mut self, verdict: Selection<Verdict>) {
    self.filters.verdict = verdict;
    self.refresh();
  }

  pub fn set_sort(&mut self, sort: SortKey) {
    self.sort = sort;
    self.refresh();
  }

  // ── Search transitions ────────────────────────────────────────────────────

  /// Activate (or clear) the search term.
  ///
  /// A blank term ends the search and restores the filtered view. Either way
  /// every previously issued ticket becomes stale.
  pub fn begin_search(&mut self, term: &str) -> Option<SearchTicket> {
    self.search_seq += 1;
    if term.trim().is_empty() {
      self.search_term.clear();
      self.refresh();
      return None;
    }
    self.search_term = term.to_owned();
    Some(self.ticket())
  }

  /// Apply a search response. `results` should be empty when the remote call
  /// failed; the local fallback is then used.
  pub fn finish_search(
    &mut self,
    ticket: &SearchTicket,
    results: Vec<Claim>,
  ) -> SearchOutcome {
    if ticket.seq != self.search_seq || !self.is_searching() {
      debug!(seq = ticket.seq, latest = self.search_seq, "discarding stale search response");
      return SearchOutcome::Stale;
    }
    if results.is_empty() {
      self.view = search::local_search(&self.claims, &ticket.term);
      SearchOutcome::LocalFallback
    } else {
      self.view = results;
      SearchOutcome::Remote
    }
  }

  // ── Collection transitions ────────────────────────────────────────────────

  /// Prepend claims from the trending API to the collection.
  pub fn merge_trending(&mut self, trending: Vec<Claim>) -> Option<SearchTicket> {
    if trending.is_empty() {
      return None;
    }
    for claim in trending.into_iter().rev() {
      self.prepend(claim);
    }
    self.collection_changed()
  }

  /// Apply a claim delivered by the live update channel. A claim whose id is
  /// already present replaces the older record.
  pub fn receive_push(&mut self, claim: Claim, now: Instant) -> Option<SearchTicket> {
    self.prepend(claim);
    self.refresh_until = Some(now + REFRESH_INDICATOR);
    self.collection_changed()
  }

  /// Replace the record with `claim`'s id in place, e.g. with fresh
  /// counters. Returns false for an unknown id.
  pub fn update(&mut self, claim: Claim) -> bool {
    let Some(pos) = self.claims.iter().position(|c| c.id == claim.id) else {
      return false;
    };
    if let Some(shown) = self.view.iter_mut().find(|c| c.id == claim.id) {
      *shown = claim.clone();
    }
    self.claims[pos] = claim;
    self.refresh();
    true
  }

  // ── Submission transitions ────────────────────────────────────────────────

  pub fn set_draft(&mut self, draft: impl Into<String>) { self.draft = draft.into(); }

  pub fn draft_mut(&mut self) -> &mut String { &mut self.draft }

  /// Move the draft into a provisional `unverified` claim at the head of the
  /// collection and clear the draft.
  pub fn begin_submission(&mut self, now: DateTime<Utc>) -> Result<Submission> {
    if let Some(id) = &self.in_flight {
      return Err(Error::SubmissionInFlight(id.clone()));
    }
    if self.draft.trim().is_empty() {
      return Err(Error::EmptyDraft);
    }

    let mut n = now.timestamp_millis();
    while self.get(&ClaimId::Int(n)).is_some() {
      n += 1;
    }
    let local_id = ClaimId::Int(n);

    let text = std::mem::take(&mut self.draft);
    self.prepend(Claim::pending(local_id.clone(), text.clone(), now));
    self.in_flight = Some(local_id.clone());

    let research = self.collection_changed();
    Ok(Submission { local_id, text, research })
  }

  /// Reconcile the provisional record `local_id` with the server's answer.
  ///
  /// `Some(claim)` replaces the provisional record in place; `None` (remote
  /// failure or no result) leaves it untouched.
  pub fn complete_submission(
    &mut self,
    local_id: &ClaimId,
    result: Option<Claim>,
  ) -> Option<SearchTicket> {
    if self.in_flight.as_ref() == Some(local_id) {
      self.in_flight = None;
    }

    let Some(confirmed) = result else {
      warn!(%local_id, "claim submission not confirmed; keeping pending record");
      return None;
    };

    self
      .claims
      .retain(|c| &c.id == local_id || c.id != confirmed.id);
    match self.claims.iter().position(|c| &c.id == local_id) {
      Some(pos) => self.claims[pos] = confirmed,
      None => self.claims.insert(0, confirmed),
    }
    self.collection_changed()
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  /// Insert at the head, dropping any older record with the same id.
  fn prepend(&mut self, claim: Claim) {
    self.claims.retain(|c| c.id != claim.id);
    self.claims.insert(0, claim);
  }

  fn ticket(&self) -> SearchTicket {
    SearchTicket { seq: self.search_seq, term: self.search_term.clone() }
  }

  /// Recompute the view after the collection changed. While a search is
  /// active the search is re-issued instead.
  fn collection_changed(&mut self) -> Option<SearchTicket> {
    if self.is_searching() {
      self.search_seq += 1;
      Some(self.ticket())
    } else {
      self.refresh();
      None
    }
  }

  fn refresh(&mut self) {
    if !self.is_searching() {
      self.view = pipeline::apply(&self.claims, &self.filters, self.sort);
    }
  }
}
