//! The `CivicStore` trait.
//!
//! Implemented by storage backends (e.g. `civic-store-sqlite`). The HTTP layer
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  claim::{Claim, ClaimId, NewClaim, VerdictUpdate},
  waitlist::{EmailTemplate, NewSignup, SentEmail, WaitlistSignup},
};

/// Most claims returned by one search.
pub const SEARCH_LIMIT: usize = 50;

/// Persistence for fact-checked claims and the waitlist.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CivicStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Claims ────────────────────────────────────────────────────────────

  /// Claims whose text or explanation contains `text` (case-insensitive,
  /// literal), newest first, at most `limit`.
  fn search_claims(
    &self,
    text: String,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Claim>, Self::Error>> + Send + '_;

  /// Every claim, newest first.
  fn list_claims(
    &self,
  ) -> impl Future<Output = Result<Vec<Claim>, Self::Error>> + Send + '_;

  /// The `limit` claims with the highest trend score.
  fn trending_claims(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Claim>, Self::Error>> + Send + '_;

  /// Fetch a claim, counting the fetch as a view. `None` if not found.
  fn get_claim(
    &self,
    id: ClaimId,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + '_;

  /// Count a share of the claim. `None` if not found.
  fn record_share(
    &self,
    id: ClaimId,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + '_;

  /// Persist a user-submitted claim awaiting review.
  fn submit_claim(
    &self,
    text: String,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + '_;

  /// Persist a claim that has already been fact-checked.
  fn publish_claim(
    &self,
    claim: NewClaim,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + '_;

  /// Replace the verdict (and optionally explanation and sources) of a
  /// claim. `None` if not found.
  fn set_verdict(
    &self,
    id: ClaimId,
    update: VerdictUpdate,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + '_;

  /// Distinct external-source URLs of the claims matching `text`.
  fn external_sources(
    &self,
    text: String,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Waitlist ──────────────────────────────────────────────────────────

  fn add_signup(
    &self,
    signup: NewSignup,
  ) -> impl Future<Output = Result<WaitlistSignup, Self::Error>> + Send + '_;

  fn list_signups(
    &self,
  ) -> impl Future<Output = Result<Vec<WaitlistSignup>, Self::Error>> + Send + '_;

  /// Look up an email template by name. `None` if not found.
  fn email_template(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<EmailTemplate>, Self::Error>> + Send + '_;

  /// Insert or replace a template.
  fn put_email_template(
    &self,
    template: EmailTemplate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append to the sent-email log.
  fn record_sent_email(
    &self,
    to_email: String,
    template_name: String,
    status: String,
  ) -> impl Future<Output = Result<SentEmail, Self::Error>> + Send + '_;

  fn list_sent_emails(
    &self,
  ) -> impl Future<Output = Result<Vec<SentEmail>, Self::Error>> + Send + '_;
}
