//! Outbound providers: the translation service and the welcome-email sender.
//!
//! Concrete implementations live in `civic-server`; the API layer is generic
//! over these traits so tests can substitute stubs.

use std::future::Future;

use crate::{translate::CivicLanguage, waitlist::WelcomeEmail};

/// A machine-translation backend, called once per text chunk.
pub trait Translator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Provider name reported in translation results.
  fn name(&self) -> &'static str;

  /// Translate one chunk. `source` is `None` when the source language should
  /// be detected by the provider.
  fn translate_chunk(
    &self,
    text: &str,
    target: &CivicLanguage,
    source: Option<&CivicLanguage>,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Delivers the welcome email to a new sign-up.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send(
    &self,
    email: &WelcomeEmail,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
