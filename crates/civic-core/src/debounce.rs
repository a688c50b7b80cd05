//! A clock-driven debouncer.
//!
//! The caller supplies `now` on every call, so the debouncer owns no timer
//! and can be driven from any event loop (or a test).

use std::time::{Duration, Instant};

/// Quiet interval before a search term is sent to the search API.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the most recent value until input has been quiet for `delay`.
#[derive(Debug)]
pub struct Debouncer<T> {
  delay:   Duration,
  pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
  pub fn new(delay: Duration) -> Self { Self { delay, pending: None } }

  /// Record a new value, cancelling any earlier pending one and restarting
  /// the quiet interval from `now`.
  pub fn push(&mut self, value: T, now: Instant) {
    self.pending = Some((value, now + self.delay));
  }

  /// Take the pending value if its quiet interval has elapsed.
  pub fn poll(&mut self, now: Instant) -> Option<T> {
    match &self.pending {
      Some((_, due)) if *due <= now => self.pending.take().map(|(v, _)| v),
      _ => None,
    }
  }

  pub fn is_pending(&self) -> bool { self.pending.is_some() }

  /// Drop the pending value without firing.
  pub fn cancel(&mut self) { self.pending = None; }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fires_only_after_quiet_interval() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(SEARCH_DEBOUNCE);
    d.push("v", t0);
    assert_eq!(d.poll(t0 + Duration::from_millis(299)), None);
    assert_eq!(d.poll(t0 + Duration::from_millis(300)), Some("v"));
    assert_eq!(d.poll(t0 + Duration::from_millis(900)), None);
  }

  #[test]
  fn later_push_cancels_earlier_value() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(SEARCH_DEBOUNCE);
    d.push("v", t0);
    d.push("vo", t0 + Duration::from_millis(200));
    d.push("vot", t0 + Duration::from_millis(400));
    // 300ms after the first keystroke: still typing.
    assert_eq!(d.poll(t0 + Duration::from_millis(350)), None);
    assert_eq!(d.poll(t0 + Duration::from_millis(700)), Some("vot"));
    assert!(!d.is_pending());
  }

  #[test]
  fn cancel_discards_pending_value() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(SEARCH_DEBOUNCE);
    d.push(1, t0);
    d.cancel();
    assert_eq!(d.poll(t0 + Duration::from_secs(1)), None);
  }
}
