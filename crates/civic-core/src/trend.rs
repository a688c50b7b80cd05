//! Trend scoring — a 0–100 popularity metric derived from engagement
//! counters.

use crate::claim::Claim;

const VIEW_WEIGHT: f64 = 0.4;
const SHARE_WEIGHT: f64 = 0.4;
const MENTION_WEIGHT: f64 = 0.2;

const VIEW_CAP: f64 = 1000.0;
const SHARE_CAP: f64 = 100.0;
const MENTION_CAP: f64 = 50.0;

/// Trend score of a claim, in `0..=100`.
pub fn trend_score(claim: &Claim) -> u8 {
  score(claim.view_count, claim.share_count, claim.recent_mentions_24h)
}

/// Trend score from raw counters, in `0..=100`.
///
/// Each counter is normalised against its cap (views 1000, shares 100,
/// 24h mentions 50), clamped to 1.0, and combined with weights 0.4/0.4/0.2.
pub fn score(views: u64, shares: u64, mentions_24h: u64) -> u8 {
  let normalise = |n: u64, cap: f64| (n as f64 / cap).min(1.0);

  let weighted = normalise(views, VIEW_CAP) * VIEW_WEIGHT
    + normalise(shares, SHARE_CAP) * SHARE_WEIGHT
    + normalise(mentions_24h, MENTION_CAP) * MENTION_WEIGHT;

  (weighted * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn saturated_counters_score_100() {
    assert_eq!(score(1000, 100, 50), 100);
    assert_eq!(score(u64::MAX, u64::MAX, u64::MAX), 100);
  }

  #[test]
  fn zero_counters_score_0() {
    assert_eq!(score(0, 0, 0), 0);
  }

  #[test]
  fn seed_claims_score_as_expected() {
    // 1250 views (capped), 45 shares, 12 mentions → 0.4 + 0.18 + 0.048
    assert_eq!(score(1250, 45, 12), 63);
    // 890 views, 23 shares, 8 mentions → 0.356 + 0.092 + 0.032
    assert_eq!(score(890, 23, 8), 48);
  }

  #[test]
  fn score_is_monotonic_in_each_counter() {
    let samples = [0u64, 1, 7, 49, 50, 99, 100, 500, 999, 1000, 5000];
    for &base in &samples {
      for w in samples.windows(2) {
        let (lo, hi) = (w[0], w[1]);
        assert!(score(lo, base, base) <= score(hi, base, base));
        assert!(score(base, lo, base) <= score(base, hi, base));
        assert!(score(base, base, lo) <= score(base, base, hi));
      }
    }
  }

  #[test]
  fn score_stays_in_range() {
    for v in (0..2000).step_by(37) {
      for s in (0..200).step_by(13) {
        for m in (0..100).step_by(11) {
          assert!(score(v, s, m) <= 100);
        }
      }
    }
  }
}
