//! Claim types — the unit of the fact-check hub.
//!
//! A claim is a fact-checkable statement with a verdict, an explanation and
//! supporting sources. Claims travel over the wire as camelCase JSON.

use std::{
  fmt,
  hash::{Hash, Hasher},
  str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::Error;

/// Explanation attached to a claim that has been submitted but not yet
/// fact-checked.
pub const PENDING_EXPLANATION: &str =
  "This claim is being reviewed by our fact-checking team.";

/// Language assigned to user-submitted claims.
pub const DEFAULT_CLAIM_LANGUAGE: &str = "English";

/// Community assigned to user-submitted claims.
pub const DEFAULT_CLAIM_COMMUNITY: &str = "General";

// ─── Identity ────────────────────────────────────────────────────────────────

/// A claim identifier. The service assigns integers; clients may carry
/// string identifiers from other feeds.
///
/// Numeric text is the same id as the integer: `Text("17") == Int(17)`, and
/// deserialising `"17"` yields `Int(17)`.
#[derive(Debug, Clone, Eq, Serialize)]
#[serde(untagged)]
pub enum ClaimId {
  Int(i64),
  Text(String),
}

impl PartialEq for ClaimId {
  fn eq(&self, other: &Self) -> bool {
    match (self.as_int(), other.as_int()) {
      (Some(a), Some(b)) => a == b,
      (None, None) => self.to_string() == other.to_string(),
      _ => false,
    }
  }
}

impl Hash for ClaimId {
  fn hash<H: Hasher>(&self, state: &mut H) {
    match self.as_int() {
      Some(n) => n.hash(state),
      None => self.to_string().hash(state),
    }
  }
}

impl<'de> Deserialize<'de> for ClaimId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
      Int(i64),
      Text(String),
    }

    Ok(match Wire::deserialize(deserializer)? {
      Wire::Int(n) => Self::Int(n),
      Wire::Text(s) => Self::from(s.as_str()),
    })
  }
}

impl ClaimId {
  /// The integer form, if this id is numeric.
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Self::Int(n) => Some(*n),
      Self::Text(s) => s.parse().ok(),
    }
  }
}

impl fmt::Display for ClaimId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(n) => write!(f, "{n}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl From<i64> for ClaimId {
  fn from(n: i64) -> Self { Self::Int(n) }
}

/// Numeric strings become [`ClaimId::Int`].
impl From<&str> for ClaimId {
  fn from(s: &str) -> Self {
    match s.parse::<i64>() {
      Ok(n) => Self::Int(n),
      Err(_) => Self::Text(s.to_owned()),
    }
  }
}

impl FromStr for ClaimId {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::from(s)) }
}

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// The outcome of fact-checking a claim.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Verdict {
  True,
  False,
  Misleading,
  Unverified,
}

impl Verdict {
  /// Parse a verdict, mapping failures into the crate error type.
  pub fn parse(s: &str) -> crate::Result<Self> {
    s.parse().map_err(|_| Error::UnknownVerdict(s.to_owned()))
  }
}

// ─── Claim ───────────────────────────────────────────────────────────────────

/// A fact-checked (or pending) statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
  pub id:                  ClaimId,
  pub claim:               String,
  pub verdict:             Verdict,
  pub explanation:         String,
  #[serde(default)]
  pub sources:             Vec<String>,
  pub language:            String,
  pub community:           String,
  #[serde(default)]
  pub view_count:          u64,
  #[serde(default)]
  pub share_count:         u64,
  #[serde(default)]
  pub recent_mentions_24h: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:          Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub external_sources:    Option<Vec<String>>,
}

impl Claim {
  /// The provisional record shown while a user submission awaits review.
  pub fn pending(id: ClaimId, text: impl Into<String>, now: DateTime<Utc>) -> Self {
    Self {
      id,
      claim: text.into(),
      verdict: Verdict::Unverified,
      explanation: PENDING_EXPLANATION.to_owned(),
      sources: Vec::new(),
      language: DEFAULT_CLAIM_LANGUAGE.to_owned(),
      community: DEFAULT_CLAIM_COMMUNITY.to_owned(),
      view_count: 0,
      share_count: 0,
      recent_mentions_24h: 0,
      created_at: Some(now),
      external_sources: None,
    }
  }

  /// Text used when sharing a claim.
  pub fn share_text(&self) -> String {
    format!(
      "Fact Check: \"{}\" - {}\n\n{}",
      self.claim,
      self.verdict.as_ref().to_uppercase(),
      self.explanation
    )
  }

  /// Permanent link to the claim under `base_url`.
  pub fn permalink(&self, base_url: &str) -> String {
    format!("{}/fact-check/{}", base_url.trim_end_matches('/'), self.id)
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A fact-checked claim published by the fact-checking desk.
/// `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClaim {
  pub claim:               String,
  pub verdict:             Verdict,
  pub explanation:         String,
  #[serde(default)]
  pub sources:             Vec<String>,
  pub language:            String,
  pub community:           String,
  #[serde(default)]
  pub recent_mentions_24h: u64,
  #[serde(default)]
  pub external_sources:    Option<Vec<String>>,
}

/// A revised verdict for an existing claim. Absent fields are left as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictUpdate {
  pub verdict:     Verdict,
  #[serde(default)]
  pub explanation: Option<String>,
  #[serde(default)]
  pub sources:     Option<Vec<String>>,
}

// ─── Trending rumors ─────────────────────────────────────────────────────────

/// A rumor circulating in a community; read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingRumor {
  pub claim:       String,
  pub language:    String,
  pub community:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trend_score: Option<u8>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn claim_deserialises_with_missing_counters() {
    let json = r#"{
      "id": 7,
      "claim": "Polls close at noon",
      "verdict": "false",
      "explanation": "Polls close at 8pm.",
      "sources": [],
      "language": "English",
      "community": "General"
    }"#;
    let claim: Claim = serde_json::from_str(json).unwrap();
    assert_eq!(claim.id, ClaimId::Int(7));
    assert_eq!(claim.view_count, 0);
    assert_eq!(claim.share_count, 0);
    assert_eq!(claim.recent_mentions_24h, 0);
    assert!(claim.created_at.is_none());
  }

  #[test]
  fn claim_uses_camel_case_on_the_wire() {
    let mut claim = Claim::pending(ClaimId::Int(1), "x", Utc::now());
    claim.recent_mentions_24h = 3;
    let value = serde_json::to_value(&claim).unwrap();
    assert_eq!(value["recentMentions24h"], 3);
    assert_eq!(value["verdict"], "unverified");
    assert!(value.get("createdAt").is_some());
    assert!(value.get("externalSources").is_none());
  }

  #[test]
  fn string_ids_round_trip() {
    let id: ClaimId = serde_json::from_str("\"abc-1\"").unwrap();
    assert_eq!(id, ClaimId::Text("abc-1".into()));
    assert_eq!("42".parse::<ClaimId>().unwrap(), ClaimId::Int(42));
    assert_eq!(ClaimId::Text("17".into()).as_int(), Some(17));
  }

  #[test]
  fn numeric_text_ids_equal_integer_ids() {
    use std::collections::HashSet;

    let id: ClaimId = serde_json::from_str("\"17\"").unwrap();
    assert!(matches!(id, ClaimId::Int(17)));
    assert_eq!(ClaimId::Text("17".into()), ClaimId::Int(17));
    assert_ne!(ClaimId::Text("local-17".into()), ClaimId::Int(17));

    let set: HashSet<ClaimId> = [ClaimId::Int(17), ClaimId::Text("17".into())].into();
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn unknown_verdict_is_rejected() {
    assert!(serde_json::from_str::<Verdict>("\"maybe\"").is_err());
    assert!(matches!(Verdict::parse("maybe"), Err(Error::UnknownVerdict(_))));
    assert_eq!(Verdict::parse("misleading").unwrap(), Verdict::Misleading);
  }

  #[test]
  fn share_text_upper_cases_the_verdict() {
    let mut claim = Claim::pending(ClaimId::Int(5), "You can vote by text", Utc::now());
    claim.verdict = Verdict::False;
    claim.explanation = "You cannot.".into();
    assert_eq!(
      claim.share_text(),
      "Fact Check: \"You can vote by text\" - FALSE\n\nYou cannot."
    );
    assert_eq!(
      claim.permalink("https://civiclink.example/"),
      "https://civiclink.example/fact-check/5"
    );
  }
}
