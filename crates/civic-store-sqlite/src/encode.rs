//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, string lists as compact JSON
//! arrays and UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use civic_core::{
  claim::{Claim, ClaimId, Verdict},
  waitlist::{EmailTemplate, SentEmail, WaitlistSignup},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

/// Counters are `INTEGER` columns; negative values never occur but are
/// read as zero.
pub fn decode_count(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

pub fn encode_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawClaim::from_row`].
pub const CLAIM_COLUMNS: &str = "id, claim, verdict, explanation, sources, language, \
   community, view_count, share_count, recent_mentions_24h, external_sources, created_at";

/// Raw values read directly from a `claims` row.
pub struct RawClaim {
  pub id:                  i64,
  pub claim:               String,
  pub verdict:             String,
  pub explanation:         String,
  pub sources:             String,
  pub language:            String,
  pub community:           String,
  pub view_count:          i64,
  pub share_count:         i64,
  pub recent_mentions_24h: i64,
  pub external_sources:    Option<String>,
  pub created_at:          String,
}

impl RawClaim {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get(0)?,
      claim:               row.get(1)?,
      verdict:             row.get(2)?,
      explanation:         row.get(3)?,
      sources:             row.get(4)?,
      language:            row.get(5)?,
      community:           row.get(6)?,
      view_count:          row.get(7)?,
      share_count:         row.get(8)?,
      recent_mentions_24h: row.get(9)?,
      external_sources:    row.get(10)?,
      created_at:          row.get(11)?,
    })
  }

  pub fn into_claim(self) -> Result<Claim> {
    Ok(Claim {
      id:                  ClaimId::Int(self.id),
      claim:               self.claim,
      verdict:             Verdict::parse(&self.verdict)?,
      explanation:         self.explanation,
      sources:             decode_list(&self.sources)?,
      language:            self.language,
      community:           self.community,
      view_count:          decode_count(self.view_count),
      share_count:         decode_count(self.share_count),
      recent_mentions_24h: decode_count(self.recent_mentions_24h),
      created_at:          Some(decode_dt(&self.created_at)?),
      external_sources:    self
        .external_sources
        .as_deref()
        .map(decode_list)
        .transpose()?,
    })
  }
}

/// Raw values read directly from a `waitlist_signups` row.
pub struct RawSignup {
  pub id:           String,
  pub email:        String,
  pub phone:        String,
  pub zip_code:     String,
  pub language:     String,
  pub is_organizer: bool,
  pub source:       String,
  pub created_at:   String,
}

impl RawSignup {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      email:        row.get(1)?,
      phone:        row.get(2)?,
      zip_code:     row.get(3)?,
      language:     row.get(4)?,
      is_organizer: row.get(5)?,
      source:       row.get(6)?,
      created_at:   row.get(7)?,
    })
  }

  pub fn into_signup(self) -> Result<WaitlistSignup> {
    Ok(WaitlistSignup {
      id:           decode_uuid(&self.id)?,
      email:        self.email,
      phone:        self.phone,
      zip_code:     self.zip_code,
      language:     self.language,
      is_organizer: self.is_organizer,
      source:       self.source,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `sent_emails` row.
pub struct RawSentEmail {
  pub to_email:      String,
  pub template_name: String,
  pub status:        String,
  pub sent_at:       String,
}

impl RawSentEmail {
  pub fn into_sent_email(self) -> Result<SentEmail> {
    Ok(SentEmail {
      to_email:      self.to_email,
      template_name: self.template_name,
      status:        self.status,
      sent_at:       decode_dt(&self.sent_at)?,
    })
  }
}

pub fn template_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmailTemplate> {
  Ok(EmailTemplate {
    name:    row.get(0)?,
    subject: row.get(1)?,
    html:    row.get(2)?,
  })
}
