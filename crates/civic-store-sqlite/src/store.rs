//! [`SqliteStore`] — the SQLite implementation of [`CivicStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::info;
use uuid::Uuid;

use civic_core::{
  claim::{Claim, ClaimId, NewClaim, VerdictUpdate},
  pipeline::{SortKey, sort_claims},
  search::claim_matches,
  seed::seed_claims,
  store::CivicStore,
  waitlist::{
    DEFAULT_WELCOME_HTML, DEFAULT_WELCOME_SUBJECT, EmailTemplate, NewSignup, SIGNUP_SOURCE,
    SentEmail, WELCOME_TEMPLATE, WaitlistSignup,
  },
};

use crate::{
  Result,
  encode::{
    CLAIM_COLUMNS, RawClaim, RawSentEmail, RawSignup, encode_count, encode_dt,
    encode_list, encode_uuid, template_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CivicLink store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert the seed claims when the claims table is empty, and the default
  /// welcome template when none exists. Returns the number of claims seeded.
  pub async fn seed_demo_data(&self) -> Result<usize> {
    let mut raws = Vec::new();
    for claim in seed_claims() {
      raws.push(ClaimRow::from_claim(&claim)?);
    }

    let seeded = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR IGNORE INTO email_templates (name, subject, html) VALUES (?1, ?2, ?3)",
          rusqlite::params![WELCOME_TEMPLATE, DEFAULT_WELCOME_SUBJECT, DEFAULT_WELCOME_HTML],
        )?;

        let existing: i64 =
          tx.query_row("SELECT COUNT(*) FROM claims", [], |r| r.get(0))?;
        let mut seeded = 0;
        if existing == 0 {
          for (id, row) in raws {
            row.insert(&tx, id)?;
            seeded += 1;
          }
        }
        tx.commit()?;
        Ok(seeded)
      })
      .await?;

    if seeded > 0 {
      info!(count = seeded, "seeded demo claims");
    }
    Ok(seeded)
  }

  async fn insert_claim(&self, mut claim: Claim) -> Result<Claim> {
    let (_, row) = ClaimRow::from_claim(&claim)?;
    let id = self
      .conn
      .call(move |conn| Ok(row.insert(conn, None)?))
      .await?;
    claim.id = ClaimId::Int(id);
    Ok(claim)
  }

  async fn fetch_claim(&self, id: i64) -> Result<Option<Claim>> {
    let raw: Option<RawClaim> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE id = ?1"),
            rusqlite::params![id],
            RawClaim::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawClaim::into_claim).transpose()
  }

  /// Add one to a counter column and return the updated claim.
  async fn bump(&self, id: ClaimId, column: &'static str) -> Result<Option<Claim>> {
    let Some(id) = id.as_int() else {
      return Ok(None);
    };

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("UPDATE claims SET {column} = {column} + 1 WHERE id = ?1"),
          rusqlite::params![id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch_claim(id).await
  }

  async fn query_claims(&self, sql: String, params: Vec<Value>) -> Result<Vec<Claim>> {
    let raws: Vec<RawClaim> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawClaim::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClaim::into_claim).collect()
  }
}

/// A claim encoded for insertion.
struct ClaimRow {
  claim:               String,
  verdict:             String,
  explanation:         String,
  sources:             String,
  language:            String,
  community:           String,
  view_count:          i64,
  share_count:         i64,
  recent_mentions_24h: i64,
  external_sources:    Option<String>,
  created_at:          String,
}

impl ClaimRow {
  fn from_claim(claim: &Claim) -> Result<(Option<i64>, Self)> {
    Ok((claim.id.as_int(), Self {
      claim:               claim.claim.clone(),
      verdict:             claim.verdict.to_string(),
      explanation:         claim.explanation.clone(),
      sources:             encode_list(&claim.sources)?,
      language:            claim.language.clone(),
      community:           claim.community.clone(),
      view_count:          encode_count(claim.view_count),
      share_count:         encode_count(claim.share_count),
      recent_mentions_24h: encode_count(claim.recent_mentions_24h),
      external_sources:    claim.external_sources.as_deref().map(encode_list).transpose()?,
      created_at:          encode_dt(claim.created_at.unwrap_or_else(Utc::now)),
    }))
  }

  /// Insert the row, with an explicit id when given. Returns the row id.
  fn insert(self, conn: &rusqlite::Connection, id: Option<i64>) -> rusqlite::Result<i64> {
    conn.execute(
      "INSERT INTO claims (
         id, claim, verdict, explanation, sources, language, community,
         view_count, share_count, recent_mentions_24h, external_sources, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
      rusqlite::params![
        id,
        self.claim,
        self.verdict,
        self.explanation,
        self.sources,
        self.language,
        self.community,
        self.view_count,
        self.share_count,
        self.recent_mentions_24h,
        self.external_sources,
        self.created_at,
      ],
    )?;
    Ok(conn.last_insert_rowid())
  }
}

// ─── CivicStore impl ─────────────────────────────────────────────────────────

impl CivicStore for SqliteStore {
  type Error = crate::Error;

  // ── Claims ────────────────────────────────────────────────────────────────

  async fn search_claims(&self, text: String, limit: usize) -> Result<Vec<Claim>> {
    // Matched in Rust: SQLite's LIKE only folds ASCII case.
    let claims = self.list_claims().await?;
    Ok(
      claims
        .into_iter()
        .filter(|c| claim_matches(c, &text))
        .take(limit)
        .collect(),
    )
  }

  async fn list_claims(&self) -> Result<Vec<Claim>> {
    let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims ORDER BY created_at DESC, id DESC");
    self.query_claims(sql, Vec::new()).await
  }

  async fn trending_claims(&self, limit: usize) -> Result<Vec<Claim>> {
    let mut claims = self.list_claims().await?;
    sort_claims(&mut claims, SortKey::Trending);
    claims.truncate(limit);
    Ok(claims)
  }

  async fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>> {
    self.bump(id, "view_count").await
  }

  async fn record_share(&self, id: ClaimId) -> Result<Option<Claim>> {
    self.bump(id, "share_count").await
  }

  async fn submit_claim(&self, text: String) -> Result<Claim> {
    let pending = Claim::pending(ClaimId::Int(0), text.trim(), Utc::now());
    self.insert_claim(pending).await
  }

  async fn publish_claim(&self, input: NewClaim) -> Result<Claim> {
    let claim = Claim {
      id:                  ClaimId::Int(0),
      claim:               input.claim,
      verdict:             input.verdict,
      explanation:         input.explanation,
      sources:             input.sources,
      language:            input.language,
      community:           input.community,
      view_count:          0,
      share_count:         0,
      recent_mentions_24h: input.recent_mentions_24h,
      created_at:          Some(Utc::now()),
      external_sources:    input.external_sources,
    };
    self.insert_claim(claim).await
  }

  async fn set_verdict(&self, id: ClaimId, update: VerdictUpdate) -> Result<Option<Claim>> {
    let Some(id) = id.as_int() else {
      return Ok(None);
    };
    let verdict = update.verdict.to_string();
    let sources = update.sources.as_deref().map(encode_list).transpose()?;
    let explanation = update.explanation;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE claims SET
             verdict     = ?2,
             explanation = COALESCE(?3, explanation),
             sources     = COALESCE(?4, sources)
           WHERE id = ?1",
          rusqlite::params![id, verdict, explanation, sources],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch_claim(id).await
  }

  async fn external_sources(&self, text: String) -> Result<Vec<String>> {
    let claims = self.list_claims().await?;
    let mut urls: Vec<String> = Vec::new();
    for claim in claims.into_iter().filter(|c| claim_matches(c, &text)) {
      for url in claim.external_sources.unwrap_or_default() {
        if !urls.contains(&url) {
          urls.push(url);
        }
      }
    }
    Ok(urls)
  }

  // ── Waitlist ──────────────────────────────────────────────────────────────

  async fn add_signup(&self, input: NewSignup) -> Result<WaitlistSignup> {
    let signup = WaitlistSignup {
      id:           Uuid::new_v4(),
      email:        input.email,
      phone:        input.phone,
      zip_code:     input.zip_code,
      language:     input.language,
      is_organizer: input.is_organizer,
      source:       SIGNUP_SOURCE.to_owned(),
      created_at:   Utc::now(),
    };

    let id_str = encode_uuid(signup.id);
    let at_str = encode_dt(signup.created_at);
    let row = signup.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO waitlist_signups (
             id, email, phone, zip_code, language, is_organizer, source, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            row.email,
            row.phone,
            row.zip_code,
            row.language,
            row.is_organizer,
            row.source,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(signup)
  }

  async fn list_signups(&self) -> Result<Vec<WaitlistSignup>> {
    let raws: Vec<RawSignup> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, email, phone, zip_code, language, is_organizer, source, created_at
           FROM waitlist_signups ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], RawSignup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSignup::into_signup).collect()
  }

  async fn email_template(&self, name: String) -> Result<Option<EmailTemplate>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(
              "SELECT name, subject, html FROM email_templates WHERE name = ?1",
              rusqlite::params![name],
              template_from_row,
            )
            .optional()?)
        })
        .await?,
    )
  }

  async fn put_email_template(&self, template: EmailTemplate) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO email_templates (name, subject, html) VALUES (?1, ?2, ?3)",
          rusqlite::params![template.name, template.subject, template.html],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_sent_email(
    &self,
    to_email: String,
    template_name: String,
    status: String,
  ) -> Result<SentEmail> {
    let sent = SentEmail { to_email, template_name, status, sent_at: Utc::now() };
    let row = sent.clone();
    let at_str = encode_dt(sent.sent_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sent_emails (to_email, template_name, status, sent_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![row.to_email, row.template_name, row.status, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(sent)
  }

  async fn list_sent_emails(&self) -> Result<Vec<SentEmail>> {
    let raws: Vec<RawSentEmail> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT to_email, template_name, status, sent_at FROM sent_emails ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSentEmail {
              to_email:      row.get(0)?,
              template_name: row.get(1)?,
              status:        row.get(2)?,
              sent_at:       row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSentEmail::into_sent_email).collect()
  }
}
