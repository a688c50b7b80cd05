//! Async HTTP client wrapping the CivicLink JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use civic_core::{
  claim::{Claim, ClaimId},
  translate::{TranslationOutcome, TranslationRequest},
  waitlist::{WaitlistRequest, WaitlistResponse},
};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};

/// Async HTTP client for the CivicLink REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

/// Body of an error response.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Deserialize)]
struct ShareBody {
  text:  String,
  url:   String,
  claim: Claim,
}

/// A counted share: the message, its permalink, and links that open the
/// message in WhatsApp or an SMS app.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
  pub text:     String,
  pub url:      String,
  pub whatsapp: String,
  pub sms:      String,
  /// The claim with its updated share count.
  pub claim:    Claim,
}

impl Share {
  fn from_body(body: ShareBody) -> Result<Self> {
    Ok(Self {
      whatsapp: format!("https://wa.me/?{}", encode_query("text", &body.text)?),
      sms: format!("sms:?{}", encode_query("body", &body.text)?),
      text: body.text,
      url: body.url,
      claim: body.claim,
    })
  }
}

/// `key=value` with `value` form-urlencoded.
fn encode_query(key: &str, value: &str) -> Result<String> {
  let mut url = Url::parse("http://localhost/").context("building share link")?;
  url.query_pairs_mut().append_pair(key, value);
  Ok(url.query().unwrap_or_default().to_owned())
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Decode a success body, or turn the `{"error": ...}` body into an error.
  async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
      return resp.json().await.with_context(|| format!("deserialising {what}"));
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) => body.error,
      Err(_) => status.to_string(),
    };
    Err(anyhow!("{what} → {status}: {message}"))
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  /// `GET /api/facts/search?q=<term>`
  pub async fn search(&self, term: &str) -> Result<Vec<Claim>> {
    let resp = self
      .client
      .get(self.url("/facts/search"))
      .query(&[("q", term)])
      .send()
      .await
      .context("GET /facts/search failed")?;
    Self::decode(resp, "search results").await
  }

  /// `GET /api/facts/trending`
  pub async fn trending(&self) -> Result<Vec<Claim>> {
    let resp = self
      .client
      .get(self.url("/facts/trending"))
      .send()
      .await
      .context("GET /facts/trending failed")?;
    Self::decode(resp, "trending claims").await
  }

  /// `POST /api/facts/submit`
  pub async fn submit(&self, text: &str) -> Result<Claim> {
    let resp = self
      .client
      .post(self.url("/facts/submit"))
      .json(&serde_json::json!({ "claim": text }))
      .send()
      .await
      .context("POST /facts/submit failed")?;
    Self::decode(resp, "submitted claim").await
  }

  /// `GET /api/facts/external?q=<claim text>`
  pub async fn external_sources(&self, claim_text: &str) -> Result<Vec<String>> {
    let resp = self
      .client
      .get(self.url("/facts/external"))
      .query(&[("q", claim_text)])
      .send()
      .await
      .context("GET /facts/external failed")?;
    Self::decode(resp, "external sources").await
  }

  /// `POST /api/facts/{id}/share`
  pub async fn share(&self, id: &ClaimId) -> Result<Share> {
    let resp = self
      .client
      .post(self.url(&format!("/facts/{id}/share")))
      .send()
      .await
      .with_context(|| format!("POST /facts/{id}/share failed"))?;
    Share::from_body(Self::decode(resp, "share").await?)
  }

  /// Open `GET /api/facts/stream`; the caller reads the body incrementally.
  pub async fn open_stream(&self) -> Result<Response> {
    // The stream is long-lived; a separate client without the request
    // timeout carries it.
    let resp = Client::new()
      .get(self.url("/facts/stream"))
      .header(reqwest::header::ACCEPT, "text/event-stream")
      .send()
      .await
      .context("GET /facts/stream failed")?;
    if !resp.status().is_success() {
      return Err(anyhow!("GET /facts/stream → {}", resp.status()));
    }
    Ok(resp)
  }

  // ── Translation ───────────────────────────────────────────────────────────

  /// `POST /api/translate-text`
  pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationOutcome> {
    let resp = self
      .client
      .post(self.url("/translate-text"))
      .json(request)
      .send()
      .await
      .context("POST /translate-text failed")?;
    Self::decode(resp, "translation").await
  }

  // ── Waitlist ──────────────────────────────────────────────────────────────

  /// `POST /api/waitlist`
  pub async fn join_waitlist(&self, request: &WaitlistRequest) -> Result<WaitlistResponse> {
    let resp = self
      .client
      .post(self.url("/waitlist"))
      .json(request)
      .send()
      .await
      .context("POST /waitlist failed")?;
    Self::decode(resp, "waitlist response").await
  }
}
