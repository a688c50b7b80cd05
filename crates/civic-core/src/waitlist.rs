//! Waitlist sign-ups and the welcome email sent after one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Recorded as the `source` of every sign-up.
pub const SIGNUP_SOURCE: &str = "CivicLink Waitlist";

/// Stored when the sign-up did not name a preferred language.
pub const DEFAULT_LANGUAGE: &str = "Not specified";

/// Name of the template used for the welcome email.
pub const WELCOME_TEMPLATE: &str = "welcome_email";

pub const DEFAULT_WELCOME_SUBJECT: &str = "Welcome to CivicLink!";

pub const DEFAULT_WELCOME_HTML: &str =
  "<h1>Welcome to CivicLink!</h1><p>Thanks for joining our waitlist!</p>";

/// Status recorded in the sent-email log after a successful send.
pub const STATUS_SENT: &str = "sent";

// ─── Request ─────────────────────────────────────────────────────────────────

/// The body of a waitlist request, as sent by the sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistRequest {
  #[serde(default)]
  pub email:        String,
  #[serde(default)]
  pub phone:        String,
  #[serde(default)]
  pub zip_code:     String,
  #[serde(default)]
  pub language:     Option<String>,
  #[serde(default)]
  pub is_organizer: Option<bool>,
}

/// A validated sign-up, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignup {
  pub email:        String,
  pub phone:        String,
  pub zip_code:     String,
  pub language:     String,
  pub is_organizer: bool,
}

impl NewSignup {
  /// Validate the contact fields (each required after trimming) and apply
  /// defaults to the optional ones.
  pub fn new(
    email: &str,
    phone: &str,
    zip_code: &str,
    language: Option<&str>,
    is_organizer: Option<bool>,
  ) -> Result<Self> {
    let (email, phone, zip_code) = (email.trim(), phone.trim(), zip_code.trim());
    if email.is_empty() || phone.is_empty() || zip_code.is_empty() {
      return Err(Error::MissingSignupFields);
    }

    let language = language
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .unwrap_or(DEFAULT_LANGUAGE);

    Ok(Self {
      email:        email.to_owned(),
      phone:        phone.to_owned(),
      zip_code:     zip_code.to_owned(),
      language:     language.to_owned(),
      is_organizer: is_organizer.unwrap_or(false),
    })
  }
}

impl TryFrom<WaitlistRequest> for NewSignup {
  type Error = Error;

  fn try_from(req: WaitlistRequest) -> Result<Self> {
    Self::new(
      &req.email,
      &req.phone,
      &req.zip_code,
      req.language.as_deref(),
      req.is_organizer,
    )
  }
}

// ─── Stored records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistSignup {
  pub id:           Uuid,
  pub email:        String,
  pub phone:        String,
  pub zip_code:     String,
  pub language:     String,
  pub is_organizer: bool,
  pub source:       String,
  pub created_at:   DateTime<Utc>,
}

/// A stored email template. Either field may be unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
  pub name:    String,
  pub subject: Option<String>,
  pub html:    Option<String>,
}

impl EmailTemplate {
  /// Address the template to `to`, filling unset fields with the welcome
  /// defaults.
  pub fn welcome_for(&self, to: &str) -> WelcomeEmail {
    WelcomeEmail {
      to:      to.to_owned(),
      subject: self
        .subject
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_WELCOME_SUBJECT.to_owned()),
      html:    self
        .html
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_WELCOME_HTML.to_owned()),
    }
  }
}

/// One row of the sent-email log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentEmail {
  pub to_email:      String,
  pub template_name: String,
  pub status:        String,
  pub sent_at:       DateTime<Utc>,
}

/// A rendered message handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeEmail {
  pub to:      String,
  pub subject: String,
  pub html:    String,
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistResponse {
  pub success: bool,
  pub message: String,
  pub id:      Uuid,
}

impl WaitlistResponse {
  pub fn joined(id: Uuid) -> Self {
    Self {
      success: true,
      message: "Successfully joined waitlist!".to_owned(),
      id,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_fields_are_rejected() {
    for (email, phone, zip) in [
      ("", "555-0100", "94110"),
      ("a@example.com", "", "94110"),
      ("a@example.com", "555-0100", "  "),
    ] {
      assert!(matches!(
        NewSignup::new(email, phone, zip, None, None),
        Err(Error::MissingSignupFields)
      ));
    }
  }

  #[test]
  fn defaults_are_applied() {
    let s = NewSignup::new(" a@example.com ", "555-0100", "94110", Some(""), None).unwrap();
    assert_eq!(s.email, "a@example.com");
    assert_eq!(s.language, DEFAULT_LANGUAGE);
    assert!(!s.is_organizer);

    let s = NewSignup::new("a@example.com", "555", "94110", Some("Spanish"), Some(true)).unwrap();
    assert_eq!(s.language, "Spanish");
    assert!(s.is_organizer);
  }

  #[test]
  fn request_uses_camel_case() {
    let req: WaitlistRequest = serde_json::from_str(
      r#"{"email":"a@example.com","phone":"555","zipCode":"94110","isOrganizer":true}"#,
    )
    .unwrap();
    let s = NewSignup::try_from(req).unwrap();
    assert_eq!(s.zip_code, "94110");
    assert!(s.is_organizer);
  }

  #[test]
  fn template_falls_back_to_defaults() {
    let tpl = EmailTemplate { name: WELCOME_TEMPLATE.into(), subject: None, html: None };
    let mail = tpl.welcome_for("a@example.com");
    assert_eq!(mail.subject, DEFAULT_WELCOME_SUBJECT);
    assert_eq!(mail.html, DEFAULT_WELCOME_HTML);

    let tpl = EmailTemplate {
      name:    WELCOME_TEMPLATE.into(),
      subject: Some("Hi".into()),
      html:    None,
    };
    assert_eq!(tpl.welcome_for("a@example.com").subject, "Hi");
  }
}
