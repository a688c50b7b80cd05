//! [`Notifier`] that delivers welcome emails through Resend.

use std::time::Duration;

use civic_core::{provider::Notifier, waitlist::WelcomeEmail};
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::{
  ResendConfig,
  error::{Error, Result, check_status},
};

const PROVIDER: &str = "resend";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
  from:    &'a str,
  to:      [&'a str; 1],
  subject: &'a str,
  html:    &'a str,
}

pub struct ResendNotifier {
  client: Client,
  config: ResendConfig,
}

impl ResendNotifier {
  pub fn new(config: ResendConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }
}

impl Notifier for ResendNotifier {
  type Error = Error;

  async fn send(&self, email: &WelcomeEmail) -> Result<()> {
    let body = SendRequest {
      from:    &self.config.from,
      to:      [&email.to],
      subject: &email.subject,
      html:    &email.html,
    };
    let resp = self
      .client
      .post(&self.config.endpoint)
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;
    check_status(PROVIDER, resp).await?;
    info!(to = %email.to, "welcome email sent");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
  use serde_json::{Value, json};

  use super::*;

  type Seen = Arc<Mutex<Vec<(String, Value)>>>;

  async fn capture(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
  ) -> Json<Value> {
    let auth = headers["authorization"].to_str().unwrap().to_owned();
    seen.lock().unwrap().push((auth, body));
    Json(json!({ "id": "email-1" }))
  }

  fn email() -> WelcomeEmail {
    WelcomeEmail {
      to:      "voter@example.com".into(),
      subject: "Welcome to CivicLink!".into(),
      html:    "<p>Hi</p>".into(),
    }
  }

  #[tokio::test]
  async fn posts_json_with_bearer_auth() {
    let seen = Seen::default();
    let router = Router::new()
      .route("/emails", post(capture))
      .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let notifier = ResendNotifier::new(ResendConfig {
      api_key:  "re_test".into(),
      from:     "CivicLink <hello@civiclink.example>".into(),
      endpoint: format!("http://{addr}/emails"),
    })
    .unwrap();
    notifier.send(&email()).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];
    assert_eq!(auth, "Bearer re_test");
    assert_eq!(
      *body,
      json!({
        "from": "CivicLink <hello@civiclink.example>",
        "to": ["voter@example.com"],
        "subject": "Welcome to CivicLink!",
        "html": "<p>Hi</p>",
      })
    );
  }

  #[tokio::test]
  async fn rejected_send_is_an_error() {
    let router = Router::new().route(
      "/emails",
      post(|| async { (axum::http::StatusCode::UNPROCESSABLE_ENTITY, "invalid `to`") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let notifier = ResendNotifier::new(ResendConfig {
      api_key:  "re_test".into(),
      from:     "x@example.com".into(),
      endpoint: format!("http://{addr}/emails"),
    })
    .unwrap();
    let err = notifier.send(&email()).await.unwrap_err();
    match err {
      Error::Status { provider, status, body } => {
        assert_eq!(provider, "resend");
        assert_eq!(status.as_u16(), 422);
        assert_eq!(body, "invalid `to`");
      }
      other => panic!("unexpected error: {other}"),
    }
  }
}
