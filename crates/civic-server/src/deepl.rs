//! [`Translator`] backed by the DeepL REST API.
//!
//! Each chunk is one form-encoded `POST` authorised with
//! `DeepL-Auth-Key <key>`; the first entry of `translations` is the result.

use std::time::Duration;

use civic_core::{provider::Translator, translate::CivicLanguage};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
  DeepLConfig,
  error::{Error, Result, check_status},
};

const PROVIDER: &str = "deepl";

/// DeepL language code for `lang`.
///
/// DeepL wants upper-case codes and requires a regional variant for English
/// and Portuguese targets.
pub fn deepl_code(lang: &CivicLanguage, as_target: bool) -> String {
  match (lang.code, as_target) {
    ("en", true) => "EN-US".to_owned(),
    ("pt", true) => "PT-PT".to_owned(),
    (code, _) => code.to_uppercase(),
  }
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
  #[serde(default)]
  translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
  text: String,
}

pub struct DeepLTranslator {
  client: Client,
  config: DeepLConfig,
}

impl DeepLTranslator {
  pub fn new(config: DeepLConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }
}

impl Translator for DeepLTranslator {
  type Error = Error;

  fn name(&self) -> &'static str { PROVIDER }

  async fn translate_chunk(
    &self,
    text: &str,
    target: &CivicLanguage,
    source: Option<&CivicLanguage>,
  ) -> Result<String> {
    let mut form = vec![
      ("text", text.to_owned()),
      ("target_lang", deepl_code(target, true)),
    ];
    if let Some(source) = source {
      form.push(("source_lang", deepl_code(source, false)));
    }

    debug!(chars = text.chars().count(), target = target.code, "deepl request");
    let resp = self
      .client
      .post(&self.config.endpoint)
      .header(
        reqwest::header::AUTHORIZATION,
        format!("DeepL-Auth-Key {}", self.config.api_key),
      )
      .form(&form)
      .send()
      .await?;
    let body: DeepLResponse = check_status(PROVIDER, resp).await?.json().await?;

    body
      .translations
      .into_iter()
      .next()
      .map(|t| t.text)
      .ok_or_else(|| Error::MalformedResponse {
        provider: PROVIDER,
        reason:   "no translations returned".into(),
      })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use axum::{Form, Json, Router, http::HeaderMap, routing::post};
  use civic_core::translate::{ENGLISH, resolve_language};
  use serde_json::{Value, json};

  use super::*;

  fn lang(name: &str) -> CivicLanguage { resolve_language(name).unwrap() }

  #[test]
  fn codes_are_upper_cased_with_regional_targets() {
    assert_eq!(deepl_code(&lang("spanish"), true), "ES");
    assert_eq!(deepl_code(&lang("pt"), true), "PT-PT");
    assert_eq!(deepl_code(&lang("pt"), false), "PT");
    assert_eq!(deepl_code(&ENGLISH, true), "EN-US");
    assert_eq!(deepl_code(&ENGLISH, false), "EN");
    assert_eq!(deepl_code(&lang("chinese (simplified)"), true), "ZH");
  }

  /// Serve `router` on an ephemeral port and return its base URL.
  async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
  }

  fn translator(endpoint: String) -> DeepLTranslator {
    DeepLTranslator::new(DeepLConfig {
      api_key: "secret".into(),
      endpoint,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn sends_form_with_auth_header() {
    async fn echo(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
      let auth = headers["authorization"].to_str().unwrap().to_owned();
      let text = format!(
        "{auth}|{}|{}|{}",
        form["text"],
        form["target_lang"],
        form.get("source_lang").map_or("-", String::as_str)
      );
      Json(json!({ "translations": [{ "detected_source_language": "EN", "text": text }] }))
    }
    let base = serve(Router::new().route("/v2/translate", post(echo))).await;
    let deepl = translator(format!("{base}/v2/translate"));

    let out = deepl
      .translate_chunk("Hello.", &lang("spanish"), None)
      .await
      .unwrap();
    assert_eq!(out, "DeepL-Auth-Key secret|Hello.|ES|-");

    let out = deepl
      .translate_chunk("Hola.", &lang("fr"), Some(&lang("es")))
      .await
      .unwrap();
    assert_eq!(out, "DeepL-Auth-Key secret|Hola.|FR|ES");
  }

  #[tokio::test]
  async fn error_status_and_empty_body_are_errors() {
    let router = Router::new()
      .route(
        "/forbidden",
        post(|| async { (axum::http::StatusCode::FORBIDDEN, "bad key") }),
      )
      .route("/empty", post(|| async { Json(json!({ "translations": [] })) }));
    let base = serve(router).await;

    let err = translator(format!("{base}/forbidden"))
      .translate_chunk("Hi.", &lang("es"), None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 403));

    let err = translator(format!("{base}/empty"))
      .translate_chunk("Hi.", &lang("es"), None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_an_http_error() {
    let err = translator("http://127.0.0.1:9/v2/translate".into())
      .translate_chunk("Hi.", &lang("es"), None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
  }
}
