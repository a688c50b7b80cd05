//! Chunked translation with a heuristic quality score.
//!
//! Long texts are split at sentence boundaries into chunks no longer than
//! [`MAX_CHUNK_CHARS`]; each chunk goes to the [`Translator`] separately and a
//! chunk that fails keeps its original text. Lengths are counted in
//! characters, not bytes.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result, provider::Translator};

/// Upper bound on the characters sent to the provider in one call.
pub const MAX_CHUNK_CHARS: usize = 5000;

// ─── Languages ───────────────────────────────────────────────────────────────

/// A language offered by the civic translation assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CivicLanguage {
  /// Lower-case English name, e.g. `"chinese (simplified)"`.
  pub name:   &'static str,
  /// Name in the language itself.
  pub native: &'static str,
  /// ISO 639-1 code.
  pub code:   &'static str,
}

const fn lang(name: &'static str, native: &'static str, code: &'static str) -> CivicLanguage {
  CivicLanguage { name, native, code }
}

pub const ENGLISH: CivicLanguage = lang("english", "English", "en");

pub static CIVIC_LANGUAGES: &[CivicLanguage] = &[
  ENGLISH,
  lang("spanish", "Español", "es"),
  lang("chinese (simplified)", "中文", "zh"),
  lang("arabic", "العربية", "ar"),
  lang("hindi", "हिन्दी", "hi"),
  lang("korean", "한국어", "ko"),
  lang("vietnamese", "Tiếng Việt", "vi"),
  lang("filipino", "Tagalog", "tl"),
  lang("french", "Français", "fr"),
  lang("german", "Deutsch", "de"),
  lang("portuguese", "Português", "pt"),
  lang("japanese", "日本語", "ja"),
  lang("russian", "Русский", "ru"),
  lang("italian", "Italiano", "it"),
  lang("dutch", "Nederlands", "nl"),
  lang("swedish", "Svenska", "sv"),
  lang("norwegian", "Norsk", "no"),
  lang("danish", "Dansk", "da"),
  lang("finnish", "Suomi", "fi"),
  lang("polish", "Polski", "pl"),
  lang("czech", "Čeština", "cs"),
  lang("hungarian", "Magyar", "hu"),
  lang("romanian", "Română", "ro"),
  lang("bulgarian", "Български", "bg"),
  lang("greek", "Ελληνικά", "el"),
  lang("turkish", "Türkçe", "tr"),
  lang("hebrew", "עברית", "he"),
  lang("persian", "فارسی", "fa"),
  lang("urdu", "اردو", "ur"),
  lang("bengali", "বাংলা", "bn"),
  lang("tamil", "தமிழ்", "ta"),
  lang("telugu", "తెలుగు", "te"),
  lang("marathi", "मराठी", "mr"),
  lang("gujarati", "ગુજરાતી", "gu"),
  lang("punjabi", "ਪੰਜਾਬੀ", "pa"),
  lang("thai", "ไทย", "th"),
  lang("indonesian", "Bahasa Indonesia", "id"),
  lang("malay", "Bahasa Melayu", "ms"),
  lang("swahili", "Kiswahili", "sw"),
  lang("amharic", "አማርኛ", "am"),
  lang("hausa", "Hausa", "ha"),
  lang("yoruba", "Yorùbá", "yo"),
  lang("igbo", "Igbo", "ig"),
  lang("zulu", "isiZulu", "zu"),
  lang("xhosa", "isiXhosa", "xh"),
  lang("afrikaans", "Afrikaans", "af"),
];

/// Every language name the translation assistant lists.
pub static ALL_LANGUAGES: &[&str] = &[
  "afrikaans", "albanian", "amharic", "arabic", "armenian", "assamese", "aymara",
  "azerbaijani", "bambara", "basque", "belarusian", "bengali", "bhojpuri", "bosnian",
  "bulgarian", "catalan", "cebuano", "chichewa", "chinese (simplified)",
  "chinese (traditional)", "corsican", "croatian", "czech", "danish", "dhivehi", "dogri",
  "dutch", "english", "esperanto", "estonian", "ewe", "filipino", "finnish", "french",
  "frisian", "galician", "georgian", "german", "greek", "guarani", "gujarati",
  "haitian creole", "hausa", "hawaiian", "hebrew", "hindi", "hmong", "hungarian",
  "icelandic", "igbo", "ilocano", "indonesian", "irish", "italian", "japanese", "javanese",
  "kannada", "kazakh", "khmer", "kinyarwanda", "konkani", "korean", "krio",
  "kurdish (kurmanji)", "kurdish (sorani)", "kyrgyz", "lao", "latin", "latvian", "lingala",
  "lithuanian", "luganda", "luxembourgish", "macedonian", "maithili", "malagasy", "malay",
  "malayalam", "maltese", "maori", "marathi", "meiteilon (manipuri)", "mizo", "mongolian",
  "myanmar", "nepali", "norwegian", "odia (oriya)", "oromo", "pashto", "persian", "polish",
  "portuguese", "punjabi", "quechua", "romanian", "russian", "samoan", "sanskrit",
  "scots gaelic", "sepedi", "serbian", "sesotho", "shona", "sindhi", "sinhala", "slovak",
  "slovenian", "somali", "spanish", "sundanese", "swahili", "swedish", "tajik", "tamil",
  "tatar", "telugu", "thai", "tigrinya", "tsonga", "turkish", "turkmen", "twi", "ukrainian",
  "urdu", "uyghur", "uzbek", "vietnamese", "welsh", "xhosa", "yiddish", "yoruba", "zulu",
];

/// Look up a civic language by ISO code (`"es"`) or English name
/// (`"Spanish"`), ignoring case and surrounding whitespace.
pub fn resolve_language(name_or_code: &str) -> Option<CivicLanguage> {
  let wanted = name_or_code.trim().to_lowercase();
  CIVIC_LANGUAGES
    .iter()
    .find(|l| l.code == wanted || l.name == wanted)
    .copied()
}

// ─── Chunking ────────────────────────────────────────────────────────────────

static SENTENCE_END: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence regex is valid"));

/// Split after sentence-ending punctuation that is followed by whitespace.
/// The punctuation stays with its sentence; the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
  let mut out = Vec::new();
  let mut last = 0;
  for m in SENTENCE_END.find_iter(text) {
    // The punctuation mark is a single ASCII byte.
    out.push(&text[last..=m.start()]);
    last = m.end();
  }
  if last < text.len() {
    out.push(&text[last..]);
  }
  out.retain(|s| !s.is_empty());
  out
}

/// Cut `s` into pieces of at most `max` characters.
fn hard_split(s: &str, max: usize) -> Vec<&str> {
  let mut pieces = Vec::new();
  let mut start = 0;
  let mut count = 0;
  for (idx, _) in s.char_indices() {
    if count == max {
      pieces.push(&s[start..idx]);
      start = idx;
      count = 0;
    }
    count += 1;
  }
  if start < s.len() {
    pieces.push(&s[start..]);
  }
  pieces
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Text within the limit is returned whole. Otherwise sentences are packed
/// greedily, joined by single spaces; a sentence longer than the limit is
/// cut into limit-sized pieces.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
  let max_chars = max_chars.max(1);
  if text.chars().count() <= max_chars {
    return vec![text.to_owned()];
  }

  let mut chunks = Vec::new();
  let mut current = String::new();
  let mut current_len = 0;

  for sentence in split_sentences(text) {
    for piece in hard_split(sentence, max_chars) {
      let len = piece.chars().count();
      if current.is_empty() {
        current.push_str(piece);
        current_len = len;
      } else if current_len + 1 + len <= max_chars {
        current.push(' ');
        current.push_str(piece);
        current_len += 1 + len;
      } else {
        chunks.push(std::mem::take(&mut current));
        current.push_str(piece);
        current_len = len;
      }
    }
  }
  if !current.is_empty() {
    chunks.push(current);
  }
  chunks
}

// ─── Quality ─────────────────────────────────────────────────────────────────

const ARTIFACTS: [&str; 5] = ["[", "]", "...", "??", "!!"];

/// A rough 0.0–1.0 estimate of translation quality from the length ratio,
/// leftover artifacts and sentence-final punctuation.
pub fn quality_score(original: &str, translated: &str) -> f64 {
  let original_len = original.chars().count();
  let ratio = if original_len == 0 {
    0.0
  } else {
    translated.chars().count() as f64 / original_len as f64
  };

  let length_score = if !(0.1..=3.0).contains(&ratio) {
    0.3
  } else if (0.5..=2.0).contains(&ratio) {
    1.0
  } else {
    0.7
  };

  let penalty = ARTIFACTS.iter().filter(|a| translated.contains(*a)).count() as f64 * 0.1;

  let sentence_score = if translated.ends_with(['.', '!', '?']) { 1.0 } else { 0.8 };

  ((length_score + sentence_score - penalty) / 2.0).clamp(0.0, 1.0)
}

// ─── Requests ────────────────────────────────────────────────────────────────

fn default_target() -> String { "es".to_owned() }
fn default_source() -> String { "auto".to_owned() }
fn default_term_target() -> String { "spanish".to_owned() }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
  #[serde(default)]
  pub text:            String,
  #[serde(default = "default_target")]
  pub target_language: String,
  #[serde(default = "default_source")]
  pub source_language: String,
}

impl TranslationRequest {
  /// Check the text is non-blank and resolve the target and (unless `auto`)
  /// source languages.
  pub fn validate(&self) -> Result<(CivicLanguage, Option<CivicLanguage>)> {
    if self.text.trim().is_empty() {
      return Err(Error::EmptyText);
    }
    let target = resolve_language(&self.target_language)
      .ok_or_else(|| Error::UnsupportedLanguage(self.target_language.clone()))?;
    let source = match self.source_language.trim() {
      "" | "auto" => None,
      s => Some(resolve_language(s).ok_or_else(|| Error::UnsupportedLanguage(s.to_owned()))?),
    };
    Ok((target, source))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationOutcome {
  pub original_text:       String,
  pub translated_text:     String,
  pub source_language:     String,
  pub target_language:     String,
  pub chunks_processed:    usize,
  pub total_characters:    usize,
  pub quality_score:       f64,
  pub translation_service: String,
}

/// A single civic term (e.g. "absentee ballot") to translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRequest {
  #[serde(default)]
  pub term:            String,
  #[serde(default = "default_term_target")]
  pub target_language: String,
}

impl TermRequest {
  pub fn to_translation(&self) -> Result<TranslationRequest> {
    let term = self.term.trim();
    if term.is_empty() {
      return Err(Error::EmptyTerm);
    }
    Ok(TranslationRequest {
      text:            term.to_owned(),
      target_language: self.target_language.clone(),
      source_language: default_source(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermTranslation {
  pub original_term:   String,
  pub translated_term: String,
  pub target_language: String,
  pub quality_score:   f64,
}

// ─── Translation ─────────────────────────────────────────────────────────────

/// Translate `request.text` chunk by chunk.
///
/// Fails only when the input is empty, a language is unknown, or every chunk
/// failed at the provider.
pub async fn translate<T: Translator>(
  translator: &T,
  request: &TranslationRequest,
) -> Result<TranslationOutcome> {
  let (target, source) = request.validate()?;
  let text = request.text.trim();
  let total_characters = text.chars().count();
  let outcome = |translated_text: String, chunks_processed: usize, quality_score: f64| {
    TranslationOutcome {
      original_text: text.to_owned(),
      translated_text,
      source_language: request.source_language.clone(),
      target_language: request.target_language.clone(),
      chunks_processed,
      total_characters,
      quality_score,
      translation_service: translator.name().to_owned(),
    }
  };

  if target == ENGLISH {
    return Ok(outcome(text.to_owned(), 0, 1.0));
  }

  let chunks = chunk_text(text, MAX_CHUNK_CHARS);
  info!(
    characters = total_characters,
    chunks = chunks.len(),
    target = target.code,
    "translating text"
  );

  let mut translated = Vec::with_capacity(chunks.len());
  let mut failures = 0;
  let mut last_error = String::new();
  for (i, chunk) in chunks.iter().enumerate() {
    match translator.translate_chunk(chunk, &target, source.as_ref()).await {
      Ok(t) => translated.push(t),
      Err(e) => {
        warn!(chunk = i + 1, error = %e, "chunk translation failed; keeping original");
        failures += 1;
        last_error = e.to_string();
        translated.push(chunk.clone());
      }
    }
  }
  if failures == chunks.len() {
    return Err(Error::TranslationFailed(last_error));
  }

  let translated_text = translated.join(" ");
  let quality = quality_score(text, &translated_text);
  Ok(outcome(translated_text, chunks.len(), quality))
}

/// Translate one civic term, detecting the source language.
pub async fn translate_term<T: Translator>(
  translator: &T,
  request: &TermRequest,
) -> Result<TermTranslation> {
  let outcome = translate(translator, &request.to_translation()?).await?;
  Ok(TermTranslation {
    original_term:   outcome.original_text,
    translated_term: outcome.translated_text,
    target_language: outcome.target_language,
    quality_score:   outcome.quality_score,
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("provider unavailable")]
  struct Unavailable;

  /// Upper-cases text; fails on chunks containing `FAIL`.
  #[derive(Default)]
  struct Shouty {
    calls: Mutex<Vec<(String, &'static str)>>,
  }

  impl Translator for Shouty {
    type Error = Unavailable;

    fn name(&self) -> &'static str { "shouty" }

    async fn translate_chunk(
      &self,
      text: &str,
      target: &CivicLanguage,
      _source: Option<&CivicLanguage>,
    ) -> Result<String, Unavailable> {
      self.calls.lock().unwrap().push((text.to_owned(), target.code));
      if text.contains("FAIL") {
        Err(Unavailable)
      } else {
        Ok(text.to_uppercase())
      }
    }
  }

  fn request(text: &str, target: &str) -> TranslationRequest {
    TranslationRequest {
      text:            text.into(),
      target_language: target.into(),
      source_language: "auto".into(),
    }
  }

  #[test]
  fn short_text_is_one_chunk() {
    assert_eq!(chunk_text("Hello. World.", 5000), vec!["Hello. World."]);
  }

  #[test]
  fn chunks_respect_the_limit_and_keep_sentences_whole() {
    let sentence = "Polling places open at seven in the morning. ";
    let text = sentence.repeat(300);
    let chunks = chunk_text(text.trim_end(), MAX_CHUNK_CHARS);
    assert!(chunks.len() > 1);
    for c in &chunks {
      assert!(c.chars().count() <= MAX_CHUNK_CHARS);
      assert!(c.ends_with('.'));
    }
    let total: usize = chunks.iter().map(|c| c.matches("Polling").count()).sum();
    assert_eq!(total, 300);
  }

  #[test]
  fn oversized_sentence_is_cut_at_the_limit() {
    let text = "é".repeat(25);
    let chunks = chunk_text(&text, 10);
    let lens: Vec<_> = chunks.iter().map(|c| c.chars().count()).collect();
    assert_eq!(lens, vec![10, 10, 5]);
  }

  #[test]
  fn sentences_split_after_punctuation() {
    assert_eq!(
      split_sentences("Is it open? Yes!  Go now.\nThanks"),
      vec!["Is it open?", "Yes!", "Go now.", "Thanks"]
    );
    assert_eq!(split_sentences("v1.2 is out"), vec!["v1.2 is out"]);
  }

  #[test]
  fn quality_heuristics() {
    let eq = |a: f64, b: f64| (a - b).abs() < 1e-9;
    // Similar length, ends with a period, no artifacts.
    assert!(eq(quality_score("Vote today.", "Vota hoy ya."), 1.0));
    // No final punctuation.
    assert!(eq(quality_score("Vote today.", "Vota hoy ya"), 0.9));
    // Two artifacts: "[" and "]".
    assert!(eq(quality_score("Vote today.", "[Vota hoy].."), 0.9));
    // Far too short.
    assert!(eq(quality_score("A much longer original sentence.", "x."), 0.65));
    // Ratio between 2.0 and 3.0.
    assert!(eq(quality_score("abcd.", "abcdefghijk."), 0.85));
    // Every artifact present.
    assert!(eq(quality_score("a", "[]...??!!"), 0.4));
    assert!(eq(quality_score("", "anything."), 0.65));
  }

  #[test]
  fn languages_resolve_by_code_or_name() {
    assert_eq!(resolve_language("es").map(|l| l.name), Some("spanish"));
    assert_eq!(resolve_language(" Spanish ").map(|l| l.code), Some("es"));
    assert_eq!(resolve_language("Chinese (Simplified)").map(|l| l.code), Some("zh"));
    assert!(resolve_language("klingon").is_none());
    assert!(CIVIC_LANGUAGES.iter().all(|l| ALL_LANGUAGES.contains(&l.name)));
  }

  #[tokio::test]
  async fn translates_every_chunk() {
    let t = Shouty::default();
    let out = translate(&t, &request("  Vote early. Vote often.  ", "es")).await.unwrap();
    assert_eq!(out.original_text, "Vote early. Vote often.");
    assert_eq!(out.translated_text, "VOTE EARLY. VOTE OFTEN.");
    assert_eq!(out.chunks_processed, 1);
    assert_eq!(out.total_characters, 23);
    assert_eq!(out.translation_service, "shouty");
    assert_eq!(t.calls.lock().unwrap()[0].1, "es");
  }

  #[tokio::test]
  async fn failed_chunk_keeps_original_text() {
    let t = Shouty::default();
    let text = format!("{} FAIL here.", "ok ".repeat(3000).trim_end());
    let out = translate(&t, &request(&text, "fr")).await.unwrap();
    assert_eq!(out.chunks_processed, 2);
    assert!(out.translated_text.starts_with("OK OK"));
    assert!(out.translated_text.ends_with("FAIL here."));
  }

  #[tokio::test]
  async fn all_chunks_failing_is_an_error() {
    let t = Shouty::default();
    let err = translate(&t, &request("FAIL.", "de")).await.unwrap_err();
    assert!(matches!(err, Error::TranslationFailed(ref m) if m == "provider unavailable"));
  }

  #[tokio::test]
  async fn english_target_skips_the_provider() {
    let t = Shouty::default();
    let out = translate(&t, &request("Vote early", "en")).await.unwrap();
    assert_eq!(out.translated_text, "Vote early");
    assert_eq!(out.quality_score, 1.0);
    assert!(t.calls.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn rejects_empty_text_and_unknown_languages() {
    let t = Shouty::default();
    assert!(matches!(translate(&t, &request("  ", "es")).await, Err(Error::EmptyText)));
    assert!(matches!(
      translate(&t, &request("hi", "xx")).await,
      Err(Error::UnsupportedLanguage(l)) if l == "xx"
    ));
    let mut req = request("hi", "es");
    req.source_language = "zz".into();
    assert!(matches!(translate(&t, &req).await, Err(Error::UnsupportedLanguage(_))));
  }

  #[tokio::test]
  async fn civic_term_defaults_to_spanish() {
    let t = Shouty::default();
    let req: TermRequest = serde_json::from_str(r#"{"term":"absentee ballot"}"#).unwrap();
    let out = translate_term(&t, &req).await.unwrap();
    assert_eq!(out.translated_term, "ABSENTEE BALLOT");
    assert_eq!(out.target_language, "spanish");
    assert_eq!(t.calls.lock().unwrap()[0].1, "es");

    let empty = TermRequest { term: " ".into(), target_language: "es".into() };
    assert!(matches!(translate_term(&t, &empty).await, Err(Error::EmptyTerm)));
  }
}
