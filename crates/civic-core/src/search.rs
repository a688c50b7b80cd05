//! Search matching over claim text and explanation.
//!
//! Terms are always matched literally: characters that carry meaning in
//! pattern syntax (`?`, `*`, `(`, …) are escaped before matching.

use regex::RegexBuilder;

use crate::claim::Claim;

/// A run of text, marked when it matched the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
  pub text:    &'a str,
  pub matched: bool,
}

impl<'a> Segment<'a> {
  fn plain(text: &'a str) -> Self { Self { text, matched: false } }
}

/// Case-insensitive literal substring test. An empty term matches everything.
pub fn matches(text: &str, term: &str) -> bool {
  text.to_lowercase().contains(&term.to_lowercase())
}

/// Whether `claim`'s text or explanation contains `term`.
pub fn claim_matches(claim: &Claim, term: &str) -> bool {
  matches(&claim.claim, term) || matches(&claim.explanation, term)
}

/// Local fallback search: the claims whose text or explanation contains
/// `term`, in collection order.
pub fn local_search(claims: &[Claim], term: &str) -> Vec<Claim> {
  claims
    .iter()
    .filter(|c| claim_matches(c, term))
    .cloned()
    .collect()
}

/// Split `text` into segments, marking every case-insensitive occurrence of
/// `term`. A blank term yields the whole text as a single unmarked segment.
pub fn highlight<'a>(text: &'a str, term: &str) -> Vec<Segment<'a>> {
  if term.trim().is_empty() || text.is_empty() {
    return vec![Segment::plain(text)];
  }

  let re = match RegexBuilder::new(&regex::escape(term))
    .case_insensitive(true)
    .build()
  {
    Ok(re) => re,
    Err(e) => {
      tracing::warn!(error = %e, "cannot build highlight pattern");
      return vec![Segment::plain(text)];
    }
  };

  let mut segments = Vec::new();
  let mut last = 0;
  for m in re.find_iter(text) {
    if m.start() > last {
      segments.push(Segment::plain(&text[last..m.start()]));
    }
    segments.push(Segment { text: m.as_str(), matched: true });
    last = m.end();
  }
  if last < text.len() {
    segments.push(Segment::plain(&text[last..]));
  }
  segments
}
