//! The filter/sort pipeline behind the claim list.
//!
//! Filters are independent conjunctive predicates compared by exact equality;
//! the retained claims are then ordered by the selected [`SortKey`]. Every
//! ordering is stable, so ties keep their relative input order.

use std::{cmp::Reverse, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Error,
  claim::{Claim, Verdict},
  trend::trend_score,
};

// ─── Selection ───────────────────────────────────────────────────────────────

/// A single filter: either everything, or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
  #[default]
  All,
  Only(T),
}

impl<T: PartialEq> Selection<T> {
  pub fn admits(&self, value: &T) -> bool {
    match self {
      Self::All => true,
      Self::Only(wanted) => wanted == value,
    }
  }

  pub fn is_all(&self) -> bool { matches!(self, Self::All) }
}

impl<T: FromStr> FromStr for Selection<T> {
  type Err = T::Err;

  /// `"all"` selects everything; anything else is parsed as a concrete value.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "all" {
      Ok(Self::All)
    } else {
      s.parse().map(Self::Only)
    }
  }
}

impl<T: std::fmt::Display> std::fmt::Display for Selection<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::All => f.write_str("all"),
      Self::Only(v) => v.fmt(f),
    }
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// The community, language and verdict filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
  pub community: Selection<String>,
  pub language:  Selection<String>,
  pub verdict:   Selection<Verdict>,
}

impl Filters {
  pub fn admits(&self, claim: &Claim) -> bool {
    self.community.admits(&claim.community)
      && self.language.admits(&claim.language)
      && self.verdict.admits(&claim.verdict)
  }
}

// ─── Sort key ────────────────────────────────────────────────────────────────

/// How the filtered list is ordered.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortKey {
  /// Trend score, highest first.
  Trending,
  /// Creation time, most recent first; undated claims last.
  #[default]
  Newest,
  /// Share count, highest first.
  MostShared,
}

impl SortKey {
  pub fn parse(s: &str) -> crate::Result<Self> {
    s.parse().map_err(|_| Error::UnknownSortKey(s.to_owned()))
  }

  /// The next key in display order, wrapping around.
  pub fn next(self) -> Self {
    match self {
      Self::Trending => Self::Newest,
      Self::Newest => Self::MostShared,
      Self::MostShared => Self::Trending,
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Filter a copy of `claims` and order it by `sort`.
pub fn apply(claims: &[Claim], filters: &Filters, sort: SortKey) -> Vec<Claim> {
  let mut retained: Vec<Claim> =
    claims.iter().filter(|c| filters.admits(c)).cloned().collect();
  sort_claims(&mut retained, sort);
  retained
}

/// Stable in-place ordering of `claims` by `sort`.
pub fn sort_claims(claims: &mut [Claim], sort: SortKey) {
  match sort {
    SortKey::Trending => claims.sort_by_key(|c| Reverse(trend_score(c))),
    // `None < Some(_)`, so reversing puts undated claims last.
    SortKey::Newest => claims.sort_by_key(|c| Reverse(c.created_at)),
    SortKey::MostShared => claims.sort_by_key(|c| Reverse(c.share_count)),
  }
}

// ─── Filter options ──────────────────────────────────────────────────────────

/// Distinct filter values present in a collection, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
  pub communities: Vec<String>,
  pub languages:   Vec<String>,
  pub verdicts:    Vec<Verdict>,
}

impl FilterOptions {
  pub fn from_claims(claims: &[Claim]) -> Self {
    let mut opts = Self::default();
    for c in claims {
      if !opts.communities.contains(&c.community) {
        opts.communities.push(c.community.clone());
      }
      if !opts.languages.contains(&c.language) {
        opts.languages.push(c.language.clone());
      }
      if !opts.verdicts.contains(&c.verdict) {
        opts.verdicts.push(c.verdict);
      }
    }
    opts
  }
}

/// The selection after `current` when cycling through `options`:
/// `All → first → … → last → All`.
pub fn cycle<T: Clone + PartialEq>(current: &Selection<T>, options: &[T]) -> Selection<T> {
  match current {
    Selection::All => options.first().cloned().map_or(Selection::All, Selection::Only),
    Selection::Only(v) => match options.iter().position(|o| o == v) {
      Some(i) if i + 1 < options.len() => Selection::Only(options[i + 1].clone()),
      _ => Selection::All,
    },
  }
}
