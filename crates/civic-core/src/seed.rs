//! The built-in seed collection shown before any remote data arrives.

use chrono::{DateTime, Utc};

use crate::claim::{Claim, ClaimId, TrendingRumor, Verdict};

fn at(rfc3339: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(rfc3339)
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| (*s).to_owned()).collect()
}

/// The three seed claims, all in the `General` community.
pub fn seed_claims() -> Vec<Claim> {
  vec![
    Claim {
      id:                  ClaimId::Int(1),
      claim:               "You can vote by text message".into(),
      verdict:             Verdict::False,
      explanation:         "Voting by text message is not allowed in any US state. You must vote in person or by mail-in ballot.".into(),
      sources:             strings(&[
        "Federal Election Commission",
        "National Association of Secretaries of State",
      ]),
      language:            "English".into(),
      community:           "General".into(),
      view_count:          1250,
      share_count:         45,
      recent_mentions_24h: 12,
      created_at:          at("2024-01-15T10:30:00Z"),
      external_sources:    None,
    },
    Claim {
      id:                  ClaimId::Int(2),
      claim:               "Early voting is available in all states".into(),
      verdict:             Verdict::Misleading,
      explanation:         "Early voting availability varies by state. Some states offer early voting, others only allow absentee voting.".into(),
      sources:             strings(&[
        "Ballotpedia",
        "National Conference of State Legislatures",
      ]),
      language:            "English".into(),
      community:           "General".into(),
      view_count:          890,
      share_count:         23,
      recent_mentions_24h: 8,
      created_at:          at("2024-01-14T15:45:00Z"),
      external_sources:    None,
    },
    Claim {
      id:                  ClaimId::Int(3),
      claim:               "You need a photo ID to vote".into(),
      verdict:             Verdict::Misleading,
      explanation:         "ID requirements vary by state. Some states require photo ID, others accept non-photo ID or have no ID requirement.".into(),
      sources:             strings(&[
        "Brennan Center for Justice",
        "National Conference of State Legislatures",
      ]),
      language:            "English".into(),
      community:           "General".into(),
      view_count:          2100,
      share_count:         67,
      recent_mentions_24h: 25,
      created_at:          at("2024-01-13T09:20:00Z"),
      external_sources:    None,
    },
  ]
}

/// Rumors currently circulating in specific communities.
pub fn seed_rumors() -> Vec<TrendingRumor> {
  vec![
    TrendingRumor {
      claim:       "Voting machines are connected to the internet".into(),
      language:    "Spanish".into(),
      community:   "Latino Community".into(),
      trend_score: Some(95),
    },
    TrendingRumor {
      claim:       "You can vote multiple times".into(),
      language:    "Chinese".into(),
      community:   "Asian American Community".into(),
      trend_score: Some(87),
    },
    TrendingRumor {
      claim:       "Mail-in ballots are not secure".into(),
      language:    "Arabic".into(),
      community:   "Middle Eastern Community".into(),
      trend_score: Some(92),
    },
  ]
}

/// Rumors ordered hottest first; rumors without a score sort last.
pub fn rumors_by_score(mut rumors: Vec<TrendingRumor>) -> Vec<TrendingRumor> {
  rumors.sort_by_key(|r| std::cmp::Reverse(r.trend_score));
  rumors
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_timestamps_parse() {
    assert!(seed_claims().iter().all(|c| c.created_at.is_some()));
  }

  #[test]
  fn rumors_sort_hottest_first() {
    let mut rumors = seed_rumors();
    rumors.push(TrendingRumor {
      claim:       "unscored".into(),
      language:    "English".into(),
      community:   "General".into(),
      trend_score: None,
    });
    let sorted = rumors_by_score(rumors);
    let scores: Vec<_> = sorted.iter().map(|r| r.trend_score).collect();
    assert_eq!(scores, vec![Some(95), Some(92), Some(87), None]);
  }
}
