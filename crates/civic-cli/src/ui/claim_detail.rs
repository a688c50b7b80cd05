//! Claim detail pane — right panel.

use civic_core::{claim::Claim, search::highlight, trend::trend_score};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::verdict_color;
use crate::{
  app::{App, Sources},
  client::Share,
};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the selected claim into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(claim) = app.selected() else {
    return;
  };

  let block = Block::default()
    .title(format!(" Claim {} ", claim.id))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let term = app.feed.search_term();
  let dim = Style::default().fg(Color::DarkGray);
  let heading = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);

  let mut lines = vec![
    highlighted(&claim.claim, term, Style::default().add_modifier(Modifier::BOLD)),
    Line::from(""),
    Line::from(vec![
      Span::styled(
        format!(" {} ", claim.verdict.as_ref().to_uppercase()),
        Style::default()
          .fg(Color::Black)
          .bg(verdict_color(claim.verdict))
          .add_modifier(Modifier::BOLD),
      ),
      Span::styled(format!("  trend {}", trend_score(claim)), dim),
    ]),
    Line::from(""),
    highlighted(&claim.explanation, term, Style::default()),
    Line::from(""),
  ];

  if !claim.sources.is_empty() {
    lines.push(Line::from(Span::styled("Sources", heading)));
    for source in &claim.sources {
      lines.push(Line::from(format!("  • {source}")));
    }
    lines.push(Line::from(""));
  }

  lines.push(Line::from(Span::styled(meta(claim), dim)));
  lines.push(Line::from(""));
  if let Some(share) = app.share.as_ref().filter(|s| s.claim.id == claim.id) {
    lines.extend(share_links(share, heading));
    lines.push(Line::from(""));
  }
  lines.extend(external_sources(app.sources.get(&claim.id), heading, dim));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// `text` with every occurrence of `term` marked.
fn highlighted(text: &str, term: &str, base: Style) -> Line<'static> {
  let spans: Vec<Span> = highlight(text, term)
    .into_iter()
    .map(|seg| {
      let style = if seg.matched {
        base.fg(Color::Black).bg(Color::Yellow)
      } else {
        base
      };
      Span::styled(seg.text.to_owned(), style)
    })
    .collect();
  Line::from(spans)
}

fn meta(claim: &Claim) -> String {
  let mut parts = vec![
    claim.community.clone(),
    claim.language.clone(),
    format!("{} views", claim.view_count),
    format!("{} shares", claim.share_count),
  ];
  if let Some(at) = claim.created_at {
    parts.push(at.format("%Y-%m-%d %H:%M").to_string());
  }
  parts.join(" · ")
}

fn share_links(share: &Share, heading: Style) -> Vec<Line<'static>> {
  let mut lines = vec![Line::from(Span::styled("Share", heading))];
  lines.extend(share.text.lines().map(|l| Line::from(format!("  {l}"))));
  lines.push(Line::from(format!("  {}", share.url)));
  lines.push(Line::from(format!("  WhatsApp: {}", share.whatsapp)));
  lines.push(Line::from(format!("  SMS: {}", share.sms)));
  lines
}

fn external_sources(panel: Option<&Sources>, heading: Style, dim: Style) -> Vec<Line<'static>> {
  match panel {
    None => vec![Line::from(Span::styled("[e] show external sources", dim))],
    Some(Sources::Loading) => vec![Line::from(Span::styled("Loading external sources…", dim))],
    Some(Sources::Failed(e)) => vec![Line::from(Span::styled(
      format!("External sources unavailable: {e}"),
      Style::default().fg(Color::Red),
    ))],
    Some(Sources::Loaded(urls)) if urls.is_empty() => {
      vec![Line::from(Span::styled("No external sources found.", dim))]
    }
    Some(Sources::Loaded(urls)) => {
      let mut lines = vec![Line::from(Span::styled("External sources", heading))];
      lines.extend(urls.iter().map(|u| Line::from(format!("  {u}"))));
      lines
    }
  }
}
