//! TUI rendering — orchestrates all panes.

pub mod claim_detail;
pub mod claim_list;

use std::time::Instant;

use civic_core::claim::Verdict;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Mode};

/// Colour of a verdict badge.
pub fn verdict_color(verdict: Verdict) -> Color {
  match verdict {
    Verdict::True => Color::Green,
    Verdict::False => Color::Red,
    Verdict::Misleading => Color::Yellow,
    Verdict::Unverified => Color::Gray,
  }
}

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App, now: Instant) {
  let area = f.area();

  // Vertical stack: header, filter bar, body, input line, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // filters
      Constraint::Min(0),    // body
      Constraint::Length(1), // search / compose input
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app, now);
  draw_filters(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_input(f, rows[3], app);
  draw_status(f, rows[4], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App, now: Instant) {
  let left = Span::styled(
    " CivicLink fact-check hub",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );

  let right = if app.feed.refresh_indicator(now) {
    Span::styled(
      "● new fact-checks available ",
      Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )
  } else if app.live {
    Span::styled("live ", Style::default().fg(Color::Gray))
  } else {
    Span::styled("offline ", Style::default().fg(Color::Red))
  };

  // Simple left-right header: pad the middle.
  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Filter bar ───────────────────────────────────────────────────────────────

fn draw_filters(f: &mut Frame, area: Rect, app: &App) {
  let filters = app.feed.filters();
  let label = Style::default().fg(Color::DarkGray);
  let value = Style::default().fg(Color::Cyan);

  let line = Line::from(vec![
    Span::styled(" [c]ommunity ", label),
    Span::styled(filters.community.to_string(), value),
    Span::styled("  [l]anguage ", label),
    Span::styled(filters.language.to_string(), value),
    Span::styled("  [v]erdict ", label),
    Span::styled(filters.verdict.to_string(), value),
    Span::styled("  [s]ort ", label),
    Span::styled(app.feed.sort().to_string(), value),
  ]);
  f.render_widget(Paragraph::new(line), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  // Split into left list pane (40%) and right detail pane (60%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  claim_list::draw(f, cols[0], app);

  if app.selected().is_some() {
    claim_detail::draw(f, cols[1], app);
  } else {
    draw_rumors(f, cols[1], app);
  }
}

/// Shown in the detail pane when the list is empty.
fn draw_rumors(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Trending rumors ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines = vec![Line::from(Span::styled(
    "No claims match. Rumors circulating now:",
    Style::default().fg(Color::DarkGray),
  ))];
  for rumor in &app.rumors {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::raw(rumor.claim.clone())));
    let score = rumor
      .trend_score
      .map(|s| format!("  trend {s}"))
      .unwrap_or_default();
    lines.push(Line::from(Span::styled(
      format!("{} · {}{score}", rumor.community, rumor.language),
      Style::default().fg(Color::DarkGray),
    )));
  }
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

// ─── Input line ───────────────────────────────────────────────────────────────

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
  let (text, style) = match app.mode {
    Mode::Search => (format!(" /{}_", app.search_input), Style::default().fg(Color::Yellow)),
    Mode::Compose => (
      format!(" claim> {}_", app.feed.draft()),
      Style::default().fg(Color::Yellow),
    ),
    Mode::Browse if app.feed.is_searching() => (
      format!(" /{}", app.feed.search_term()),
      Style::default().fg(Color::DarkGray),
    ),
    Mode::Browse => (String::new(), Style::default()),
  };
  f.render_widget(Paragraph::new(text).style(style), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.mode {
    Mode::Search => ("SEARCH", "Type to search  Enter keep  Esc clear"),
    Mode::Compose => ("SUBMIT", "Type a claim  Enter submit  Esc cancel"),
    Mode::Browse => (
      "BROWSE",
      "↑↓/jk navigate  / search  c l v filter  s sort  e sources  S share  n submit  q quit",
    ),
  };

  let (status, status_style) = if let Some(notice) = &app.notice {
    (format!("! {notice}  [x] dismiss"), Style::default().fg(Color::Red))
  } else if app.status_msg.is_empty() {
    (hints.to_string(), Style::default().fg(Color::DarkGray))
  } else {
    (app.status_msg.clone(), Style::default().fg(Color::DarkGray))
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), status_style);

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
