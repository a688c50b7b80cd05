//! Claim list pane — left panel.

use civic_core::{search::highlight, trend::trend_score};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use super::verdict_color;
use crate::app::App;

/// Render the claim list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let view = app.feed.view();
  let term = app.feed.search_term();

  let title = if app.feed.is_searching() {
    format!(" Results for \"{term}\" ({}) ", view.len())
  } else {
    format!(" Fact-checks ({}) ", view.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = view
    .iter()
    .map(|claim| {
      let badge = Span::styled(
        format!("{:<10}", claim.verdict.as_ref().to_uppercase()),
        Style::default()
          .fg(verdict_color(claim.verdict))
          .add_modifier(Modifier::BOLD),
      );
      let score = Span::styled(
        format!("{:>3} ", trend_score(claim)),
        Style::default().fg(Color::DarkGray),
      );

      let mut spans = vec![badge, score];
      for seg in highlight(&claim.claim, term) {
        let style = if seg.matched {
          Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
          Style::default()
        };
        spans.push(Span::styled(seg.text.to_owned(), style));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(if view.is_empty() { None } else { Some(app.cursor) });

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    area,
    &mut state,
  );
}
