//! Header component — 1-row top bar.
//!
//! Left: title and catalog URL. Right: page position, sort, in-flight work, mode.
//! Not focusable.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_LOADING, C_MUTED, C_OK, C_PRIMARY, C_SECONDARY, C_SEPARATOR},
    view_state::Display,
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

fn status_spans(state: &AppState) -> Vec<Span<'static>> {
    let sep = || Span::styled("  │  ", Style::default().fg(C_SEPARATOR));
    let window = &state.view.window;

    let mut spans = vec![match state.view.display() {
        Display::Searching { query, results } => Span::styled(
            format!("\"{}\" · {} found", query, results.len()),
            Style::default().fg(C_PRIMARY),
        ),
        Display::Browsing => Span::styled(
            format!("page {}/{}", window.page, window.last_page()),
            Style::default().fg(C_PRIMARY),
        ),
    }];
    spans.push(sep());
    spans.push(Span::styled(
        state.view.sort.label(),
        Style::default().fg(C_SECONDARY),
    ));

    let busy = state.loading_page.is_some()
        || state.searching.is_some()
        || !state.pending_ratings.is_empty();
    spans.push(sep());
    spans.push(if busy {
        Span::styled("● busy", Style::default().fg(C_LOADING))
    } else {
        Span::styled("● idle", Style::default().fg(C_OK))
    });

    spans.push(sep());
    spans.push(Span::styled(
        state.input_mode.label(),
        Style::default()
            .fg(state.input_mode.color())
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" "));
    spans
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let mut left = vec![
            Span::styled(
                " ♪ song dashboard",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", state.base_url), Style::default().fg(C_MUTED)),
        ];
        let right = status_spans(state);

        let used: usize = left
            .iter()
            .chain(right.iter())
            .map(|s| s.content.width())
            .sum();
        let pad = (area.width as usize).saturating_sub(used);
        left.push(Span::raw(" ".repeat(pad)));
        left.extend(right);

        frame.render_widget(Paragraph::new(Line::from(left)), area);
    }
}
