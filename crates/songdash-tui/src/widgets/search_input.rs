//! SearchInput — tui-input wrapper for the title search bar.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{style_search, C_MUTED, C_SEARCH_BG, C_SECONDARY};

#[derive(Debug, PartialEq)]
pub enum SearchAction {
    Changed(String),
    Submitted(String),
    Cancelled,
}

pub struct SearchInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl SearchInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enter submits the current text and leaves input mode; the text stays
    /// so the bar keeps showing what was searched. Esc leaves input mode
    /// without searching.
    pub fn handle_key(&mut self, key: KeyEvent) -> SearchAction {
        match key.code {
            KeyCode::Esc => {
                self.deactivate();
                SearchAction::Cancelled
            }
            KeyCode::Enter => {
                self.deactivate();
                SearchAction::Submitted(self.input.value().to_string())
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                SearchAction::Changed(self.input.value().to_string())
            }
        }
    }

    /// One-row bar: "/ text", or the placeholder when empty.
    pub fn draw(&self, frame: &mut Frame, area: Rect, active_query: Option<&str>) {
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();

        let mut spans = vec![if value.is_empty() {
            Span::styled(format!("/ {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), style_search())
        }];

        if !self.active {
            if let Some(query) = active_query {
                spans.push(Span::styled(
                    format!("   showing results for {:?} · Esc to clear", query),
                    Style::default().fg(C_SECONDARY),
                ));
            }
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(C_SEARCH_BG)),
            area,
        );

        if self.active {
            let cursor_x = area.x + 2 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(1)), area.y));
        }
    }
}
