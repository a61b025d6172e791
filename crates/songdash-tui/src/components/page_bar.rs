//! PageBar component — `‹ previous  1 2 3 …  next ›` under the table.
//!
//! Numbers appear only when there is more than one page. Buttons that would
//! not change the page are drawn disabled and ignore input.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
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
    theme::{style_muted, C_HEADER_CURSOR, C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    view_state::PageWindow,
    widgets::pane_chrome::pane_chrome,
};

/// Page numbers shown at once; the run slides to keep the current page in it.
const MAX_NUMBERS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PageButton {
    Prev,
    Page(u32),
    Next,
}

impl PageButton {
    fn label(self) -> String {
        match self {
            Self::Prev => "‹ previous".to_string(),
            Self::Page(n) => n.to_string(),
            Self::Next => "next ›".to_string(),
        }
    }

    fn enabled(self, window: &PageWindow) -> bool {
        match self {
            Self::Prev => window.has_prev(),
            Self::Next => window.has_next(),
            Self::Page(n) => n != window.page,
        }
    }

    fn action(self) -> Action {
        match self {
            Self::Prev => Action::PrevPage,
            Self::Next => Action::NextPage,
            Self::Page(n) => Action::GotoPage(n),
        }
    }
}

fn buttons(window: &PageWindow) -> Vec<PageButton> {
    let mut out = vec![PageButton::Prev];
    let last = window.last_page();
    if last > 1 {
        let count = last.min(MAX_NUMBERS);
        let start = window
            .page
            .saturating_sub(count / 2)
            .clamp(1, last - count + 1);
        out.extend((start..start + count).map(PageButton::Page));
    }
    out.push(PageButton::Next);
    out
}

pub struct PageBar {
    cursor: usize,
    /// Button spans from the last draw, for mouse hit-testing.
    hits: Vec<(PageButton, Rect)>,
}

impl PageBar {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            hits: Vec::new(),
        }
    }

    fn button_at(&self, col: u16, row: u16) -> Option<PageButton> {
        self.hits
            .iter()
            .find(|(_, r)| col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height)
            .map(|(b, _)| *b)
    }
}

impl Default for PageBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PageBar {
    fn id(&self) -> ComponentId {
        ComponentId::PageBar
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let window = &state.view.window;
        let all = buttons(window);
        self.cursor = self.cursor.min(all.len() - 1);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.cursor = (self.cursor + 1).min(all.len() - 1),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => self.cursor = all.len() - 1,
            KeyCode::Enter | KeyCode::Char(' ') => {
                let button = all[self.cursor];
                if button.enabled(window) {
                    return vec![button.action()];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        match self.button_at(event.column, event.row) {
            Some(button) if button.enabled(&state.view.window) => vec![button.action()],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("pages", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.hits.clear();
        if inner.height == 0 {
            return;
        }

        let window = &state.view.window;
        let all = buttons(window);
        self.cursor = self.cursor.min(all.len() - 1);

        let mut spans = vec![Span::raw(" ")];
        let mut x = inner.x + 1;
        for (i, button) in all.iter().enumerate() {
            let text = format!(" {} ", button.label());
            let width = text.width() as u16;

            let mut style = if *button == PageButton::Page(window.page) {
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if button.enabled(window) {
                Style::default().fg(C_SECONDARY)
            } else {
                Style::default().fg(C_MUTED)
            };
            if focused && i == self.cursor {
                style = style.bg(C_SELECTION_BG).fg(C_HEADER_CURSOR);
            }

            self.hits.push((*button, Rect::new(x, inner.y, width, 1)));
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
            x = x.saturating_add(width + 1);
        }

        spans.push(Span::styled(
            format!("  {} per page", window.page_size),
            style_muted(),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::tests::song;
    use crate::view_state::ViewState;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    fn window(page: u32, total_pages: u32) -> PageWindow {
        PageWindow {
            page,
            page_size: 10,
            total_pages,
        }
    }

    fn state_with_pages(total_pages: u32) -> AppState {
        let mut view = ViewState::new(10, false);
        let req = view.reload();
        view.apply_page(req.seq, vec![song(1, "alpha", 100.0)], total_pages);
        AppState::new(view, "http://t".into(), PathBuf::from("."), PathBuf::from("x.log"))
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_single_page_has_no_numbers() {
        assert_eq!(buttons(&window(1, 1)), vec![PageButton::Prev, PageButton::Next]);
        assert_eq!(buttons(&window(1, 0)), vec![PageButton::Prev, PageButton::Next]);
    }

    #[test]
    fn test_number_run_slides_with_current_page() {
        let b = buttons(&window(15, 20));
        assert_eq!(b[1], PageButton::Page(11));
        assert_eq!(b[9], PageButton::Page(19));
        let b = buttons(&window(20, 20));
        assert_eq!(b[9], PageButton::Page(20));
        let b = buttons(&window(1, 3));
        assert_eq!(&b[1..4], &[PageButton::Page(1), PageButton::Page(2), PageButton::Page(3)]);
    }

    #[test]
    fn test_edges_are_disabled() {
        let w = window(1, 3);
        assert!(!PageButton::Prev.enabled(&w));
        assert!(PageButton::Next.enabled(&w));
        assert!(!PageButton::Page(1).enabled(&w));
        let w = window(3, 3);
        assert!(!PageButton::Next.enabled(&w));
    }

    #[test]
    fn test_click_number_and_next() {
        let state = state_with_pages(3);
        let mut bar = PageBar::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 3)).unwrap();
        terminal
            .draw(|f| bar.draw(f, f.area(), false, &state))
            .unwrap();

        let (_, two) = bar.hits[2];
        assert_eq!(
            bar.handle_mouse(click(two.x + 1, two.y), Rect::default(), &state),
            vec![Action::GotoPage(2)]
        );
        let (_, next) = *bar.hits.last().unwrap();
        assert_eq!(
            bar.handle_mouse(click(next.x, next.y), Rect::default(), &state),
            vec![Action::NextPage]
        );
        // previous is disabled on page 1
        let (_, prev) = bar.hits[0];
        assert!(bar
            .handle_mouse(click(prev.x, prev.y), Rect::default(), &state)
            .is_empty());
    }

    #[test]
    fn test_keyboard_enter_on_cursor() {
        let state = state_with_pages(3);
        let mut bar = PageBar::new();
        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        bar.handle_key(right, &state);
        bar.handle_key(right, &state);
        assert_eq!(bar.handle_key(enter, &state), vec![Action::GotoPage(2)]);
    }
}
