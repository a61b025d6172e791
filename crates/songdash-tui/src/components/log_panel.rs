//! LogPanel component — tail of the dashboard's own log file.
//!
//! Handles its own scroll state and follows new lines while scrolled to the bottom.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_LOADING, C_MUTED, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

pub struct LogPanel {
    pub visible: bool,
    scroll: usize,
    /// Line count at the last draw, to detect new entries for auto-scroll.
    last_log_count: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            visible: false,
            scroll: 0,
            last_log_count: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.scroll = usize::MAX;
        }
    }
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = usize::MAX,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            MouseEventKind::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if *action == Action::ToggleLogs {
            self.toggle();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);

        let title = format!("log · {}", state.log_path.display());
        let block = pane_chrome(&title, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let logs = &state.log_lines;
        let height = inner.height as usize;
        let max_scroll = logs.len().saturating_sub(height);

        if logs.len() > self.last_log_count {
            if self.scroll >= max_scroll.saturating_sub(1) {
                self.scroll = usize::MAX;
            }
            self.last_log_count = logs.len();
        }

        if logs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no log entries yet",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        self.scroll = self.scroll.min(max_scroll);

        let lines: Vec<Line> = logs
            .iter()
            .skip(self.scroll)
            .take(height)
            .map(|raw| {
                let entry = LogEntry::parse(raw);
                let mut spans = vec![Span::raw(" ")];
                if let Some(time) = entry.time {
                    spans.push(Span::styled(time, Style::default().fg(C_MUTED)));
                    spans.push(Span::raw(" "));
                }
                if let Some(level) = entry.level {
                    spans.push(Span::styled(
                        format!("{:<5}", level),
                        Style::default().fg(level_color(level)),
                    ));
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::styled(entry.message, Style::default().fg(C_SECONDARY)));
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn level_color(level: &str) -> Color {
    match level {
        "ERROR" => C_ACCENT,
        "WARN" => C_LOADING,
        _ => C_MUTED,
    }
}

// ── Log line parsing ──────────────────────────────────────────────────────────

const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// One `tracing_subscriber::fmt` line, split for display.
#[derive(Debug, PartialEq)]
struct LogEntry {
    time: Option<String>,
    level: Option<&'static str>,
    message: String,
}

impl LogEntry {
    fn parse(raw: &str) -> Self {
        let clean = strip_ansi(raw);
        let mut rest = clean.trim();

        let mut time = None;
        if let Some((tok, rem)) = split_first_token(rest) {
            if let Some(ts) = compact_timestamp(tok) {
                time = Some(ts);
                rest = rem.trim_start();
            }
        }

        let mut level = None;
        if let Some((tok, rem)) = split_first_token(rest) {
            if let Some(l) = LEVELS.iter().find(|l| l.eq_ignore_ascii_case(tok)) {
                level = Some(*l);
                rest = rem.trim_start();
            }
        }

        // Drop a target prefix like "songdash::app: ".
        if let Some((target, msg)) = rest.split_once(": ") {
            let is_target = !target.is_empty()
                && target.len() <= 48
                && target
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'));
            if is_target {
                rest = msg.trim_start();
            }
        }

        Self {
            time,
            level,
            message: rest.to_string(),
        }
    }
}

fn compact_timestamp(token: &str) -> Option<String> {
    let dt = chrono::DateTime::parse_from_rfc3339(token).ok()?;
    let local = dt.with_timezone(&chrono::Local);
    let fmt = if local.date_naive() == chrono::Local::now().date_naive() {
        "%H:%M:%S"
    } else {
        "%m-%d %H:%M"
    };
    Some(local.format(fmt).to_string())
}

fn split_first_token(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.splitn(2, char::is_whitespace);
    let first = parts.next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some((first, parts.next().unwrap_or("")))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;
    for ch in s.chars() {
        if in_escape {
            if ('@'..='~').contains(&ch) && ch != '[' {
                in_escape = false;
            }
            continue;
        }
        if ch == '\u{1b}' {
            in_escape = true;
            continue;
        }
        out.push(ch);
    }
    out
}
