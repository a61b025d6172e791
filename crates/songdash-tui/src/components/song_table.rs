//! SongTable component — the sortable table of the loaded page (or search
//! results), with a header cursor for keyboard sorting and a star cell per row.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use catalog_proto::song::{Song, SongField};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    sort::is_sortable,
    theme::{
        style_default, style_muted, style_secondary, style_selected, style_selected_focused,
        C_HEADER_CURSOR, C_LOADING, C_MODE_SEARCH, C_PRIMARY, C_SELECTION_BG,
    },
    view_state::Display,
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        star_rating::{star_at_offset, stars_line, STARS_WIDTH},
    },
};

/// Header arrow for a sortable column that isn't the active one.
const UNSORTED_MARK: &str = "↔";

pub struct SongTable {
    selected: usize,
    /// Song to re-select once a re-sort has landed in `AppState`.
    follow: Option<u64>,
    /// Index into `SongField::ALL`.
    header_cursor: usize,
    table_state: TableState,
    /// Column spans from the last draw, for mouse hit-testing.
    columns: Vec<(SongField, Rect)>,
    header_y: u16,
    body: Rect,
}

impl SongTable {
    pub fn new() -> Self {
        Self {
            selected: 0,
            follow: None,
            header_cursor: 0,
            table_state: TableState::default(),
            columns: Vec::new(),
            header_y: 0,
            body: Rect::default(),
        }
    }

    pub fn header_field(&self) -> SongField {
        SongField::ALL[self.header_cursor]
    }

    /// Id of the highlighted row, if any rows are showing.
    pub fn selected_song_id(&self, state: &AppState) -> Option<u64> {
        self.follow
            .or_else(|| state.rows().get(self.selected).map(|s| s.id))
    }

    /// Move the selection onto the followed song in the current row order.
    fn settle(&mut self, rows: &[Song]) {
        if let Some(id) = self.follow.take() {
            if let Some(idx) = rows.iter().position(|s| s.id == id) {
                self.selected = idx;
            }
        }
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    fn move_header(&mut self, delta: isize) {
        let n = SongField::ALL.len() as isize;
        self.header_cursor = (self.header_cursor as isize + delta).rem_euclid(n) as usize;
    }

    fn column_at(&self, x: u16) -> Option<(SongField, Rect)> {
        self.columns
            .iter()
            .copied()
            .find(|(_, r)| x >= r.x && x < r.x + r.width)
    }

    fn header_text(&self, field: SongField, state: &AppState) -> String {
        let sort = &state.view.sort;
        if !is_sortable(field) {
            return field.label().to_string();
        }
        let mark = match sort.column {
            Some(col) if col == field => sort.direction.arrow(),
            _ => UNSORTED_MARK,
        };
        format!("{} {}", field.label(), mark)
    }
}

fn column_constraint(field: SongField) -> Constraint {
    match field {
        SongField::Id => Constraint::Length(6),
        SongField::Title => Constraint::Min(12),
        SongField::DanceAbility => Constraint::Length(15),
        SongField::Energy => Constraint::Length(8),
        SongField::Acousticness => Constraint::Length(14),
        SongField::Tempo => Constraint::Length(8),
        SongField::DurationMs => Constraint::Length(15),
        SongField::NumSections => Constraint::Length(10),
        SongField::NumSegments => Constraint::Length(10),
        SongField::StarRating => Constraint::Length(STARS_WIDTH.max(11)),
    }
}

fn song_cells(song: &Song, state: &AppState) -> Vec<Cell<'static>> {
    SongField::ALL
        .iter()
        .map(|&field| match field {
            SongField::StarRating => {
                Cell::from(stars_line(song.stars(), state.pending_rating_for(song.id)))
            }
            _ => Cell::from(song.field(field).to_string()),
        })
        .collect()
}

impl Component for SongTable {
    fn id(&self) -> ComponentId {
        ComponentId::SongTable
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let rows = state.rows();
        self.settle(&rows);
        let len = rows.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1, len),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1, len),
            KeyCode::PageUp => self.move_selection(-10, len),
            KeyCode::PageDown => self.move_selection(10, len),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.move_selection(isize::MAX / 2, len),
            KeyCode::Left | KeyCode::Char('h') => self.move_header(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_header(1),
            KeyCode::Char('s') | KeyCode::Enter => {
                let field = self.header_field();
                if is_sortable(field) {
                    return vec![Action::SortBy(field)];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        let rows = state.rows();
        self.settle(&rows);
        match event.kind {
            MouseEventKind::ScrollUp => self.move_selection(-1, rows.len()),
            MouseEventKind::ScrollDown => self.move_selection(1, rows.len()),
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((field, rect)) = self.column_at(event.column) else {
                    return vec![];
                };
                if event.row == self.header_y {
                    if let Some(pos) = SongField::ALL.iter().position(|&f| f == field) {
                        self.header_cursor = pos;
                    }
                    if is_sortable(field) {
                        return vec![Action::SortBy(field)];
                    }
                    return vec![];
                }
                if event.row < self.body.y || event.row >= self.body.y + self.body.height {
                    return vec![];
                }
                let idx = self.table_state.offset() + (event.row - self.body.y) as usize;
                let Some(song) = rows.get(idx) else {
                    return vec![];
                };
                self.selected = idx;
                if field == SongField::StarRating {
                    if let Some(rating) = star_at_offset(event.column - rect.x) {
                        return vec![Action::Rate {
                            song_id: song.id,
                            rating,
                        }];
                    }
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        match action {
            Action::SubmitSearch(_)
            | Action::ClearSearch
            | Action::GotoPage(_)
            | Action::NextPage
            | Action::PrevPage => {
                self.selected = 0;
                self.follow = None;
            }
            // Runs before the new sort is applied, so this is the old order.
            Action::SortBy(_) => self.follow = self.selected_song_id(state),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = if state.loading_page.is_some() {
            Some(Badge {
                text: "LOADING",
                color: C_LOADING,
            })
        } else if state.view.is_searching() {
            Some(Badge {
                text: "SEARCH",
                color: C_MODE_SEARCH,
            })
        } else {
            None
        };
        let block = pane_chrome("songs", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 2 {
            return;
        }

        let constraints: Vec<Constraint> =
            SongField::ALL.iter().map(|&f| column_constraint(f)).collect();
        let header_line = Rect { height: 1, ..inner };
        let spans = Layout::horizontal(constraints).spacing(1).split(header_line);
        self.columns = SongField::ALL.iter().copied().zip(spans.iter().copied()).collect();
        self.header_y = inner.y;
        self.body = Rect {
            y: inner.y + 1,
            height: inner.height - 1,
            ..inner
        };

        let header_cells: Vec<Cell> = SongField::ALL
            .iter()
            .enumerate()
            .map(|(i, &field)| {
                let style = if focused && i == self.header_cursor {
                    Style::default()
                        .fg(C_HEADER_CURSOR)
                        .bg(C_SELECTION_BG)
                        .add_modifier(Modifier::BOLD)
                } else if state.view.sort.column == Some(field) && !state.view.is_searching() {
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                } else {
                    style_secondary()
                };
                Cell::from(self.header_text(field, state)).style(style)
            })
            .collect();

        let rows = state.rows();
        self.settle(&rows);
        if rows.is_empty() {
            self.selected = 0;
            let msg = match state.view.display() {
                Display::Searching { query, .. } => format!("  no songs match {:?}", query),
                Display::Browsing if state.loading_page.is_some() => "  loading…".to_string(),
                Display::Browsing => "  no songs loaded".to_string(),
            };
            let header = Table::new(vec![Row::new(header_cells)], self.widths());
            frame.render_widget(header.column_spacing(1), header_line);
            frame.render_widget(Paragraph::new(Span::styled(msg, style_muted())), self.body);
            return;
        }
        self.selected = self.selected.min(rows.len() - 1);

        let body_rows: Vec<Row> = rows
            .iter()
            .map(|song| Row::new(song_cells(song, state)).style(style_default()))
            .collect();

        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let table = Table::new(body_rows, self.widths())
            .header(Row::new(header_cells))
            .column_spacing(1)
            .row_highlight_style(highlight);

        self.table_state.select(Some(self.selected));
        frame.render_stateful_widget(table, inner, &mut self.table_state);

        if state.view.is_searching() {
            let hint = Line::from(Span::styled(
                format!(" {} result(s) ", rows.len()),
                style_muted(),
            ))
            .right_aligned();
            let bottom = Rect {
                y: area.y + area.height.saturating_sub(1),
                height: 1,
                ..area
            };
            frame.render_widget(Paragraph::new(hint), bottom);
        }
    }
}

impl SongTable {
    /// The column widths the header layout produced, so the table puts each
    /// column exactly where the hit-test expects it.
    fn widths(&self) -> Vec<Constraint> {
        self.columns
            .iter()
            .map(|(_, r)| Constraint::Length(r.width))
            .collect()
    }
}

impl Default for SongTable {
    fn default() -> Self {
        Self::new()
    }
}
