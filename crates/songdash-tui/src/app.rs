//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage`s in from the terminal reader
//!   and from catalog tasks.
//! - The event loop draws when something changed, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Catalog calls run on spawned tasks and report back as messages, so every
//!   state change happens on the loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use catalog_proto::{CatalogApi, CatalogError, PageResponse, Song};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        chart_panel::ChartPanel, header::Header, help_overlay::HelpOverlay,
        log_panel::LogPanel, page_bar::PageBar, song_table::SongTable,
    },
    export::{export_page, ExportError},
    focus::FocusRing,
    rating::{RatingController, RatingOutcome},
    theme::C_BG,
    view_state::{Display, PageApplied, PageRequest},
    widgets::{
        search_input::{SearchAction, SearchInput},
        star_rating::star_from_key,
        status_bar::{draw_keys_bar, InputMode},
        toast::ToastManager,
    },
};

/// Lines of the log file kept for the log pane.
const LOG_TAIL_LINES: usize = 500;

/// Messages consumed by the event loop.
#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    PageLoaded {
        seq: u64,
        page: u32,
        result: Result<PageResponse, CatalogError>,
    },
    SearchDone {
        query: String,
        result: Result<Vec<Song>, CatalogError>,
    },
    RatingDone(RatingOutcome),
}

/// Screen rects from the last draw, for mouse hit-testing.
#[derive(Debug, Default, Clone, Copy)]
struct PaneAreas {
    search: Rect,
    charts: Rect,
    song_table: Rect,
    page_bar: Rect,
    log_panel: Rect,
}

pub struct App<C> {
    state: AppState,
    catalog: Arc<C>,
    ratings: RatingController<C>,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    song_table: SongTable,
    chart_panel: ChartPanel,
    page_bar: PageBar,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    search: SearchInput,
    toast: ToastManager,

    // ── Window management ─────────────────────────────────────────────────────
    focus: FocusRing,
    pane_areas: PaneAreas,
    show_keys_bar: bool,
    should_quit: bool,
}

impl<C: CatalogApi + 'static> App<C> {
    pub fn new(state: AppState, catalog: Arc<C>, show_keys_bar: bool) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(256);
        Self {
            state,
            ratings: RatingController::new(Arc::clone(&catalog)),
            catalog,
            tx,
            rx: Some(rx),
            header: Header::new(),
            song_table: SongTable::new(),
            chart_panel: ChartPanel::new(),
            page_bar: PageBar::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            search: SearchInput::new("search by title"),
            toast: ToastManager::new(),
            focus: FocusRing::new(base_focus_ring()),
            pane_areas: PaneAreas::default(),
            show_keys_bar,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let Some(mut rx) = self.rx.take() else {
            anyhow::bail!("event loop already started");
        };

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Initial page.
        let req = self.state.view.reload();
        self.request_page(req);

        // ── Periodic timers ───────────────────────────────────────────────────
        // Toast expiry check + spinner animation.
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // Log tail refresh: every 2s, only when the log panel is open.
        let mut log_refresh = tokio::time::interval(Duration::from_secs(2));
        log_refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    let mut redraw = self.handle_message(msg);
                    // Drain whatever else is queued before drawing again.
                    while let Ok(next) = rx.try_recv() {
                        redraw |= self.handle_message(next);
                    }
                    needs_redraw = redraw;
                }

                _ = toast_tick.tick() => {
                    needs_redraw = self.toast.tick();
                }

                _ = log_refresh.tick() => {
                    if self.log_panel.visible {
                        self.reload_log();
                        needs_redraw = true;
                    }
                }
            }
        }

        Ok(())
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    /// Apply one message. Returns whether a redraw is needed.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                let clicked = matches!(
                    mouse.kind,
                    MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
                );
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action);
                }
                clicked
            }
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,

            AppMessage::PageLoaded { seq, page, result } => self.on_page_loaded(seq, page, result),

            AppMessage::SearchDone { query, result } => {
                if self.state.searching.as_deref() != Some(query.as_str()) {
                    debug!("dropping stale search result for {:?}", query);
                    return false;
                }
                self.state.searching = None;
                if let Err(ref e) = result {
                    warn!("search {:?} failed: {}", query, e);
                }
                self.state.view.apply_search(query, result);
                true
            }

            AppMessage::RatingDone(outcome) => {
                let id = outcome.song_id();
                let fresh = self.ratings.finish(&outcome);
                match self.ratings.pending(id) {
                    Some(latest) => self.state.pending_ratings.insert(id, latest),
                    None => self.state.pending_ratings.remove(&id),
                };
                if !fresh {
                    debug!("ignoring superseded rating outcome for song {}", id);
                    return true;
                }
                match outcome {
                    RatingOutcome::Saved {
                        song_id, rating, ..
                    } => {
                        info!("song {} rated {}", song_id, rating);
                        self.state.view.apply_rating(song_id, rating);
                    }
                    RatingOutcome::Failed {
                        song_id,
                        rating,
                        error,
                        ..
                    } => {
                        warn!("rating song {} as {} failed: {}", song_id, rating, error);
                    }
                }
                true
            }
        }
    }

    fn on_page_loaded(
        &mut self,
        seq: u64,
        page: u32,
        result: Result<PageResponse, CatalogError>,
    ) -> bool {
        let current = self.state.view.is_current(seq);
        if current {
            self.state.loading_page = None;
            self.toast.dismiss_spinner();
        }
        match result {
            Ok(resp) => {
                let count = resp.songs.len();
                let applied = self
                    .state
                    .view
                    .apply_page(seq, resp.songs, resp.total_pages);
                if applied.installed() {
                    info!(
                        "loaded page {}/{} ({} songs)",
                        page,
                        self.state.view.window.last_page(),
                        count
                    );
                    let charts = &mut self.state.charts;
                    charts.render(self.state.view.songs());
                    debug!(
                        "charts at generation {} ({} disposed so far)",
                        charts.generation(),
                        charts.disposed()
                    );
                }
                if let PageApplied::Clamped(req) = applied {
                    self.request_page(req);
                }
            }
            Err(e) => {
                warn!("loading page {} failed: {}", page, e);
                if self.state.view.fail_page(seq) {
                    debug!("staying on page {}", self.state.view.window.page);
                }
            }
        }
        current
    }

    // ── Keyboard handling ─────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Search input owns the keyboard while active.
        if self.search.is_active() {
            return match key.code {
                KeyCode::Tab => vec![Action::CancelSearch, Action::FocusNext],
                KeyCode::BackTab => vec![Action::CancelSearch, Action::FocusPrev],
                _ => match self.search.handle_key(key) {
                    SearchAction::Changed(text) => vec![Action::SearchChanged(text)],
                    SearchAction::Submitted(text) => vec![Action::SubmitSearch(text)],
                    SearchAction::Cancelled => vec![Action::CancelSearch],
                },
            };
        }

        match key.code {
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => {
                return vec![Action::Quit];
            }
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Char('L') => return vec![Action::ToggleLogs],
            _ => {}
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        match key.code {
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            KeyCode::Char('/') => return vec![Action::OpenSearch],
            KeyCode::Esc if self.state.view.is_searching() => return vec![Action::ClearSearch],
            KeyCode::Char('n') => return vec![Action::NextPage],
            KeyCode::Char('p') => return vec![Action::PrevPage],
            KeyCode::Char('r') => return vec![Action::Reload],
            KeyCode::Char('e') => return vec![Action::Export],
            KeyCode::Char('K') => return vec![Action::ToggleKeys],
            KeyCode::Char(c) => {
                if let Some(rating) = star_from_key(c) {
                    return match self.song_table.selected_song_id(&self.state) {
                        Some(song_id) => vec![Action::Rate { song_id, rating }],
                        None => vec![],
                    };
                }
            }
            _ => {}
        }

        // Dispatch to the focused component
        let s = &self.state;
        match self.focus.current() {
            Some(ComponentId::SongTable) => self.song_table.handle_key(key, s),
            Some(ComponentId::PageBar) => self.page_bar.handle_key(key, s),
            Some(ComponentId::LogPanel) => self.log_panel.handle_key(key, s),
            _ => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click || self.help_overlay.visible {
            return vec![];
        }

        let (col, row) = (event.column, event.row);
        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas;
        let s = &self.state;

        macro_rules! click_pane {
            ($component:expr, $area:expr) => {{
                let id = $component.id();
                let mut actions = $component.handle_mouse(event, $area, s);
                if !self.focus.is_focused(id) && matches!(event.kind, MouseEventKind::Down(_)) {
                    actions.insert(0, Action::FocusPane(id));
                }
                return actions;
            }};
        }

        if hit(areas.search, col, row) && matches!(event.kind, MouseEventKind::Down(_)) {
            return vec![Action::OpenSearch];
        }
        if hit(areas.song_table, col, row) {
            click_pane!(self.song_table, areas.song_table);
        }
        if hit(areas.page_bar, col, row) {
            click_pane!(self.page_bar, areas.page_bar);
        }
        if hit(areas.log_panel, col, row) {
            click_pane!(self.log_panel, areas.log_panel);
        }
        if hit(areas.charts, col, row) {
            return self.chart_panel.handle_mouse(event, areas.charts, s);
        }
        vec![]
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        // Broadcast first so components can react (selection resets, toggles).
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.song_table.on_action(&action, s));
            out.extend(self.chart_panel.on_action(&action, s));
            out.extend(self.page_bar.on_action(&action, s));
            out.extend(self.log_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Secondary actions are applied directly (depth-limited to 1 level).
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),

            // ── Sorting ───────────────────────────────────────────────────────
            Action::SortBy(field) => {
                if self.state.view.sort.select(field) {
                    debug!("sort: {}", self.state.view.sort.label());
                }
            }

            // ── Paging ────────────────────────────────────────────────────────
            Action::PrevPage => {
                if let Some(req) = self.state.view.prev() {
                    self.request_page(req);
                }
            }
            Action::NextPage => {
                if let Some(req) = self.state.view.next() {
                    self.request_page(req);
                }
            }
            Action::GotoPage(n) => {
                if let Some(req) = self.state.view.goto(n) {
                    self.request_page(req);
                }
            }
            Action::Reload => {
                let req = self.state.view.reload();
                self.request_page(req);
            }

            // ── Search ────────────────────────────────────────────────────────
            Action::OpenSearch => {
                self.state.input_mode = InputMode::Search;
                self.search.activate();
            }
            Action::SearchChanged(text) => self.state.view.set_search_text(text),
            Action::SubmitSearch(text) => {
                self.state.input_mode = InputMode::Normal;
                self.search.deactivate();
                if let Some(query) = self.state.view.begin_search(&text) {
                    self.spawn_search(query);
                }
            }
            Action::CancelSearch => {
                self.state.input_mode = InputMode::Normal;
                self.search.deactivate();
                self.state.view.set_search_text(self.search.text());
            }
            Action::ClearSearch => {
                let text = self.state.view.search_text().to_string();
                self.search.clear();
                self.state.searching = None;
                if self.state.view.clear_search() {
                    debug!("search {:?} cleared", text);
                }
            }

            // ── Ratings / export ──────────────────────────────────────────────
            Action::Rate { song_id, rating } => self.submit_rating(song_id, rating),
            Action::Export => self.export(),

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleLogs => {
                // LogPanel has already flipped its own visibility in on_action.
                let mut ring = base_focus_ring();
                if self.log_panel.visible {
                    self.reload_log();
                    ring.push(ComponentId::LogPanel);
                }
                self.focus.set_items(ring);
            }
            Action::ToggleHelp => {}
            Action::ToggleKeys => self.show_keys_bar = !self.show_keys_bar,

            Action::Quit => self.should_quit = true,
        }
    }

    // ── Remote work ───────────────────────────────────────────────────────────

    fn request_page(&mut self, req: PageRequest) {
        debug!(
            "fetching page {} (size {}, seq {})",
            req.page, req.page_size, req.seq
        );
        self.state.loading_page = Some(req.page);
        self.toast.spinner(format!("loading page {}", req.page));

        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_page(req.page, req.page_size).await;
            let _ = tx
                .send(AppMessage::PageLoaded {
                    seq: req.seq,
                    page: req.page,
                    result,
                })
                .await;
        });
    }

    fn spawn_search(&mut self, query: String) {
        debug!("searching {:?}", query);
        self.state.searching = Some(query.clone());

        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = catalog.search_by_title(&query).await;
            let _ = tx.send(AppMessage::SearchDone { query, result }).await;
        });
    }

    fn submit_rating(&mut self, song_id: u64, rating: u8) {
        let job = match self.ratings.submit(song_id, rating) {
            Ok(job) => job,
            Err(e) => {
                warn!("rating song {} rejected: {}", song_id, e);
                return;
            }
        };
        self.state.pending_ratings.insert(song_id, rating);
        debug!("{} rating write(s) in flight", self.ratings.in_flight());

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = job.await;
            let _ = tx.send(AppMessage::RatingDone(outcome)).await;
        });
    }

    fn export(&mut self) {
        let rows = self.state.view.sorted_page();
        match export_page(&rows, &self.state.export_dir) {
            Ok(path) => {
                info!("exported {} songs to {}", rows.len(), path.display());
                self.toast
                    .success(format!("exported {} songs → {}", rows.len(), path.display()));
            }
            Err(ExportError::EmptyPage) => {
                self.toast.info("nothing to export");
            }
            Err(e) => {
                warn!("{}", e);
                self.toast.warning(e.to_string());
            }
        }
    }

    /// Read the last lines of the log file into `state.log_lines`.
    fn reload_log(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.state.log_path) {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(LOG_TAIL_LINES);
            self.state.log_lines = lines[start..].iter().map(|l| l.to_string()).collect();
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // ── Outer layout: header | search | body | (log) | (keys bar) ─────────
        let log_h = if self.log_panel.visible { 10 } else { 0 };
        let status_h = if self.show_keys_bar { 1 } else { 0 };
        let [header_area, search_area, body_area, log_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(log_h),
            Constraint::Length(status_h),
        ])
        .areas(area);

        // ── Body: charts over table over page bar ─────────────────────────────
        let [charts_area, table_area, page_area] = Layout::vertical([
            Constraint::Percentage(40),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .areas(body_area);

        self.header.draw(frame, header_area, false, &self.state);

        let active_query = match self.state.view.display() {
            Display::Searching { query, .. } => Some(query.as_str()),
            Display::Browsing => None,
        };
        self.search.draw(frame, search_area, active_query);

        self.chart_panel.draw(frame, charts_area, false, &self.state);
        self.song_table.draw(
            frame,
            table_area,
            self.focus.is_focused(ComponentId::SongTable),
            &self.state,
        );
        self.page_bar.draw(
            frame,
            page_area,
            self.focus.is_focused(ComponentId::PageBar),
            &self.state,
        );

        if self.log_panel.visible {
            let focused = self.focus.is_focused(ComponentId::LogPanel);
            self.log_panel.draw(frame, log_area, focused, &self.state);
        }

        if self.show_keys_bar {
            draw_keys_bar(frame, status_area, self.state.input_mode);
        }

        self.pane_areas = PaneAreas {
            search: search_area,
            charts: charts_area,
            song_table: table_area,
            page_bar: page_area,
            log_panel: if self.log_panel.visible { log_area } else { Rect::default() },
        };

        // ── Overlays ──────────────────────────────────────────────────────────
        self.help_overlay.draw(frame, area, false, &self.state);
        self.toast.draw(frame, area);
    }
}

fn base_focus_ring() -> Vec<ComponentId> {
    vec![ComponentId::SongTable, ComponentId::PageBar]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::tests::FakeCatalog;
    use crate::sort::tests::song;
    use crate::view_state::ViewState;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn app_with(catalog: FakeCatalog, export_dir: PathBuf) -> App<FakeCatalog> {
        let state = AppState::new(
            ViewState::new(10, false),
            "http://fake".into(),
            export_dir,
            PathBuf::from("songdash-test.log"),
        );
        App::new(state, Arc::new(catalog), true)
    }

    fn three_songs() -> Vec<Song> {
        vec![
            song(1, "alpha", 120.0),
            song(2, "beta", 90.0),
            song(3, "gamma", 150.0),
        ]
    }

    /// Feed queued task results back into the app until `n` messages arrive.
    async fn pump(app: &mut App<FakeCatalog>, rx: &mut mpsc::Receiver<AppMessage>, n: usize) {
        for _ in 0..n {
            let msg = rx.recv().await.expect("message");
            app.handle_message(msg);
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_page_load_renders_charts_once() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 4,
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();

        app.dispatch(Action::Reload);
        assert_eq!(app.state.loading_page, Some(1));
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.state.loading_page, None);
        assert_eq!(app.state.view.songs().len(), 3);
        assert_eq!(app.state.view.window.total_pages, 4);
        assert_eq!(app.state.charts.generation(), 1);
    }

    #[tokio::test]
    async fn test_superseded_page_is_ignored() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 4,
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;

        app.dispatch(Action::NextPage);
        app.dispatch(Action::NextPage);
        assert_eq!(app.state.loading_page, Some(3));
        assert_eq!(app.state.view.window.page, 1);
        pump(&mut app, &mut rx, 2).await;

        // Only the page-3 response is installed.
        assert_eq!(app.state.view.window.page, 3);
        assert_eq!(app.state.charts.generation(), 2);
        assert_eq!(app.state.loading_page, None);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_prior_page() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 4,
                fail_pages: vec![2],
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;
        let before = app.state.view.songs().to_vec();

        app.dispatch(Action::NextPage);
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.state.view.window.page, 1);
        assert_eq!(app.state.view.songs(), before.as_slice());
        assert_eq!(app.state.charts.generation(), 1);
        assert_eq!(app.state.loading_page, None);

        // Paging still works from the page that is actually shown.
        app.dispatch(Action::NextPage);
        assert_eq!(app.state.loading_page, Some(2));
    }

    #[tokio::test]
    async fn test_shrunk_catalog_moves_to_last_page() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 2,
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;

        // The catalog had five pages when the window last looked.
        app.state.view.window.total_pages = 5;
        app.dispatch(Action::GotoPage(5));
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.state.view.window.page, 2);
        assert_eq!(app.state.loading_page, Some(2));
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.state.loading_page, None);
        assert_eq!(app.state.view.window.page, 2);
        assert!(app.state.view.window.has_prev());
        app.dispatch(Action::PrevPage);
        assert_eq!(app.state.loading_page, Some(1));
    }

    #[tokio::test]
    async fn test_search_overrides_then_esc_clears() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 1,
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;

        for a in app.handle_key(key('/')) {
            app.dispatch(a);
        }
        assert_eq!(app.state.input_mode, InputMode::Search);
        for c in "beta".chars() {
            for a in app.handle_key(key(c)) {
                app.dispatch(a);
            }
        }
        for a in app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)) {
            app.dispatch(a);
        }
        assert_eq!(app.state.searching.as_deref(), Some("beta"));
        pump(&mut app, &mut rx, 1).await;

        let rows = app.state.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 2);
        // Charts follow the page, not the search.
        assert_eq!(app.state.charts.generation(), 1);

        for a in app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)) {
            app.dispatch(a);
        }
        assert!(!app.state.view.is_searching());
        assert_eq!(app.state.rows().len(), 3);
    }

    #[tokio::test]
    async fn test_digit_key_rates_selected_song() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 1,
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;

        let actions = app.handle_key(key('4'));
        assert_eq!(
            actions,
            vec![Action::Rate {
                song_id: 1,
                rating: 4
            }]
        );
        for a in actions {
            app.dispatch(a);
        }
        assert_eq!(app.state.pending_rating_for(1), Some(4));
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.state.pending_rating_for(1), None);
        let rated = app.state.view.songs().iter().find(|s| s.id == 1).unwrap();
        assert_eq!(rated.star_rating, Some(4));
        assert!(app
            .state
            .view
            .songs()
            .iter()
            .filter(|s| s.id != 1)
            .all(|s| s.star_rating.is_none()));
        assert_eq!(*app.catalog.ratings.lock().unwrap(), vec![(1, 4)]);
    }

    #[tokio::test]
    async fn test_failed_rating_keeps_old_value() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 1,
                fail_ratings: true,
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;

        app.dispatch(Action::Rate {
            song_id: 2,
            rating: 5,
        });
        pump(&mut app, &mut rx, 1).await;

        assert!(app.state.pending_ratings.is_empty());
        assert!(app.state.view.songs().iter().all(|s| s.star_rating.is_none()));
    }

    #[tokio::test]
    async fn test_export_writes_sorted_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 1,
                ..FakeCatalog::default()
            },
            dir.path().to_path_buf(),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;

        app.dispatch(Action::SortBy(catalog_proto::SongField::Tempo));
        app.dispatch(Action::Export);

        let csv = std::fs::read_to_string(dir.path().join("songs.csv")).unwrap();
        let ids: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[tokio::test]
    async fn test_export_of_empty_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(FakeCatalog::default(), dir.path().to_path_buf());
        app.dispatch(Action::Export);
        assert!(!dir.path().join("songs.csv").exists());
    }

    #[test]
    fn test_log_toggle_adds_log_pane_to_focus_ring() {
        let mut app = app_with(FakeCatalog::default(), PathBuf::from("."));
        app.dispatch(Action::ToggleLogs);
        assert!(app.log_panel.visible);
        app.dispatch(Action::FocusPrev);
        assert!(app.focus.is_focused(ComponentId::LogPanel));

        app.dispatch(Action::ToggleLogs);
        assert!(!app.log_panel.visible);
        assert!(!app.focus.is_focused(ComponentId::LogPanel));
    }

    #[test]
    fn test_help_swallows_keys_until_closed() {
        let mut app = app_with(FakeCatalog::default(), PathBuf::from("."));
        for a in app.handle_key(key('?')) {
            app.dispatch(a);
        }
        assert!(app.help_overlay.visible);
        assert!(app.handle_key(key('n')).is_empty());
        for a in app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)) {
            app.dispatch(a);
        }
        assert!(!app.help_overlay.visible);
    }

    #[tokio::test]
    async fn test_full_frame_draws() {
        let mut app = app_with(
            FakeCatalog {
                page: three_songs(),
                total_pages: 2,
                ..FakeCatalog::default()
            },
            PathBuf::from("."),
        );
        let mut rx = app.rx.take().unwrap();
        app.dispatch(Action::Reload);
        pump(&mut app, &mut rx, 1).await;

        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("gamma"));
        assert!(text.contains("next ›"));
        assert!(app.pane_areas.song_table.height > 0);
    }
}
