//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event loop is the only thing that writes to AppState.

use std::collections::HashMap;
use std::path::PathBuf;

use catalog_proto::song::Song;

use crate::charts::ChartSlots;
use crate::view_state::ViewState;
use crate::widgets::status_bar::InputMode;

pub struct AppState {
    // ── Catalog data ────────────────────────────────────────────────────────
    pub view: ViewState,
    pub charts: ChartSlots,
    /// Ratings sent but not yet confirmed, by song id.
    pub pending_ratings: HashMap<u64, u8>,

    // ── Requests in flight ──────────────────────────────────────────────────
    /// Page number currently being fetched.
    pub loading_page: Option<u32>,
    /// Query currently being searched.
    pub searching: Option<String>,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub input_mode: InputMode,

    // ── Session ─────────────────────────────────────────────────────────────
    pub base_url: String,
    pub export_dir: PathBuf,
    pub log_path: PathBuf,
    /// Cached tail of the log file (refreshed periodically by App).
    pub log_lines: Vec<String>,
}

impl AppState {
    pub fn new(view: ViewState, base_url: String, export_dir: PathBuf, log_path: PathBuf) -> Self {
        Self {
            view,
            charts: ChartSlots::new(),
            pending_ratings: HashMap::new(),
            loading_page: None,
            searching: None,
            input_mode: InputMode::Normal,
            base_url,
            export_dir,
            log_path,
            log_lines: Vec::new(),
        }
    }

    /// Rows the table shows, in display order.
    pub fn rows(&self) -> Vec<Song> {
        self.view.visible_rows()
    }

    pub fn pending_rating_for(&self, song_id: u64) -> Option<u8> {
        self.pending_ratings.get(&song_id).copied()
    }
}
