//! ViewState — the one record of what the dashboard is showing.
//!
//! Holds the loaded page, the paging window, the sort spec and whether a
//! search result is overriding the table. Every mutation happens on the app
//! event loop; network calls are issued by the caller using the requests
//! these methods hand back.

use catalog_proto::song::Song;
use catalog_proto::CatalogError;
use tracing::{debug, info};

use crate::sort::{sort_songs, SortSpec};

/// 1-based paging cursor plus the server's page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl PageWindow {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_pages: 0,
        }
    }

    /// Highest reachable page; a catalog reporting 0 pages still has page 1.
    pub fn last_page(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }
}

/// What the table is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Display {
    /// The loaded page, ordered by the sort spec.
    Browsing,
    /// Search results in server order. An empty list shows zero rows.
    Searching { query: String, results: Vec<Song> },
}

/// A page fetch the caller should issue. `seq` ties the response back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub seq: u64,
}

/// What `apply_page` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageApplied {
    /// A newer request was issued since; nothing changed.
    Stale,
    Installed,
    /// The catalog shrank below the requested page. The response is
    /// installed, the window moved to the last page, and that page should
    /// be fetched next.
    Clamped(PageRequest),
}

impl PageApplied {
    pub fn installed(self) -> bool {
        !matches!(self, Self::Stale)
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub window: PageWindow,
    pub sort: SortSpec,
    songs: Vec<Song>,
    display: Display,
    search_text: String,
    /// Last sequence number handed out; only its response is applied.
    latest_seq: u64,
    /// The request still in flight. `window` keeps describing the loaded
    /// page until its response lands.
    pending: Option<PageRequest>,
    sync_search_ratings: bool,
}

impl ViewState {
    pub fn new(page_size: u32, sync_search_ratings: bool) -> Self {
        Self {
            window: PageWindow::new(page_size),
            sort: SortSpec::default(),
            songs: Vec::new(),
            display: Display::Browsing,
            search_text: String::new(),
            latest_seq: 0,
            pending: None,
            sync_search_ratings,
        }
    }

    // ── Paging ───────────────────────────────────────────────────────────────

    /// Re-request the current page (startup and `r`).
    pub fn reload(&mut self) -> PageRequest {
        self.issue(self.window.page)
    }

    /// Page the next navigation starts from: the one in flight, else the
    /// loaded one.
    pub fn target_page(&self) -> u32 {
        self.pending.map_or(self.window.page, |req| req.page)
    }

    pub fn prev(&mut self) -> Option<PageRequest> {
        let target = self.target_page();
        if target <= 1 {
            return None;
        }
        self.goto(target - 1)
    }

    pub fn next(&mut self) -> Option<PageRequest> {
        let target = self.target_page();
        if target >= self.window.last_page() {
            return None;
        }
        self.goto(target + 1)
    }

    /// Jump to `page`. Out-of-range or unchanged pages issue nothing.
    pub fn goto(&mut self, page: u32) -> Option<PageRequest> {
        if page == self.target_page() || page < 1 || page > self.window.last_page() {
            return None;
        }
        Some(self.issue(page))
    }

    fn issue(&mut self, page: u32) -> PageRequest {
        self.latest_seq += 1;
        let req = PageRequest {
            page,
            page_size: self.window.page_size,
            seq: self.latest_seq,
        };
        self.pending = Some(req);
        req
    }

    /// Whether `seq` is the most recently issued page request.
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    /// Install a page response and move the window onto its page. Stale
    /// responses change nothing.
    pub fn apply_page(&mut self, seq: u64, songs: Vec<Song>, total_pages: u32) -> PageApplied {
        let req = match self.pending {
            Some(req) if req.seq == seq => req,
            _ => {
                debug!(
                    "dropping stale page response seq={} (latest {})",
                    seq, self.latest_seq
                );
                return PageApplied::Stale;
            }
        };
        self.pending = None;
        self.songs = songs;
        self.window.total_pages = total_pages;
        self.window.page = req.page;

        let last = self.window.last_page();
        if self.window.page > last {
            info!(
                "page {} is past the last page ({}), moving to it",
                self.window.page, last
            );
            self.window.page = last;
            return PageApplied::Clamped(self.issue(last));
        }
        PageApplied::Installed
    }

    /// A page fetch failed. The loaded page and window stay as they were.
    /// Returns whether `seq` was the request in flight.
    pub fn fail_page(&mut self, seq: u64) -> bool {
        match self.pending {
            Some(req) if req.seq == seq => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    // ── Search ───────────────────────────────────────────────────────────────

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Trimmed query to send, or `None` for blank input (nothing happens).
    pub fn begin_search(&mut self, text: &str) -> Option<String> {
        self.search_text = text.to_string();
        let query = text.trim();
        if query.is_empty() {
            return None;
        }
        Some(query.to_string())
    }

    /// Success shows the results; any error drops back to the loaded page.
    pub fn apply_search(&mut self, query: String, result: Result<Vec<Song>, CatalogError>) {
        match result {
            Ok(results) => {
                info!("search {:?}: {} result(s)", query, results.len());
                self.display = Display::Searching { query, results };
            }
            Err(_) => {
                self.display = Display::Browsing;
            }
        }
    }

    pub fn clear_search(&mut self) -> bool {
        let was_searching = self.is_searching();
        self.display = Display::Browsing;
        self.search_text.clear();
        was_searching
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.display, Display::Searching { .. })
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    // ── Ratings ──────────────────────────────────────────────────────────────

    /// Merge a confirmed rating into the loaded page. Search results follow
    /// only when `sync_search_ratings` is on. Returns whether any row changed.
    pub fn apply_rating(&mut self, song_id: u64, rating: u8) -> bool {
        let mut changed = set_rating(&mut self.songs, song_id, rating);
        if self.sync_search_ratings {
            if let Display::Searching { results, .. } = &mut self.display {
                changed |= set_rating(results, song_id, rating);
            }
        }
        changed
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// The loaded page in server order.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// The loaded page in display order, ignoring any search override.
    pub fn sorted_page(&self) -> Vec<Song> {
        sort_songs(&self.songs, &self.sort)
    }

    /// Rows the table shows right now.
    pub fn visible_rows(&self) -> Vec<Song> {
        match &self.display {
            Display::Browsing => self.sorted_page(),
            Display::Searching { results, .. } => results.clone(),
        }
    }
}

fn set_rating(rows: &mut [Song], song_id: u64, rating: u8) -> bool {
    let mut changed = false;
    for song in rows.iter_mut().filter(|s| s.id == song_id) {
        song.star_rating = Some(rating);
        changed = true;
    }
    changed
}
