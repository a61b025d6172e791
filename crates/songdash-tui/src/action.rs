//! Action enum — all user-initiated intents flowing through the dashboard.

use catalog_proto::song::SongField;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    SongTable,
    Charts,
    PageBar,
    LogPanel,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Sorting ──────────────────────────────────────────────────────────────
    SortBy(SongField),

    // ── Paging ───────────────────────────────────────────────────────────────
    PrevPage,
    NextPage,
    GotoPage(u32),
    Reload,

    // ── Search ───────────────────────────────────────────────────────────────
    OpenSearch,
    SearchChanged(String),
    SubmitSearch(String),
    CancelSearch,
    ClearSearch,

    // ── Ratings / export ─────────────────────────────────────────────────────
    Rate { song_id: u64, rating: u8 },
    Export,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleLogs,
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
