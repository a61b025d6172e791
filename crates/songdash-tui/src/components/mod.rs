pub mod chart_panel;
pub mod header;
pub mod help_overlay;
pub mod log_panel;
pub mod page_bar;
pub mod song_table;
