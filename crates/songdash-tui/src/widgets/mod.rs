pub mod pane_chrome;
pub mod search_input;
pub mod star_rating;
pub mod status_bar;
pub mod toast;
