//! Star rating cell: `★★★☆☆`, picked by digit key or by clicking a star.

use catalog_proto::song::MAX_STARS;
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme::{C_MUTED, C_STARS, C_STARS_PENDING};

const FULL: char = '★';
const EMPTY: char = '☆';

/// Cell width in columns; every star glyph is one column wide.
pub const STARS_WIDTH: u16 = MAX_STARS as u16;

/// `rating` filled stars out of five. Star n is filled iff n <= rating.
pub fn stars(rating: u8) -> String {
    (1..=MAX_STARS)
        .map(|n| if n <= rating { FULL } else { EMPTY })
        .collect()
}

/// Styled cell. A pending write shows the requested value, dimmed.
pub fn stars_line(rating: u8, pending: Option<u8>) -> Line<'static> {
    match pending {
        Some(p) => Line::from(vec![
            Span::styled(stars(p), Style::default().fg(C_STARS_PENDING)),
            Span::styled(" …", Style::default().fg(C_MUTED)),
        ]),
        None => Line::from(Span::styled(stars(rating), Style::default().fg(C_STARS))),
    }
}

/// Star value under a click `offset` columns into the cell.
pub fn star_at_offset(offset: u16) -> Option<u8> {
    (offset < STARS_WIDTH).then(|| offset as u8 + 1)
}

/// `'1'..='5'` → 1..=5.
pub fn star_from_key(c: char) -> Option<u8> {
    c.to_digit(10)
        .map(|d| d as u8)
        .filter(|d| (1..=MAX_STARS).contains(d))
}
