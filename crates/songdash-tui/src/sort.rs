//! Column sorting for the song table.
//!
//! Pure functions only: the table asks for an ordered copy every time the
//! loaded page or the sort spec changes.

use std::cmp::Ordering;

use catalog_proto::song::{FieldValue, Song, SongField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Active sort column and direction. `column == None` keeps server order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub column: Option<SongField>,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Same column flips direction; a new column starts ascending.
    /// Unsortable columns leave the spec alone and return `false`.
    pub fn select(&mut self, column: SongField) -> bool {
        if !is_sortable(column) {
            return false;
        }
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Ascending;
        }
        true
    }

    pub fn label(&self) -> String {
        match self.column {
            Some(col) => format!("{} {}", col.label(), self.direction.arrow()),
            None => "unsorted".to_string(),
        }
    }
}

/// Every column except the star rating.
pub fn is_sortable(column: SongField) -> bool {
    column != SongField::StarRating
}

/// Ordered copy of `rows`. The sort is stable, so ties keep server order.
pub fn sort_songs(rows: &[Song], spec: &SortSpec) -> Vec<Song> {
    let mut out = rows.to_vec();
    let Some(column) = spec.column else {
        return out;
    };
    out.sort_by(|a, b| {
        let ord = compare_values(a.field(column), b.field(column));
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    out
}

/// Numbers compare numerically, text by byte order. Reals use `total_cmp`
/// so a NaN from the catalog sorts after every number instead of breaking
/// the ordering.
fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Int(x), FieldValue::Int(y)) => x.cmp(&y),
        (FieldValue::Real(x), FieldValue::Real(y)) => x.total_cmp(&y),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (FieldValue::Missing, FieldValue::Missing) => Ordering::Equal,
        (FieldValue::Missing, _) => Ordering::Less,
        (_, FieldValue::Missing) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
