//! Song records and the catalog wire types.
//!
//! Field names match the catalog JSON exactly; `SongField::ALL` is the
//! natural column order used by the table headers and the CSV export.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest star value the catalog accepts.
pub const MAX_STARS: u8 = 5;

/// One catalog entry. Owned by the remote service; the client only ever
/// patches `star_rating` after a confirmed write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: u64,
    pub title: String,
    pub dance_ability: f64,
    pub energy: f64,
    pub acousticness: f64,
    pub tempo: f64,
    pub duration_ms: u64,
    pub num_sections: u64,
    pub num_segments: u64,
    /// `None` (or `Some(0)` from older rows) means unrated.
    #[serde(default)]
    pub star_rating: Option<u8>,
}

impl Song {
    /// Star count for display; 0 when unrated.
    pub fn stars(&self) -> u8 {
        self.star_rating.unwrap_or(0).min(MAX_STARS)
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    pub fn field(&self, field: SongField) -> FieldValue<'_> {
        match field {
            SongField::Id => FieldValue::Int(self.id),
            SongField::Title => FieldValue::Text(&self.title),
            SongField::DanceAbility => FieldValue::Real(self.dance_ability),
            SongField::Energy => FieldValue::Real(self.energy),
            SongField::Acousticness => FieldValue::Real(self.acousticness),
            SongField::Tempo => FieldValue::Real(self.tempo),
            SongField::DurationMs => FieldValue::Int(self.duration_ms),
            SongField::NumSections => FieldValue::Int(self.num_sections),
            SongField::NumSegments => FieldValue::Int(self.num_segments),
            SongField::StarRating => match self.star_rating {
                Some(n) => FieldValue::Int(n as u64),
                None => FieldValue::Missing,
            },
        }
    }
}

/// Every attribute of a `Song`, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SongField {
    Id,
    Title,
    DanceAbility,
    Energy,
    Acousticness,
    Tempo,
    DurationMs,
    NumSections,
    NumSegments,
    StarRating,
}

impl SongField {
    pub const ALL: [SongField; 10] = [
        Self::Id,
        Self::Title,
        Self::DanceAbility,
        Self::Energy,
        Self::Acousticness,
        Self::Tempo,
        Self::DurationMs,
        Self::NumSections,
        Self::NumSegments,
        Self::StarRating,
    ];

    /// JSON / CSV name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::DanceAbility => "dance_ability",
            Self::Energy => "energy",
            Self::Acousticness => "acousticness",
            Self::Tempo => "tempo",
            Self::DurationMs => "duration_ms",
            Self::NumSections => "num_sections",
            Self::NumSegments => "num_segments",
            Self::StarRating => "star_rating",
        }
    }

    /// Table header text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Title => "Title",
            Self::DanceAbility => "Dance Ability",
            Self::Energy => "Energy",
            Self::Acousticness => "Acousticness",
            Self::Tempo => "Tempo",
            Self::DurationMs => "Duration (ms)",
            Self::NumSections => "Sections",
            Self::NumSegments => "Segments",
            Self::StarRating => "Star Rating",
        }
    }
}

/// A single attribute value, typed so numeric columns compare numerically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Int(u64),
    Real(f64),
    Text(&'a str),
    Missing,
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

/// Body of `GET /songs?page=&page_size=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    pub songs: Vec<Song>,
    pub total_pages: u32,
}

/// Body of `POST /songs/{id}/rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub star_rating: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_song_with_null_rating() {
        let json = r#"{
            "id": 3, "title": "3AM", "dance_ability": 0.521, "energy": 0.673,
            "acousticness": 0.00573, "tempo": 108.031, "duration_ms": 225947,
            "num_sections": 10, "num_segments": 916, "star_rating": null,
            "class": 1
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.id, 3);
        assert_eq!(song.title, "3AM");
        assert_eq!(song.star_rating, None);
        assert_eq!(song.stars(), 0);
    }

    #[test]
    fn test_decode_song_without_rating_key() {
        let json = r#"{
            "id": 4, "title": "4 Walls", "dance_ability": 0.5, "energy": 0.5,
            "acousticness": 0.1, "tempo": 120.0, "duration_ms": 180000,
            "num_sections": 8, "num_segments": 700
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.star_rating, None);
    }

    #[test]
    fn test_field_values_and_names() {
        let song = Song {
            id: 9,
            title: "Nine".into(),
            dance_ability: 0.25,
            energy: 0.5,
            acousticness: 0.75,
            tempo: 120.0,
            duration_ms: 240000,
            num_sections: 7,
            num_segments: 600,
            star_rating: Some(3),
        };
        assert_eq!(song.field(SongField::Id), FieldValue::Int(9));
        assert_eq!(song.field(SongField::Title), FieldValue::Text("Nine"));
        assert_eq!(song.field(SongField::Tempo).to_string(), "120");
        assert_eq!(song.field(SongField::StarRating).to_string(), "3");
        assert_eq!(song.duration_secs(), 240.0);

        let names: Vec<&str> = SongField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.first(), Some(&"id"));
        assert_eq!(names.last(), Some(&"star_rating"));
    }

    #[test]
    fn test_missing_rating_renders_empty() {
        assert_eq!(FieldValue::Missing.to_string(), "");
    }

    #[test]
    fn test_rating_request_shape() {
        let body = serde_json::to_value(RatingRequest { star_rating: 4 }).unwrap();
        assert_eq!(body, serde_json::json!({ "star_rating": 4 }));
    }
}
