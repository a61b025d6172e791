//! Chart data derived from the loaded page.
//!
//! `ChartSlots` owns the four chart instances. Each page load disposes the
//! previous instance of every slot and builds a fresh one, so a slot never
//! shows data from two pages. Drawing lives in `components::chart_panel`.

use catalog_proto::song::Song;
use tracing::trace;

/// Upper bounds (seconds, exclusive) of the first four duration buckets.
const BUCKET_EDGES_SECS: [f64; 4] = [120.0, 240.0, 360.0, 480.0];
pub const BUCKET_LABELS: [&str; 5] = ["0-2 min", "2-4 min", "4-6 min", "6-8 min", "8+ min"];

/// Acousticness is in [0,1]; bars need integers.
const ACOUSTICNESS_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Scatter,
    DurationHistogram,
    Acousticness,
    Tempo,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        Self::Scatter,
        Self::DurationHistogram,
        Self::Acousticness,
        Self::Tempo,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Scatter => "danceability by id",
            Self::DurationHistogram => "duration",
            Self::Acousticness => "acousticness",
            Self::Tempo => "tempo",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Scatter => 0,
            Self::DurationHistogram => 1,
            Self::Acousticness => 2,
            Self::Tempo => 3,
        }
    }
}

/// x = song id, y = danceability. The y axis is pinned to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterData {
    pub points: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
}

impl ScatterData {
    pub const Y_BOUNDS: [f64; 2] = [0.0, 1.0];
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarDatum {
    pub label: String,
    /// Integer height handed to the bar widget.
    pub value: u64,
    /// Raw value as shown on the bar.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Scatter(ScatterData),
    Bars(Vec<BarDatum>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub kind: ChartKind,
    /// Render pass that created this instance.
    pub generation: u64,
    pub data: ChartData,
}

#[derive(Debug, Default)]
pub struct ChartSlots {
    slots: [Option<ChartInstance>; 4],
    generation: u64,
    disposed: u64,
}

impl ChartSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose every live instance, then rebuild all four from `songs`.
    /// An empty page leaves every slot empty.
    pub fn render(&mut self, songs: &[Song]) {
        self.generation += 1;
        for kind in ChartKind::ALL {
            let slot = &mut self.slots[kind.index()];
            if let Some(old) = slot.take() {
                trace!("disposing {:?} chart (gen {})", old.kind, old.generation);
                self.disposed += 1;
            }
            if songs.is_empty() {
                continue;
            }
            *slot = Some(ChartInstance {
                kind,
                generation: self.generation,
                data: build(kind, songs),
            });
        }
    }

    pub fn get(&self, kind: ChartKind) -> Option<&ChartInstance> {
        self.slots[kind.index()].as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Instances disposed over the lifetime of the slots.
    pub fn disposed(&self) -> u64 {
        self.disposed
    }
}

fn build(kind: ChartKind, songs: &[Song]) -> ChartData {
    match kind {
        ChartKind::Scatter => ChartData::Scatter(scatter(songs)),
        ChartKind::DurationHistogram => ChartData::Bars(
            BUCKET_LABELS
                .iter()
                .zip(duration_histogram(songs))
                .map(|(label, count)| BarDatum {
                    label: label.to_string(),
                    value: count,
                    text: count.to_string(),
                })
                .collect(),
        ),
        ChartKind::Acousticness => ChartData::Bars(
            songs
                .iter()
                .map(|s| BarDatum {
                    label: s.title.clone(),
                    value: scale_bar(s.acousticness * ACOUSTICNESS_SCALE),
                    text: format!("{:.3}", s.acousticness),
                })
                .collect(),
        ),
        ChartKind::Tempo => ChartData::Bars(
            songs
                .iter()
                .map(|s| BarDatum {
                    label: s.title.clone(),
                    value: scale_bar(s.tempo),
                    text: format!("{:.0}", s.tempo),
                })
                .collect(),
        ),
    }
}

fn scatter(songs: &[Song]) -> ScatterData {
    let points: Vec<(f64, f64)> = songs
        .iter()
        .map(|s| (s.id as f64, s.dance_ability))
        .collect();
    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    // Pad so a single point doesn't sit on a zero-width axis.
    let x_bounds = if min < max {
        [min, max]
    } else {
        [min - 1.0, max + 1.0]
    };
    ScatterData { points, x_bounds }
}

/// Song counts per bucket: [0,2) [2,4) [4,6) [6,8) [8,∞) minutes.
pub fn duration_histogram(songs: &[Song]) -> [u64; 5] {
    let mut counts = [0u64; 5];
    for song in songs {
        let secs = song.duration_secs();
        let bucket = BUCKET_EDGES_SECS
            .iter()
            .position(|&edge| secs < edge)
            .unwrap_or(BUCKET_EDGES_SECS.len());
        counts[bucket] += 1;
    }
    counts
}

/// Negative and NaN values draw as empty bars.
fn scale_bar(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        v.round() as u64
    } else {
        0
    }
}
