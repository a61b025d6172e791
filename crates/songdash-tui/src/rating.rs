//! Rating controller: star pick → remote write → merge on success.
//!
//! The controller validates and tracks in-flight writes; the app runs the
//! returned future on a task and feeds the outcome back through `finish`
//! before touching `ViewState`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use catalog_proto::client::validate_rating;
use catalog_proto::{CatalogApi, CatalogError};
use tracing::debug;

/// `seq` identifies the submit that produced the outcome.
#[derive(Debug)]
pub enum RatingOutcome {
    Saved {
        song_id: u64,
        rating: u8,
        seq: u64,
    },
    Failed {
        song_id: u64,
        rating: u8,
        seq: u64,
        error: CatalogError,
    },
}

impl RatingOutcome {
    pub fn song_id(&self) -> u64 {
        match self {
            Self::Saved { song_id, .. } | Self::Failed { song_id, .. } => *song_id,
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            Self::Saved { seq, .. } | Self::Failed { seq, .. } => *seq,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingRating {
    rating: u8,
    seq: u64,
}

pub struct RatingController<C> {
    catalog: Arc<C>,
    /// song id → latest submit for it still awaiting the server.
    pending: HashMap<u64, PendingRating>,
    next_seq: u64,
}

impl<C: CatalogApi + 'static> RatingController<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            pending: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Validate and mark the write in flight. The returned future performs
    /// the request and never fails; errors come back as `Failed`.
    pub fn submit(
        &mut self,
        song_id: u64,
        rating: u8,
    ) -> Result<impl Future<Output = RatingOutcome> + Send + 'static, CatalogError> {
        let rating = validate_rating(rating)?;
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending.insert(song_id, PendingRating { rating, seq });
        debug!("rating song {} → {} (in flight, seq {})", song_id, rating, seq);

        let catalog = Arc::clone(&self.catalog);
        Ok(async move {
            match catalog.submit_rating(song_id, rating).await {
                Ok(()) => RatingOutcome::Saved {
                    song_id,
                    rating,
                    seq,
                },
                Err(error) => RatingOutcome::Failed {
                    song_id,
                    rating,
                    seq,
                    error,
                },
            }
        })
    }

    /// Accept an outcome only if it answers the latest submit for its song,
    /// clearing the in-flight marker. Anything older is stale and leaves the
    /// marker alone, whatever order the answers arrive in.
    pub fn finish(&mut self, outcome: &RatingOutcome) -> bool {
        let id = outcome.song_id();
        match self.pending.get(&id) {
            Some(latest) if latest.seq == outcome.seq() => {
                self.pending.remove(&id);
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self, song_id: u64) -> Option<u8> {
        self.pending.get(&song_id).map(|p| p.rating)
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}
