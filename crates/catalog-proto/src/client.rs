//! HTTP client for the song catalog.
//!
//! Three operations, no local state:
//!   GET  {base}/songs?page={n}&page_size={m}  → PageResponse
//!   GET  {base}/songs/{title}                 → Vec<Song>
//!   POST {base}/songs/{id}/rate               ← {"star_rating": n}

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::song::{PageResponse, RatingRequest, Song, MAX_STARS};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog returned {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("search text is empty")]
    EmptyQuery,
    #[error("rating {0} is outside 1..=5")]
    InvalidRating(u8),
    #[error("invalid catalog base url {0:?}")]
    InvalidBaseUrl(String),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The remote operations the dashboard needs. `HttpCatalog` is the real
/// implementation; tests substitute in-memory fakes.
pub trait CatalogApi: Send + Sync {
    fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<PageResponse, CatalogError>> + Send;

    fn search_by_title(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Song>, CatalogError>> + Send;

    fn submit_rating(
        &self,
        song_id: u64,
        rating: u8,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

/// Accepts 1..=5, rejects everything else.
pub fn validate_rating(rating: u8) -> Result<u8, CatalogError> {
    if (1..=MAX_STARS).contains(&rating) {
        Ok(rating)
    } else {
        Err(CatalogError::InvalidRating(rating))
    }
}

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: Client,
    base: Url,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let base = parse_base_url(&config.base_url)?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(CatalogError::Client)?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `base` + path segments, each segment percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let label = url.to_string();
        debug!("catalog GET {} {:?}", label, query);
        let response = self
            .http
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: label.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status { status, url: label });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| CatalogError::Transport {
                url: label.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| CatalogError::Decode { url: label, source })
    }
}

impl CatalogApi for HttpCatalog {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PageResponse, CatalogError> {
        let url = self.endpoint(&["songs"]);
        self.get_json(
            url,
            &[("page", page.to_string()), ("page_size", page_size.to_string())],
        )
        .await
    }

    async fn search_by_title(&self, text: &str) -> Result<Vec<Song>, CatalogError> {
        if text.trim().is_empty() {
            return Err(CatalogError::EmptyQuery);
        }
        let url = self.endpoint(&["songs", text]);
        self.get_json(url, &[]).await
    }

    async fn submit_rating(&self, song_id: u64, rating: u8) -> Result<(), CatalogError> {
        let rating = validate_rating(rating)?;
        let id = song_id.to_string();
        let url = self.endpoint(&["songs", &id, "rate"]);
        let label = url.to_string();
        debug!("catalog POST {} star_rating={}", label, rating);

        let response = self
            .http
            .post(url)
            .json(&RatingRequest {
                star_rating: rating,
            })
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: label.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status { status, url: label });
        }
        Ok(())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, CatalogError> {
    let url = Url::parse(raw.trim()).map_err(|_| CatalogError::InvalidBaseUrl(raw.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(base_url: &str) -> HttpCatalog {
        HttpCatalog::new(&CatalogConfig {
            base_url: base_url.to_string(),
            ..CatalogConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = catalog("http://127.0.0.1:5000");
        assert_eq!(c.endpoint(&["songs"]).as_str(), "http://127.0.0.1:5000/songs");
        assert_eq!(
            c.endpoint(&["songs", "7", "rate"]).as_str(),
            "http://127.0.0.1:5000/songs/7/rate"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_trailing_slash() {
        let c = catalog("http://songs.local/api/v1/");
        assert_eq!(
            c.endpoint(&["songs"]).as_str(),
            "http://songs.local/api/v1/songs"
        );
    }

    #[test]
    fn test_title_is_encoded_as_one_segment() {
        let c = catalog("http://songs.local");
        let url = c.endpoint(&["songs", "AC/DC live?"]);
        assert_eq!(url.as_str(), "http://songs.local/songs/AC%2FDC%20live%3F");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        for raw in ["", "not a url", "mailto:someone@example.com", "ftp://songs.local"] {
            let err = HttpCatalog::new(&CatalogConfig {
                base_url: raw.to_string(),
                ..CatalogConfig::default()
            })
            .unwrap_err();
            assert!(matches!(err, CatalogError::InvalidBaseUrl(_)), "{raw:?}");
        }
    }

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert_eq!(validate_rating(1).unwrap(), 1);
        assert_eq!(validate_rating(5).unwrap(), 5);
        assert!(matches!(
            validate_rating(6),
            Err(CatalogError::InvalidRating(6))
        ));
    }

    #[tokio::test]
    async fn test_local_validation_sends_nothing() {
        // Port 9 (discard) would fail with Transport if a request were made.
        let c = catalog("http://127.0.0.1:9");
        assert!(matches!(
            c.search_by_title("   ").await,
            Err(CatalogError::EmptyQuery)
        ));
        assert!(matches!(
            c.submit_rating(1, 0).await,
            Err(CatalogError::InvalidRating(0))
        ));
    }
}
