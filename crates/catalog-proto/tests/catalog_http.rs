//! Runs `HttpCatalog` against an in-process axum fake of the song catalog.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use catalog_proto::config::CatalogConfig;
use catalog_proto::song::{PageResponse, RatingRequest, Song};
use catalog_proto::{CatalogApi, CatalogError, HttpCatalog};
use tokio::net::TcpListener;

#[derive(Default)]
struct FakeCatalog {
    songs: Vec<Song>,
    page_queries: Vec<(u32, u32)>,
    ratings: Vec<(u64, u8)>,
    fail_pages: bool,
}

type Shared = Arc<Mutex<FakeCatalog>>;

fn song(id: u64, title: &str) -> Song {
    Song {
        id,
        title: title.to_string(),
        dance_ability: 0.1 * id as f64,
        energy: 0.5,
        acousticness: 0.2,
        tempo: 100.0 + id as f64,
        duration_ms: 60_000 * id,
        num_sections: id,
        num_segments: id * 10,
        star_rating: None,
    }
}

async fn list_songs(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut fake = state.lock().unwrap();
    if fake.fail_pages {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let page: u32 = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(0);
    let size: u32 = params
        .get("page_size")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    fake.page_queries.push((page, size));

    let start = ((page.max(1) - 1) * size) as usize;
    let songs: Vec<Song> = fake
        .songs
        .iter()
        .skip(start)
        .take(size as usize)
        .cloned()
        .collect();
    let total_pages = (fake.songs.len() as u32).div_ceil(size.max(1));
    Json(PageResponse { songs, total_pages }).into_response()
}

async fn search(State(state): State<Shared>, Path(title): Path<String>) -> Response {
    if title == "garbage" {
        return (StatusCode::OK, "{\"not\": \"a list\"}").into_response();
    }
    let fake = state.lock().unwrap();
    let hits: Vec<Song> = fake
        .songs
        .iter()
        .filter(|s| s.title == title)
        .cloned()
        .collect();
    if hits.is_empty() && title == "missing" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(hits).into_response()
}

async fn rate(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<RatingRequest>,
) -> StatusCode {
    let mut fake = state.lock().unwrap();
    let Some(song) = fake.songs.iter_mut().find(|s| s.id == id) else {
        return StatusCode::NOT_FOUND;
    };
    song.star_rating = Some(body.star_rating);
    fake.ratings.push((id, body.star_rating));
    StatusCode::OK
}

async fn start_fake(fake: FakeCatalog) -> (HttpCatalog, Shared) {
    let state: Shared = Arc::new(Mutex::new(fake));
    let app = Router::new()
        .route("/songs", get(list_songs))
        .route("/songs/:key", get(search))
        .route("/songs/:key/rate", post(rate))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpCatalog::new(&CatalogConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: Some(5),
        ..CatalogConfig::default()
    })
    .unwrap();
    (client, state)
}

fn sample_catalog() -> FakeCatalog {
    FakeCatalog {
        songs: (1..=5)
            .map(|id| song(id, &format!("Song {}", id)))
            .chain([song(6, "Hey Jude")])
            .collect(),
        ..FakeCatalog::default()
    }
}

#[tokio::test]
async fn fetch_page_sends_page_and_size() {
    let (client, state) = start_fake(sample_catalog()).await;

    let page = client.fetch_page(2, 4).await.unwrap();
    assert_eq!(page.total_pages, 2);
    let ids: Vec<u64> = page.songs.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![5, 6]);
    assert_eq!(state.lock().unwrap().page_queries, vec![(2, 4)]);
}

#[tokio::test]
async fn search_decodes_percent_encoded_title() {
    let (client, _state) = start_fake(sample_catalog()).await;

    let hits = client.search_by_title("Hey Jude").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 6);

    let none = client.search_by_title("Nope").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn search_not_found_is_status_error() {
    let (client, _state) = start_fake(sample_catalog()).await;

    match client.search_by_title("missing").await {
        Err(CatalogError::Status { status, url }) => {
            assert_eq!(status.as_u16(), 404);
            assert!(url.ends_with("/songs/missing"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (client, _state) = start_fake(sample_catalog()).await;

    let err = client.search_by_title("garbage").await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode { .. }), "{err}");
}

#[tokio::test]
async fn server_error_on_page_is_status_error() {
    let (client, _state) = start_fake(FakeCatalog {
        fail_pages: true,
        ..sample_catalog()
    })
    .await;

    let err = client.fetch_page(1, 10).await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { .. }));
}

#[tokio::test]
async fn submit_rating_posts_body() {
    let (client, state) = start_fake(sample_catalog()).await;

    client.submit_rating(3, 4).await.unwrap();

    let fake = state.lock().unwrap();
    assert_eq!(fake.ratings, vec![(3, 4)]);
    let rated = fake.songs.iter().find(|s| s.id == 3).unwrap();
    assert_eq!(rated.star_rating, Some(4));
}

#[tokio::test]
async fn rating_unknown_song_is_status_error() {
    let (client, state) = start_fake(sample_catalog()).await;

    let err = client.submit_rating(99, 2).await.unwrap_err();
    assert!(matches!(err, CatalogError::Status { .. }));
    assert!(state.lock().unwrap().ratings.is_empty());
}

#[tokio::test]
async fn unreachable_catalog_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpCatalog::new(&CatalogConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: Some(2),
        ..CatalogConfig::default()
    })
    .unwrap();

    let err = client.fetch_page(1, 10).await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport { .. }), "{err}");
}
