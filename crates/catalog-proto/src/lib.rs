//! Shared types and I/O for songdash: the song model, the catalog HTTP
//! client, configuration, and platform paths.

pub mod client;
pub mod config;
pub mod platform;
pub mod song;

pub use client::{CatalogApi, CatalogError, HttpCatalog};
pub use reqwest::StatusCode;
pub use song::{FieldValue, PageResponse, Song, SongField};
