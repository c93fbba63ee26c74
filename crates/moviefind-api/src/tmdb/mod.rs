//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints
//! (search, popularity discovery, daily trending).

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, TmdbClient, TmdbClientBuilder, encode_component};
#[allow(clippy::module_name_repetitions)]
pub use types::{TmdbErrorResponse, TmdbMovie, TmdbMovieListResponse};
