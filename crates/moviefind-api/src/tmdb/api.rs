//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::TmdbMovieListResponse;

/// TMDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Searches movies by free-text query (`search/movie`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API answers with a
    /// non-success status, or JSON parsing fails.
    async fn search_movie(&self, query: &str) -> Result<TmdbMovieListResponse>;

    /// Lists movies sorted by descending popularity (`discover/movie`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API answers with a
    /// non-success status, or JSON parsing fails.
    async fn discover_popular(&self) -> Result<TmdbMovieListResponse>;

    /// Lists today's trending movies (`trending/movie/day`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API answers with a
    /// non-success status, or JSON parsing fails.
    async fn trending_movies_day(&self) -> Result<TmdbMovieListResponse>;
}
