//! View state owned by the fetch orchestrator.

use moviefind_api::tmdb::TmdbMovie;

/// Movie record as delivered by the catalog API.
pub type MovieSummary = TmdbMovie;

/// Maximum number of trending movies kept in the view.
pub const TRENDING_LIMIT: usize = 5;

/// User-facing message for every failure without an API-supplied message.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred. Please try again later.";

/// Everything the UI renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Search results, or popular movies when the query is empty.
    pub movies: Vec<MovieSummary>,
    /// Today's trending movies (at most [`TRENDING_LIMIT`]).
    pub trending: Vec<MovieSummary>,
    /// Message shown instead of the movie list after a failure.
    pub error_message: Option<String>,
    /// True while the latest fetch is in flight.
    pub is_loading: bool,
}

impl ViewState {
    /// Marks a fetch as in flight.
    pub const fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    /// Replaces both lists with fresh results and clears any previous error.
    pub fn apply_success(&mut self, movies: Vec<MovieSummary>, mut trending: Vec<MovieSummary>) {
        trending.truncate(TRENDING_LIMIT);
        self.movies = movies;
        self.trending = trending;
        self.error_message = None;
        self.is_loading = false;
    }

    /// Clears both lists and records `message`.
    pub fn apply_failure(&mut self, message: String) {
        self.movies.clear();
        self.trending.clear();
        self.error_message = Some(message);
        self.is_loading = false;
    }
}
