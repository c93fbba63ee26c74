//! TMDB API response types.

use serde::Deserialize;

/// Base URL for `w500` poster images.
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Base URL for movie pages on the TMDB website.
const MOVIE_PAGE_BASE_URL: &str = "https://www.themoviedb.org/movie";

// --- Movie lists ---

/// Response from `search/movie`, `discover/movie` and `trending/movie/day`.
///
/// All three endpoints share the paged `results` shape. Failure bodies may
/// instead carry `success: false` with a `status_message`, or the legacy
/// `"response": "False"` flag with an `Error` message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TmdbMovieListResponse {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Movie results. Absent on failure bodies.
    #[serde(default)]
    pub results: Option<Vec<TmdbMovie>>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
    /// Legacy failure flag (`"False"` on failure).
    #[serde(default)]
    pub response: Option<String>,
    /// Legacy failure message.
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    /// Success flag (present only on failure bodies).
    #[serde(default)]
    pub success: Option<bool>,
    /// Failure message paired with `success`.
    #[serde(default)]
    pub status_message: Option<String>,
}

impl TmdbMovieListResponse {
    /// Returns `true` if the body reports an application-level failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.response.as_deref() == Some("False") || self.success == Some(false)
    }

    /// Returns the API-supplied failure message, if any.
    ///
    /// `Error` wins over `status_message`; empty strings count as absent.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.status_message.as_deref().filter(|m| !m.is_empty()))
    }

    /// Returns the movie results, or an empty slice when the body had none.
    #[must_use]
    pub fn movies(&self) -> &[TmdbMovie] {
        self.results.as_deref().unwrap_or_default()
    }
}

/// A single movie record.
///
/// Only `id` is required; the list endpoints omit different fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TmdbMovie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: String,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: String,
    /// Release date (YYYY-MM-DD, empty, or null).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: f64,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Video flag.
    #[serde(default)]
    pub video: bool,
    /// Media type (trending results only).
    #[serde(default)]
    pub media_type: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl TmdbMovie {
    /// Returns the release year, if the release date is known.
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }

    /// Returns the full `w500` poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        let path = self.poster_path.as_deref()?.trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        Some(format!("{POSTER_BASE_URL}/{path}"))
    }

    /// Returns the TMDB website URL for this movie.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("{MOVIE_PAGE_BASE_URL}/{}", self.id)
    }
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    pub success: bool,
}
