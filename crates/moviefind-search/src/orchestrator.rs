//! `MovieSearch` - turns a query into the movie list and trending requests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, anyhow};
use futures::future::join;
use moviefind_api::tmdb::{TmdbApi, TmdbMovieListResponse};
use tokio::sync::watch;
use tracing::instrument;

use crate::state::{FALLBACK_ERROR_MESSAGE, MovieSummary, ViewState};

/// Endpoint serving the primary movie list for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryEndpoint {
    /// `discover/movie` sorted by descending popularity (empty query).
    Popular,
    /// `search/movie` for the given query.
    Search(String),
}

impl PrimaryEndpoint {
    /// Selects the endpoint for `query`.
    #[must_use]
    pub fn for_query(query: &str) -> Self {
        if query.is_empty() {
            Self::Popular
        } else {
            Self::Search(String::from(query))
        }
    }
}

impl fmt::Display for PrimaryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Popular => write!(f, "discover/movie"),
            Self::Search(_) => write!(f, "search/movie"),
        }
    }
}

/// Why a fetch produced no lists.
#[derive(Debug)]
pub enum FetchFailure {
    /// A request failed: transport error, non-success status, or bad JSON.
    Request(anyhow::Error),
    /// The movie list body carried an application-level failure indicator.
    Rejected {
        /// Message supplied by the API, if any.
        message: Option<String>,
    },
}

impl FetchFailure {
    /// Returns the message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
            } => message.clone(),
            Self::Request(_) | Self::Rejected { message: None } => {
                String::from(FALLBACK_ERROR_MESSAGE)
            }
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "request failed: {err:#}"),
            Self::Rejected { message } => write!(
                f,
                "rejected by API: {}",
                message.as_deref().unwrap_or("<no message>")
            ),
        }
    }
}

impl std::error::Error for FetchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err.as_ref()),
            Self::Rejected { .. } => None,
        }
    }
}

/// Result of one [`MovieSearch::fetch_movies`] call.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Lists were replaced.
    Loaded,
    /// Lists were cleared and an error message was set.
    Failed(FetchFailure),
    /// A newer fetch started before this one resolved; its results were discarded.
    Superseded,
}

/// Fetch orchestrator.
///
/// Owns the [`ViewState`] and publishes every change through a `watch`
/// channel. Each fetch is tagged with a generation number so that a slow,
/// superseded response never overwrites a fresher one.
#[derive(Debug)]
pub struct MovieSearch<A> {
    /// Catalog API.
    api: A,
    /// Published view state.
    state: watch::Sender<ViewState>,
    /// Generation of the most recently started fetch.
    generation: AtomicU64,
}

impl<A: TmdbApi + Sync> MovieSearch<A> {
    /// Creates an orchestrator with an empty view state.
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            api,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Returns a copy of the current view state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Returns the generation of the most recently started fetch.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetches the movie list for `query` together with today's trending movies.
    ///
    /// An empty query lists popular movies. Both requests run concurrently
    /// and the view state is updated only after both resolve. `is_loading`
    /// is set before the requests go out and cleared on every branch.
    #[instrument(skip(self))]
    pub async fn fetch_movies(&self, query: &str) -> FetchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.state.send_modify(ViewState::begin_loading);

        let endpoint = PrimaryEndpoint::for_query(query);
        tracing::debug!(generation, %endpoint, "fetching movies");

        let primary = async {
            match &endpoint {
                PrimaryEndpoint::Popular => self.api.discover_popular().await,
                PrimaryEndpoint::Search(q) => self.api.search_movie(q).await,
            }
        };
        let (primary, trending) = join(primary, self.api.trending_movies_day()).await;

        self.commit(generation, resolve(primary, trending))
    }

    /// Applies a resolved fetch unless a newer one has started since.
    fn commit(
        &self,
        generation: u64,
        result: Result<(Vec<MovieSummary>, Vec<MovieSummary>), FetchFailure>,
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::Superseded;

        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match result {
                Ok((movies, trending)) => {
                    tracing::debug!(
                        generation,
                        movies = movies.len(),
                        trending = trending.len(),
                        "fetch complete"
                    );
                    state.apply_success(movies, trending);
                    outcome = FetchOutcome::Loaded;
                }
                Err(failure) => {
                    tracing::warn!(generation, error = %failure, "fetch failed");
                    state.apply_failure(failure.user_message());
                    outcome = FetchOutcome::Failed(failure);
                }
            }
            true
        });

        if matches!(outcome, FetchOutcome::Superseded) {
            tracing::debug!(generation, "discarding superseded fetch");
        }
        outcome
    }
}

/// Merges both responses; either request failing fails the whole fetch.
///
/// A primary body without `results` is an empty list. A trending body
/// without `results` is a request failure.
fn resolve(
    primary: Result<TmdbMovieListResponse>,
    trending: Result<TmdbMovieListResponse>,
) -> Result<(Vec<MovieSummary>, Vec<MovieSummary>), FetchFailure> {
    let primary = primary.map_err(FetchFailure::Request)?;
    let trending = trending.map_err(FetchFailure::Request)?;

    if primary.is_failure() {
        return Err(FetchFailure::Rejected {
            message: primary.failure_message().map(String::from),
        });
    }

    if trending.is_failure() || trending.results.is_none() {
        return Err(FetchFailure::Request(anyhow!(
            "trending response has no results: {}",
            trending.failure_message().unwrap_or("<no message>")
        )));
    }

    Ok((
        primary.results.unwrap_or_default(),
        trending.results.unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use anyhow::bail;
    use moviefind_api::tmdb::TmdbMovie;
    use tokio::sync::Notify;

    use super::*;
    use crate::state::TRENDING_LIMIT;

    /// Key under which the popular list is gated.
    const POPULAR: &str = "";

    /// Mock API with canned responses and optional per-query gates.
    #[derive(Default)]
    struct MockTmdbApi {
        search: HashMap<String, TmdbMovieListResponse>,
        popular: TmdbMovieListResponse,
        trending: TmdbMovieListResponse,
        fail_primary: bool,
        fail_trending: bool,
        gates: HashMap<String, Arc<Notify>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockTmdbApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn wait_gate(&self, key: &str) {
            if let Some(gate) = self.gates.get(key) {
                gate.notified().await;
            }
        }

        fn gate(&mut self, key: &str) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.gates.insert(String::from(key), Arc::clone(&gate));
            gate
        }
    }

    impl TmdbApi for MockTmdbApi {
        async fn search_movie(&self, query: &str) -> Result<TmdbMovieListResponse> {
            self.record(format!("search:{query}"));
            self.wait_gate(query).await;
            if self.fail_primary {
                bail!("TMDB API error (HTTP 500 Internal Server Error): boom");
            }
            Ok(self.search.get(query).cloned().unwrap_or_default())
        }

        async fn discover_popular(&self) -> Result<TmdbMovieListResponse> {
            self.record(String::from("popular"));
            self.wait_gate(POPULAR).await;
            if self.fail_primary {
                bail!("TMDB API error (HTTP 500 Internal Server Error): boom");
            }
            Ok(self.popular.clone())
        }

        async fn trending_movies_day(&self) -> Result<TmdbMovieListResponse> {
            self.record(String::from("trending"));
            if self.fail_trending {
                bail!("TMDB API error (HTTP 401 Unauthorized): invalid key");
            }
            Ok(self.trending.clone())
        }
    }

    fn list(ids: std::ops::Range<u64>) -> TmdbMovieListResponse {
        TmdbMovieListResponse {
            page: 1,
            results: Some(
                ids.map(|id| TmdbMovie {
                    id,
                    title: format!("Movie {id}"),
                    ..TmdbMovie::default()
                })
                .collect(),
            ),
            ..TmdbMovieListResponse::default()
        }
    }

    fn ids(movies: &[MovieSummary]) -> Vec<u64> {
        movies.iter().map(|m| m.id).collect()
    }

    fn stocked_api() -> MockTmdbApi {
        let mut api = MockTmdbApi {
            popular: list(1..4),
            trending: list(100..120),
            ..MockTmdbApi::default()
        };
        api.search.insert(String::from("alien"), list(50..52));
        api
    }

    #[test]
    fn test_endpoint_selection() {
        // Arrange & Act & Assert
        assert_eq!(PrimaryEndpoint::for_query(""), PrimaryEndpoint::Popular);
        assert_eq!(
            PrimaryEndpoint::for_query("a b"),
            PrimaryEndpoint::Search(String::from("a b"))
        );
        assert_eq!(PrimaryEndpoint::Popular.to_string(), "discover/movie");
    }

    #[test]
    fn test_user_message() {
        // Arrange & Act & Assert
        assert_eq!(
            FetchFailure::Request(anyhow::anyhow!("timeout")).user_message(),
            FALLBACK_ERROR_MESSAGE
        );
        assert_eq!(
            FetchFailure::Rejected { message: None }.user_message(),
            FALLBACK_ERROR_MESSAGE
        );
        assert_eq!(
            FetchFailure::Rejected {
                message: Some(String::from("Movie not found!"))
            }
            .user_message(),
            "Movie not found!"
        );
    }

    #[tokio::test]
    async fn test_empty_query_lists_popular() {
        // Arrange
        let search = MovieSearch::new(stocked_api());

        // Act
        let outcome = search.fetch_movies("").await;

        // Assert
        assert!(matches!(outcome, FetchOutcome::Loaded));
        let state = search.snapshot();
        assert_eq!(ids(&state.movies), vec![1, 2, 3]);
        assert_eq!(search.api.calls(), vec!["popular", "trending"]);
    }

    #[tokio::test]
    async fn test_query_uses_search_endpoint() {
        // Arrange
        let search = MovieSearch::new(stocked_api());

        // Act
        search.fetch_movies("alien").await;

        // Assert
        let state = search.snapshot();
        assert_eq!(ids(&state.movies), vec![50, 51]);
        assert_eq!(search.api.calls(), vec!["search:alien", "trending"]);
    }

    #[tokio::test]
    async fn test_trending_truncated_to_limit() {
        // Arrange
        let search = MovieSearch::new(stocked_api());

        // Act
        search.fetch_movies("").await;

        // Assert
        let state = search.snapshot();
        assert_eq!(state.trending.len(), TRENDING_LIMIT);
        assert_eq!(ids(&state.trending), vec![100, 101, 102, 103, 104]);
    }

    #[tokio::test]
    async fn test_search_without_results_is_success() {
        // Arrange
        let search = MovieSearch::new(stocked_api());

        // Act
        let outcome = search.fetch_movies("zzzz").await;

        // Assert
        assert!(matches!(outcome, FetchOutcome::Loaded));
        let state = search.snapshot();
        assert!(state.movies.is_empty());
        assert!(state.error_message.is_none());
        assert_eq!(state.trending.len(), TRENDING_LIMIT);
    }

    #[tokio::test]
    async fn test_primary_failure_clears_both_lists() {
        // Arrange
        let search = MovieSearch::new(stocked_api());
        search.fetch_movies("").await;
        let search = MovieSearch {
            api: MockTmdbApi {
                fail_primary: true,
                ..stocked_api()
            },
            ..search
        };

        // Act
        let outcome = search.fetch_movies("").await;

        // Assert
        assert!(matches!(
            outcome,
            FetchOutcome::Failed(FetchFailure::Request(_))
        ));
        let state = search.snapshot();
        assert!(state.movies.is_empty());
        assert!(state.trending.is_empty());
        assert_eq!(state.error_message.as_deref(), Some(FALLBACK_ERROR_MESSAGE));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_trending_failure_clears_both_lists() {
        // Arrange
        let search = MovieSearch::new(MockTmdbApi {
            fail_trending: true,
            ..stocked_api()
        });

        // Act
        let outcome = search.fetch_movies("alien").await;

        // Assert
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        let state = search.snapshot();
        assert!(state.movies.is_empty());
        assert!(state.trending.is_empty());
        assert_eq!(state.error_message.as_deref(), Some(FALLBACK_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_trending_body_without_results_fails() {
        // Arrange
        let mut api = stocked_api();
        api.trending = TmdbMovieListResponse {
            success: Some(false),
            status_message: Some(String::from("Service offline.")),
            ..TmdbMovieListResponse::default()
        };
        let search = MovieSearch::new(api);

        // Act
        let outcome = search.fetch_movies("").await;

        // Assert
        assert!(matches!(
            outcome,
            FetchOutcome::Failed(FetchFailure::Request(_))
        ));
        let state = search.snapshot();
        assert!(state.movies.is_empty());
        assert!(state.trending.is_empty());
        assert_eq!(state.error_message.as_deref(), Some(FALLBACK_ERROR_MESSAGE));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_empty_trending_body_fails() {
        // Arrange
        let mut api = stocked_api();
        api.trending = TmdbMovieListResponse::default();
        let search = MovieSearch::new(api);

        // Act
        let outcome = search.fetch_movies("alien").await;

        // Assert
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert_eq!(
            search.snapshot().error_message.as_deref(),
            Some(FALLBACK_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_empty_trending_results_is_success() {
        // Arrange
        let mut api = stocked_api();
        api.trending = list(0..0);
        let search = MovieSearch::new(api);

        // Act
        let outcome = search.fetch_movies("").await;

        // Assert
        assert!(matches!(outcome, FetchOutcome::Loaded));
        let state = search.snapshot();
        assert_eq!(ids(&state.movies), vec![1, 2, 3]);
        assert!(state.trending.is_empty());
        assert!(state.error_message.is_none());
    }

    #[tokio::test]
    async fn test_rejected_payload_uses_api_message() {
        // Arrange
        let mut api = stocked_api();
        api.search.insert(
            String::from("nope"),
            TmdbMovieListResponse {
                response: Some(String::from("False")),
                error: Some(String::from("Movie not found!")),
                ..TmdbMovieListResponse::default()
            },
        );
        let search = MovieSearch::new(api);

        // Act
        let outcome = search.fetch_movies("nope").await;

        // Assert
        assert!(matches!(
            outcome,
            FetchOutcome::Failed(FetchFailure::Rejected { .. })
        ));
        let state = search.snapshot();
        assert_eq!(state.error_message.as_deref(), Some("Movie not found!"));
        assert!(state.movies.is_empty());
        assert!(state.trending.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_payload_without_message_uses_fallback() {
        // Arrange
        let mut api = stocked_api();
        api.popular = TmdbMovieListResponse {
            success: Some(false),
            ..TmdbMovieListResponse::default()
        };
        let search = MovieSearch::new(api);

        // Act
        search.fetch_movies("").await;

        // Assert
        assert_eq!(
            search.snapshot().error_message.as_deref(),
            Some(FALLBACK_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_success_after_failure_clears_error() {
        // Arrange
        let mut api = stocked_api();
        api.search.insert(
            String::from("nope"),
            TmdbMovieListResponse {
                response: Some(String::from("False")),
                ..TmdbMovieListResponse::default()
            },
        );
        let search = MovieSearch::new(api);
        search.fetch_movies("nope").await;

        // Act
        search.fetch_movies("alien").await;

        // Assert
        let state = search.snapshot();
        assert!(state.error_message.is_none());
        assert_eq!(ids(&state.movies), vec![50, 51]);
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_idempotent() {
        // Arrange
        let search = MovieSearch::new(stocked_api());

        // Act
        search.fetch_movies("alien").await;
        let first = search.snapshot();
        search.fetch_movies("alien").await;
        let second = search.snapshot();

        // Assert
        assert_eq!(first, second);
        assert_eq!(search.generation(), 2);
    }

    #[tokio::test]
    async fn test_loading_flag_spans_request_on_success() {
        // Arrange
        let mut api = stocked_api();
        let gate = api.gate(POPULAR);
        let search = Arc::new(MovieSearch::new(api));
        let mut rx = search.subscribe();
        assert!(!rx.borrow().is_loading);

        // Act
        let task = {
            let search = Arc::clone(&search);
            tokio::spawn(async move { search.fetch_movies("").await })
        };
        assert!(rx.wait_for(|s| s.is_loading).await.is_ok());
        let in_flight = search.snapshot();
        gate.notify_one();
        let outcome = task.await.unwrap();

        // Assert
        assert!(in_flight.is_loading);
        assert!(in_flight.movies.is_empty());
        assert!(matches!(outcome, FetchOutcome::Loaded));
        assert!(!search.snapshot().is_loading);
    }

    #[tokio::test]
    async fn test_loading_flag_spans_request_on_failure() {
        // Arrange
        let mut api = MockTmdbApi {
            fail_primary: true,
            ..stocked_api()
        };
        let gate = api.gate("alien");
        let search = Arc::new(MovieSearch::new(api));
        let mut rx = search.subscribe();

        // Act
        let task = {
            let search = Arc::clone(&search);
            tokio::spawn(async move { search.fetch_movies("alien").await })
        };
        assert!(rx.wait_for(|s| s.is_loading).await.is_ok());
        let in_flight = search.snapshot();
        gate.notify_one();
        let outcome = task.await.unwrap();

        // Assert
        assert!(in_flight.is_loading);
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        let state = search.snapshot();
        assert!(!state.is_loading);
        assert!(state.error_message.is_some());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        // Arrange: "old" resolves only after "alien" has completed
        let mut api = stocked_api();
        api.search.insert(String::from("old"), list(900..910));
        let old_gate = api.gate("old");
        let search = Arc::new(MovieSearch::new(api));
        let mut rx = search.subscribe();

        let old_task = {
            let search = Arc::clone(&search);
            tokio::spawn(async move { search.fetch_movies("old").await })
        };
        assert!(rx.wait_for(|s| s.is_loading).await.is_ok());

        // Act
        let fresh = search.fetch_movies("alien").await;
        old_gate.notify_one();
        let stale = old_task.await.unwrap();

        // Assert
        assert!(matches!(fresh, FetchOutcome::Loaded));
        assert!(matches!(stale, FetchOutcome::Superseded));
        let state = search.snapshot();
        assert_eq!(ids(&state.movies), vec![50, 51]);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_superseded_fetch_keeps_loading_flag() {
        // Arrange: the newer fetch is still in flight when the older one resolves
        let mut api = stocked_api();
        let old_gate = api.gate("old");
        let new_gate = api.gate("alien");
        let search = Arc::new(MovieSearch::new(api));

        let old_task = {
            let search = Arc::clone(&search);
            tokio::spawn(async move { search.fetch_movies("old").await })
        };
        while search.generation() < 1 {
            tokio::task::yield_now().await;
        }
        let new_task = {
            let search = Arc::clone(&search);
            tokio::spawn(async move { search.fetch_movies("alien").await })
        };
        while search.generation() < 2 {
            tokio::task::yield_now().await;
        }

        // Act
        old_gate.notify_one();
        let stale = old_task.await.unwrap();
        let mid = search.snapshot();
        new_gate.notify_one();
        let fresh = new_task.await.unwrap();

        // Assert
        assert!(matches!(stale, FetchOutcome::Superseded));
        assert!(mid.is_loading);
        assert!(matches!(fresh, FetchOutcome::Loaded));
        assert!(!search.snapshot().is_loading);
    }
}
