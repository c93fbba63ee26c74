//! Search-to-fetch data flow for moviefind.
//!
//! Keystrokes pass through a [`debounce::Debouncer`]; every settled query is
//! handed to [`orchestrator::MovieSearch`], which issues the movie list and
//! trending requests concurrently and publishes the merged [`state::ViewState`].

/// Trailing-edge debounce gate.
pub mod debounce;
/// Fetch orchestrator.
pub mod orchestrator;
/// View state published to the UI.
pub mod state;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use orchestrator::{FetchFailure, FetchOutcome, MovieSearch, PrimaryEndpoint};
pub use state::{FALLBACK_ERROR_MESSAGE, MovieSummary, TRENDING_LIMIT, ViewState};
