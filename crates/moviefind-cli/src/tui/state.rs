//! Movie browser TUI state management.

use std::time::{Duration, Instant};

use moviefind_search::{Debouncer, MovieSummary, ViewState};
use ratatui::widgets::TableState;

/// Braille spinner frames shown while a fetch is in flight.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Currently focused pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    /// Search results / popular movies.
    Movies,
    /// Trending strip.
    Trending,
}

/// State for the movie browser TUI.
#[allow(clippy::module_name_repetitions)]
pub struct BrowserState {
    /// Raw search input, updated on every keystroke.
    pub search_term: String,
    /// Debounce gate between `search_term` and the fetch orchestrator.
    pub debouncer: Debouncer<String>,
    /// Latest view state published by the orchestrator.
    pub view: ViewState,
    /// Currently focused pane.
    pub active_pane: ActivePane,
    /// Table state for the movie list.
    pub movie_table_state: TableState,
    /// Table state for the trending strip.
    pub trending_table_state: TableState,
    /// Spinner animation counter.
    spinner_tick: usize,
}

impl BrowserState {
    /// Creates an empty browser with the given debounce window.
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            search_term: String::new(),
            debouncer: Debouncer::new(debounce, String::new()),
            view: ViewState::default(),
            active_pane: ActivePane::Movies,
            movie_table_state: TableState::default(),
            trending_table_state: TableState::default(),
            spinner_tick: 0,
        }
    }

    /// Appends a character to the search term.
    pub fn input_push(&mut self, ch: char, now: Instant) {
        self.search_term.push(ch);
        self.debouncer.arm(self.search_term.clone(), now);
    }

    /// Removes the last character from the search term.
    pub fn input_pop(&mut self, now: Instant) {
        if self.search_term.pop().is_some() {
            self.debouncer.arm(self.search_term.clone(), now);
        }
    }

    /// Clears the search term.
    pub fn input_clear(&mut self, now: Instant) {
        if !self.search_term.is_empty() {
            self.search_term.clear();
            self.debouncer.arm(String::new(), now);
        }
    }

    /// Returns the query to fetch if the debounce window elapsed on a new term.
    pub fn take_settled_query(&mut self, now: Instant) -> Option<String> {
        self.debouncer.fire(now).cloned()
    }

    /// Returns how long the event loop may block before the next redraw.
    #[must_use]
    pub fn poll_timeout(&self, now: Instant, tick: Duration) -> Duration {
        self.debouncer
            .time_until_fire(now)
            .map_or(tick, |wait| wait.min(tick))
    }

    /// Replaces the rendered view state and keeps both cursors in range.
    pub fn update_view(&mut self, view: ViewState) {
        self.view = view;
        clamp_selection(&mut self.movie_table_state, self.view.movies.len());
        clamp_selection(&mut self.trending_table_state, self.view.trending.len());
    }

    /// Moves cursor up.
    pub fn move_up(&mut self) {
        let table = self.active_table_mut();
        if let Some(current) = table.selected() {
            table.select(Some(current.saturating_sub(1)));
        }
    }

    /// Moves cursor down.
    pub fn move_down(&mut self) {
        let len = self.active_len();
        let table = self.active_table_mut();
        let next = table.selected().map_or(0, |current| current.saturating_add(1));
        if next < len {
            table.select(Some(next));
        }
    }

    /// Toggles focus between the movie list and the trending strip.
    pub fn switch_pane(&mut self) {
        self.active_pane = match self.active_pane {
            ActivePane::Movies => ActivePane::Trending,
            ActivePane::Trending => ActivePane::Movies,
        };
        let len = self.active_len();
        let table = self.active_table_mut();
        if table.selected().is_none() && len > 0 {
            table.select(Some(0));
        }
    }

    /// Returns the movie under the cursor in the focused pane.
    #[must_use]
    pub fn selected_movie(&self) -> Option<&MovieSummary> {
        let (movies, table) = match self.active_pane {
            ActivePane::Movies => (&self.view.movies, &self.movie_table_state),
            ActivePane::Trending => (&self.view.trending, &self.trending_table_state),
        };
        table.selected().and_then(|i| movies.get(i))
    }

    /// Advances the loading spinner.
    pub const fn tick(&mut self) {
        self.spinner_tick = self.spinner_tick.wrapping_add(1);
    }

    /// Returns the current spinner frame.
    #[must_use]
    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES
            .get(self.spinner_tick.checked_rem(SPINNER_FRAMES.len()).unwrap_or(0))
            .copied()
            .unwrap_or(" ")
    }

    fn active_len(&self) -> usize {
        match self.active_pane {
            ActivePane::Movies => self.view.movies.len(),
            ActivePane::Trending => self.view.trending.len(),
        }
    }

    const fn active_table_mut(&mut self) -> &mut TableState {
        match self.active_pane {
            ActivePane::Movies => &mut self.movie_table_state,
            ActivePane::Trending => &mut self.trending_table_state,
        }
    }
}

/// Selects the first row of a non-empty list, or nothing for an empty one.
fn clamp_selection(table: &mut TableState, len: usize) {
    let Some(last) = len.checked_sub(1) else {
        table.select(None);
        return;
    };
    let current = table.selected().unwrap_or(0);
    table.select(Some(current.min(last)));
}
