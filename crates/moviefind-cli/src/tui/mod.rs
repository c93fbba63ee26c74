//! Movie browser TUI main loop.

/// Movie browser state types.
pub mod state;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use moviefind_api::tmdb::TmdbApi;
use moviefind_search::{MovieSearch, ViewState};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use self::state::BrowserState;

/// Redraw interval while idle.
const TICK: Duration = Duration::from_millis(100);

/// Fetch tasks spawned by the browser. Aborted when dropped.
struct FetchTasks<A> {
    search: Arc<MovieSearch<A>>,
    handles: Vec<JoinHandle<()>>,
}

impl<A> FetchTasks<A>
where
    A: TmdbApi + Send + Sync + 'static,
{
    const fn new(search: Arc<MovieSearch<A>>) -> Self {
        Self {
            search,
            handles: Vec::new(),
        }
    }

    /// Starts a fetch for `query` on the runtime.
    fn dispatch(&mut self, query: String) {
        self.handles.retain(|handle| !handle.is_finished());
        let search = Arc::clone(&self.search);
        self.handles.push(tokio::spawn(async move {
            search.fetch_movies(&query).await;
        }));
    }
}

impl<A> Drop for FetchTasks<A> {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

/// Runs the movie browser TUI.
///
/// Must be called from within a multi-threaded Tokio runtime; fetches run
/// on worker threads while this thread blocks on terminal input.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
#[allow(clippy::module_name_repetitions)]
pub fn run_movie_browser<A>(search: MovieSearch<A>, debounce: Duration) -> Result<()>
where
    A: TmdbApi + Send + Sync + 'static,
{
    let search = Arc::new(search);
    let mut updates = search.subscribe();
    let mut tasks = FetchTasks::new(search);
    let mut state = BrowserState::new(debounce);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Initial load: popular movies plus trending.
    tasks.dispatch(String::new());

    let result = run_event_loop(&mut terminal, &mut state, &mut tasks, &mut updates);

    drop(tasks);

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
fn run_event_loop<A>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut BrowserState,
    tasks: &mut FetchTasks<A>,
    updates: &mut watch::Receiver<ViewState>,
) -> Result<()>
where
    A: TmdbApi + Send + Sync + 'static,
{
    loop {
        if updates.has_changed().unwrap_or(false) {
            let view = updates.borrow_and_update().clone();
            state.update_view(view);
        }
        if state.view.is_loading {
            state.tick();
        }

        terminal
            .draw(|frame| ui::draw(frame, state))
            .context("failed to draw TUI")?;

        let timeout = state.poll_timeout(Instant::now(), TICK);
        if event::poll(timeout).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
            && handle_input(state, key.code, key.modifiers, Instant::now())
        {
            return Ok(());
        }

        if let Some(query) = state.take_settled_query(Instant::now()) {
            tracing::debug!(%query, "dispatching search");
            tasks.dispatch(query);
        }
    }
}

/// Handles a key press. Returns `true` to exit.
fn handle_input(
    state: &mut BrowserState,
    key: KeyCode,
    modifiers: KeyModifiers,
    now: Instant,
) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match key {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Char('u') if ctrl => state.input_clear(now),
        KeyCode::Char(c) if !ctrl => state.input_push(c, now),
        KeyCode::Backspace => state.input_pop(now),
        KeyCode::Up => state.move_up(),
        KeyCode::Down => state.move_down(),
        KeyCode::Tab | KeyCode::BackTab => state.switch_pane(),
        KeyCode::Enter => open_movie_page(state),
        _ => {}
    }
    false
}

/// Opens the TMDB page of the selected movie in the default browser.
fn open_movie_page(state: &BrowserState) {
    let Some(movie) = state.selected_movie() else {
        return;
    };
    let url = movie.page_url();
    if let Err(err) = open::that(&url) {
        tracing::warn!(%url, error = %err, "failed to open browser");
    }
}
