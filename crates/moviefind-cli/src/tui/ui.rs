//! TUI rendering logic for the movie browser.

use moviefind_search::MovieSummary;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Wrap};

use super::state::{ActivePane, BrowserState};

/// Placeholder for missing cells.
const MISSING: &str = "--";

/// Draws the movie browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &mut BrowserState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search input
            Constraint::Length(8), // trending strip (5 rows + header + borders)
            Constraint::Min(5),    // movie list
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_search(frame, chunks[0], state);
    draw_trending(frame, chunks[1], state);
    draw_movies(frame, chunks[2], state);
    draw_footer(frame, chunks[3], state);
}

fn pane_border(state: &BrowserState, pane: ActivePane) -> Style {
    if state.active_pane == pane {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Draws the search input box.
fn draw_search(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let title = if state.debouncer.is_armed() {
        " Search movies (typing...) "
    } else {
        " Search movies "
    };
    let input = Line::from(vec![
        Span::raw(state.search_term.as_str()),
        Span::styled("\u{2588}", Style::default().fg(Color::DarkGray)),
    ]);
    let search = Paragraph::new(input)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(search, area);
}

/// Draws the ranked trending strip.
fn draw_trending(frame: &mut Frame, area: Rect, state: &mut BrowserState) {
    let rows: Vec<Row> = state
        .view
        .trending
        .iter()
        .enumerate()
        .map(|(rank, movie)| {
            Row::new(vec![
                rank.saturating_add(1).to_string(),
                movie.title.clone(),
                movie.release_year().unwrap_or(MISSING).to_owned(),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["#", "Title", "Year"]).style(header_style()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Trending Today ")
                .border_style(pane_border(state, ActivePane::Trending)),
        )
        .row_highlight_style(highlight_style());

    frame.render_stateful_widget(table, area, &mut state.trending_table_state);
}

/// Draws the movie list, or the loading/error line in its place.
fn draw_movies(frame: &mut Frame, area: Rect, state: &mut BrowserState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(movies_title(state))
        .border_style(pane_border(state, ActivePane::Movies));

    if state.view.is_loading {
        let line = Line::from(format!("{} Loading...", state.spinner()));
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    if let Some(message) = &state.view.error_message {
        let error = Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(error, area);
        return;
    }

    if state.view.movies.is_empty() {
        let empty = Paragraph::new("No movies found.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = state.view.movies.iter().map(movie_row).collect();

    let widths = [
        Constraint::Min(20),   // Title
        Constraint::Length(6), // Year
        Constraint::Length(6), // Rating
        Constraint::Length(5), // Lang
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Title", "Year", "Rating", "Lang"])
                .style(header_style())
                .bottom_margin(1),
        )
        .block(block)
        .row_highlight_style(highlight_style());

    frame.render_stateful_widget(table, area, &mut state.movie_table_state);
}

fn movies_title(state: &BrowserState) -> String {
    let settled = state.debouncer.settled();
    if settled.is_empty() {
        format!(" All Movies ({}) ", state.view.movies.len())
    } else {
        format!(" Results for \"{settled}\" ({}) ", state.view.movies.len())
    }
}

fn movie_row(movie: &MovieSummary) -> Row<'static> {
    let rating = if movie.vote_count == 0 {
        String::from(MISSING)
    } else {
        format!("{:.1}", movie.vote_average)
    };
    let lang = if movie.original_language.is_empty() {
        String::from(MISSING)
    } else {
        movie.original_language.clone()
    };
    Row::new(vec![
        movie.title.clone(),
        movie.release_year().unwrap_or(MISSING).to_owned(),
        rating,
        lang,
    ])
}

/// Draws the footer with key hints and the selected poster URL.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let mut spans = vec![Span::raw(
        "Type: search  \u{2191}\u{2193}: move  Tab: pane  Enter: open  Ctrl-U: clear  Esc: quit",
    )];
    if let Some(poster) = state.selected_movie().and_then(MovieSummary::poster_url) {
        spans.push(Span::styled(
            format!("  {poster}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
