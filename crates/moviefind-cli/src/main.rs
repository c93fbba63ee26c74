//! moviefind - search the TMDB movie catalog from the terminal.

/// Application configuration (TOML).
mod config;
/// Tracing subscriber setup.
mod logging;
/// Terminal UI components.
mod tui;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::instrument;

use crate::config::{AppConfig, resolve_config_path};
use crate::logging::LogSink;
use crate::tui::run_movie_browser;
use moviefind_api::tmdb::TmdbClient;
use moviefind_search::{FetchOutcome, MovieSearch, MovieSummary};

/// Version string shown by `--version`.
const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (rev:", env!("GIT_HASH"), ")");

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "moviefind", about, version = APP_VERSION)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse and search movies interactively.
    Browse,
    /// Fetch one page of results and today's trending movies.
    Search(SearchArgs),
    /// Inspect or create the config file.
    Config(ConfigCommand),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query. Lists popular movies when omitted.
    query: Vec<String>,

    /// Also print poster URLs.
    #[arg(long)]
    posters: bool,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the effective configuration.
    Show,
    /// Write a default config file.
    Init(ConfigInitArgs),
}

/// Arguments for the `config init` subcommand.
#[derive(clap::Args)]
struct ConfigInitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    shell: Shell,
}

/// Builds a `TmdbClient` from the `TMDB_API_TOKEN` environment variable and config.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set, the configured base URL
/// is invalid, or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &AppConfig) -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN")
        .context("TMDB_API_TOKEN environment variable is required")?;

    let mut builder = TmdbClient::builder().api_token(api_token).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(base_url) = config.tmdb.base_url()? {
        builder = builder.base_url(base_url);
    }
    builder.build().context("failed to build TMDB client")
}

/// Loads the config file selected by `--dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(dir)?;
    AppConfig::load(&path)
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the terminal fails.
fn run_browse(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;
    run_movie_browser(MovieSearch::new(client), config.search.debounce())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;
    let search = MovieSearch::new(client);

    let query = args.query.join(" ");
    match search.fetch_movies(query.trim()).await {
        FetchOutcome::Loaded => {}
        FetchOutcome::Failed(failure) => {
            let message = failure.user_message();
            return Err(anyhow::Error::new(failure).context(message));
        }
        FetchOutcome::Superseded => bail!("fetch was superseded"),
    }

    let view = search.snapshot();

    tracing::info!("Trending today:");
    for (rank, movie) in view.trending.iter().enumerate() {
        tracing::info!("  {}. {}", rank.saturating_add(1), movie.title);
    }

    if query.trim().is_empty() {
        tracing::info!("All movies (popular):");
    } else {
        tracing::info!("Results for \"{}\":", query.trim());
    }
    tracing::info!("ID\tYear\tRating\tLang\tTitle");
    for movie in &view.movies {
        log_movie(movie, args.posters);
    }
    tracing::info!("Total: {} movies", view.movies.len());

    Ok(())
}

fn log_movie(movie: &MovieSummary, posters: bool) {
    tracing::info!(
        "{}\t{}\t{:.1}\t{}\t{}",
        movie.id,
        movie.release_year().unwrap_or("-"),
        movie.vote_average,
        movie.original_language,
        movie.title,
    );
    if posters && let Some(url) = movie.poster_url() {
        tracing::info!("\t{url}");
    }
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be resolved, read, or serialized.
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    let config = AppConfig::load(&path)?;

    if path.exists() {
        tracing::info!("Config file: {}", path.display());
    } else {
        tracing::info!("Config file: {} (not found, using defaults)", path.display());
    }
    for line in config.to_toml()?.lines() {
        tracing::info!("{line}");
    }
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file already exists (without `--force`) or cannot be written.
fn run_config_init(args: &ConfigInitArgs, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    if path.exists() && !args.force {
        bail!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    AppConfig::default().save(&path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Writes shell completions to stdout.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_owned();
    clap_complete::generate(args.shell, &mut cmd, name, &mut io::stdout());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, Commands::Browse);
    logging::init(LogSink::select(cli.log_file.as_deref(), interactive)?);

    match cli.command {
        Commands::Browse => run_browse(cli.dir.as_ref()),
        Commands::Search(args) => run_search(&args, cli.dir.as_ref()).await,
        Commands::Config(cfg) => match cfg.command {
            ConfigSubcommands::Show => run_config_show(cli.dir.as_ref()),
            ConfigSubcommands::Init(args) => run_config_init(&args, cli.dir.as_ref()),
        },
        Commands::Completions(args) => {
            run_completions(&args);
            Ok(())
        }
    }
}
