//! boardwatch - Trello board activity dashboard for the terminal

mod cli;

use anyhow::{Context, Result};
use boardwatch_core::activity::ActivityView;
use boardwatch_core::models::{ActivityFilter, BoardId};
use boardwatch_core::{
    CacheStatus, DashboardConfig, DashboardStateMachine, DashboardSync, HttpFetchPort,
    PersistenceAdapter, StateEvent,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "boardwatch",
    version,
    about = "Trello board activity dashboard for the terminal",
    long_about = "Tracks a set of Trello boards through a caching backend.\n\
                  \n\
                  Examples:\n\
                    boardwatch add https://trello.com/b/nC8QJJoZ/roadmap   # Track a board\n\
                    boardwatch boards --force                          # Bypass the backend cache\n\
                    boardwatch activity --board nC8QJJoZ --page 2      # Filtered timeline\n\
                    boardwatch cache                                   # Cache freshness\n\
                  \n\
                  Environment Variables:\n\
                    BOARDWATCH_API_URL               # Backend base URL\n\
                    BOARDWATCH_STATE_DIR             # Where selection and filter are stored\n\
                    BOARDWATCH_CONFIG                # Config file (TOML)\n\
                    BOARDWATCH_LOG                   # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Backend base URL (default: http://localhost:5000/api)
    #[arg(long, env = "BOARDWATCH_API_URL")]
    api_url: Option<String>,

    /// Directory holding the persisted selection and filter
    #[arg(long, env = "BOARDWATCH_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Config file path (default: <config dir>/boardwatch/config.toml)
    #[arg(long, env = "BOARDWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "BOARDWATCH_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Track a board by id or URL
    Add {
        /// Board id or board URL
        input: String,
    },
    /// Stop tracking a board
    Remove {
        /// Board id
        board_id: String,
    },
    /// Stop tracking every board
    Clear,
    /// List tracked boards
    List,
    /// Fetch and show board summaries
    Boards {
        /// Only show boards whose name contains this term
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Bypass the backend cache
        #[arg(long)]
        force: bool,
        /// Also show the first N cards of every list
        #[arg(long, value_name = "N")]
        cards: Option<usize>,
    },
    /// Show the activity timeline
    Activity {
        /// Board id to filter on, or "all"
        #[arg(long, short = 'b')]
        board: Option<String>,
        /// Page number (1-based)
        #[arg(long, short = 'p', default_value = "1")]
        page: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show backend cache freshness
    Cache,
    /// Clear the backend cache
    ClearCache {
        /// Only clear this board
        #[arg(long)]
        board: Option<String>,
    },
    /// Check that the backend is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("BOARDWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let no_color = cli.no_color;
    let mut sync = build_sync(&config)?;

    match cli.mode {
        Mode::Add { input } => run_add(&mut sync, &input, no_color).await?,
        Mode::Remove { board_id } => run_remove(&mut sync, board_id)?,
        Mode::Clear => {
            sync.clear_boards();
            println!("Cleared all tracked boards.");
        }
        Mode::List => println!("{}", cli::format_selection(&sync.state())),
        Mode::Boards {
            search,
            force,
            cards,
        } => run_boards(&mut sync, search, force, cards, no_color).await?,
        Mode::Activity { board, page, json } => {
            run_activity(&mut sync, &config, board, page, json, no_color).await?
        }
        Mode::Cache => run_cache(&mut sync, no_color).await?,
        Mode::ClearCache { board } => {
            let board = board.map(BoardId::from);
            sync.clear_cache(board.clone())
                .await
                .context("Failed to clear cache")?;
            match board {
                Some(id) => println!("Cleared cache for board {}.", id),
                None => println!("Cleared cache for all boards."),
            }
        }
        Mode::Health => {
            sync.health_check()
                .await
                .with_context(|| format!("Backend unreachable at {}", config.api_base_url))?;
            println!("Backend healthy at {}", config.api_base_url);
        }
    }

    Ok(())
}

/// Config file first, then CLI flags and environment on top
fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match cli.config.clone().or_else(DashboardConfig::default_path) {
        Some(path) => DashboardConfig::load_or_default(&path)?,
        None => DashboardConfig::default(),
    };

    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(dir) = &cli.state_dir {
        config.state_dir = Some(dir.clone());
    }

    Ok(config)
}

fn build_sync(config: &DashboardConfig) -> Result<DashboardSync<HttpFetchPort>> {
    let state_dir = config
        .resolved_state_dir()
        .context("Could not determine state directory")?;
    tracing::debug!(state_dir = %state_dir.display(), api = %config.api_base_url, "Starting");

    let machine = DashboardStateMachine::rehydrate(PersistenceAdapter::file(state_dir), config);
    let port = HttpFetchPort::new(config).context("Failed to create HTTP client")?;

    Ok(DashboardSync::new(machine, Arc::new(port)))
}

async fn run_add(sync: &mut DashboardSync<HttpFetchPort>, input: &str, no_color: bool) -> Result<()> {
    let before = sync.state().selected_board_ids.len();
    let state = sync.add_board_input(input)?;

    if state.selected_board_ids.len() == before {
        println!("Board already tracked.");
        return Ok(());
    }

    sync.settle().await;
    let state = sync.state();
    if let Some(error) = &state.error {
        eprintln!("Board added, but {}", error.to_lowercase());
    }
    println!("{}", cli::format_boards(&state.visible_boards(), no_color));
    Ok(())
}

fn run_remove(sync: &mut DashboardSync<HttpFetchPort>, board_id: String) -> Result<()> {
    let id = BoardId::from(board_id.trim());
    if !sync.state().selected_board_ids.contains(&id) {
        anyhow::bail!("Board {} is not tracked", id);
    }

    sync.remove_board(id.clone());
    println!("Stopped tracking board {}.", id);
    Ok(())
}

async fn run_boards(
    sync: &mut DashboardSync<HttpFetchPort>,
    search: Option<String>,
    force: bool,
    cards: Option<usize>,
    no_color: bool,
) -> Result<()> {
    if sync.state().selected_board_ids.is_empty() {
        println!("No boards tracked. Add one with `boardwatch add <board id or URL>`.");
        return Ok(());
    }

    sync.request_refresh(force);
    sync.settle().await;
    if let Some(term) = search {
        sync.dispatch(StateEvent::SearchTermChanged(term));
    }

    let state = sync.state();
    if let Some(error) = &state.error {
        anyhow::bail!("{}", error);
    }

    let visible = state.visible_boards();
    println!("{}", cli::format_boards(&visible, no_color));
    if let Some(per_list) = cards {
        println!("{}", cli::format_card_preview(&visible, per_list));
    }
    if let Some(status) = CacheStatus::from_state(&state) {
        println!("{}", cli::format_cache_headline(&status));
    }
    Ok(())
}

async fn run_activity(
    sync: &mut DashboardSync<HttpFetchPort>,
    config: &DashboardConfig,
    board: Option<String>,
    page: usize,
    json: bool,
    no_color: bool,
) -> Result<()> {
    if sync.state().selected_board_ids.is_empty() {
        println!("No boards tracked. Add one with `boardwatch add <board id or URL>`.");
        return Ok(());
    }

    if let Some(raw) = board {
        let requested: ActivityFilter = raw.trim().parse()?;
        let state = sync.dispatch(StateEvent::FilterChanged(requested.clone()));
        if state.activity_filter != requested {
            anyhow::bail!("Board {} is not tracked", requested);
        }
    }

    sync.request_refresh(false);
    sync.settle().await;
    let state = sync.dispatch(StateEvent::PageSet(page));

    let view = ActivityView::derive(&state, config.max_visible_pages);
    if !json {
        println!("{}", cli::format_filter_counts(&state));
    }
    println!("{}", cli::format_activity(&view, json, no_color));
    Ok(())
}

async fn run_cache(sync: &mut DashboardSync<HttpFetchPort>, no_color: bool) -> Result<()> {
    let state = sync
        .refresh_cache_info()
        .await
        .context("Failed to fetch cache info")?;

    match CacheStatus::from_state(&state) {
        Some(status) => println!("{}", cli::format_cache_status(&status, no_color)),
        None => println!("Backend cache is empty."),
    }
    Ok(())
}
