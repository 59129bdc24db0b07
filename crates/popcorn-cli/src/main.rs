use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, interactive, search, watched};
use popcorn_config::PathManager;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;
mod render;
mod ui;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "Popcorn - search movies and keep a rated list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr. Interactive mode always logs to a file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search titles by name
    #[command(long_about = "Search the movie database by title. Queries shorter than the configured minimum (3 characters by default) are not sent.")]
    Search {
        /// Title to search for
        query: String,
    },
    /// Show details for one title
    Show {
        /// IMDb id, e.g. tt0372784
        imdb_id: String,
    },
    /// Add a title to your watched list with your rating
    Add {
        /// IMDb id, e.g. tt0372784
        imdb_id: String,

        /// Your rating, 1-10 (prompted for when omitted)
        #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: Option<u8>,
    },
    /// Remove a title from your watched list
    Remove {
        /// IMDb id of the entry to remove
        imdb_id: String,
    },
    /// List watched titles with a summary
    List,
    /// Show watched-list statistics only
    Summary,
    /// Search as you type: every line is a new query
    #[command(long_about = "Interactive mode. Each line you enter replaces the current query; a search still in flight is cancelled. Lines starting with ':' are commands, see ':help'.")]
    Interactive,
    /// View or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Delete stored data
    Clear {
        /// Delete the watched list
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,

        /// Delete the stored API key
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,

        /// Don't ask for confirmation
        #[arg(long, short, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the OMDb API key
    #[command(long_about = "Store the OMDb API key in the credentials file. The POPCORN_API_KEY environment variable takes precedence when set.")]
    ApiKey {
        /// API key (prompted for when omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// Change settings
    Set {
        /// Base URL of the OMDb-compatible API
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Shortest query that is sent to the API
        #[arg(long)]
        min_query_len: Option<usize>,

        /// Delay before a search is sent, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

/// Interactive mode owns the terminal, so without `--log-file` it logs to the default log file.
fn log_target(command: &Commands, explicit: Option<PathBuf>, paths: &PathManager) -> Option<PathBuf> {
    match (command, explicit) {
        (_, Some(path)) => Some(path),
        (Commands::Interactive, None) => Some(paths.log_file()),
        (_, None) => None,
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = log_target(&cli.command, cli.log_file, &PathManager::default());
    logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(&query, &output).await,
        Commands::Show { imdb_id } => search::run_show(&imdb_id, &output).await,
        Commands::Add { imdb_id, rating } => watched::run_add(&imdb_id, rating, &output).await,
        Commands::Remove { imdb_id } => watched::run_remove(&imdb_id, &output),
        Commands::List => watched::run_list(&output),
        Commands::Summary => watched::run_summary(&output),
        Commands::Interactive => interactive::run_interactive(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
        Commands::Clear { watched, credentials, yes } => clear::run_clear(watched, credentials, yes, &output),
    }
}
