//! Place Picker - CLI entry point
//!
//! Drives a picker session against a fixture file of places, and manages
//! the configuration file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

use place_picker::config::{default, xdg, Config, ConfigError, ConfigLoader};
use place_picker::services::fixture::FixtureError;
use place_picker::services::FixtureServices;
use place_picker::{
    logging, ConfirmedSelection, OpenRequest, PickerSettings, PlacePicker, PlaceSuggestion,
    SessionEvent,
};

/// Place resolution session driver
#[derive(Parser)]
#[command(name = "place-picker")]
#[command(version, about = "Resolve a place the way the picker does")]
struct Cli {
    /// Configuration file (defaults to the XDG location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the place-picker CLI
#[derive(Subcommand)]
enum Commands {
    /// Print suggestions for a query as JSON
    Search {
        /// Search text
        query: String,
        /// Fixture file with places and device location
        #[arg(long)]
        places: PathBuf,
    },

    /// Select a suggestion and print the confirmed place as JSON
    Pick {
        /// Search text
        query: String,
        /// Fixture file with places and device location
        #[arg(long)]
        places: PathBuf,
        /// Zero-based index into the suggestions
        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Pin the device location and print the confirmed place as JSON
    Locate {
        /// Fixture file with places and device location
        #[arg(long)]
        places: PathBuf,
    },

    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions for the `config` subcommand.
#[derive(Subcommand)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration file
    Validate,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("search failed: {0}")]
    Search(String),

    #[error("no suggestion at index {index} for {query:?} ({count} found)")]
    NoSuggestion {
        query: String,
        index: usize,
        count: usize,
    },

    #[error("location unavailable: {0}")]
    Location(String),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Confirmed place plus the display label of its website.
#[derive(Serialize)]
struct PickOutput {
    #[serde(flatten)]
    selection: ConfirmedSelection,
    website_label: Option<String>,
}

/// Session work for one invocation, once the fixture path is split off.
enum Task {
    Search { query: String },
    Pick { query: String, index: usize },
    Locate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();

    let result = match cli.command {
        Commands::Config { action } => run_config_command(action, explicit),
        Commands::Search { query, places } => run_task(explicit, &places, Task::Search { query }),
        Commands::Pick {
            query,
            places,
            index,
        } => run_task(explicit, &places, Task::Pick { query, index }),
        Commands::Locate { places } => run_task(explicit, &places, Task::Locate),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_config_command(action: ConfigAction, explicit: Option<&Path>) -> Result<(), CliError> {
    let path = explicit.map_or_else(xdg::config_path, Path::to_path_buf);
    match action {
        ConfigAction::Init { force } => {
            default::create_default_config_at(&path, force)?;
            println!("Created configuration at {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Validate => {
            let config = ConfigLoader::load(explicit)?;
            config.picker_settings()?;
            println!("Configuration is valid");
            println!("{config:#?}");
        }
    }
    Ok(())
}

fn run_task(explicit: Option<&Path>, places: &Path, task: Task) -> Result<(), CliError> {
    let config: Config = ConfigLoader::load(explicit)?;
    logging::init(config.logging.level);
    let settings = config.picker_settings()?;
    let services = FixtureServices::load(places)?;

    let rt = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    rt.block_on(async move {
        let picker = open_picker(services, settings).await;
        match task {
            Task::Search { query } => {
                let suggestions = run_search(&picker, &query).await?;
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            }
            Task::Pick { query, index } => {
                let suggestions = run_search(&picker, &query).await?;
                let count = suggestions.len();
                let chosen = suggestions
                    .into_iter()
                    .nth(index)
                    .ok_or(CliError::NoSuggestion {
                        query,
                        index,
                        count,
                    })?;
                // A join error only means the task panicked; the session is still readable.
                let _ = picker.select_suggestion(chosen).await;
                print_confirmed(&picker)?;
            }
            Task::Locate => {
                let _ = picker.use_current_location().await;
                let session = picker.snapshot();
                let point = session.current_location_coordinates.ok_or_else(|| {
                    CliError::Location(
                        session
                            .location_status_message
                            .unwrap_or_else(|| "no fix".to_string()),
                    )
                })?;
                let _ = picker.place_pin(point).await;
                print_confirmed(&picker)?;
            }
        }
        Ok::<(), CliError>(())
    })
}

async fn open_picker(services: FixtureServices, settings: PickerSettings) -> PlacePicker {
    let origin = settings.default_location;
    let picker = PlacePicker::new(Arc::new(services), settings);
    if let Some(init) = picker.open(OpenRequest::at(origin)) {
        let _ = init.await;
    }
    picker
}

/// Sets the query and waits for the debounced search to settle.
async fn run_search(picker: &PlacePicker, query: &str) -> Result<Vec<PlaceSuggestion>, CliError> {
    if let Some(banner) = picker.capability_banner() {
        return Err(CliError::SearchUnavailable(banner.to_string()));
    }
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut rx = picker.subscribe();
    picker.set_search_query(query);
    loop {
        match rx.recv().await {
            Ok(SessionEvent::SuggestionsLoaded { .. }) => return Ok(picker.snapshot().suggestions),
            Ok(SessionEvent::SearchFailed { .. }) | Ok(SessionEvent::CapabilityDowngraded(_)) => {
                let message = picker
                    .snapshot()
                    .search_error_message
                    .unwrap_or_else(|| "unknown error".to_string());
                return Err(CliError::Search(message));
            }
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => {
                return Err(CliError::Search("session closed".to_string()));
            }
        }
    }
}

fn print_confirmed(picker: &PlacePicker) -> Result<(), CliError> {
    let output = PickOutput {
        selection: picker.confirm(),
        website_label: picker.website_label(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
