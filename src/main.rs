//! Binary entry point for gasledger.
//!
//! This binary provides the CLI interface for the gasledger client registry.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{BrowseAction, FilterArgs, SessionAction};
use gasledger::config::RegistryConfig;
use gasledger::observability::{self, InitOptions};
use gasledger::{ClientRegistry, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Gasledger - a local subscriber registry for gas-utility operators.
#[derive(Parser)]
#[command(name = "gasledger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "GASLEDGER_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Data directory (database and session file).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a client.
    Add {
        /// Account number.
        account_number: String,

        /// Full name.
        full_name: String,

        /// Further fields as "LABEL=VALUE" using column labels (repeatable).
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Change fields of a client.
    Update {
        /// Client id.
        id: i64,

        /// Fields as "LABEL=VALUE" using column labels (repeatable).
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Delete a client.
    Delete {
        /// Client id.
        id: i64,
    },

    /// Show one client.
    Get {
        /// Client id.
        id: i64,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List clients in id order.
    List {
        /// Page number, starting at 1.
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Records per page (default from config).
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Count clients.
    Count,

    /// Search clients.
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page number, starting at 1.
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Records per page (default from config).
        #[arg(long)]
        page_size: Option<usize>,

        /// Read search terms from stdin, one per line, with debouncing.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Show filter options for an address selection.
    Facets {
        /// Selected settlement (repeatable).
        #[arg(long = "settlement")]
        settlements: Vec<String>,

        /// Selected street (repeatable).
        #[arg(long = "street")]
        streets: Vec<String>,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Browse clients page by page, resuming across invocations.
    Browse {
        #[command(subcommand)]
        action: BrowseAction,
    },

    /// Import clients from an Excel, CSV or JSON-lines file.
    Import {
        /// Input file.
        file: PathBuf,

        /// File format (default: from extension).
        #[arg(long)]
        format: Option<String>,

        /// Validate without storing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Export clients to an Excel, CSV or JSON-lines file.
    Export {
        /// Output file (default: Абоненти_<date>.xlsx).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File format (default: from extension).
        #[arg(long)]
        format: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write the import template.
    Template {
        /// Output file (default: Шаблон_Абоненти.xlsx).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage saved session state.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl Commands {
    /// Action name used in failure messages.
    const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Get { .. } => "get",
            Self::List { .. } => "list",
            Self::Count => "count",
            Self::Search { .. } => "search",
            Self::Facets { .. } => "facets",
            Self::Browse { .. } => "browse",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::Template { .. } => "template",
            Self::Session { .. } => "session",
            Self::Config { .. } => "config",
            Self::Completions { .. } => "completions",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    let config = match &cli.data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    };

    if let Err(e) =
        observability::init_from_config(&config.logging, InitOptions { verbose: cli.verbose })
    {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let action = cli.command.name();
    match run_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(action, error = %e, "command failed");
            eprintln!("{action} failed: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(cli: Cli, config: RegistryConfig) -> Result<()> {
    let open = || ClientRegistry::open(config.db_path());
    let page_size_or = |size: Option<usize>| size.unwrap_or(config.page_size);

    match cli.command {
        Commands::Add {
            account_number,
            full_name,
            fields,
        } => commands::cmd_add(&open()?, account_number, full_name, &fields),
        Commands::Update { id, fields } => commands::cmd_update(&open()?, id, &fields),
        Commands::Delete { id } => commands::cmd_delete(&open()?, id),
        Commands::Get { id, json } => commands::cmd_get(&open()?, id, json),
        Commands::List { page, page_size } => {
            commands::cmd_list(&open()?, page.saturating_sub(1), page_size_or(page_size))
        },
        Commands::Count => commands::cmd_count(&open()?),
        Commands::Search {
            filters,
            page,
            page_size,
            interactive,
        } => {
            let registry = open()?;
            if interactive {
                commands::cmd_search_interactive(
                    &registry,
                    &filters,
                    page_size_or(page_size),
                    config.search_debounce(),
                )
                .await
            } else {
                commands::cmd_search(
                    &registry,
                    &filters,
                    page.saturating_sub(1),
                    page_size_or(page_size),
                )
            }
        },
        Commands::Facets {
            settlements,
            streets,
            json,
        } => commands::cmd_facets(&open()?, settlements, streets, json),
        Commands::Browse { action } => commands::cmd_browse(&open()?, &config, action),
        Commands::Import {
            file,
            format,
            dry_run,
        } => commands::cmd_import(&open()?, file, format, dry_run),
        Commands::Export {
            output,
            format,
            filters,
        } => commands::cmd_export(&open()?, output, format, &filters),
        Commands::Template { output } => commands::cmd_template(output),
        Commands::Session { action } => commands::cmd_session(&config, &action),
        Commands::Config { show } => commands::cmd_config(&config, show),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "gasledger",
                &mut std::io::stdout(),
            );
            Ok(())
        },
    }
}

/// Loads configuration: an explicit file, else the default location, then
/// environment overrides.
fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    let config = match path {
        Some(config_path) => RegistryConfig::load_from_file(config_path)?,
        None => RegistryConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}
