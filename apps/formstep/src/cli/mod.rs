//! # formstep CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `list` - List saved applications
//! - `show` - Show one saved application
//! - `apply` - Fill in a new application in the terminal
//! - `edit` - Re-open a saved application in the terminal

mod commands;
mod wizard;

use crate::config::{FileConfig, Overrides, Settings};
use clap::{Parser, Subcommand};
use formstep_core::{Account, WizardError};
use std::path::PathBuf;

pub use commands::*;
pub use wizard::{WizardExit, run_terminal_wizard};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// formstep - multi-step application wizard
///
/// Collects personal and contact details over several steps, shows a review
/// and saves the application once on submit.
#[derive(Parser, Debug)]
#[command(name = "formstep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the database [default: formstep.db]
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "file" (snapshot file) or "redb" (ACID database) [default: redb]
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Config file [default: ./formstep.toml if present]
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to [default: 127.0.0.1]
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to [default: 8080]
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// List saved applications
    List,

    /// Show a saved application
    Show {
        /// Application id
        #[arg(long)]
        id: u64,
    },

    /// Fill in a new application in the terminal
    Apply {
        #[command(flatten)]
        user: UserArgs,
    },

    /// Re-open a saved application in the terminal (starts on review)
    Edit {
        /// Application id
        #[arg(long)]
        id: u64,

        #[command(flatten)]
        user: UserArgs,
    },
}

/// The acting user for terminal submissions.
#[derive(clap::Args, Debug, Clone)]
pub struct UserArgs {
    /// Numeric user id recorded as owner
    #[arg(long, default_value = "0")]
    pub user_id: u64,

    /// Display name, used as the title of new applications
    #[arg(long, default_value = "anonymous")]
    pub user_name: String,
}

impl UserArgs {
    pub fn account(&self) -> Account {
        Account::new(self.user_id, self.user_name.clone())
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve settings for the parsed arguments.
pub fn settings_for(cli: &Cli) -> Result<Settings, WizardError> {
    let file = FileConfig::discover(cli.config.as_deref())?;

    let (host, port) = match &cli.command {
        Some(Commands::Server { host, port }) => (host.clone(), *port),
        _ => (None, None),
    };
    let overrides = Overrides {
        database: cli.database.clone(),
        backend: cli.backend.clone(),
        host,
        port,
    };

    Settings::resolve(&overrides, &file)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), WizardError> {
    let settings = settings_for(&cli)?;
    let json_mode = cli.json_mode;

    if cli.verbose {
        tracing::info!(
            database = %settings.database.display(),
            backend = %settings.backend,
            "Resolved settings"
        );
    }

    match cli.command {
        Some(Commands::Server { .. }) => cmd_server(&settings).await,
        Some(Commands::Init { force }) => cmd_init(&settings, force),
        Some(Commands::List) | None => cmd_list(&settings, json_mode),
        Some(Commands::Show { id }) => cmd_show(&settings, json_mode, id),
        Some(Commands::Apply { user }) => cmd_apply(&settings, json_mode, &user.account()),
        Some(Commands::Edit { id, user }) => cmd_edit(&settings, json_mode, id, &user.account()),
    }
}
