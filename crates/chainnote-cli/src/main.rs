//! chainnote: operator command line for the chainnote data layer.
//!
//! Every subcommand prints its result as pretty JSON on stdout. Logs go to
//! stderr (or `LOG_FILE`).

mod commands;
mod config;
mod logging;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use chainnote_db::WalletNetwork;

use crate::config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "chainnote")]
#[command(author, version, about = "Notes, notebooks, tags, and wallet links over PostgreSQL")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Acting user id; scopes notes, notebooks, and tags
    #[arg(short, long, global = true, env = "CHAINNOTE_USER_ID")]
    pub user: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the detected shape of the notes table
    Schema,

    /// Apply the bundled migrations
    Migrate,

    /// Manage notes
    #[command(subcommand)]
    Notes(NoteCommand),

    /// Manage notebooks
    #[command(subcommand)]
    Notebooks(NotebookCommand),

    /// Manage tags
    #[command(subcommand)]
    Tags(TagCommand),

    /// Manage users and linked wallets
    #[command(subcommand)]
    Users(UserCommand),
}

/// Optional chain annotation flags shared by create and update.
#[derive(Args, Debug, Default)]
pub struct ChainArgs {
    /// Transaction hash
    #[arg(long)]
    pub tx_hash: Option<String>,

    /// Transaction status (e.g. pending, confirmed)
    #[arg(long)]
    pub tx_status: Option<String>,

    /// Cardano address the transaction involves
    #[arg(long)]
    pub cardano_address: Option<String>,

    /// Action recorded on chain
    #[arg(long)]
    pub chain_action: Option<String>,

    /// Free-form label
    #[arg(long)]
    pub chain_label: Option<String>,

    /// Transaction metadata as a JSON document
    #[arg(long)]
    pub chain_metadata: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// List notes, newest first
    List {
        /// Also show notes deleted in the last 30 days
        #[arg(long)]
        include_deleted: bool,

        /// Show only notes deleted in the last 30 days
        #[arg(long, conflicts_with = "include_deleted")]
        only_deleted: bool,
    },

    /// Show one note
    Show { id: i64 },

    /// Create a note
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// Notebook to file the note in
        #[arg(short, long)]
        notebook: Option<i64>,

        /// Tag name (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[command(flatten)]
        chain: ChainArgs,
    },

    /// Replace a note's title and content; tags change only when given
    Update {
        id: i64,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// Notebook to file the note in (omit to clear)
        #[arg(short, long)]
        notebook: Option<i64>,

        /// Replacement tag name (repeatable)
        #[arg(long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        /// Remove every tag from the note
        #[arg(long)]
        clear_tags: bool,

        #[command(flatten)]
        chain: ChainArgs,
    },

    /// Move a note to the trash (hard delete without trash support)
    Delete { id: i64 },

    /// Recover a note deleted in the last 30 days
    Restore { id: i64 },

    /// Permanently delete a note
    Purge { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum NotebookCommand {
    /// List notebooks
    List,
    /// Create a notebook
    Create { name: String },
    /// Rename a notebook
    Rename { id: i64, name: String },
    /// Delete a notebook; its notes are kept
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// List tags with live note counts
    List,
    /// Create a tag (returns the existing one if present)
    Create { name: String },
    /// Rename a tag
    Rename { id: i64, name: String },
    /// Delete a tag and unlink it from every note
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user
    Create {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Password hash produced by the authentication service
        #[arg(long, env = "CHAINNOTE_PASSWORD_HASH", hide_env_values = true)]
        password_hash: String,
    },

    /// Show a user by id or email
    Show {
        #[arg(long, required_unless_present = "email")]
        id: Option<i64>,

        #[arg(long, conflicts_with = "id")]
        email: Option<String>,
    },

    /// Link a Cardano wallet address to a user
    LinkWallet {
        id: i64,

        address: String,

        #[arg(long, default_value = "mainnet")]
        network: WalletNetwork,

        #[arg(long)]
        label: Option<String>,
    },

    /// Remove a user's linked wallet
    UnlinkWallet { id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = logging::init_tracing(&config);

    match commands::run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
