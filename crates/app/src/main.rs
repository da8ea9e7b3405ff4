//! Tagdesk - event check-in nametag desk
//!
//! Command-line front end over the tagdesk core. Every invocation resumes
//! the quicksaved session and saves it again after a change.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tagdesk_core::PrintStatus;

mod commands;
mod config;
mod logging;
mod state;

use config::AppConfig;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "tagdesk", version)]
#[command(about = "Download event attendees and print their nametags")]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authenticate with an API key and remember it
    Connect { api_key: String },
    /// List organizations visible to the account
    Orgs,
    /// List an organization's events
    Events { org_id: String },
    /// Load an event and merge its attendees into the session
    Load {
        event_id: String,
        /// Refresh profiles of attendees already in the session
        #[arg(long)]
        overwrite: bool,
    },
    /// Show attendees
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Set an attendee's print status
    Status { attendee_id: String, status: StatusArg },
    /// Edit one field of an attendee
    Edit {
        attendee_id: String,
        field: String,
        value: String,
    },
    /// Count distinct values of a field
    Values { field: String },
    /// Replace every occurrence of a field value
    Replace {
        field: String,
        from: String,
        to: String,
    },
    /// Select the nametag template
    Template { path: PathBuf },
    /// Bind a template variable
    Bind(BindArgs),
    /// Remove a template variable binding
    Unbind { variable: String },
    /// Show or select the render step (`none` to clear)
    Step { name: Option<String> },
    /// Generate nametags for attendees not yet printed
    Generate {
        output_dir: PathBuf,
        /// Leave attendees unprinted after generating
        #[arg(long)]
        no_mark: bool,
    },
    /// List saved session copies
    History,
    /// Replace the session with a saved copy
    Restore { path: PathBuf },
}

#[derive(Args, Debug)]
pub struct BindArgs {
    pub variable: String,
    /// Attendee field to read
    #[arg(long, conflicts_with = "literal", required_unless_present = "literal")]
    pub field: Option<String>,
    /// Fixed text
    #[arg(long)]
    pub literal: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Printed,
    Unprinted,
    Excluded,
}

impl From<StatusArg> for PrintStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Printed => Self::Printed,
            StatusArg::Unprinted => Self::Unprinted,
            StatusArg::Excluded => Self::Excluded,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_console("info");
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    logging::init(&config.console_level, &config.logs_dir);
    tracing::debug!(?config, "Starting tagdesk");

    let mut state = match AppState::open(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to open session: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = commands::run(cli.command, &mut state) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
