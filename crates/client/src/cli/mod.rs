//! CLI command definitions.

pub mod events;

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::client::ClientConfig;

/// Personal calendar on a hosted event table.
#[derive(Debug, Parser)]
#[command(name = "eventsync")]
#[command(about = "Personal calendar on a hosted event table", long_about = None)]
pub struct Cli {
    /// REST endpoint base URL.
    #[arg(long, env = "EVENTSYNC_URL", default_value = "http://localhost:54321/rest/v1")]
    pub base_url: String,

    /// Bearer token of the signed-in user.
    #[arg(long, env = "EVENTSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Project API key.
    #[arg(long, env = "EVENTSYNC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Id of the signed-in user. Without it every command runs signed out.
    #[arg(long, env = "EVENTSYNC_USER_ID")]
    pub user_id: Option<String>,

    /// IANA zone for display and input. Defaults to the system zone.
    #[arg(long, env = "EVENTSYNC_TZ")]
    pub time_zone: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Connection settings taken from the flags.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a month with per-day event counts.
    Month {
        /// Any day of the month to show (YYYY-MM-DD). Defaults to today.
        month: Option<NaiveDate>,
    },
    /// List the events of one day.
    Day {
        /// Day to list (YYYY-MM-DD). Defaults to today.
        date: Option<NaiveDate>,
    },
    /// Add an event.
    Add(events::AddArgs),
    /// Edit an event.
    Edit(events::EditArgs),
    /// Delete an event.
    Delete {
        /// Event id.
        id: String,
    },
}
