//! Arguments of the event write commands.

use chrono::NaiveDate;
use clap::Args;

/// Arguments of `add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Event title.
    pub title: String,
    /// Day of the event (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Start time (HH:MM). Defaults to the form default.
    #[arg(long)]
    pub start: Option<String>,
    /// End time (HH:MM). Defaults to the form default.
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
}

/// Arguments of `edit`. Omitted fields keep their current value.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Event id.
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    /// Pass an empty string to clear.
    #[arg(long)]
    pub description: Option<String>,
    /// Pass an empty string to clear.
    #[arg(long)]
    pub location: Option<String>,
    /// Start time (HH:MM).
    #[arg(long)]
    pub start: Option<String>,
    /// End time (HH:MM).
    #[arg(long)]
    pub end: Option<String>,
}
