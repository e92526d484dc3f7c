//! eventsync CLI entry point.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono_tz::Tz;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventsync_client::cli::{Cli, Commands, OutputFormat};
use eventsync_client::output::{json, pretty};
use eventsync_client::EventsClient;
use eventsync_core::calendar::{events_for_selection, local_zone, month_start, today};
use eventsync_core::{
    CacheConfig, Event, EventCache, EventForm, FormConfig, SelectionState, Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventsync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let zone = match &cli.time_zone {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid time zone {}: {}", name, e))?,
        None => local_zone(),
    };

    let session = Session::new();
    if let Some(user_id) = &cli.user_id {
        session.sign_in(user_id.as_str());
    }

    let client = EventsClient::new(cli.client_config()).context("Invalid client configuration")?;
    tracing::debug!(base_url = client.base_url(), %zone, "Client configured");

    let cache = EventCache::new(Arc::new(client), session.clone(), CacheConfig::from_env());
    let mut selection = SelectionState::new(today(zone));
    let mut form = EventForm::new(FormConfig::from_env(), zone);

    match cli.command {
        Commands::Month { month } => {
            selection.change_month(month.unwrap_or_else(|| today(zone)));
            let snapshot = cache.list().await?;
            if !session.is_signed_in() && !cli.quiet {
                eprintln!("Not signed in; set EVENTSYNC_USER_ID to see your events.");
            }
            let display_month = selection.display_month();
            match cli.format {
                OutputFormat::Json => {
                    let events: Vec<&Event> = snapshot
                        .events()
                        .iter()
                        .filter(|event| {
                            event
                                .local_date(zone)
                                .is_some_and(|date| month_start(date) == display_month)
                        })
                        .collect();
                    println!("{}", json::format_json(&events));
                }
                OutputFormat::Pretty => {
                    println!(
                        "{}",
                        pretty::format_month(display_month, snapshot.events(), zone)
                    )
                }
            }
        }
        Commands::Day { date } => {
            let date = date.unwrap_or_else(|| today(zone));
            selection.select_date(Some(date));
            let snapshot = cache.list().await?;
            let events = events_for_selection(selection.selected_date(), snapshot.events(), zone);
            match cli.format {
                OutputFormat::Json => println!("{}", json::format_json(&events)),
                OutputFormat::Pretty => println!("{}", pretty::format_day(date, &events, zone)),
            }
        }
        Commands::Add(args) => {
            if let Some(date) = args.date {
                selection.select_date(Some(date));
            }
            form.open_add(&mut selection);
            form.set_title(args.title);
            if let Some(start) = args.start {
                form.set_start_time(start);
            }
            if let Some(end) = args.end {
                form.set_end_time(end);
            }
            if let Some(description) = args.description {
                form.set_description(description);
            }
            if let Some(location) = args.location {
                form.set_location(location);
            }

            let created = form.submit(&session, &cache).await?;
            form.close_and_reset();
            cache.settled().await;
            match cli.format {
                OutputFormat::Json => println!("{}", json::format_json(&created)),
                OutputFormat::Pretty => {
                    println!("Created:\n{}", pretty::format_event_detail(&created, zone))
                }
            }
        }
        Commands::Edit(args) => {
            let snapshot = cache.list().await?;
            let Some(event) = snapshot.events().iter().find(|event| event.id == args.id) else {
                bail!("Event not found: {}", args.id);
            };

            form.open_edit(event, &selection);
            if let Some(title) = args.title {
                form.set_title(title);
            }
            if let Some(description) = args.description {
                form.set_description(description);
            }
            if let Some(location) = args.location {
                form.set_location(location);
            }
            if let Some(start) = args.start {
                form.set_start_time(start);
            }
            if let Some(end) = args.end {
                form.set_end_time(end);
            }

            let updated = form.submit(&session, &cache).await?;
            form.close_and_reset();
            cache.settled().await;
            match cli.format {
                OutputFormat::Json => println!("{}", json::format_json(&updated)),
                OutputFormat::Pretty => {
                    println!("Updated:\n{}", pretty::format_event_detail(&updated, zone))
                }
            }
        }
        Commands::Delete { id } => {
            cache.remove(&id).await?;
            cache.settled().await;
            if !cli.quiet {
                println!("Deleted event {}", id);
            }
        }
    }

    Ok(())
}
