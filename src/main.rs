//! Chanpost - Channel Post Scheduler
//!
//! Main entry point for the chanpost CLI and scheduler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chanpost_dispatch::Dispatcher;
use chanpost_protocols::{JobId, Zone};
use chanpost_store::{ConfigStore, FileScheduleStore, ScheduleStore};

mod adapters;
mod cli;
mod commands;

use adapters::{chanpost_dir, LogDelivery};
use cli::{Cli, Commands};
use commands::{build_content, AddRequest, CommandSurface};

/// Initialize tracing with console and file output.
///
/// Log files are written to `<state_dir>/debug/` with daily rotation.
fn init_tracing(state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = state_dir.join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("chanpost")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer guard alive for the program duration.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(_guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let state_dir = cli.state_dir.unwrap_or_else(chanpost_dir);
    init_tracing(&state_dir)?;

    match cli.command {
        None | Some(Commands::Run) => run_scheduler(state_dir, cli.zone).await,
        Some(Commands::Add {
            channel,
            text,
            photo,
            caption,
            poll,
            option,
            public_votes,
            multiple_answers,
            time,
            daily,
        }) => {
            let surface = open_surface(&state_dir).await?;
            let content = build_content(
                text,
                photo,
                caption,
                poll,
                option,
                public_votes,
                multiple_answers,
            )?;
            let jobs = surface
                .add(AddRequest {
                    channel,
                    content,
                    times: time,
                    daily,
                })
                .await?;
            for job in &jobs {
                println!(
                    "Scheduled job {} at {} ({}) to {}",
                    job.id,
                    job.time,
                    if job.recurrence.is_daily() { "daily" } else { "once" },
                    job.channel
                );
            }
            Ok(())
        }
        Some(Commands::List { format }) => {
            let surface = open_surface(&state_dir).await?;
            list_jobs(&surface, &format).await
        }
        Some(Commands::Cancel { id }) => {
            let surface = open_surface(&state_dir).await?;
            let job = surface.cancel(JobId(id)).await?;
            println!("Cancelled job {} ({} at {})", job.id, job.channel, job.time);
            Ok(())
        }
        Some(Commands::CancelAll) => {
            let surface = open_surface(&state_dir).await?;
            let count = surface.cancel_all().await?;
            println!("Cancelled {} job(s)", count);
            Ok(())
        }
        Some(Commands::SetChannel { channel }) => {
            let surface = open_surface(&state_dir).await?;
            surface.set_channel(&channel).await;
            println!("Default channel set to {}", channel);
            Ok(())
        }
    }
}

/// Open the persistent state without a live dispatcher, for one-shot
/// CLI verbs. The running scheduler reloads the schedule at its next
/// start.
async fn open_surface(state_dir: &Path) -> Result<CommandSurface, Box<dyn std::error::Error>> {
    let store: Arc<dyn ScheduleStore> =
        Arc::new(FileScheduleStore::load(state_dir.join("scheduled.json")).await?);
    let config = Arc::new(ConfigStore::load(state_dir.join("config.json")).await?);
    Ok(CommandSurface::new(store, config, None))
}

/// Run the scheduler in foreground until interrupted.
async fn run_scheduler(
    state_dir: PathBuf,
    zone: Zone,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting chanpost v{}", env!("CARGO_PKG_VERSION"));
    info!("State directory: {}", state_dir.display());
    info!("Zone: {}", zone);

    let store: Arc<dyn ScheduleStore> =
        Arc::new(FileScheduleStore::load(state_dir.join("scheduled.json")).await?);
    let config = Arc::new(ConfigStore::load(state_dir.join("config.json")).await?);

    match config.channel().await {
        Some(channel) => info!("Default channel: {}", channel),
        None => info!("No default channel configured; jobs carry their own"),
    }

    let delivery = Arc::new(LogDelivery::new());
    let dispatcher = Dispatcher::new(store.clone(), delivery, zone);

    let armed = dispatcher.arm_all().await?;
    info!("Scheduler ready, {} job(s) armed", armed);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    dispatcher.cancel_all().await;

    Ok(())
}

/// Print pending jobs in the requested format.
async fn list_jobs(
    surface: &CommandSurface,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let jobs = surface.list().await?;

    if jobs.is_empty() {
        println!("No pending jobs.");
        return Ok(());
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&jobs)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<6} {:<20} {:<7} {:<6} {}", "ID", "CHANNEL", "TIME", "DAILY", "CONTENT");
            println!("{}", "-".repeat(70));
            for job in jobs {
                let kinds: Vec<_> = job.content.iter().map(|i| i.kind()).collect();
                println!(
                    "{:<6} {:<20} {:<7} {:<6} {}",
                    job.id,
                    job.channel,
                    job.time.to_string(),
                    job.recurrence.is_daily(),
                    kinds.join(", ")
                );
            }
        }
    }

    Ok(())
}
