mod commands;
mod config;
mod context;
mod display;
mod error;
mod import;
mod schedule;
mod store;
mod web;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::info;

use config::Config;
use context::PlanningContext;
use display::print_day_schedule;
use import::{apply_assignments, build_catalog, load_rows};
use schedule::Day;
use store::{MemoryStore, ScheduleStore};

#[derive(Parser)]
#[command(about = "Room planning service with professor conflict and duration checks")]
struct Args {
    /// JSON configuration file, overridden by PLANNING_* environment variables
    #[arg(long, default_value = "planning.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
        /// CSV with rooms, professors, equipment and assignments
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Import a CSV and print the grid of one or every day
    Show {
        csv: PathBuf,
        /// lundi .. vendredi
        #[arg(long)]
        day: Option<String>,
    },
}

/// Loads catalogs and assignments from a CSV into a fresh store
fn seed_store(
    csv_path: Option<&PathBuf>,
    config: &Config,
) -> Result<(Arc<MemoryStore>, PlanningContext), Box<dyn std::error::Error>> {
    let grid = config.grid()?;
    let rows = match csv_path {
        Some(path) => {
            info!("Loading planning from {}", path.display());
            load_rows(path)?
        }
        None => Vec::new(),
    };

    let store = Arc::new(MemoryStore::new(build_catalog(&rows), grid.slots_per_day));
    let mut context = PlanningContext::load(store.as_ref(), grid)?;
    apply_assignments(&mut context, store.as_ref(), &rows);
    Ok((store, context))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    match args.command {
        Command::Serve { port, seed } => {
            let port = port.unwrap_or(config.port);
            let (store, context) = seed_store(seed.as_ref().or(config.seed_csv.as_ref()), &config)?;
            info!(
                "Starting web server on {}:{} ({} rooms, {} slots per day)",
                config.bind,
                port,
                context.catalog().rooms.len(),
                config.slots_per_day
            );

            let store: Arc<dyn ScheduleStore> = store;
            let state = web::AppState::new(store, context, Duration::from_millis(config.debounce_ms));
            web::start_server(&config.bind, port, state).await?;
        }
        Command::Show { csv, day } => {
            let (store, mut context) = seed_store(Some(&csv), &config)?;
            let days: Vec<Day> = match day {
                Some(day) => vec![day.parse::<Day>()?],
                None => Day::ALL.to_vec(),
            };
            let grid = *context.grid();
            for day in days {
                let catalog = context.catalog().clone();
                let schedule = context.day(day, store.as_ref())?;
                print_day_schedule(day, schedule, &grid, &catalog);
            }
        }
    }

    Ok(())
}
