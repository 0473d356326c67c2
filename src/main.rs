//! tarifas - price previews over a pricing snapshot exported by the back office.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hotel_pricing::cache::PriceCache;
use hotel_pricing::pricing::models::{calendar_date, MealPlan};
use hotel_pricing::pricing::requests::{CurveEdit, PricingSnapshot};
use hotel_pricing::pricing::responses::{
    CurvePointResponse, PriceGridResponse, PriceQuoteResponse,
};
use hotel_pricing::pricing::PricingStore;
use hotel_pricing::{AppError, Config};

#[derive(Parser)]
#[command(name = "tarifas", version, about = "Seasonal room rate calculator")]
struct Cli {
    /// Pricing snapshot JSON (keyframes, periods, coefficients, meal rules)
    #[arg(short, long, global = true, default_value = "pricing.json")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Nightly price for one room type and meal plan
    Quote {
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,

        #[arg(short, long)]
        room_type: String,

        /// base, breakfast or halfBoard
        #[arg(short, long, default_value = "base")]
        meal_plan: MealPlan,

        /// Service adjustments to apply, in order
        #[arg(long = "service")]
        services: Vec<String>,
    },

    /// Rate table for every room type on one date
    Grid {
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Daily base prices over a range (closed days have no value)
    Curve {
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,

        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
    },

    /// Apply a JSON list of edits and print the resulting snapshot
    Edit {
        /// File with a JSON array of edits
        #[arg(short, long)]
        edits: PathBuf,

        /// Write the result back to the snapshot file
        #[arg(long)]
        write: bool,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    calendar_date::parse(raw).ok_or_else(|| format!("invalid date '{}'", raw))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the typed failure as JSON and exit non-zero
fn fail(err: AppError) -> ! {
    match serde_json::to_string_pretty(&err.to_response()) {
        Ok(body) => eprintln!("{}", body),
        Err(_) => eprintln!("{}", err),
    }
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;

    let snapshot: PricingSnapshot = read_json(&cli.snapshot)
        .with_context(|| format!("reading snapshot {}", cli.snapshot.display()))?;
    let store = PricingStore::from_snapshot(snapshot, PriceCache::from_config(&config))
        .unwrap_or_else(|e| fail(e.into()));

    info!("Loaded pricing snapshot from {}", cli.snapshot.display());

    match cli.command {
        Command::Quote {
            date,
            room_type,
            meal_plan,
            services,
        } => {
            let breakdown = store
                .quote(date, &room_type, meal_plan, &services)
                .await
                .unwrap_or_else(|e| fail(e.into()));
            print_json(&PriceQuoteResponse::from_breakdown(&breakdown, &config.currency))
        }
        Command::Grid { date } => {
            let grid = store
                .preview_grid(date)
                .await
                .unwrap_or_else(|e| fail(e.into()));
            print_json(&PriceGridResponse::from_grid(&grid, &config.currency))
        }
        Command::Curve { from, to } => {
            let points = store
                .sample_curve(from, to)
                .await
                .unwrap_or_else(|e| fail(e.into()));
            let points: Vec<CurvePointResponse> = points.iter().map(Into::into).collect();
            print_json(&points)
        }
        Command::Edit { edits, write } => {
            let edits: Vec<CurveEdit> = read_json(&edits)
                .with_context(|| format!("reading edits {}", edits.display()))?;
            for edit in edits {
                // The first rejected edit aborts before anything is written
                let outcome = store
                    .apply(edit)
                    .await
                    .unwrap_or_else(|e| fail(e.into()));
                info!("Applied edit: {:?}", outcome);
            }

            let result = store.snapshot().await;
            if write {
                fs::write(&cli.snapshot, serde_json::to_string_pretty(&result)?)
                    .with_context(|| format!("writing snapshot {}", cli.snapshot.display()))?;
                info!("Snapshot written to {}", cli.snapshot.display());
            }
            print_json(&result)
        }
    }
}
