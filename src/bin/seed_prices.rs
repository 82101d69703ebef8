//! Seed a cluster database with mock minute prices.
//!
//! Generates a random walk ending now and writes it into the collection the
//! resolver maps `--symbol`/`--variant` to.

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use price_series::db::duckdb::DuckDb;
use price_series::models::PricePoint;
use price_series::series::{self, DatasetVariant};
use rand::Rng;

#[derive(Debug, Parser)]
#[command(name = "seed_prices", about = "Generate mock price data for a cluster")]
struct Args {
    /// DuckDB file of the cluster (or `:memory:`)
    #[arg(long, env = "CLUSTER1_URI")]
    uri: String,

    #[arg(long, default_value = series::DEFAULT_SYMBOL)]
    symbol: String,

    #[arg(long, default_value = "derived")]
    variant: DatasetVariant,

    /// How much history to generate
    #[arg(long, default_value_t = 30)]
    days: i64,

    #[arg(long, default_value_t = 1)]
    interval_minutes: i64,

    #[arg(long, default_value_t = 45_000.0)]
    start_price: f64,
}

/// Rows per insert transaction
const BATCH_SIZE: usize = 5000;

fn main() -> anyhow::Result<()> {
    price_series::init_tracing();
    let args = Args::parse();

    anyhow::ensure!(args.days > 0, "--days must be positive");
    anyhow::ensure!(args.interval_minutes > 0, "--interval-minutes must be positive");

    let symbol = series::resolve_symbol(&args.symbol);
    let collection = series::resolve(&args.symbol, args.variant);
    let db = DuckDb::open(&args.uri).with_context(|| format!("opening {}", args.uri))?;

    tracing::info!("Generating {} days of {} data into {}", args.days, symbol, collection);

    let end = Utc::now();
    let step = Duration::minutes(args.interval_minutes);
    let mut current = end - Duration::days(args.days);
    let mut price = args.start_price;
    let mut rng = rand::thread_rng();
    let mut batch = Vec::with_capacity(BATCH_SIZE);
    let mut total = 0;

    while current <= end {
        let open = price + rng.gen_range(-15.0..15.0);
        let close = open + rng.gen_range(-30.0..30.0);
        let high = open.max(close) + rng.gen_range(0.0..10.0);
        let low = open.min(close) - rng.gen_range(0.0..10.0);
        let volume_quote = rng.gen_range(1_000_000.0..5_000_000.0);

        batch.push(PricePoint {
            timestamp: current,
            symbol: symbol.to_string(),
            open: round_to(open, 2),
            high: round_to(high, 2),
            low: round_to(low, 2),
            close: round_to(close, 2),
            volume_quote: round_to(volume_quote, 2),
            volume_base: round_to(volume_quote / close, 8),
            trade_count: rng.gen_range(1000..5000),
        });

        price = close;
        current += step;

        if batch.len() >= BATCH_SIZE {
            total += db.insert_price_points(collection, &batch)?;
            tracing::debug!("Inserted a batch of {} rows", batch.len());
            batch.clear();
        }
    }

    if !batch.is_empty() {
        total += db.insert_price_points(collection, &batch)?;
    }

    tracing::info!("Inserted {} rows into {}", total, collection);
    Ok(())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
