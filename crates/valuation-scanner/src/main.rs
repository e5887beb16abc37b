//! Valuation scanner: evaluate every symbol in a snapshot file, persist one row per
//! symbol and raise an alert on fresh opportunities.
//!
//! Usage:
//!   cargo run -p valuation-scanner -- --snapshots snapshots.json
//!   cargo run -p valuation-scanner -- --snapshots snapshots.json --db sqlite:valuations.db
//!   cargo run -p valuation-scanner -- --snapshots snapshots.json --dry-run

use anyhow::Result;
use notification_service::{NotificationConfig, NotificationService};
use valuation_scanner::{load_snapshots, RecordStore, ScannerConfig, Scanner};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("valuation_scanner=info,notification_service=info")
        })
    };
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage:");
        eprintln!("  valuation-scanner [--snapshots PATH] [--db URL] [--dry-run]");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --snapshots PATH   Snapshot JSON file (default: $SNAPSHOT_PATH or snapshots.json)");
        eprintln!("  --db URL           SQLite URL (default: $DATABASE_URL or sqlite:valuations.db)");
        eprintln!("  --dry-run          Evaluate and log without writing rows or sending alerts");
        return Ok(());
    }

    let mut config = ScannerConfig::from_env()?;
    config.apply_args(&args);

    tracing::info!("Starting valuation scanner");
    tracing::info!("  Strategy: {}", config.strategy.name());
    tracing::info!("  Locale: {:?}", config.locale);
    tracing::info!("  Snapshots: {}", config.snapshot_path.display());
    tracing::info!("  Database: {}", config.database_url);
    tracing::info!("  Index trackers: {}", config.index_symbols.join(","));
    if config.dry_run {
        tracing::info!("  Dry run: no rows written, no alerts sent");
    }

    let entries = load_snapshots(&config.snapshot_path).await?;
    tracing::info!("Loaded {} snapshots", entries.len());

    let store = RecordStore::new(&config.database_url).await?;
    let notifier = NotificationService::new(&NotificationConfig::from_env());

    let scanner = Scanner::new(config, store, notifier)?;
    let summary = scanner.run(&entries).await;

    if summary.errors > 0 {
        tracing::warn!(
            "{} of {} symbols failed; see warnings above",
            summary.errors,
            summary.total
        );
    }
    tracing::debug!("Summary: {}", serde_json::to_string(&summary)?);

    Ok(())
}
