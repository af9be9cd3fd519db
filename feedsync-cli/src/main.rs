//! feedsync CLI: sync, status, show and config commands.
//!
//! Commands:
//! - `sync`: bring local datasets up to date with the remote feeds
//! - `status`: report row count, date range and last sync per dataset
//! - `show`: print one merged dataset as CSV
//! - `config`: print the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use feedsync_core::data::{DatasetStatus, DatasetStore};
use feedsync_runner::{
    dataset_status, init_logging, open_store, resolve_entities, run_sync, SyncConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "feedsync",
    about = "feedsync: incremental sync of per-entity time-series feeds"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring local datasets up to date with the remote feeds.
    Sync {
        /// Entities to sync (e.g., HPG VNM FPT). Overrides the universe and config list.
        symbols: Vec<String>,

        /// CSV file with a symbol column listing the entities to sync.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Feed to sync (repeatable). Defaults to every configured feed.
        #[arg(long = "feed")]
        feeds: Vec<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Dataset directory. Overrides the config.
        #[arg(long)]
        dataset_root: Option<PathBuf>,

        /// Page size of the metadata probe. Overrides the config.
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Report row count, date range and last sync for each dataset.
    Status {
        /// Entities to report on. Defaults to the universe or config list.
        symbols: Vec<String>,

        /// CSV file with a symbol column listing the entities.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print one merged dataset as CSV.
    Show {
        /// Entity identifier (e.g., HPG).
        symbol: String,

        /// Feed name (e.g., price_history).
        feed: String,

        /// Only print the last N rows.
        #[arg(long)]
        tail: Option<usize>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            symbols,
            universe,
            feeds,
            config,
            dataset_root,
            page_size,
        } => run_sync_cmd(symbols, universe, feeds, config, dataset_root, page_size),
        Commands::Status {
            symbols,
            universe,
            config,
        } => run_status(symbols, universe, config),
        Commands::Show {
            symbol,
            feed,
            tail,
            config,
        } => run_show(&symbol, &feed, tail, config),
        Commands::Config => {
            print!("{}", SyncConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn run_sync_cmd(
    symbols: Vec<String>,
    universe: Option<PathBuf>,
    feed_names: Vec<String>,
    config_path: Option<PathBuf>,
    dataset_root: Option<PathBuf>,
    page_size: Option<usize>,
) -> Result<()> {
    let mut config = SyncConfig::load(config_path.as_deref())?;
    if let Some(root) = dataset_root {
        config.dataset_root = root;
    }
    if let Some(n) = page_size {
        config.page_size_hint = n;
    }
    config.validate()?;

    init_logging(&config.log)?;

    let entities = resolve_entities(&config, &symbols, universe.as_deref())?;
    if entities.is_empty() {
        bail!("no entities to sync: pass symbols, --universe, or set `symbols` in the config");
    }
    let feeds = config.selected_feeds(&feed_names)?;

    let summary = run_sync(&config, &entities, &feeds)?;

    println!();
    println!("=== Sync Summary ===");
    println!("Pairs:          {}", summary.pairs);
    println!("Updated:        {}", summary.updated);
    println!("Up to date:     {}", summary.up_to_date);
    println!("No valid rows:  {}", summary.no_valid_rows);
    println!("Failed:         {}", summary.failed);

    if !summary.all_succeeded() {
        for failure in &summary.failures {
            eprintln!(
                "Error for {} / {}: {}",
                failure.entity, failure.feed, failure.error
            );
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_status(
    symbols: Vec<String>,
    universe: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = SyncConfig::load(config_path.as_deref())?;
    let entities = resolve_entities(&config, &symbols, universe.as_deref())?;
    if entities.is_empty() {
        bail!("no entities given: pass symbols, --universe, or set `symbols` in the config");
    }

    let rows = dataset_status(&config, &entities, &config.feeds);

    println!("Dataset root: {}", config.dataset_root.display());
    println!();
    println!(
        "{:<8} {:<20} {:>7} {:<25} {:<20}",
        "Symbol", "Feed", "Rows", "Date Range", "Last Sync"
    );
    println!("{}", "-".repeat(84));
    for row in &rows {
        let (count, range, synced) = describe(row);
        println!(
            "{:<8} {:<20} {:>7} {:<25} {:<20}",
            row.entity, row.feed, count, range, synced
        );
    }

    Ok(())
}

fn describe(status: &DatasetStatus) -> (String, String, String) {
    match (&status.meta, status.exists) {
        (Some(meta), _) => (
            meta.row_count.to_string(),
            format!(
                "{} to {}",
                meta.first_date.as_deref().unwrap_or("?"),
                meta.last_date.as_deref().unwrap_or("?")
            ),
            meta.synced_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        (None, true) => ("?".into(), "(no meta)".into(), "-".into()),
        (None, false) => ("0".into(), "(missing)".into(), "-".into()),
    }
}

fn run_show(
    symbol: &str,
    feed_name: &str,
    tail: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = SyncConfig::load(config_path.as_deref())?;
    let Some(feed) = config.feed(feed_name) else {
        let known: Vec<&str> = config.feeds.iter().map(|f| f.name.as_str()).collect();
        bail!("unknown feed '{feed_name}'. Valid: {}", known.join(", "));
    };

    let store = open_store(&config);
    let dataset = store
        .load(symbol, feed)
        .with_context(|| format!("failed to load {symbol} / {feed_name}"))?;
    if dataset.is_empty() {
        bail!(
            "no data for {symbol} / {feed_name} at {}",
            store.dataset_path(symbol, feed).display()
        );
    }

    let skip = tail.map_or(0, |n| dataset.len().saturating_sub(n));
    let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
    writer.write_record(dataset.columns())?;
    for row in dataset.rows().iter().skip(skip) {
        writer.write_record(dataset.columns().iter().map(|c| row.cell(c).into_owned()))?;
    }
    writer.flush()?;

    Ok(())
}
