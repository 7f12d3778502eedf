use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rarityx_core::{EngineConfig, RarityEngine, TraitMap, DEFAULT_SENTINEL};
use rarityx_storage::{RetentionPolicy, SnapshotStore};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Trait rarity scoring and ranking for item collections
#[derive(Parser, Debug)]
#[command(name = "rarityx")]
#[command(about = "Score and rank item collections by trait rarity", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Value counted for traits an item does not have
    #[arg(long, global = true, default_value = DEFAULT_SENTINEL)]
    sentinel: String,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every item and print ranks, rarest first
    Rank {
        /// JSON array of items
        #[arg(short, long)]
        input: PathBuf,

        /// Also print the per-trait breakdown of this item (zero-based position)
        #[arg(long)]
        explain: Option<usize>,
    },

    /// Print the per-trait value proportions
    Distribution {
        /// JSON array of items
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Compute the distributions and store them as a rarity snapshot
    Snapshot {
        /// JSON array of items
        #[arg(short, long)]
        input: PathBuf,

        /// Collection the snapshot belongs to
        #[arg(short, long)]
        collection: String,

        /// Path to the snapshot directory
        #[arg(long, default_value = "./data/snapshots")]
        snapshot_dir: PathBuf,

        /// Keep the newest N snapshots instead of only the latest
        #[arg(long, conflicts_with = "keep_all")]
        keep: Option<usize>,

        /// Never prune old snapshots
        #[arg(long)]
        keep_all: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("rarityx v{}", env!("CARGO_PKG_VERSION"));

    let engine = RarityEngine::new(EngineConfig {
        sentinel: args.sentinel.clone(),
    })?;

    let output = run(&engine, args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Execute one subcommand and return its JSON output
fn run(engine: &RarityEngine, command: Command) -> Result<Value> {
    let output = match command {
        Command::Rank { input, explain } => {
            let items = load_items(engine, &input)?;
            let report = engine.rank(&items)?;
            info!(
                "Ranked {} items over {} traits (entropy {:.4})",
                items.len(),
                report.distributions.len(),
                report.total_entropy
            );

            let mut output = json!({
                "result": report.ranked,
                "total_entropy": report.total_entropy,
            });
            if let Some(token_id) = explain {
                let explanation = rarityx_core::explain(&items, &report.distributions, token_id)?;
                output["explain"] = serde_json::to_value(explanation)?;
            }
            output
        }
        Command::Distribution { input } => {
            let items = load_items(engine, &input)?;
            let distributions = engine.distribution(&items)?;
            info!("Computed distributions for {} traits", distributions.len());
            json!({ "result": distributions.to_table() })
        }
        Command::Snapshot {
            input,
            collection,
            snapshot_dir,
            keep,
            keep_all,
        } => {
            let retention = match (keep, keep_all) {
                (_, true) => RetentionPolicy::KeepAll,
                (Some(n), false) => RetentionPolicy::KeepLast(n),
                (None, false) => RetentionPolicy::LatestOnly,
            };
            let items = load_items(engine, &input)?;
            let distributions = engine.distribution(&items)?;

            let store = SnapshotStore::new(&snapshot_dir, retention)?;
            let description = store.create_snapshot(&collection, &distributions)?;
            info!("Snapshot {} written to {:?}", description.name, snapshot_dir);
            json!({ "result": description })
        }
    };
    Ok(output)
}

fn load_items(engine: &RarityEngine, path: &Path) -> Result<Vec<TraitMap>> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value: Value = serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {:?}", path))?;
    let items = engine.parse_items(&value)?;
    info!("Loaded {} items from {:?}", items.len(), path);
    Ok(items)
}
