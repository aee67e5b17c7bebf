//! Module: Main
//! But: Entry point for the seed sweeper.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use seed_sweep::input::read_seeds;
use seed_sweep::{
    FilterOptions, FilterPredicate, ProgressReporter, SqliteSink, StdoutSink, Sweep, SweepConfig,
    SweepSummary, WalletSink,
};

// --- Configuration ---

/// Derives Ethereum wallets from a list of BIP39 mnemonics and keeps the
/// addresses that match the given filters.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File containing BIP39 mnemonics, one per line.
    #[arg(long)]
    seeds: PathBuf,

    /// Number of addresses to derive per mnemonic (m/44'/60'/0'/0/0..depth).
    /// Values below 1 are raised to 1.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    depth: i64,

    /// SQLite database name (e.g. wallets.db), created under --db-dir.
    /// Matches are printed to stdout when unset.
    #[arg(long)]
    db: Option<String>,

    /// Directory holding the SQLite database.
    #[arg(long, default_value = "db")]
    db_dir: PathBuf,

    /// Keep addresses containing any of these comma-separated strings.
    #[arg(long, default_value = "")]
    contains: String,

    /// Strict contains mode.
    /// NB: Kept for compatibility; matching is unchanged. See --contains-all.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Require every --contains string instead of any.
    #[arg(long, default_value_t = false)]
    contains_all: bool,

    /// Keep addresses starting with this prefix ("0x" is added if missing).
    #[arg(long, default_value = "")]
    prefix: String,

    /// Keep addresses ending with this suffix.
    #[arg(long, default_value = "")]
    suffix: String,

    /// Keep addresses matching this regex (e.g. ^0x99 or ^0x00).
    #[arg(long, default_value = "")]
    regex: String,

    /// Case insensitive matching.
    /// Défaut: case sensitive, addresses are EIP-55 mixed case.
    #[arg(long, default_value_t = false)]
    ignore_case: bool,

    /// Number of threads to use.
    /// Défaut: All logical cores.
    #[arg(short, long)]
    threads: Option<usize>,
}

impl Args {
    fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            contains: self.contains.clone(),
            strict: self.strict,
            contains_all: self.contains_all,
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            regex: self.regex.clone(),
            ignore_case: self.ignore_case,
        }
    }
}

// --- Exécution ---

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args)? {
        RunOutcome::NoSeeds => eprintln!("{NO_SEEDS}"),
        RunOutcome::Finished(summary) => info!(
            processed = summary.attempted,
            matched = summary.matched,
            failed = summary.failed,
            sink_errors = summary.sink_errors,
            "Sweep finished"
        ),
    }
    Ok(())
}

const NO_SEEDS: &str = "No seeds/mnemonics found in the file.";

/// How a run ended when no fatal error occurred.
#[derive(Debug, PartialEq, Eq)]
enum RunOutcome {
    /// The seeds file held no mnemonics; nothing was derived.
    NoSeeds,
    Finished(SweepSummary),
}

/// Everything after argument parsing. Errors here are fatal and exit non-zero.
fn run(args: &Args) -> Result<RunOutcome> {
    // Configuration du ThreadPool
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    let config = SweepConfig::new(args.depth);
    let filter = FilterPredicate::new(args.filter_options()).context("Invalid filter")?;

    let seeds = read_seeds(&args.seeds).context("Failed to open seeds file")?;
    if seeds.is_empty() {
        return Ok(RunOutcome::NoSeeds);
    }

    let sqlite = args
        .db
        .as_ref()
        .map(|name| {
            let path = args.db_dir.join(name);
            SqliteSink::open(&path)
                .with_context(|| format!("Failed to open sqlite DB {}", path.display()))
        })
        .transpose()?;
    let sink: &dyn WalletSink = match &sqlite {
        Some(db) => db,
        None => &StdoutSink,
    };

    let sweep = Sweep::new(config, filter);
    let total = sweep.total(seeds.len());
    info!(
        seeds = seeds.len(),
        depth = sweep.config().depth(),
        total,
        threads = rayon::current_num_threads(),
        "Starting sweep"
    );

    let start_time = Instant::now();
    let progress = ProgressReporter::new(total);
    let summary = sweep.run(&seeds, sink, &progress);
    info!(elapsed = ?start_time.elapsed(), "All pairs processed");

    if let Some(db) = sqlite {
        db.close();
    }

    Ok(RunOutcome::Finished(summary))
}
