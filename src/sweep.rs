//! Module: Sweep
//! But: Core pipeline. Every mnemonic is stretched into a seed, walked down
//! `m/44'/60'/0'/0/i` for each index below the depth, turned into an Ethereum
//! wallet and checked against the address filter.

pub mod error;
pub mod filter;
pub mod input;
pub mod keys;
pub mod path;
pub mod progress;
pub mod seed;
pub mod sink;
pub mod wallet;

use bip32::DerivationPath;
use rayon::prelude::*;
use tracing::{debug, error, warn};

pub use crate::error::{DerivationFailure, FilterError, InputError, PathError, SinkError, WalletError};
pub use crate::filter::{ContainsMode, FilterOptions, FilterPredicate};
pub use crate::keys::{SeedKeys, derive_key};
pub use crate::path::{BASE_PATH, base_path, build_path};
pub use crate::progress::{NoProgress, ProgressObserver, ProgressReporter};
pub use crate::seed::Seed;
pub use crate::sink::{SqliteSink, StdoutSink, WalletSink};
pub use crate::wallet::WalletRecord;

// --- Configuration ---

/// Run parameters other than the filter.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    depth: u32,
    base_path: DerivationPath,
}

impl SweepConfig {
    /// Depth below 1 is raised to 1.
    pub fn new(depth: i64) -> Self {
        Self {
            depth: depth.clamp(1, i64::from(u32::MAX)) as u32,
            base_path: base_path(),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn base_path(&self) -> &DerivationPath {
        &self.base_path
    }
}

/// Counters for a finished sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// (seed, index) pairs processed.
    pub attempted: u64,
    /// Pairs that passed the filter.
    pub matched: u64,
    /// Pairs skipped on a derivation or encoding failure.
    pub failed: u64,
    /// Matches the sink failed to store.
    pub sink_errors: u64,
}

impl SweepSummary {
    fn merge(self, other: Self) -> Self {
        Self {
            attempted: self.attempted + other.attempted,
            matched: self.matched + other.matched,
            failed: self.failed + other.failed,
            sink_errors: self.sink_errors + other.sink_errors,
        }
    }
}

// --- Exécution ---

pub struct Sweep {
    config: SweepConfig,
    filter: FilterPredicate,
}

impl Sweep {
    pub fn new(config: SweepConfig, filter: FilterPredicate) -> Self {
        Self { config, filter }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Number of pairs a run over `seed_count` mnemonics will attempt.
    pub fn total(&self, seed_count: usize) -> u64 {
        seed_count as u64 * u64::from(self.config.depth)
    }

    /// Processes every (seed, index) pair; seeds run in parallel on the rayon pool.
    ///
    /// Failures never abort the run: they are logged and counted.
    pub fn run(
        &self,
        seeds: &[String],
        sink: &dyn WalletSink,
        progress: &dyn ProgressObserver,
    ) -> SweepSummary {
        let summary = seeds
            .par_iter()
            .enumerate()
            .map(|(i, phrase)| self.sweep_seed(i + 1, phrase, sink, progress))
            .reduce(SweepSummary::default, SweepSummary::merge);
        progress.finish();
        summary
    }

    fn sweep_seed(
        &self,
        seed_line: usize,
        phrase: &str,
        sink: &dyn WalletSink,
        progress: &dyn ProgressObserver,
    ) -> SweepSummary {
        // Seed stretching and the base path walk happen once per mnemonic.
        let keys = SeedKeys::new(Seed::from_phrase(phrase), &self.config.base_path);
        let mut summary = SweepSummary::default();

        for index in 0..self.config.depth {
            match self.process_pair(&keys, seed_line, index) {
                Ok(wallet) if self.filter.matches(&wallet.address) => {
                    summary.matched += 1;
                    debug!(seed_line, index, address = %wallet.address, "Match");
                    if let Err(e) = sink.store(seed_line, index, &wallet) {
                        error!(seed_line, index, error = %e, "Failed to store wallet");
                        summary.sink_errors += 1;
                    }
                }
                Ok(_) => {}
                Err(failure) => {
                    warn!(seed_line, index, error = %failure.source, "Skipping pair");
                    summary.failed += 1;
                }
            }
            summary.attempted += 1;
            progress.on_processed();
        }

        summary
    }

    /// Derives and labels the wallet at `index` for one seed.
    pub fn process_pair(
        &self,
        keys: &SeedKeys,
        seed_line: usize,
        index: u32,
    ) -> Result<WalletRecord, DerivationFailure> {
        let derive = || -> Result<WalletRecord, WalletError> {
            let path = build_path(&self.config.base_path, index)?;
            let key = keys.derive(&path)?;
            Ok(WalletRecord::from_private_key(key.private_key())?.with_hd_path(path.to_string()))
        };
        derive().map_err(|source| DerivationFailure {
            seed_line,
            index,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "test test test test test test test test test test test junk";

    fn sweep() -> Sweep {
        Sweep::new(SweepConfig::new(1), FilterPredicate::default())
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(SweepConfig::new(0).depth(), 1);
        assert_eq!(SweepConfig::new(-4).depth(), 1);
        assert_eq!(SweepConfig::new(5).depth(), 5);
        assert_eq!(SweepConfig::new(i64::MAX).depth(), u32::MAX);
    }

    #[test]
    fn total_is_seeds_times_depth() {
        let sweep = Sweep::new(SweepConfig::new(2), FilterPredicate::default());
        assert_eq!(sweep.total(3), 6);
    }

    #[test]
    fn process_pair_labels_path() {
        let sweep = sweep();
        let keys = SeedKeys::new(Seed::from_phrase(PHRASE), sweep.config().base_path());

        let w0 = sweep.process_pair(&keys, 1, 0).unwrap();
        assert_eq!(w0.address, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(w0.hd_path, "m/44'/60'/0'/0/0");

        let w1 = sweep.process_pair(&keys, 1, 1).unwrap();
        assert_eq!(w1.address, "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        assert_eq!(w1.hd_path, "m/44'/60'/0'/0/1");
    }

    #[test]
    fn process_pair_reports_context() {
        let sweep = sweep();
        let keys = SeedKeys::new(Seed::from_phrase(PHRASE), sweep.config().base_path());
        let failure = sweep.process_pair(&keys, 4, 1 << 31).unwrap_err();
        assert_eq!(failure.seed_line, 4);
        assert_eq!(failure.index, 1 << 31);
        assert_eq!(
            failure.source,
            WalletError::Path(PathError::IndexOutOfRange(1 << 31))
        );
    }

    #[test]
    fn summaries_merge() {
        let a = SweepSummary {
            attempted: 2,
            matched: 1,
            failed: 0,
            sink_errors: 1,
        };
        let b = SweepSummary {
            attempted: 3,
            matched: 0,
            failed: 1,
            sink_errors: 0,
        };
        assert_eq!(
            a.merge(b),
            SweepSummary {
                attempted: 5,
                matched: 1,
                failed: 1,
                sink_errors: 1,
            }
        );
    }
}
