//! Module: Error
//! But: Error types shared by the derivation pipeline and its sinks.

use std::path::PathBuf;

use thiserror::Error;

// --- Dérivation ---

/// Errors raised while turning a seed into a wallet record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// A node of the HD path could not be derived.
    #[error("key derivation at {path}: {reason}")]
    KeyDerivation {
        /// Display form of the path being walked.
        path: String,
        /// Underlying bip32 failure.
        reason: String,
    },

    /// The path itself could not be built.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Public key recovery or address encoding failed.
    #[error("encoding: {0}")]
    Encoding(String),
}

/// Errors raised by the path builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Non-hardened children are limited to 31 bits.
    #[error("index {0} is out of range for a non-hardened child")]
    IndexOutOfRange(u32),
}

/// A failed (seed, index) pair, with enough context to find it again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("seed line {seed_line} index {index}: {source}")]
pub struct DerivationFailure {
    /// 1-based position of the mnemonic among the parsed seeds.
    pub seed_line: usize,
    /// Derivation index within the seed.
    pub index: u32,
    /// What went wrong.
    pub source: WalletError,
}

// --- Configuration ---

/// Errors raised while building the address filter.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while reading the seeds file.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read seeds file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// --- Persistance ---

/// Errors raised by a wallet sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Database open, migration or insert failure.
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem or stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
