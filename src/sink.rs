//! Module: Sink
//! But: Destinations for matching wallets (stdout report or SQLite table).

use std::io::Write;
use std::path::Path;

use parking_lot::Mutex;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::SinkError;
use crate::wallet::WalletRecord;

/// Receives every wallet that passed the filter.
///
/// Implementations are shared across worker threads and must serialize
/// their own writes.
pub trait WalletSink: Send + Sync {
    fn store(&self, seed_line: usize, index: u32, wallet: &WalletRecord) -> Result<(), SinkError>;
}

// --- Sortie standard ---

/// Writes one `MATCH:` line per wallet to stdout.
pub struct StdoutSink;

impl StdoutSink {
    pub fn format(seed_line: usize, index: u32, wallet: &WalletRecord) -> String {
        format!(
            "MATCH: seed_line={seed_line} idx={index} addr={} pk={} hdpath={}",
            wallet.address, wallet.private_key, wallet.hd_path
        )
    }
}

impl WalletSink for StdoutSink {
    fn store(&self, seed_line: usize, index: u32, wallet: &WalletRecord) -> Result<(), SinkError> {
        let line = Self::format(seed_line, index, wallet);
        // The stdout lock keeps concurrent lines whole.
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        Ok(())
    }
}

// --- SQLite ---

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS wallets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL,
    private_key TEXT NOT NULL,
    hd_path TEXT NOT NULL,
    seed_line INTEGER NOT NULL,
    derivation_index INTEGER NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

const INSERT: &str = "INSERT INTO wallets (address, private_key, hd_path, seed_line, derivation_index)
    VALUES (?, ?, ?, ?, ?)";

/// A row of the `wallets` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredWallet {
    pub id: i64,
    pub address: String,
    pub private_key: String,
    pub hd_path: String,
    pub seed_line: i64,
    pub derivation_index: i64,
}

/// Append-only SQLite store.
///
/// The sweep itself is synchronous, so the sink owns a small current-thread
/// runtime and blocks on each statement. One writer at a time.
pub struct SqliteSink {
    pool: SqlitePool,
    runtime: Runtime,
    lock: Mutex<()>,
}

impl SqliteSink {
    /// Opens (or creates) the database at `path` and its parent directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = runtime.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?;
            sqlx::query(SCHEMA).execute(&pool).await?;
            Ok::<_, sqlx::Error>(pool)
        })?;

        info!(path = %path.display(), "Wallet database ready");
        Ok(Self {
            pool,
            runtime,
            lock: Mutex::new(()),
        })
    }

    pub fn wallets(&self) -> Result<Vec<StoredWallet>, SinkError> {
        let _guard = self.lock.lock();
        let rows = self.runtime.block_on(
            sqlx::query_as::<_, StoredWallet>(
                "SELECT id, address, private_key, hd_path, seed_line, derivation_index
                 FROM wallets ORDER BY id",
            )
            .fetch_all(&self.pool),
        )?;
        Ok(rows)
    }

    /// Closes the pool, waiting for pending statements.
    pub fn close(self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl WalletSink for SqliteSink {
    fn store(&self, seed_line: usize, index: u32, wallet: &WalletRecord) -> Result<(), SinkError> {
        let _guard = self.lock.lock();
        self.runtime.block_on(
            sqlx::query(INSERT)
                .bind(&wallet.address)
                .bind(&wallet.private_key)
                .bind(&wallet.hd_path)
                .bind(seed_line as i64)
                .bind(i64::from(index))
                .execute(&self.pool),
        )?;
        Ok(())
    }
}
