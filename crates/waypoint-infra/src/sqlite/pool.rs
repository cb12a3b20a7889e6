//! Connection pools for the checkpoint database.
//!
//! SQLite allows only one writer at a time. `DatabasePool` keeps a
//! multi-connection reader pool for lookups and a single-connection writer
//! pool for upserts. Both use WAL journal mode and a busy timeout.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Reader and writer pools over one checkpoint database file.
///
/// - `reader`: read-only, up to 8 connections, used by step lookups.
/// - `writer`: one connection, used by checkpoint upserts and migrations.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open both pools on the database file at `path`.
    ///
    /// Creates the database file if needed and runs migrations on the writer
    /// pool before the reader pool is opened.
    pub async fn new(path: &Path) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }

    /// Close both pools, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_closed() && self.writer.is_closed()
    }
}

/// Returns the data directory from `WAYPOINT_DATA_DIR`, falling back to the
/// current directory.
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("WAYPOINT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
