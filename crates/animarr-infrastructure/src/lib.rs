// SPDX-License-Identifier: GPL-3.0-or-later
pub mod fetcher;
pub mod repositories;
pub mod sqlite_adapters;
pub mod storage;
pub mod telemetry;

pub use fetcher::{FetchError, HttpTorrentFetcher, TorrentFetcher};
pub use repositories::{DownloadRecordRepository, StoreError};
pub use sqlite_adapters::SqliteDownloadRecordRepository;
pub use storage::{
    is_plain_file_name, FileMover, FsFileMover, RelocationError, RelocationRequest,
};

use anyhow::Result;
use animarr_config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

pub async fn init_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    info!(target: "infrastructure", "initializing database");

    let db_url = normalize_sqlite_url(&config.url)?;
    info!(target: "infrastructure", db_url = %db_url, "connecting to database");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.pool_max_size)
        .connect(&db_url)
        .await?;

    info!(target: "infrastructure", db_url = %config.url, "running migrations");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    info!(target: "infrastructure", "database initialized successfully");
    Ok(pool)
}

/// File-backed sqlite URLs become absolute, get their parent directory created
/// and open in create mode. Anything else is passed through.
fn normalize_sqlite_url(url: &str) -> Result<String> {
    if !url.starts_with("sqlite://") || url.starts_with("sqlite://:memory:") {
        return Ok(url.to_string());
    }

    let db_path = url.trim_start_matches("sqlite://");
    let path = Path::new(db_path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
            info!(target: "infrastructure", path = %parent.display(), "created database directory");
        }
    }

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    // SQLite accepts forward slashes on every platform
    let path_str = absolute_path.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite://{}?mode=rwc", path_str))
}
