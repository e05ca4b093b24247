// SPDX-License-Identifier: GPL-3.0-or-later
use animarr_domain::DownloadRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid stored record {name}: {reason}")]
    InvalidRecord { name: String, reason: String },
}

/// Durable record of handled candidates, keyed by candidate name.
///
/// Existence of any record for a name means the candidate was already queued or
/// downloaded and must not be acted on again.
#[async_trait::async_trait]
pub trait DownloadRecordRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Vec<DownloadRecord>, StoreError>;

    /// Insert or replace the record stored under `record.name`.
    async fn upsert(&self, record: &DownloadRecord) -> Result<(), StoreError>;
}
