// SPDX-License-Identifier: GPL-3.0-or-later
use animarr_domain::{DownloadRecord, RecordStatus};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::SqlitePool;
use tracing::debug;

use crate::repositories::{DownloadRecordRepository, StoreError};

/// SQLx-backed download record repository
pub struct SqliteDownloadRecordRepository {
    pool: SqlitePool,
}

impl SqliteDownloadRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DownloadRecordRepository for SqliteDownloadRecordRepository {
    async fn find_by_name(&self, name: &str) -> Result<Vec<DownloadRecord>, StoreError> {
        debug!(target: "repository", name, "fetching download records by name");
        let rows = sqlx::query("SELECT * FROM download_records WHERE name = ?")
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn upsert(&self, record: &DownloadRecord) -> Result<(), StoreError> {
        debug!(target: "repository", name = %record.name, status = %record.status, "upserting download record");
        let q = r#"
            INSERT INTO download_records (
                name, download_url, media_id, title, episode, status, handled_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                download_url = excluded.download_url,
                media_id = excluded.media_id,
                title = excluded.title,
                episode = excluded.episode,
                status = excluded.status,
                handled_at = excluded.handled_at
        "#;

        sqlx::query(q)
            .bind(record.name.as_str())
            .bind(record.download_url.as_str())
            .bind(record.media_id)
            .bind(record.title.as_deref())
            .bind(record.episode.map(i64::from))
            .bind(record.status.to_string())
            .bind(record.handled_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<DownloadRecord, StoreError> {
    let name: String = row.try_get("name")?;
    let download_url: String = row.try_get("download_url")?;
    let media_id: Option<i64> = row.try_get("media_id")?;
    let title: Option<String> = row.try_get("title")?;
    let episode: Option<i64> = row.try_get("episode")?;
    let status_str: String = row.try_get("status")?;
    let handled_at_s: String = row.try_get("handled_at")?;

    let invalid = |reason: String| StoreError::InvalidRecord {
        name: name.clone(),
        reason,
    };

    let episode = episode
        .map(u32::try_from)
        .transpose()
        .map_err(|e| invalid(format!("episode out of range: {e}")))?;
    let status: RecordStatus = status_str.parse().map_err(|e| invalid(format!("{e}")))?;
    let handled_at = DateTime::parse_from_rfc3339(&handled_at_s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid(format!("bad handled_at: {e}")))?;

    Ok(DownloadRecord {
        name,
        download_url,
        media_id,
        title,
        episode,
        status,
        handled_at,
    })
}
