// SPDX-License-Identifier: GPL-3.0-or-later

//! Collaborators the pipeline drives but does not implement: the remote watch-list,
//! the local media library, the torrent index and the torrent client.

use animarr_config::AppConfig;
use animarr_domain::{DownloadCandidate, LibraryItem, ListStatus, TrackedEntry};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListSourceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("authentication failed")]
    Authentication,
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("library section not found: {0}")]
    SectionNotFound(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("feed parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum DownloadClientError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("authentication failed")]
    Authentication,
    #[error("torrent rejected: {0}")]
    Rejected(String),
}

/// Result of looking a tracked entry up in the local library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLookup {
    Found(Vec<LibraryItem>),
    NotFound,
}

#[async_trait]
pub trait ListSource: Send + Sync {
    /// Entries on the user's list with the given status, in list order.
    async fn fetch(&self, status: ListStatus) -> Result<Vec<TrackedEntry>, ListSourceError>;
}

#[async_trait]
pub trait LibrarySource: Send + Sync {
    /// Library shows whose title matches the entry.
    async fn find_by_title(&self, entry: &TrackedEntry) -> Result<LibraryLookup, LibraryError>;
}

#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Releases for a show that has nothing in the library yet.
    async fn search_missing(
        &self,
        entry: &TrackedEntry,
        config: &AppConfig,
    ) -> Result<Vec<DownloadCandidate>, SearchError>;

    /// Releases newer than what the library already holds for `item`.
    async fn search_existing(
        &self,
        item: &LibraryItem,
        entry: &TrackedEntry,
        config: &AppConfig,
    ) -> Result<Vec<DownloadCandidate>, SearchError>;
}

#[async_trait]
pub trait DownloadClient: Send + Sync {
    /// Hand a magnet URI or torrent URL to the client. `Err` means the client did not take it.
    async fn add_magnet(&self, locator: &str) -> Result<(), DownloadClientError>;
}
