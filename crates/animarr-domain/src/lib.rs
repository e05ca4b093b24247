// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status: {value}")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

/// Airing state of a show as reported by the list service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseStatus {
    Finished,
    Releasing,
    NotYetReleased,
    Cancelled,
    Hiatus,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finished => "FINISHED",
            Self::Releasing => "RELEASING",
            Self::NotYetReleased => "NOT_YET_RELEASED",
            Self::Cancelled => "CANCELLED",
            Self::Hiatus => "HIATUS",
        }
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FINISHED" => Ok(Self::Finished),
            "RELEASING" => Ok(Self::Releasing),
            "NOT_YET_RELEASED" => Ok(Self::NotYetReleased),
            "CANCELLED" => Ok(Self::Cancelled),
            "HIATUS" => Ok(Self::Hiatus),
            _ => Err(UnknownStatus {
                kind: "release",
                value: value.to_string(),
            }),
        }
    }
}

/// The user's own progress state for a title on their list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    Current,
    Planning,
    Completed,
    Dropped,
    Paused,
    Repeating,
}

impl ListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Planning => "PLANNING",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
            Self::Repeating => "REPEATING",
        }
    }
}

impl std::fmt::Display for ListStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CURRENT" => Ok(Self::Current),
            "PLANNING" => Ok(Self::Planning),
            "COMPLETED" => Ok(Self::Completed),
            "DROPPED" => Ok(Self::Dropped),
            "PAUSED" => Ok(Self::Paused),
            "REPEATING" => Ok(Self::Repeating),
            _ => Err(UnknownStatus {
                kind: "list",
                value: value.to_string(),
            }),
        }
    }
}

/// How a download record came to be. Any status means the candidate has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Accepted by the torrent client from its magnet/URL.
    Queued,
    /// `.torrent` file fetched directly but not handed to the monitored directory.
    Downloaded,
    /// `.torrent` file fetched and placed in the monitored directory.
    Relocated,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Downloaded => write!(f, "downloaded"),
            Self::Relocated => write!(f, "relocated"),
        }
    }
}

impl FromStr for RecordStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "queued" => Ok(Self::Queued),
            "downloaded" => Ok(Self::Downloaded),
            "relocated" => Ok(Self::Relocated),
            _ => Err(UnknownStatus {
                kind: "record",
                value: value.to_string(),
            }),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A title on the user's remote watch-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    pub media_id: i64,
    pub title: String,
    pub synonyms: Vec<String>,
    pub release_status: ReleaseStatus,
    pub list_status: ListStatus,
    /// Episodes the user has watched.
    pub progress: u32,
    /// Total episode count, when the list service knows it.
    pub episodes: Option<u32>,
}

impl TrackedEntry {
    pub fn new(
        media_id: i64,
        title: impl Into<String>,
        release_status: ReleaseStatus,
        list_status: ListStatus,
    ) -> Self {
        Self {
            media_id,
            title: title.into(),
            synonyms: Vec::new(),
            release_status,
            list_status,
            progress: 0,
            episodes: None,
        }
    }

    pub fn is_released(&self) -> bool {
        self.release_status != ReleaseStatus::NotYetReleased
    }

    pub fn is_completed_by_user(&self) -> bool {
        self.list_status == ListStatus::Completed
    }

    /// Title followed by its distinct, non-blank synonyms.
    pub fn search_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::with_capacity(self.synonyms.len() + 1);
        for term in std::iter::once(&self.title).chain(self.synonyms.iter()) {
            let term = term.trim();
            if term.is_empty() || terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
                continue;
            }
            terms.push(term.to_string());
        }
        terms
    }

    pub fn entry_ref(&self) -> EntryRef {
        EntryRef {
            media_id: self.media_id,
            title: self.title.clone(),
        }
    }
}

/// Back-reference from a candidate to the tracked title it satisfies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    pub media_id: i64,
    pub title: String,
}

/// A show present in the local media library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub key: String,
    pub title: String,
    pub episode_count: u32,
}

impl LibraryItem {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            episode_count: 0,
        }
    }
}

/// A release offered by the torrent index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadCandidate {
    /// Release name; the dedup key.
    pub name: String,
    /// Magnet URI or `.torrent` URL.
    pub download_url: String,
    pub entry: Option<EntryRef>,
    pub episode: Option<u32>,
    pub size_bytes: Option<u64>,
    pub seeders: Option<u32>,
    pub queued: bool,
}

impl DownloadCandidate {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            entry: None,
            episode: None,
            size_bytes: None,
            seeders: None,
            queued: false,
        }
    }

    pub fn for_entry(mut self, entry: &TrackedEntry) -> Self {
        self.entry = Some(entry.entry_ref());
        self
    }

    /// File name for a directly downloaded `.torrent`. Index names may carry path
    /// separators, so the name is reduced to a single path component first.
    pub fn torrent_filename(&self) -> String {
        format!("{}.torrent", sanitize_path_component(&self.name))
    }

    pub fn mark_queued(&mut self) {
        self.queued = true;
    }
}

/// Reduce arbitrary text to something usable as one file or folder name.
///
/// Separators and characters reserved on common filesystems become `_`, surrounding
/// whitespace and trailing dots are dropped, and an empty result becomes `untitled`.
pub fn sanitize_path_component(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Durable marker that a candidate name has been handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub name: String,
    pub download_url: String,
    pub media_id: Option<i64>,
    pub title: Option<String>,
    pub episode: Option<u32>,
    pub status: RecordStatus,
    pub handled_at: DateTime<Utc>,
}

impl DownloadRecord {
    pub fn from_candidate(candidate: &DownloadCandidate, status: RecordStatus) -> Self {
        Self {
            name: candidate.name.clone(),
            download_url: candidate.download_url.clone(),
            media_id: candidate.entry.as_ref().map(|e| e.media_id),
            title: candidate.entry.as_ref().map(|e| e.title.clone()),
            episode: candidate.episode,
            status,
            handled_at: Utc::now(),
        }
    }
}

// ============================================================================
// Reconciliation queue
// ============================================================================

/// A library show paired with the tracked entry it was matched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedShow {
    pub item: LibraryItem,
    pub entry: TrackedEntry,
}

/// Output of reconciling the watch-list against the library, consumed once by acquisition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationQueue {
    matched: Vec<MatchedShow>,
    missing: Vec<TrackedEntry>,
}

impl ReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_matched(&mut self, item: LibraryItem, entry: TrackedEntry) {
        self.matched.push(MatchedShow { item, entry });
    }

    pub fn push_missing(&mut self, entry: TrackedEntry) {
        self.missing.push(entry);
    }

    pub fn matched(&self) -> &[MatchedShow] {
        &self.matched
    }

    pub fn missing(&self) -> &[TrackedEntry] {
        &self.missing
    }

    /// Library items found, in match order.
    pub fn found(&self) -> impl Iterator<Item = &LibraryItem> + '_ {
        self.matched.iter().map(|m| &m.item)
    }

    /// Tracked entries behind each found item, position-aligned with [`Self::found`].
    pub fn matched_entries(&self) -> impl Iterator<Item = &TrackedEntry> + '_ {
        self.matched.iter().map(|m| &m.entry)
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.missing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}
