// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory fakes for every port, recording how they were called.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use animarr_config::AppConfig;
use animarr_domain::{
    DownloadCandidate, DownloadRecord, LibraryItem, ListStatus, ReleaseStatus, TrackedEntry,
};
use animarr_infrastructure::{
    DownloadRecordRepository, FetchError, FileMover, RelocationError, RelocationRequest,
    StoreError, TorrentFetcher,
};
use async_trait::async_trait;

use crate::acquirer::{AcquisitionPorts, Acquirer};
use crate::pipeline::Pipeline;
use crate::ports::{
    DownloadClient, DownloadClientError, LibraryError, LibraryLookup, LibrarySource,
    ListSource, ListSourceError, SearchError, SearchSource,
};
use crate::reconciler::Reconciler;

pub(crate) fn entry(
    media_id: i64,
    title: &str,
    release_status: ReleaseStatus,
    list_status: ListStatus,
) -> TrackedEntry {
    TrackedEntry::new(media_id, title, release_status, list_status)
}

pub(crate) fn candidate(name: &str, entry: &TrackedEntry) -> DownloadCandidate {
    DownloadCandidate::new(name, format!("magnet:?xt=urn:btih:{name}")).for_entry(entry)
}

#[derive(Default)]
pub(crate) struct FakeList {
    entries: Mutex<Vec<TrackedEntry>>,
    fail: Mutex<bool>,
    requests: Mutex<Vec<ListStatus>>,
}

impl FakeList {
    pub fn set_entries(&self, entries: Vec<TrackedEntry>) {
        *self.entries.lock().unwrap() = entries;
    }

    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<ListStatus> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListSource for FakeList {
    async fn fetch(&self, status: ListStatus) -> Result<Vec<TrackedEntry>, ListSourceError> {
        self.requests.lock().unwrap().push(status);
        if *self.fail.lock().unwrap() {
            return Err(ListSourceError::Request("connection refused".to_string()));
        }
        Ok(self.entries.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeLibrary {
    shows: Mutex<HashMap<String, Vec<LibraryItem>>>,
    failing: Mutex<HashSet<String>>,
    lookups: Mutex<Vec<String>>,
}

impl FakeLibrary {
    pub fn add(&self, title: &str, items: Vec<LibraryItem>) {
        self.shows.lock().unwrap().insert(title.to_string(), items);
    }

    pub fn fail_for(&self, title: &str) {
        self.failing.lock().unwrap().insert(title.to_string());
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl LibrarySource for FakeLibrary {
    async fn find_by_title(&self, entry: &TrackedEntry) -> Result<LibraryLookup, LibraryError> {
        self.lookups.lock().unwrap().push(entry.title.clone());
        if self.failing.lock().unwrap().contains(&entry.title) {
            return Err(LibraryError::Request("library offline".to_string()));
        }
        Ok(match self.shows.lock().unwrap().get(&entry.title) {
            Some(items) => LibraryLookup::Found(items.clone()),
            None => LibraryLookup::NotFound,
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeSearch {
    missing: Mutex<HashMap<String, Vec<DownloadCandidate>>>,
    existing: Mutex<HashMap<String, Vec<DownloadCandidate>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn on_missing(&self, title: &str, results: Vec<DownloadCandidate>) {
        self.missing.lock().unwrap().insert(title.to_string(), results);
    }

    pub fn on_existing(&self, title: &str, results: Vec<DownloadCandidate>) {
        self.existing.lock().unwrap().insert(title.to_string(), results);
    }

    pub fn fail_for(&self, title: &str) {
        self.failing.lock().unwrap().insert(title.to_string());
    }

    /// `missing:<title>` / `existing:<title>` in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchSource for FakeSearch {
    async fn search_missing(
        &self,
        entry: &TrackedEntry,
        _config: &AppConfig,
    ) -> Result<Vec<DownloadCandidate>, SearchError> {
        self.calls.lock().unwrap().push(format!("missing:{}", entry.title));
        if self.failing.lock().unwrap().contains(&entry.title) {
            return Err(SearchError::Request("index timed out".to_string()));
        }
        Ok(self
            .missing
            .lock()
            .unwrap()
            .get(&entry.title)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_existing(
        &self,
        _item: &LibraryItem,
        entry: &TrackedEntry,
        _config: &AppConfig,
    ) -> Result<Vec<DownloadCandidate>, SearchError> {
        self.calls.lock().unwrap().push(format!("existing:{}", entry.title));
        if self.failing.lock().unwrap().contains(&entry.title) {
            return Err(SearchError::Request("index timed out".to_string()));
        }
        Ok(self
            .existing
            .lock()
            .unwrap()
            .get(&entry.title)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct FakeClient {
    rejecting: Mutex<bool>,
    panicking: Mutex<HashSet<String>>,
    added: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn reject_all(&self) {
        *self.rejecting.lock().unwrap() = true;
    }

    pub fn panic_on(&self, locator: &str) {
        self.panicking.lock().unwrap().insert(locator.to_string());
    }

    pub fn added(&self) -> Vec<String> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadClient for FakeClient {
    async fn add_magnet(&self, locator: &str) -> Result<(), DownloadClientError> {
        self.added.lock().unwrap().push(locator.to_string());
        if self.panicking.lock().unwrap().contains(locator) {
            panic!("client crashed on {locator}");
        }
        if *self.rejecting.lock().unwrap() {
            return Err(DownloadClientError::Rejected("duplicate torrent".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryRecords {
    records: Mutex<HashMap<String, DownloadRecord>>,
    fail_find: Mutex<bool>,
    fail_upsert: Mutex<bool>,
    finds: Mutex<Vec<String>>,
    upserts: Mutex<Vec<DownloadRecord>>,
}

impl MemoryRecords {
    pub fn seed(&self, record: DownloadRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.name.clone(), record);
    }

    pub fn fail_find(&self) {
        *self.fail_find.lock().unwrap() = true;
    }

    pub fn fail_upsert(&self) {
        *self.fail_upsert.lock().unwrap() = true;
    }

    pub fn finds(&self) -> Vec<String> {
        self.finds.lock().unwrap().clone()
    }

    pub fn upserts(&self) -> Vec<DownloadRecord> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn get(&self, name: &str) -> Option<DownloadRecord> {
        self.records.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl DownloadRecordRepository for MemoryRecords {
    async fn find_by_name(&self, name: &str) -> Result<Vec<DownloadRecord>, StoreError> {
        self.finds.lock().unwrap().push(name.to_string());
        if *self.fail_find.lock().unwrap() {
            return Err(StoreError::InvalidRecord {
                name: name.to_string(),
                reason: "store unavailable".to_string(),
            });
        }
        Ok(self.get(name).into_iter().collect())
    }

    async fn upsert(&self, record: &DownloadRecord) -> Result<(), StoreError> {
        self.upserts.lock().unwrap().push(record.clone());
        if *self.fail_upsert.lock().unwrap() {
            return Err(StoreError::InvalidRecord {
                name: record.name.clone(),
                reason: "disk full".to_string(),
            });
        }
        self.seed(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeFetcher {
    fail: Mutex<bool>,
    fetched: Mutex<Vec<(String, PathBuf, String)>>,
}

impl FakeFetcher {
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// `(url, directory, filename)` per call.
    pub fn fetched(&self) -> Vec<(String, PathBuf, String)> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl TorrentFetcher for FakeFetcher {
    async fn fetch(
        &self,
        url: &str,
        directory: &Path,
        filename: &str,
    ) -> Result<PathBuf, FetchError> {
        self.fetched.lock().unwrap().push((
            url.to_string(),
            directory.to_path_buf(),
            filename.to_string(),
        ));
        if *self.fail.lock().unwrap() {
            return Err(FetchError::HttpStatus {
                status: 503,
                url: url.to_string(),
            });
        }
        Ok(directory.join(filename))
    }
}

#[derive(Default)]
pub(crate) struct FakeMover {
    fail: Mutex<bool>,
    requests: Mutex<Vec<RelocationRequest>>,
}

impl FakeMover {
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<RelocationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileMover for FakeMover {
    async fn relocate(&self, request: &RelocationRequest) -> Result<PathBuf, RelocationError> {
        self.requests.lock().unwrap().push(request.clone());
        if *self.fail.lock().unwrap() {
            return Err(RelocationError::SourceMissing(request.source_path()));
        }
        Ok(request.destination_path())
    }
}

/// All fakes wired together; build components from it after configuring the fakes.
pub(crate) struct Harness {
    pub config: Arc<AppConfig>,
    pub list: Arc<FakeList>,
    pub library: Arc<FakeLibrary>,
    pub search: Arc<FakeSearch>,
    pub client: Arc<FakeClient>,
    pub records: Arc<MemoryRecords>,
    pub fetcher: Arc<FakeFetcher>,
    pub mover: Arc<FakeMover>,
}

impl Harness {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.acquisition.torrent_download_directory = PathBuf::from("/data/torrents");
        config.acquisition.torrent_monitor_directory = PathBuf::from("/data/watch");
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            list: Arc::default(),
            library: Arc::default(),
            search: Arc::default(),
            client: Arc::default(),
            records: Arc::default(),
            fetcher: Arc::default(),
            mover: Arc::default(),
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.library.clone())
    }

    pub fn acquirer(&self) -> Acquirer {
        Acquirer::new(
            self.config.clone(),
            AcquisitionPorts {
                search: self.search.clone(),
                records: self.records.clone(),
                client: self.client.clone(),
                fetcher: self.fetcher.clone(),
                mover: self.mover.clone(),
            },
        )
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.config.clone(),
            self.list.clone(),
            self.reconciler(),
            self.acquirer(),
        )
    }
}
