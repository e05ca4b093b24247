// SPDX-License-Identifier: GPL-3.0-or-later

//! Searches the torrent index for reconciled shows and hands each new release to the
//! torrent client exactly once, falling back to a direct `.torrent` download.

use std::collections::HashSet;
use std::sync::Arc;

use animarr_config::AppConfig;
use animarr_domain::{
    DownloadCandidate, DownloadRecord, EntryRef, ReconciliationQueue, RecordStatus,
};
use animarr_infrastructure::{
    DownloadRecordRepository, FileMover, RelocationRequest, TorrentFetcher,
};
use tracing::{error, info, warn};

use crate::fail_soft::catch_panic;
use crate::ports::{DownloadClient, SearchSource};

/// Why a candidate was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No tracked entry to file the release under.
    Unlinked,
    /// A record for this name exists, or it was already handled earlier in the run.
    AlreadyHandled,
    /// The record store could not be consulted, so nothing was attempted.
    DedupLookupFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    Skipped(SkipReason),
    /// Accepted by the torrent client.
    Queued,
    /// Fetched directly; `relocated` tells whether it reached the monitored directory.
    Downloaded { relocated: bool },
    /// Neither the client nor the direct download worked. No record was written.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedCandidate {
    pub candidate: DownloadCandidate,
    pub outcome: CandidateOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionReport {
    pub processed: Vec<ProcessedCandidate>,
}

impl AcquisitionReport {
    fn count(&self, predicate: impl Fn(&CandidateOutcome) -> bool) -> usize {
        self.processed.iter().filter(|p| predicate(&p.outcome)).count()
    }

    pub fn queued(&self) -> usize {
        self.count(|o| matches!(o, CandidateOutcome::Queued))
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, CandidateOutcome::Downloaded { .. }))
    }

    pub fn relocated(&self) -> usize {
        self.count(|o| matches!(o, CandidateOutcome::Downloaded { relocated: true }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CandidateOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CandidateOutcome::Failed { .. }))
    }
}

/// Everything the acquirer talks to.
pub struct AcquisitionPorts {
    pub search: Arc<dyn SearchSource>,
    pub records: Arc<dyn DownloadRecordRepository>,
    pub client: Arc<dyn DownloadClient>,
    pub fetcher: Arc<dyn TorrentFetcher>,
    pub mover: Arc<dyn FileMover>,
}

pub struct Acquirer {
    config: Arc<AppConfig>,
    ports: AcquisitionPorts,
}

impl Acquirer {
    pub fn new(config: Arc<AppConfig>, ports: AcquisitionPorts) -> Self {
        Self { config, ports }
    }

    /// Search results for every missing show, then for every matched show.
    /// A failed or empty search contributes nothing.
    pub async fn acquire(&self, queue: &ReconciliationQueue) -> Vec<DownloadCandidate> {
        let mut candidates = Vec::new();

        info!(target: "acquirer", count = queue.missing().len(), "searching for shows missing from the library");
        for entry in queue.missing() {
            match self.ports.search.search_missing(entry, &self.config).await {
                Ok(results) if !results.is_empty() => candidates.extend(results),
                Ok(_) => {
                    info!(target: "acquirer", title = %entry.title, "no releases found for missing show");
                }
                Err(error) => {
                    warn!(target: "acquirer", title = %entry.title, %error, "search for missing show failed");
                }
            }
        }

        info!(target: "acquirer", count = queue.matched().len(), "searching for new episodes of shows in the library");
        for matched in queue.matched() {
            match self
                .ports
                .search
                .search_existing(&matched.item, &matched.entry, &self.config)
                .await
            {
                Ok(results) if !results.is_empty() => candidates.extend(results),
                Ok(_) => {
                    info!(
                        target: "acquirer",
                        terms = ?matched.entry.search_terms(),
                        "no new releases found"
                    );
                }
                Err(error) => {
                    warn!(
                        target: "acquirer",
                        title = %matched.entry.title,
                        library_key = %matched.item.key,
                        %error,
                        "search for new episodes failed"
                    );
                }
            }
        }

        candidates
    }

    /// Decide and act on each candidate in order. Never fails as a whole.
    pub async fn process(&self, candidates: Vec<DownloadCandidate>) -> AcquisitionReport {
        let mut handled = HashSet::new();
        let mut report = AcquisitionReport::default();

        for mut candidate in candidates {
            let outcome = match catch_panic(self.handle(&mut candidate, &mut handled)).await {
                Ok(outcome) => outcome,
                Err(panic) => {
                    error!(target: "acquirer", candidate = %candidate.name, %panic, "candidate handling panicked");
                    CandidateOutcome::Failed { reason: panic }
                }
            };
            report.processed.push(ProcessedCandidate { candidate, outcome });
        }

        report
    }

    async fn handle(
        &self,
        candidate: &mut DownloadCandidate,
        handled: &mut HashSet<String>,
    ) -> CandidateOutcome {
        let Some(entry) = candidate.entry.clone() else {
            info!(target: "acquirer", candidate = %candidate.name, "skipping release without a tracked entry");
            return CandidateOutcome::Skipped(SkipReason::Unlinked);
        };

        if handled.contains(&candidate.name) {
            info!(target: "acquirer", candidate = %candidate.name, "skipping release handled earlier in this run");
            return CandidateOutcome::Skipped(SkipReason::AlreadyHandled);
        }

        match self.ports.records.find_by_name(&candidate.name).await {
            Ok(existing) if !existing.is_empty() => {
                info!(target: "acquirer", candidate = %candidate.name, title = %entry.title, "skipping existing download");
                return CandidateOutcome::Skipped(SkipReason::AlreadyHandled);
            }
            Ok(_) => {}
            Err(error) => {
                error!(target: "acquirer", candidate = %candidate.name, %error, "download record lookup failed, skipping");
                return CandidateOutcome::Skipped(SkipReason::DedupLookupFailed);
            }
        }

        handled.insert(candidate.name.clone());

        match self.ports.client.add_magnet(&candidate.download_url).await {
            Ok(()) => {
                candidate.mark_queued();
                self.persist(candidate, RecordStatus::Queued).await;
                info!(target: "acquirer", candidate = %candidate.name, title = %entry.title, "queued release");
                CandidateOutcome::Queued
            }
            Err(error) => {
                warn!(
                    target: "acquirer",
                    candidate = %candidate.name,
                    %error,
                    "torrent client rejected release, downloading torrent file instead"
                );
                self.download_directly(candidate, &entry).await
            }
        }
    }

    async fn download_directly(
        &self,
        candidate: &DownloadCandidate,
        entry: &EntryRef,
    ) -> CandidateOutcome {
        let save_dir = self.config.build_parent_save_path(&entry.title);
        let filename = candidate.torrent_filename();

        info!(target: "acquirer", candidate = %candidate.name, "downloading torrent file");
        if let Err(error) = self
            .ports
            .fetcher
            .fetch(&candidate.download_url, &save_dir, &filename)
            .await
        {
            warn!(target: "acquirer", candidate = %candidate.name, title = %entry.title, %error, "failed to download torrent file");
            return CandidateOutcome::Failed {
                reason: error.to_string(),
            };
        }

        let request = RelocationRequest {
            filename,
            source_dir: save_dir,
            destination_dir: self.config.acquisition.torrent_monitor_directory.clone(),
            keep_file: self.config.acquisition.torrent_keep_file_after_queuing,
        };
        let relocated = match self.ports.mover.relocate(&request).await {
            Ok(path) => {
                info!(target: "acquirer", candidate = %candidate.name, path = %path.display(), "moved torrent file to monitored directory");
                true
            }
            Err(error) => {
                error!(target: "acquirer", candidate = %candidate.name, %error, "failed to move torrent file to monitored directory");
                false
            }
        };

        // Written even when the move failed so the release is not fetched again next run.
        let status = if relocated {
            RecordStatus::Relocated
        } else {
            RecordStatus::Downloaded
        };
        self.persist(candidate, status).await;

        CandidateOutcome::Downloaded { relocated }
    }

    async fn persist(&self, candidate: &DownloadCandidate, status: RecordStatus) {
        let record = DownloadRecord::from_candidate(candidate, status);
        if let Err(error) = self.ports.records.upsert(&record).await {
            error!(target: "acquirer", candidate = %candidate.name, %status, %error, "failed to save download record");
        }
    }
}
