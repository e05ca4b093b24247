// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use animarr_config::AppConfig;
use anyhow::{Context, Result};
use tracing::{error, info};

use crate::acquirer::{AcquisitionReport, Acquirer};
use crate::fail_soft::catch_panic;
use crate::ports::ListSource;
use crate::reconciler::Reconciler;

/// Where a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The list service returned no entries for the configured status.
    NoEntries,
    /// No entry survived reconciliation.
    NothingTracked,
    /// Searches produced no candidates.
    NothingToDo,
    Completed(AcquisitionReport),
    Failed(String),
}

/// One pass of list → library → index → torrent client. Meant to be invoked
/// periodically; the download record store carries state between passes.
pub struct Pipeline {
    config: Arc<AppConfig>,
    list: Arc<dyn ListSource>,
    reconciler: Reconciler,
    acquirer: Acquirer,
}

impl Pipeline {
    pub fn new(
        config: Arc<AppConfig>,
        list: Arc<dyn ListSource>,
        reconciler: Reconciler,
        acquirer: Acquirer,
    ) -> Self {
        Self {
            config,
            list,
            reconciler,
            acquirer,
        }
    }

    /// Run once. Errors and panics are logged here and never escape.
    pub async fn run(&self) -> RunOutcome {
        match catch_panic(self.execute()).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                let message = format!("{e:#}");
                error!(target: "pipeline", error = %message, "uncaught error, ending run");
                RunOutcome::Failed(message)
            }
            Err(panic) => {
                error!(target: "pipeline", %panic, "run panicked, ending run");
                RunOutcome::Failed(panic)
            }
        }
    }

    /// Run once, surfacing setup failures to the caller.
    pub async fn execute(&self) -> Result<RunOutcome> {
        let status = self.config.list.status;

        let entries = self
            .list
            .fetch(status)
            .await
            .with_context(|| format!("failed to fetch {status} list entries"))?;
        info!(target: "pipeline", count = entries.len(), %status, "fetched tracked entries");
        if entries.is_empty() {
            return Ok(RunOutcome::NoEntries);
        }

        let queue = self.reconciler.reconcile(&entries).await;
        if queue.is_empty() {
            info!(target: "pipeline", "nothing left to track after reconciliation");
            return Ok(RunOutcome::NothingTracked);
        }

        let candidates = self.acquirer.acquire(&queue).await;
        if candidates.is_empty() {
            info!(target: "pipeline", "no new episodes to download, ending run");
            return Ok(RunOutcome::NothingToDo);
        }

        let report = self.acquirer.process(candidates).await;
        info!(
            target: "pipeline",
            queued = report.queued(),
            downloaded = report.downloaded(),
            relocated = report.relocated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "run complete"
        );
        Ok(RunOutcome::Completed(report))
    }
}
