// SPDX-License-Identifier: GPL-3.0-or-later

//! Classifies watch-list entries into shows already in the library and shows missing from it.

use std::sync::Arc;

use animarr_domain::{ReconciliationQueue, TrackedEntry};
use tracing::{debug, info, warn};

use crate::ports::{LibraryLookup, LibrarySource};

pub struct Reconciler {
    library: Arc<dyn LibrarySource>,
}

impl Reconciler {
    pub fn new(library: Arc<dyn LibrarySource>) -> Self {
        Self { library }
    }

    /// Entries that have not aired yet or that the user has completed are left out.
    /// A library lookup failure drops that entry from this run only.
    pub async fn reconcile(&self, entries: &[TrackedEntry]) -> ReconciliationQueue {
        let mut queue = ReconciliationQueue::new();

        for entry in entries {
            if !entry.is_released() {
                debug!(target: "reconciler", title = %entry.title, "skipping show that has not been released");
                continue;
            }
            if entry.is_completed_by_user() {
                debug!(target: "reconciler", title = %entry.title, "skipping show completed by user");
                continue;
            }

            match self.library.find_by_title(entry).await {
                Ok(LibraryLookup::Found(items)) if !items.is_empty() => {
                    for item in items {
                        queue.push_matched(item, entry.clone());
                    }
                }
                Ok(_) => queue.push_missing(entry.clone()),
                Err(error) => {
                    warn!(
                        target: "reconciler",
                        title = %entry.title,
                        media_id = entry.media_id,
                        %error,
                        "library lookup failed, skipping entry"
                    );
                }
            }
        }

        info!(
            target: "reconciler",
            found = queue.matched().len(),
            missing = queue.missing().len(),
            "reconciled watch-list against library"
        );
        queue
    }
}
