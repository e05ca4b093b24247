// SPDX-License-Identifier: GPL-3.0-or-later

//! Watch-list driven acquisition: reconcile the user's tracked shows against the
//! local library, search the torrent index for what is missing or newer, and hand
//! each release to the torrent client at most once across runs.

pub mod acquirer;
mod fail_soft;
pub mod pipeline;
pub mod ports;
pub mod reconciler;
#[cfg(test)]
mod test_support;

pub use acquirer::{
    AcquisitionPorts, AcquisitionReport, Acquirer, CandidateOutcome, ProcessedCandidate,
    SkipReason,
};
pub use pipeline::{Pipeline, RunOutcome};
pub use ports::{
    DownloadClient, DownloadClientError, LibraryError, LibraryLookup, LibrarySource, ListSource,
    ListSourceError, SearchError, SearchSource,
};
pub use reconciler::Reconciler;
