// SPDX-License-Identifier: GPL-3.0-or-later

//! Placement of fetched `.torrent` files into the directory the torrent client watches.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// True when `name` is exactly one normal path component, so joining it onto a
/// directory cannot leave that directory.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRequest {
    pub filename: String,
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    /// Leave the source file in place (copy) instead of moving it.
    pub keep_file: bool,
}

impl RelocationRequest {
    pub fn source_path(&self) -> PathBuf {
        self.source_dir.join(&self.filename)
    }

    pub fn destination_path(&self) -> PathBuf {
        self.destination_dir.join(&self.filename)
    }
}

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("not a plain file name: {0}")]
    InvalidFilename(String),
    #[error("source file does not exist: {0}")]
    SourceMissing(PathBuf),
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocationError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait::async_trait]
pub trait FileMover: Send + Sync {
    /// Place the requested file in its destination directory, returning the new path.
    async fn relocate(&self, request: &RelocationRequest) -> Result<PathBuf, RelocationError>;
}

/// Local filesystem mover.
#[derive(Debug, Clone, Default)]
pub struct FsFileMover;

impl FsFileMover {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl FileMover for FsFileMover {
    async fn relocate(&self, request: &RelocationRequest) -> Result<PathBuf, RelocationError> {
        if !is_plain_file_name(&request.filename) {
            return Err(RelocationError::InvalidFilename(request.filename.clone()));
        }

        let source = request.source_path();
        let destination = request.destination_path();

        if !fs::try_exists(&source)
            .await
            .map_err(|e| RelocationError::io(&source, e))?
        {
            return Err(RelocationError::SourceMissing(source));
        }

        fs::create_dir_all(&request.destination_dir)
            .await
            .map_err(|e| RelocationError::io(&request.destination_dir, e))?;

        if request.keep_file {
            debug!(target: "storage", from = %source.display(), to = %destination.display(), "copying file");
            fs::copy(&source, &destination)
                .await
                .map_err(|e| RelocationError::io(&destination, e))?;
            return Ok(destination);
        }

        debug!(target: "storage", from = %source.display(), to = %destination.display(), "moving file");
        if let Err(e) = fs::rename(&source, &destination).await {
            // rename cannot cross filesystems
            warn!(target: "storage", error = %e, "rename failed, falling back to copy and remove");
            fs::copy(&source, &destination)
                .await
                .map_err(|e| RelocationError::io(&destination, e))?;
            fs::remove_file(&source)
                .await
                .map_err(|e| RelocationError::io(&source, e))?;
        }

        Ok(destination)
    }
}
