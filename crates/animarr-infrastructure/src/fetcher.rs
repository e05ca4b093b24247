// SPDX-License-Identifier: GPL-3.0-or-later

//! Direct download of `.torrent` files, used when the torrent client refuses a locator.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::storage::is_plain_file_name;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("locator cannot be fetched directly: {0}")]
    UnsupportedLocator(String),
    #[error("not a plain file name: {0}")]
    InvalidFilename(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server responded with status {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
pub trait TorrentFetcher: Send + Sync {
    /// Download `url` into `directory/filename`, returning the written path.
    async fn fetch(
        &self,
        url: &str,
        directory: &Path,
        filename: &str,
    ) -> Result<PathBuf, FetchError>;
}

pub struct HttpTorrentFetcher {
    client: Client,
}

impl HttpTorrentFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().pool_max_idle_per_host(8).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TorrentFetcher for HttpTorrentFetcher {
    async fn fetch(
        &self,
        url: &str,
        directory: &Path,
        filename: &str,
    ) -> Result<PathBuf, FetchError> {
        if !is_plain_file_name(filename) {
            return Err(FetchError::InvalidFilename(filename.to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::UnsupportedLocator(url.to_string()));
        }

        debug!(target: "fetcher", url, "fetching torrent file");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        fs::create_dir_all(directory)
            .await
            .map_err(|source| FetchError::Io {
                path: directory.to_path_buf(),
                source,
            })?;

        let path = directory.join(filename);
        let written = match stream_to_file(response, &path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(target: "fetcher", path = %path.display(), "removing partial file");
                let _ = fs::remove_file(&path).await;
                return Err(e);
            }
        };

        info!(target: "fetcher", path = %path.display(), bytes = written, "torrent file saved");
        Ok(path)
    }
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<u64, FetchError> {
    let io_err = |source: std::io::Error| FetchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await.map_err(io_err)?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(io_err)?;
    Ok(bytes_written)
}
