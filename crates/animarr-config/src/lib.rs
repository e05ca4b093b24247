// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};

use anyhow::Result;
use animarr_domain::{sanitize_path_component, ListStatus};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://animarr.db".to_string(),
            pool_max_size: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Which part of the remote watch-list is reconciled on each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// List status filter, e.g. `CURRENT` or `PLANNING`.
    pub status: ListStatus,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            status: ListStatus::Current,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Root under which directly downloaded `.torrent` files are saved, one folder per show.
    pub torrent_download_directory: PathBuf,
    /// Directory watched by the torrent client for new `.torrent` files.
    pub torrent_monitor_directory: PathBuf,
    /// Copy instead of move when handing a file to the monitored directory.
    pub torrent_keep_file_after_queuing: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            torrent_download_directory: PathBuf::from("downloads/torrents"),
            torrent_monitor_directory: PathBuf::from("watch"),
            torrent_keep_file_after_queuing: false,
        }
    }
}

/// Preferences handed through to search adapters untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub preferred_resolution: String,
    pub preferred_groups: Vec<String>,
    pub max_results_per_entry: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            preferred_resolution: "1080p".to_string(),
            preferred_groups: Vec::new(),
            max_results_per_entry: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub telemetry: TelemetryConfig,
    pub list: ListConfig,
    pub acquisition: AcquisitionConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    /// Folder a show's directly downloaded `.torrent` files are written to.
    pub fn build_parent_save_path(&self, title: &str) -> PathBuf {
        self.acquisition
            .torrent_download_directory
            .join(sanitize_path_component(title))
    }
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: ANIMARR_).
///
/// Status names are validated here, so an unknown `list.status` fails the load.
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("ANIMARR_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
