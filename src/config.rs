//! Configuration loading and request assembly.
//!
//! The configuration is a TOML file. Only the sections that affect torrent
//! creation are modelled; other sections are ignored.
//!
//! ```toml
//! log_level = "info"
//! announce_url = "https://tracker.example/announce/TOKEN"
//! output_dir = "output"
//!
//! [torrent]
//! piece_size = "auto"
//! private = true
//! source = "MUA"
//!
//! [trackers.YUS]
//! announce_url = "https://yu-scene.net/announce/TOKEN"
//! source_name = "YuScene"
//! ```

mod error;
mod tracker;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMMENT, DEFAULT_CONFIG_CREATED_BY, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE,
};
use crate::metainfo::{MetainfoRequest, PieceSize};

pub use error::ConfigError;
pub use tracker::{Tracker, TrackerConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Global fallback announce URL.
    #[serde(default)]
    pub announce_url: Option<String>,
    /// Where torrents are written; the input's parent directory when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub torrent: TorrentConfig,
    #[serde(default)]
    pub trackers: BTreeMap<Tracker, TrackerConfig>,
}

/// The `[torrent]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentConfig {
    pub piece_size: PieceSize,
    pub private: bool,
    pub comment: Option<String>,
    pub source: Option<String>,
    pub created_by: Option<String>,
    /// Overrides the top-level announce URL.
    pub announce_url: Option<String>,
}

/// Per-invocation values that take precedence over the configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub announce_url: Option<String>,
    pub tracker: Option<Tracker>,
    pub piece_size: Option<PieceSize>,
    pub comment: Option<String>,
    pub source: Option<String>,
    pub created_by: Option<String>,
    pub private: Option<bool>,
    pub output_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TorrentConfig {
    fn default() -> Self {
        Self {
            piece_size: PieceSize::Auto,
            private: true,
            comment: Some(DEFAULT_COMMENT.to_string()),
            source: Some(DEFAULT_SOURCE.to_string()),
            created_by: Some(DEFAULT_CONFIG_CREATED_BY.to_string()),
            announce_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            announce_url: None,
            output_dir: Some(PathBuf::from(DEFAULT_OUTPUT_DIR)),
            torrent: TorrentConfig::default(),
            trackers: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(data: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(data)?)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&data)
    }

    /// Loads `explicit` if given (it must exist), otherwise `fallback` if it
    /// exists, otherwise the built-in defaults.
    pub fn load_or_default(
        explicit: Option<&Path>,
        fallback: impl AsRef<Path>,
    ) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::load_file(path),
            None if fallback.as_ref().is_file() => Self::load_file(fallback),
            None => Ok(Config::default()),
        }
    }

    /// Settings for `tracker`, failing if the tracker is disabled.
    pub fn tracker(&self, tracker: Tracker) -> Result<Option<&TrackerConfig>, ConfigError> {
        match self.trackers.get(&tracker) {
            Some(cfg) if !cfg.enabled => Err(ConfigError::TrackerDisabled(tracker)),
            other => Ok(other),
        }
    }

    /// Resolves the announce URL: `explicit`, then the tracker's URL, then
    /// `[torrent].announce_url`, then the top-level `announce_url`.
    /// Blank values are skipped.
    pub fn resolve_announce(
        &self,
        explicit: Option<&str>,
        tracker: Option<Tracker>,
    ) -> Result<String, ConfigError> {
        let tracker_url = match tracker {
            Some(t) => self.tracker(t)?.and_then(|cfg| cfg.announce_url.as_deref()),
            None => None,
        };

        [
            explicit,
            tracker_url,
            self.torrent.announce_url.as_deref(),
            self.announce_url.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(String::from)
        .ok_or(ConfigError::MissingAnnounce)
    }

    /// Source tag for torrents aimed at `tracker`: the tracker's configured
    /// `source_name`, then its built-in default. Without a tracker, the
    /// `[torrent].source` value.
    pub fn resolve_source(&self, tracker: Option<Tracker>) -> Result<Option<String>, ConfigError> {
        match tracker {
            Some(t) => {
                let configured = self.tracker(t)?.and_then(|cfg| cfg.source_name.clone());
                Ok(Some(
                    configured.unwrap_or_else(|| t.default_source().to_string()),
                ))
            }
            None => Ok(self.torrent.source.clone()),
        }
    }

    /// Directory for the torrent built from `input`.
    pub fn output_dir_for(&self, input: &Path, overrides: &Overrides) -> PathBuf {
        overrides
            .output_dir
            .clone()
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| {
                input
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."))
            })
    }

    /// Assembles the build request for `path` from configuration and overrides.
    pub fn request(
        &self,
        path: impl Into<PathBuf>,
        overrides: &Overrides,
    ) -> Result<MetainfoRequest, ConfigError> {
        let announce = self.resolve_announce(overrides.announce_url.as_deref(), overrides.tracker)?;
        let source = match overrides.source.clone() {
            Some(source) => Some(source),
            None => self.resolve_source(overrides.tracker)?,
        };

        let mut request = MetainfoRequest::new(path, announce)
            .piece_size(overrides.piece_size.unwrap_or(self.torrent.piece_size))
            .private(overrides.private.unwrap_or(self.torrent.private));

        if let Some(comment) = overrides.comment.as_ref().or(self.torrent.comment.as_ref()) {
            request = request.comment(comment.clone());
        }
        if let Some(created_by) = overrides
            .created_by
            .as_ref()
            .or(self.torrent.created_by.as_ref())
        {
            request = request.created_by(created_by.clone());
        }
        if let Some(source) = source.filter(|s| !s.is_empty()) {
            request = request.source(source);
        }

        Ok(request)
    }
}
