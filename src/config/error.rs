use std::path::PathBuf;

use thiserror::Error;

use super::tracker::Tracker;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No announce URL from the command line, tracker, torrent section or top level.
    #[error("announce URL not specified")]
    MissingAnnounce,

    #[error("unknown tracker: {0}")]
    UnknownTracker(String),

    #[error("tracker {0} is disabled in the configuration")]
    TrackerDisabled(Tracker),
}
