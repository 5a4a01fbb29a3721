use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Trackers the release tooling knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tracker {
    #[serde(rename = "YUS")]
    Yus,
    #[serde(rename = "SP")]
    Seedpool,
}

impl Tracker {
    pub const ALL: [Tracker; 2] = [Tracker::Yus, Tracker::Seedpool];

    /// Short identifier, used in config keys and re-targeted file names.
    pub fn id(self) -> &'static str {
        match self {
            Tracker::Yus => "YUS",
            Tracker::Seedpool => "SP",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tracker::Yus => "YU-Scene",
            Tracker::Seedpool => "Seedpool",
        }
    }

    /// Source tag used when the configuration does not name one.
    pub fn default_source(self) -> &'static str {
        match self {
            Tracker::Yus => "YuScene",
            Tracker::Seedpool => "seedpool.org",
        }
    }
}

impl FromStr for Tracker {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tracker::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownTracker(s.to_string()))
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Per-tracker settings from `[trackers.<ID>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub enabled: bool,
    pub announce_url: Option<String>,
    /// Source tag embedded in torrents for this tracker.
    pub source_name: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            announce_url: None,
            source_name: None,
        }
    }
}
