//! Piece-size policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MetainfoError;
use crate::constants::{KIB, MAX_AUTO_PIECE_LENGTH, PIECE_SIZE_TIERS};

/// Largest fixed size whose length in bytes is still a valid `i64`.
const MAX_FIXED_KIB: u64 = i64::MAX as u64 / KIB;

/// Requested piece size for a torrent.
///
/// Parses from `"auto"` or a positive number of KiB, and deserializes from
/// either a string or an integer so configuration files can say
/// `piece_size = "auto"` or `piece_size = 1024`.
///
/// ```
/// use reltorrent::metainfo::PieceSize;
///
/// let fixed: PieceSize = "1024".parse().unwrap();
/// assert_eq!(fixed.resolve(0), 1024 * 1024);
///
/// let auto: PieceSize = "auto".parse().unwrap();
/// assert_eq!(auto.resolve(10 * 1024 * 1024), 16 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "PieceSizeRepr", into = "PieceSizeRepr")]
pub enum PieceSize {
    /// Pick from the tier table based on total content size.
    #[default]
    Auto,
    /// Fixed piece size in KiB. Used as-is.
    Kib(u64),
}

impl PieceSize {
    /// Returns the fixed size after checking it is a positive number of KiB
    /// whose byte length still fits a bencode integer.
    pub fn fixed(kib: u64) -> Result<Self, MetainfoError> {
        if kib == 0 || kib > MAX_FIXED_KIB {
            return Err(MetainfoError::InvalidPieceSize(kib.to_string()));
        }
        Ok(PieceSize::Kib(kib))
    }

    /// Resolves the piece length in bytes for content of `total_size` bytes.
    pub fn resolve(self, total_size: u64) -> u64 {
        match self {
            PieceSize::Auto => auto_piece_length(total_size),
            PieceSize::Kib(kib) => kib.saturating_mul(KIB),
        }
    }
}

/// Returns the automatic piece length for `total_size` bytes of content.
///
/// Tier bounds are exclusive: 50 MiB exactly already uses 32 KiB pieces.
pub fn auto_piece_length(total_size: u64) -> u64 {
    PIECE_SIZE_TIERS
        .iter()
        .find(|(bound, _)| total_size < *bound)
        .map(|(_, piece_length)| *piece_length)
        .unwrap_or(MAX_AUTO_PIECE_LENGTH)
}

impl FromStr for PieceSize {
    type Err = MetainfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(PieceSize::Auto);
        }
        let kib: u64 = s
            .parse()
            .map_err(|_| MetainfoError::InvalidPieceSize(s.to_string()))?;
        Self::fixed(kib)
    }
}

impl fmt::Display for PieceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceSize::Auto => write!(f, "auto"),
            PieceSize::Kib(kib) => write!(f, "{}", kib),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PieceSizeRepr {
    Kib(u64),
    Text(String),
}

impl TryFrom<PieceSizeRepr> for PieceSize {
    type Error = MetainfoError;

    fn try_from(repr: PieceSizeRepr) -> Result<Self, Self::Error> {
        match repr {
            PieceSizeRepr::Kib(kib) => PieceSize::fixed(kib),
            PieceSizeRepr::Text(text) => text.parse(),
        }
    }
}

impl From<PieceSize> for PieceSizeRepr {
    fn from(size: PieceSize) -> Self {
        match size {
            PieceSize::Auto => PieceSizeRepr::Text("auto".into()),
            PieceSize::Kib(kib) => PieceSizeRepr::Kib(kib),
        }
    }
}
