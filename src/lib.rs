//! reltorrent - BitTorrent metainfo builder for music releases
//!
//! Produces byte-exact BitTorrent v1 `.torrent` files from a file or a
//! release directory, and re-targets existing torrents at other trackers.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding
//! - [`metainfo`] - Piece-size policy, file walking, piece hashing, torrent assembly
//! - [`config`] - TOML configuration, tracker settings, announce URL resolution
//! - [`constants`] - Piece-size tiers and default strings

pub mod bencode;
pub mod config;
pub mod constants;
pub mod metainfo;

pub use bencode::{decode, encode, BencodeError, Value};
pub use config::{Config, ConfigError, Overrides, Tracker, TrackerConfig};
pub use metainfo::{
    retarget_file, BuiltTorrent, ErrorKind, FileEntry, FileLayout, Info, InfoHash, Metainfo,
    MetainfoError, MetainfoRequest, PieceHasher, PieceSize,
};
