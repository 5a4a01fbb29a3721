//! Torrent metainfo building ([BEP-3]).
//!
//! Takes a file or directory on disk and produces a BitTorrent v1 `.torrent`
//! file:
//!
//! 1. [`Content::walk`] lists the files in a stable order (sorted by
//!    relative path for directories).
//! 2. [`PieceSize`] picks the piece length, from a tier table or as given.
//! 3. [`PieceHasher`] hashes the concatenation of all files in fixed-size
//!    pieces; a piece can span the end of one file and the start of the next.
//! 4. [`MetainfoRequest::build`] assembles the [`Metainfo`], and
//!    [`MetainfoRequest::write_to`] writes it out atomically.
//!
//! [`retarget_file`] re-points an existing torrent at another tracker
//! without touching content.
//!
//! # Torrent Structure
//!
//! - **announce** - Tracker URL
//! - **info** - Hashed to create the info hash
//!   - `name` - File name or root directory name
//!   - `piece length` - Size of each piece in bytes
//!   - `pieces` - Concatenated SHA1 hashes of each piece
//!   - `length` (single-file) OR `files` (multi-file)
//!   - `private`, `source` - Only when requested
//! - **creation date**, **comment**, **created by**
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod builder;
mod error;
mod hasher;
mod info_hash;
mod naming;
mod piece_size;
mod retarget;
mod torrent;
mod walker;

pub use builder::{write_torrent_file, BuiltTorrent, MetainfoRequest};
pub use error::{ErrorKind, MetainfoError};
pub use hasher::{hash_files, PieceHasher};
pub use info_hash::InfoHash;
pub use naming::{output_name, retargeted_path, sanitize_name, torrent_path};
pub use piece_size::{auto_piece_length, PieceSize};
pub use retarget::{retarget, retarget_file};
pub use torrent::{FileLayout, Info, Metainfo};
pub use walker::{Content, ContentKind, FileEntry, SourceFile};

#[cfg(test)]
mod tests;
