//! Torrent file builder.
//!
//! Turns a file or directory on disk into a BitTorrent v1 `.torrent` file.
//!
//! # Examples
//!
//! ```no_run
//! use reltorrent::metainfo::{MetainfoRequest, PieceSize};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let built = MetainfoRequest::new("/music/Artist - Album (2024)", "https://tracker.example/announce")
//!     .piece_size(PieceSize::Auto)
//!     .private(true)
//!     .source("MUA")
//!     .comment("Created with Music-Upload-Assistant")
//!     .write_to("output")?;
//!
//! println!("{} ({})", built.path.display(), built.metainfo.info_hash);
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::MetainfoError;
use super::hasher::hash_files;
use super::naming::{output_name, sanitize_name, torrent_path};
use super::piece_size::PieceSize;
use super::torrent::{FileLayout, Info, Metainfo};
use super::walker::{Content, ContentKind};
use crate::bencode::{encode_to, BencodeError, Value};
use crate::constants::{DEFAULT_CREATED_BY, PIECE_HASH_LEN};

/// Everything needed to build one torrent.
#[derive(Debug, Clone)]
pub struct MetainfoRequest {
    /// File or directory to build the torrent from.
    path: PathBuf,
    /// Tracker announce URL.
    announce: String,
    piece_size: PieceSize,
    comment: Option<String>,
    created_by: Option<String>,
    /// Source tag stored inside the info dictionary.
    source: Option<String>,
    private: bool,
    /// Creation timestamp (defaults to now).
    creation_date: Option<i64>,
}

/// A torrent written to disk.
#[derive(Debug, Clone)]
pub struct BuiltTorrent {
    pub path: PathBuf,
    pub metainfo: Metainfo,
}

impl MetainfoRequest {
    /// Creates a request for `path` announcing to `announce`.
    ///
    /// Defaults: automatic piece size, public, no comment, no source,
    /// `created by` set to this crate's name and version.
    pub fn new(path: impl Into<PathBuf>, announce: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            announce: announce.into(),
            piece_size: PieceSize::Auto,
            comment: None,
            created_by: Some(DEFAULT_CREATED_BY.to_string()),
            source: None,
            private: false,
            creation_date: None,
        }
    }

    /// Sets the piece size; [`PieceSize::Auto`] picks one from the content size.
    pub fn piece_size(mut self, piece_size: PieceSize) -> Self {
        self.piece_size = piece_size;
        self
    }

    /// Sets the free-form `comment` field.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the `created by` field, replacing the crate default.
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Sets `info.source`. Different sources give different info-hashes.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Marks the torrent private (`info.private = 1`), disabling DHT and PEX.
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Pins the creation date (Unix timestamp), making the output reproducible.
    pub fn creation_date(mut self, timestamp: i64) -> Self {
        self.creation_date = Some(timestamp);
        self
    }

    /// The file or directory the torrent is built from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The tracker announce URL.
    pub fn announce(&self) -> &str {
        &self.announce
    }

    /// Hashes the content and assembles the metainfo.
    ///
    /// # Errors
    ///
    /// Input problems (missing announce URL, unusable piece size, missing
    /// path, no content) are reported before any file is read. Read failures abort the build with
    /// [`MetainfoError::Io`] naming the file.
    pub fn build(&self) -> Result<Metainfo, MetainfoError> {
        if self.announce.trim().is_empty() {
            return Err(MetainfoError::MissingAnnounce);
        }
        if let PieceSize::Kib(kib) = self.piece_size {
            PieceSize::fixed(kib)?;
        }

        let content = Content::walk(&self.path)?;
        let piece_length = self.piece_size.resolve(content.total_length());

        debug!(
            path = %self.path.display(),
            total_length = content.total_length(),
            piece_length,
            piece_size = %self.piece_size,
            "hashing content"
        );

        let pieces_bytes = hash_files(content.files(), piece_length)?;
        let pieces: Vec<[u8; 20]> = pieces_bytes
            .chunks_exact(PIECE_HASH_LEN)
            .map(|chunk| {
                let mut arr = [0u8; 20];
                arr.copy_from_slice(chunk);
                arr
            })
            .collect();

        let (name, layout) = match content.kind() {
            ContentKind::SingleFile => {
                let file = &content.files()[0];
                let name = file.entry.path.join("/");
                (
                    name,
                    FileLayout::Single {
                        length: file.entry.length,
                    },
                )
            }
            ContentKind::Directory => {
                let name = root_name(content.root());
                let files = content.files().iter().map(|f| f.entry.clone()).collect();
                (name, FileLayout::Multi { files })
            }
        };

        let info = Info {
            name,
            piece_length,
            pieces,
            layout,
            private: self.private,
            source: self.source.clone(),
        };
        let info_hash = info.info_hash()?;

        let creation_date = self.creation_date.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        });

        Ok(Metainfo {
            announce: self.announce.clone(),
            info,
            info_hash,
            creation_date: Some(creation_date),
            comment: self.comment.clone(),
            created_by: self.created_by.clone(),
        })
    }

    /// Builds the torrent and writes it to `<output_dir>/<name>.torrent`.
    ///
    /// The directory is created if needed. An existing file of the same name
    /// is replaced.
    pub fn write_to(&self, output_dir: impl AsRef<Path>) -> Result<BuiltTorrent, MetainfoError> {
        let metainfo = self.build()?;
        let output_dir = output_dir.as_ref();

        fs::create_dir_all(output_dir).map_err(|e| MetainfoError::io(output_dir, e))?;
        let path = torrent_path(output_dir, &output_name(&metainfo.info));

        write_torrent_file(&path, &metainfo.to_value()?)?;
        debug!(path = %path.display(), info_hash = %metainfo.info_hash, "wrote torrent");

        Ok(BuiltTorrent { path, metainfo })
    }
}

/// Sanitized directory name, resolving `.` and similar through the filesystem.
fn root_name(root: &Path) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            fs::canonicalize(root)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_default();
    sanitize_name(&name)
}

/// Writes a bencoded value to `path` via a temporary file in the same directory.
///
/// The destination only ever holds a complete file: the value is encoded
/// into the temporary file, flushed, and renamed over `path`. On failure the
/// temporary file is removed.
pub fn write_torrent_file(path: &Path, value: &Value) -> Result<(), MetainfoError> {
    write_atomic(path, |writer, temp_path| encode_into(value, writer, temp_path))
}

/// Like [`write_torrent_file`] for bytes that are already encoded.
pub(crate) fn write_torrent_bytes(path: &Path, data: &[u8]) -> Result<(), MetainfoError> {
    write_atomic(path, |writer, temp_path| {
        writer
            .write_all(data)
            .map_err(|e| MetainfoError::io(temp_path, e))
    })
}

fn write_atomic<F>(path: &Path, fill: F) -> Result<(), MetainfoError>
where
    F: FnOnce(&mut BufWriter<&File>, &Path) -> Result<(), MetainfoError>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(|e| MetainfoError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        fill(&mut writer, temp.path())?;
        writer.flush().map_err(|e| MetainfoError::io(temp.path(), e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| MetainfoError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| MetainfoError::io(path, e.error))?;

    Ok(())
}

/// Streams `value` into `writer`; write failures name `path`.
fn encode_into<W: Write>(value: &Value, writer: &mut W, path: &Path) -> Result<(), MetainfoError> {
    encode_to(value, writer).map_err(|e| match e {
        BencodeError::Io(source) => MetainfoError::io(path, source),
        other => MetainfoError::Bencode(other),
    })
}
