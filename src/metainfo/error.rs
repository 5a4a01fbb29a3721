use std::path::PathBuf;

use thiserror::Error;

use crate::bencode::BencodeError;

/// Broad class of a [`MetainfoError`], used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request: missing path, empty content, missing announce URL.
    /// Detected before any hashing starts.
    Input,
    /// A read or write failed on a specific path.
    Io,
    /// The bencode layer failed or the input torrent is malformed.
    Encoding,
}

/// Errors that can occur when building, parsing or re-targeting torrent files.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The input path does not exist.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The input path is neither a regular file nor a directory.
    #[error("not a regular file or directory: {}", .0.display())]
    UnsupportedPath(PathBuf),

    /// The input contains no files, or only zero-length files.
    #[error("no content to hash under {}", .0.display())]
    EmptyContent(PathBuf),

    /// A file or directory name is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// No announce URL was supplied.
    #[error("announce URL not specified")]
    MissingAnnounce,

    /// The requested piece size is not a positive number of KiB.
    #[error("invalid piece size: {0}")]
    InvalidPieceSize(String),

    /// An I/O operation failed on the given path.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The torrent file contains invalid bencode, or encoding failed.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the torrent file.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value or type.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// The info hash has an invalid length (must be 20 bytes).
    #[error("invalid info hash length")]
    InvalidInfoHashLength,
}

impl MetainfoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MetainfoError::Io {
            path: path.into(),
            source,
        }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetainfoError::PathNotFound(_)
            | MetainfoError::UnsupportedPath(_)
            | MetainfoError::EmptyContent(_)
            | MetainfoError::NonUtf8Path(_)
            | MetainfoError::MissingAnnounce
            | MetainfoError::InvalidPieceSize(_) => ErrorKind::Input,
            MetainfoError::Io { .. } => ErrorKind::Io,
            MetainfoError::Bencode(BencodeError::Io(_)) => ErrorKind::Io,
            MetainfoError::Bencode(_)
            | MetainfoError::MissingField(_)
            | MetainfoError::InvalidField(_)
            | MetainfoError::InvalidInfoHashLength => ErrorKind::Encoding,
        }
    }

    /// Returns the path the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            MetainfoError::PathNotFound(p)
            | MetainfoError::UnsupportedPath(p)
            | MetainfoError::EmptyContent(p)
            | MetainfoError::NonUtf8Path(p)
            | MetainfoError::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }
}
