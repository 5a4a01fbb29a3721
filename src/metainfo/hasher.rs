//! Streaming SHA-1 piece hashing over the virtual concatenation of files.

use std::fs::File;
use std::io::{self, Read};

use sha1::{Digest, Sha1};
use tracing::trace;

use super::error::MetainfoError;
use super::walker::SourceFile;
use crate::constants::{PIECE_HASH_LEN, READ_BUFFER_SIZE};

/// Incremental piece hasher.
///
/// Holds the SHA-1 context of the piece being filled and how many bytes it
/// has consumed. [`feed`](Self::feed) accepts data of any size, finalizing a
/// digest every time a piece fills up, regardless of which file the bytes
/// came from. Memory use is constant apart from the 20-byte digests.
///
/// ```
/// use reltorrent::metainfo::PieceHasher;
///
/// let mut hasher = PieceHasher::new(4).unwrap();
/// assert_eq!(hasher.feed(b"abc"), 0);
/// assert_eq!(hasher.feed(b"defgh"), 2);
/// assert_eq!(hasher.finish().len(), 3 * 20);
/// ```
#[derive(Clone)]
pub struct PieceHasher {
    piece_length: u64,
    filled: u64,
    hasher: Sha1,
    pieces: Vec<u8>,
}

impl PieceHasher {
    pub fn new(piece_length: u64) -> Result<Self, MetainfoError> {
        if piece_length == 0 {
            return Err(MetainfoError::InvalidPieceSize("0".into()));
        }
        Ok(Self {
            piece_length,
            filled: 0,
            hasher: Sha1::new(),
            pieces: Vec::new(),
        })
    }

    /// Feeds bytes into the stream and returns how many pieces were completed.
    pub fn feed(&mut self, mut data: &[u8]) -> usize {
        let mut completed = 0;

        while !data.is_empty() {
            let room = self.piece_length - self.filled;
            let take = usize::try_from(room).map_or(data.len(), |room| room.min(data.len()));

            self.hasher.update(&data[..take]);
            self.filled += take as u64;
            data = &data[take..];

            if self.filled == self.piece_length {
                self.finish_piece();
                completed += 1;
            }
        }

        completed
    }

    fn finish_piece(&mut self) {
        self.pieces
            .extend_from_slice(&self.hasher.finalize_reset());
        self.filled = 0;
    }

    /// Number of digests produced so far, not counting a partial piece.
    pub fn piece_count(&self) -> usize {
        self.pieces.len() / PIECE_HASH_LEN
    }

    /// Bytes consumed by the piece currently being filled.
    pub fn pending(&self) -> u64 {
        self.filled
    }

    /// Finalizes a trailing short piece, if any, and returns all digests concatenated.
    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.finish_piece();
        }
        self.pieces
    }
}

impl std::fmt::Debug for PieceHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PieceHasher")
            .field("piece_length", &self.piece_length)
            .field("filled", &self.filled)
            .field("pieces", &self.piece_count())
            .finish()
    }
}

/// Hashes `files` in order as one continuous stream of `piece_length` pieces.
///
/// Each file is opened, read to its recorded length and closed before the
/// next one is touched.
///
/// # Errors
///
/// Returns [`MetainfoError::Io`] naming the failing file if it cannot be
/// opened or read, or if its size no longer matches the walked length.
pub fn hash_files(files: &[SourceFile], piece_length: u64) -> Result<Vec<u8>, MetainfoError> {
    let mut hasher = PieceHasher::new(piece_length)?;
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    for file in files {
        if file.entry.length == 0 {
            continue;
        }
        let read = hash_file(&mut hasher, file, &mut buf)
            .map_err(|e| MetainfoError::io(&file.disk_path, e))?;

        if read != file.entry.length {
            return Err(MetainfoError::io(
                &file.disk_path,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "file changed while hashing: expected {} bytes, read {}",
                        file.entry.length, read
                    ),
                ),
            ));
        }

        trace!(
            path = %file.disk_path.display(),
            bytes = read,
            pieces = hasher.piece_count(),
            "hashed file"
        );
    }

    Ok(hasher.finish())
}

fn hash_file(hasher: &mut PieceHasher, file: &SourceFile, buf: &mut [u8]) -> io::Result<u64> {
    let mut reader = File::open(&file.disk_path)?.take(file.entry.length);
    let mut total = 0u64;

    loop {
        let n = match reader.read(buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.feed(&buf[..n]);
        total += n as u64;
    }

    Ok(total)
}
