use super::error::MetainfoError;
use super::info_hash::InfoHash;
use super::walker::FileEntry;
use crate::bencode::{decode, decode_dict_raw, encode, BencodeError, Value};
use crate::constants::PIECE_HASH_LEN;
use bytes::Bytes;
use std::collections::BTreeMap;

/// A BitTorrent v1 metainfo file.
///
/// Built by [`MetainfoRequest::build`](super::MetainfoRequest::build) or parsed
/// with [`Metainfo::from_bytes`]; [`Metainfo::to_bytes`] is the inverse of the
/// latter.
///
/// ```no_run
/// use reltorrent::metainfo::Metainfo;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("album.torrent")?;
/// let metainfo = Metainfo::from_bytes(&data)?;
///
/// println!("{} ({} bytes)", metainfo.info.name, metainfo.info.total_length());
/// println!("info hash: {}", metainfo.info_hash);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metainfo {
    /// Tracker announce URL.
    pub announce: String,
    /// The info dictionary.
    pub info: Info,
    /// SHA-1 of the bencoded info dictionary.
    pub info_hash: InfoHash,
    /// Unix timestamp when the torrent was created.
    pub creation_date: Option<i64>,
    pub comment: Option<String>,
    /// Name of the program that created the torrent.
    pub created_by: Option<String>,
}

/// The info dictionary of a v1 torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    /// File name (single-file) or root directory name (multi-file).
    pub name: String,
    /// Number of bytes per piece.
    pub piece_length: u64,
    /// SHA-1 digest of each piece.
    pub pieces: Vec<[u8; 20]>,
    pub layout: FileLayout,
    /// Restricts peer discovery to the tracker.
    pub private: bool,
    /// Tracker source tag, which gives each tracker a distinct info-hash.
    pub source: Option<String>,
}

/// Single-file `length` or multi-file `files`; a torrent has exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLayout {
    Single { length: u64 },
    Multi { files: Vec<FileEntry> },
}

impl Info {
    /// Total size of all files combined.
    pub fn total_length(&self) -> u64 {
        match &self.layout {
            FileLayout::Single { length } => *length,
            FileLayout::Multi { files } => files.iter().map(|f| f.length).sum(),
        }
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_single_file(&self) -> bool {
        matches!(self.layout, FileLayout::Single { .. })
    }

    /// Files described by the torrent; a single-file torrent yields its name.
    pub fn files(&self) -> Vec<FileEntry> {
        match &self.layout {
            FileLayout::Single { length } => vec![FileEntry {
                length: *length,
                path: vec![self.name.clone()],
            }],
            FileLayout::Multi { files } => files.clone(),
        }
    }

    /// Concatenated piece digests as stored under `pieces`.
    pub fn pieces_bytes(&self) -> Vec<u8> {
        self.pieces.iter().flat_map(|h| h.iter().copied()).collect()
    }

    /// Builds the bencode dictionary for this info.
    ///
    /// Only `name`, `piece length`, `pieces`, `length`/`files` and, when set,
    /// `private` and `source` are emitted.
    pub fn to_value(&self) -> Result<Value, BencodeError> {
        let mut info = BTreeMap::new();

        info.insert(Bytes::from_static(b"name"), Value::from(self.name.clone()));
        info.insert(
            Bytes::from_static(b"piece length"),
            Value::try_from(self.piece_length)?,
        );
        info.insert(
            Bytes::from_static(b"pieces"),
            Value::Bytes(Bytes::from(self.pieces_bytes())),
        );

        match &self.layout {
            FileLayout::Single { length } => {
                info.insert(Bytes::from_static(b"length"), Value::try_from(*length)?);
            }
            FileLayout::Multi { files } => {
                let list = files
                    .iter()
                    .map(file_entry_value)
                    .collect::<Result<Vec<_>, _>>()?;
                info.insert(Bytes::from_static(b"files"), Value::List(list));
            }
        }

        if self.private {
            info.insert(Bytes::from_static(b"private"), Value::Integer(1));
        }

        if let Some(ref source) = self.source {
            info.insert(Bytes::from_static(b"source"), Value::from(source.clone()));
        }

        Ok(Value::Dict(info))
    }

    /// Computes the info-hash of this dictionary.
    pub fn info_hash(&self) -> Result<InfoHash, BencodeError> {
        Ok(InfoHash::from_info_bytes(&encode(&self.to_value()?)?))
    }
}

fn file_entry_value(file: &FileEntry) -> Result<Value, BencodeError> {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"length"), Value::try_from(file.length)?);
    dict.insert(
        Bytes::from_static(b"path"),
        Value::List(file.path.iter().map(|p| Value::from(p.clone())).collect()),
    );
    Ok(Value::Dict(dict))
}

impl Metainfo {
    /// Builds the full bencode dictionary.
    pub fn to_value(&self) -> Result<Value, BencodeError> {
        let mut root = BTreeMap::new();

        root.insert(
            Bytes::from_static(b"announce"),
            Value::from(self.announce.clone()),
        );
        root.insert(Bytes::from_static(b"info"), self.info.to_value()?);

        if let Some(date) = self.creation_date {
            root.insert(Bytes::from_static(b"creation date"), Value::Integer(date));
        }
        if let Some(ref comment) = self.comment {
            root.insert(Bytes::from_static(b"comment"), Value::from(comment.clone()));
        }
        if let Some(ref created_by) = self.created_by {
            root.insert(
                Bytes::from_static(b"created by"),
                Value::from(created_by.clone()),
            );
        }

        Ok(Value::Dict(root))
    }

    /// Serializes to `.torrent` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BencodeError> {
        encode(&self.to_value()?)
    }

    /// Parses a v1 torrent file from raw bytes.
    ///
    /// The info-hash is computed over the `info` bytes exactly as found in
    /// the input, including keys this type does not model and keys stored
    /// out of order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is not valid bencode
    /// - Required fields are missing (announce, info, name, pieces, etc.)
    /// - The pieces field length is not a multiple of 20
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        // Last occurrence wins, matching the decoded map.
        let raw_info = decode_dict_raw(data)?
            .into_iter()
            .rev()
            .find(|(key, _)| key.as_ref() == b"info")
            .map(|(_, raw)| raw)
            .ok_or(MetainfoError::MissingField("info"))?;
        let info_hash = InfoHash::from_info_bytes(raw_info);

        let value = decode(data)?;
        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;
        let info = parse_info(
            dict.get(b"info".as_slice())
                .ok_or(MetainfoError::MissingField("info"))?,
        )?;

        let announce = dict
            .get(b"announce".as_slice())
            .ok_or(MetainfoError::MissingField("announce"))?
            .as_str()
            .ok_or(MetainfoError::InvalidField("announce"))?
            .to_string();

        let creation_date = dict
            .get(b"creation date".as_slice())
            .and_then(|v| v.as_integer());

        let comment = dict
            .get(b"comment".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let created_by = dict
            .get(b"created by".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        Ok(Self {
            announce,
            info,
            info_hash,
            creation_date,
            comment,
            created_by,
        })
    }
}

fn parse_info(value: &Value) -> Result<Info, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("info"))?;

    let name = dict
        .get(b"name".as_slice())
        .and_then(|v| v.as_str())
        .ok_or(MetainfoError::MissingField("name"))?
        .to_string();

    let piece_length = dict
        .get(b"piece length".as_slice())
        .and_then(|v| v.as_integer())
        .ok_or(MetainfoError::MissingField("piece length"))?;
    let piece_length = u64::try_from(piece_length)
        .ok()
        .filter(|&len| len > 0)
        .ok_or(MetainfoError::InvalidField("piece length"))?;

    let pieces_bytes = dict
        .get(b"pieces".as_slice())
        .and_then(|v| v.as_bytes())
        .ok_or(MetainfoError::MissingField("pieces"))?;

    if pieces_bytes.len() % PIECE_HASH_LEN != 0 {
        return Err(MetainfoError::InvalidField("pieces"));
    }

    let pieces: Vec<[u8; 20]> = pieces_bytes
        .chunks_exact(PIECE_HASH_LEN)
        .map(|chunk| {
            let mut arr = [0u8; 20];
            arr.copy_from_slice(chunk);
            arr
        })
        .collect();

    let private = dict
        .get(b"private".as_slice())
        .and_then(|v| v.as_integer())
        .map(|v| v == 1)
        .unwrap_or(false);

    let source = dict
        .get(b"source".as_slice())
        .and_then(|v| v.as_str())
        .map(String::from);

    let layout = if let Some(length) = dict.get(b"length".as_slice()) {
        let length = length
            .as_integer()
            .and_then(|l| u64::try_from(l).ok())
            .ok_or(MetainfoError::InvalidField("length"))?;
        FileLayout::Single { length }
    } else if let Some(files_list) = dict.get(b"files".as_slice()).and_then(|v| v.as_list()) {
        let files = files_list
            .iter()
            .map(parse_file_entry)
            .collect::<Result<Vec<_>, _>>()?;
        FileLayout::Multi { files }
    } else {
        return Err(MetainfoError::MissingField("length or files"));
    };

    Ok(Info {
        name,
        piece_length,
        pieces,
        layout,
        private,
        source,
    })
}

fn parse_file_entry(value: &Value) -> Result<FileEntry, MetainfoError> {
    let file_dict = value
        .as_dict()
        .ok_or(MetainfoError::InvalidField("files"))?;

    let length = file_dict
        .get(b"length".as_slice())
        .and_then(|v| v.as_integer())
        .ok_or(MetainfoError::MissingField("file length"))?;
    let length = u64::try_from(length).map_err(|_| MetainfoError::InvalidField("file length"))?;

    let path = file_dict
        .get(b"path".as_slice())
        .and_then(|v| v.as_list())
        .ok_or(MetainfoError::MissingField("file path"))?
        .iter()
        .map(|p| {
            p.as_str()
                .map(String::from)
                .ok_or(MetainfoError::InvalidField("file path"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if path.is_empty() {
        return Err(MetainfoError::InvalidField("file path"));
    }

    Ok(FileEntry { length, path })
}
