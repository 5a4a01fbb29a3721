//! Re-targeting an existing torrent at another tracker.
//!
//! Only the bencode layer is involved: piece hashes do not depend on the
//! announce URL, so content is never re-read.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use super::builder::write_torrent_bytes;
use super::error::MetainfoError;
use super::naming::{retargeted_path, sanitize_name};
use crate::bencode::{decode, decode_dict_raw, encode, encode_to, Value};

/// Replaces `announce` (and `info.source`, when given) in bencoded torrent
/// bytes and returns the new torrent.
///
/// Every other top-level value is copied through as the original bytes.
/// Without a new `source` that includes `info`, so the info-hash is the same
/// even for torrents whose `info` keys are not in canonical order.
/// `announce-list` is dropped, since it would still name the previous tracker.
pub fn retarget(data: &[u8], announce: &str, source: Option<&str>) -> Result<Vec<u8>, MetainfoError> {
    if announce.trim().is_empty() {
        return Err(MetainfoError::MissingAnnounce);
    }

    let mut root: BTreeMap<Bytes, Cow<'_, [u8]>> = decode_dict_raw(data)?
        .into_iter()
        .map(|(key, raw)| (key, Cow::Borrowed(raw)))
        .collect();

    let mut info = decode(
        root.get(b"info".as_slice())
            .ok_or(MetainfoError::MissingField("info"))?,
    )?;
    let info_dict = info
        .as_dict_mut()
        .ok_or(MetainfoError::InvalidField("info"))?;

    if let Some(source) = source {
        info_dict.insert(Bytes::from_static(b"source"), Value::string(source));
        root.insert(Bytes::from_static(b"info"), Cow::Owned(encode(&info)?));
    }

    root.insert(
        Bytes::from_static(b"announce"),
        Cow::Owned(encode(&Value::string(announce))?),
    );
    root.remove(b"announce-list".as_slice());

    let mut out = Vec::with_capacity(data.len() + announce.len());
    out.push(b'd');
    for (key, raw) in root {
        encode_to(&Value::Bytes(key), &mut out)?;
        out.extend_from_slice(&raw);
    }
    out.push(b'e');

    Ok(out)
}

/// Writes a copy of `original` re-targeted at a tracker as
/// `<stem>[<tracker_id>].torrent` in the same directory, returning its path.
pub fn retarget_file(
    original: impl AsRef<Path>,
    tracker_id: &str,
    announce: &str,
    source: Option<&str>,
) -> Result<PathBuf, MetainfoError> {
    let original = original.as_ref();
    if announce.trim().is_empty() {
        return Err(MetainfoError::MissingAnnounce);
    }

    let data = fs::read(original).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MetainfoError::PathNotFound(original.to_path_buf()),
        _ => MetainfoError::io(original, e),
    })?;

    let retargeted = retarget(&data, announce, source)?;
    let path = retargeted_path(original, &sanitize_name(tracker_id));
    write_torrent_bytes(&path, &retargeted)?;

    debug!(
        original = %original.display(),
        path = %path.display(),
        tracker = tracker_id,
        "wrote re-targeted torrent"
    );

    Ok(path)
}
