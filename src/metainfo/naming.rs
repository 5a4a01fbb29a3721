//! Torrent and output file naming.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::torrent::Info;
use crate::constants::{FALLBACK_NAME_PREFIX, ILLEGAL_NAME_CHARS, TORRENT_EXTENSION};

/// Makes `name` safe to use as a file name on common filesystems.
///
/// Removes `\ / : * ? " < > |`, collapses whitespace runs to a single space
/// and trims surrounding spaces and dots. An empty result becomes
/// `album_<unix seconds>`.
///
/// ```
/// use reltorrent::metainfo::sanitize_name;
///
/// assert_eq!(
///     sanitize_name("Artist - Album: Live?  (2024) "),
///     "Artist - Album Live (2024)"
/// );
/// assert!(sanitize_name("???").starts_with("album_"));
/// ```
pub fn sanitize_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !ILLEGAL_NAME_CHARS.contains(c))
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c == ' ');

    if trimmed.is_empty() {
        fallback_name()
    } else {
        trimmed.to_string()
    }
}

/// Timestamp-derived name for content whose own name sanitizes to nothing.
pub fn fallback_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}_{}", FALLBACK_NAME_PREFIX, secs)
}

/// Base name of the `.torrent` file for `info`.
///
/// Single-file torrents drop the extension of the content file
/// (`track.flac` becomes `track`); multi-file torrents use the root name.
pub fn output_name(info: &Info) -> String {
    if info.is_single_file() {
        let stem = Path::new(&info.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&info.name);
        sanitize_name(stem)
    } else {
        sanitize_name(&info.name)
    }
}

/// `<name>.torrent` inside `dir`.
pub fn torrent_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, TORRENT_EXTENSION))
}

/// `<stem>[<tracker_id>].torrent` next to `original`.
pub fn retargeted_path(original: &Path, tracker_id: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize_name)
        .unwrap_or_else(fallback_name);
    let dir = original.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}[{}].{}", stem, tracker_id, TORRENT_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_illegal_characters() {
        assert_eq!(sanitize_name(r#"a\b/c:d*e?f"g<h>i|j"#), "abcdefghij");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_name("  Some \t  Album\n"), "Some Album");
    }

    #[test]
    fn test_sanitize_trims_dots() {
        assert_eq!(sanitize_name("..hidden.."), "hidden");
        assert_eq!(sanitize_name("Vol. 2"), "Vol. 2");
    }

    #[test]
    fn test_sanitize_fallback() {
        let name = sanitize_name(" ./ ");
        assert!(name.starts_with("album_"));
        assert!(name["album_".len()..].parse::<u64>().is_ok());
    }

    #[test]
    fn test_sanitize_keeps_unicode() {
        assert_eq!(sanitize_name("Björk – Homogenic"), "Björk – Homogenic");
    }

    #[test]
    fn test_output_paths() {
        assert_eq!(
            torrent_path(Path::new("/out"), "Album"),
            PathBuf::from("/out/Album.torrent")
        );
        assert_eq!(
            retargeted_path(Path::new("/out/Album.torrent"), "YUS"),
            PathBuf::from("/out/Album[YUS].torrent")
        );
    }
}
