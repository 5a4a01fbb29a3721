use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::bencode::{decode, encode, Value};

const ANNOUNCE: &str = "https://tracker.example/announce/passkey";

/// An `info` dictionary with `name` stored before `length`.
const UNSORTED_INFO: &[u8] =
    b"d4:name1:a6:lengthi1e12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaae";

fn torrent_with_unsorted_info() -> Vec<u8> {
    [&b"d8:announce3:old4:info"[..], UNSORTED_INFO, &b"e"[..]].concat()
}

fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u32).wrapping_mul(31).wrapping_add(seed as u32) as u8)
        .collect()
}

fn raw_info(bytes: &[u8]) -> Value {
    decode(bytes).unwrap().get(b"info").unwrap().clone()
}

#[test]
fn test_info_hash_from_hex() {
    let hex = "0123456789abcdef0123456789abcdef01234567";
    let hash = InfoHash::from_hex(hex).unwrap();
    assert_eq!(hash.to_hex(), hex);
    assert!(InfoHash::from_hex("0123").is_err());
    assert!(InfoHash::from_hex("zz").is_err());
}

#[test]
fn test_single_file_scenario_10_mib() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("album.flac");
    write_file(&file, &pattern(10_485_760, 1));

    let metainfo = MetainfoRequest::new(&file, ANNOUNCE)
        .piece_size(PieceSize::Kib(1024))
        .build()
        .unwrap();

    assert_eq!(metainfo.info.piece_length, 1_048_576);
    assert_eq!(metainfo.info.piece_count(), 10);
    assert_eq!(metainfo.info.layout, FileLayout::Single { length: 10_485_760 });

    let info = raw_info(&metainfo.to_bytes().unwrap());
    assert_eq!(info.get(b"length").and_then(|v| v.as_integer()), Some(10_485_760));
    assert!(info.get(b"files").is_none());
    assert_eq!(info.get(b"pieces").and_then(|v| v.as_bytes()).map(|b| b.len()), Some(200));
}

#[test]
fn test_multi_file_scenario_two_files() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("Release");
    write_file(&dir.join("b.flac"), &pattern(700_000, 2));
    write_file(&dir.join("a.flac"), &pattern(1_500_000, 3));

    let metainfo = MetainfoRequest::new(&dir, ANNOUNCE)
        .piece_size(PieceSize::Kib(1024))
        .build()
        .unwrap();

    let bytes = metainfo.to_bytes().unwrap();
    let info = raw_info(&bytes);
    assert_eq!(info.get(b"pieces").and_then(|v| v.as_bytes()).map(|b| b.len()), Some(60));
    assert!(info.get(b"length").is_none());

    let files = info.get(b"files").and_then(|v| v.as_list()).unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].get(b"length").and_then(|v| v.as_integer()), Some(1_500_000));
    assert_eq!(
        files[0].get(b"path"),
        Some(&Value::List(vec![Value::string("a.flac")]))
    );
    assert_eq!(files[1].get(b"length").and_then(|v| v.as_integer()), Some(700_000));
    assert_eq!(
        files[1].get(b"path"),
        Some(&Value::List(vec![Value::string("b.flac")]))
    );
}

#[test]
fn test_piece_count_invariant() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("content");
    write_file(&dir.join("one"), &pattern(16_384 * 3, 4));
    write_file(&dir.join("two"), &pattern(1, 5));
    write_file(&dir.join("x").join("three"), &pattern(20_000, 6));
    let total = 16_384 * 3 + 1 + 20_000u64;

    for kib in [1u64, 3, 16, 32, 64, 1024] {
        let metainfo = MetainfoRequest::new(&dir, ANNOUNCE)
            .piece_size(PieceSize::Kib(kib))
            .build()
            .unwrap();
        let piece_length = kib * 1024;
        assert_eq!(metainfo.info.total_length(), total);
        assert_eq!(
            metainfo.info.pieces_bytes().len() as u64,
            20 * total.div_ceil(piece_length),
            "piece size {} KiB",
            kib
        );
    }
}

#[test]
fn test_cross_boundary_hashing_matches_concatenation() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("split");
    let first = pattern(40_000, 7);
    let second = pattern(30_000, 8);
    let third = pattern(5, 9);
    write_file(&dir.join("1.flac"), &first);
    write_file(&dir.join("2.flac"), &second);
    write_file(&dir.join("3.cue"), &third);

    let joined = temp.path().join("joined.bin");
    let mut concat = first.clone();
    concat.extend_from_slice(&second);
    concat.extend_from_slice(&third);
    write_file(&joined, &concat);

    let multi = MetainfoRequest::new(&dir, ANNOUNCE)
        .piece_size(PieceSize::Kib(16))
        .build()
        .unwrap();
    let single = MetainfoRequest::new(&joined, ANNOUNCE)
        .piece_size(PieceSize::Kib(16))
        .build()
        .unwrap();

    assert_eq!(multi.info.piece_count(), 5); // ceil(70005 / 16384)
    assert_eq!(multi.info.pieces, single.info.pieces);
}

#[test]
fn test_zero_length_file_is_listed_but_not_hashed() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("with-empty");
    write_file(&dir.join("a"), &pattern(10, 1));
    write_file(&dir.join("b"), b"");
    write_file(&dir.join("c"), &pattern(10, 2));

    let metainfo = MetainfoRequest::new(&dir, ANNOUNCE)
        .piece_size(PieceSize::Kib(1))
        .build()
        .unwrap();

    let files = metainfo.info.files();
    assert_eq!(files.len(), 3);
    assert_eq!(files[1].length, 0);
    assert_eq!(metainfo.info.piece_count(), 1);

    let mut hasher = PieceHasher::new(1024).unwrap();
    hasher.feed(&pattern(10, 1));
    hasher.feed(&pattern(10, 2));
    assert_eq!(metainfo.info.pieces_bytes(), hasher.finish());
}

#[test]
fn test_creation_order_does_not_matter() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let a = first.path().join("album");
    let b = second.path().join("album");

    let names = ["03 - c.flac", "01 - a.flac", "disc 2/01.flac", "02 - b.flac"];
    for (i, name) in names.iter().enumerate() {
        write_file(&a.join(name), &pattern(5_000 + i * 100, i as u8));
    }
    for (i, name) in names.iter().enumerate().rev() {
        write_file(&b.join(name), &pattern(5_000 + i * 100, i as u8));
    }

    let left = MetainfoRequest::new(&a, ANNOUNCE)
        .creation_date(1)
        .build()
        .unwrap();
    let right = MetainfoRequest::new(&b, ANNOUNCE)
        .creation_date(1)
        .build()
        .unwrap();

    assert_eq!(left.to_bytes().unwrap(), right.to_bytes().unwrap());
    let paths: Vec<String> = left.info.files().iter().map(|f| f.path.join("/")).collect();
    assert_eq!(
        paths,
        vec!["01 - a.flac", "02 - b.flac", "03 - c.flac", "disc 2/01.flac"]
    );
}

#[test]
fn test_determinism() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("Artist - Album");
    write_file(&dir.join("01.flac"), &pattern(50_000, 1));
    write_file(&dir.join("cover.jpg"), &pattern(3_000, 2));
    let out_a = temp.path().join("out-a");
    let out_b = temp.path().join("out-b");

    let request = MetainfoRequest::new(&dir, ANNOUNCE)
        .private(true)
        .source("MUA")
        .creation_date(1_700_000_000);
    let a = request.write_to(&out_a).unwrap();
    let b = request.write_to(&out_b).unwrap();

    assert_eq!(fs::read(&a.path).unwrap(), fs::read(&b.path).unwrap());

    // Unpinned creation dates still give the same info-hash.
    let c = MetainfoRequest::new(&dir, ANNOUNCE)
        .private(true)
        .source("MUA")
        .build()
        .unwrap();
    assert_eq!(a.metainfo.info_hash, c.info_hash);
}

#[test]
fn test_info_hash_matches_raw_info_dictionary() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.flac");
    write_file(&file, &pattern(1000, 1));

    let metainfo = MetainfoRequest::new(&file, ANNOUNCE).build().unwrap();
    let bytes = metainfo.to_bytes().unwrap();
    let expected = InfoHash::from_info_bytes(&encode(&raw_info(&bytes)).unwrap());
    assert_eq!(metainfo.info_hash, expected);
}

#[test]
fn test_only_standard_keys_are_emitted() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.flac");
    write_file(&file, &pattern(1000, 1));

    let metainfo = MetainfoRequest::new(&file, ANNOUNCE).build().unwrap();
    let info = raw_info(&metainfo.to_bytes().unwrap());
    let keys: Vec<&[u8]> = info.as_dict().unwrap().keys().map(|k| k.as_ref()).collect();
    assert_eq!(
        keys,
        vec![
            b"length".as_slice(),
            b"name".as_slice(),
            b"piece length".as_slice(),
            b"pieces".as_slice()
        ]
    );
}

#[test]
fn test_roundtrip() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("single.flac");
    write_file(&file, &pattern(70_000, 1));
    let dir = temp.path().join("multi");
    write_file(&dir.join("a").join("1.flac"), &pattern(30_000, 2));
    write_file(&dir.join("b.log"), &pattern(300, 3));

    let requests = [
        MetainfoRequest::new(&file, ANNOUNCE),
        MetainfoRequest::new(&dir, ANNOUNCE),
        MetainfoRequest::new(&file, ANNOUNCE)
            .private(true)
            .source("YuScene")
            .comment("Created with Music-Upload-Assistant")
            .created_by("Music-Upload-Assistant"),
        MetainfoRequest::new(&dir, ANNOUNCE)
            .private(true)
            .source("seedpool.org")
            .piece_size(PieceSize::Kib(4)),
    ];

    for request in requests {
        let metainfo = request.build().unwrap();
        let parsed = Metainfo::from_bytes(&metainfo.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, metainfo);
    }
}

#[test]
fn test_empty_directory_is_input_error() {
    let temp = TempDir::new().unwrap();
    let empty = temp.path().join("empty");
    fs::create_dir_all(empty.join("nested")).unwrap();
    let out = temp.path().join("out");

    let err = MetainfoRequest::new(&empty, ANNOUNCE)
        .write_to(&out)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Input);
    assert_eq!(err.path(), Some(empty.as_path()));
    assert!(!out.exists());
}

#[test]
fn test_missing_path_is_input_error() {
    let temp = TempDir::new().unwrap();
    let err = MetainfoRequest::new(temp.path().join("nope"), ANNOUNCE)
        .build()
        .unwrap_err();
    assert!(matches!(err, MetainfoError::PathNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn test_retarget_keeps_info_hash() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("track.flac");
    write_file(&file, &pattern(40_000, 1));
    let built = MetainfoRequest::new(&file, ANNOUNCE)
        .private(true)
        .write_to(temp.path())
        .unwrap();

    let path = retarget_file(&built.path, "YUS", "https://yu-scene.net/announce/t", None).unwrap();
    assert_eq!(path, temp.path().join("track[YUS].torrent"));

    let retargeted = Metainfo::from_bytes(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(retargeted.announce, "https://yu-scene.net/announce/t");
    assert_eq!(retargeted.info_hash, built.metainfo.info_hash);
    assert_eq!(retargeted.info, built.metainfo.info);
    assert_eq!(retargeted.creation_date, built.metainfo.creation_date);
}

#[test]
fn test_retarget_with_source() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("track.flac");
    write_file(&file, &pattern(40_000, 1));
    let built = MetainfoRequest::new(&file, ANNOUNCE)
        .source("MUA")
        .write_to(temp.path())
        .unwrap();

    let path = retarget_file(
        &built.path,
        "SP",
        "https://seedpool.org/announce",
        Some("seedpool.org"),
    )
    .unwrap();

    let retargeted = Metainfo::from_bytes(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(retargeted.info.source.as_deref(), Some("seedpool.org"));
    assert_eq!(retargeted.info.pieces, built.metainfo.info.pieces);
    assert_ne!(retargeted.info_hash, built.metainfo.info_hash);
}

#[test]
fn test_retarget_preserves_unknown_keys_and_drops_announce_list() {
    let original = b"d8:announce3:old13:announce-listll3:oldee4:infod6:lengthi1e4:name1:a12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaa7:x-extra1:ye5:x-top1:ze";

    let value = decode(&retarget(original, "new", None).unwrap()).unwrap();

    assert_eq!(value.get(b"announce").and_then(|v| v.as_str()), Some("new"));
    assert!(value.get(b"announce-list").is_none());
    assert_eq!(value.get(b"x-top").and_then(|v| v.as_str()), Some("z"));
    assert_eq!(
        value
            .get(b"info")
            .and_then(|i| i.get(b"x-extra"))
            .and_then(|v| v.as_str()),
        Some("y")
    );
}

#[test]
fn test_retarget_requires_announce() {
    let err = retarget(b"de", "", None).unwrap_err();
    assert!(matches!(err, MetainfoError::MissingAnnounce));
}

#[test]
fn test_retarget_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = retarget_file(temp.path().join("none.torrent"), "YUS", ANNOUNCE, None).unwrap_err();
    assert!(matches!(err, MetainfoError::PathNotFound(_)));
}

#[test]
fn test_parse_rejects_bad_pieces() {
    let data = b"d8:announce1:x4:infod6:lengthi1e4:name1:a12:piece lengthi16384e6:pieces3:abcee";
    assert!(matches!(
        Metainfo::from_bytes(data),
        Err(MetainfoError::InvalidField("pieces"))
    ));
}

#[test]
fn test_parse_requires_info() {
    assert!(matches!(
        Metainfo::from_bytes(b"d8:announce1:xe"),
        Err(MetainfoError::MissingField("info"))
    ));
}

#[test]
fn test_encoding_error_kind() {
    let err = Metainfo::from_bytes(b"not bencode").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
}

#[test]
fn test_parse_hashes_info_as_written() {
    let data = torrent_with_unsorted_info();
    let metainfo = Metainfo::from_bytes(&data).unwrap();

    assert_eq!(metainfo.info_hash, InfoHash::from_info_bytes(UNSORTED_INFO));
    // Re-encoding sorts the keys, which would give a different hash.
    assert_ne!(metainfo.info_hash, metainfo.info.info_hash().unwrap());
}

#[test]
fn test_retarget_copies_unsorted_info_verbatim() {
    let data = torrent_with_unsorted_info();
    let out = retarget(&data, "https://new.example/announce", None).unwrap();

    assert!(out
        .windows(UNSORTED_INFO.len())
        .any(|window| window == UNSORTED_INFO));

    let before = Metainfo::from_bytes(&data).unwrap();
    let after = Metainfo::from_bytes(&out).unwrap();
    assert_eq!(after.info_hash, before.info_hash);
    assert_eq!(after.announce, "https://new.example/announce");
}

#[test]
fn test_file_shrunk_after_walk_is_io_error() {
    let temp = TempDir::new().unwrap();
    let album = temp.path().join("album");
    write_file(&album.join("01.flac"), &pattern(50_000, 1));
    write_file(&album.join("02.flac"), &pattern(50_000, 2));

    let content = Content::walk(&album).unwrap();
    let shrunk = album.join("02.flac");
    fs::write(&shrunk, pattern(10, 2)).unwrap();

    let err = hash_files(content.files(), 16 * 1024).unwrap_err();
    assert!(matches!(err, MetainfoError::Io { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.path(), Some(shrunk.as_path()));
}

#[test]
fn test_file_removed_after_walk_is_io_error() {
    let temp = TempDir::new().unwrap();
    let album = temp.path().join("album");
    write_file(&album.join("01.flac"), &pattern(20_000, 1));
    write_file(&album.join("02.flac"), &pattern(20_000, 2));

    let content = Content::walk(&album).unwrap();
    let removed = album.join("01.flac");
    fs::remove_file(&removed).unwrap();

    let err = hash_files(content.files(), 16 * 1024).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.path(), Some(removed.as_path()));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_leaves_output_dir_empty() {
    let temp = TempDir::new().unwrap();
    let album = temp.path().join("album");
    write_file(&album.join("01.flac"), &pattern(1_000, 1));
    let dangling = album.join("02.flac");
    std::os::unix::fs::symlink(album.join("missing.flac"), &dangling).unwrap();

    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();

    let err = MetainfoRequest::new(&album, ANNOUNCE)
        .write_to(&out)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.path(), Some(dangling.as_path()));
    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}
