//! Metainfo constants and tuning parameters.
//!
//! Piece-size tiers, buffer sizes and the default strings embedded into
//! generated torrents.

// ============================================================================
// Sizes
// ============================================================================

/// One kibibyte.
pub const KIB: u64 = 1024;

/// One mebibyte.
pub const MIB: u64 = 1024 * KIB;

/// One gibibyte.
pub const GIB: u64 = 1024 * MIB;

/// Length of a single SHA-1 piece digest.
pub const PIECE_HASH_LEN: usize = 20;

/// Chunk size used when streaming file content into the piece hasher.
/// Independent of the piece length; the hasher splits chunks at piece boundaries.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

// ============================================================================
// Piece-size policy
// ============================================================================

/// Automatic piece-size tiers as `(exclusive upper bound on total size, piece length)`.
///
/// Trackers validate piece count against content size, so these values are fixed.
pub const PIECE_SIZE_TIERS: [(u64, u64); 8] = [
    (50 * MIB, 16 * KIB),
    (150 * MIB, 32 * KIB),
    (350 * MIB, 64 * KIB),
    (512 * MIB, 128 * KIB),
    (GIB, 256 * KIB),
    (2 * GIB, 512 * KIB),
    (4 * GIB, MIB),
    (8 * GIB, 2 * MIB),
];

/// Piece length for content of 8 GiB and above.
pub const MAX_AUTO_PIECE_LENGTH: u64 = 4 * MIB;

// ============================================================================
// Naming
// ============================================================================

/// Extension of generated metainfo files.
pub const TORRENT_EXTENSION: &str = "torrent";

/// Prefix of the timestamp-derived name used when sanitization leaves nothing.
pub const FALLBACK_NAME_PREFIX: &str = "album";

/// Characters removed from torrent and output names.
pub const ILLEGAL_NAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

// ============================================================================
// Defaults
// ============================================================================

/// Default `created by` string for torrents built by this crate.
pub const DEFAULT_CREATED_BY: &str = concat!("reltorrent/", env!("CARGO_PKG_VERSION"));

/// Default `created by` string written by the release tooling configuration.
pub const DEFAULT_CONFIG_CREATED_BY: &str = "Music-Upload-Assistant";

/// Default torrent comment.
pub const DEFAULT_COMMENT: &str = "Created with Music-Upload-Assistant";

/// Default `source` tag.
pub const DEFAULT_SOURCE: &str = "MUA";

/// Default directory for generated torrents.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Configuration file looked up when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
