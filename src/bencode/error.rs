use thiserror::Error;

/// Errors from decoding or encoding bencode. Offsets are byte positions in
/// the decoder input.
#[derive(Debug, Error)]
pub enum BencodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid integer at offset {offset}: {reason}")]
    InvalidInteger { offset: usize, reason: &'static str },

    #[error("invalid string length at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("unexpected byte 0x{byte:02x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    #[error("dictionary key at offset {offset} is not a byte string")]
    NonStringKey { offset: usize },

    #[error("trailing data at offset {offset}")]
    TrailingData { offset: usize },

    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    /// Bencode integers are signed 64-bit; larger unsigned values cannot be encoded.
    #[error("integer {0} does not fit in a bencode integer")]
    IntegerOverflow(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
