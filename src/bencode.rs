//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format of `.torrent` files. The info-hash of
//! a torrent is the SHA-1 of its bencoded `info` dictionary, so the encoder
//! here is strict about one thing above all: dictionary keys are written in
//! raw lexicographic byte order.
//!
//! ```
//! use reltorrent::bencode::{decode, encode, Value};
//! use bytes::Bytes;
//! use std::collections::BTreeMap;
//!
//! let mut info = BTreeMap::new();
//! info.insert(Bytes::from_static(b"piece length"), Value::Integer(16384));
//! info.insert(Bytes::from_static(b"name"), Value::string("album"));
//!
//! let encoded = encode(&Value::Dict(info)).unwrap();
//! assert_eq!(encoded, b"d4:name5:album12:piece lengthi16384ee");
//!
//! let decoded = decode(&encoded).unwrap();
//! assert_eq!(decoded.get(b"name").and_then(|v| v.as_str()), Some("album"));
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_dict_raw};
pub use encode::{encode, encode_to};
pub use error::BencodeError;
pub use value::Value;
