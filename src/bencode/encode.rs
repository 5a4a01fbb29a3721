use std::io::Write;

use super::error::BencodeError;
use super::value::Value;

/// Encodes `value` into a new buffer.
///
/// ```
/// use reltorrent::bencode::{encode, Value};
/// use std::collections::BTreeMap;
/// use bytes::Bytes;
///
/// let mut dict = BTreeMap::new();
/// dict.insert(Bytes::from_static(b"b"), Value::Integer(2));
/// dict.insert(Bytes::from_static(b"a"), Value::string("x"));
/// assert_eq!(encode(&Value::Dict(dict)).unwrap(), b"d1:a1:x1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, BencodeError> {
    let mut buf = Vec::new();
    encode_to(value, &mut buf)?;
    Ok(buf)
}

/// Streams the encoding of `value` into `writer`.
///
/// Dictionary keys come out in raw byte order, the order `Bytes` compares
/// in, so the `info` dictionary hashes identically to any conforming encoder.
pub fn encode_to<W: Write + ?Sized>(value: &Value, writer: &mut W) -> Result<(), BencodeError> {
    match value {
        Value::Integer(n) => write!(writer, "i{}e", n)?,
        Value::Bytes(bytes) => write_bytes(bytes, writer)?,
        Value::List(items) => {
            writer.write_all(b"l")?;
            for item in items {
                encode_to(item, writer)?;
            }
            writer.write_all(b"e")?;
        }
        Value::Dict(entries) => {
            writer.write_all(b"d")?;
            for (key, item) in entries {
                write_bytes(key, writer)?;
                encode_to(item, writer)?;
            }
            writer.write_all(b"e")?;
        }
    }
    Ok(())
}

fn write_bytes<W: Write + ?Sized>(bytes: &[u8], writer: &mut W) -> std::io::Result<()> {
    write!(writer, "{}:", bytes.len())?;
    writer.write_all(bytes)
}
