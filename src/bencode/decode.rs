use std::collections::BTreeMap;

use bytes::Bytes;

use super::error::BencodeError;
use super::value::Value;

const MAX_DEPTH: usize = 64;

/// Decodes a single bencode value that spans the whole input.
///
/// Integers with leading zeros or `-0` are rejected. Dictionary keys are
/// accepted in any order; re-encoding the result emits them sorted, so use
/// [`decode_dict_raw`] where the original bytes of a value must survive.
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let mut decoder = Decoder { data, pos: 0 };
    let value = decoder.value(0)?;

    if decoder.pos != data.len() {
        return Err(BencodeError::TrailingData {
            offset: decoder.pos,
        });
    }
    Ok(value)
}

/// Splits a top-level dictionary into its keys and the raw encoded bytes of
/// each value, in input order.
///
/// Values are validated but not rebuilt, so a value can be hashed or copied
/// exactly as it appeared even when its own keys are unsorted.
///
/// ```
/// use reltorrent::bencode::decode_dict_raw;
///
/// let entries = decode_dict_raw(b"d1:bi2e1:ad1:zi0e1:yi1eee").unwrap();
/// assert_eq!(entries[1].0.as_ref(), b"a");
/// assert_eq!(entries[1].1, b"d1:zi0e1:yi1ee");
/// ```
pub fn decode_dict_raw(data: &[u8]) -> Result<Vec<(Bytes, &[u8])>, BencodeError> {
    let mut decoder = Decoder { data, pos: 0 };
    match decoder.peek()? {
        b'd' => decoder.pos += 1,
        byte => return Err(BencodeError::UnexpectedByte { byte, offset: 0 }),
    }

    let mut entries = Vec::new();
    while decoder.peek()? != b'e' {
        let offset = decoder.pos;
        let key = match decoder.value(1)? {
            Value::Bytes(key) => key,
            _ => return Err(BencodeError::NonStringKey { offset }),
        };
        let start = decoder.pos;
        decoder.value(1)?;
        entries.push((key, &data[start..decoder.pos]));
    }
    decoder.pos += 1;

    if decoder.pos != data.len() {
        return Err(BencodeError::TrailingData {
            offset: decoder.pos,
        });
    }
    Ok(entries)
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof)
    }

    /// Returns the bytes up to `delim` and moves past the delimiter.
    fn take_until(&mut self, delim: u8) -> Result<&'a [u8], BencodeError> {
        let data = self.data;
        let rest = &data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == delim)
            .ok_or(BencodeError::UnexpectedEof)?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep(MAX_DEPTH));
        }

        match self.peek()? {
            b'i' => self.integer().map(Value::Integer),
            b'l' => self.list(depth),
            b'd' => self.dict(depth),
            b'0'..=b'9' => self.bytes().map(Value::Bytes),
            byte => Err(BencodeError::UnexpectedByte {
                byte,
                offset: self.pos,
            }),
        }
    }

    fn integer(&mut self) -> Result<i64, BencodeError> {
        let offset = self.pos;
        self.pos += 1;
        let digits = self.take_until(b'e')?;
        let invalid = |reason| BencodeError::InvalidInteger { offset, reason };

        let unsigned = digits.strip_prefix(b"-").unwrap_or(digits);
        if unsigned.is_empty() {
            return Err(invalid("no digits"));
        }
        if !unsigned.iter().all(u8::is_ascii_digit) {
            return Err(invalid("non-digit character"));
        }
        if unsigned[0] == b'0' && (unsigned.len() > 1 || unsigned.len() != digits.len()) {
            return Err(invalid("leading zero"));
        }

        // Only ASCII digits and an optional sign remain.
        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| invalid("out of range"))
    }

    fn bytes(&mut self) -> Result<Bytes, BencodeError> {
        let offset = self.pos;
        let digits = self.take_until(b':')?;
        let len: usize = std::str::from_utf8(digits)
            .ok()
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::InvalidLength { offset })?;

        if len > self.data.len() - self.pos {
            return Err(BencodeError::UnexpectedEof);
        }
        let bytes = Bytes::copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut list = Vec::new();
        while self.peek()? != b'e' {
            list.push(self.value(depth + 1)?);
        }
        self.pos += 1;
        Ok(Value::List(list))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut dict = BTreeMap::new();
        while self.peek()? != b'e' {
            let offset = self.pos;
            let key = match self.value(depth + 1)? {
                Value::Bytes(key) => key,
                _ => return Err(BencodeError::NonStringKey { offset }),
            };
            let value = self.value(depth + 1)?;
            dict.insert(key, value);
        }
        self.pos += 1;
        Ok(Value::Dict(dict))
    }
}
