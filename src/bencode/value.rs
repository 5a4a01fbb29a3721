use std::collections::BTreeMap;

use bytes::Bytes;

use super::error::BencodeError;

/// A decoded bencode value.
///
/// Dictionaries are `BTreeMap`s keyed by `Bytes`, which order by raw bytes,
/// the order bencode requires on the wire.
///
/// ```
/// use reltorrent::bencode::Value;
///
/// let length = Value::try_from(10_485_760u64).unwrap();
/// assert_eq!(length.as_integer(), Some(10_485_760));
/// assert_eq!(Value::string("album").as_str(), Some("album"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    /// Raw bytes; not necessarily UTF-8.
    Bytes(Bytes),
    List(Vec<Value>),
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The byte string as UTF-8, or `None` for other types and invalid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Mutable access to a dictionary, used to patch decoded torrents in place.
    ///
    /// ```
    /// use reltorrent::bencode::{decode, encode, Value};
    /// use bytes::Bytes;
    ///
    /// let mut value = decode(b"d8:announce3:olde").unwrap();
    /// value
    ///     .as_dict_mut()
    ///     .unwrap()
    ///     .insert(Bytes::from_static(b"announce"), Value::string("new"));
    /// assert_eq!(encode(&value).unwrap(), b"d8:announce3:newe");
    /// ```
    pub fn as_dict_mut(&mut self) -> Option<&mut BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Dictionary lookup; `None` when this is not a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

/// Lengths and sizes are `u64` but bencode integers are `i64`.
impl TryFrom<u64> for Value {
    type Error = BencodeError;

    fn try_from(n: u64) -> Result<Self, Self::Error> {
        i64::try_from(n)
            .map(Value::Integer)
            .map_err(|_| BencodeError::IntegerOverflow(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(Bytes::from(s))
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}
