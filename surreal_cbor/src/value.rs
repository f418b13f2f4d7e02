/***************************************************************************************************
 * Value — the dynamic, polymorphic CBOR AST
 *
 * Binding to a target of polymorphic/any type yields one of these variants (data model
 * invariant 6): unsigned integers as u64, negative integers as i64, floats widened to f32/f64
 * depending on source precision, strings/bytes borrowed from the input buffer, sequences and
 * keyed containers of further `Value`s, and SurrealDB-tagged values as their domain type.
 **************************************************************************************************/
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::domain::{Datetime, Decimal, Duration, Future, Geometry, Range, RecordId, Table, Uuid};
use crate::error::{Error, Result};

/// A fully decoded, type-erased CBOR value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'buf> {
    /// The SurrealDB NONE tag (6) or a bare `null`/`undefined` simple value bound polymorphically.
    /// Kept distinct from any domain type so the binder can special-case it without re-inspecting
    /// the wrapped payload (invariants 5 and 7).
    None,
    Bool(bool),
    Uint(u64),
    Nint(i64),
    Float32(f32),
    Float64(f64),
    /// Borrowed for a definite-length string; owned when indefinite-length chunks had to be
    /// concatenated (invariant 4 — they aren't contiguous in the input buffer).
    Bytes(Cow<'buf, [u8]>),
    Text(Cow<'buf, str>),
    Array(Vec<Value<'buf>>),
    /// The configured default map shape: string-keyed by default (`config::MapShape`).
    StringMap(Vec<(String, Value<'buf>)>),
    AnyMap(Vec<(Value<'buf>, Value<'buf>)>),
    Datetime(Datetime),
    Duration(Duration),
    Table(Table),
    RecordId(RecordId),
    Uuid(Uuid),
    Decimal(Decimal),
    Future(Future),
    Range(Box<Range<'buf>>),
    Geometry(Geometry),
    /// An unrecognized tag number: decoded polymorphically, tag number discarded (§4.5's
    /// documented lossy passthrough).
    Tag(u64, Box<Value<'buf>>),
}

impl<'buf> Value<'buf> {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Uint(_) => "uint",
            Value::Nint(_) => "nint",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::StringMap(_) => "string-map",
            Value::AnyMap(_) => "any-map",
            Value::Datetime(_) => "datetime",
            Value::Duration(_) => "duration",
            Value::Table(_) => "table",
            Value::RecordId(_) => "record-id",
            Value::Uuid(_) => "uuid",
            Value::Decimal(_) => "decimal",
            Value::Future(_) => "future",
            Value::Range(_) => "range",
            Value::Geometry(_) => "geometry",
            Value::Tag(_, _) => "tag",
        }
    }
}

impl<'buf> TryFrom<Value<'buf>> for bool {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Bool(b) => Ok(b),
            other => Err(Error::TypeMismatch(other.type_name(), "bool")),
        }
    }
}

macro_rules! impl_try_from_uint {
    ($($t:ty),*) => {
        $(impl<'buf> TryFrom<Value<'buf>> for $t {
            type Error = Error;
            fn try_from(v: Value<'buf>) -> Result<Self> {
                match v {
                    Value::Uint(u) => <$t>::try_from(u).map_err(|_| Error::Overflow(stringify!($t))),
                    other => Err(Error::TypeMismatch(other.type_name(), stringify!($t))),
                }
            }
        })*
    };
}
impl_try_from_uint!(u8, u16, u32, u64, usize);

macro_rules! impl_try_from_int {
    ($($t:ty),*) => {
        $(impl<'buf> TryFrom<Value<'buf>> for $t {
            type Error = Error;
            fn try_from(v: Value<'buf>) -> Result<Self> {
                match v {
                    Value::Uint(u) => <$t>::try_from(u).map_err(|_| Error::Overflow(stringify!($t))),
                    Value::Nint(n) => <$t>::try_from(n).map_err(|_| Error::Overflow(stringify!($t))),
                    other => Err(Error::TypeMismatch(other.type_name(), stringify!($t))),
                }
            }
        })*
    };
}
impl_try_from_int!(i8, i16, i32, i64);

impl<'buf> TryFrom<Value<'buf>> for f64 {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Float64(f) => Ok(f),
            Value::Float32(f) => Ok(f as f64),
            other => Err(Error::TypeMismatch(other.type_name(), "f64")),
        }
    }
}

impl<'buf> TryFrom<Value<'buf>> for f32 {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Float32(f) => Ok(f),
            other => Err(Error::TypeMismatch(other.type_name(), "f32")),
        }
    }
}

/// Succeeds only for a borrowed (definite-length) text value; a chunked indefinite-length string
/// was reassembled into an owned buffer and has no `'buf`-lifetime slice to hand back.
impl<'buf> TryFrom<Value<'buf>> for &'buf str {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Text(Cow::Borrowed(s)) => Ok(s),
            Value::Text(Cow::Owned(_)) => Err(Error::TypeMismatch("text", "borrowed text")),
            other => Err(Error::TypeMismatch(other.type_name(), "text")),
        }
    }
}

impl<'buf> TryFrom<Value<'buf>> for &'buf [u8] {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Bytes(Cow::Borrowed(b)) => Ok(b),
            Value::Bytes(Cow::Owned(_)) => Err(Error::TypeMismatch("bytes", "borrowed bytes")),
            other => Err(Error::TypeMismatch(other.type_name(), "bytes")),
        }
    }
}

impl<'buf> TryFrom<Value<'buf>> for String {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Text(s) => Ok(s.into_owned()),
            other => Err(Error::TypeMismatch(other.type_name(), "text")),
        }
    }
}

impl<'buf> TryFrom<Value<'buf>> for Vec<u8> {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Bytes(b) => Ok(b.into_owned()),
            other => Err(Error::TypeMismatch(other.type_name(), "bytes")),
        }
    }
}

/// An owned byte string.
///
/// `Vec<u8>` itself binds through the generic `Vec<T>` array-of-elements path (so a bare
/// `Vec<u8>` field decodes from a CBOR array of small uints, matching the rest of the ecosystem's
/// convention of reserving plain `Vec<u8>` for "array of bytes"); `ByteString` is the explicit
/// opt-in for "CBOR byte string" when a field actually wants that wire shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteString(pub Vec<u8>);

impl From<Vec<u8>> for ByteString {
    fn from(v: Vec<u8>) -> Self {
        ByteString(v)
    }
}

impl From<ByteString> for Vec<u8> {
    fn from(v: ByteString) -> Self {
        v.0
    }
}

impl std::ops::Deref for ByteString {
    type Target = Vec<u8>;
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl std::ops::DerefMut for ByteString {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl<'buf> TryFrom<Value<'buf>> for ByteString {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        Vec::<u8>::try_from(v).map(ByteString)
    }
}

impl<'buf> From<ByteString> for Value<'buf> {
    fn from(v: ByteString) -> Self {
        Value::Bytes(Cow::Owned(v.0))
    }
}

impl<'buf> From<bool> for Value<'buf> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<'buf> From<u64> for Value<'buf> {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl<'buf> From<i64> for Value<'buf> {
    fn from(v: i64) -> Self {
        if v < 0 {
            Value::Nint(v)
        } else {
            Value::Uint(v as u64)
        }
    }
}

impl<'buf> From<&'buf str> for Value<'buf> {
    fn from(v: &'buf str) -> Self {
        Value::Text(Cow::Borrowed(v))
    }
}

impl<'buf> From<String> for Value<'buf> {
    fn from(v: String) -> Self {
        Value::Text(Cow::Owned(v))
    }
}

impl<'buf> From<&'buf [u8]> for Value<'buf> {
    fn from(v: &'buf [u8]) -> Self {
        Value::Bytes(Cow::Borrowed(v))
    }
}

impl<'buf> From<Vec<u8>> for Value<'buf> {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(v))
    }
}

macro_rules! impl_try_from_domain {
    ($($variant:ident => $t:ty),* $(,)?) => {
        $(impl<'buf> TryFrom<Value<'buf>> for $t {
            type Error = Error;
            fn try_from(v: Value<'buf>) -> Result<Self> {
                match v {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(Error::TypeMismatch(other.type_name(), stringify!($t))),
                }
            }
        })*
    };
}
impl_try_from_domain!(
    Table => Table,
    RecordId => RecordId,
    Uuid => Uuid,
    Decimal => Decimal,
    Datetime => Datetime,
    Duration => Duration,
    Future => Future,
    Geometry => Geometry,
);

impl<'buf> TryFrom<Value<'buf>> for Range<'buf> {
    type Error = Error;
    fn try_from(v: Value<'buf>) -> Result<Self> {
        match v {
            Value::Range(r) => Ok(*r),
            other => Err(Error::TypeMismatch(other.type_name(), "range")),
        }
    }
}

/// An owned variant of the string-keyed map used once a `Value::StringMap` has been collected
/// into a regular `BTreeMap`, for callers that prefer map semantics over insertion-order `Vec`.
impl<'buf> Value<'buf> {
    pub fn into_string_map(self) -> Result<BTreeMap<String, Value<'buf>>> {
        match self {
            Value::StringMap(entries) => Ok(entries.into_iter().collect()),
            other => Err(Error::TypeMismatch(other.type_name(), "string-map")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_narrows_with_overflow_check() {
        let v = Value::Uint(300);
        let r: Result<u8> = v.try_into();
        assert!(matches!(r, Err(Error::Overflow(_))));
    }

    #[test]
    fn float_into_int_is_type_mismatch() {
        let v = Value::Float64(1.0);
        let r: Result<u8> = v.try_into();
        assert!(matches!(r, Err(Error::TypeMismatch(_, _))));
    }

    #[test]
    fn none_is_distinct_from_null_bool() {
        assert!(Value::None.is_none());
        assert!(!Value::Bool(false).is_none());
    }
}
