/***************************************************************************************************
 * SurrealDB domain types
 *
 * Wire contract only (§4.5's payload shapes): these types carry exactly what the tag dispatcher
 * needs to round-trip the wire representation. Business semantics (arithmetic on `Decimal`,
 * geometry operations, duration math) are out of scope.
 **************************************************************************************************/
use chrono::{DateTime, Utc};

use crate::value::Value;

/// Tag 0 (RFC 3339 text) or tag 12 (binary `[seconds, nanoseconds]`) — both decode to the same
/// wall-clock timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Datetime(pub DateTime<Utc>);

/// Tag 13 (string) or tag 14 (binary `[seconds, nanoseconds]`, 0-2 elements accepted on decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub secs: u64,
    pub nanos: u32,
}

impl Duration {
    pub const ZERO: Duration = Duration { secs: 0, nanos: 0 };
}

/// Tag 7: a bare table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table(pub String);

/// Tag 8: `[table, id]` where `id` is itself an arbitrary CBOR value (commonly text or uint, but
/// the wire format does not constrain it further).
#[derive(Debug, Clone, PartialEq)]
pub struct RecordId {
    pub table: String,
    pub id: String,
}

/// Tag 9 (text form) or tag 37 (16-byte binary form).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uuid(pub [u8; 16]);

impl Uuid {
    pub const NIL: Uuid = Uuid([0u8; 16]);

    pub fn to_hyphenated_string(&self) -> String {
        let b = &self.0;
        format!(
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
        )
    }
}

/// Tag 10: arbitrary-precision decimal, carried wire-side as its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal(pub String);

/// Tag 15: an opaque, unevaluated future. The payload is consumed and discarded on decode (§9
/// Open Question — not preserved for round-trip).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Future;

/// One side of a `Range` (tag 49), produced by tag 50 (inclusive) or tag 51 (exclusive), or
/// absent (an unbounded side is encoded as NONE).
#[derive(Debug, Clone, PartialEq)]
pub enum Bound<'buf> {
    Unbounded,
    Included(Value<'buf>),
    Excluded(Value<'buf>),
}

/// Tag 49: a 2-element array of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Range<'buf> {
    pub start: Bound<'buf>,
    pub end: Bound<'buf>,
}

/// Tag 88: `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

/// Tag 89: an array of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Line(pub Vec<Point>);

/// Tag 90: an array of lines, the first of which is the exterior ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon(pub Vec<Line>);

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPoint(pub Vec<Point>);

#[derive(Debug, Clone, PartialEq)]
pub struct MultiLine(pub Vec<Line>);

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon(pub Vec<Polygon>);

/// Tag 94: an array of polymorphic geometries.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLine(MultiLine),
    MultiPolygon(MultiPolygon),
    Collection(Vec<Geometry>),
}
