/***************************************************************************************************
 * CBOR Encoder
 *
 * The inverse direction of the decoder: a growable-buffer serializer producing wire bytes this
 * crate's own decoder accepts, covering every domain type and its registered tag (§4.5/§6).
 * Not the focus of engineering effort here — the hard logic lives on the decode side — but exists
 * so domain values can actually reach the wire, and so the round-trip tests in the suite have
 * something to round-trip through.
 *
 * Grounded on the teacher's `EncodeBuffer`/`EncodeItem`/`EncodeContext` combinator style
 * (`encode.rs`), adapted from its fixed caller-supplied `&mut [u8]` to a growable `Vec<u8>` — this
 * crate targets a WebSocket-connected client, not an embedded target, so there is no reason to
 * carry the teacher's buffer-overflow bookkeeping (`EndOfBuffer`, `move_items` length fixups).
 **************************************************************************************************/
use crate::constants::tag;
use crate::constants::*;
use crate::domain::{Bound, Datetime, Decimal, Duration, Future, Geometry, Line, MultiLine, MultiPoint,
    MultiPolygon, Point, Polygon, Range, RecordId, Table, Uuid};
use crate::value::Value;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// A growable CBOR output buffer. Every `insert` appends one complete, well-formed item; there is
/// no fixup pass because the buffer always knows its own length.
#[derive(Debug, Default)]
pub struct Encoder {
    bytes: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder { bytes: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Encoder { bytes: Vec::with_capacity(cap) }
    }

    #[inline]
    pub fn insert(&mut self, item: &dyn Encode) -> &mut Self {
        item.encode(self);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn push_head(&mut self, major: u8, arg: u64) {
        let mt = major << 5;
        if arg < 24 {
            self.bytes.push(mt | arg as u8);
        } else if arg <= u8::MAX as u64 {
            self.bytes.push(mt | PAYLOAD_ONE_BYTE);
            self.bytes.push(arg as u8);
        } else if arg <= u16::MAX as u64 {
            self.bytes.push(mt | PAYLOAD_TWO_BYTES);
            self.bytes.extend_from_slice(&(arg as u16).to_be_bytes());
        } else if arg <= u32::MAX as u64 {
            self.bytes.push(mt | PAYLOAD_FOUR_BYTES);
            self.bytes.extend_from_slice(&(arg as u32).to_be_bytes());
        } else {
            self.bytes.push(mt | PAYLOAD_EIGHT_BYTES);
            self.bytes.extend_from_slice(&arg.to_be_bytes());
        }
    }

    fn push_uint(&mut self, v: u64) {
        self.push_head(0, v);
    }

    fn push_nint(&mut self, v: i64) {
        debug_assert!(v < 0);
        self.push_head(1, (-1 - v) as u64);
    }

    fn push_bytes(&mut self, b: &[u8]) {
        self.push_head(2, b.len() as u64);
        self.bytes.extend_from_slice(b);
    }

    fn push_text(&mut self, s: &str) {
        self.push_head(3, s.len() as u64);
        self.bytes.extend_from_slice(s.as_bytes());
    }

    fn push_array_head(&mut self, len: usize) {
        self.push_head(4, len as u64);
    }

    fn push_map_head(&mut self, pairs: usize) {
        self.push_head(5, pairs as u64);
    }

    fn push_tag(&mut self, tag_num: u64) {
        self.push_head(6, tag_num);
    }

    fn push_simple(&mut self, v: u8) {
        self.bytes.push((7 << 5) | v);
    }

    fn push_f64(&mut self, v: f64) {
        self.bytes.push((7 << 5) | PAYLOAD_EIGHT_BYTES);
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
}

/// Implemented by every type this crate can put on the wire.
pub trait Encode {
    fn encode(&self, buf: &mut Encoder);
}

macro_rules! impl_encode_uint {
    ($($t:ty),*) => {
        $(impl Encode for $t {
            #[cfg_attr(feature = "trace", trace)]
            fn encode(&self, buf: &mut Encoder) {
                buf.push_uint(*self as u64);
            }
        })*
    };
}
impl_encode_uint!(u8, u16, u32, u64, usize);

macro_rules! impl_encode_int {
    ($($t:ty),*) => {
        $(impl Encode for $t {
            fn encode(&self, buf: &mut Encoder) {
                if *self < 0 {
                    buf.push_nint(*self as i64);
                } else {
                    buf.push_uint(*self as u64);
                }
            }
        })*
    };
}
impl_encode_int!(i8, i16, i32, i64);

impl Encode for bool {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_simple(if *self { SIMPLE_TRUE } else { SIMPLE_FALSE });
    }
}

impl Encode for f64 {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_f64(*self);
    }
}

impl Encode for f32 {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_f64(*self as f64);
    }
}

impl Encode for str {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_text(self);
    }
}

impl Encode for String {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_text(self);
    }
}

impl Encode for [u8] {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_bytes(self);
    }
}

impl Encode for crate::value::ByteString {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_bytes(&self.0);
    }
}

impl<T: Encode> Encode for Option<T> {
    /// A missing value always goes on the wire as the NONE tag wrapping a null, never a bare
    /// simple value (§4.7, mirrored by `bind::peek_is_none`'s short-circuit on decode).
    fn encode(&self, buf: &mut Encoder) {
        match self {
            Some(v) => v.encode(buf),
            None => {
                buf.push_tag(tag::NONE);
                buf.push_simple(SIMPLE_NULL);
            }
        }
    }
}

impl<T: Encode> Encode for Box<T> {
    fn encode(&self, buf: &mut Encoder) {
        (**self).encode(buf);
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_array_head(self.len());
        for item in self {
            item.encode(buf);
        }
    }
}

impl<V: Encode> Encode for std::collections::HashMap<String, V> {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_map_head(self.len());
        for (k, v) in self {
            k.encode(buf);
            v.encode(buf);
        }
    }
}

impl<V: Encode> Encode for std::collections::BTreeMap<String, V> {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_map_head(self.len());
        for (k, v) in self {
            k.encode(buf);
            v.encode(buf);
        }
    }
}

impl<'buf> Encode for Value<'buf> {
    fn encode(&self, buf: &mut Encoder) {
        match self {
            Value::None => {
                buf.push_tag(tag::NONE);
                buf.push_simple(SIMPLE_NULL);
            }
            Value::Bool(b) => b.encode(buf),
            Value::Uint(v) => buf.push_uint(*v),
            Value::Nint(v) => buf.push_nint(*v),
            Value::Float32(v) => v.encode(buf),
            Value::Float64(v) => v.encode(buf),
            Value::Bytes(b) => buf.push_bytes(b),
            Value::Text(s) => buf.push_text(s),
            Value::Array(items) => {
                buf.push_array_head(items.len());
                for item in items {
                    item.encode(buf);
                }
            }
            Value::StringMap(pairs) => {
                buf.push_map_head(pairs.len());
                for (k, v) in pairs {
                    buf.push_text(k);
                    v.encode(buf);
                }
            }
            Value::AnyMap(pairs) => {
                buf.push_map_head(pairs.len());
                for (k, v) in pairs {
                    k.encode(buf);
                    v.encode(buf);
                }
            }
            Value::Tag(n, inner) => {
                buf.push_tag(*n);
                inner.encode(buf);
            }
            Value::Table(t) => t.encode(buf),
            Value::RecordId(r) => r.encode(buf),
            Value::Uuid(u) => u.encode(buf),
            Value::Decimal(d) => d.encode(buf),
            Value::Datetime(d) => d.encode(buf),
            Value::Duration(d) => d.encode(buf),
            Value::Future(f) => f.encode(buf),
            Value::Range(r) => r.encode(buf),
            Value::Geometry(g) => g.encode(buf),
        }
    }
}

impl Encode for Table {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::TABLE);
        buf.push_text(&self.0);
    }
}

impl Encode for RecordId {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::RECORD_ID);
        buf.push_array_head(2);
        buf.push_text(&self.table);
        buf.push_text(&self.id);
    }
}

impl Encode for Uuid {
    /// Always the 16-byte binary form (tag 37); the text form (tag 9) is decode-only interop, not
    /// something this encoder chooses to emit.
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::UUID_BINARY);
        buf.push_bytes(&self.0);
    }
}

impl Encode for Decimal {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::DECIMAL_STRING);
        buf.push_text(&self.0);
    }
}

impl Encode for Datetime {
    /// RFC 3339 text under tag 0 (§6's stated wire contract for encoder output).
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::DATETIME_TEXT);
        buf.push_text(&self.0.to_rfc3339());
    }
}

impl Encode for Duration {
    /// Always the two-element `[seconds, nanoseconds]` binary form (tag 14) — the shorter forms
    /// are accepted on decode but never produced here (spec's documented asymmetry).
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::DURATION_BINARY);
        buf.push_array_head(2);
        buf.push_uint(self.secs);
        buf.push_uint(self.nanos as u64);
    }
}

impl Encode for Future {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::FUTURE);
        buf.push_simple(SIMPLE_NULL);
    }
}

impl<'buf> Encode for Bound<'buf> {
    fn encode(&self, buf: &mut Encoder) {
        match self {
            Bound::Unbounded => {
                buf.push_tag(tag::NONE);
                buf.push_simple(SIMPLE_NULL);
            }
            Bound::Included(v) => {
                buf.push_tag(tag::BOUND_INCLUDED);
                v.encode(buf);
            }
            Bound::Excluded(v) => {
                buf.push_tag(tag::BOUND_EXCLUDED);
                v.encode(buf);
            }
        }
    }
}

impl<'buf> Encode for Range<'buf> {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::RANGE);
        buf.push_array_head(2);
        self.start.encode(buf);
        self.end.encode(buf);
    }
}

impl Encode for Point {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::GEOMETRY_POINT);
        buf.push_array_head(2);
        buf.push_f64(self.lon);
        buf.push_f64(self.lat);
    }
}

impl Encode for Line {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::GEOMETRY_LINE);
        self.0.encode_coords(buf);
    }
}

impl Encode for Polygon {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::GEOMETRY_POLYGON);
        buf.push_array_head(self.0.len());
        for line in &self.0 {
            line.0.encode_coords(buf);
        }
    }
}

impl Encode for MultiPoint {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::GEOMETRY_MULTIPOINT);
        self.0.encode_coords(buf);
    }
}

impl Encode for MultiLine {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::GEOMETRY_MULTILINE);
        buf.push_array_head(self.0.len());
        for line in &self.0 {
            line.0.encode_coords(buf);
        }
    }
}

impl Encode for MultiPolygon {
    fn encode(&self, buf: &mut Encoder) {
        buf.push_tag(tag::GEOMETRY_MULTIPOLYGON);
        buf.push_array_head(self.0.len());
        for polygon in &self.0 {
            buf.push_array_head(polygon.0.len());
            for line in &polygon.0 {
                line.0.encode_coords(buf);
            }
        }
    }
}

impl Encode for Geometry {
    fn encode(&self, buf: &mut Encoder) {
        match self {
            Geometry::Point(p) => p.encode(buf),
            Geometry::Line(l) => l.encode(buf),
            Geometry::Polygon(p) => p.encode(buf),
            Geometry::MultiPoint(p) => p.encode(buf),
            Geometry::MultiLine(l) => l.encode(buf),
            Geometry::MultiPolygon(p) => p.encode(buf),
            Geometry::Collection(items) => {
                buf.push_tag(tag::GEOMETRY_COLLECTION);
                buf.push_array_head(items.len());
                for g in items {
                    g.encode(buf);
                }
            }
        }
    }
}

/// Shared "bare array of points" body used by `Line`/`MultiPoint` (identical payload shape, a
/// plain array of tag-88 points) without writing that loop out twice.
trait EncodePointList {
    fn encode_coords(&self, buf: &mut Encoder);
}

impl EncodePointList for Vec<Point> {
    fn encode_coords(&self, buf: &mut Encoder) {
        buf.push_array_head(self.len());
        for p in self {
            p.encode(buf);
        }
    }
}
