/***************************************************************************************************
 * SurrealDB Tag Dispatcher
 *
 * Grounded on the teacher's `TagBuf`/`Tag<F>` combinator pair (tag.rs), generalized from a
 * single-purpose lazy-iterator wrapper into a table-driven dispatcher over an already-decoded
 * payload: `decode.rs` decodes the tag's enclosed item polymorphically and hands it here, this
 * module interprets the (tag number, payload) pair per the tag table.
 *
 * Unknown tags are not handled here — `decode.rs` falls back to `Value::Tag` itself when this
 * module reports the tag number is not one of ours.
 **************************************************************************************************/
use std::borrow::Cow;

use chrono::{TimeZone, Utc};

use crate::constants::tag;
use crate::domain::{Bound, Datetime, Decimal, Duration, Future, Geometry, Line, MultiLine, MultiPoint,
    MultiPolygon, Point, Polygon, Range, RecordId, Table, Uuid};
use crate::error::{Error, Result};
use crate::value::Value;

/// Interpret a tag number and its already-decoded enclosed payload.
///
/// A tag number this dispatcher doesn't recognise falls back to the generic
/// `Value::Tag(number, payload)` lossy-passthrough representation (§4.5's documented choice for
/// unknown tags).
pub(crate) fn dispatch<'buf>(tag_num: u64, payload: Value<'buf>) -> Result<Value<'buf>> {
    Ok(match tag_num {
        tag::DATETIME_TEXT => datetime_text(payload)?,
        tag::NONE => Value::None,
        tag::TABLE => Value::Table(Table(text(payload, tag_num)?)),
        tag::RECORD_ID => record_id(payload, tag_num)?,
        tag::UUID_STRING => Value::Uuid(uuid_string(payload, tag_num)?),
        tag::DECIMAL_STRING => Value::Decimal(Decimal(text(payload, tag_num)?)),
        tag::DATETIME_BINARY => datetime_binary(payload, tag_num)?,
        tag::DURATION_STRING => Value::Duration(duration_string(payload, tag_num)?),
        tag::DURATION_BINARY => Value::Duration(duration_binary(payload, tag_num)?),
        tag::FUTURE => Value::Future(Future),
        tag::UUID_BINARY => Value::Uuid(uuid_binary(payload, tag_num)?),
        tag::RANGE => Value::Range(Box::new(range(payload, tag_num)?)),
        tag::BOUND_INCLUDED => Value::Tag(tag_num, Box::new(payload)),
        tag::BOUND_EXCLUDED => Value::Tag(tag_num, Box::new(payload)),
        tag::GEOMETRY_POINT => Value::Geometry(Geometry::Point(point(&payload, tag_num)?)),
        tag::GEOMETRY_LINE => Value::Geometry(Geometry::Line(line(payload, tag_num)?)),
        tag::GEOMETRY_POLYGON => Value::Geometry(Geometry::Polygon(polygon(payload, tag_num)?)),
        tag::GEOMETRY_MULTIPOINT => Value::Geometry(Geometry::MultiPoint(MultiPoint(points(payload, tag_num)?))),
        tag::GEOMETRY_MULTILINE => {
            Value::Geometry(Geometry::MultiLine(MultiLine(lines(payload, tag_num)?)))
        }
        tag::GEOMETRY_MULTIPOLYGON => {
            Value::Geometry(Geometry::MultiPolygon(MultiPolygon(polygons(payload, tag_num)?)))
        }
        tag::GEOMETRY_COLLECTION => Value::Geometry(Geometry::Collection(collection(payload, tag_num)?)),
        _ => Value::Tag(tag_num, Box::new(payload)),
    })
}

fn text(v: Value<'_>, tag_num: u64) -> Result<String> {
    match v {
        Value::Text(s) => Ok(s.into_owned()),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn type_mismatch_msg(found: &'static str) -> &'static str {
    match found {
        "uint" => "expected text payload, found uint",
        "nint" => "expected text payload, found nint",
        "bytes" => "expected text payload, found bytes",
        "array" => "expected text payload, found array",
        _ => "expected text payload, found incompatible value",
    }
}

fn array(v: Value<'_>, tag_num: u64) -> Result<Vec<Value<'_>>> {
    match v {
        Value::Array(items) => Ok(items),
        other => Err(Error::ProtocolViolation(tag_num, array_mismatch_msg(other.type_name()))),
    }
}

fn array_mismatch_msg(found: &'static str) -> &'static str {
    match found {
        "text" => "expected array payload, found text",
        "bytes" => "expected array payload, found bytes",
        "uint" => "expected array payload, found uint",
        _ => "expected array payload, found incompatible value",
    }
}

fn datetime_text(v: Value<'_>) -> Result<Value<'static>> {
    let s = text(v, tag::DATETIME_TEXT)?;
    let parsed = chrono::DateTime::parse_from_rfc3339(&s)
        .map_err(|_| Error::ProtocolViolation(tag::DATETIME_TEXT, "invalid RFC 3339 datetime text"))?;
    Ok(Value::Datetime(Datetime(parsed.with_timezone(&Utc))))
}

fn datetime_binary(v: Value<'_>, tag_num: u64) -> Result<Value<'static>> {
    let items = array(v, tag_num)?;
    if items.len() != 2 {
        return Err(Error::ProtocolViolation(tag_num, "datetime array must have exactly 2 elements"));
    }
    let secs = as_i64(&items[0], tag_num)?;
    let nanos = as_i64(&items[1], tag_num)?;
    let dt = Utc
        .timestamp_opt(secs, u32::try_from(nanos).map_err(|_| Error::ProtocolViolation(tag_num, "nanoseconds out of range"))?)
        .single()
        .ok_or(Error::ProtocolViolation(tag_num, "datetime seconds/nanoseconds out of range"))?;
    Ok(Value::Datetime(Datetime(dt)))
}

fn as_i64(v: &Value<'_>, tag_num: u64) -> Result<i64> {
    match v {
        Value::Uint(u) => i64::try_from(*u).map_err(|_| Error::Overflow("i64")),
        Value::Nint(n) => Ok(*n),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn as_u64(v: &Value<'_>, tag_num: u64) -> Result<u64> {
    match v {
        Value::Uint(u) => Ok(*u),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn as_f64(v: &Value<'_>, tag_num: u64) -> Result<f64> {
    match v {
        Value::Float64(f) => Ok(*f),
        Value::Float32(f) => Ok(*f as f64),
        Value::Uint(u) => Ok(*u as f64),
        Value::Nint(n) => Ok(*n as f64),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn record_id(v: Value<'_>, tag_num: u64) -> Result<Value<'static>> {
    let items = array(v, tag_num)?;
    if items.len() != 2 {
        return Err(Error::ProtocolViolation(tag_num, "record id array must have exactly 2 elements"));
    }
    let mut it = items.into_iter();
    let table = text(it.next().unwrap(), tag_num)?;
    let id = value_to_id_string(it.next().unwrap(), tag_num)?;
    Ok(Value::RecordId(RecordId { table, id }))
}

fn value_to_id_string(v: Value<'_>, tag_num: u64) -> Result<String> {
    match v {
        Value::Text(s) => Ok(s.into_owned()),
        Value::Uint(u) => Ok(u.to_string()),
        Value::Nint(n) => Ok(n.to_string()),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn parse_hyphenated_uuid(s: &str, tag_num: u64) -> Result<[u8; 16]> {
    let hex: String = s.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 {
        return Err(Error::ProtocolViolation(tag_num, "uuid string has the wrong length"));
    }
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| Error::ProtocolViolation(tag_num, "uuid string is not valid hex"))?;
    }
    Ok(out)
}

fn uuid_string(v: Value<'_>, tag_num: u64) -> Result<Uuid> {
    let s = text(v, tag_num)?;
    Ok(Uuid(parse_hyphenated_uuid(&s, tag_num)?))
}

fn uuid_binary(v: Value<'_>, tag_num: u64) -> Result<Uuid> {
    match v {
        Value::Bytes(b) if b.len() == 16 => {
            let mut out = [0u8; 16];
            out.copy_from_slice(&b);
            Ok(Uuid(out))
        }
        Value::Bytes(b) => Err(Error::ProtocolViolation(tag_num, uuid_len_msg(b.len()))),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn uuid_len_msg(_len: usize) -> &'static str {
    "binary uuid must be exactly 16 bytes"
}

/// Parses a SurrealDB-style compound duration string (`"1h30m"`, `"500ms"`, `"0"`).
fn duration_string(v: Value<'_>, tag_num: u64) -> Result<Duration> {
    let s = text(v, tag_num)?;
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    let mut secs: u64 = 0;
    let mut nanos: u64 = 0;
    let mut digits = String::new();
    let mut chars = s.chars().peekable();
    let mut any = false;
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let mut unit = String::new();
        unit.push(c);
        while let Some(next) = chars.peek() {
            if next.is_ascii_digit() {
                break;
            }
            unit.push(*next);
            chars.next();
        }
        let n: u64 = digits
            .parse()
            .map_err(|_| Error::ProtocolViolation(tag_num, "duration string has a malformed numeric component"))?;
        digits.clear();
        any = true;
        match unit.as_str() {
            "ns" => nanos += n,
            "us" | "µs" => nanos += n * 1_000,
            "ms" => nanos += n * 1_000_000,
            "s" => secs += n,
            "m" => secs += n * 60,
            "h" => secs += n * 3_600,
            "d" => secs += n * 86_400,
            "w" => secs += n * 604_800,
            "y" => secs += n * 365 * 86_400,
            _ => return Err(Error::ProtocolViolation(tag_num, "duration string has an unrecognized unit")),
        }
    }
    if !any {
        return Err(Error::ProtocolViolation(tag_num, "duration string has no numeric component"));
    }
    secs += nanos / 1_000_000_000;
    nanos %= 1_000_000_000;
    Ok(Duration { secs, nanos: nanos as u32 })
}

fn duration_binary(v: Value<'_>, tag_num: u64) -> Result<Duration> {
    let items = array(v, tag_num)?;
    if items.len() > 2 {
        return Err(Error::ProtocolViolation(tag_num, "duration array must have 0, 1, or 2 elements"));
    }
    let secs = items.get(0).map(|v| as_u64(v, tag_num)).transpose()?.unwrap_or(0);
    let nanos = items.get(1).map(|v| as_u64(v, tag_num)).transpose()?.unwrap_or(0);
    let nanos = u32::try_from(nanos).map_err(|_| Error::Overflow("duration nanoseconds"))?;
    Ok(Duration { secs, nanos })
}

fn range(v: Value<'_>, tag_num: u64) -> Result<Range<'_>> {
    let items = array(v, tag_num)?;
    if items.len() != 2 {
        return Err(Error::ProtocolViolation(tag_num, "range array must have exactly 2 elements"));
    }
    let mut it = items.into_iter();
    let start = bound(it.next().unwrap(), tag_num)?;
    let end = bound(it.next().unwrap(), tag_num)?;
    Ok(Range { start, end })
}

fn bound(v: Value<'_>, tag_num: u64) -> Result<Bound<'_>> {
    match v {
        Value::None => Ok(Bound::Unbounded),
        Value::Tag(t, inner) if t == tag::BOUND_INCLUDED => Ok(Bound::Included(*inner)),
        Value::Tag(t, inner) if t == tag::BOUND_EXCLUDED => Ok(Bound::Excluded(*inner)),
        _ => Err(Error::ProtocolViolation(tag_num, "range bound must be NONE or tag 50/51")),
    }
}

fn point(v: &Value<'_>, tag_num: u64) -> Result<Point> {
    match v {
        Value::Geometry(Geometry::Point(p)) => Ok(*p),
        Value::Array(items) if items.len() == 2 => {
            Ok(Point { lon: as_f64(&items[0], tag_num)?, lat: as_f64(&items[1], tag_num)? })
        }
        other => Err(Error::ProtocolViolation(tag_num, point_mismatch_msg(other))),
    }
}

fn point_mismatch_msg(_v: &Value<'_>) -> &'static str {
    "geometry point must be a 2-element coordinate array"
}

fn points(v: Value<'_>, tag_num: u64) -> Result<Vec<Point>> {
    array(v, tag_num)?.iter().map(|item| point(item, tag_num)).collect()
}

fn line(v: Value<'_>, tag_num: u64) -> Result<Line> {
    match v {
        Value::Geometry(Geometry::Line(l)) => Ok(l),
        Value::Array(_) => Ok(Line(points(v, tag_num)?)),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn lines(v: Value<'_>, tag_num: u64) -> Result<Vec<Line>> {
    array(v, tag_num)?.into_iter().map(|item| line(item, tag_num)).collect()
}

fn polygon(v: Value<'_>, tag_num: u64) -> Result<Polygon> {
    match v {
        Value::Geometry(Geometry::Polygon(p)) => Ok(p),
        Value::Array(_) => Ok(Polygon(lines(v, tag_num)?)),
        other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
    }
}

fn polygons(v: Value<'_>, tag_num: u64) -> Result<Vec<Polygon>> {
    array(v, tag_num)?.into_iter().map(|item| polygon(item, tag_num)).collect()
}

fn collection(v: Value<'_>, tag_num: u64) -> Result<Vec<Geometry>> {
    array(v, tag_num)?
        .into_iter()
        .map(|item| match item {
            Value::Geometry(g) => Ok(g),
            other => Err(Error::ProtocolViolation(tag_num, type_mismatch_msg(other.type_name()))),
        })
        .collect()
}
