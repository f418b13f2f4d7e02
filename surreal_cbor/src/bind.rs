/***************************************************************************************************
 * Reflective Binder
 *
 * The `CborDecode` trait is what every decode target implements — primitives directly, container
 * types generically over their element type, and structs via `#[derive(CborDecode)]`, which emits
 * a per-type `FieldIndex` lookup and calls `decode_map_entries` below to materialize the incoming
 * map before resolving each entry against that index (and, for `#[cbor(flatten)]` fields, against
 * the embedded type's own index in turn).
 *
 * Grounded on the teacher's `TryFrom<CBOR>` conversions (`ast.rs`) for the primitive leg, and on
 * its `ArrayBuf`/`MapBuf` buffer-iteration style (`array.rs`/`map.rs`) for the container leg,
 * generalized from those buffer-iterator adapters into a single recursive trait method.
 **************************************************************************************************/
use std::collections::{BTreeMap, HashMap};

use crate::config::DecodeOptions;
use crate::cursor::{Cursor, HeadArg};
use crate::decode::decode_value;
use crate::error::{Error, Result};
use crate::value::Value;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Implemented by every decode target: primitives, `Option`/`Box`/collections generically, the
/// dynamic [`Value`] itself, and user record types via `#[derive(CborDecode)]`.
pub trait CborDecode<'buf>: Sized {
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self>;
}

impl<'buf> CborDecode<'buf> for Value<'buf> {
    #[cfg_attr(feature = "trace", trace)]
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
        decode_value(cursor, opts)
    }
}

macro_rules! impl_decode_via_value {
    ($($t:ty),* $(,)?) => {
        $(impl<'buf> CborDecode<'buf> for $t {
            fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
                <$t>::try_from(decode_value(cursor, opts)?)
            }
        })*
    };
}
impl_decode_via_value!(
    bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, f32, f64, String, crate::value::ByteString,
    crate::domain::Table, crate::domain::RecordId, crate::domain::Uuid, crate::domain::Decimal,
    crate::domain::Datetime, crate::domain::Duration, crate::domain::Future, crate::domain::Geometry,
);

impl<'buf> CborDecode<'buf> for &'buf str {
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
        <&'buf str>::try_from(decode_value(cursor, opts)?)
    }
}

impl<'buf> CborDecode<'buf> for &'buf [u8] {
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
        <&'buf [u8]>::try_from(decode_value(cursor, opts)?)
    }
}

impl<'buf> CborDecode<'buf> for crate::domain::Range<'buf> {
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
        crate::domain::Range::try_from(decode_value(cursor, opts)?)
    }
}

/// `true` if the next item is a NONE tag or a bare null/undefined simple value — the C2
/// short-circuit every reference-typed and polymorphic target checks first. Reads the head on a
/// cloned cursor so a `false` result leaves the real cursor untouched.
fn peek_is_none(cursor: &Cursor<'_>) -> Result<bool> {
    let mut probe = *cursor;
    let head = probe.read_head()?;
    Ok(match head.major {
        7 => matches!(head.info, 22 | 23),
        6 => head.arg.as_u64() == 6,
        _ => false,
    })
}

/// A reference-typed target: NONE sets it to the null state without re-entering the enclosed
/// payload (§4.7); anything else allocates and binds the pointee.
impl<'buf, T: CborDecode<'buf>> CborDecode<'buf> for Option<T> {
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
        if peek_is_none(cursor)? {
            cursor.skip_item()?;
            return Ok(None);
        }
        Ok(Some(T::decode(cursor, opts)?))
    }
}

impl<'buf, T: CborDecode<'buf>> CborDecode<'buf> for Box<T> {
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
        Ok(Box::new(T::decode(cursor, opts)?))
    }
}

/// Binds an array into a growable sequence, independent of any configured map shape (§4.4's
/// definite and indefinite forms, with the same length cap as the dynamic decoder).
impl<'buf, T: CborDecode<'buf>> CborDecode<'buf> for Vec<T> {
    fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
        let head = cursor.read_head()?;
        if head.major != 4 {
            return Err(Error::TypeMismatch(major_type_name(head.major), "array"));
        }
        let mut items = Vec::new();
        match head.arg {
            HeadArg::Indefinite => loop {
                if cursor.consume_break_if_present()? {
                    break;
                }
                if items.len() >= opts.max_array_len {
                    return Err(Error::Overflow("array length"));
                }
                items.push(T::decode(cursor, opts)?);
            },
            _ => {
                let len = head.arg.as_usize()?;
                if len > opts.max_array_len {
                    return Err(Error::Overflow("array length"));
                }
                items.reserve(len);
                for _ in 0..len {
                    items.push(T::decode(cursor, opts)?);
                }
            }
        }
        Ok(items)
    }
}

/// Binds a map into a keyed container whose keys are text strings (§4.4's keyed-container
/// target path — `HashMap`/`BTreeMap` always decode their keys as text regardless of the
/// configured default map shape, which only governs *polymorphic* targets).
macro_rules! impl_decode_string_keyed_map {
    ($map:ident) => {
        impl<'buf, V: CborDecode<'buf>> CborDecode<'buf> for $map<String, V> {
            fn decode(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Self> {
                let head = cursor.read_head()?;
                if head.major != 5 {
                    return Err(Error::TypeMismatch(major_type_name(head.major), "map"));
                }
                let mut out = $map::new();
                match head.arg {
                    HeadArg::Indefinite => loop {
                        if cursor.consume_break_if_present()? {
                            break;
                        }
                        if out.len() >= opts.max_array_len {
                            return Err(Error::Overflow("map length"));
                        }
                        let key = <&'buf str>::decode(cursor, opts)?.to_string();
                        let value = V::decode(cursor, opts)?;
                        out.insert(key, value);
                    },
                    _ => {
                        let n = head.arg.as_usize()?;
                        if n > opts.max_array_len {
                            return Err(Error::Overflow("map length"));
                        }
                        for _ in 0..n {
                            let key = <&'buf str>::decode(cursor, opts)?.to_string();
                            let value = V::decode(cursor, opts)?;
                            out.insert(key, value);
                        }
                    }
                }
                Ok(out)
            }
        }
    };
}
impl_decode_string_keyed_map!(HashMap);
impl_decode_string_keyed_map!(BTreeMap);

fn major_type_name(major: u8) -> &'static str {
    match major {
        0 => "uint",
        1 => "nint",
        2 => "bytes",
        3 => "text",
        4 => "array",
        5 => "map",
        6 => "tag",
        7 => "simple",
        _ => "unknown",
    }
}

/// Reads a definite- or indefinite-length map's entries into borrowed `(key, raw item bytes)`
/// pairs instead of binding each value immediately (§4.4's record-target path, §4.6's
/// "unresolved is not an error" contract — an entry with no matching field is simply never
/// claimed by anything in `bind_entries`).
///
/// Used by `#[derive(CborDecode)]` for every record, not only ones with `#[cbor(flatten)]`
/// fields: a single incoming key may need to be offered to the outer record's own fields first
/// and, if unclaimed there, to each embedded record in turn, so the value can't be decoded until
/// its destination is known. Both key and value stay borrowed from the original input, so a
/// borrowed field reachable through a flattened record still decodes zero-copy.
pub fn decode_map_entries<'buf>(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<Vec<(&'buf str, &'buf [u8])>> {
    let head = cursor.read_head()?;
    if head.major != 5 {
        return Err(Error::TypeMismatch(major_type_name(head.major), "struct"));
    }
    let mut entries = Vec::new();
    match head.arg {
        HeadArg::Indefinite => loop {
            if cursor.consume_break_if_present()? {
                break;
            }
            entries.push(decode_one_raw_entry(cursor, opts)?);
        },
        _ => {
            let n = head.arg.as_usize()?;
            if n > opts.max_array_len {
                return Err(Error::Overflow("map length"));
            }
            for _ in 0..n {
                entries.push(decode_one_raw_entry(cursor, opts)?);
            }
        }
    }
    Ok(entries)
}

fn decode_one_raw_entry<'buf>(cursor: &mut Cursor<'buf>, opts: &DecodeOptions) -> Result<(&'buf str, &'buf [u8])> {
    let key = <&'buf str>::decode(cursor, opts)?;
    let raw = cursor.capture_span(|c| c.skip_item())?;
    Ok((key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_from_none_tag() {
        let bytes = [0xc6, 0xf6];
        let mut cursor = Cursor::new(&bytes);
        let v: Option<u64> = CborDecode::decode(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn option_some_from_plain_value() {
        let bytes = [0x05];
        let mut cursor = Cursor::new(&bytes);
        let v: Option<u64> = CborDecode::decode(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(v, Some(5));
    }

    #[test]
    fn vec_of_u64_indefinite() {
        let bytes = [0x9f, 0x01, 0x02, 0x03, 0xff];
        let mut cursor = Cursor::new(&bytes);
        let v: Vec<u64> = CborDecode::decode(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn string_keyed_hashmap() {
        let bytes = [0xa1, 0x61, b'a', 0x01];
        let mut cursor = Cursor::new(&bytes);
        let v: HashMap<String, u64> = CborDecode::decode(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(v.get("a"), Some(&1));
    }

    #[test]
    fn map_entries_skips_nothing_and_captures_every_key() {
        // unresolved keys are a `bind_entries` concern now, not `decode_map_entries`'s — it
        // materializes every entry regardless of whether anything will claim it.
        let bytes = [0xa2, 0x61, b'a', 0x01, 0x61, b'z', 0x02];
        let mut cursor = Cursor::new(&bytes);
        let entries = decode_map_entries(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(entries, vec![("a", &[0x01][..]), ("z", &[0x02][..])]);
    }

    #[test]
    fn map_entries_capture_raw_value_spans() {
        // {"a": 1, "b": [2, 3]}
        let bytes = [0xa2, 0x61, b'a', 0x01, 0x61, b'b', 0x82, 0x02, 0x03];
        let mut cursor = Cursor::new(&bytes);
        let entries = decode_map_entries(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(entries, vec![("a", &[0x01][..]), ("b", &[0x82, 0x02, 0x03][..])]);
        assert_eq!(cursor.position(), bytes.len());
    }
}
