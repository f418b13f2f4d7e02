//! End-to-end decode tests against the public `decode`/`decode_with_options` entry points,
//! covering the RFC 8949 major types independent of any SurrealDB tag.

use std::collections::{BTreeMap, HashMap};

use surreal_cbor::value::ByteString;
use surreal_cbor::{decode, decode_with_options, DecodeOptions, Error, Value};

#[test]
fn small_uint() {
    let v: u64 = decode(&[0x0a]).unwrap();
    assert_eq!(v, 10);
}

#[test]
fn uint_requiring_two_byte_argument() {
    // 0x19 0x01 0x00 = 256
    let v: u64 = decode(&[0x19, 0x01, 0x00]).unwrap();
    assert_eq!(v, 256);
}

#[test]
fn negative_integer() {
    // 0x38 0x63 = -100
    let v: i64 = decode(&[0x38, 0x63]).unwrap();
    assert_eq!(v, -100);
}

#[test]
fn negative_integer_into_unsigned_target_is_type_mismatch() {
    let err = decode::<u64>(&[0x20]).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)));
}

#[test]
fn float_single_precision() {
    // 3.4028235e38f
    let v: f32 = decode(&[0xfa, 0x7f, 0x7f, 0xff, 0xff]).unwrap();
    assert!((v - f32::MAX).abs() < 1.0);
}

#[test]
fn float_double_precision() {
    let v: f64 = decode(&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]).unwrap();
    assert!((v - 1.1).abs() < 1e-9);
}

#[test]
fn definite_text_string() {
    let bytes = [0x64, b'I', b'E', b'T', b'F'];
    let s: String = decode(&bytes).unwrap();
    assert_eq!(s, "IETF");
}

#[test]
fn definite_byte_string() {
    let bytes = [0x44, 0x01, 0x02, 0x03, 0x04];
    let b: ByteString = decode(&bytes).unwrap();
    assert_eq!(b.0, vec![1, 2, 3, 4]);
}

#[test]
fn bare_vec_u8_decodes_as_an_array_of_small_uints_not_a_byte_string() {
    // a plain `Vec<u8>` target binds through the generic array path, same as `Vec<u64>`; a CBOR
    // byte string target is `ByteString`, `&[u8]`, or `Value`.
    let bytes = [0x83, 0x01, 0x02, 0x03];
    let v: Vec<u8> = decode(&bytes).unwrap();
    assert_eq!(v, vec![1, 2, 3]);
}

#[test]
fn nested_definite_array() {
    // [1, [2, 3], [4, 5]]
    let bytes = [0x83, 0x01, 0x82, 0x02, 0x03, 0x82, 0x04, 0x05];
    let v: Value = decode(&bytes).unwrap();
    match v {
        Value::Array(items) => assert_eq!(items.len(), 3),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn definite_map_into_hashmap() {
    // {"a": 1, "b": 2}
    let bytes = [0xa2, 0x61, b'a', 0x01, 0x61, b'b', 0x02];
    let m: HashMap<String, u64> = decode(&bytes).unwrap();
    assert_eq!(m.get("a"), Some(&1));
    assert_eq!(m.get("b"), Some(&2));
}

#[test]
fn definite_map_into_btreemap_preserves_ordering_on_iteration() {
    let bytes = [0xa2, 0x61, b'a', 0x01, 0x61, b'b', 0x02];
    let m: BTreeMap<String, u64> = decode(&bytes).unwrap();
    let keys: Vec<_> = m.keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn indefinite_array_of_chunked_text() {
    // (_ "strea", "ming")
    let bytes = [0x7f, 0x65, b's', b't', b'r', b'e', b'a', 0x64, b'm', b'i', b'n', b'g', 0xff];
    let s: String = decode(&bytes).unwrap();
    assert_eq!(s, "streaming");
}

#[test]
fn array_length_cap_is_enforced_via_options() {
    let mut opts = DecodeOptions::default();
    opts.max_array_len = 1;
    let bytes = [0x82, 0x01, 0x02];
    let err = decode_with_options::<Value>(&bytes, &opts).unwrap_err();
    assert!(matches!(err, Error::Overflow(_)));
}

#[test]
fn truncated_input_is_distinguishable_from_other_errors() {
    // a one-byte array head declaring one element, with no element bytes following
    let bytes = [0x81];
    let err = decode::<Value>(&bytes).unwrap_err();
    assert!(err.is_truncated());
}

#[test]
fn bare_break_byte_is_a_reserved_simple_value() {
    // 0xff outside any indefinite-length container is major 7 with AI 31, which is not one of
    // the defined simple-value or float widths.
    let err = decode::<Value>(&[0xff]).unwrap_err();
    assert!(matches!(err, Error::MalformedHead(_)));
}
