//! End-to-end decode tests for the SurrealDB wire-protocol tags, each built as raw wire bytes and
//! decoded through the public `decode` entry point into `Value`.

use surreal_cbor::decode;
use surreal_cbor::domain::{Duration, RecordId, Table, Uuid};
use surreal_cbor::value::Value;

#[test]
fn tag_none_decodes_regardless_of_payload() {
    // tag(6)(null)
    let bytes = [0xc6, 0xf6];
    let v: Value = decode(&bytes).unwrap();
    assert!(v.is_none());
}

#[test]
fn tag_table_name() {
    // tag(7)("person")
    let mut bytes = vec![0xc7, 0x66];
    bytes.extend_from_slice(b"person");
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Table(Table("person".into())));
}

#[test]
fn tag_record_id_with_text_id() {
    // tag(8)(["person", "tobie"])
    let mut bytes = vec![0xc8, 0x82, 0x66];
    bytes.extend_from_slice(b"person");
    bytes.push(0x65);
    bytes.extend_from_slice(b"tobie");
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::RecordId(RecordId { table: "person".into(), id: "tobie".into() }));
}

#[test]
fn tag_record_id_with_numeric_id() {
    // tag(8)(["person", 42])
    let mut bytes = vec![0xc8, 0x82, 0x66];
    bytes.extend_from_slice(b"person");
    bytes.push(0x18);
    bytes.push(42);
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::RecordId(RecordId { table: "person".into(), id: "42".into() }));
}

#[test]
fn tag_uuid_binary_form() {
    // tag(37)(h'00112233445566778899aabbccddeeff')
    let mut bytes = vec![0xd8, 0x25, 0x50];
    bytes.extend_from_slice(&[
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ]);
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(
        v,
        Value::Uuid(Uuid([0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]))
    );
}

#[test]
fn tag_uuid_text_form_parses_hyphenated_string() {
    // tag(9)("00112233-4455-6677-8899-aabbccddeeff")
    let mut bytes = vec![0xc9, 0x78, 0x24];
    bytes.extend_from_slice(b"00112233-4455-6677-8899-aabbccddeeff");
    let v: Value = decode(&bytes).unwrap();
    match v {
        Value::Uuid(u) => assert_eq!(u.to_hyphenated_string(), "00112233-4455-6677-8899-aabbccddeeff"),
        other => panic!("expected uuid, got {other:?}"),
    }
}

#[test]
fn tag_decimal_string() {
    // tag(10)("12.3456789")
    let mut bytes = vec![0xca, 0x6a];
    bytes.extend_from_slice(b"12.3456789");
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v.type_name(), "decimal");
}

#[test]
fn tag_datetime_text() {
    // tag(0)("2023-09-04T10:18:00Z")
    let mut bytes = vec![0xc0, 0x74];
    bytes.extend_from_slice(b"2023-09-04T10:18:00Z");
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v.type_name(), "datetime");
}

#[test]
fn tag_datetime_binary() {
    // tag(12)([1693822680, 0])
    let bytes = [0xcc, 0x82, 0x1a, 0x64, 0xf0, 0xeb, 0x18, 0x00];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v.type_name(), "datetime");
}

#[test]
fn tag_duration_string() {
    // tag(13)("1h30m")
    let mut bytes = vec![0xcd, 0x65];
    bytes.extend_from_slice(b"1h30m");
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Duration(Duration { secs: 5400, nanos: 0 }));
}

#[test]
fn tag_duration_binary_empty_array_is_zero() {
    // tag(14)([])
    let bytes = [0xce, 0x80];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Duration(Duration::ZERO));
}

#[test]
fn tag_future_discards_payload() {
    // tag(15)(null)
    let bytes = [0xcf, 0xf6];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v.type_name(), "future");
}

#[test]
fn tag_range_with_included_and_unbounded_side() {
    // tag(49)([tag(50)(1), null])
    let bytes = [0xd8, 0x31, 0x82, 0xd8, 0x32, 0x01, 0xf6];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v.type_name(), "range");
}

#[test]
fn tag_geometry_point() {
    // tag(88)([-0.118092, 51.509865])
    let bytes = [
        0xd8, 0x58, 0x82, 0xfb, 0xbf, 0xbe, 0x40, 0xc3, 0x89, 0x0f, 0xc5, 0x31, 0xfb, 0x40, 0x49, 0xc6, 0x3c, 0xb4,
        0xd8, 0xd9, 0x15,
    ];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v.type_name(), "geometry");
}

#[test]
fn unknown_tag_number_round_trips_as_lossy_tag() {
    // tag(1234)(1)
    let bytes = [0xd9, 0x04, 0xd2, 0x01];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Tag(1234, Box::new(Value::Uint(1))));
}

// Scenario 5 of the duration edge cases: a one-element binary duration array defaults its
// missing nanosecond component to zero, same as the zero-element form.
#[test]
fn tag_duration_binary_one_element_array_defaults_nanos_to_zero() {
    let bytes = [0xce, 0x81, 0x05];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Duration(Duration { secs: 5, nanos: 0 }));
}

#[test]
fn tag_duration_binary_two_element_array_sets_both_components() {
    let bytes = [0xce, 0x82, 0x05, 0x09];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Duration(Duration { secs: 5, nanos: 9 }));
}

// The literal end-to-end scenarios enumerated verbatim.

#[test]
fn scenario_1_none_tag_wrapping_null() {
    let bytes = [0xc6, 0xf6];
    let v: Value = decode(&bytes).unwrap();
    assert!(v.is_none());
}

#[test]
fn scenario_2_table_name() {
    let mut bytes = vec![0xc7, 0x65];
    bytes.extend_from_slice(b"table");
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Table(Table("table".into())));
}

#[test]
fn scenario_3_record_id_with_text_id() {
    let mut bytes = vec![0xc8, 0x82, 0x63];
    bytes.extend_from_slice(b"use");
    bytes.push(0x63);
    bytes.extend_from_slice(b"abc");
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::RecordId(RecordId { table: "use".into(), id: "abc".into() }));
}

#[test]
fn scenario_4_datetime_binary_two_seconds_before_epoch() {
    // tag 12, [-2, 0]
    let bytes = [0xcc, 0x82, 0x3a, 0x00, 0x00, 0x00, 0x01, 0x00];
    let v: Value = decode(&bytes).unwrap();
    match v {
        Value::Datetime(dt) => assert_eq!(dt.0.timestamp(), -2),
        other => panic!("expected datetime, got {other:?}"),
    }
}

#[test]
fn scenario_5_duration_binary_zero() {
    // tag 14, [0, 0]
    let bytes = [0xce, 0x82, 0x00, 0x00];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Duration(Duration::ZERO));
}

#[test]
fn scenario_6_uuid_binary_nil() {
    let mut bytes = vec![0xd8, 0x25, 0x50];
    bytes.extend_from_slice(&[0x00; 16]);
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Uuid(Uuid([0x00; 16])));
}

#[test]
fn scenario_7_indefinite_array_of_small_uints() {
    let bytes = [0x9f, 0x01, 0x02, 0x03, 0xff];
    let v: Value = decode(&bytes).unwrap();
    assert_eq!(v, Value::Array(vec![Value::Uint(1), Value::Uint(2), Value::Uint(3)]));
}
