//! End-to-end tests for `StreamDecoder` over byte sources that don't hand over a whole item per
//! `read` call, the situation a WebSocket or TCP socket actually presents.

use std::io::Read;

use surreal_cbor::stream::{Next, StreamDecoder};
use surreal_cbor::Value;

#[test]
fn decodes_back_to_back_items_from_one_source() {
    // 1, "hi", [1, 2]
    let bytes = [0x01, 0x62, b'h', b'i', 0x82, 0x01, 0x02];
    let mut decoder = StreamDecoder::new(&bytes[..]);

    match decoder.decode_next::<Value>().unwrap() {
        Next::Item(v) => assert_eq!(v, Value::Uint(1)),
        Next::EndOfStream => panic!("expected an item"),
    }
    match decoder.decode_next::<String>().unwrap() {
        Next::Item(v) => assert_eq!(v, "hi"),
        Next::EndOfStream => panic!("expected an item"),
    }
    match decoder.decode_next::<Vec<u64>>().unwrap() {
        Next::Item(v) => assert_eq!(v, vec![1, 2]),
        Next::EndOfStream => panic!("expected an item"),
    }
    assert!(matches!(decoder.decode_next::<Value>().unwrap(), Next::EndOfStream));
}

struct Dribble {
    remaining: Vec<u8>,
}

impl Read for Dribble {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining.is_empty() {
            return Ok(0);
        }
        buf[0] = self.remaining.remove(0);
        Ok(1)
    }
}

#[test]
fn reassembles_an_item_split_across_many_short_reads() {
    // a definite-length text string long enough to need a two-byte length prefix
    let mut bytes = vec![0x78, 0x1a]; // text, length 26
    bytes.extend_from_slice(b"abcdefghijklmnopqrstuvwxyz");
    let source = Dribble { remaining: bytes };
    let mut decoder = StreamDecoder::new(source);
    match decoder.decode_next::<String>().unwrap() {
        Next::Item(s) => assert_eq!(s, "abcdefghijklmnopqrstuvwxyz"),
        Next::EndOfStream => panic!("expected an item"),
    }
}

struct ExhaustsMidItem {
    sent_head: bool,
}

impl Read for ExhaustsMidItem {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.sent_head {
            return Ok(0); // end of stream, with the array's two elements never arriving
        }
        buf[0] = 0x82; // array of two
        self.sent_head = true;
        Ok(1)
    }
}

#[test]
fn source_exhausted_mid_item_is_a_hard_truncation_error() {
    let mut decoder = StreamDecoder::new(ExhaustsMidItem { sent_head: false });
    let err = decoder.decode_next::<Value>().unwrap_err();
    assert!(err.is_truncated());
}
