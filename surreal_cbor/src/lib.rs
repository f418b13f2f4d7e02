/***************************************************************************************************
 * surreal_cbor module definition
 *
 * A CBOR (RFC 8949) codec that additionally understands the SurrealDB wire protocol's tagged
 * domain types (tables, record IDs, UUIDs, decimals, datetimes, durations, ranges, geometry) and
 * reflectively binds decoded records onto application-defined struct shapes via
 * `#[derive(CborDecode)]`.
 **************************************************************************************************/
#![warn(missing_docs)]

//! # surreal_cbor
//!
//! `surreal_cbor` decodes (and encodes) CBOR per RFC 8949, with a dispatcher for the ~20 tag
//! numbers SurrealDB's wire protocol assigns to its own types. Unlike a general-purpose CBOR
//! crate, the interesting engineering here is entirely on the decode side: a byte cursor (C1) and
//! major-type dispatcher (C2) feed a tag dispatcher (C5) that turns `Value::Tag(n, payload)` into
//! typed domain values, which a reflective binder (C7) then unifies with an application's own
//! record types, resolved field-by-field through a case-folding field index (C6).
//!
//! ## Example
//!
//! ```
//! use surreal_cbor::{decode, Value};
//!
//! // [1, "two", 3]
//! let bytes = [0x83, 0x01, 0x63, b't', b'w', b'o', 0x03];
//! let v: Value = decode(&bytes).unwrap();
//! assert_eq!(v.type_name(), "array");
//! ```
//!
//! ## Streaming
//!
//! [`StreamDecoder`] wraps any [`std::io::Read`] source, buffering and retrying until a complete
//! item is available, so a caller doesn't need to know an item's length ahead of time:
//!
//! ```no_run
//! use surreal_cbor::stream::{Next, StreamDecoder};
//! use std::net::TcpStream;
//!
//! fn read_one(sock: TcpStream) -> surreal_cbor::error::Result<()> {
//!     let mut decoder = StreamDecoder::new(sock);
//!     if let Next::Item(v) = decoder.decode_next::<u64>()? {
//!         println!("got {v}");
//!     }
//!     Ok(())
//! }
//! ```

pub(crate) mod bind;
pub(crate) mod constants;
pub(crate) mod cursor;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod field;
pub(crate) mod hook;
pub(crate) mod raw;
pub(crate) mod tag;

/// Decode configuration: map shape, resource limits, streaming read block size.
pub mod config;
/// SurrealDB tagged domain types (`Table`, `RecordId`, `Uuid`, `Decimal`, `Datetime`, `Duration`,
/// `Future`, `Range`/`Bound`, the geometry family).
pub mod domain;
/// The error taxonomy shared by decode and encode paths.
pub mod error;
/// The pull-based `StreamDecoder` wrapper over a `Read` byte source.
pub mod stream;
/// The dynamic, polymorphic CBOR AST (`Value`) and its conversions.
pub mod value;

pub use bind::{decode_map_entries, CborDecode};
pub use config::{DecodeOptions, MapShape};
pub use cursor::Cursor;
pub use decode::{decode, decode_with_options};
pub use encode::{Encode, Encoder};
pub use error::{Error, Result};
pub use field::{index_for as field_index_for, CborFields, FieldDeclaration, FieldDescriptor, FieldIndex};
pub use hook::{decode_via_hook, DecodeHook, HookTarget};
pub use raw::RawValue;
pub use stream::StreamDecoder;
pub use value::Value;

#[cfg(feature = "derive")]
pub use surreal_cbor_derive::CborDecode;
