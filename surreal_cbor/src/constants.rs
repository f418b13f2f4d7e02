/***************************************************************************************************
 * CBOR wire-format constants
 *
 * Major-type tags (shifted into the top three bits of the initial byte) and the additional-
 * information payload markers used throughout the cursor and dispatcher.
 **************************************************************************************************/

pub(crate) const AI_MASK: u8 = 0x1f;

pub(crate) const MT_UINT: u8 = 0x00;
pub(crate) const MT_NINT: u8 = 0x20;
pub(crate) const MT_BSTR: u8 = 0x40;
pub(crate) const MT_TSTR: u8 = 0x60;
pub(crate) const MT_ARRAY: u8 = 0x80;
pub(crate) const MT_MAP: u8 = 0xa0;
pub(crate) const MT_TAG: u8 = 0xc0;
pub(crate) const MT_SIMPLE: u8 = 0xe0;
pub(crate) const MT_FLOAT: u8 = 0xe0;

/// Additional-information value that means "argument follows directly in the low 5 bits".
pub(crate) const PAYLOAD_AI_BITS: u8 = 23;
pub(crate) const PAYLOAD_ONE_BYTE: u8 = 24;
pub(crate) const PAYLOAD_TWO_BYTES: u8 = 25;
pub(crate) const PAYLOAD_FOUR_BYTES: u8 = 26;
pub(crate) const PAYLOAD_EIGHT_BYTES: u8 = 27;
/// Additional-information sentinel for indefinite-length items (majors 2, 3, 4, 5, 7 only).
pub(crate) const PAYLOAD_INDEFINITE: u8 = 31;

/// The byte that terminates an indefinite-length container or string.
pub(crate) const BREAK: u8 = 0xff;

pub(crate) const SIMPLE_FALSE: u8 = 20;
pub(crate) const SIMPLE_TRUE: u8 = 21;
pub(crate) const SIMPLE_NULL: u8 = 22;
pub(crate) const SIMPLE_UNDEFINED: u8 = 23;

/// SurrealDB wire-protocol tag numbers (see the tag dispatcher in `tag.rs`).
pub(crate) mod tag {
    pub(crate) const DATETIME_TEXT: u64 = 0;
    pub(crate) const NONE: u64 = 6;
    pub(crate) const TABLE: u64 = 7;
    pub(crate) const RECORD_ID: u64 = 8;
    pub(crate) const UUID_STRING: u64 = 9;
    pub(crate) const DECIMAL_STRING: u64 = 10;
    pub(crate) const DATETIME_BINARY: u64 = 12;
    pub(crate) const DURATION_STRING: u64 = 13;
    pub(crate) const DURATION_BINARY: u64 = 14;
    pub(crate) const FUTURE: u64 = 15;
    pub(crate) const UUID_BINARY: u64 = 37;
    pub(crate) const RANGE: u64 = 49;
    pub(crate) const BOUND_INCLUDED: u64 = 50;
    pub(crate) const BOUND_EXCLUDED: u64 = 51;
    pub(crate) const GEOMETRY_POINT: u64 = 88;
    pub(crate) const GEOMETRY_LINE: u64 = 89;
    pub(crate) const GEOMETRY_POLYGON: u64 = 90;
    pub(crate) const GEOMETRY_MULTIPOINT: u64 = 91;
    pub(crate) const GEOMETRY_MULTILINE: u64 = 92;
    pub(crate) const GEOMETRY_MULTIPOLYGON: u64 = 93;
    pub(crate) const GEOMETRY_COLLECTION: u64 = 94;
}

pub(crate) const DEFAULT_MAX_ARRAY_LEN: usize = 1_000_000;
pub(crate) const DEFAULT_MAX_STRING_LEN: usize = 10_000_000;
pub(crate) const DEFAULT_READ_BLOCK_SIZE: usize = 8192;
