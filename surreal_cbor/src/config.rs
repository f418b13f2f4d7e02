/***************************************************************************************************
 * Decode configuration
 *
 * Grounded on `utils.rs`'s `Allowable`/`Filter` bitflag idiom, generalized to a plain options
 * struct — this crate's configuration surface (map shape, length caps, read block size) doesn't
 * need a bitflag representation.
 **************************************************************************************************/
use crate::constants::{DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_STRING_LEN, DEFAULT_READ_BLOCK_SIZE};

/// The keyed-container shape a polymorphic map target decodes into (§4.4). Nested maps inherit
/// the outermost choice rather than resetting per level — kept as the source behaves (§9 Open
/// Question).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapShape {
    /// Keys decoded as text strings (`Value::Text`). The default.
    #[default]
    StringKeyed,
    /// Keys decoded polymorphically, permitting non-text keys.
    AnyKeyed,
}

/// Resource limits and behavioral switches for a single decode call or a `StreamDecoder`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    /// Rejects an array head declaring more elements than this (default 1,000,000).
    pub max_array_len: usize,
    /// Rejects a string head declaring more bytes than this (default 10,000,000).
    pub max_string_len: usize,
    /// Default shape for a polymorphic map target (default `StringKeyed`).
    pub map_shape: MapShape,
    /// Bytes requested per read from a `StreamDecoder`'s byte source (default 8192).
    pub read_block_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            map_shape: MapShape::StringKeyed,
            read_block_size: DEFAULT_READ_BLOCK_SIZE,
        }
    }
}
