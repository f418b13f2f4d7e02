/***************************************************************************************************
 * CBOR error taxonomy
 **************************************************************************************************/
use std::result;
use thiserror::Error;

/// An alias for `Result<T, Error>` used throughout this crate.
pub type Result<T> = result::Result<T, Error>;

/// `Error` enumerates every way a decode (or, more rarely, an encode) can fail.
///
/// An unresolved struct field is deliberately *not* a variant here: per the field resolver's
/// contract, a map key with no matching field is discarded, not an error.
#[derive(Error, Debug)]
pub enum Error {
    /// The buffer ended before the current item completed. In the streaming wrapper this is
    /// retried; in the buffer-oriented path this is fatal.
    #[error("truncated input: need more bytes to complete the current item")]
    Truncated,

    /// Invalid additional-information value for the given major type, or a break marker
    /// encountered outside an indefinite-length container.
    #[error("malformed head: {0}")]
    MalformedHead(&'static str),

    /// A decoded value cannot be bound into the declared target (float into integer, array into
    /// non-sequence, negative integer into an unsigned target, and so on).
    #[error("type mismatch binding {0} into {1}")]
    TypeMismatch(&'static str, &'static str),

    /// A decoded integer does not fit the declared target's width, or a decoded length exceeds
    /// its configured cap.
    #[error("overflow: {0}")]
    Overflow(&'static str),

    /// A malformed tag payload: wrong tag-37 byte-string length, wrong tag-12 array arity, a
    /// non-numeric element where an integer is required, and so on.
    #[error("protocol violation in tag {0}: {1}")]
    ProtocolViolation(u64, &'static str),

    /// A `#[derive(CborDecode)]` target's required (non-`Option`) field never appeared in the
    /// decoded map.
    #[error("missing required field {0}")]
    MissingField(&'static str),

    /// Propagated unchanged from the byte source feeding a `StreamDecoder`.
    #[error("byte source error: {0}")]
    Source(#[from] std::io::Error),
}

impl Error {
    /// `true` for the one error kind the streaming wrapper retries rather than surfaces.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated)
    }
}
