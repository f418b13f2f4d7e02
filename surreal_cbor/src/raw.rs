/***************************************************************************************************
 * Raw Passthrough
 *
 * A decode target that wants the exact wire bytes of one item rather than an interpreted value —
 * used by callers that forward opaque SurrealDB payloads without needing to understand them.
 *
 * Grounded on `skip_item`'s generality (it already knows every major type's length structure,
 * including indefinite-length containers and nested tags) and the source crate's convention of
 * exposing a buffer-backed view (`TagBuf`/`ArrayBuf`/`MapBuf`) rather than re-parsing; this one
 * copies instead of borrowing, per the spec's independent-of-input-buffer-lifetime requirement.
 **************************************************************************************************/
use crate::bind::CborDecode;
use crate::config::DecodeOptions;
use crate::cursor::Cursor;
use crate::error::Result;

/// The exact wire bytes of one complete CBOR item, copied out of the input buffer.
///
/// The copy is deliberate: the source buffer backing a decode call is not guaranteed to outlive
/// it, so a borrowed span would tie `RawValue` to a lifetime the caller may not want to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(Vec<u8>);

impl RawValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl<'buf> CborDecode<'buf> for RawValue {
    /// Skips the current item rather than interpreting it, then copies the bytes it spanned.
    /// This bypasses ordinary dispatch entirely — no NONE short-circuit, no hook consultation
    /// (§4.10's restriction): a `RawValue` target always wins, unconditionally, over every other
    /// decode path.
    fn decode(cursor: &mut Cursor<'buf>, _opts: &DecodeOptions) -> Result<Self> {
        let span = cursor.capture_span(|c| c.skip_item())?;
        Ok(RawValue(span.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_exact_span_of_nested_item() {
        let bytes = [0x82, 0x01, 0x82, 0x02, 0x03, 0xaa]; // [1, [2, 3]] plus a trailing byte
        let mut cursor = Cursor::new(&bytes);
        let raw: RawValue = CborDecode::decode(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(raw.as_bytes(), &bytes[..5]);
        assert_eq!(cursor.position(), 5);
    }
}
