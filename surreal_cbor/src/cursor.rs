/***************************************************************************************************
 * Byte Cursor
 *
 * Positional read over an in-memory byte slice: bounds-checked reads of the initial byte, the
 * head argument, raw byte spans, and a "skip one complete item" operation used by both the raw
 * passthrough and unresolved map keys.
 **************************************************************************************************/
use crate::constants::*;
use crate::error::{Error, Result};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// The parsed argument that follows a CBOR initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadArg {
    /// The argument was encoded directly in the additional-information bits (0-23).
    Small(u8),
    /// The argument followed as a 1/2/4/8-byte big-endian unsigned integer.
    Sized(u64),
    /// Additional-information 31: an indefinite-length string, array, map, or the break marker
    /// itself when read from inside such a container.
    Indefinite,
}

impl HeadArg {
    /// Widen to `u64`, for callers that don't care whether the argument was small or sized.
    pub fn as_u64(self) -> u64 {
        match self {
            HeadArg::Small(v) => v as u64,
            HeadArg::Sized(v) => v,
            HeadArg::Indefinite => u64::MAX,
        }
    }

    pub fn as_usize(self) -> Result<usize> {
        match self {
            HeadArg::Small(v) => Ok(v as usize),
            HeadArg::Sized(v) => usize::try_from(v).map_err(|_| Error::Overflow("length exceeds usize")),
            HeadArg::Indefinite => Err(Error::MalformedHead("indefinite length where a length was required")),
        }
    }
}

/// A decomposed CBOR initial byte plus its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    pub major: u8,
    pub info: u8,
    pub arg: HeadArg,
}

/// A bounds-checked, forward-only read position over a borrowed byte slice.
///
/// The cursor never copies; every read either returns a borrowed sub-slice of `bytes` or a small
/// value decoded in place. `Error::Truncated` signals "need more bytes", the sentinel the
/// streaming wrapper (`stream.rs`) retries on; every other error is a hard decode failure.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'buf> {
    bytes: &'buf [u8],
    pos: usize,
}

impl<'buf> Cursor<'buf> {
    pub fn new(bytes: &'buf [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// `false` both when `len` would run past the end of the buffer and when `self.pos + len`
    /// would overflow `usize` (an adversarial definite-length head can claim up to `u64::MAX`
    /// bytes) — either way there clearly aren't `len` bytes left to read.
    #[inline]
    fn within(&self, len: usize) -> bool {
        self.pos.checked_add(len).map_or(false, |end| end <= self.bytes.len())
    }

    /// Look at the next byte without consuming it. Does not distinguish major type from
    /// argument; callers mask as needed.
    #[cfg_attr(feature = "trace", trace)]
    pub fn peek_initial_byte(&self) -> Result<u8> {
        if self.within(1) {
            Ok(self.bytes[self.pos])
        } else {
            Err(Error::Truncated)
        }
    }

    /// Read and consume a CBOR head: the initial byte plus any following argument bytes.
    ///
    /// Additional-information values 28, 29, 30 are always malformed. 31 (indefinite) is valid
    /// only for major types 2, 3, 4, 5, 7 and yields `HeadArg::Indefinite`; for every other major
    /// type it is malformed.
    #[cfg_attr(feature = "trace", trace)]
    pub fn read_head(&mut self) -> Result<Head> {
        if !self.within(1) {
            return Err(Error::Truncated);
        }
        let byte = self.bytes[self.pos];
        let major = byte >> 5;
        let info = byte & AI_MASK;
        self.pos += 1;

        let arg = match info {
            0..=PAYLOAD_AI_BITS => HeadArg::Small(info),
            PAYLOAD_ONE_BYTE => HeadArg::Sized(self.read_be::<1>()? as u64),
            PAYLOAD_TWO_BYTES => HeadArg::Sized(self.read_be::<2>()? as u64),
            PAYLOAD_FOUR_BYTES => HeadArg::Sized(self.read_be::<4>()? as u64),
            PAYLOAD_EIGHT_BYTES => HeadArg::Sized(self.read_be::<8>()?),
            PAYLOAD_INDEFINITE => {
                if matches!(major, 2 | 3 | 4 | 5 | 7) {
                    HeadArg::Indefinite
                } else {
                    return Err(Error::MalformedHead("indefinite length not allowed for this major type"));
                }
            }
            _ => return Err(Error::MalformedHead("reserved additional-information value")),
        };
        Ok(Head { major, info, arg })
    }

    #[inline]
    fn read_be<const N: usize>(&mut self) -> Result<u64> {
        if !self.within(N) {
            return Err(Error::Truncated);
        }
        let mut buf = [0u8; 8];
        buf[8 - N..].copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(u64::from_be_bytes(buf))
    }

    /// Read and consume `n` raw bytes, returning a borrowed slice.
    #[cfg_attr(feature = "trace", trace)]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'buf [u8]> {
        if !self.within(n) {
            return Err(Error::Truncated);
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// If the next byte is the break marker, consume it and return `true`; otherwise leave the
    /// cursor untouched. Used by every indefinite-length container/string decoder.
    #[cfg_attr(feature = "trace", trace)]
    pub(crate) fn consume_break_if_present(&mut self) -> Result<bool> {
        if self.peek_initial_byte()? == BREAK {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Run `f`, then return the exact byte span it consumed. Used by the raw passthrough to copy
    /// one complete item's wire bytes without re-deriving its length a second time.
    #[cfg_attr(feature = "trace", trace)]
    pub(crate) fn capture_span(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<&'buf [u8]> {
        let start = self.pos;
        f(self)?;
        Ok(&self.bytes[start..self.pos])
    }

    /// Advance past one complete CBOR item (of any major type, including indefinite-length
    /// containers and nested tags) without binding it. Used by the raw passthrough (`raw.rs`)
    /// and for map keys that don't resolve to a struct field.
    #[cfg_attr(feature = "trace", trace)]
    pub fn skip_item(&mut self) -> Result<()> {
        let head = self.read_head()?;
        match head.major {
            0 | 1 => Ok(()), // uint / nint: argument already consumed by read_head
            2 | 3 => self.skip_string(head.arg, head.major),
            4 => self.skip_sequence(head.arg, |c| c.skip_item()),
            5 => self.skip_sequence(head.arg, |c| {
                c.skip_item()?;
                c.skip_item()
            }),
            6 => {
                // Tag: the tag number is the argument already consumed; one more item follows.
                self.skip_item()
            }
            7 => self.skip_simple(head),
            _ => unreachable!("major type is a 3-bit field"),
        }
    }

    fn skip_simple(&mut self, _head: Head) -> Result<()> {
        // `read_head` already consumed any argument bytes: for a one-byte simple value (info 24)
        // that's the simple-value byte itself; for float16/32/64 (info 25/26/27) the argument
        // byte count happens to equal the float's payload width, so nothing more to skip.
        Ok(())
    }

    fn skip_string(&mut self, arg: HeadArg, major: u8) -> Result<()> {
        match arg {
            HeadArg::Small(_) | HeadArg::Sized(_) => {
                let len = arg.as_usize()?;
                self.read_bytes(len).map(|_| ())
            }
            HeadArg::Indefinite => loop {
                if self.peek_initial_byte()? == BREAK {
                    self.pos += 1;
                    return Ok(());
                }
                let chunk_head = self.read_head()?;
                if chunk_head.major != major {
                    return Err(Error::MalformedHead("chunk major type mismatch in indefinite string"));
                }
                if matches!(chunk_head.arg, HeadArg::Indefinite) {
                    return Err(Error::MalformedHead("nested indefinite chunk in indefinite string"));
                }
                let len = chunk_head.arg.as_usize()?;
                self.read_bytes(len)?;
            },
        }
    }

    fn skip_sequence(&mut self, arg: HeadArg, mut skip_one: impl FnMut(&mut Self) -> Result<()>) -> Result<()> {
        match arg {
            HeadArg::Small(_) | HeadArg::Sized(_) => {
                let n = arg.as_usize()?;
                for _ in 0..n {
                    skip_one(self)?;
                }
                Ok(())
            }
            HeadArg::Indefinite => loop {
                if self.peek_initial_byte()? == BREAK {
                    self.pos += 1;
                    return Ok(());
                }
                skip_one(self)?;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_uint_head() {
        let mut c = Cursor::new(&[0x05]);
        let head = c.read_head().unwrap();
        assert_eq!(head.major, 0);
        assert_eq!(head.arg.as_u64(), 5);
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn sized_uint_head() {
        let mut c = Cursor::new(&[0x19, 0x01, 0x00]);
        let head = c.read_head().unwrap();
        assert_eq!(head.arg.as_u64(), 256);
        assert_eq!(c.position(), 3);
    }

    #[test]
    fn truncated_head_is_truncated_not_malformed() {
        let mut c = Cursor::new(&[0x19, 0x01]);
        assert!(matches!(c.read_head(), Err(Error::Truncated)));
    }

    #[test]
    fn indefinite_only_for_allowed_majors() {
        // Major 0 (uint) with AI 31 is malformed, not indefinite.
        let mut c = Cursor::new(&[0x1f]);
        assert!(matches!(c.read_head(), Err(Error::MalformedHead(_))));

        let mut c = Cursor::new(&[0x9f]); // array
        assert_eq!(c.read_head().unwrap().arg, HeadArg::Indefinite);
    }

    #[test]
    fn skip_item_advances_past_nested_array() {
        // [1, [2, 3]]
        let bytes = [0x82, 0x01, 0x82, 0x02, 0x03];
        let mut c = Cursor::new(&bytes);
        c.skip_item().unwrap();
        assert_eq!(c.position(), bytes.len());
    }

    #[test]
    fn skip_item_indefinite_array_respects_break() {
        let bytes = [0x9f, 0x01, 0x02, 0x03, 0xff, 0xaa];
        let mut c = Cursor::new(&bytes);
        c.skip_item().unwrap();
        assert_eq!(c.position(), 5);
    }

    #[test]
    fn huge_declared_length_is_truncated_not_a_panic() {
        // byte string (major 2), 8-byte length follows, declaring u64::MAX bytes
        let head_bytes = [0x5b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let mut c = Cursor::new(&head_bytes);
        assert!(matches!(c.skip_item(), Err(Error::Truncated)));

        let mut c = Cursor::new(&[0x00]);
        assert!(matches!(c.read_bytes(usize::MAX), Err(Error::Truncated)));
    }
}
