/***************************************************************************************************
 * Custom Hook
 *
 * Lets a target type take over decoding of one CBOR item by receiving its raw wire bytes, instead
 * of going through the ordinary dispatch-by-declared-shape path. Used for types whose on-wire
 * representation doesn't map onto a plain struct/sequence/map (custom enums, wrapper types with
 * bespoke encodings).
 *
 * `HookTarget` is a separate marker from `DecodeHook` rather than a blanket `impl<T: DecodeHook>
 * CborDecode<'_> for T` because Rust's coherence rules would then forbid any other `CborDecode`
 * impl (including the ones generated by `#[derive(CborDecode)]`) from ever applying to a type
 * that also implements `DecodeHook` — the derive macro instead emits the wiring shown in
 * `decode_via_hook` directly into each hook-backed type's generated impl.
 **************************************************************************************************/
use crate::cursor::Cursor;
use crate::error::Result;

/// A type that interprets its own raw CBOR bytes rather than being reflectively bound.
pub trait DecodeHook: Sized {
    fn from_raw_cbor(bytes: &[u8]) -> Result<Self>;
}

/// Opts a type that also implements [`DecodeHook`] into the hook path at its `CborDecode`
/// definition site (see the module documentation for why this isn't a blanket impl).
pub trait HookTarget: DecodeHook {}

/// Skip the current item, copy its wire bytes, and hand them to `T::from_raw_cbor`.
///
/// Called from a hook-backed type's `CborDecode::decode` impl (hand-written, or emitted by the
/// derive macro for a type annotated to use a hook). Not consulted after a NONE short-circuit has
/// already fired, and never for a `RawValue` target (§4.10's restrictions) — both of those are
/// enforced by the caller choosing not to reach this function, not by anything here.
pub fn decode_via_hook<'buf, T: HookTarget>(cursor: &mut Cursor<'buf>) -> Result<T> {
    let span = cursor.capture_span(|c| c.skip_item())?;
    T::from_raw_cbor(span)
}
