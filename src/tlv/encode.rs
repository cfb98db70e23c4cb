//! Record payload construction for the TLV-output rule kinds.
//!
//! Value layouts, all in host byte order:
//! - binary, arithmetic field: the field's native bytes (1 to 8 of them)
//! - binary, text field: the text bytes plus one NUL terminator
//! - binary, blob field: the raw bytes, no terminator
//! - digital string: the number formatted as decimal text, no terminator
//! - sub-struct: the nested struct's own TLV records, verbatim
//!
//! A key turns any of these into `key\0` followed by the payload above.

use tracing::trace;

use crate::rules::{convert_tlv, KeyName, RuleSet};
use crate::tlv::writer::TlvWriter;
use crate::view::{char_buf_text, FieldRef, StructView};

fn put(writer: &mut TlvWriter, tag: u32, key: Option<&KeyName>, payload: &[&[u8]]) {
    match key {
        Some(key) => {
            let mut segments = Vec::with_capacity(payload.len() + 1);
            segments.push(key.with_nul());
            segments.extend_from_slice(payload);
            writer.append(tag, &segments);
        }
        None => writer.append(tag, payload),
    }
}

/// Append one record carrying the field's raw representation.
///
/// # Panics
///
/// If the field is a nested struct; `validate_tlv` rejects that pairing.
pub(crate) fn binary_record(
    writer: &mut TlvWriter,
    tag: u32,
    key: Option<&KeyName>,
    field: FieldRef<'_>,
) {
    macro_rules! native {
        ($v:expr) => {{
            let bytes = $v.to_ne_bytes();
            put(writer, tag, key, &[&bytes]);
        }};
    }
    match field {
        FieldRef::I8(v) => native!(v),
        FieldRef::I16(v) => native!(v),
        FieldRef::I32(v) => native!(v),
        FieldRef::I64(v) => native!(v),
        FieldRef::U8(v) => native!(v),
        FieldRef::U16(v) => native!(v),
        FieldRef::U32(v) => native!(v),
        FieldRef::U64(v) => native!(v),
        FieldRef::F32(v) => native!(v),
        FieldRef::F64(v) => native!(v),
        FieldRef::Bool(v) => put(writer, tag, key, &[&[*v as u8]]),
        FieldRef::Str(s) => put(writer, tag, key, &[s.as_bytes(), b"\0"]),
        FieldRef::CharBuf(buf) => put(writer, tag, key, &[char_buf_text(buf), b"\0"]),
        FieldRef::Bytes(bytes) => put(writer, tag, key, &[bytes]),
        FieldRef::Struct(_) => {
            panic!("binary record cannot carry a nested struct")
        }
    }
}

/// Append one record carrying the numeric field as decimal text.
///
/// # Panics
///
/// If the field is not numeric; `validate_tlv` rejects that pairing.
pub(crate) fn digital_string_record(
    writer: &mut TlvWriter,
    tag: u32,
    key: Option<&KeyName>,
    field: FieldRef<'_>,
) {
    let text = match field {
        FieldRef::I8(v) => v.to_string(),
        FieldRef::I16(v) => v.to_string(),
        FieldRef::I32(v) => v.to_string(),
        FieldRef::I64(v) => v.to_string(),
        FieldRef::U8(v) => v.to_string(),
        FieldRef::U16(v) => v.to_string(),
        FieldRef::U32(v) => v.to_string(),
        FieldRef::U64(v) => v.to_string(),
        FieldRef::F32(v) => v.to_string(),
        FieldRef::F64(v) => v.to_string(),
        other => panic!("digital string record requires a numeric field, got {}", other.kind()),
    };
    put(writer, tag, key, &[text.as_bytes()]);
}

/// Serialize `nested` through `rules` into a private writer, then append the
/// whole result as one record. An empty sub-document still produces its
/// outer record with length 0 (or just the key when present).
pub(crate) fn sub_struct_record(
    writer: &mut TlvWriter,
    tag: u32,
    key: Option<&KeyName>,
    nested: &dyn StructView,
    rules: &RuleSet,
) {
    let mut inner = TlvWriter::new();
    convert_tlv(nested, &mut inner, rules);
    trace!(
        tag,
        inner_len = inner.len(),
        preview = %hex::encode(&inner.as_bytes()[..inner.len().min(16)]),
        "sub-struct"
    );
    put(writer, tag, key, &[inner.as_bytes()]);
}
