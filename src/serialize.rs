//! Key serialization used only to feed the hash function.
//!
//! Strings and custom blobs hash their bytes directly; integers and float
//! aggregates hash their little-endian encoding so the result is stable
//! across platforms.

use crate::value::Value;
use std::borrow::Cow;

pub(crate) fn key_bytes(key: &Value) -> Cow<'_, [u8]> {
    match key {
        Value::Str(s) => Cow::Borrowed(s.as_bytes()),
        Value::Custom(b) => Cow::Borrowed(&b[..]),
        Value::I8(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::I16(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::I32(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::I64(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::U8(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::U16(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::U32(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::U64(v) => Cow::Owned(v.to_le_bytes().to_vec()),
        Value::Vector2(_)
        | Value::Vector3(_)
        | Value::Vector4(_)
        | Value::Matrix2x2(_)
        | Value::Matrix3x3(_)
        | Value::Matrix4x4(_) => {
            let comps = key.float_components().unwrap_or(&[]);
            let mut out = Vec::with_capacity(comps.len() * 4);
            for c in comps {
                out.extend_from_slice(&c.to_le_bytes());
            }
            Cow::Owned(out)
        }
    }
}
