//! Value payloads and their type tags.

use core::fmt;

/// Which half of an entry a payload belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    Key,
    Value,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Key => f.write_str("key"),
            Role::Value => f.write_str("value"),
        }
    }
}

/// Closed set of payload types a dictionary can be configured with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeTag {
    Str,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Vector2,
    Vector3,
    Vector4,
    Matrix2x2,
    Matrix3x3,
    Matrix4x4,
    /// Fixed-size byte blob whose size, copy and cleanup are caller supplied.
    Custom,
}

impl TypeTag {
    /// Byte size of a payload of this type. `None` for variable-length
    /// strings and for `Custom`, whose size comes from its `CustomType`.
    pub fn fixed_size(self) -> Option<usize> {
        use core::mem::size_of;
        match self {
            TypeTag::Str | TypeTag::Custom => None,
            TypeTag::I8 | TypeTag::U8 => Some(1),
            TypeTag::I16 | TypeTag::U16 => Some(2),
            TypeTag::I32 | TypeTag::U32 => Some(4),
            TypeTag::I64 | TypeTag::U64 => Some(8),
            TypeTag::Vector2 => Some(size_of::<Vector2>()),
            TypeTag::Vector3 => Some(size_of::<Vector3>()),
            TypeTag::Vector4 => Some(size_of::<Vector4>()),
            TypeTag::Matrix2x2 => Some(size_of::<Matrix2x2>()),
            TypeTag::Matrix3x3 => Some(size_of::<Matrix3x3>()),
            TypeTag::Matrix4x4 => Some(size_of::<Matrix4x4>()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

macro_rules! float_array_type {
    ($(#[$meta:meta])* $name:ident, $n:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, PartialEq)]
        #[repr(transparent)]
        pub struct $name(pub [f32; $n]);

        impl $name {
            #[inline]
            pub fn components(&self) -> &[f32] {
                &self.0
            }
        }

        impl From<[f32; $n]> for $name {
            fn from(arr: [f32; $n]) -> Self {
                $name(arr)
            }
        }
    };
}

float_array_type!(Vector2, 2);
float_array_type!(Vector3, 3);
float_array_type!(Vector4, 4);
float_array_type!(
    /// Row-major 2x2 matrix.
    Matrix2x2,
    4
);
float_array_type!(
    /// Row-major 3x3 matrix.
    Matrix3x3,
    9
);
float_array_type!(
    /// Row-major 4x4 matrix.
    Matrix4x4,
    16
);

/// A key or value payload.
///
/// Float-backed variants compare with IEEE semantics through `PartialEq`;
/// the dictionary itself compares keys bitwise so that equality agrees with
/// the bytes that get hashed.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Matrix2x2(Matrix2x2),
    Matrix3x3(Matrix3x3),
    Matrix4x4(Matrix4x4),
    Custom(Box<[u8]>),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Str(_) => TypeTag::Str,
            Value::I8(_) => TypeTag::I8,
            Value::I16(_) => TypeTag::I16,
            Value::I32(_) => TypeTag::I32,
            Value::I64(_) => TypeTag::I64,
            Value::U8(_) => TypeTag::U8,
            Value::U16(_) => TypeTag::U16,
            Value::U32(_) => TypeTag::U32,
            Value::U64(_) => TypeTag::U64,
            Value::Vector2(_) => TypeTag::Vector2,
            Value::Vector3(_) => TypeTag::Vector3,
            Value::Vector4(_) => TypeTag::Vector4,
            Value::Matrix2x2(_) => TypeTag::Matrix2x2,
            Value::Matrix3x3(_) => TypeTag::Matrix3x3,
            Value::Matrix4x4(_) => TypeTag::Matrix4x4,
            Value::Custom(_) => TypeTag::Custom,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Custom(b) => Some(&b[..]),
            _ => None,
        }
    }

    /// Float components of vector and matrix payloads.
    pub(crate) fn float_components(&self) -> Option<&[f32]> {
        match self {
            Value::Vector2(v) => Some(v.components()),
            Value::Vector3(v) => Some(v.components()),
            Value::Vector4(v) => Some(v.components()),
            Value::Matrix2x2(m) => Some(m.components()),
            Value::Matrix3x3(m) => Some(m.components()),
            Value::Matrix4x4(m) => Some(m.components()),
            _ => None,
        }
    }

    /// Equality used for key matching: floats compare by bit pattern.
    pub(crate) fn bit_eq(&self, other: &Value) -> bool {
        match (self.float_components(), other.float_components()) {
            (Some(a), Some(b)) => {
                self.tag() == other.tag()
                    && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => self == other,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Custom(b.into_boxed_slice())
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    Vector2 => Vector2,
    Vector3 => Vector3,
    Vector4 => Vector4,
    Matrix2x2 => Matrix2x2,
    Matrix3x3 => Matrix3x3,
    Matrix4x4 => Matrix4x4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes_match_layout() {
        assert_eq!(TypeTag::U8.fixed_size(), Some(1));
        assert_eq!(TypeTag::I64.fixed_size(), Some(8));
        assert_eq!(TypeTag::Vector3.fixed_size(), Some(12));
        assert_eq!(TypeTag::Matrix3x3.fixed_size(), Some(36));
        assert_eq!(TypeTag::Matrix4x4.fixed_size(), Some(64));
        assert_eq!(TypeTag::Str.fixed_size(), None);
        assert_eq!(TypeTag::Custom.fixed_size(), None);
    }

    #[test]
    fn tags_follow_variants() {
        assert_eq!(Value::from("a").tag(), TypeTag::Str);
        assert_eq!(Value::from(7u16).tag(), TypeTag::U16);
        assert_eq!(Value::from(-7i32).tag(), TypeTag::I32);
        assert_eq!(Value::from(Vector4([0.0; 4])).tag(), TypeTag::Vector4);
        assert_eq!(Value::from(vec![1u8, 2]).tag(), TypeTag::Custom);
    }

    /// Key equality is bitwise for floats: NaN matches itself, signed zeros differ.
    #[test]
    fn bit_eq_on_floats() {
        let nan = Value::from(Vector2([f32::NAN, 1.0]));
        assert!(nan.bit_eq(&nan.clone()));
        assert_ne!(nan, nan.clone());

        let pos = Value::from(Vector2([0.0, 1.0]));
        let neg = Value::from(Vector2([-0.0, 1.0]));
        assert_eq!(pos, neg);
        assert!(!pos.bit_eq(&neg));
    }

    #[test]
    fn bit_eq_distinguishes_shapes_with_equal_components() {
        let v = Value::from(Vector4([1.0, 0.0, 0.0, 1.0]));
        let m = Value::from(Matrix2x2([1.0, 0.0, 0.0, 1.0]));
        assert!(!v.bit_eq(&m));
    }
}
