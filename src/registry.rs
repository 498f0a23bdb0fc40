//! Type registry: per-role size, copy, cleanup and comparison.
//!
//! Built-in tags carry fixed behavior. `TypeTag::Custom` payloads are
//! fixed-size byte blobs whose behavior is supplied through `CustomType`;
//! the dictionary resolves one `TypeOps` for keys and one for values at
//! construction and never looks the tag up again.

use crate::error::{CopyError, DictError};
use crate::value::{Role, TypeTag, Value};
use core::fmt;
use std::rc::Rc;

/// Copies `src` into the freshly allocated `dst` of the same length.
pub type CopyFn = Rc<dyn Fn(&[u8], &mut [u8]) -> Result<(), CopyError>>;
/// Runs before a dictionary-owned payload is released.
pub type CleanupFn = Rc<dyn Fn(&mut [u8])>;
/// Key equality for custom blobs.
pub type CompareFn = Rc<dyn Fn(&[u8], &[u8]) -> bool>;

/// Caller-supplied description of a `TypeTag::Custom` payload.
///
/// Size, copy and cleanup are mandatory; a dictionary refuses to build
/// when any of them is missing. Compare defaults to byte equality and, when
/// supplied for keys, must agree with it: keys are hashed from their raw bytes.
#[derive(Clone, Default)]
pub struct CustomType {
    size: Option<usize>,
    copy: Option<CopyFn>,
    cleanup: Option<CleanupFn>,
    compare: Option<CompareFn>,
}

impl CustomType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blob of `size` bytes copied with `copy_from_slice` and no cleanup.
    pub fn plain(size: usize) -> Self {
        Self::new()
            .size(size)
            .copy_with(|src, dst| {
                dst.copy_from_slice(src);
                Ok(())
            })
            .cleanup_with(|_| {})
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn copy_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8], &mut [u8]) -> Result<(), CopyError> + 'static,
    {
        self.copy = Some(Rc::new(f));
        self
    }

    pub fn cleanup_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut [u8]) + 'static,
    {
        self.cleanup = Some(Rc::new(f));
        self
    }

    pub fn compare_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8], &[u8]) -> bool + 'static,
    {
        self.compare = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("size", &self.size)
            .field("copy", &self.copy.is_some())
            .field("cleanup", &self.cleanup.is_some())
            .field("compare", &self.compare.is_some())
            .finish()
    }
}

struct CustomOps {
    size: usize,
    copy: CopyFn,
    cleanup: CleanupFn,
    compare: Option<CompareFn>,
}

/// Resolved behavior for one role (keys or values) of a dictionary.
pub(crate) struct TypeOps {
    role: Role,
    tag: TypeTag,
    custom: Option<CustomOps>,
}

impl TypeOps {
    pub(crate) fn resolve(
        role: Role,
        tag: TypeTag,
        custom: Option<CustomType>,
    ) -> Result<Self, DictError> {
        let custom = match (tag, custom) {
            (TypeTag::Custom, None) => {
                return Err(DictError::config(format!(
                    "custom {role} type requires size, copy and cleanup functions"
                )))
            }
            (TypeTag::Custom, Some(spec)) => {
                let size = spec
                    .size
                    .ok_or_else(|| DictError::config(format!("custom {role} size missing")))?;
                if size == 0 {
                    return Err(DictError::config(format!("custom {role} size must be non-zero")));
                }
                let copy = spec.copy.ok_or_else(|| {
                    DictError::config(format!("custom {role} copy function missing"))
                })?;
                let cleanup = spec.cleanup.ok_or_else(|| {
                    DictError::config(format!("custom {role} cleanup function missing"))
                })?;
                Some(CustomOps {
                    size,
                    copy,
                    cleanup,
                    compare: spec.compare,
                })
            }
            (other, Some(_)) => {
                return Err(DictError::config(format!(
                    "custom {role} functions supplied for built-in type {other}"
                )))
            }
            (_, None) => None,
        };
        Ok(Self { role, tag, custom })
    }

    pub(crate) fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Byte size of one payload; `None` for strings.
    pub(crate) fn size(&self) -> Option<usize> {
        match &self.custom {
            Some(c) => Some(c.size),
            None => self.tag.fixed_size(),
        }
    }

    pub(crate) fn has_cleanup(&self) -> bool {
        self.custom.is_some()
    }

    /// Verify a caller payload matches this role's tag (and size for blobs).
    pub(crate) fn check(&self, v: &Value) -> Result<(), DictError> {
        if v.tag() != self.tag {
            return Err(DictError::TypeMismatch {
                role: self.role,
                expected: self.tag,
                found: v.tag(),
            });
        }
        if let (Some(c), Value::Custom(bytes)) = (&self.custom, v) {
            if bytes.len() != c.size {
                return Err(DictError::SizeMismatch {
                    role: self.role,
                    expected: c.size,
                    found: bytes.len(),
                });
            }
        }
        Ok(())
    }

    /// Produce a dictionary-owned copy of `src`. `src` must have passed `check`.
    pub(crate) fn copy(&self, src: &Value) -> Result<Value, DictError> {
        match (src, &self.custom) {
            (Value::Str(s), _) => {
                let mut out = String::new();
                out.try_reserve_exact(s.len())
                    .map_err(|_| self.alloc_failure(s.len()))?;
                out.push_str(s);
                Ok(Value::Str(out))
            }
            (Value::Custom(bytes), Some(c)) => {
                let mut buf: Vec<u8> = Vec::new();
                buf.try_reserve_exact(c.size)
                    .map_err(|_| self.alloc_failure(c.size))?;
                buf.resize(c.size, 0);
                (c.copy)(&bytes[..], &mut buf[..]).map_err(|source| DictError::CopyFailed {
                    role: self.role,
                    source,
                })?;
                Ok(Value::Custom(buf.into_boxed_slice()))
            }
            (other, _) => Ok(other.clone()),
        }
    }

    /// Release hook for an owned payload; built-in types need nothing beyond `Drop`.
    pub(crate) fn cleanup(&self, v: &mut Value) {
        if let (Some(c), Value::Custom(bytes)) = (&self.custom, v) {
            (c.cleanup)(&mut bytes[..]);
        }
    }

    pub(crate) fn equals(&self, a: &Value, b: &Value) -> bool {
        match (&self.custom, a, b) {
            (Some(c), Value::Custom(x), Value::Custom(y)) => match &c.compare {
                Some(cmp) => cmp(&x[..], &y[..]),
                None => x[..] == y[..],
            },
            _ => a.bit_eq(b),
        }
    }

    fn alloc_failure(&self, bytes: usize) -> DictError {
        DictError::AllocationFailure {
            role: self.role,
            bytes,
        }
    }
}
