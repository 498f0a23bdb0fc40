//! Error types returned by dictionary construction and operations.

use crate::value::{Role, TypeTag};

/// Failure reported by a caller-supplied copy function.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct CopyError(pub String);

impl CopyError {
    pub fn new(msg: impl Into<String>) -> Self {
        CopyError(msg.into())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DictError {
    /// Insert found an entry with the same key in one of the tables.
    #[error("key already present in dictionary")]
    DuplicateKey,
    #[error("key not found in dictionary")]
    KeyNotFound,
    /// A DEEP copy could not reserve its buffer. Only reachable when the
    /// allocator itself reports out-of-memory.
    #[error("failed to allocate {bytes} bytes for {role} copy")]
    AllocationFailure { role: Role, bytes: usize },
    #[error("{role} copy function failed: {source}")]
    CopyFailed { role: Role, source: CopyError },
    #[error("invalid dictionary configuration: {0}")]
    InvalidConfiguration(String),
    #[error("{role} type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        role: Role,
        expected: TypeTag,
        found: TypeTag,
    },
    #[error("custom {role} must be exactly {expected} bytes, got {found}")]
    SizeMismatch {
        role: Role,
        expected: usize,
        found: usize,
    },
}

impl DictError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        DictError::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_name_the_role() {
        let e = DictError::TypeMismatch {
            role: Role::Value,
            expected: TypeTag::Str,
            found: TypeTag::U32,
        };
        assert_eq!(e.to_string(), "value type mismatch: expected Str, found U32");

        let e = DictError::AllocationFailure {
            role: Role::Key,
            bytes: 64,
        };
        assert_eq!(e.to_string(), "failed to allocate 64 bytes for key copy");
    }

    #[test]
    fn copy_failure_exposes_source() {
        let e = DictError::CopyFailed {
            role: Role::Key,
            source: CopyError::new("disk full"),
        };
        assert_eq!(e.source().map(|s| s.to_string()), Some("disk full".into()));
    }
}
