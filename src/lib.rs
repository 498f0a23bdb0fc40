//! multitable-dict: a single-threaded dictionary spread over several
//! independently seeded hash tables, placing each new entry in whichever
//! candidate bucket currently has the shortest chain.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a typed key/value dictionary whose load is balanced across
//!   `array_count` hash spaces without ever rehashing.
//! - Layers:
//!   - EntryStore: slotmap arena of entries, each threaded on a bucket
//!     chain and on one global list (most recent first). Links are
//!     generational keys rather than pointers.
//!   - HashTableSet: owns the per-table seeds and the chain heads for
//!     every `(table, bucket)`; implements probe, duplicate scan,
//!     least-loaded placement and unlink.
//!   - Dictionary: public API. Resolves key/value `TypeOps` once at
//!     construction, serializes keys for hashing, applies the copy mode
//!     and runs cleanup hooks on release.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (payloads may be `Rc`-shared).
//! - Fixed geometry: `array_count` and `array_size` never change.
//! - Unique keys across all tables; duplicate inserts fail before any
//!   copy is made.
//! - Keys are immutable post-insert; `set` replaces values only.
//!
//! Placement
//! - Candidate bucket in table `i` is `hash(bytes, seed_i) % array_size`.
//! - Insert scans every candidate chain (duplicate check and length),
//!   then prepends to the shortest; the lowest table index wins ties.
//! - Lookups probe tables in index order and stop at the first match.
//!
//! Ownership
//! - DEEP: the dictionary stores copies made by the type's copy function
//!   and runs the cleanup function before releasing them (delete, set,
//!   clear, drop). A failed insert leaves nothing linked and cleans up any
//!   half-built copy.
//! - SHALLOW: the dictionary keeps the caller's `Rc<Value>`; no copies and
//!   no cleanup. The caller cannot get `&mut` to a shared payload while
//!   it is inserted.
//!
//! Notes and non-goals
//! - No resizing or rehashing; long chains are accepted.
//! - The hash is not meant to resist adversarial keys.
//! - Seeds default to the deterministic `i * 2654435761` formula;
//!   `SeedStrategy` allows explicit or random seeds.

mod config;
mod dictionary;
#[cfg(test)]
mod dictionary_proptest;
mod entry_store;
mod error;
mod hashing;
mod registry;
mod serialize;
mod table_set;
mod value;

// Public surface
pub use config::{
    CopyMode, DictionaryBuilder, DictionaryConfig, DEFAULT_ARRAY_COUNT, DEFAULT_ARRAY_SIZE,
};
pub use dictionary::{Dictionary, EntryHandle, Iter};
pub use error::{CopyError, DictError};
pub use hashing::{HashFunction, SeedStrategy, SEED_MULTIPLIER};
pub use registry::{CleanupFn, CompareFn, CopyFn, CustomType};
pub use table_set::LoadStats;
pub use value::{
    Matrix2x2, Matrix3x3, Matrix4x4, Role, TypeTag, Value, Vector2, Vector3, Vector4,
};
