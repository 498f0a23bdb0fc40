//! Dictionary: public layer over `HashTableSet`.
//!
//! Adds per-role typing (`TypeOps`), copy-mode aware ownership and
//! handle-based access. Keys are serialized once per operation and the bytes
//! are dropped before the entry is linked; only the stored key is kept.

use crate::config::{CopyMode, DictionaryBuilder, DictionaryConfig};
use crate::entry_store::{Entry, EntryKey, Global, Payload};
use crate::error::DictError;
use crate::hashing::HashFunction;
use crate::registry::TypeOps;
use crate::serialize::key_bytes;
use crate::table_set::{HashTableSet, LoadStats};
use crate::value::{Role, TypeTag, Value};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Rc;
use tracing::{debug, trace};

static NEXT_DICT_ID: AtomicU64 = AtomicU64::new(0);

/// Stable reference to one entry. Resolves to `None` once the entry is
/// deleted, and against any dictionary other than the one that issued it;
/// never aliases another entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryHandle {
    owner: u64,
    key: EntryKey,
}

impl EntryHandle {
    #[inline]
    fn resolve<'a>(&self, dict: &'a Dictionary) -> Option<&'a Entry> {
        if self.owner != dict.id {
            return None;
        }
        dict.tables.entry(self.key)
    }

    /// Borrow the entry's key; requires the issuing dictionary.
    pub fn key<'a>(&self, dict: &'a Dictionary) -> Option<&'a Value> {
        self.resolve(dict).map(|e| e.key.get())
    }

    /// Borrow the entry's value; requires the issuing dictionary.
    pub fn value<'a>(&self, dict: &'a Dictionary) -> Option<&'a Value> {
        self.resolve(dict).map(|e| e.value.get())
    }
}

/// Hash dictionary spread over several independently seeded tables.
///
/// Single-threaded: `!Send`/`!Sync`. Keys are unique across all tables and
/// immutable once inserted; `set` replaces values only.
pub struct Dictionary {
    id: u64,
    tables: HashTableSet,
    key_ops: TypeOps,
    value_ops: TypeOps,
    copy_mode: CopyMode,
}

impl Dictionary {
    pub fn builder() -> DictionaryBuilder {
        DictionaryBuilder::new()
    }

    pub fn new(
        array_count: u16,
        array_size: usize,
        key_type: TypeTag,
        value_type: TypeTag,
        copy_mode: CopyMode,
    ) -> Result<Self, DictError> {
        Self::builder()
            .array_count(array_count)
            .array_size(array_size)
            .key_type(key_type)
            .value_type(value_type)
            .copy_mode(copy_mode)
            .build()
    }

    /// Default geometry (8 tables of 256 buckets), XXH3, DEEP copies.
    pub fn with_types(key_type: TypeTag, value_type: TypeTag) -> Result<Self, DictError> {
        Self::builder()
            .key_type(key_type)
            .value_type(value_type)
            .build()
    }

    pub(crate) fn from_config(config: DictionaryConfig) -> Result<Self, DictError> {
        let DictionaryConfig {
            array_count,
            array_size,
            hash_function,
            seeds,
            key_type,
            value_type,
            copy_mode,
            custom_key,
            custom_value,
        } = config;

        let key_ops = TypeOps::resolve(Role::Key, key_type, custom_key)?;
        let value_ops = TypeOps::resolve(Role::Value, value_type, custom_value)?;
        let tables = HashTableSet::new(array_count, array_size, hash_function, &seeds)?;

        debug!(
            array_count,
            array_size,
            ?copy_mode,
            %key_type,
            %value_type,
            "dictionary created"
        );
        Ok(Self {
            id: NEXT_DICT_ID.fetch_add(1, Ordering::Relaxed),
            tables,
            key_ops,
            value_ops,
            copy_mode,
        })
    }

    pub fn array_count(&self) -> u16 {
        self.tables.array_count()
    }

    pub fn array_size(&self) -> usize {
        self.tables.array_size()
    }

    /// Per-table seeds, indexed by table.
    pub fn seeds(&self) -> &[u64] {
        self.tables.seeds()
    }

    pub fn hash_function(&self) -> HashFunction {
        self.tables.hash_function()
    }

    pub fn key_type(&self) -> TypeTag {
        self.key_ops.tag()
    }

    pub fn value_type(&self) -> TypeTag {
        self.value_ops.tag()
    }

    /// Byte size of one key; `None` for strings.
    pub fn key_size(&self) -> Option<usize> {
        self.key_ops.size()
    }

    pub fn value_size(&self) -> Option<usize> {
        self.value_ops.size()
    }

    pub fn copy_mode(&self) -> CopyMode {
        self.copy_mode
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &Value) -> Option<EntryKey> {
        if let Err(e) = self.key_ops.check(key) {
            trace!(error = %e, "lookup with mistyped key");
            return None;
        }
        let bytes = key_bytes(key);
        let key_ops = &self.key_ops;
        self.tables.find(&bytes, |stored| key_ops.equals(stored, key))
    }

    fn handle(&self, key: EntryKey) -> EntryHandle {
        EntryHandle { owner: self.id, key }
    }

    pub fn find(&self, key: &Value) -> Option<EntryHandle> {
        self.lookup(key).map(|k| self.handle(k))
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.lookup(key).is_some()
    }

    /// Stored value for `key`. Under SHALLOW the reference points into the
    /// caller's `Rc` allocation.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        let k = self.lookup(key)?;
        self.tables.entry(k).map(|e| e.value.get())
    }

    /// Table and bucket currently holding `key`.
    pub fn locate(&self, key: &Value) -> Option<(u16, usize)> {
        self.tables.position(self.lookup(key)?)
    }

    /// Insert a new entry. Fails with `DuplicateKey` if any table already
    /// holds the key; nothing is copied or linked in that case.
    ///
    /// Under DEEP the dictionary copies both payloads and does not retain the
    /// caller's `Rc`. If the value copy fails after the key copy succeeded, the
    /// key copy is cleaned up before the error is returned.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Result<EntryHandle, DictError>
    where
        K: Into<Rc<Value>>,
        V: Into<Rc<Value>>,
    {
        let key = key.into();
        let value = value.into();
        self.key_ops.check(&key)?;
        self.value_ops.check(&value)?;

        let placement = {
            let bytes = key_bytes(&key);
            let key_ops = &self.key_ops;
            self.tables
                .place(&bytes, |stored| key_ops.equals(stored, &key))
                .inspect_err(|_| trace!(key = ?key, "duplicate key rejected"))?
        };

        let (stored_key, stored_value) = match self.copy_mode {
            CopyMode::Deep => {
                let mut k = self.key_ops.copy(&key)?;
                let v = match self.value_ops.copy(&value) {
                    Ok(v) => v,
                    Err(e) => {
                        self.key_ops.cleanup(&mut k);
                        return Err(e);
                    }
                };
                (Payload::Owned(k), Payload::Owned(v))
            }
            CopyMode::Shallow => (Payload::Shared(key), Payload::Shared(value)),
        };

        let k = self.tables.link(placement, stored_key, stored_value);
        trace!(
            table = placement.table,
            bucket = placement.bucket,
            chain_len = placement.chain_len,
            "entry inserted"
        );
        Ok(self.handle(k))
    }

    /// Replace the value stored under an existing key.
    ///
    /// Under DEEP the new value is copied first; the old value is cleaned up
    /// only after the copy succeeded, so a failed copy leaves the entry as is.
    pub fn set<V>(&mut self, key: &Value, value: V) -> Result<(), DictError>
    where
        V: Into<Rc<Value>>,
    {
        let value = value.into();
        self.key_ops.check(key)?;
        self.value_ops.check(&value)?;
        let k = self.lookup(key).ok_or(DictError::KeyNotFound)?;

        let replacement = match self.copy_mode {
            CopyMode::Deep => Payload::Owned(self.value_ops.copy(&value)?),
            CopyMode::Shallow => Payload::Shared(value),
        };
        let entry = self.tables.entry_mut(k).ok_or(DictError::KeyNotFound)?;
        let mut old = core::mem::replace(&mut entry.value, replacement);
        if let Some(v) = old.owned_mut() {
            self.value_ops.cleanup(v);
        }
        trace!(key = ?key, "value replaced");
        Ok(())
    }

    /// Remove `key` and release its payloads. Returns `false` (and changes
    /// nothing) when the key is absent.
    pub fn delete(&mut self, key: &Value) -> bool {
        let Some(k) = self.lookup(key) else {
            return false;
        };
        match self.tables.unlink(k) {
            Some(entry) => {
                release(&self.key_ops, &self.value_ops, entry);
                trace!(key = ?key, "entry deleted");
                true
            }
            None => false,
        }
    }

    /// Remove every entry, keeping the tables and seeds.
    pub fn clear(&mut self) {
        let released = self.len();
        let (key_ops, value_ops) = (&self.key_ops, &self.value_ops);
        self.tables.clear_with(|entry| release(key_ops, value_ops, entry));
        if released > 0 {
            debug!(released, "dictionary cleared");
        }
    }

    /// Release all entries and the tables. Equivalent to dropping.
    pub fn destroy(self) {
        drop(self);
    }

    /// Entries most recently inserted first. The dictionary cannot be
    /// mutated while the iterator is alive.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.tables.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Number of entries chained at `(table, bucket)`; 0 when out of range.
    pub fn chain_len(&self, table: u16, bucket: usize) -> usize {
        self.tables.chain_len(table, bucket)
    }

    pub fn load_stats(&self) -> LoadStats {
        self.tables.stats()
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.tables.assert_consistent();
    }
}

/// Run cleanup hooks on owned payloads, then drop the entry.
fn release(key_ops: &TypeOps, value_ops: &TypeOps, mut entry: Entry) {
    if key_ops.has_cleanup() {
        if let Some(k) = entry.key.owned_mut() {
            key_ops.cleanup(k);
        }
    }
    if value_ops.has_cleanup() {
        if let Some(v) = entry.value.owned_mut() {
            value_ops.cleanup(v);
        }
    }
}

impl Drop for Dictionary {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(key, value)` pairs in global-list order.
pub struct Iter<'a> {
    inner: Global<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Value, &'a Value);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| (e.key.get(), e.value.get()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a Value, &'a Value);
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
