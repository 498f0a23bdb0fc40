//! HashTableSet: `array_count` independently seeded bucket tables sharing
//! one entry arena.
//!
//! A key has one candidate bucket per table,
//! `index_i = hash(bytes, seed_i) % array_size`. Lookups walk the candidate
//! chains in table order. Inserts first scan every candidate chain for a
//! duplicate, then place the entry at the front of the shortest candidate
//! chain; table order breaks ties, so table 0 wins an all-equal round.
//! Nothing is ever relocated and the tables never grow.

use crate::entry_store::{Chain, Entry, EntryKey, EntryStore, Global, Payload};
use crate::error::DictError;
use crate::hashing::{HashFunction, SeedStrategy};
use crate::value::Value;

/// Chosen destination for a new entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Placement {
    pub(crate) table: u16,
    pub(crate) bucket: usize,
    /// Length of the chosen chain before the new entry is linked.
    pub(crate) chain_len: usize,
}

/// Snapshot of how entries are spread over the tables.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LoadStats {
    /// Live entries held by each table, indexed by table.
    pub entries_per_table: Vec<usize>,
    /// Buckets (across all tables) with a non-empty chain.
    pub occupied_buckets: usize,
    pub longest_chain: usize,
}

pub(crate) struct HashTableSet {
    array_count: u16,
    array_size: usize,
    hash: HashFunction,
    seeds: Vec<u64>,
    /// Chain heads indexed by `table * array_size + bucket`.
    heads: Vec<Option<EntryKey>>,
    store: EntryStore,
}

impl HashTableSet {
    pub(crate) fn new(
        array_count: u16,
        array_size: usize,
        hash: HashFunction,
        seeds: &SeedStrategy,
    ) -> Result<Self, DictError> {
        if array_count == 0 {
            return Err(DictError::config("array_count must be at least 1"));
        }
        if array_size == 0 {
            return Err(DictError::config("array_size must be at least 1"));
        }
        let seeds = seeds.generate(array_count)?;
        let total = usize::from(array_count)
            .checked_mul(array_size)
            .ok_or_else(|| DictError::config("array_count * array_size overflows"))?;
        let mut heads = Vec::new();
        heads
            .try_reserve_exact(total)
            .map_err(|_| DictError::config(format!("cannot allocate {total} buckets")))?;
        heads.resize(total, None);
        Ok(Self {
            array_count,
            array_size,
            hash,
            seeds,
            heads,
            store: EntryStore::new(),
        })
    }

    pub(crate) fn array_count(&self) -> u16 {
        self.array_count
    }

    pub(crate) fn array_size(&self) -> usize {
        self.array_size
    }

    pub(crate) fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    pub(crate) fn hash_function(&self) -> HashFunction {
        self.hash
    }

    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    fn slot(&self, table: u16, bucket: usize) -> usize {
        usize::from(table) * self.array_size + bucket
    }

    /// Bucket of `bytes` within `table`.
    #[inline]
    pub(crate) fn bucket_index(&self, bytes: &[u8], table: u16) -> usize {
        let h = self.hash.hash(bytes, self.seeds[usize::from(table)]);
        (h % self.array_size as u64) as usize
    }

    fn chain_at(&self, table: u16, bucket: usize) -> Chain<'_> {
        self.store.chain(self.heads[self.slot(table, bucket)])
    }

    /// First entry whose stored key satisfies `eq`, probing tables in order.
    pub(crate) fn find<F>(&self, bytes: &[u8], mut eq: F) -> Option<EntryKey>
    where
        F: FnMut(&Value) -> bool,
    {
        (0..self.array_count).find_map(|t| {
            let bucket = self.bucket_index(bytes, t);
            self.chain_at(t, bucket)
                .find(|(_, e)| eq(e.key.get()))
                .map(|(k, _)| k)
        })
    }

    /// Scan every candidate chain for a duplicate and pick the shortest one.
    pub(crate) fn place<F>(&self, bytes: &[u8], mut eq: F) -> Result<Placement, DictError>
    where
        F: FnMut(&Value) -> bool,
    {
        let mut best: Option<Placement> = None;
        for t in 0..self.array_count {
            let bucket = self.bucket_index(bytes, t);
            let mut chain_len = 0usize;
            for (_, e) in self.chain_at(t, bucket) {
                if eq(e.key.get()) {
                    return Err(DictError::DuplicateKey);
                }
                chain_len += 1;
            }
            let shorter = best.map_or(true, |b| chain_len < b.chain_len);
            if shorter {
                best = Some(Placement {
                    table: t,
                    bucket,
                    chain_len,
                });
            }
        }
        // array_count >= 1, so at least one table was visited.
        best.ok_or_else(|| DictError::config("dictionary has no tables"))
    }

    pub(crate) fn link(&mut self, p: Placement, key: Payload, value: Payload) -> EntryKey {
        let slot = self.slot(p.table, p.bucket);
        self.store.push_front(&mut self.heads[slot], slot, key, value)
    }

    pub(crate) fn unlink(&mut self, k: EntryKey) -> Option<Entry> {
        let slot = self.store.get(k)?.slot;
        self.store.unlink(&mut self.heads[slot], k)
    }

    /// Release every entry in global-list order and empty all buckets.
    pub(crate) fn clear_with<F>(&mut self, f: F)
    where
        F: FnMut(Entry),
    {
        self.store.drain_with(f);
        self.heads.fill(None);
    }

    pub(crate) fn entry(&self, k: EntryKey) -> Option<&Entry> {
        self.store.get(k)
    }

    pub(crate) fn entry_mut(&mut self, k: EntryKey) -> Option<&mut Entry> {
        self.store.get_mut(k)
    }

    pub(crate) fn iter(&self) -> Global<'_> {
        self.store.iter()
    }

    /// `(table, bucket)` of a live entry.
    pub(crate) fn position(&self, k: EntryKey) -> Option<(u16, usize)> {
        let slot = self.store.get(k)?.slot;
        // slot < array_count * array_size, so the quotient fits in u16.
        Some(((slot / self.array_size) as u16, slot % self.array_size))
    }

    pub(crate) fn chain_len(&self, table: u16, bucket: usize) -> usize {
        if table >= self.array_count || bucket >= self.array_size {
            return 0;
        }
        self.chain_at(table, bucket).count()
    }

    pub(crate) fn stats(&self) -> LoadStats {
        let mut stats = LoadStats {
            entries_per_table: vec![0; usize::from(self.array_count)],
            ..LoadStats::default()
        };
        for (slot, head) in self.heads.iter().enumerate() {
            if head.is_none() {
                continue;
            }
            let len = self.store.chain(*head).count();
            stats.entries_per_table[slot / self.array_size] += len;
            stats.occupied_buckets += 1;
            stats.longest_chain = stats.longest_chain.max(len);
        }
        stats
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.store.assert_links(&self.heads);
    }
}
