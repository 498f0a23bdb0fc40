//! EntryStore: arena-allocated entries threaded on two doubly-linked lists.
//!
//! Every live entry sits in exactly one bucket chain (`*_in_bucket` links,
//! head owned by the table set) and exactly once in the global list rooted at
//! `first_entry` (`*_entry` links, most recently inserted first). Links are
//! generational slotmap keys, so a stale link fails lookup instead of
//! reaching freed memory.

use crate::value::Value;
use slotmap::{new_key_type, SlotMap};
use std::rc::Rc;

new_key_type! {
    pub(crate) struct EntryKey;
}

/// Stored key or value: a dictionary-owned copy (DEEP) or the caller's
/// shared allocation (SHALLOW).
#[derive(Debug)]
pub(crate) enum Payload {
    Owned(Value),
    Shared(Rc<Value>),
}

impl Payload {
    #[inline]
    pub(crate) fn get(&self) -> &Value {
        match self {
            Payload::Owned(v) => v,
            Payload::Shared(rc) => &**rc,
        }
    }

    /// Mutable access exists only for owned payloads.
    pub(crate) fn owned_mut(&mut self) -> Option<&mut Value> {
        match self {
            Payload::Owned(v) => Some(v),
            Payload::Shared(_) => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) key: Payload,
    pub(crate) value: Payload,
    /// Flat bucket index `table * array_size + bucket`.
    pub(crate) slot: usize,
    next_in_bucket: Option<EntryKey>,
    prev_in_bucket: Option<EntryKey>,
    next_entry: Option<EntryKey>,
    prev_entry: Option<EntryKey>,
}

pub(crate) struct EntryStore {
    slots: SlotMap<EntryKey, Entry>,
    first_entry: Option<EntryKey>,
}

impl EntryStore {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            first_entry: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, k: EntryKey) -> Option<&Entry> {
        self.slots.get(k)
    }

    pub(crate) fn get_mut(&mut self, k: EntryKey) -> Option<&mut Entry> {
        self.slots.get_mut(k)
    }

    /// Create an entry and prepend it to the chain rooted at `head` and to
    /// the global list. O(1).
    pub(crate) fn push_front(
        &mut self,
        head: &mut Option<EntryKey>,
        slot: usize,
        key: Payload,
        value: Payload,
    ) -> EntryKey {
        let k = self.slots.insert(Entry {
            key,
            value,
            slot,
            next_in_bucket: *head,
            prev_in_bucket: None,
            next_entry: self.first_entry,
            prev_entry: None,
        });
        if let Some(h) = *head {
            self.slots[h].prev_in_bucket = Some(k);
        }
        *head = Some(k);
        if let Some(f) = self.first_entry {
            self.slots[f].prev_entry = Some(k);
        }
        self.first_entry = Some(k);
        k
    }

    /// Unlink `k` from its chain (rooted at `head`) and from the global list,
    /// returning the detached entry. Neighbors are patched before return.
    pub(crate) fn unlink(&mut self, head: &mut Option<EntryKey>, k: EntryKey) -> Option<Entry> {
        let e = self.slots.remove(k)?;

        match e.prev_in_bucket {
            Some(p) => self.slots[p].next_in_bucket = e.next_in_bucket,
            None => {
                debug_assert_eq!(*head, Some(k), "chain head does not match entry");
                *head = e.next_in_bucket;
            }
        }
        if let Some(n) = e.next_in_bucket {
            self.slots[n].prev_in_bucket = e.prev_in_bucket;
        }

        match e.prev_entry {
            Some(p) => self.slots[p].next_entry = e.next_entry,
            None => self.first_entry = e.next_entry,
        }
        if let Some(n) = e.next_entry {
            self.slots[n].prev_entry = e.prev_entry;
        }

        Some(e)
    }

    /// Remove every entry by walking the global list once, handing each to `f`.
    /// Bucket heads are left to the caller to reset.
    pub(crate) fn drain_with<F>(&mut self, mut f: F)
    where
        F: FnMut(Entry),
    {
        let mut cur = self.first_entry.take();
        while let Some(k) = cur {
            match self.slots.remove(k) {
                Some(e) => {
                    cur = e.next_entry;
                    f(e);
                }
                None => break,
            }
        }
        debug_assert!(self.slots.is_empty(), "global list missed entries");
        self.slots.clear();
    }

    pub(crate) fn chain(&self, head: Option<EntryKey>) -> Chain<'_> {
        Chain {
            store: self,
            cur: head,
        }
    }

    pub(crate) fn iter(&self) -> Global<'_> {
        Global {
            store: self,
            cur: self.first_entry,
            remaining: self.slots.len(),
        }
    }

    /// Check link symmetry of the global list and of the chain rooted at each
    /// head. Panics on the first violation.
    #[cfg(test)]
    pub(crate) fn assert_links(&self, heads: &[Option<EntryKey>]) {
        let mut seen = 0usize;
        let mut prev = None;
        let mut cur = self.first_entry;
        while let Some(k) = cur {
            let e = &self.slots[k];
            assert_eq!(e.prev_entry, prev, "global prev link broken");
            prev = Some(k);
            cur = e.next_entry;
            seen += 1;
            assert!(seen <= self.slots.len(), "global list cycles");
        }
        assert_eq!(seen, self.slots.len(), "global list length mismatch");

        let mut chained = 0usize;
        for (slot, head) in heads.iter().enumerate() {
            let mut prev = None;
            let mut cur = *head;
            while let Some(k) = cur {
                let e = &self.slots[k];
                assert_eq!(e.slot, slot, "entry chained under a foreign slot");
                assert_eq!(e.prev_in_bucket, prev, "chain prev link broken");
                prev = Some(k);
                cur = e.next_in_bucket;
                chained += 1;
                assert!(chained <= self.slots.len(), "chain cycles");
            }
        }
        assert_eq!(chained, self.slots.len(), "entry missing from chains");
    }
}

/// Walks one bucket chain front to back.
pub(crate) struct Chain<'a> {
    store: &'a EntryStore,
    cur: Option<EntryKey>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (EntryKey, &'a Entry);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cur?;
        let e = self.store.slots.get(k)?;
        self.cur = e.next_in_bucket;
        Some((k, e))
    }
}

/// Walks the global list, most recently inserted first.
pub(crate) struct Global<'a> {
    store: &'a EntryStore,
    cur: Option<EntryKey>,
    remaining: usize,
}

impl<'a> Iterator for Global<'a> {
    type Item = (EntryKey, &'a Entry);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cur?;
        let e = self.store.slots.get(k)?;
        self.cur = e.next_entry;
        self.remaining -= 1;
        Some((k, e))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Global<'_> {}
