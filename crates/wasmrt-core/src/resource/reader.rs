//! Resource map lookups

use super::{ENTRY_SIZE, HEADER_SIZE, probe_slot};
use crate::address::{Address, LinearMemory};
use crate::string::{StringLayout, StringView, hash_units};

/// Read-only view of a resource map in linear memory
///
/// Holds a shared borrow of the memory, so any number of readers may look
/// up the same map at once.
#[derive(Clone, Copy)]
pub struct ResourceMap<'m> {
    memory: &'m LinearMemory,
    base: Address,
    layout: StringLayout,
}

impl<'m> ResourceMap<'m> {
    /// View the map whose capacity word is at `base`
    ///
    /// `layout` describes the string objects used as keys by
    /// content-hashed maps.
    pub fn new(memory: &'m LinearMemory, base: Address, layout: StringLayout) -> Self {
        Self {
            memory,
            base,
            layout,
        }
    }

    /// Address of the capacity word
    pub fn address(&self) -> Address {
        self.base
    }

    /// Number of slots
    pub fn capacity(&self) -> i32 {
        self.memory.get_word(self.base)
    }

    /// Address of the entry in `slot`
    #[inline]
    pub fn entry(&self, slot: i32) -> Address {
        self.base + HEADER_SIZE + slot * ENTRY_SIZE
    }

    /// Key stored in an entry (null if the slot is empty)
    #[inline]
    pub fn key(&self, entry: Address) -> Address {
        self.memory.get_address(entry)
    }

    /// Value paired with an entry
    #[inline]
    pub fn value(&self, entry: Address) -> Address {
        self.memory.get_address(entry + Address::SIZE as i32)
    }

    /// Find the entry whose key string has the same content as `key`
    pub fn lookup_by_content(&self, key: &StringView<'_>) -> Option<Address> {
        self.probe(key.hash_code(), |candidate| {
            StringView::new(self.memory, candidate, &self.layout).content_eq(key)
        })
    }

    /// Find the entry whose key string equals host-side code units
    pub fn lookup_units(&self, key: &[u16]) -> Option<Address> {
        self.probe(hash_units(key.iter().copied()), |candidate| {
            StringView::new(self.memory, candidate, &self.layout).eq_units(key)
        })
    }

    /// Find the entry whose key is exactly the address `key`
    pub fn lookup_by_identity(&self, key: Address) -> Option<Address> {
        self.probe(key.to_int(), |candidate| candidate == key)
    }

    /// Value for a content lookup, if found
    pub fn get(&self, key: &StringView<'_>) -> Option<Address> {
        self.lookup_by_content(key).map(|entry| self.value(entry))
    }

    /// Linear probe from `hash` until a match or an empty slot
    fn probe(&self, hash: i32, mut matches: impl FnMut(Address) -> bool) -> Option<Address> {
        let capacity = self.capacity();
        for step in 0..capacity {
            let entry = self.entry(probe_slot(hash, step, capacity));
            let candidate = self.key(entry);
            if candidate.is_null() {
                return None;
            }
            if matches(candidate) {
                return Some(entry);
            }
        }
        tracing::warn!(
            target: "wasmrt::resource",
            map = %self.base,
            capacity,
            "probe exhausted resource map without reaching an empty slot"
        );
        None
    }

    /// Occupied entries in slot order
    pub fn entries(&self) -> impl Iterator<Item = Address> + '_ {
        (0..self.capacity().max(0))
            .map(move |slot| self.entry(slot))
            .filter(move |&entry| !self.key(entry).is_null())
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// Check for a map with no keys
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Every key, in slot order
    pub fn keys(&self) -> Vec<Address> {
        self.entries().map(|entry| self.key(entry)).collect()
    }
}

impl std::fmt::Debug for ResourceMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMap")
            .field("address", &self.base)
            .field("capacity", &self.capacity())
            .finish()
    }
}
