//! Ahead-of-time resource map construction
//!
//! The producer side of [`ResourceMap`](super::ResourceMap). Entries are
//! placed with the same hash and probe sequence the reader uses, and the
//! writer never fills the last empty slot, so every absent-key lookup is
//! guaranteed to stop.

use super::{ENTRY_SIZE, HEADER_SIZE, probe_slot};
use crate::address::{Address, LinearMemory};
use crate::error::{CoreError, CoreResult};
use crate::string::{StringLayout, StringView};

/// Builds a resource map in host memory, then writes it out in one go
#[derive(Debug, Clone)]
pub struct ResourceMapWriter {
    capacity: i32,
    slots: Vec<Option<(Address, Address)>>,
    len: usize,
}

impl ResourceMapWriter {
    /// Create an empty map with `capacity` slots
    pub fn new(capacity: i32) -> CoreResult<Self> {
        if capacity <= 0 {
            return Err(CoreError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            slots: vec![None; capacity as usize],
            len: 0,
        })
    }

    /// Number of slots
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Number of entries inserted
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check for an empty map
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes occupied once written
    pub fn byte_size(&self) -> u32 {
        (HEADER_SIZE + self.capacity * ENTRY_SIZE) as u32
    }

    /// Insert a string key, hashed and compared by content
    ///
    /// `key` must be a string object already laid out in `memory`.
    pub fn insert_content(
        &mut self,
        memory: &LinearMemory,
        layout: &StringLayout,
        key: Address,
        value: Address,
    ) -> CoreResult<()> {
        if key.is_null() {
            return Err(CoreError::NullKey);
        }
        let view = StringView::new(memory, key, layout);
        self.place(view.hash_code(), key, value, |existing| {
            StringView::new(memory, existing, layout).content_eq(&view)
        })
    }

    /// Insert a key hashed and compared by address
    pub fn insert_identity(&mut self, key: Address, value: Address) -> CoreResult<()> {
        if key.is_null() {
            return Err(CoreError::NullKey);
        }
        self.place(key.to_int(), key, value, |existing| existing == key)
    }

    fn place(
        &mut self,
        hash: i32,
        key: Address,
        value: Address,
        same: impl Fn(Address) -> bool,
    ) -> CoreResult<()> {
        // One slot always stays empty
        if self.len + 1 >= self.capacity as usize {
            return Err(CoreError::ResourceMapFull {
                capacity: self.capacity,
            });
        }
        for step in 0..self.capacity {
            let slot = probe_slot(hash, step, self.capacity) as usize;
            match self.slots[slot] {
                Some((existing, _)) if same(existing) => {
                    return Err(CoreError::DuplicateKey(key));
                }
                Some(_) => continue,
                None => {
                    self.slots[slot] = Some((key, value));
                    self.len += 1;
                    tracing::trace!(
                        target: "wasmrt::resource",
                        key = %key,
                        slot,
                        probes = step + 1,
                        "placed resource map entry"
                    );
                    return Ok(());
                }
            }
        }
        Err(CoreError::ResourceMapFull {
            capacity: self.capacity,
        })
    }

    /// Write the map with its capacity word at `at`
    pub fn write(&self, memory: &mut LinearMemory, at: Address) -> CoreResult<()> {
        memory.range(at, self.byte_size())?;
        memory.put_word(at, self.capacity);
        let mut entry = at + HEADER_SIZE;
        for slot in &self.slots {
            let (key, value) = slot.unwrap_or((Address::NULL, Address::NULL));
            memory.put_address(entry, key);
            memory.put_address(entry + Address::SIZE as i32, value);
            entry = entry.offset_by(ENTRY_SIZE);
        }
        tracing::debug!(
            target: "wasmrt::resource",
            map = %at,
            capacity = self.capacity,
            entries = self.len,
            "wrote resource map"
        );
        Ok(())
    }
}
