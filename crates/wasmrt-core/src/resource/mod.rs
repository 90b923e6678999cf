//! Read-only resource maps
//!
//! A resource map is emitted once, ahead of time, as
//!
//! ```text
//! [capacity: word][key 0: addr][value 0: addr] ... [key cap-1][value cap-1]
//! ```
//!
//! A null key marks an empty slot. Keys are placed by linear probing from
//! `hash mod capacity`, with no tombstones since entries are never removed.
//! Two hash schemes exist: string content ([`hash_units`](crate::hash_units))
//! for switch-on-string tables, and the key's address for tables over
//! interned references.

mod reader;
mod writer;

pub use reader::ResourceMap;
pub use writer::ResourceMapWriter;

use crate::address::Address;

/// Size of one key/value entry in bytes
pub const ENTRY_SIZE: i32 = 2 * Address::SIZE as i32;

/// Size of the capacity header in bytes
pub const HEADER_SIZE: i32 = crate::WORD_SIZE as i32;

/// Slot probed on step `step` for a key hashing to `hash`
///
/// `capacity` must be positive. Negative remainders are folded back into
/// `0..capacity`.
#[inline]
pub(crate) fn probe_slot(hash: i32, step: i32, capacity: i32) -> i32 {
    let index = hash.wrapping_add(step) % capacity;
    if index < 0 { index + capacity } else { index }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_wraps() {
        assert_eq!(probe_slot(5, 0, 8), 5);
        assert_eq!(probe_slot(5, 3, 8), 0);
        assert_eq!(probe_slot(7, 1, 8), 0);
    }

    #[test]
    fn test_probe_negative_hash() {
        assert_eq!(probe_slot(-1, 0, 8), 7);
        assert_eq!(probe_slot(-9, 0, 8), 7);
        assert_eq!(probe_slot(i32::MIN, 0, 3), (i32::MIN % 3) + 3);
        assert_eq!(probe_slot(i32::MAX, 1, 8), probe_slot(i32::MIN, 0, 8));
    }
}
