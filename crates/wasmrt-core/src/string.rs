//! String object overlay
//!
//! A string object in linear memory carries a 4-byte length (in code units)
//! and a contiguous run of 16-bit code units. Where these sit relative to
//! the object's address is described by a [`StringLayout`], which the code
//! generator and the runtime must agree on.

use crate::address::{Address, LinearMemory};
use serde::{Deserialize, Serialize};

/// Field offsets of a string object, relative to its address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringLayout {
    /// Offset of the length word
    pub length_offset: i32,
    /// Offset of the first code unit
    pub chars_offset: i32,
}

impl Default for StringLayout {
    fn default() -> Self {
        // [header word][length word][code units...]
        Self {
            length_offset: 4,
            chars_offset: 8,
        }
    }
}

impl StringLayout {
    /// Bytes needed for a string of `len` code units
    pub fn object_size(&self, len: u32) -> u32 {
        self.chars_offset as u32 + len * 2
    }
}

/// Rolling `31 * h + unit` hash with wrapping arithmetic
pub fn hash_units(units: impl IntoIterator<Item = u16>) -> i32 {
    units
        .into_iter()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Read-only view of a string object
#[derive(Clone, Copy)]
pub struct StringView<'m> {
    memory: &'m LinearMemory,
    object: Address,
    chars: Address,
    len: u32,
}

impl<'m> StringView<'m> {
    /// Overlay the string object at `object`
    pub fn new(memory: &'m LinearMemory, object: Address, layout: &StringLayout) -> Self {
        let len = memory.get_word(object + layout.length_offset) as u32;
        Self {
            memory,
            object,
            chars: object + layout.chars_offset,
            len,
        }
    }

    /// Address of the string object
    pub fn address(&self) -> Address {
        self.object
    }

    /// Number of code units
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Check for the empty string
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Code unit at `index`
    pub fn unit(&self, index: u32) -> u16 {
        self.memory.get_char(self.chars + (index * 2) as i32)
    }

    /// Iterate code units in order
    pub fn units(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.len).map(move |i| self.unit(i))
    }

    /// Content hash, see [`hash_units`]
    pub fn hash_code(&self) -> i32 {
        hash_units(self.units())
    }

    /// Length and code-unit equality with another string
    pub fn content_eq(&self, other: &StringView<'_>) -> bool {
        self.len == other.len && self.units().eq(other.units())
    }

    /// Length and code-unit equality with a host slice
    pub fn eq_units(&self, units: &[u16]) -> bool {
        self.len as usize == units.len() && self.units().eq(units.iter().copied())
    }

    /// Decode as UTF-16, replacing unpaired surrogates
    pub fn to_string_lossy(&self) -> String {
        char::decode_utf16(self.units())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl std::fmt::Debug for StringView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringView")
            .field("address", &self.object)
            .field("value", &self.to_string_lossy())
            .finish()
    }
}

/// Lay out a string object at `at` (test and producer helper)
pub fn write_string(memory: &mut LinearMemory, at: Address, layout: &StringLayout, text: &str) {
    let units: Vec<u16> = text.encode_utf16().collect();
    memory.put_word(at + layout.length_offset, units.len() as i32);
    let chars = at + layout.chars_offset;
    for (i, unit) in units.into_iter().enumerate() {
        memory.put_char(chars + (i as i32) * 2, unit);
    }
}
