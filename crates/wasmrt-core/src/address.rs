//! Linear-memory address model
//!
//! An [`Address`] is an untyped byte offset into a [`LinearMemory`]. All
//! arithmetic is in bytes; callers scale by [`WORD_SIZE`](crate::WORD_SIZE)
//! themselves. Multi-byte values are stored little-endian, matching the
//! WebAssembly memory model.
//!
//! Plain loads and stores treat an out-of-range address as a broken
//! invariant and panic, the same way slice indexing does. The `try_*`
//! variants report [`CoreError::OutOfBounds`] instead.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::ops::{Add, Range, Sub};

/// A 32-bit position in linear memory
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Address(u32);

impl Address {
    /// The null address
    pub const NULL: Address = Address(0);

    /// Size of an address when stored in memory
    pub const SIZE: u32 = crate::WORD_SIZE;

    /// Create from a raw offset
    #[inline]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Reinterpret a signed integer as an address
    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self(value as u32)
    }

    /// Reinterpret the address as a signed integer
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 as i32
    }

    /// Raw unsigned offset
    #[inline]
    pub const fn offset(self) -> u32 {
        self.0
    }

    /// Check for the null address
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Address `bytes` away from this one (wrapping)
    #[inline]
    pub const fn offset_by(self, bytes: i32) -> Self {
        Self(self.0.wrapping_add_signed(bytes))
    }

    /// `None` for the null address
    #[inline]
    pub const fn non_null(self) -> Option<Self> {
        if self.is_null() { None } else { Some(self) }
    }
}

impl Add<i32> for Address {
    type Output = Address;

    #[inline]
    fn add(self, bytes: i32) -> Address {
        self.offset_by(bytes)
    }
}

impl Sub<Address> for Address {
    type Output = i32;

    /// Signed byte distance between two addresses
    #[inline]
    fn sub(self, other: Address) -> i32 {
        self.0.wrapping_sub(other.0) as i32
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Owned linear memory
///
/// The single substrate for the shadow stack, string objects and resource
/// maps. One instance per isolated runtime; nothing here is shared.
#[derive(Clone)]
pub struct LinearMemory {
    bytes: Vec<u8>,
}

impl LinearMemory {
    /// Create a zero-filled memory of `size` bytes
    pub fn new(size: u32) -> Self {
        Self {
            bytes: vec![0u8; size as usize],
        }
    }

    /// Size in bytes
    #[inline]
    pub fn size(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Byte range for an access, or an error if any byte falls outside
    pub fn range(&self, address: Address, len: u32) -> CoreResult<Range<usize>> {
        let start = address.offset() as usize;
        match start.checked_add(len as usize) {
            Some(end) if end <= self.bytes.len() => Ok(start..end),
            _ => Err(CoreError::OutOfBounds {
                address,
                len,
                size: self.size(),
            }),
        }
    }

    #[inline]
    fn load<const N: usize>(&self, address: Address) -> [u8; N] {
        let start = address.offset() as usize;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.bytes[start..start + N]);
        buf
    }

    #[inline]
    fn store<const N: usize>(&mut self, address: Address, value: [u8; N]) {
        let start = address.offset() as usize;
        self.bytes[start..start + N].copy_from_slice(&value);
    }

    /// Load a byte
    #[inline]
    pub fn get_byte(&self, address: Address) -> u8 {
        self.bytes[address.offset() as usize]
    }

    /// Store a byte
    #[inline]
    pub fn put_byte(&mut self, address: Address, value: u8) {
        self.bytes[address.offset() as usize] = value;
    }

    /// Load a 4-byte word
    #[inline]
    pub fn get_word(&self, address: Address) -> i32 {
        i32::from_le_bytes(self.load(address))
    }

    /// Store a 4-byte word
    #[inline]
    pub fn put_word(&mut self, address: Address, value: i32) {
        self.store(address, value.to_le_bytes());
    }

    /// Load a 16-bit code unit
    #[inline]
    pub fn get_char(&self, address: Address) -> u16 {
        u16::from_le_bytes(self.load(address))
    }

    /// Store a 16-bit code unit
    #[inline]
    pub fn put_char(&mut self, address: Address, value: u16) {
        self.store(address, value.to_le_bytes());
    }

    /// Load an address-sized word as an [`Address`]
    #[inline]
    pub fn get_address(&self, address: Address) -> Address {
        Address::new(u32::from_le_bytes(self.load(address)))
    }

    /// Store an [`Address`]
    #[inline]
    pub fn put_address(&mut self, address: Address, value: Address) {
        self.store(address, value.offset().to_le_bytes());
    }

    /// Checked word load
    pub fn try_get_word(&self, address: Address) -> CoreResult<i32> {
        self.range(address, 4)?;
        Ok(self.get_word(address))
    }

    /// Checked word store
    pub fn try_put_word(&mut self, address: Address, value: i32) -> CoreResult<()> {
        self.range(address, 4)?;
        self.put_word(address, value);
        Ok(())
    }

    /// Checked address load
    pub fn try_get_address(&self, address: Address) -> CoreResult<Address> {
        self.range(address, Address::SIZE)?;
        Ok(self.get_address(address))
    }

    /// Set `count` bytes starting at `address` to `value`
    pub fn fill(&mut self, address: Address, value: u8, count: u32) -> CoreResult<()> {
        let range = self.range(address, count)?;
        self.bytes[range].fill(value);
        Ok(())
    }

    /// Borrow `len` bytes starting at `address`
    pub fn slice(&self, address: Address, len: u32) -> CoreResult<&[u8]> {
        let range = self.range(address, len)?;
        Ok(&self.bytes[range])
    }

    /// Copy `data` into memory at `address`
    pub fn write_bytes(&mut self, address: Address, data: &[u8]) -> CoreResult<()> {
        let range = self.range(address, data.len() as u32)?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

impl fmt::Debug for LinearMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearMemory")
            .field("size", &self.bytes.len())
            .finish()
    }
}
