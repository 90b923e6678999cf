//! Bump heap for runtime-created objects

use crate::error::{RuntimeError, RuntimeResult};
use wasmrt_core::{Address, align_address, align_int};

/// Bump allocator over a fixed range of linear memory
///
/// Objects are never freed individually; reclaiming them is the
/// collector's job and out of scope here.
#[derive(Debug, Clone)]
pub struct Heap {
    start: Address,
    next: Address,
    end: Address,
    alignment: i32,
}

impl Heap {
    /// Heap over `[start, end)` with every allocation aligned to `alignment`
    pub fn new(start: Address, end: Address, alignment: i32) -> RuntimeResult<Self> {
        let start = align_address(start, alignment)?;
        Ok(Self {
            start,
            next: start,
            end,
            alignment,
        })
    }

    /// Reserve `size` bytes
    pub fn allocate(&mut self, size: u32) -> RuntimeResult<Address> {
        let aligned = if size > i32::MAX as u32 {
            None
        } else {
            align_int(size as i32, self.alignment).ok()
        };
        let aligned = aligned.ok_or(RuntimeError::OutOfMemory { requested: size })?;
        let available = self.available();
        if aligned as u32 > available {
            return Err(RuntimeError::OutOfMemory { requested: size });
        }
        let ptr = self.next;
        self.next = self.next + aligned;
        Ok(ptr)
    }

    /// Bytes handed out so far
    pub fn allocated(&self) -> u32 {
        (self.next - self.start) as u32
    }

    /// Bytes left
    pub fn available(&self) -> u32 {
        self.end.offset().saturating_sub(self.next.offset())
    }

    /// First heap address
    pub fn start(&self) -> Address {
        self.start
    }
}
