//! Core errors

use crate::address::Address;
use thiserror::Error;

/// Errors reported by checked memory access and resource map construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Alignment must be a positive integer
    #[error("Invalid alignment: {0}")]
    InvalidAlignment(i32),

    /// Access outside the linear memory
    #[error("Out of bounds access of {len} bytes at {address} (memory size {size})")]
    OutOfBounds {
        /// First byte of the access
        address: Address,
        /// Width of the access in bytes
        len: u32,
        /// Size of the memory in bytes
        size: u32,
    },

    /// Resource map capacity must be positive
    #[error("Invalid resource map capacity: {0}")]
    InvalidCapacity(i32),

    /// Inserting would leave no empty slot to terminate absent-key probes
    #[error("Resource map is full (capacity {capacity})")]
    ResourceMapFull {
        /// Capacity of the map
        capacity: i32,
    },

    /// A key equal to this one is already present
    #[error("Duplicate resource map key at {0}")]
    DuplicateKey(Address),

    /// The null address marks empty slots and cannot be used as a key
    #[error("Null resource map key")]
    NullKey,
}

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
