//! Shadow stack errors

use thiserror::Error;
use wasmrt_core::{Address, CoreError};

/// Errors reported by shadow stack management
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// The region cannot hold the requested frame
    #[error("Shadow stack overflow: frame with {requested} roots needs {needed} bytes, {available} available")]
    Overflow {
        /// Root count of the rejected frame
        requested: u32,
        /// Bytes the frame would occupy
        needed: u64,
        /// Bytes left in the region
        available: u64,
    },

    /// Restoring to a position that is not on the live stack
    #[error("Invalid shadow stack restore to {target} (base {base}, top {top})")]
    InvalidRestore {
        /// Requested top
        target: Address,
        /// Region base
        base: Address,
        /// Current top
        top: Address,
    },

    /// The region does not fit in linear memory
    #[error("Shadow stack region at {base} of {size} bytes exceeds memory of {memory_size} bytes")]
    InvalidRegion {
        /// Region base
        base: Address,
        /// Region size
        size: u32,
        /// Size of the linear memory
        memory_size: u32,
    },

    /// The region base is not word-aligned
    #[error("Misaligned shadow stack base: {0}")]
    Misaligned(Address),

    /// The region is not backed by the memory it was used with
    #[error(transparent)]
    Memory(#[from] CoreError),
}

/// Result type for shadow stack operations
pub type StackResult<T> = std::result::Result<T, StackError>;
