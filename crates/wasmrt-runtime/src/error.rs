//! Runtime errors

use thiserror::Error;
use wasmrt_core::CoreError;
use wasmrt_gc::StackError;

/// Errors that can occur during runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Memory access or resource map error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Shadow stack error
    #[error(transparent)]
    Stack(#[from] StackError),

    /// The heap cannot satisfy an allocation
    #[error("Out of memory: cannot allocate {requested} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        requested: u32,
    },

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Indirect call through an empty table slot
    #[error("Unknown function table index: {0}")]
    UnknownFunction(i32),
}

impl From<serde_json::Error> for RuntimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for runtime operations
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
