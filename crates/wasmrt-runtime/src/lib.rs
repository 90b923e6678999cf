//! # wasmrt runtime
//!
//! One isolated runtime instance: a linear memory, its shadow stack, a
//! bump heap for runtime-created objects and the host embedding that
//! provides printing and indirect calls.
//!
//! Each instance is driven by a single thread of generated code. Instances
//! share nothing, so a process (or a test binary) may run several.

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod heap;
pub mod host;
pub mod runtime;

pub use config::RuntimeConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use heap::Heap;
pub use host::{CaptureHost, FunctionTable, Host, StdHost, TableFunction};
pub use runtime::Runtime;
