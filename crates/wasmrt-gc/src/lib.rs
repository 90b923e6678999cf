//! # wasmrt GC support
//!
//! The compilation target has no way to inspect its own call stack, so
//! generated code keeps a parallel *shadow stack* of frames in linear
//! memory. Each frame records the heap references a function holds across
//! calls, plus a handler id used when resuming after a non-native unwind.
//!
//! ## Design
//!
//! - **Stack context**: [`ShadowStack`] owns the top pointer for one region;
//!   there is no global state, so isolated runtimes can share a process
//! - **Implicit release**: restoring a saved top pointer frees every later
//!   frame at once, like returning from ordinary calls
//! - **Root discovery only**: [`collect_roots`] reports root slots; tracing
//!   and marking belong to the collector

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod roots;
pub mod shadow_stack;
pub mod unwind;

pub use error::{StackError, StackResult};
pub use roots::{RootSet, RootSlot, collect_roots};
pub use shadow_stack::{Frame, Frames, ShadowStack, StackMark};
pub use unwind::unwind_to_handler;
