//! # wasmrt core
//!
//! Low-level primitives shared by every part of the wasmrt runtime.
//!
//! ## Contents
//!
//! - **Address model**: 32-bit linear-memory addresses and an owned,
//!   bounds-checked memory buffer with word, byte and code-unit access
//! - **Alignment**: rounding sizes and addresses up to an alignment
//! - **Intrinsics**: three-way comparisons and truncating float remainder
//! - **Strings**: a read-only overlay over string objects in linear memory
//! - **Resource maps**: read-only open-addressing tables emitted ahead of time

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod address;
pub mod align;
pub mod error;
pub mod intrinsics;
pub mod resource;
pub mod string;

pub use address::{Address, LinearMemory};
pub use align::{align_address, align_int};
pub use error::{CoreError, CoreResult};
pub use intrinsics::{
    compare_f32, compare_f64, compare_i32, compare_i64, compare_unsigned_i32,
    compare_unsigned_i64, remainder_f32, remainder_f64,
};
pub use resource::{ResourceMap, ResourceMapWriter};
pub use string::{StringLayout, StringView, hash_units, write_string};

/// Size of a machine word (and of an [`Address`]) in linear memory, in bytes
pub const WORD_SIZE: u32 = 4;
