//! Handler lookup for non-native unwinding
//!
//! The unwind dispatcher decides what a handler id means. This module only
//! finds the newest frame whose id it accepts and makes that frame current.

use crate::shadow_stack::{Frame, ShadowStack};
use wasmrt_core::LinearMemory;

/// Unwind to the newest frame whose handler id satisfies `accepts`
///
/// Frames above the chosen one are released. Returns the frame and its id,
/// or `None` (leaving the stack untouched) when no frame accepts.
pub fn unwind_to_handler(
    stack: &mut ShadowStack,
    memory: &LinearMemory,
    mut accepts: impl FnMut(i32) -> bool,
) -> Option<(Frame, i32)> {
    let (frame, id) = stack
        .frames(memory)
        .map(|frame| (frame, stack.handler_id(memory, frame)))
        .find(|&(_, id)| accepts(id))?;
    // The frame came from the live walk, so it is at or below the top
    stack.unwind_to(frame).ok()?;
    tracing::trace!(
        target: "wasmrt::stack",
        frame = %frame.address(),
        handler = id,
        "unwound to handler frame"
    );
    Some((frame, id))
}
