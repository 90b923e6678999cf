//! Shadow stack frames
//!
//! ## Frame layout
//!
//! Frames grow upward from the region base. The base holds a sentinel word
//! that plays the part of a root-count word for "no frame". A frame with
//! `N` roots pushed on top of `prev` (the previous top) occupies `N + 2`
//! words:
//!
//! ```text
//! prev            [root count of the parent frame, or base sentinel]
//! prev + 4        [handler id]
//! prev + 8        [root 0]          <- returned by acquire_frame
//! ...
//! prev + 4 + 4N   [root N-1]
//! prev + 8 + 4N   [root count = N]  <- frame reference, new top
//! ```
//!
//! A [`Frame`] is the address of its root-count word. Everything else is
//! derived from it: roots start `4N` bytes below, the handler id sits one
//! word below the roots, and the parent frame is `4(N + 2)` bytes below.
//! The word just above a frame's root count is the next frame's handler id
//! slot, so frames pack with no gaps.
//!
//! Inspection methods trust the frame reference: passing an address that is
//! not a live root-count word is a broken invariant, not an error.

use crate::error::{StackError, StackResult};
use wasmrt_core::{Address, LinearMemory, WORD_SIZE, align_address};

const WORD: i32 = WORD_SIZE as i32;

/// Reference to a frame: the address of its root-count word
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frame(Address);

impl Frame {
    /// Treat `address` as a frame reference
    pub const fn from_address(address: Address) -> Self {
        Self(address)
    }

    /// Address of the root-count word
    pub const fn address(self) -> Address {
        self.0
    }
}

/// Saved top pointer, see [`ShadowStack::mark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackMark(Address);

impl StackMark {
    /// The saved top address
    pub fn address(self) -> Address {
        self.0
    }
}

/// Stack context for one shadow stack region
///
/// Owns the mutable top pointer. The region's memory is passed in by the
/// caller, so the same context works against any [`LinearMemory`] that
/// holds the region.
#[derive(Debug, Clone)]
pub struct ShadowStack {
    base: Address,
    limit: Address,
    top: Address,
}

impl ShadowStack {
    /// Set up an empty region of `size` bytes at `base`
    ///
    /// Writes the base sentinel.
    pub fn new(memory: &mut LinearMemory, base: Address, size: u32) -> StackResult<Self> {
        if align_address(base, WORD).ok() != Some(base) || base.is_null() {
            return Err(StackError::Misaligned(base));
        }
        let end = base.offset() as u64 + size as u64;
        if size < WORD_SIZE || end > memory.size() as u64 {
            return Err(StackError::InvalidRegion {
                base,
                size,
                memory_size: memory.size(),
            });
        }
        memory.put_word(base, 0);
        tracing::debug!(
            target: "wasmrt::stack",
            base = %base,
            size,
            "shadow stack region initialized"
        );
        Ok(Self {
            base,
            limit: Address::new(end as u32),
            top: base,
        })
    }

    /// Address of the base sentinel
    pub fn base(&self) -> Address {
        self.base
    }

    /// One past the last byte of the region
    pub fn limit(&self) -> Address {
        self.limit
    }

    /// Current top pointer (the base sentinel when empty)
    pub fn top(&self) -> Address {
        self.top
    }

    /// Check for a stack with no frames
    pub fn is_empty(&self) -> bool {
        self.top == self.base
    }

    /// Bytes occupied by frames
    pub fn used_bytes(&self) -> u32 {
        (self.top - self.base) as u32
    }

    /// Bytes still free above the top
    pub fn available_bytes(&self) -> u64 {
        // The word at `top` is live, the next frame starts after it
        (self.limit.offset() as u64).saturating_sub(self.top.offset() as u64 + WORD_SIZE as u64)
    }

    /// Bytes a frame with `root_count` roots occupies
    pub const fn frame_size(root_count: u32) -> u64 {
        (root_count as u64 + 2) * WORD_SIZE as u64
    }

    /// Push a frame with `root_count` root slots
    ///
    /// Writes the root count, clears the root slots, advances the top and
    /// returns the address of root slot 0. The handler id is left as is
    /// until [`set_handler_id`](Self::set_handler_id).
    pub fn acquire_frame(&mut self, memory: &mut LinearMemory, root_count: u32) -> StackResult<Address> {
        let needed = Self::frame_size(root_count);
        let available = self.available_bytes();
        if needed > available {
            tracing::warn!(
                target: "wasmrt::stack",
                requested = root_count,
                needed,
                available,
                "shadow stack exhausted"
            );
            return Err(StackError::Overflow {
                requested: root_count,
                needed,
                available,
            });
        }

        let roots = self.top + 2 * WORD;
        let top = self.top + needed as i32;
        memory.fill(roots, 0, root_count * WORD_SIZE)?;
        memory.try_put_word(top, root_count as i32)?;
        self.top = top;

        tracing::trace!(
            target: "wasmrt::stack",
            frame = %top,
            roots = root_count,
            "acquired frame"
        );
        Ok(roots)
    }

    /// The active frame, or `None` when no frame is live
    pub fn current_top(&self) -> Option<Frame> {
        if self.is_empty() {
            None
        } else {
            Some(Frame(self.top))
        }
    }

    /// The frame that was current when `frame` was acquired
    pub fn parent_frame(&self, memory: &LinearMemory, frame: Frame) -> Option<Frame> {
        let size = Self::frame_size(self.root_count(memory, frame)) as i32;
        let parent = frame.0 + -size;
        if parent == self.base {
            None
        } else {
            Some(Frame(parent))
        }
    }

    /// Number of root slots in `frame`
    pub fn root_count(&self, memory: &LinearMemory, frame: Frame) -> u32 {
        memory.get_word(frame.0) as u32
    }

    /// Address of root slot 0 of `frame`
    pub fn root_array_base(&self, memory: &LinearMemory, frame: Frame) -> Address {
        let count = self.root_count(memory, frame) as i32;
        frame.0 + -(count * WORD)
    }

    fn root_slot(&self, memory: &LinearMemory, frame: Frame, index: u32) -> Address {
        let count = self.root_count(memory, frame);
        assert!(
            index < count,
            "root index {index} out of range for frame {} with {count} roots",
            frame.0
        );
        self.root_array_base(memory, frame) + index as i32 * WORD
    }

    /// Load root `index` of `frame`
    pub fn root(&self, memory: &LinearMemory, frame: Frame, index: u32) -> Address {
        memory.get_address(self.root_slot(memory, frame, index))
    }

    /// Store root `index` of `frame`
    pub fn set_root(&self, memory: &mut LinearMemory, frame: Frame, index: u32, value: Address) {
        let slot = self.root_slot(memory, frame, index);
        memory.put_address(slot, value);
    }

    fn handler_slot(&self, memory: &LinearMemory, frame: Frame) -> Address {
        self.root_array_base(memory, frame) + -WORD
    }

    /// Handler (call-site) id of `frame`
    ///
    /// Meaningless until set for this frame.
    pub fn handler_id(&self, memory: &LinearMemory, frame: Frame) -> i32 {
        memory.get_word(self.handler_slot(memory, frame))
    }

    /// Record which protected region `frame` is in
    pub fn set_handler_id(&self, memory: &mut LinearMemory, frame: Frame, id: i32) {
        let slot = self.handler_slot(memory, frame);
        memory.put_word(slot, id);
    }

    /// Save the top pointer
    pub fn mark(&self) -> StackMark {
        StackMark(self.top)
    }

    /// Release every frame acquired after `mark` was taken
    pub fn restore(&mut self, mark: StackMark) -> StackResult<()> {
        self.set_top(mark.0)
    }

    /// Make `frame` current again, releasing its descendants
    pub fn unwind_to(&mut self, frame: Frame) -> StackResult<()> {
        self.set_top(frame.0)
    }

    fn set_top(&mut self, target: Address) -> StackResult<()> {
        if target < self.base || target > self.top {
            return Err(StackError::InvalidRestore {
                target,
                base: self.base,
                top: self.top,
            });
        }
        tracing::trace!(
            target: "wasmrt::stack",
            from = %self.top,
            to = %target,
            released_bytes = (self.top - target) as u32,
            "released frames"
        );
        self.top = target;
        Ok(())
    }

    /// Walk frames from the current top down to the oldest
    pub fn frames<'a>(&'a self, memory: &'a LinearMemory) -> Frames<'a> {
        Frames {
            stack: self,
            memory,
            next: self.current_top(),
        }
    }
}

/// Iterator over live frames, newest first
pub struct Frames<'a> {
    stack: &'a ShadowStack,
    memory: &'a LinearMemory,
    next: Option<Frame>,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.next?;
        self.next = self.stack.parent_frame(self.memory, frame);
        Some(frame)
    }
}
