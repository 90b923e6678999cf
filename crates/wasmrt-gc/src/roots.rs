//! GC root enumeration
//!
//! Walks the shadow stack from the current top to the oldest frame and
//! reports every root slot. The mutator must be stopped while this runs:
//! a frame under construction is not safe to observe.

use crate::shadow_stack::{Frame, ShadowStack};
use rustc_hash::FxHashSet;
use wasmrt_core::{Address, LinearMemory};

/// One root slot found during a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSlot {
    /// Frame owning the slot
    pub frame: Frame,
    /// Index within the frame's root array
    pub index: u32,
    /// Address of the slot itself
    pub slot: Address,
    /// Reference stored in the slot (may be null)
    pub value: Address,
}

/// Root set collected from the shadow stack
///
/// Each slot is recorded exactly once. Objects referenced from several
/// slots appear once in [`objects`](Self::objects).
#[derive(Debug, Default, Clone)]
pub struct RootSet {
    slots: Vec<RootSlot>,
    objects: Vec<Address>,
    seen: FxHashSet<Address>,
    frame_count: usize,
}

impl RootSet {
    /// Every slot, newest frame first, slot order within a frame
    pub fn slots(&self) -> &[RootSlot] {
        &self.slots
    }

    /// Distinct non-null references, in discovery order
    pub fn objects(&self) -> &[Address] {
        &self.objects
    }

    /// Whether `object` is referenced from any slot
    pub fn contains(&self, object: Address) -> bool {
        self.seen.contains(&object)
    }

    /// Number of frames walked
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of slots recorded
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check for an empty root set
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn push(&mut self, slot: RootSlot) {
        if !slot.value.is_null() && self.seen.insert(slot.value) {
            self.objects.push(slot.value);
        }
        self.slots.push(slot);
    }
}

impl ShadowStack {
    /// Call `visitor` for every root slot of every live frame
    pub fn visit_roots(&self, memory: &LinearMemory, visitor: &mut dyn FnMut(&RootSlot)) {
        for frame in self.frames(memory) {
            let base = self.root_array_base(memory, frame);
            for index in 0..self.root_count(memory, frame) {
                let slot = base + (index * Address::SIZE) as i32;
                visitor(&RootSlot {
                    frame,
                    index,
                    slot,
                    value: memory.get_address(slot),
                });
            }
        }
    }
}

/// Collect the root set of `stack`
pub fn collect_roots(stack: &ShadowStack, memory: &LinearMemory) -> RootSet {
    let mut roots = RootSet {
        frame_count: stack.frames(memory).count(),
        ..RootSet::default()
    };
    stack.visit_roots(memory, &mut |slot| roots.push(*slot));
    tracing::debug!(
        target: "wasmrt::stack",
        frames = roots.frame_count,
        slots = roots.slots.len(),
        objects = roots.objects.len(),
        "collected shadow stack roots"
    );
    roots
}
