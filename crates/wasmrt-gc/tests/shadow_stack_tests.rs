//! Shadow stack behaviour tests
//!
//! These drive the stack the way generated code and a collector do:
//! acquire frames on call, fill roots, walk from the top, release on return.

use wasmrt_core::{Address, LinearMemory};
use wasmrt_gc::{Frame, ShadowStack, StackError, collect_roots, unwind_to_handler};

const BASE: Address = Address::new(0x100);

fn new_stack(region: u32) -> (LinearMemory, ShadowStack) {
    let mut mem = LinearMemory::new(region + 0x200);
    let stack = ShadowStack::new(&mut mem, BASE, region).unwrap();
    (mem, stack)
}

fn walk_counts(stack: &ShadowStack, mem: &LinearMemory) -> Vec<u32> {
    stack
        .frames(mem)
        .map(|frame| stack.root_count(mem, frame))
        .collect()
}

#[test]
fn test_walk_is_lifo() {
    let sequences: [&[u32]; 4] = [&[3], &[0, 0, 0], &[1, 5, 0, 2, 7], &[16, 1, 1000, 4]];
    for counts in sequences {
        let (mut mem, mut stack) = new_stack(0x8000);
        for &n in counts {
            stack.acquire_frame(&mut mem, n).unwrap();
        }
        let expected: Vec<u32> = counts.iter().rev().copied().collect();
        assert_eq!(walk_counts(&stack, &mem), expected);

        // Manual walk ends in None after the oldest frame
        let mut frame = stack.current_top();
        let mut walked = 0;
        while let Some(f) = frame {
            walked += 1;
            frame = stack.parent_frame(&mem, f);
        }
        assert_eq!(walked, counts.len());
    }
}

#[test]
fn test_root_round_trip() {
    for n in [0u32, 1, 16, 1000] {
        let (mut mem, mut stack) = new_stack(0x8000);
        let roots = stack.acquire_frame(&mut mem, n).unwrap();
        for i in 0..n {
            mem.put_address(roots + (i * 4) as i32, Address::new(0x10_0000 + i * 8));
        }

        let frame = stack.current_top().unwrap();
        assert_eq!(stack.root_count(&mem, frame), n);
        let base = stack.root_array_base(&mem, frame);
        assert_eq!(base, roots);
        for i in 0..n {
            assert_eq!(
                mem.get_address(base + (i * 4) as i32),
                Address::new(0x10_0000 + i * 8)
            );
            assert_eq!(stack.root(&mem, frame, i), Address::new(0x10_0000 + i * 8));
        }
    }
}

#[test]
fn test_handler_id_isolation() {
    let (mut mem, mut stack) = new_stack(0x1000);
    let mut frames: Vec<Frame> = Vec::new();
    for (i, n) in [2u32, 0, 3, 1].into_iter().enumerate() {
        stack.acquire_frame(&mut mem, n).unwrap();
        let frame = stack.current_top().unwrap();
        stack.set_handler_id(&mut mem, frame, 100 + i as i32);
        frames.push(frame);
    }

    for (i, &frame) in frames.iter().enumerate() {
        stack.set_handler_id(&mut mem, frame, -1 - i as i32);
        for (j, &other) in frames.iter().enumerate() {
            let expected = if j <= i { -1 - j as i32 } else { 100 + j as i32 };
            assert_eq!(stack.handler_id(&mem, other), expected);
        }
    }

    // Handler ids never leak into root slots or counts
    assert_eq!(walk_counts(&stack, &mem), vec![1, 3, 0, 2]);
    assert_eq!(collect_roots(&stack, &mem).objects(), &[] as &[Address]);
}

#[test]
fn test_release_by_restoring_top() {
    let (mut mem, mut stack) = new_stack(0x1000);
    stack.acquire_frame(&mut mem, 2).unwrap();
    let caller = stack.current_top().unwrap();
    stack.set_root(&mut mem, caller, 0, Address::new(0xAAA0));

    let saved = stack.mark();
    for n in [4, 4, 4] {
        let roots = stack.acquire_frame(&mut mem, n).unwrap();
        mem.put_address(roots, Address::new(0xBBB0));
    }
    assert!(collect_roots(&stack, &mem).contains(Address::new(0xBBB0)));

    stack.restore(saved).unwrap();
    assert_eq!(stack.current_top(), Some(caller));
    let roots = collect_roots(&stack, &mem);
    assert_eq!(roots.objects(), &[Address::new(0xAAA0)]);
    assert!(!roots.contains(Address::new(0xBBB0)));

    // The region is reusable after release
    stack.acquire_frame(&mut mem, 1).unwrap();
    assert_eq!(walk_counts(&stack, &mem), vec![1, 2]);
}

#[test]
fn test_unwind_then_continue() {
    let (mut mem, mut stack) = new_stack(0x1000);
    stack.acquire_frame(&mut mem, 1).unwrap();
    let catcher = stack.current_top().unwrap();
    stack.set_handler_id(&mut mem, catcher, 7);
    stack.acquire_frame(&mut mem, 0).unwrap();
    let thrower = stack.current_top().unwrap();
    stack.set_handler_id(&mut mem, thrower, 0);

    let (frame, id) = unwind_to_handler(&mut stack, &mem, |id| id == 7).unwrap();
    assert_eq!((frame, id), (catcher, 7));
    assert_eq!(stack.frames(&mem).count(), 1);
}

#[test]
fn test_exhaustion_is_reported() {
    let (mut mem, mut stack) = new_stack(256);
    let mut acquired = 0;
    loop {
        match stack.acquire_frame(&mut mem, 6) {
            Ok(_) => acquired += 1,
            Err(StackError::Overflow { requested, .. }) => {
                assert_eq!(requested, 6);
                break;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    // 252 usable bytes, 32 per frame
    assert_eq!(acquired, 7);
    assert_eq!(walk_counts(&stack, &mem), vec![6; 7]);
}

#[test]
fn test_isolated_stacks() {
    let (mut mem_a, mut a) = new_stack(0x400);
    let (mut mem_b, mut b) = new_stack(0x400);
    a.acquire_frame(&mut mem_a, 1).unwrap();
    b.acquire_frame(&mut mem_b, 2).unwrap();
    b.acquire_frame(&mut mem_b, 3).unwrap();
    assert_eq!(walk_counts(&a, &mem_a), vec![1]);
    assert_eq!(walk_counts(&b, &mem_b), vec![3, 2]);
}
