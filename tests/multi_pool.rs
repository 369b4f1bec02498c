//! Integration tests for the stateful multi-pool surface.

use std::mem;
use std::ptr::NonNull;

use multipool::{MemoryUsage, MultiPool, PoolConfig};

type Node = [u64; 2];

const POOL_CAPACITY: usize = MultiPool::<Node>::POOL_CAPACITY;
const BLOCK_CAPACITY: usize = MultiPool::<Node>::BLOCK_CAPACITY;

#[test]
fn single_alloc_free_returns_the_same_slot() {
    let mut pool = MultiPool::<Node>::new().expect("failed to create pool");

    let first = pool.allocate().expect("allocation failed");
    pool.deallocate(first);
    let second = pool.allocate().expect("allocation failed");

    assert_eq!(first, second);
    pool.deallocate(second);
    assert!(pool.is_empty());
    assert!(pool.verify_bitmaps());
}

#[test]
fn slots_can_be_written_and_read_back() {
    let mut pool = MultiPool::<Node>::new().expect("failed to create pool");

    let mut slots = Vec::new();
    for i in 0..64u64 {
        let slot = pool.allocate().expect("allocation failed");
        unsafe { slot.as_ptr().write([i, i * 3]) };
        slots.push(slot);
    }

    for (i, slot) in slots.iter().enumerate() {
        let value = unsafe { slot.as_ptr().read() };
        assert_eq!(value, [i as u64, i as u64 * 3]);
    }

    for slot in slots {
        pool.deallocate(slot);
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn filling_one_pool_moves_on_to_the_next() {
    let mut pool = MultiPool::<Node>::new().expect("failed to create pool");

    let base = pool.allocate().expect("allocation failed");
    let base_addr = base.as_ptr() as usize;

    // The first pool hands out its slots densely from the low end.
    for i in 1..POOL_CAPACITY {
        let slot = pool.allocate().expect("allocation failed");
        assert_eq!(
            slot.as_ptr() as usize,
            base_addr + i * mem::size_of::<Node>()
        );
    }

    // The next grant opens the second pool of the same block.
    let overflow = pool.allocate().expect("allocation failed");
    assert_eq!(
        overflow.as_ptr() as usize,
        base_addr + POOL_CAPACITY * mem::size_of::<Node>()
    );
    assert_eq!(pool.block_count(), 1);
    assert!(pool.verify_bitmaps());
}

#[test]
#[cfg_attr(miri, ignore)]
fn filling_one_block_appends_a_second() {
    let mut pool = MultiPool::<Node>::new().expect("failed to create pool");

    let mut first = None;
    for _ in 0..BLOCK_CAPACITY {
        let slot = pool.allocate().expect("allocation failed");
        first.get_or_insert(slot);
    }
    assert_eq!(pool.block_count(), 1);
    assert_eq!(pool.free_slots(), 0);

    let overflow = pool.allocate().expect("allocation failed");
    assert_eq!(pool.block_count(), 2);

    // The overflow slot lives outside the first block's slab.
    let first_base = first.unwrap().as_ptr() as usize;
    let first_end = first_base + BLOCK_CAPACITY * mem::size_of::<Node>();
    let overflow_addr = overflow.as_ptr() as usize;
    assert!(overflow_addr < first_base || overflow_addr >= first_end);
    assert!(pool.verify_bitmaps());
}

#[test]
#[cfg_attr(miri, ignore)]
fn freeing_the_last_slot_of_a_full_pool_reopens_it() {
    let mut pool = MultiPool::<Node>::new().expect("failed to create pool");

    let mut slots = Vec::with_capacity(POOL_CAPACITY);
    for _ in 0..POOL_CAPACITY {
        slots.push(pool.allocate().expect("allocation failed"));
    }

    let last = slots.pop().unwrap();
    pool.deallocate(last);

    // The freed slot is the lowest free index again.
    let again = pool.allocate().expect("allocation failed");
    assert_eq!(again, last);

    pool.deallocate(again);
    for slot in slots {
        pool.deallocate(slot);
    }
    assert!(pool.is_empty());
    assert!(pool.verify_bitmaps());
}

#[test]
#[cfg_attr(miri, ignore)]
fn dense_churn_returns_to_the_initial_state() {
    let mut pool = MultiPool::<Node>::new().expect("failed to create pool");
    let nodes = 3 * POOL_CAPACITY + 17;

    let mut held: Vec<NonNull<Node>> = Vec::with_capacity(nodes);
    for run in 0..16 {
        for i in 0..nodes {
            let slot = pool.allocate().expect("allocation failed");
            unsafe { slot.as_ptr().write([run, i as u64]) };
            held.push(slot);
        }
        for slot in held.drain(..) {
            pool.deallocate(slot);
        }

        assert!(pool.is_empty());
        assert_eq!(pool.free_slots(), pool.capacity());
        assert!(pool.verify_bitmaps());
    }

    // Growth happened once; churn never allocates past the peak again.
    let stats = pool.stats().expect("stats are on by default");
    assert_eq!(stats.blocks, pool.block_count());
    assert_eq!(stats.peak_live_slots, nodes);
    assert_eq!(stats.total_allocs, 16 * nodes as u64);
    assert_eq!(stats.total_allocs, stats.total_deallocs);
}

#[test]
fn memory_usage_follows_live_slots() {
    let mut pool = MultiPool::<Node>::with_config(PoolConfig::default())
        .expect("failed to create pool");

    assert_eq!(pool.used_memory(), 0);
    let slot = pool.allocate().expect("allocation failed");
    assert_eq!(pool.used_memory(), mem::size_of::<Node>());
    assert_eq!(
        pool.total_memory(),
        Some(BLOCK_CAPACITY * mem::size_of::<Node>())
    );

    pool.deallocate(slot);
    assert_eq!(pool.used_memory(), 0);
}
