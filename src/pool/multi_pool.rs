//! The multi-pool: a growing sequence of blocks for one element type.

use core::fmt;
use core::mem;
use core::ptr::NonNull;

use crate::core::config::PoolConfig;
use crate::core::error::{PoolError, PoolResult};
use crate::core::traits::MemoryUsage;

use super::bitmap::SlotBitmap;
use super::block::Block;
use super::stats::MultiPoolStats;

/// Fixed-size slot allocator for values of type `T`.
///
/// A multi-pool owns an append-only sequence of [blocks](Block), each a
/// contiguous slab of [`MultiPool::BLOCK_CAPACITY`] slots split into pools
/// governed by two-tier bitmaps. Allocation claims the lowest free slot of
/// the newest block with space, appending a block when every pool is full;
/// deallocation locates the owning block by pointer range, so slots carry
/// no per-object metadata at all.
///
/// Slots are raw storage: the pool neither constructs nor drops a `T`.
/// Storage is only released when the multi-pool itself is dropped; there is
/// no shrinking.
///
/// The multi-pool is a single-owner value (`&mut self` operations). The
/// process-wide, mutex-guarded instances behind
/// [`PoolAllocator`](crate::handle::PoolAllocator) are built on top of it.
pub struct MultiPool<T> {
    blocks: Vec<Block<T>>,
    config: PoolConfig,
    live_slots: usize,
    peak_live_slots: usize,
    total_allocs: u64,
    total_deallocs: u64,
}

impl<T> MultiPool<T> {
    /// Slots served by one pool before it reports full.
    pub const POOL_CAPACITY: usize = SlotBitmap::SLOT_COUNT;

    /// Slots added by each appended block.
    pub const BLOCK_CAPACITY: usize = Block::<T>::SLOT_COUNT;

    /// Creates a multi-pool with the default configuration and one block.
    ///
    /// # Errors
    ///
    /// Fails when `T` is zero-sized (the deallocation locator needs a
    /// nonzero slot stride) or when the first block cannot be mapped.
    pub fn new() -> PoolResult<Self> {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a multi-pool with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`MultiPool::new`].
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        if mem::size_of::<T>() == 0 {
            return Err(PoolError::invalid_layout("zero-sized element type"));
        }

        let mut pool = Self {
            blocks: Vec::new(),
            config,
            live_slots: 0,
            peak_live_slots: 0,
            total_allocs: 0,
            total_deallocs: 0,
        };
        pool.new_block()?;
        Ok(pool)
    }

    /// Returns storage for exactly one `T`.
    ///
    /// The slot is uninitialized raw storage; the caller writes a value
    /// before reading and owns the slot until it passes the pointer back to
    /// [`MultiPool::deallocate`]. There is no multi-element form.
    ///
    /// # Errors
    ///
    /// The only failure is the backing allocator refusing a new block.
    pub fn allocate(&mut self) -> PoolResult<NonNull<T>> {
        // Newest block first: it is the one most likely to have free pools,
        // which keeps the common-case scan at a single probe.
        if let Some(block) = self.blocks.iter_mut().rev().find(|block| block.has_space()) {
            let ptr = block.allocate();
            self.note_alloc();
            return Ok(ptr);
        }

        let ptr = self.new_block()?.allocate();
        self.note_alloc();
        Ok(ptr)
    }

    /// Releases a slot previously returned by [`MultiPool::allocate`].
    ///
    /// # Contract
    ///
    /// `ptr` must have come from this multi-pool and must not have been
    /// released since. A foreign pointer is debug-asserted and otherwise
    /// left alone.
    pub fn deallocate(&mut self, ptr: NonNull<T>) {
        let owned = self
            .blocks
            .iter_mut()
            .rev()
            .any(|block| block.try_deallocate(ptr));
        debug_assert!(owned, "pointer does not belong to this multi-pool");
        if !owned {
            return;
        }

        if let Some(pattern) = self.config.dealloc_pattern {
            // SAFETY: the slot was owned by this pool and is now free; its
            // storage stays mapped until the pool drops.
            unsafe {
                std::ptr::write_bytes(ptr.as_ptr().cast::<u8>(), pattern, mem::size_of::<T>());
            }
        }

        self.live_slots -= 1;
        if self.config.track_stats {
            self.total_deallocs += 1;
        }
    }

    /// Number of blocks currently owned.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total slot capacity across all blocks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks.len() * Self::BLOCK_CAPACITY
    }

    /// Slots currently handed out.
    #[inline]
    pub fn live_slots(&self) -> usize {
        self.live_slots
    }

    /// Slots available without growing.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.live_slots
    }

    /// True when no slot is handed out.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_slots == 0
    }

    /// Returns the active configuration.
    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns a statistics snapshot, or `None` when tracking is off.
    pub fn stats(&self) -> Option<MultiPoolStats> {
        self.config.track_stats.then(|| MultiPoolStats {
            total_allocs: self.total_allocs,
            total_deallocs: self.total_deallocs,
            live_slots: self.live_slots,
            peak_live_slots: self.peak_live_slots,
            blocks: self.blocks.len(),
            capacity: self.capacity(),
        })
    }

    /// Verifies the two-tier bookkeeping of every block against the slot
    /// accounting.
    ///
    /// Intended for tests and debug builds; cost is linear in capacity.
    pub fn verify_bitmaps(&self) -> bool {
        let free: usize = self.blocks.iter().map(Block::free_slots).sum();
        self.blocks.iter().all(Block::bitmaps_consistent) && free == self.free_slots()
    }

    fn new_block(&mut self) -> PoolResult<&mut Block<T>> {
        let block = Block::new(&self.config)?;
        self.blocks.push(block);

        #[cfg(feature = "logging")]
        tracing::trace!(
            element = core::any::type_name::<T>(),
            blocks = self.blocks.len(),
            "multipool grew by one block"
        );

        let newest = self.blocks.len() - 1;
        Ok(&mut self.blocks[newest])
    }

    #[inline]
    fn note_alloc(&mut self) {
        self.live_slots += 1;
        if self.live_slots > self.peak_live_slots {
            self.peak_live_slots = self.live_slots;
        }
        if self.config.track_stats {
            self.total_allocs += 1;
        }
    }
}

impl<T> MemoryUsage for MultiPool<T> {
    fn used_memory(&self) -> usize {
        self.live_slots * mem::size_of::<T>()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.free_slots() * mem::size_of::<T>())
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.capacity() * mem::size_of::<T>())
    }
}

impl<T> fmt::Debug for MultiPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiPool")
            .field("element", &core::any::type_name::<T>())
            .field("blocks", &self.blocks.len())
            .field("live_slots", &self.live_slots)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
