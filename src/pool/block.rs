//! A block: one slab of slot storage shared by `WORD_BITS` pools.

use core::alloc::Layout;
use core::mem;
use core::ptr::NonNull;

use crate::bits::{BitWord, Word, WORD_BITS};
use crate::core::config::PoolConfig;
use crate::core::error::{PoolError, PoolResult};

use super::bitmap::SlotBitmap;

/// Contiguous run of [`Block::POOL_COUNT`] pools allocated as a unit.
///
/// Slot storage is a single raw slab addressed only through raw pointers,
/// so no Rust reference ever covers memory a caller owns. The per-pool
/// bitmaps and the unmaxed-pools word live beside the slab in ordinary
/// owned memory. Pool `i` owns the `i`-th window of
/// [`SlotBitmap::SLOT_COUNT`] slots.
pub(crate) struct Block<T> {
    slab: NonNull<T>,
    slab_layout: Layout,
    /// Bit `i` set while pool `i` still has a free slot.
    unmaxed_pools: Word,
    bitmaps: Box<[SlotBitmap; WORD_BITS]>,
}

impl<T> Block<T> {
    /// Pools per block.
    pub(crate) const POOL_COUNT: usize = WORD_BITS;

    /// Slots per block.
    pub(crate) const SLOT_COUNT: usize = SlotBitmap::SLOT_COUNT * Self::POOL_COUNT;

    /// Maps storage for a fresh block with every slot free.
    pub(crate) fn new(config: &PoolConfig) -> PoolResult<Self> {
        let slab_layout = Layout::array::<T>(Self::SLOT_COUNT)
            .map_err(|_| PoolError::size_overflow("block slab layout"))?;

        // Zero-sized element types are rejected by the multi-pool
        // constructor, so the slab is never empty.
        debug_assert!(slab_layout.size() > 0);

        // SAFETY: the layout has nonzero size.
        let raw = unsafe { std::alloc::alloc(slab_layout) };
        let Some(slab) = NonNull::new(raw.cast::<T>()) else {
            return Err(PoolError::out_of_memory(slab_layout));
        };

        if let Some(pattern) = config.alloc_pattern {
            // SAFETY: `raw` was just allocated with `slab_layout`.
            unsafe { std::ptr::write_bytes(raw, pattern, slab_layout.size()) };
        }

        Ok(Self {
            slab,
            slab_layout,
            unmaxed_pools: Word::ALL,
            bitmaps: Box::new([SlotBitmap::FREE; WORD_BITS]),
        })
    }

    /// True while at least one pool has a free slot.
    #[inline]
    pub(crate) fn has_space(&self) -> bool {
        self.unmaxed_pools != Word::ZERO
    }

    /// Claims the lowest free slot of the lowest unmaxed pool.
    ///
    /// Precondition: [`Block::has_space`].
    pub(crate) fn allocate(&mut self) -> NonNull<T> {
        debug_assert!(self.has_space());

        let pool = self.unmaxed_pools.ctz() as usize;
        let bitmap = &mut self.bitmaps[pool];
        let slot = bitmap.acquire();
        if bitmap.is_full() {
            self.unmaxed_pools.clear_bit(pool as u32);
        }

        self.slot_ptr(pool * SlotBitmap::SLOT_COUNT + slot)
    }

    /// Releases `ptr` if it belongs to this block's slab.
    ///
    /// Returns `false` without touching any state when the pointer points
    /// elsewhere, so the multi-pool can keep scanning for the owner.
    pub(crate) fn try_deallocate(&mut self, ptr: NonNull<T>) -> bool {
        let base = self.slab.as_ptr() as usize;
        let offset = (ptr.as_ptr() as usize).wrapping_sub(base);
        if offset >= self.slab_layout.size() {
            return false;
        }

        debug_assert!(
            offset % mem::size_of::<T>() == 0,
            "pointer does not sit on a slot boundary"
        );
        let index = offset / mem::size_of::<T>();
        let pool = index / SlotBitmap::SLOT_COUNT;

        self.bitmaps[pool].release(index % SlotBitmap::SLOT_COUNT);
        self.unmaxed_pools.set_bit(pool as u32);
        true
    }

    /// Number of free slots across every pool.
    pub(crate) fn free_slots(&self) -> usize {
        self.bitmaps.iter().map(SlotBitmap::free_slots).sum()
    }

    /// Checks every pool's tier correspondence and the unmaxed-pools word
    /// against the pools' actual occupancy.
    pub(crate) fn bitmaps_consistent(&self) -> bool {
        self.bitmaps.iter().enumerate().all(|(pool, bitmap)| {
            bitmap.tiers_consistent()
                && self.unmaxed_pools.test_bit(pool as u32) == !bitmap.is_full()
        })
    }

    #[inline]
    fn slot_ptr(&self, index: usize) -> NonNull<T> {
        debug_assert!(index < Self::SLOT_COUNT);
        // SAFETY: `index` addresses into the slab allocation.
        unsafe { NonNull::new_unchecked(self.slab.as_ptr().add(index)) }
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        // SAFETY: `slab` was allocated in `new` with `slab_layout`.
        unsafe { std::alloc::dealloc(self.slab.as_ptr().cast(), self.slab_layout) };
    }
}

// SAFETY: the slab is exclusively owned raw storage; the block never reads
// or drops a `T`, so there is no `T`-shaped state to race on.
unsafe impl<T> Send for Block<T> {}
