//! Traits shared by the allocator surfaces.

use core::alloc::Layout;
use core::ptr::NonNull;

use super::error::PoolResult;

/// Byte-accounting view of an allocator.
///
/// Implemented by anything that can report how much of its backing storage
/// is handed out. The derived helpers are convenience only; `used_memory`
/// and `available_memory` are the ground truth.
pub trait MemoryUsage {
    /// Bytes currently handed out to callers.
    fn used_memory(&self) -> usize;

    /// Bytes still available without growing, if known.
    fn available_memory(&self) -> Option<usize>;

    /// Total capacity in bytes, if known.
    fn total_memory(&self) -> Option<usize> {
        self.available_memory()
            .map(|available| self.used_memory() + available)
    }

    /// Usage as a percentage of total capacity.
    ///
    /// Returns `None` when the total is unknown.
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }
}

/// Layout-based allocation surface.
///
/// This is the seam container-style clients program against: a request is a
/// [`Layout`], a grant is a byte span. Pool-backed implementors serve only
/// layouts that fit one slot and reject the rest, which is how the
/// no-multi-element contract is expressed at this level.
///
/// # Safety
///
/// Implementors must ensure that a successful `allocate` returns a pointer
/// that is valid for reads and writes of `layout.size()` bytes, aligned to
/// `layout.align()`, and exclusive until passed to `deallocate`.
pub unsafe trait RawAllocator {
    /// Allocates storage for `layout`.
    ///
    /// # Safety
    ///
    /// The returned storage is uninitialized; the caller must initialize it
    /// before reading and must not use it after deallocation.
    unsafe fn allocate(&self, layout: Layout) -> PoolResult<NonNull<[u8]>>;

    /// Releases storage obtained from `allocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on an equivalent
    /// allocator with the same `layout`, and must not have been released
    /// since. Double frees are undefined behavior.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}
