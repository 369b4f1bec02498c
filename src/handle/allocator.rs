//! The stateless per-type allocator handle.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

use crate::core::error::{PoolError, PoolResult};
use crate::core::traits::RawAllocator;

use super::registry;

/// Stateless, copyable handle to the process-wide pool for `T`.
///
/// Every handle for a given `T` refers to the same mutex-guarded
/// [`MultiPool`](crate::pool::MultiPool): a slot allocated through one
/// handle may be released through any other, and all handles for `T`
/// compare equal. Handles for different element types share no state and
/// never contend with each other.
///
/// The backing pool is created lazily by the first operation through any
/// handle for `T` and lives for the rest of the process.
pub struct PoolAllocator<T: 'static> {
    _element: PhantomData<fn() -> T>,
}

impl<T: 'static> PoolAllocator<T> {
    /// Creates a handle. This is free; no pool is touched until the first
    /// allocation.
    #[inline]
    pub const fn new() -> Self {
        Self {
            _element: PhantomData,
        }
    }

    /// Returns storage for exactly one `T` from the shared pool.
    ///
    /// The slot is uninitialized; the caller writes a value before reading.
    /// There is no multi-element form.
    ///
    /// # Errors
    ///
    /// The only failure is the backing allocator refusing a new block.
    pub fn allocate(&self) -> PoolResult<NonNull<T>> {
        let shared = registry::shared_pool::<T>()?;
        let mut pool = shared.lock();
        pool.allocate()
    }

    /// Releases a slot obtained from any handle for `T`.
    ///
    /// # Contract
    ///
    /// `ptr` must have been returned by a `PoolAllocator::<T>::allocate`
    /// call and must not have been released since.
    pub fn deallocate(&self, ptr: NonNull<T>) {
        match registry::shared_pool::<T>() {
            Ok(shared) => shared.lock().deallocate(ptr),
            // A live pointer cannot predate its pool; only reachable by
            // handing a foreign pointer to a fresh process state.
            Err(_) => debug_assert!(false, "deallocate without a live pool"),
        }
    }

    /// Handle for another element type, backed by that type's own pool.
    #[inline]
    pub const fn rebind<U: 'static>(&self) -> PoolAllocator<U> {
        PoolAllocator::new()
    }
}

impl<T: 'static> Clone for PoolAllocator<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for PoolAllocator<T> {}

impl<T: 'static> Default for PoolAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> PartialEq for PoolAllocator<T> {
    /// All handles for one element type are interchangeable.
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: 'static> Eq for PoolAllocator<T> {}

impl<T: 'static> fmt::Debug for PoolAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolAllocator<{}>", core::any::type_name::<T>())
    }
}

// SAFETY: slots come from the shared multi-pool for `T`: valid for
// `size_of::<T>()` bytes, aligned to `align_of::<T>()`, exclusive until
// deallocated through any equal handle.
unsafe impl<T: 'static> RawAllocator for PoolAllocator<T> {
    unsafe fn allocate(&self, layout: Layout) -> PoolResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(NonNull::slice_from_raw_parts(NonNull::dangling(), 0));
        }

        // Multi-element and over-aligned requests fall outside the
        // single-slot contract.
        if layout.size() > mem::size_of::<T>() || layout.align() > mem::align_of::<T>() {
            return Err(PoolError::invalid_layout("layout exceeds one pool slot"));
        }

        let slot = self.allocate()?;
        Ok(NonNull::slice_from_raw_parts(slot.cast::<u8>(), layout.size()))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        self.deallocate(ptr.cast::<T>());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_equal_and_copy() {
        struct Node(#[allow(dead_code)] [u64; 2]);

        let a = PoolAllocator::<Node>::new();
        let b = a;
        assert_eq!(a, b);
        assert_eq!(a, PoolAllocator::<Node>::default());
    }

    #[test]
    fn rebind_targets_the_other_pool() {
        struct Key(#[allow(dead_code)] u32);
        struct Value(#[allow(dead_code)] u64);

        let keys = PoolAllocator::<Key>::new();
        let values: PoolAllocator<Value> = keys.rebind();

        let key_slot = keys.allocate().unwrap();
        let value_slot = values.allocate().unwrap();
        assert_ne!(key_slot.as_ptr() as usize, value_slot.as_ptr() as usize);

        keys.deallocate(key_slot);
        values.deallocate(value_slot);
    }

    #[test]
    fn raw_allocator_enforces_the_slot_layout() {
        struct Node(#[allow(dead_code)] u64);

        let handle = PoolAllocator::<Node>::new();

        unsafe {
            let oversized = Layout::new::<[Node; 2]>();
            assert!(RawAllocator::allocate(&handle, oversized).is_err());

            let fits = Layout::new::<u32>();
            let grant = RawAllocator::allocate(&handle, fits).unwrap();
            assert_eq!(grant.len(), 4);
            RawAllocator::deallocate(&handle, grant.cast(), fits);

            let empty = Layout::new::<()>();
            let grant = RawAllocator::allocate(&handle, empty).unwrap();
            assert_eq!(grant.len(), 0);
            RawAllocator::deallocate(&handle, grant.cast(), empty);
        }
    }
}
