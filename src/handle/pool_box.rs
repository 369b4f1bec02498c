//! RAII owner of a single pool slot.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::core::error::PoolResult;

use super::allocator::PoolAllocator;

/// One value of `T` stored in the process-wide pool for `T`.
///
/// Behaves like `Box`, but the storage is a pool slot: dropping the box
/// drops the value in place and returns the slot for reuse.
pub struct PoolBox<T: 'static> {
    ptr: NonNull<T>,
}

impl<T: 'static> PoolBox<T> {
    /// Moves `value` into a freshly allocated pool slot.
    ///
    /// # Errors
    ///
    /// The only failure is the backing allocator refusing a new block.
    pub fn new(value: T) -> PoolResult<Self> {
        let slot = PoolAllocator::<T>::new().allocate()?;
        // SAFETY: `slot` is fresh, exclusive, properly aligned storage.
        unsafe { slot.as_ptr().write(value) };
        Ok(Self { ptr: slot })
    }

    /// Takes the value back out and returns the slot to the pool.
    pub fn into_inner(self) -> T {
        // SAFETY: `ptr` holds an initialized value that is read exactly
        // once; `forget` below keeps the drop impl from reading it again.
        let value = unsafe { ptr::read(self.ptr.as_ptr()) };
        PoolAllocator::<T>::new().deallocate(self.ptr);
        core::mem::forget(self);
        value
    }
}

impl<T: 'static> Deref for PoolBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the slot stays initialized and exclusively owned for the
        // lifetime of the box.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: 'static> DerefMut for PoolBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above, plus `&mut self` gives unique access.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: 'static> Drop for PoolBox<T> {
    fn drop(&mut self) {
        // SAFETY: the box owns an initialized value in a live slot.
        unsafe { ptr::drop_in_place(self.ptr.as_ptr()) };
        PoolAllocator::<T>::new().deallocate(self.ptr);
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for PoolBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// SAFETY: the box uniquely owns its slot and the value in it; moving or
// sharing the box is moving or sharing the value.
unsafe impl<T: Send + 'static> Send for PoolBox<T> {}
unsafe impl<T: Sync + 'static> Sync for PoolBox<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_derefs() {
        let mut boxed = PoolBox::new(41_u128).unwrap();
        assert_eq!(*boxed, 41);
        *boxed += 1;
        assert_eq!(*boxed, 42);
    }

    #[test]
    fn drop_runs_the_destructor() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Counted;
        impl Drop for Counted {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::Relaxed);
            }
        }

        drop(PoolBox::new(Counted).unwrap());
        assert_eq!(DROPS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn into_inner_skips_the_destructor_until_the_value_drops() {
        struct Payload(String);

        let boxed = PoolBox::new(Payload("node".to_owned())).unwrap();
        let payload = boxed.into_inner();
        assert_eq!(payload.0, "node");
    }

    #[test]
    fn slot_is_reused_after_drop() {
        struct Marker(#[allow(dead_code)] u64);

        let first = PoolBox::new(Marker(1)).unwrap();
        let addr = first.ptr.as_ptr() as usize;
        drop(first);

        let second = PoolBox::new(Marker(2)).unwrap();
        assert_eq!(second.ptr.as_ptr() as usize, addr);
    }
}
