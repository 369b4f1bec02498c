//! Process-wide registry of per-type shared pools.

use core::any::{Any, TypeId};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::core::error::PoolResult;
use crate::pool::MultiPool;

/// One registry slot: a leaked, mutex-guarded multi-pool, type-erased so a
/// single map can hold every element type.
type Shared = &'static (dyn Any + Send + Sync);

static REGISTRY: OnceCell<DashMap<TypeId, Shared>> = OnceCell::new();

fn registry() -> &'static DashMap<TypeId, Shared> {
    REGISTRY.get_or_init(DashMap::new)
}

/// Returns the process-wide pool for `T`, creating it on first use.
///
/// Creation runs under the map shard's write lock, so exactly one pool per
/// type ever exists and later callers observe the winner. The pool is
/// leaked on purpose: handles are stateless and the backing store lives for
/// the process lifetime.
///
/// # Errors
///
/// Propagates the failure of mapping the new pool's first block.
pub(crate) fn shared_pool<T: 'static>() -> PoolResult<&'static Mutex<MultiPool<T>>> {
    let key = TypeId::of::<T>();

    if let Some(entry) = registry().get(&key) {
        return Ok(downcast::<T>(*entry));
    }

    match registry().entry(key) {
        Entry::Occupied(entry) => Ok(downcast::<T>(*entry.get())),
        Entry::Vacant(entry) => {
            let pool: &'static Mutex<MultiPool<T>> =
                Box::leak(Box::new(Mutex::new(MultiPool::new()?)));

            #[cfg(feature = "logging")]
            tracing::debug!(
                element = core::any::type_name::<T>(),
                "created shared multipool"
            );

            entry.insert(pool);
            Ok(pool)
        }
    }
}

fn downcast<T: 'static>(shared: Shared) -> &'static Mutex<MultiPool<T>> {
    match shared.downcast_ref() {
        Some(pool) => pool,
        // Entries are keyed by `TypeId::of::<T>` and inserted as
        // `Mutex<MultiPool<T>>` for that key.
        None => unreachable!("registry entry holds a foreign type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_shares_one_pool() {
        struct Marker(#[allow(dead_code)] u64);

        let first = shared_pool::<Marker>().unwrap();
        let second = shared_pool::<Marker>().unwrap();
        assert!(core::ptr::eq(first, second));
    }

    #[test]
    fn distinct_types_get_distinct_pools() {
        struct Left(#[allow(dead_code)] u64);
        struct Right(#[allow(dead_code)] u64);

        let left = shared_pool::<Left>().unwrap() as *const _ as usize;
        let right = shared_pool::<Right>().unwrap() as *const _ as usize;
        assert_ne!(left, right);
    }
}
