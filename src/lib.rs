//! # multipool
//!
//! Fixed-size object pool allocator for workloads that churn many small
//! objects of one type: the node traffic of tree- and list-based
//! associative containers.
//!
//! The allocator trades generality for a constant-time hot path: no
//! contiguous multi-slot grants, no reallocation, just single slots found
//! through a two-tier bitmap with two hardware bit scans and reused densely
//! from the low addresses up.
//!
//! ## Layers
//!
//! - [`pool::MultiPool`] - the stateful core. An append-only sequence of
//!   blocks, each a slab of 64 pools of 4096 slots governed by two-tier
//!   bitmaps. Deallocation locates the owning block by pointer range, so
//!   slots carry zero per-object metadata.
//! - [`handle::PoolAllocator`] - a stateless, copyable, per-type handle
//!   over a process-wide mutex-guarded `MultiPool`. All handles for one
//!   type are interchangeable; different types never contend.
//! - [`handle::PoolBox`] - `Box`-like RAII ownership of a single slot,
//!   the ergonomic client of the handle surface.
//!
//! ## Quick start
//!
//! ```
//! use multipool::{MultiPool, PoolBox};
//!
//! # fn main() -> multipool::PoolResult<()> {
//! // Stateful surface: own a pool and drive it directly.
//! let mut pool = MultiPool::<u64>::new()?;
//! let slot = pool.allocate()?;
//! unsafe { slot.as_ptr().write(7) };
//! pool.deallocate(slot);
//!
//! // Stateless surface: values in the process-wide pool for the type.
//! let boxed = PoolBox::new(7_u64)?;
//! assert_eq!(*boxed, 7);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `logging`: emit `tracing` events on shared-pool creation and block
//!   growth.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

mod bits;

pub mod core;
pub mod handle;
pub mod pool;

pub use crate::core::{
    MemoryUsage, PoolConfig, PoolError, PoolErrorKind, PoolResult, RawAllocator,
};
pub use crate::handle::{PoolAllocator, PoolBox};
pub use crate::pool::{MultiPool, MultiPoolStats};

/// Convenient re-exports of the commonly used types and traits.
pub mod prelude {
    pub use crate::core::{MemoryUsage, PoolConfig, PoolError, PoolResult, RawAllocator};
    pub use crate::handle::{PoolAllocator, PoolBox};
    pub use crate::pool::{MultiPool, MultiPoolStats};
}
