//! Container-facing allocation surface.
//!
//! ## Modules
//! - `allocator` - the stateless per-type handle
//! - `pool_box` - RAII owner of one pool slot
//! - `registry` - the process-wide per-type pool registry

mod allocator;
mod pool_box;
pub(crate) mod registry;

pub use allocator::PoolAllocator;
pub use pool_box::PoolBox;
