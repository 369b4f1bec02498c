//! Foundational types: errors, configuration, and shared traits.

pub mod config;
pub mod error;
pub mod traits;

pub use config::PoolConfig;
pub use error::{PoolError, PoolErrorKind, PoolResult};
pub use traits::{MemoryUsage, RawAllocator};
