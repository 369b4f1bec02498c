//! Multi-pool statistics.

/// Counters describing a [`MultiPool`](super::MultiPool).
///
/// Returned by [`MultiPool::stats`](super::MultiPool::stats) when the pool
/// was configured with `track_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiPoolStats {
    /// Slots handed out over the pool's lifetime.
    pub total_allocs: u64,
    /// Slots returned over the pool's lifetime.
    pub total_deallocs: u64,
    /// Slots currently handed out.
    pub live_slots: usize,
    /// High-water mark of `live_slots`.
    pub peak_live_slots: usize,
    /// Blocks owned by the pool.
    pub blocks: usize,
    /// Total slot capacity across all blocks.
    pub capacity: usize,
}
