//! Runtime configuration for pool instances.

/// Tuning knobs for a [`MultiPool`](crate::pool::MultiPool).
///
/// The default configuration tracks statistics and leaves slot memory
/// untouched. [`PoolConfig::debug`] additionally scribbles recognizable
/// byte patterns over fresh slabs and freed slots so stale reads show up in
/// a debugger; [`PoolConfig::production`] switches everything off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maintain the counters reported by
    /// [`MultiPool::stats`](crate::pool::MultiPool::stats).
    pub track_stats: bool,
    /// Fill newly mapped slabs with this byte.
    pub alloc_pattern: Option<u8>,
    /// Fill freed slots with this byte.
    pub dealloc_pattern: Option<u8>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: None,
            dealloc_pattern: None,
        }
    }
}

impl PoolConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every diagnostic switched off.
    pub const fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
        }
    }

    /// Configuration for debugging: statistics plus fill patterns.
    ///
    /// Fresh slabs read `0xA5`, freed slots read `0xDE`.
    pub const fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xA5),
            dealloc_pattern: Some(0xDE),
        }
    }

    /// Sets whether statistics are maintained.
    pub const fn with_track_stats(mut self, track: bool) -> Self {
        self.track_stats = track;
        self
    }

    /// Sets the byte written over newly mapped slabs.
    pub const fn with_alloc_pattern(mut self, pattern: Option<u8>) -> Self {
        self.alloc_pattern = pattern;
        self
    }

    /// Sets the byte written over freed slots.
    pub const fn with_dealloc_pattern(mut self, pattern: Option<u8>) -> Self {
        self.dealloc_pattern = pattern;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert!(PoolConfig::default().track_stats);
        assert!(!PoolConfig::production().track_stats);

        let debug = PoolConfig::debug();
        assert!(debug.alloc_pattern.is_some());
        assert!(debug.dealloc_pattern.is_some());
    }

    #[test]
    fn builder_setters() {
        let config = PoolConfig::production()
            .with_track_stats(true)
            .with_dealloc_pattern(Some(0xCC));

        assert!(config.track_stats);
        assert_eq!(config.dealloc_pattern, Some(0xCC));
        assert_eq!(config.alloc_pattern, None);
    }
}
