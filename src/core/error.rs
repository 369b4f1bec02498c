//! Allocation error type for the pool allocator.
//!
//! The allocation path has exactly one runtime failure: the backing
//! allocator refusing storage for a new block. Everything else (foreign
//! pointers, double frees, multi-slot requests through the typed surface)
//! is a contract violation that is debug-asserted rather than reported.

use core::alloc::Layout;
use core::fmt;

/// Result alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Classifies an allocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolErrorKind {
    /// The backing allocator refused to provide a new block.
    OutOfMemory,
    /// Layout arithmetic overflowed while sizing a block.
    SizeOverflow,
    /// The requested layout cannot be served from a pool slot.
    InvalidLayout,
}

impl PoolErrorKind {
    /// Static description of the error kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PoolErrorKind::OutOfMemory => "out of memory",
            PoolErrorKind::SizeOverflow => "size overflow",
            PoolErrorKind::InvalidLayout => "invalid layout",
        }
    }
}

impl fmt::Display for PoolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by pool allocation operations.
///
/// Carries the failed layout when one is known, so an out-of-memory report
/// names the block size that could not be mapped.
#[derive(Debug, Clone, Copy)]
pub struct PoolError {
    kind: PoolErrorKind,
    layout: Option<Layout>,
    message: Option<&'static str>,
}

impl PoolError {
    /// Backing allocation failure for `layout`.
    pub(crate) const fn out_of_memory(layout: Layout) -> Self {
        Self {
            kind: PoolErrorKind::OutOfMemory,
            layout: Some(layout),
            message: None,
        }
    }

    /// Layout arithmetic overflow.
    pub(crate) const fn size_overflow(message: &'static str) -> Self {
        Self {
            kind: PoolErrorKind::SizeOverflow,
            layout: None,
            message: Some(message),
        }
    }

    /// Request that no pool slot can satisfy.
    pub(crate) const fn invalid_layout(message: &'static str) -> Self {
        Self {
            kind: PoolErrorKind::InvalidLayout,
            layout: None,
            message: Some(message),
        }
    }

    /// Returns the specific error kind.
    #[inline]
    pub const fn kind(&self) -> PoolErrorKind {
        self.kind
    }

    /// Returns the layout that failed to allocate, if known.
    #[inline]
    pub const fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// Checks whether this is a backing allocation failure.
    #[inline]
    pub const fn is_out_of_memory(&self) -> bool {
        matches!(self.kind, PoolErrorKind::OutOfMemory)
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool allocation failed ({})", self.kind)?;

        if let Some(layout) = self.layout {
            write!(
                f,
                ": could not allocate {} bytes with alignment {}",
                layout.size(),
                layout.align()
            )?;
        }

        if let Some(message) = self.message {
            write!(f, ": {message}")?;
        }

        Ok(())
    }
}

impl std::error::Error for PoolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_layout() {
        let layout = Layout::from_size_align(4096, 8).unwrap();
        let error = PoolError::out_of_memory(layout);

        assert!(error.is_out_of_memory());
        assert_eq!(error.layout(), Some(layout));

        let text = error.to_string();
        assert!(text.contains("out of memory"));
        assert!(text.contains("4096 bytes"));
    }

    #[test]
    fn display_includes_message() {
        let error = PoolError::invalid_layout("zero-sized element type");
        assert_eq!(error.kind(), PoolErrorKind::InvalidLayout);
        assert!(error.to_string().contains("zero-sized element type"));
    }
}
