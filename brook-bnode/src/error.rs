//! Error types for blank-node allocation

/// Error type for allocator construction
///
/// Allocation itself never fails; these errors come from invalid strategy
/// configuration, caught before a parse starts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AllocError {
    /// Seeded hash strategy configured without a seed
    #[error("seeded hash allocator requires a non-empty seed")]
    EmptySeed,

    /// Hash strategy configured with a zero-sized cache
    #[error("hash allocator cache size must be at least 1")]
    ZeroCacheSize,
}

/// Result type for allocator operations
pub type Result<T> = std::result::Result<T, AllocError>;
