//! Error types for the cache crate
//!
//! Cache operations themselves are total; errors only arise when building a
//! cache or validating its configuration.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A bounded cache was requested with room for zero entries
    #[error("Cache capacity must be at least 1")]
    ZeroCapacity,

    /// Configuration values failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;
