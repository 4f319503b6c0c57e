//! Error types for the tinylfu library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are
//!   invalid, with one variant per rejectable configuration so callers can
//!   match on the exact failure.
//!
//! ## Example Usage
//!
//! ```
//! use tinylfu::builder::{Cache, CacheBuilder};
//! use tinylfu::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let cache: Result<Cache<u64, String>, ConfigError> =
//!     CacheBuilder::new().maximum_size(100).build();
//! assert!(cache.is_ok());
//!
//! // A missing size is caught without panicking
//! let bad = CacheBuilder::new().build::<u64, String>();
//! assert_eq!(bad.unwrap_err(), ConfigError::MissingMaximumSize);
//! ```

use std::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::build`](crate::builder::CacheBuilder::build).
///
/// # Example
///
/// ```
/// use tinylfu::builder::CacheBuilder;
/// use tinylfu::error::ConfigError;
///
/// let err = CacheBuilder::new()
///     .maximum_weight(1024)
///     .build::<u64, u64>()
///     .unwrap_err();
/// assert_eq!(err, ConfigError::WeightBoundUnsupported);
/// assert!(err.to_string().contains("weight"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The builder was asked to build without a `maximum_size` bound.
    MissingMaximumSize,
    /// A `maximum_weight` bound was selected; weighted eviction is not
    /// implemented.
    WeightBoundUnsupported,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingMaximumSize => f.write_str("maximum_size is required"),
            ConfigError::WeightBoundUnsupported => {
                f.write_str("maximum_weight is not implemented; bound the cache with maximum_size")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_size_display() {
        let err = ConfigError::MissingMaximumSize;
        assert_eq!(err.to_string(), "maximum_size is required");
    }

    #[test]
    fn weight_bound_display_names_both_knobs() {
        let msg = ConfigError::WeightBoundUnsupported.to_string();
        assert!(msg.contains("maximum_weight"));
        assert!(msg.contains("maximum_size"));
    }

    #[test]
    fn variants_are_matchable_and_comparable() {
        let err = ConfigError::WeightBoundUnsupported;
        assert_eq!(err, ConfigError::WeightBoundUnsupported);
        assert_ne!(err, ConfigError::MissingMaximumSize);
        match err {
            ConfigError::WeightBoundUnsupported => {}
            ConfigError::MissingMaximumSize => panic!("wrong variant"),
        }
    }

    #[test]
    fn debug_names_the_variant() {
        let dbg = format!("{:?}", ConfigError::MissingMaximumSize);
        assert!(dbg.contains("MissingMaximumSize"));
    }

    #[test]
    fn implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
