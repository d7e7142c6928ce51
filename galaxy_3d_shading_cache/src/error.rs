//! Error types for the Galaxy3D shading cache
//!
//! This module defines the error types used throughout the cache engine,
//! including configuration validation, geometry decoding, and cache buffer writes.

use std::fmt;

/// Result type for shading cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Shading cache errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (buffer write rejected, lock poisoned, etc.)
    BackendError(String),

    /// Invalid resource (buffer too small, malformed flat buffer, out-of-range write)
    InvalidResource(String),

    /// Invalid configuration (thresholds, layouts, canvas size)
    InvalidConfig(String),

    /// Geometry that cannot be projected (non-finite center or radius)
    InvalidGeometry(String),

    /// No cache buffer bound when an invalidation had to be written
    CacheBufferUnavailable(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            Error::CacheBufferUnavailable(msg) => write!(f, "Cache buffer unavailable: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an error variant and log it at ERROR severity with file:line
///
/// # Example
///
/// ```ignore
/// let err = cache_err!(self.logger, InvalidConfig, "galaxy3d::CacheLayout",
///     "record stride must be non-zero");
/// ```
#[macro_export]
macro_rules! cache_err {
    ($logger:expr, $variant:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $logger.log(&$crate::log::LogEntry::detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!(),
        ));
        $crate::error::Error::$variant(message)
    }};
}

/// Log an error (see `cache_err!`) and return it from the current function
#[macro_export]
macro_rules! cache_bail {
    ($logger:expr, $variant:ident, $source:expr, $($arg:tt)*) => {
        return Err($crate::cache_err!($logger, $variant, $source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
