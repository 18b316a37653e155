//! Error types for the Vega GPU API
//!
//! This module defines the error types used throughout the crate,
//! including device capability checks, resource validation, and
//! asset acquisition.

use std::fmt;

/// Result type for Vega GPU API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Vega GPU API errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required device capability is absent (e.g. float color targets)
    MissingCapability(String),

    /// Shader compilation or linking failed, carries the backend diagnostic
    ShaderCompilation(String),

    /// Caller-supplied data failed validation (layout, uniform shape, format)
    Validation(String),

    /// Operation on a resource whose native handle was already released
    UseAfterFree(String),

    /// Asset acquisition or decoding failed
    AssetLoad(String),

    /// Backend-specific error (lost context, unknown handle, etc.)
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingCapability(msg) => write!(f, "Missing capability: {}", msg),
            Error::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::UseAfterFree(msg) => write!(f, "Use after free: {}", msg),
            Error::AssetLoad(msg) => write!(f, "Asset load failed: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an error of the given variant, logging it at the raising site
///
/// # Example
///
/// ```no_run
/// use vega_gpu_api::engine_err;
///
/// let error = engine_err!("vega::Geometry", Validation, "invalid vertex data");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::vega::Error::$variant(message)
    }};
}

/// Log and return an error of the given variant from the current function
///
/// # Example
///
/// ```no_run
/// use vega_gpu_api::{engine_bail, vega::Result};
///
/// fn draw(freed: bool) -> Result<()> {
///     if freed {
///         engine_bail!("vega::Geometry", UseAfterFree, "draw after free");
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
