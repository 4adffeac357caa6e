//! Error types for tilegemm operations.
//!
//! Only conditions a caller can act on are reported here: failed aligned
//! allocations, bad layouts, shape mismatches detected outside the hot path,
//! and worker pool construction. Kernel preconditions are assertions.

use std::fmt;

/// Errors that can occur during tilegemm operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileGemmError {
    /// Memory allocation failed.
    AllocationError {
        /// The size that was requested to be allocated.
        requested_size: usize,
        /// The alignment that was requested.
        requested_alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Invalid layout parameters were provided.
    LayoutError {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Matrix dimensions, tile sizes or kernels that do not fit together.
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
    /// The worker pool for parallel multiplication could not be built.
    ThreadPoolError {
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for TileGemmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileGemmError::AllocationError {
                requested_size,
                requested_alignment,
                message,
            } => write!(
                f,
                "Memory allocation failed: {} (requested {} bytes with {} byte alignment)",
                message, requested_size, requested_alignment
            ),
            TileGemmError::LayoutError {
                size,
                alignment,
                message,
            } => write!(
                f,
                "Invalid memory layout: {} (size: {}, alignment: {})",
                message, size, alignment
            ),
            TileGemmError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            TileGemmError::ThreadPoolError { message } => {
                write!(f, "Thread pool error: {}", message)
            }
        }
    }
}

impl std::error::Error for TileGemmError {}

/// Result type alias for tilegemm operations.
pub type Result<T> = std::result::Result<T, TileGemmError>;

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize, message: impl Into<String>) -> TileGemmError {
    TileGemmError::AllocationError {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> TileGemmError {
    TileGemmError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> TileGemmError {
    TileGemmError::ValidationError {
        message: message.into(),
    }
}

/// Creates a thread pool error.
pub fn thread_pool_error(message: impl Into<String>) -> TileGemmError {
    TileGemmError::ThreadPoolError {
        message: message.into(),
    }
}
