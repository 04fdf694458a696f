//! Status codes returned by allocation and transfer calls.

use thiserror::Error;

/// Errors from pitched allocation and copies.
///
/// These are reported as-is to the caller. No operation in this crate
/// retries or recovers from a partial transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("out of memory (requested {requested} bytes)")]
    OutOfMemory { requested: usize },

    #[error("pitch {pitch} is smaller than the row size {row_bytes}")]
    PitchTooSmall { pitch: usize, row_bytes: usize },

    #[error("buffer holds {available} bytes but the transfer needs {required}")]
    BufferTooSmall { required: usize, available: usize },

    #[error("CUDA driver error: {0}")]
    Driver(String),
}

#[cfg(feature = "cuda")]
impl From<cudarc::driver::DriverError> for MemoryError {
    fn from(e: cudarc::driver::DriverError) -> Self {
        MemoryError::Driver(e.to_string())
    }
}
