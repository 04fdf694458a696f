//! Error type for grid construction, checked access and transfers.

use fusion_memory::MemoryError;
use thiserror::Error;

/// Errors reported by the fusion grid.
///
/// Compute operators never fail; only allocation, transfers, checked
/// accessors and configuration produce errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    /// Allocation or transfer failure, passed through from the memory layer.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("voxel ({x}, {y}, {z}) is outside the {width}x{height}x{depth} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        z: usize,
        width: usize,
        height: usize,
        depth: usize,
    },

    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),
}
