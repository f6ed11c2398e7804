//! Error types for the octree pipeline.

use thiserror::Error;

/// Engine-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The tree has too many nodes for one-byte cell coordinates
    #[error("Indirection grid too large: {cells_per_side} cells per side (max 256)")]
    GridTooLarge { cells_per_side: u64 },

    /// The cell cursor ran past the end of the pre-sized grid
    #[error("Cell cursor overflowed a grid of {cells_per_side} cells per side")]
    GridOverflow { cells_per_side: u32 },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
