//! Core types for the Voxeloid sparse voxel octree.
//!
//! This crate provides the foundational types shared by the builder and the
//! indirection linearizer:
//! - Location codes and child masks
//! - Octant and flat-grid cell coordinates
//! - Common error types

pub mod coords;
pub mod error;
pub mod types;

pub use coords::{CellCoord, Octant};
pub use error::{Error, Result};
pub use types::{ChildMask, LocCode};

/// Engine-wide constants
pub mod constants {
    /// Bits in the integer backing a location code.
    pub const LOC_CODE_BITS: u32 = u64::BITS;
    /// Deepest level a location code can address (`3 * depth + 1` bits).
    pub const MAX_SUPPORTED_DEPTH: u8 = ((LOC_CODE_BITS - 1) / 3) as u8;
    /// Default octree depth (64 voxels per axis).
    pub const DEFAULT_MAX_DEPTH: u8 = 6;
    /// Largest flat grid side; cell coordinates are stored in one byte each.
    pub const MAX_CELLS_PER_SIDE: u32 = 256;

    const _: () = assert!(3 * MAX_SUPPORTED_DEPTH as u32 + 1 <= LOC_CODE_BITS);
    const _: () = assert!(DEFAULT_MAX_DEPTH >= 1 && DEFAULT_MAX_DEPTH <= MAX_SUPPORTED_DEPTH);
}
