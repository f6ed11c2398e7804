//! Sparse voxel octree construction and GPU indirection grids.
//!
//! The pipeline runs in two passes:
//! 1. [`OctreeBuilder`] samples a [`DensityField`] and produces a
//!    [`SparseVoxelTree`] keyed by location code.
//! 2. [`linearize`] rewrites the tree into an [`IndirectTexture`] that a
//!    shader can walk without recursion.
//!
//! Both representations answer point queries through [`OccupancyQuery`].

pub mod builder;
pub mod density;
pub mod indirect;
pub mod slice;
pub mod stats;
pub mod svo;

pub use builder::{Coverage, OctreeBuilder};
pub use density::{ConstantDensity, DensityField};
pub use indirect::{
    linearize, CellCursor, IndirectEntry, IndirectGridInfo, IndirectTag, IndirectTexture,
};
pub use slice::render_slice;
pub use stats::BuildStats;
pub use svo::{OctreeConfig, SparseVoxelTree};

use glam::Vec3;

/// Outcome of classifying a point against an octree representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupancy {
    /// Inside solid material.
    Solid,
    /// Empty space, or outside the root cube.
    Empty,
    /// The walk hit a state a well-formed tree never produces.
    Malformed,
}

/// Point classification shared by the sparse tree and the flat grid.
pub trait OccupancyQuery {
    /// Classify a point in normalized octree coordinates.
    fn classify(&self, position: Vec3) -> Occupancy;

    /// Returns true if the point lies in solid material.
    ///
    /// A malformed walk is a construction bug; it asserts in debug builds and
    /// reads as empty otherwise.
    fn contains(&self, position: Vec3) -> bool {
        match self.classify(position) {
            Occupancy::Solid => true,
            Occupancy::Empty => false,
            Occupancy::Malformed => {
                tracing::error!(?position, "octree walk did not resolve");
                debug_assert!(false, "malformed octree walk at {position:?}");
                false
            }
        }
    }
}

/// Points outside the root cube `[-1, 1]^3` are never solid.
#[inline]
pub(crate) fn outside_root(position: Vec3) -> bool {
    !position.is_finite() || position.abs().max_element() > 1.0
}
