//! Sparse voxel octree keyed by location code.
//!
//! Nodes are stored in a flat hash map instead of linked boxes. A missing
//! entry means the subtree is empty; a full mask with no stored children means
//! the subtree is solid.

use glam::Vec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use voxeloid_core::constants::{DEFAULT_MAX_DEPTH, MAX_SUPPORTED_DEPTH};
use voxeloid_core::{ChildMask, Error, LocCode, Octant, Result};

use crate::{outside_root, Occupancy, OccupancyQuery};

/// Octree construction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OctreeConfig {
    /// Depth of the finest voxels; the grid is `2^max_depth` voxels per axis.
    pub max_depth: u8,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl OctreeConfig {
    /// Create a configuration with the given depth.
    pub fn with_max_depth(max_depth: u8) -> Self {
        Self { max_depth }
    }

    /// Check the depth against what a location code can address.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "max_depth {} exceeds the location code limit of {MAX_SUPPORTED_DEPTH}",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Voxels per axis at the finest level.
    pub fn resolution(&self) -> u64 {
        1 << self.max_depth
    }
}

/// Sparse voxel octree produced by [`crate::OctreeBuilder`].
///
/// Read-only once built.
#[derive(Clone, Debug)]
pub struct SparseVoxelTree {
    nodes: HashMap<LocCode, ChildMask>,
    max_depth: u8,
}

impl SparseVoxelTree {
    pub(crate) fn from_nodes(nodes: HashMap<LocCode, ChildMask>, max_depth: u8) -> Self {
        Self { nodes, max_depth }
    }

    /// Depth of the finest voxels.
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no voxel is solid.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child mask stored at `code`.
    #[inline]
    pub fn get(&self, code: LocCode) -> Option<ChildMask> {
        self.nodes.get(&code).copied()
    }

    /// Root node mask, absent for an empty tree.
    pub fn root(&self) -> Option<ChildMask> {
        self.get(LocCode::ROOT)
    }

    /// Iterate over all stored nodes in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (LocCode, ChildMask)> + '_ {
        self.nodes.iter().map(|(&code, &mask)| (code, mask))
    }

    /// Returns true if `code` is a solid leaf: a full mask with no stored
    /// children, either collapsed or at the finest depth.
    pub fn is_solid_leaf(&self, code: LocCode) -> bool {
        self.get(code).is_some_and(ChildMask::is_full)
            && Octant::ALL
                .iter()
                .all(|&octant| !self.nodes.contains_key(&code.child(octant)))
    }

    /// Check the structural invariants the builder guarantees.
    ///
    /// Every node has a non-zero mask and sits no deeper than `max_depth`;
    /// nodes at `max_depth` are full; every set bit either has a stored child
    /// or belongs to a solid leaf; every non-root node has a parent whose mask
    /// names it.
    pub fn is_well_formed(&self) -> bool {
        self.nodes.iter().all(|(&code, &mask)| {
            if !code.is_valid() || mask.is_empty() || code.depth() > self.max_depth {
                return false;
            }
            if code.depth() == self.max_depth && !mask.is_full() {
                return false;
            }
            let parent_ok = match (code.parent(), code.octant()) {
                (Some(parent), Some(octant)) => {
                    self.get(parent).is_some_and(|m| m.has(octant))
                }
                _ => true,
            };
            parent_ok
                && (self.is_solid_leaf(code)
                    || mask
                        .octants()
                        .all(|octant| self.nodes.contains_key(&code.child(octant))))
        })
    }

    /// Approximate memory used by the node map in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.nodes.capacity()
                * (std::mem::size_of::<LocCode>() + std::mem::size_of::<ChildMask>())
    }
}

impl OccupancyQuery for SparseVoxelTree {
    fn classify(&self, position: Vec3) -> Occupancy {
        if outside_root(position) {
            return Occupancy::Empty;
        }
        let Some(mut mask) = self.root() else {
            return Occupancy::Empty;
        };

        let mut code = LocCode::ROOT;
        let mut center = Vec3::ZERO;
        let mut offset = 0.5;

        for _ in 0..=self.max_depth {
            let octant = Octant::of_point(position, center);
            if !mask.has(octant) {
                return Occupancy::Empty;
            }

            let child = code.child(octant);
            match self.get(child) {
                Some(child_mask) => {
                    mask = child_mask;
                    code = child;
                    center += octant.sign() * offset;
                    offset *= 0.5;
                }
                None if mask.is_full() => return Occupancy::Solid,
                None => return Occupancy::Malformed,
            }
        }

        Occupancy::Malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(nodes: &[(LocCode, u8)], max_depth: u8) -> SparseVoxelTree {
        SparseVoxelTree::from_nodes(
            nodes.iter().map(|&(c, m)| (c, ChildMask(m))).collect(),
            max_depth,
        )
    }

    #[test]
    fn config_validation() {
        assert!(OctreeConfig::default().validate().is_ok());
        assert!(OctreeConfig::with_max_depth(1).validate().is_ok());
        assert!(OctreeConfig::with_max_depth(MAX_SUPPORTED_DEPTH)
            .validate()
            .is_ok());
        assert!(matches!(
            OctreeConfig::with_max_depth(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            OctreeConfig::with_max_depth(MAX_SUPPORTED_DEPTH + 1).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(OctreeConfig::with_max_depth(6).resolution(), 64);
    }

    #[test]
    fn empty_tree_contains_nothing() {
        let empty = tree(&[], 3);
        assert!(empty.is_empty());
        assert!(empty.is_well_formed());
        assert_eq!(empty.classify(Vec3::ZERO), Occupancy::Empty);
    }

    #[test]
    fn collapsed_root_is_solid_everywhere_inside() {
        let full = tree(&[(LocCode::ROOT, 255)], 4);
        assert!(full.is_solid_leaf(LocCode::ROOT));
        assert!(full.is_well_formed());
        assert!(full.contains(Vec3::new(0.9, -0.9, 0.1)));
        assert!(full.contains(Vec3::splat(-1.0)));
        assert!(!full.contains(Vec3::new(1.01, 0.0, 0.0)));
        assert!(!full.contains(Vec3::new(0.0, 0.0, -3.0)));
        assert!(!full.contains(Vec3::new(f32::NAN, 0.0, 0.0)));
    }

    #[test]
    fn missing_child_under_partial_mask_is_malformed() {
        // Root claims octant 7 but nothing is stored there.
        let broken = tree(&[(LocCode::ROOT, 0b1000_0000)], 2);
        assert!(!broken.is_well_formed());
        assert_eq!(broken.classify(Vec3::splat(0.5)), Occupancy::Malformed);
        assert_eq!(broken.classify(Vec3::splat(-0.5)), Occupancy::Empty);
    }

    #[test]
    fn zero_mask_is_not_well_formed() {
        let broken = tree(&[(LocCode::ROOT, 0)], 2);
        assert!(!broken.is_well_formed());
    }

    #[test]
    fn partial_leaf_at_max_depth_is_not_well_formed() {
        let child = LocCode::ROOT.child(Octant::new(0));
        let broken = tree(&[(LocCode::ROOT, 0b1), (child, 0b11)], 1);
        assert!(!broken.is_well_formed());
    }

    #[test]
    fn single_voxel_tree() {
        // One solid voxel in the +x+y+z corner at depth 2.
        let a = LocCode::ROOT.child(Octant::new(7));
        let b = a.child(Octant::new(7));
        let single = tree(&[(LocCode::ROOT, 0b1000_0000), (a, 0b1000_0000), (b, 255)], 2);
        assert!(single.is_well_formed());
        assert!(!single.is_solid_leaf(a));
        assert!(single.is_solid_leaf(b));
        assert!(single.contains(Vec3::splat(0.75)));
        assert!(!single.contains(Vec3::splat(0.25)));
        assert!(!single.contains(Vec3::new(0.75, 0.75, -0.75)));
    }
}
