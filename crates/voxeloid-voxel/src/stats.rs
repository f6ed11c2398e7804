//! Diagnostic counters collected while building an octree.

use serde::Serialize;
use voxeloid_core::{ChildMask, LocCode};

/// Counters for one build.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BuildStats {
    /// Finest-level voxels found solid.
    pub voxels: u64,
    /// Density samples taken.
    pub checked: u64,
    /// Nodes stored after collapsing.
    pub nodes: u64,
    /// Solid voxels per root octant.
    pub octant_voxels: [u64; 8],
}

impl BuildStats {
    /// Bytes needed to store the node map's keys and masks.
    pub fn node_bytes(&self) -> u64 {
        self.nodes * (std::mem::size_of::<LocCode>() + std::mem::size_of::<ChildMask>()) as u64
    }

    /// Storage cost per solid voxel, or 0 for an empty tree.
    pub fn bits_per_voxel(&self) -> f64 {
        if self.voxels == 0 {
            0.0
        } else {
            (self.node_bytes() * 8) as f64 / self.voxels as f64
        }
    }

    /// Emit the counters as one log record.
    pub fn log(&self) {
        tracing::info!(
            voxels = self.voxels,
            checked = self.checked,
            nodes = self.nodes,
            bytes = self.node_bytes(),
            bits_per_voxel = self.bits_per_voxel(),
            "octree built"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats() {
        let stats = BuildStats::default();
        assert_eq!(stats.node_bytes(), 0);
        assert_eq!(stats.bits_per_voxel(), 0.0);
    }

    #[test]
    fn bits_per_voxel() {
        let stats = BuildStats {
            voxels: 512,
            checked: 512,
            nodes: 1,
            octant_voxels: [64; 8],
        };
        assert_eq!(stats.node_bytes(), 9);
        assert!((stats.bits_per_voxel() - 72.0 / 512.0).abs() < 1e-12);
    }
}
