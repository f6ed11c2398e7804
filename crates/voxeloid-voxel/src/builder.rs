//! Parallel octree construction from a density field.

use bitflags::bitflags;
use hashbrown::HashMap;
use rayon::prelude::*;
use voxeloid_core::{ChildMask, LocCode, Octant, Result};

use crate::density::DensityField;
use crate::stats::BuildStats;
use crate::svo::{OctreeConfig, SparseVoxelTree};

bitflags! {
    /// What a subtree contains, reported upward during construction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Coverage: u8 {
        /// Some voxel below is solid.
        const SOLID = 0b01;
        /// Some voxel below is empty.
        const EMPTY = 0b10;
    }
}

type NodeMap = HashMap<LocCode, ChildMask>;

/// Private state of one root-octant task.
#[derive(Default)]
struct OctantAccumulator {
    nodes: NodeMap,
    voxels: u64,
    checked: u64,
}

/// Builds a [`SparseVoxelTree`] by sampling a density field.
///
/// The eight root octants are built as independent parallel tasks, each into
/// its own map. Their key sets are disjoint (the first digit differs), so the
/// merge is a plain union.
pub struct OctreeBuilder<D> {
    config: OctreeConfig,
    density: D,
}

impl<D: DensityField> OctreeBuilder<D> {
    /// Create a builder, rejecting depths a location code cannot address.
    pub fn new(config: OctreeConfig, density: D) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, density })
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    pub fn density(&self) -> &D {
        &self.density
    }

    /// Build the tree.
    pub fn build(&self) -> SparseVoxelTree {
        self.build_with_stats().0
    }

    /// Build the tree and report construction counters.
    pub fn build_with_stats(&self) -> (SparseVoxelTree, BuildStats) {
        let _span =
            tracing::debug_span!("octree_build", max_depth = self.config.max_depth).entered();

        let accumulators: Vec<(Coverage, OctantAccumulator)> = Octant::ALL
            .par_iter()
            .map(|&octant| {
                let mut acc = OctantAccumulator::default();
                let coverage = self.visit(LocCode::ROOT.child(octant), 1, &mut acc);
                (coverage, acc)
            })
            .collect();

        let capacity = accumulators
            .iter()
            .map(|(_, acc)| acc.nodes.len())
            .sum::<usize>()
            + 1;
        let mut nodes = NodeMap::with_capacity(capacity);
        let mut stats = BuildStats::default();
        let mut mask = ChildMask::EMPTY;
        let mut any_empty = false;

        for (octant, (coverage, acc)) in Octant::ALL.into_iter().zip(accumulators) {
            if coverage.contains(Coverage::SOLID) {
                mask = mask.with(octant);
            }
            any_empty |= coverage.contains(Coverage::EMPTY);

            stats.voxels += acc.voxels;
            stats.checked += acc.checked;
            stats.octant_voxels[octant.index() as usize] = acc.voxels;
            nodes.extend(acc.nodes);
        }

        settle(&mut nodes, LocCode::ROOT, mask, any_empty);
        stats.nodes = nodes.len() as u64;

        tracing::debug!(
            nodes = stats.nodes,
            voxels = stats.voxels,
            "merged octant maps"
        );

        let tree = SparseVoxelTree::from_nodes(nodes, self.config.max_depth);
        debug_assert!(tree.is_well_formed());
        (tree, stats)
    }

    /// Build the subtree at `code`, recording its nodes in `acc`.
    fn visit(&self, code: LocCode, depth: u8, acc: &mut OctantAccumulator) -> Coverage {
        if depth >= self.config.max_depth {
            acc.checked += 1;
            return if self.density.is_solid(code.center()) {
                acc.nodes.insert(code, ChildMask::FULL);
                acc.voxels += 1;
                Coverage::SOLID
            } else {
                Coverage::EMPTY
            };
        }

        let mut mask = ChildMask::EMPTY;
        let mut any_empty = false;
        for octant in Octant::ALL {
            let coverage = self.visit(code.child(octant), depth + 1, acc);
            if coverage.contains(Coverage::SOLID) {
                mask = mask.with(octant);
            }
            any_empty |= coverage.contains(Coverage::EMPTY);
        }

        settle(&mut acc.nodes, code, mask, any_empty)
    }
}

/// Store the node at `code` given its children's coverage.
///
/// A node whose children are all solid with nothing empty below replaces
/// them with a single full leaf.
fn settle(nodes: &mut NodeMap, code: LocCode, mask: ChildMask, any_empty: bool) -> Coverage {
    if mask.is_full() && !any_empty {
        for octant in Octant::ALL {
            nodes.remove(&code.child(octant));
        }
        nodes.insert(code, ChildMask::FULL);
        Coverage::SOLID
    } else if !mask.is_empty() {
        nodes.insert(code, mask);
        Coverage::SOLID | Coverage::EMPTY
    } else {
        Coverage::EMPTY
    }
}
