//! Octree node types.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::coords::Octant;

/// Path from the octree root to a node, packed as base-8 digits.
///
/// The root is the sentinel value `1`. Descending into a child appends its
/// octant as three low bits, so the number of digits below the sentinel is
/// the node's depth.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct LocCode(pub u64);

impl LocCode {
    /// The root node.
    pub const ROOT: Self = Self(1);

    /// Location code of the given child.
    #[inline]
    pub const fn child(self, octant: Octant) -> Self {
        Self((self.0 << 3) | octant.index() as u64)
    }

    /// Location code of the parent, or `None` for the root.
    #[inline]
    pub const fn parent(self) -> Option<Self> {
        if self.0 <= 1 {
            None
        } else {
            Some(Self(self.0 >> 3))
        }
    }

    /// Returns true if the sentinel bit sits on a digit boundary.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0 && (63 - self.0.leading_zeros()) % 3 == 0
    }

    /// Number of digits below the sentinel.
    #[inline]
    pub const fn depth(self) -> u8 {
        debug_assert!(self.is_valid());
        ((63 - (self.0 | 1).leading_zeros()) / 3) as u8
    }

    /// The last child choice, or `None` for the root.
    #[inline]
    pub const fn octant(self) -> Option<Octant> {
        if self.0 <= 1 {
            None
        } else {
            Some(Octant::new((self.0 & 7) as u8))
        }
    }

    /// Child choices from the root down to this node, in descent order.
    pub fn path(self) -> impl Iterator<Item = Octant> {
        (0..self.depth())
            .rev()
            .map(move |level| Octant::new(((self.0 >> (3 * level as u32)) & 7) as u8))
    }

    /// Build a location code by descending through `path` from the root.
    pub fn from_path<I: IntoIterator<Item = Octant>>(path: I) -> Self {
        path.into_iter().fold(Self::ROOT, Self::child)
    }

    /// Half the edge length of this node's cube. The root spans [-1, 1].
    #[inline]
    pub fn half_extent(self) -> f32 {
        0.5_f32.powi(i32::from(self.depth()))
    }

    /// Center of this node's cube in normalized octree coordinates.
    pub fn center(self) -> Vec3 {
        let mut center = Vec3::ZERO;
        let mut offset = 0.5;
        for octant in self.path() {
            center += octant.sign() * offset;
            offset *= 0.5;
        }
        center
    }
}

/// One octree node: bit `i` is set iff child octant `i` holds any solid voxel.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct ChildMask(pub u8);

impl ChildMask {
    /// No children. Never stored in a tree.
    pub const EMPTY: Self = Self(0);
    /// All children present. Without stored children this is a solid leaf.
    pub const FULL: Self = Self(u8::MAX);

    /// Returns true if the child in `octant` exists.
    #[inline]
    pub const fn has(self, octant: Octant) -> bool {
        self.0 & octant.bit() != 0
    }

    /// Mask with `octant` added.
    #[inline]
    #[must_use]
    pub const fn with(self, octant: Octant) -> Self {
        Self(self.0 | octant.bit())
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_full(self) -> bool {
        self.0 == u8::MAX
    }

    /// Number of children present.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Octants whose bit is set, in ascending order.
    pub fn octants(self) -> impl Iterator<Item = Octant> {
        Octant::ALL.into_iter().filter(move |&o| self.has(o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn root_code() {
        assert_eq!(LocCode::ROOT.depth(), 0);
        assert_eq!(LocCode::ROOT.parent(), None);
        assert_eq!(LocCode::ROOT.octant(), None);
        assert_eq!(LocCode::ROOT.center(), Vec3::ZERO);
        assert_relative_eq!(LocCode::ROOT.half_extent(), 1.0);
    }

    #[test]
    fn child_appends_digit() {
        let code = LocCode::ROOT.child(Octant::new(5)).child(Octant::new(2));
        assert_eq!(code.0, 0b1_101_010);
        assert_eq!(code.depth(), 2);
        assert_eq!(code.octant(), Some(Octant::new(2)));
        assert_eq!(code.parent(), Some(LocCode(0b1_101)));
    }

    #[test]
    fn path_roundtrip_preserves_order() {
        let choices: Vec<Octant> = [3, 0, 7, 7, 1, 6, 4, 2, 5, 0]
            .into_iter()
            .map(Octant::new)
            .collect();
        for len in 0..=choices.len() {
            let code = LocCode::from_path(choices[..len].iter().copied());
            assert!(code.is_valid());
            assert_eq!(code.depth() as usize, len);
            assert_eq!(code.path().collect::<Vec<_>>(), &choices[..len]);
        }
    }

    #[test]
    fn deepest_supported_code_fits() {
        let depth = crate::constants::MAX_SUPPORTED_DEPTH;
        let code = LocCode::from_path((0..depth).map(|_| Octant::new(7)));
        assert_eq!(code.0, u64::MAX);
        assert_eq!(code.depth(), depth);
        assert_eq!(code.path().count(), depth as usize);
    }

    #[test]
    fn invalid_codes() {
        assert!(!LocCode(0).is_valid());
        assert!(!LocCode(2).is_valid());
        assert!(!LocCode(0b1_0000).is_valid());
        assert!(LocCode(0b1_000).is_valid());
    }

    #[test]
    fn center_of_children() {
        let positive = LocCode::ROOT.child(Octant::new(7));
        assert_eq!(positive.center(), Vec3::splat(0.5));

        let negative = LocCode::ROOT.child(Octant::new(0));
        assert_eq!(negative.center(), Vec3::splat(-0.5));

        let mixed = LocCode::ROOT.child(Octant::new(1)).child(Octant::new(6));
        assert_relative_eq!(mixed.center().x, 0.25);
        assert_relative_eq!(mixed.center().y, -0.25);
        assert_relative_eq!(mixed.center().z, -0.25);
        assert_relative_eq!(mixed.half_extent(), 0.25);
    }

    #[test]
    fn child_mask_bits() {
        let mask = ChildMask::EMPTY.with(Octant::new(1)).with(Octant::new(6));
        assert_eq!(mask.0, 0b0100_0010);
        assert!(mask.has(Octant::new(1)));
        assert!(!mask.has(Octant::new(0)));
        assert_eq!(mask.count(), 2);
        assert_eq!(
            mask.octants().collect::<Vec<_>>(),
            vec![Octant::new(1), Octant::new(6)]
        );
        assert!(ChildMask::FULL.is_full());
        assert!(ChildMask::EMPTY.is_empty());
    }
}
