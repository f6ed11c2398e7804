//! Octant and flat-grid coordinate systems.

use bytemuck::{Pod, Zeroable};
use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

/// One of the eight children of an octree node.
///
/// Bit 0 selects +x, bit 1 selects +y, bit 2 selects +z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Octant(u8);

impl Octant {
    /// All octants in ascending index order.
    pub const ALL: [Self; 8] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
    ];

    /// Create an octant from its 3-bit index.
    #[inline]
    pub const fn new(index: u8) -> Self {
        debug_assert!(index < 8);
        Self(index & 7)
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Bit for this octant in a child mask.
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self.0
    }

    /// Octant of `point` relative to `center`. Ties fall on the negative side.
    #[inline]
    pub fn of_point(point: Vec3, center: Vec3) -> Self {
        let x = u8::from(point.x > center.x);
        let y = u8::from(point.y > center.y);
        let z = u8::from(point.z > center.z);
        Self(x | (y << 1) | (z << 2))
    }

    /// Direction of this octant as +1/-1 per axis.
    #[inline]
    pub fn sign(self) -> Vec3 {
        let axis = |bit: u8| if self.0 & bit != 0 { 1.0 } else { -1.0 };
        Vec3::new(axis(1), axis(2), axis(4))
    }

    /// Offset of this octant within a 2x2x2 block.
    #[inline]
    pub const fn offset(self) -> UVec3 {
        UVec3::new(
            (self.0 & 1) as u32,
            ((self.0 >> 1) & 1) as u32,
            ((self.0 >> 2) & 1) as u32,
        )
    }
}

/// Position of a cell in the flattened indirection grid.
///
/// Each cell is a 2x2x2 block of texels, one per child octant.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CellCoord {
    /// The cell holding the root node.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Linear index in a cube of `side` cells, x fastest.
    #[inline]
    pub const fn to_index(self, side: u32) -> usize {
        let side = side as usize;
        self.x as usize + self.y as usize * side + self.z as usize * side * side
    }

    /// Inverse of [`CellCoord::to_index`].
    #[inline]
    pub const fn from_index(index: usize, side: u32) -> Self {
        let side = side as usize;
        Self::new(
            (index % side) as u32,
            ((index / side) % side) as u32,
            (index / (side * side)) as u32,
        )
    }

    /// Texel coordinate of the child slot `octant` within this cell.
    #[inline]
    pub fn texel(self, octant: Octant) -> UVec3 {
        UVec3::new(self.x, self.y, self.z) * 2 + octant.offset()
    }

    /// Returns true if every component fits in a cube of `side` cells.
    #[inline]
    pub const fn fits(self, side: u32) -> bool {
        self.x < side && self.y < side && self.z < side
    }
}
