//! Flattened indirection grid for GPU traversal.
//!
//! The sparse tree is rewritten into a cube of cells. Each cell stands for one
//! octree node and is a 2x2x2 block of RGBA8 texels, one per child octant:
//!
//! ```text
//! texel = 2 * cell + octant.offset()
//! byte  = 4 * (tx + ty * T + tz * T * T)      T = 2 * cells_per_side
//! ```
//!
//! A texel is `[x, y, z, tag]`. `NODE` texels point at the cell of the child;
//! `LEAF` and `EMPTY` texels end the walk.

use bytemuck::{Pod, Zeroable};
use glam::{UVec3, Vec3};
use voxeloid_core::constants::MAX_CELLS_PER_SIDE;
use voxeloid_core::{CellCoord, Error, LocCode, Octant, Result};

use crate::svo::SparseVoxelTree;
use crate::{outside_root, Occupancy, OccupancyQuery};

/// Texel tag stored in the alpha channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IndirectTag {
    /// Child octant contains no solid voxel.
    Empty = 0,
    /// Child octant is entirely solid.
    Leaf = 1,
    /// Child octant is a node stored at the texel's coordinate.
    Node = 2,
}

impl IndirectTag {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::Leaf),
            2 => Some(Self::Node),
            _ => None,
        }
    }
}

/// One RGBA8 texel of the indirection grid.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct IndirectEntry {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub tag: u8,
}

impl IndirectEntry {
    pub const EMPTY: Self = Self::with_tag(IndirectTag::Empty);
    pub const LEAF: Self = Self::with_tag(IndirectTag::Leaf);

    const fn with_tag(tag: IndirectTag) -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            tag: tag as u8,
        }
    }

    /// Reference to the node stored in `cell`.
    ///
    /// The cell must fit in one byte per axis.
    pub fn node(cell: CellCoord) -> Self {
        debug_assert!(cell.fits(MAX_CELLS_PER_SIDE));
        Self {
            x: cell.x as u8,
            y: cell.y as u8,
            z: cell.z as u8,
            tag: IndirectTag::Node as u8,
        }
    }

    pub fn tag(self) -> Option<IndirectTag> {
        IndirectTag::from_u8(self.tag)
    }

    /// Referenced cell; meaningful for `NODE` texels only.
    pub fn target(self) -> CellCoord {
        CellCoord::new(u32::from(self.x), u32::from(self.y), u32::from(self.z))
    }
}

/// Grid dimensions handed to the renderer as a uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct IndirectGridInfo {
    pub cells_per_side: u32,
    pub texels_per_side: u32,
    pub max_depth: u32,
    pub _pad: u32,
}

/// Bump allocator handing out grid cells in x-then-y-then-z order.
#[derive(Clone, Debug)]
pub struct CellCursor {
    next: CellCoord,
    side: u32,
    allocated: u32,
    exhausted: bool,
}

impl CellCursor {
    /// Cursor at the origin of a cube of `side` cells.
    pub fn new(side: u32) -> Self {
        Self {
            next: CellCoord::ORIGIN,
            side,
            allocated: 0,
            exhausted: side == 0,
        }
    }

    /// The cell the next allocation will return.
    pub fn peek(&self) -> Option<CellCoord> {
        (!self.exhausted).then_some(self.next)
    }

    /// Number of cells handed out so far.
    pub fn allocated(&self) -> u32 {
        self.allocated
    }

    /// Take the current cell and advance with carry.
    pub fn allocate(&mut self) -> Result<CellCoord> {
        if self.exhausted {
            return Err(Error::GridOverflow {
                cells_per_side: self.side,
            });
        }
        let cell = self.next;
        self.advance();
        self.allocated += 1;
        Ok(cell)
    }

    fn advance(&mut self) {
        let next = &mut self.next;
        next.x += 1;
        if next.x == self.side {
            next.x = 0;
            next.y += 1;
            if next.y == self.side {
                next.y = 0;
                next.z += 1;
                if next.z == self.side {
                    next.z = 0;
                    self.exhausted = true;
                }
            }
        }
    }
}

/// Smallest `s` with `s^3 >= n`.
fn ceil_cbrt(n: u64) -> u64 {
    let mut side = (n as f64).cbrt().ceil() as u64;
    while side.saturating_pow(3) < n {
        side += 1;
    }
    while side > 0 && (side - 1).pow(3) >= n {
        side -= 1;
    }
    side
}

/// Flattened octree ready for upload as a 3D RGBA8 texture.
#[derive(Clone, Debug)]
pub struct IndirectTexture {
    cells_per_side: u32,
    max_depth: u8,
    cells_used: u32,
    entries: Vec<IndirectEntry>,
}

impl IndirectTexture {
    fn zeroed(cells_per_side: u32, max_depth: u8) -> Self {
        let texels = 2 * cells_per_side as usize;
        Self {
            cells_per_side,
            max_depth,
            cells_used: 0,
            entries: vec![IndirectEntry::EMPTY; texels * texels * texels],
        }
    }

    /// Cells per axis.
    pub fn cells_per_side(&self) -> u32 {
        self.cells_per_side
    }

    /// Texels per axis; twice the cell count.
    pub fn texels_per_side(&self) -> u32 {
        2 * self.cells_per_side
    }

    /// Depth of the tree this grid was built from.
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Cells assigned to nodes during linearization.
    pub fn cells_used(&self) -> u32 {
        self.cells_used
    }

    /// Raw texture data, `cells_per_side^3 * 8 * 4` bytes.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }

    /// Uniform describing the grid.
    pub fn grid_info(&self) -> IndirectGridInfo {
        IndirectGridInfo {
            cells_per_side: self.cells_per_side,
            texels_per_side: self.texels_per_side(),
            max_depth: u32::from(self.max_depth),
            _pad: 0,
        }
    }

    /// Byte offset of a texel.
    pub fn texel_offset(&self, texel: UVec3) -> usize {
        4 * self.texel_index(texel)
    }

    fn texel_index(&self, texel: UVec3) -> usize {
        let side = self.texels_per_side() as usize;
        texel.x as usize + texel.y as usize * side + texel.z as usize * side * side
    }

    /// Texel for child `octant` of the node in `cell`.
    pub fn entry(&self, cell: CellCoord, octant: Octant) -> Option<IndirectEntry> {
        if !cell.fits(self.cells_per_side) {
            return None;
        }
        self.entries
            .get(self.texel_index(cell.texel(octant)))
            .copied()
    }

    fn set(&mut self, cell: CellCoord, octant: Octant, entry: IndirectEntry) {
        let index = self.texel_index(cell.texel(octant));
        self.entries[index] = entry;
    }
}

/// Rewrite `tree` into an indirection grid.
///
/// The grid holds one cell per stored node, so `ceil(cbrt(len))` cells per
/// side always suffice. Fails with [`Error::GridTooLarge`] when that side
/// exceeds one-byte coordinates.
pub fn linearize(tree: &SparseVoxelTree) -> Result<IndirectTexture> {
    let _span = tracing::debug_span!("linearize", nodes = tree.len()).entered();

    let side = ceil_cbrt(tree.len().max(1) as u64);
    if side > u64::from(MAX_CELLS_PER_SIDE) {
        return Err(Error::GridTooLarge {
            cells_per_side: side,
        });
    }
    let side = side as u32;

    let mut linearizer = Linearizer {
        tree,
        texture: IndirectTexture::zeroed(side, tree.max_depth()),
        cursor: CellCursor::new(side),
    };
    let root_cell = linearizer.cursor.allocate()?;
    linearizer.visit(LocCode::ROOT, root_cell)?;

    let mut texture = linearizer.texture;
    texture.cells_used = linearizer.cursor.allocated();

    tracing::debug!(
        cells_per_side = side,
        cells_used = texture.cells_used,
        bytes = texture.bytes().len(),
        "linearized octree"
    );
    Ok(texture)
}

struct Linearizer<'a> {
    tree: &'a SparseVoxelTree,
    texture: IndirectTexture,
    cursor: CellCursor,
}

impl Linearizer<'_> {
    fn visit(&mut self, code: LocCode, cell: CellCoord) -> Result<()> {
        let Some(mask) = self.tree.get(code) else {
            // Only the root of an empty tree; the zeroed cell already reads EMPTY.
            return Ok(());
        };

        if self.tree.is_solid_leaf(code) {
            for octant in Octant::ALL {
                self.texture.set(cell, octant, IndirectEntry::LEAF);
            }
            return Ok(());
        }

        let mut children = [None; 8];
        for octant in Octant::ALL {
            let entry = if mask.has(octant) {
                let target = self.cursor.allocate()?;
                children[octant.index() as usize] = Some(target);
                IndirectEntry::node(target)
            } else {
                IndirectEntry::EMPTY
            };
            self.texture.set(cell, octant, entry);
        }

        for (octant, target) in Octant::ALL.into_iter().zip(children) {
            if let Some(target) = target {
                self.visit(code.child(octant), target)?;
            }
        }
        Ok(())
    }
}

impl OccupancyQuery for IndirectTexture {
    fn classify(&self, position: Vec3) -> Occupancy {
        if outside_root(position) {
            return Occupancy::Empty;
        }

        let mut cell = CellCoord::ORIGIN;
        let mut center = Vec3::ZERO;
        let mut offset = 0.5;

        for _ in 0..=self.max_depth {
            let octant = Octant::of_point(position, center);
            let Some(entry) = self.entry(cell, octant) else {
                return Occupancy::Malformed;
            };
            match entry.tag() {
                Some(IndirectTag::Empty) => return Occupancy::Empty,
                Some(IndirectTag::Leaf) => return Occupancy::Solid,
                Some(IndirectTag::Node) => {
                    cell = entry.target();
                    center += octant.sign() * offset;
                    offset *= 0.5;
                }
                None => return Occupancy::Malformed,
            }
        }

        Occupancy::Malformed
    }
}
