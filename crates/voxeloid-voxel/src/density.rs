//! Density oracles that drive octree construction.

use glam::Vec3;

/// Classifies points in normalized octree coordinates as solid or empty.
///
/// Implementations must be pure: the builder samples from several threads and
/// expects the same answer for the same position.
pub trait DensityField: Sync {
    /// Returns true if `position` is inside solid material.
    fn is_solid(&self, position: Vec3) -> bool;
}

impl<F> DensityField for F
where
    F: Fn(Vec3) -> bool + Sync,
{
    #[inline]
    fn is_solid(&self, position: Vec3) -> bool {
        self(position)
    }
}

/// Density that answers the same everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConstantDensity(pub bool);

impl ConstantDensity {
    pub const SOLID: Self = Self(true);
    pub const EMPTY: Self = Self(false);
}

impl DensityField for ConstantDensity {
    #[inline]
    fn is_solid(&self, _position: Vec3) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_density_fields() {
        let half_space = |p: Vec3| p.x > 0.0;
        assert!(half_space.is_solid(Vec3::new(0.5, 0.0, 0.0)));
        assert!(!half_space.is_solid(Vec3::new(-0.5, 0.0, 0.0)));
    }

    #[test]
    fn constant_density() {
        assert!(ConstantDensity::SOLID.is_solid(Vec3::ZERO));
        assert!(!ConstantDensity::EMPTY.is_solid(Vec3::ONE));
    }
}
