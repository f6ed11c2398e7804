//! Noise-backed density oracle.

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use voxeloid_core::{Error, Result};
use voxeloid_voxel::DensityField;

use crate::WorldSeed;

/// Octave limit of the fractal noise.
pub const MAX_OCTAVES: usize = 32;

/// Density field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Seed for noise generation.
    pub seed: WorldSeed,
    /// Noise frequency across the root cube.
    pub frequency: f64,
    /// Number of noise octaves for detail.
    pub octaves: usize,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Noise values above this are solid.
    pub threshold: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 2.0,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            threshold: 0.0,
        }
    }
}

impl DensityConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "frequency must be positive, got {}",
                self.frequency
            )));
        }
        if !(1..=MAX_OCTAVES).contains(&self.octaves) {
            return Err(Error::InvalidConfig(format!(
                "octaves must be in 1..={}, got {}",
                MAX_OCTAVES,
                self.octaves
            )));
        }
        if !self.lacunarity.is_finite() || !self.persistence.is_finite() {
            return Err(Error::InvalidConfig(
                "lacunarity and persistence must be finite".to_string(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig("threshold must be finite".to_string()));
        }
        Ok(())
    }
}

/// Density oracle thresholding fractal Perlin noise.
pub struct NoiseDensity {
    config: DensityConfig,
    noise: Fbm<Perlin>,
}

impl NoiseDensity {
    /// Create a density field with the given configuration.
    pub fn new(config: DensityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Create a density field with default configuration.
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self::from_config(DensityConfig {
            seed,
            ..Default::default()
        })
    }

    fn from_config(config: DensityConfig) -> Self {
        let noise = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves)
            .set_frequency(config.frequency)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence);

        Self { config, noise }
    }

    pub fn config(&self) -> &DensityConfig {
        &self.config
    }

    /// Raw noise value at a position, roughly in [-1, 1].
    pub fn sample(&self, position: Vec3) -> f64 {
        self.noise.get([
            f64::from(position.x),
            f64::from(position.y),
            f64::from(position.z),
        ])
    }
}

impl DensityField for NoiseDensity {
    fn is_solid(&self, position: Vec3) -> bool {
        self.sample(position) > self.config.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxeloid_voxel::{linearize, OccupancyQuery, OctreeBuilder, OctreeConfig};

    fn grid(per_axis: u32) -> impl Iterator<Item = Vec3> {
        let step = 2.0 / per_axis as f32;
        (0..per_axis).flat_map(move |z| {
            (0..per_axis).flat_map(move |y| {
                (0..per_axis).map(move |x| {
                    Vec3::new(x as f32, y as f32, z as f32) * step - 1.0 + step * 0.5
                })
            })
        })
    }

    #[test]
    fn density_deterministic() {
        let a = NoiseDensity::with_seed(12345);
        let b = NoiseDensity::with_seed(12345);
        for p in grid(16) {
            assert_eq!(a.sample(p), b.sample(p));
        }
    }

    #[test]
    fn different_seeds_different_fields() {
        let a = NoiseDensity::with_seed(12345);
        let b = NoiseDensity::with_seed(54321);
        let differences = grid(8).filter(|&p| a.sample(p) != b.sample(p)).count();
        assert!(differences > 256, "Seeds should produce different fields");
    }

    #[test]
    fn threshold_extremes() {
        let all = NoiseDensity::new(DensityConfig {
            threshold: -10.0,
            ..Default::default()
        })
        .unwrap();
        let none = NoiseDensity::new(DensityConfig {
            threshold: 10.0,
            ..Default::default()
        })
        .unwrap();
        assert!(grid(8).all(|p| all.is_solid(p)));
        assert!(grid(8).all(|p| !none.is_solid(p)));
    }

    #[test]
    fn rejects_bad_config() {
        for config in [
            DensityConfig {
                frequency: 0.0,
                ..Default::default()
            },
            DensityConfig {
                octaves: 0,
                ..Default::default()
            },
            DensityConfig {
                threshold: f64::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                NoiseDensity::new(config),
                Err(Error::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn noise_octree_matches_density() {
        let depth = 5;
        let density = NoiseDensity::with_seed(42);
        let builder =
            OctreeBuilder::new(OctreeConfig::with_max_depth(depth), density).unwrap();
        let tree = builder.build();
        assert!(!tree.is_empty());
        assert!(tree.is_well_formed());

        let texture = linearize(&tree).unwrap();
        for p in grid(1 << depth) {
            let expected = builder.density().is_solid(p);
            assert_eq!(tree.contains(p), expected, "sparse at {p:?}");
            assert_eq!(texture.contains(p), expected, "flat at {p:?}");
        }
    }
}
