//! Procedural density fields for the Voxeloid octree builder.

pub mod generation;

pub use generation::{DensityConfig, NoiseDensity, MAX_OCTAVES};

/// Seed for procedural generation.
pub type WorldSeed = u32;
