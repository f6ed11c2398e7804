//! Command line parameters.

use voxeloid_core::constants::DEFAULT_MAX_DEPTH;
use voxeloid_voxel::OctreeConfig;
use voxeloid_world::DensityConfig;

/// Inspection parameters (from CLI or defaults).
#[derive(Debug, Clone)]
pub struct InspectParams {
    pub octree: OctreeConfig,
    pub density: DensityConfig,
    /// Plane of the printed slices.
    pub slice_z: f32,
    /// Samples per axis in the printed slices.
    pub resolution: usize,
    /// Slice extent relative to the root cube.
    pub scale: f32,
}

impl Default for InspectParams {
    fn default() -> Self {
        Self {
            octree: OctreeConfig::with_max_depth(DEFAULT_MAX_DEPTH),
            density: DensityConfig::default(),
            slice_z: 0.0,
            resolution: 50,
            scale: 1.2,
        }
    }
}

impl InspectParams {
    /// Parse parameters from an argument list, skipping the program name.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut params = Self::default();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = || {
                args.get(i + 1)
                    .map(String::as_str)
                    .ok_or_else(|| anyhow::anyhow!("{flag} expects a value"))
            };
            match flag {
                "--depth" => params.octree.max_depth = value()?.parse()?,
                "--seed" => params.density.seed = value()?.parse()?,
                "--threshold" => params.density.threshold = value()?.parse()?,
                "--frequency" => params.density.frequency = value()?.parse()?,
                "--octaves" => params.density.octaves = value()?.parse()?,
                "--slice-z" => params.slice_z = value()?.parse()?,
                "--resolution" => params.resolution = value()?.parse()?,
                "--scale" => params.scale = value()?.parse()?,
                other => anyhow::bail!("unknown argument: {other}"),
            }
            i += 2;
        }

        Ok(params)
    }

    /// Parse parameters from the process arguments.
    pub fn from_args() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        Self::parse(&args)
    }
}
