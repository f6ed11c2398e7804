//! Voxeloid octree inspector
//!
//! Builds a sparse voxel octree from fractal noise, flattens it into an
//! indirection grid, logs size statistics and prints ASCII slices of the
//! density, the sparse tree and the flat grid side by side for comparison.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p voxeloid-inspect -- [OPTIONS]
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod params;

use tracing::info;
use tracing_subscriber::EnvFilter;
use voxeloid_voxel::{linearize, render_slice, DensityField, OccupancyQuery, OctreeBuilder};
use voxeloid_world::NoiseDensity;

use crate::params::InspectParams;

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = InspectParams::from_args()?;
    info!(?params, "Voxeloid inspector");

    let density = NoiseDensity::new(params.density.clone())?;
    let builder = OctreeBuilder::new(params.octree, density)?;

    let (tree, stats) = builder.build_with_stats();
    stats.log();

    let texture = linearize(&tree)?;
    info!(
        cells_per_side = texture.cells_per_side(),
        cells_used = texture.cells_used(),
        bytes = texture.bytes().len(),
        "indirection grid ready"
    );

    let (z, resolution, scale) = (params.slice_z, params.resolution, params.scale);
    let density = builder.density();
    println!("density:\n{}", render_slice(z, resolution, scale, |p| density.is_solid(p)));
    println!("sparse tree:\n{}", render_slice(z, resolution, scale, |p| tree.contains(p)));
    println!("flat grid:\n{}", render_slice(z, resolution, scale, |p| texture.contains(p)));

    Ok(())
}

fn print_help() {
    eprintln!(
        "Voxeloid octree inspector

USAGE:
    cargo run -p voxeloid-inspect -- [OPTIONS]

OCTREE OPTIONS:
    --depth <N>         Maximum octree depth, 1-21 (default: 6)

DENSITY OPTIONS:
    --seed <N>          Noise seed (default: 0)
    --threshold <F>     Noise values above this are solid (default: 0.0)
    --frequency <F>     Noise frequency across the root cube (default: 2.0)
    --octaves <N>       Noise octaves (default: 4)

SLICE OPTIONS:
    --slice-z <F>       Z plane of the printed slices (default: 0.0)
    --resolution <N>    Samples per axis (default: 50)
    --scale <F>         Slice extent relative to the root cube (default: 1.2)

OTHER:
    -h, --help          Print this help message

NOTE: Depths above 8 may exceed the 256-cell indirection grid limit.

ENVIRONMENT VARIABLES:
    RUST_LOG            Set log level (e.g., info, debug, trace)"
    );
}
