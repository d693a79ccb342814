use thiserror::Error;

use super::heightmap::HeightmapError;

/// Anything that stops a terrain build.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// A setting is out of its valid range.
    #[error("invalid terrain configuration: {0}")]
    InvalidConfig(String),
    /// The heightmap could not be read.
    #[error(transparent)]
    Heightmap(#[from] HeightmapError),
    /// A mesh has zero planar extent, so UVs cannot be projected onto it.
    #[error("mesh bounds are degenerate ({width} x {height})")]
    DegenerateBounds {
        /// `max_x - min_x`.
        width: f64,
        /// `max_y - min_y`.
        height: f64,
    },
}
