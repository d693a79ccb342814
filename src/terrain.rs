//! Hex tile terrain: heightmap → tile grid → terrain and water meshes.
//!
//! The geometry core ([`TerrainBuilder`]) is plain Rust over `f64` buffers.
//! [`TerrainPlugin`] wraps it: it loads or generates the heightmap, builds
//! once the data is ready and spawns one entity per finished mesh.

mod builder;
mod edge_vertices;
mod entities;
mod error;
mod heightmap;
mod mesh_data;
mod post_process;
mod startup_systems;
mod synthesizer;
mod systems;
mod tile_grid;

pub use builder::{MaterialTiling, TerrainBuilder, TerrainMeshes};
pub use edge_vertices::{EDGE_VERTICES, SUB_GRID_WIDTH};
pub use entities::{TerrainBounds, TerrainSection, TerrainStats};
pub use error::TerrainError;
pub use heightmap::{Heightmap, HeightmapError};
pub use mesh_data::{MeshBounds, MeshData, VertexLayout, VertexOptions};
pub use post_process::{FinishedMesh, compute_normals, compute_uvs};
pub use synthesizer::TileSynthesizer;
pub use tile_grid::{Direction, ROW_HEIGHT, TILE_WIDTH, Tile, TileGrid};

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::GameState;
use crate::math::NoiseParameters;

/// Nested configuration for the terrain subsystem.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct TerrainConfig {
    /// Mesh generation settings.
    pub mesh: TerrainSettings,
    /// Where the heightmap comes from.
    pub heightmap: HeightmapSource,
    /// Procedural heightmap used by [`HeightmapSource::Noise`].
    pub noise_map: NoiseMapSettings,
    /// Base color of the terrain surface.
    pub terrain_color: Color,
    /// Base color of the water sheet (alpha blended).
    pub water_color: Color,
    /// Background clear color.
    pub clear_color: Color,
}

/// Parameters of the tile geometry.
#[derive(Clone, Debug, Reflect)]
pub struct TerrainSettings {
    /// Subtracted from every tile height after the height factor.
    pub sea_level: i32,
    /// Heightmap values per tile level (integer division).
    pub height_factor: i32,
    /// World-Z per height-unit before scaling; a tile level is four units.
    pub height_unit: f64,
    /// Bevel of the wall edges in height-units, in `[0, 1]`.
    pub wall_edge_height: f64,
    /// Lowers the water sheet below three height-units.
    pub water_offset: f64,
    /// Tile units to world units.
    pub scale: f64,
    /// Seed of the distortion noise.
    pub seed: u32,
    /// Displacement along X, sampled at `(y, z)`.
    pub noise_x: NoiseParameters,
    /// Displacement along Y, sampled at `(x, z)`.
    pub noise_y: NoiseParameters,
    /// Displacement along Z, sampled at `(x, y)`.
    pub noise_z: NoiseParameters,
}

impl TerrainSettings {
    /// Checks every setting against its valid range.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let invalid = |message: String| Err(TerrainError::InvalidConfig(message));
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if self.height_factor <= 0 {
            return invalid(format!("height_factor must be positive, got {}", self.height_factor));
        }
        if !positive(self.height_unit) {
            return invalid(format!("height_unit must be positive, got {}", self.height_unit));
        }
        if !positive(self.scale) {
            return invalid(format!("scale must be positive, got {}", self.scale));
        }
        if !(0.0..=1.0).contains(&self.wall_edge_height) {
            return invalid(format!(
                "wall_edge_height must be within [0, 1], got {}",
                self.wall_edge_height
            ));
        }
        for (axis, params) in [("x", &self.noise_x), ("y", &self.noise_y), ("z", &self.noise_z)] {
            if params.octaves == 0 {
                return invalid(format!("noise_{axis}: octaves must be at least 1"));
            }
            if !positive(params.frequency) {
                return invalid(format!("noise_{axis}: frequency must be positive"));
            }
            if !params.size.is_finite() || params.size.x == 0.0 || params.size.y == 0.0 {
                return invalid(format!("noise_{axis}: size must be finite and non-zero"));
            }
        }
        Ok(())
    }
}

/// Source of the heightmap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
pub enum HeightmapSource {
    /// Generate it with [`NoiseMapSettings`].
    #[default]
    Noise,
    /// Load an image asset; the red channel is the height.
    Image(String),
}

/// Procedural heightmap generation.
#[derive(Clone, Debug, Reflect)]
pub struct NoiseMapSettings {
    /// Columns of the generated heightmap.
    pub width: u32,
    /// Rows of the generated heightmap.
    pub height: u32,
    /// Seed of the fBm generator.
    pub seed: u32,
    /// Number of fBm octaves.
    pub octaves: usize,
    /// Spatial scale divisor for sampling.
    pub noise_scale: f64,
    /// Heightmap value of the noise maximum (at most 255).
    pub max_value: f32,
}

impl Default for NoiseMapSettings {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            seed: 42,
            octaves: 4,
            noise_scale: 12.0,
            max_value: 56.0,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        let noise = |offset: DVec2, amplitude: f64| NoiseParameters {
            size: DVec2::splat(100.0),
            offset,
            octaves: 3,
            frequency: 1.0,
            amplitude,
            redistribution: 1.0,
        };
        Self {
            mesh: TerrainSettings {
                sea_level: 0,
                height_factor: 8,
                height_unit: 0.025,
                wall_edge_height: 0.5,
                water_offset: 0.0,
                scale: 100.0,
                seed: 7,
                noise_x: noise(DVec2::new(0.0, 0.0), 2.0),
                noise_y: noise(DVec2::new(31.4, 12.7), 2.0),
                noise_z: noise(DVec2::new(-17.3, 44.1), 0.75),
            },
            heightmap: HeightmapSource::Noise,
            noise_map: NoiseMapSettings::default(),
            terrain_color: Color::srgb(0.36, 0.52, 0.27),
            water_color: Color::srgba(0.1, 0.35, 0.6, 0.7),
            clear_color: Color::srgb(0.55, 0.7, 0.85),
        }
    }
}

/// Terrain plugin: heightmap loading at startup, mesh building once it is ready.
pub struct TerrainPlugin(pub TerrainConfig);

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TerrainConfig>()
            .register_type::<TerrainSection>()
            .register_type::<TerrainBounds>()
            .register_type::<TerrainStats>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .init_resource::<TerrainBounds>()
            .init_resource::<TerrainStats>()
            .init_resource::<entities::BuildRequest>()
            .add_systems(
                Startup,
                (
                    startup_systems::create_materials,
                    startup_systems::request_heightmap,
                ),
            )
            .add_systems(
                Update,
                (
                    systems::handle_terrain_keys,
                    systems::resolve_heightmap,
                    systems::build_terrain,
                )
                    .chain(),
            );

        app.add_systems(
            bevy_egui::EguiPrimaryContextPass,
            systems::draw_terrain_stats.run_if(in_state(GameState::Debugging)),
        );
    }
}
