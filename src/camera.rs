//! Fixed overview camera that frames the generated terrain.
//!
//! Spawns the Camera3d entity and a sun light; whenever the published
//! [`TerrainBounds`](crate::terrain::TerrainBounds) change, the camera is
//! moved so the whole terrain is in view.

mod entities;
mod systems;

pub use entities::TerrainCamera;

use bevy::prelude::*;

use crate::terrain::TerrainBounds;

/// Per-plugin configuration for the overview camera.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Camera distance from the terrain center, as a multiple of the larger
    /// terrain extent.
    pub distance_factor: f32,
    /// Elevation angle above the ground plane in radians.
    pub elevation: f32,
    /// Far clipping plane; the terrain scale puts tiles tens of units apart.
    pub far: f32,
    /// Sun illuminance in lux.
    pub sun_illuminance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance_factor: 0.9,
            elevation: 0.9,
            far: 100_000.0,
            sun_illuminance: 8_000.0,
        }
    }
}

/// Overview camera and lighting.
pub struct CameraPlugin(pub CameraConfig);

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TerrainCamera>()
            .register_type::<CameraConfig>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                systems::frame_terrain.run_if(resource_changed::<TerrainBounds>),
            );
    }
}
