use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::render::view::Hdr;

use super::CameraConfig;
use super::entities::TerrainCamera;
use crate::terrain::TerrainBounds;

/// Spawns the Camera3d entity with HDR and a directional sun.
pub fn spawn_camera(mut commands: Commands, cfg: Res<CameraConfig>) {
    commands.spawn((
        Name::new("TerrainCamera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Projection::Perspective(PerspectiveProjection {
            far: cfg.far,
            ..default()
        }),
        Transform::from_xyz(0.0, 500.0, 500.0).looking_at(Vec3::ZERO, Vec3::Y),
        TerrainCamera,
    ));
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: cfg.sun_illuminance,
            ..default()
        },
        Transform::from_xyz(1.0, 2.0, 0.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Moves the camera to look at the whole terrain.
pub fn frame_terrain(
    bounds: Res<TerrainBounds>,
    cfg: Res<CameraConfig>,
    mut query: Query<&mut Transform, With<TerrainCamera>>,
) {
    let Some(target) = framing_transform(&bounds, &cfg) else {
        return;
    };
    for mut transform in &mut query {
        *transform = target;
    }
}

/// Camera transform looking at the bounds center from the south, or `None`
/// for empty bounds.
pub fn framing_transform(bounds: &TerrainBounds, cfg: &CameraConfig) -> Option<Transform> {
    if bounds.is_empty() {
        return None;
    }
    let center = bounds.center();
    let target = Vec3::new(center.x, 0.0, center.y);
    let distance = bounds.size().max_element() * cfg.distance_factor;
    let offset = Vec3::new(0.0, cfg.elevation.sin(), cfg.elevation.cos()) * distance;
    Some(Transform::from_translation(target + offset).looking_at(target, Vec3::Y))
}
