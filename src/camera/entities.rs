use bevy::prelude::*;

/// Marker component for the overview camera entity.
#[derive(Component, Reflect)]
pub struct TerrainCamera;
