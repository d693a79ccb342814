use bevy::asset::LoadState;
use bevy::math::{Affine2, DVec2};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::egui;

use super::builder::{TerrainBuilder, TerrainMeshes};
use super::entities::{
    ActiveTerrain, BuildRequest, TerrainBounds, TerrainRes, TerrainSection, TerrainStats,
};
use super::heightmap::Heightmap;

// ── Build ───────────────────────────────────────────────────────────

/// `B` rebuilds the terrain, `C` removes it.
pub fn handle_terrain_keys(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mut request: ResMut<BuildRequest>,
    sections: Query<Entity, With<TerrainSection>>,
    mut bounds: ResMut<TerrainBounds>,
    mut stats: ResMut<TerrainStats>,
) {
    if keys.just_pressed(KeyCode::KeyB) {
        request.pending = true;
    }
    if keys.just_pressed(KeyCode::KeyC) {
        clear_sections(&mut commands, &sections);
        commands.remove_resource::<ActiveTerrain>();
        *bounds = TerrainBounds::default();
        *stats = TerrainStats::default();
        info!("Terrain cleared.");
    }
}

/// Decodes the heightmap image once its asset has loaded.
///
/// A failed load or an unreadable image ends the app with an error.
pub fn resolve_heightmap(
    mut request: ResMut<BuildRequest>,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(handle) = request.image.clone() else {
        return;
    };
    match asset_server.load_state(&handle) {
        LoadState::Loaded => {
            let Some(image) = images.get(&handle) else {
                return;
            };
            match Heightmap::from_image(image) {
                Ok(heightmap) => request.heightmap = Some(heightmap),
                Err(err) => {
                    error!("Could not read heightmap: {err}");
                    exit.write(AppExit::error());
                }
            }
            request.image = None;
        }
        LoadState::Failed(err) => {
            error!("Could not load heightmap: {err}");
            request.image = None;
            exit.write(AppExit::error());
        }
        _ => {}
    }
}

/// Builds the meshes for a pending request and replaces the spawned sections.
pub fn build_terrain(
    mut commands: Commands,
    mut request: ResMut<BuildRequest>,
    mut res: TerrainRes,
    sections: Query<Entity, With<TerrainSection>>,
    mut exit: MessageWriter<AppExit>,
) {
    if !request.pending || request.heightmap.is_none() {
        return;
    }
    request.pending = false;
    let Some(heightmap) = request.heightmap.as_ref() else {
        return;
    };

    let built = TerrainBuilder::new(res.cfg.mesh.clone()).and_then(|builder| {
        let grid = builder.grid(heightmap);
        let meshes = builder.build_grid(&grid)?;
        Ok((ActiveTerrain { builder, grid }, meshes))
    });
    let (active, meshes) = match built {
        Ok(built) => built,
        Err(err) => {
            error!("Terrain build failed: {err}");
            exit.write(AppExit::error());
            return;
        }
    };

    clear_sections(&mut commands, &sections);
    spawn_sections(&mut commands, &mut res, &meshes);
    *res.bounds = TerrainBounds::from_mesh_bounds(&meshes.bounds);
    *res.stats = TerrainStats::from_meshes(&meshes);
    commands.insert_resource(active);
}

// ── Debug ───────────────────────────────────────────────────────────

/// Shows build counts and the tile under the cursor in an egui window.
pub fn draw_terrain_stats(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    window_q: Query<&Window, With<PrimaryWindow>>,
    stats: Res<TerrainStats>,
    active: Option<Res<ActiveTerrain>>,
) {
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let hovered = active.as_deref().and_then(|active| {
        let cursor = window_q.single().ok()?.cursor_position()?;
        let (camera, cam_gt) = camera_q.single().ok()?;
        let ray = camera.viewport_to_world(cam_gt, cursor).ok()?;
        let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
        let point = ray.get_point(distance);
        active
            .builder
            .tile_at(&active.grid, DVec2::new(f64::from(point.x), f64::from(point.z)))
            .copied()
    });

    egui::Window::new("Terrain").show(ctx.get_mut(), |ui| {
        ui.label(format!(
            "Grid: {} x {} ({} tiles)",
            stats.grid.x, stats.grid.y, stats.tiles
        ));
        ui.label(format!(
            "Terrain: {} vertices, {} triangles",
            stats.terrain_vertices, stats.terrain_triangles
        ));
        ui.label(format!(
            "Water: {} vertices, {} triangles",
            stats.water_vertices, stats.water_triangles
        ));
        match hovered {
            Some(tile) => ui.label(format!("Tile ({}, {}) height {}", tile.x, tile.y, tile.z)),
            None => ui.label("Tile: -"),
        };
        ui.label("B: rebuild   C: clear");
    });
}

// ── Helpers ─────────────────────────────────────────────────────────

fn clear_sections(commands: &mut Commands, sections: &Query<Entity, With<TerrainSection>>) {
    for entity in sections {
        commands.entity(entity).despawn();
    }
}

fn spawn_sections(commands: &mut Commands, res: &mut TerrainRes, meshes: &TerrainMeshes) {
    let tiling = meshes.material_tiling(res.cfg.mesh.scale);
    if let Some(material) = res.materials.get_mut(&res.handles.terrain) {
        material.uv_transform = Affine2::from_scale(tiling.uv_scale());
    }

    let sections = [
        (TerrainSection::Terrain, &meshes.terrain, res.handles.terrain.clone()),
        (TerrainSection::Water, &meshes.water, res.handles.water.clone()),
    ];
    for (section, mesh, material) in sections {
        if mesh.is_empty() {
            continue;
        }
        commands.spawn((
            section,
            Name::new(format!("{section:?}")),
            Mesh3d(res.meshes.add(mesh.to_bevy_mesh())),
            MeshMaterial3d(material),
            Transform::default(),
        ));
    }
}
