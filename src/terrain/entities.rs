use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::TerrainConfig;
use super::builder::{TerrainBuilder, TerrainMeshes};
use super::heightmap::Heightmap;
use super::mesh_data::MeshBounds;
use super::tile_grid::TileGrid;

/// Which of the two generated meshes an entity renders.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainSection {
    /// Terrain surface with walls.
    Terrain,
    /// Water sheet.
    Water,
}

/// Planar extent of the spawned terrain in world space (Bevy X/Z).
///
/// Empty until the first build; reset by a clear.
#[derive(Resource, Reflect, Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainBounds {
    /// Smallest X/Z corner.
    pub min: Vec2,
    /// Greatest X/Z corner.
    pub max: Vec2,
}

impl TerrainBounds {
    /// Bounds of a built mesh; the Z-up Y axis becomes Bevy's Z.
    pub fn from_mesh_bounds(bounds: &MeshBounds) -> Self {
        if bounds.is_empty() {
            return Self::default();
        }
        Self {
            min: Vec2::new(bounds.min_x as f32, bounds.min_y as f32),
            max: Vec2::new(bounds.max_x as f32, bounds.max_y as f32),
        }
    }

    /// Whether nothing is spawned.
    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    /// Center on the ground plane.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Width and depth.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Counts from the last build, shown in the debug panel.
#[derive(Resource, Reflect, Clone, Debug, Default)]
pub struct TerrainStats {
    /// Number of tiles.
    pub tiles: usize,
    /// Grid columns and rows.
    pub grid: IVec2,
    /// Terrain vertices.
    pub terrain_vertices: usize,
    /// Terrain triangles.
    pub terrain_triangles: usize,
    /// Water vertices.
    pub water_vertices: usize,
    /// Water triangles.
    pub water_triangles: usize,
}

impl TerrainStats {
    /// Stats of a finished build.
    pub fn from_meshes(meshes: &TerrainMeshes) -> Self {
        Self {
            tiles: (meshes.grid_width * meshes.grid_height) as usize,
            grid: IVec2::new(meshes.grid_width, meshes.grid_height),
            terrain_vertices: meshes.terrain.positions.len(),
            terrain_triangles: meshes.terrain.triangle_count(),
            water_vertices: meshes.water.positions.len(),
            water_triangles: meshes.water.triangle_count(),
        }
    }
}

/// Heightmap state and pending build.
///
/// `image` is set while an image asset is loading; once decoded it moves
/// into `heightmap`. `pending` requests a build with the current heightmap.
#[derive(Resource, Default)]
pub struct BuildRequest {
    /// Heightmap image still loading.
    pub image: Option<Handle<Image>>,
    /// Decoded heightmap.
    pub heightmap: Option<Heightmap>,
    /// A build should run as soon as the heightmap is available.
    pub pending: bool,
}

/// The most recent build, kept for tile picking.
#[derive(Resource)]
pub struct ActiveTerrain {
    /// Builder used for the build.
    pub builder: TerrainBuilder,
    /// Tile grid the meshes were built from.
    pub grid: TileGrid,
}

/// Shared material handles for the two terrain sections.
#[derive(Resource)]
pub struct TerrainMaterials {
    /// Terrain surface with the grid overlay texture.
    pub terrain: Handle<StandardMaterial>,
    /// Alpha blended water.
    pub water: Handle<StandardMaterial>,
}

/// Bundled system parameters for spawning the built meshes.
#[derive(SystemParam)]
pub struct TerrainRes<'w> {
    /// Mesh assets.
    pub meshes: ResMut<'w, Assets<Mesh>>,
    /// Material assets, for the grid overlay tiling.
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
    /// Shared material handles.
    pub handles: Res<'w, TerrainMaterials>,
    /// Terrain configuration.
    pub cfg: Res<'w, TerrainConfig>,
    /// Bounds published for the camera.
    pub bounds: ResMut<'w, TerrainBounds>,
    /// Debug counts.
    pub stats: ResMut<'w, TerrainStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_swap_into_ground_plane() {
        let bounds = MeshBounds {
            min_x: -10.0,
            min_y: 5.0,
            max_x: 30.0,
            max_y: 25.0,
        };
        let world = TerrainBounds::from_mesh_bounds(&bounds);
        assert_eq!(world.center(), Vec2::new(10.0, 15.0));
        assert_eq!(world.size(), Vec2::new(40.0, 20.0));
        assert!(!world.is_empty());
    }

    #[test]
    fn empty_mesh_bounds_give_empty_world_bounds() {
        assert!(TerrainBounds::from_mesh_bounds(&MeshBounds::EMPTY).is_empty());
    }
}
