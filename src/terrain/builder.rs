use bevy::math::DVec2;
use bevy::prelude::*;

use super::TerrainSettings;
use super::error::TerrainError;
use super::heightmap::Heightmap;
use super::mesh_data::{MeshBounds, MeshData, VertexLayout, VertexOptions};
use super::post_process::FinishedMesh;
use super::synthesizer::TileSynthesizer;
use super::tile_grid::{Tile, TileGrid};

/// Water sheet height in height-units, before the configured offset.
const WATER_LEVEL: f64 = 3.0;

/// Output of one terrain build.
#[derive(Clone, Debug)]
pub struct TerrainMeshes {
    /// Terrain surface, walls included.
    pub terrain: FinishedMesh,
    /// Flat water sheet over sea and coast tiles.
    pub water: FinishedMesh,
    /// Planar bounds of the terrain surface.
    pub bounds: MeshBounds,
    /// Columns of the tile grid.
    pub grid_width: i32,
    /// Rows of the tile grid.
    pub grid_height: i32,
}

/// Repetition of a grid overlay texture over the terrain UVs, so that one
/// texture period covers one tile column and two tile rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialTiling {
    /// Texture repetitions along U.
    pub grid_tile_x: f64,
    /// Texture repetitions along V.
    pub grid_tile_y: f64,
    /// Mesh scale the terrain was built with.
    pub scale: f64,
}

impl MaterialTiling {
    /// Tiling as a UV scale.
    pub fn uv_scale(&self) -> Vec2 {
        Vec2::new(self.grid_tile_x as f32, self.grid_tile_y as f32)
    }
}

impl TerrainMeshes {
    /// Grid overlay tiling for the terrain material.
    pub fn material_tiling(&self, scale: f64) -> MaterialTiling {
        MaterialTiling {
            grid_tile_x: f64::from(self.grid_width) + 0.5,
            grid_tile_y: (f64::from(self.grid_height) * 0.75 + 0.25) / 1.5,
            scale,
        }
    }
}

/// Builds terrain and water meshes from heightmaps with fixed settings.
#[derive(Clone)]
pub struct TerrainBuilder {
    settings: TerrainSettings,
    layout: VertexLayout,
}

impl TerrainBuilder {
    /// Validates `settings` and prepares the vertex layout.
    pub fn new(settings: TerrainSettings) -> Result<Self, TerrainError> {
        settings.validate()?;
        let layout = VertexLayout::new(&settings);
        Ok(Self { settings, layout })
    }

    /// Settings this builder was created with.
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// Tile grid of `heightmap` under the configured sea level and height factor.
    pub fn grid(&self, heightmap: &Heightmap) -> TileGrid {
        TileGrid::build(
            heightmap,
            self.settings.sea_level,
            self.settings.height_factor,
        )
    }

    /// Builds both meshes for `heightmap`.
    pub fn build(&self, heightmap: &Heightmap) -> Result<TerrainMeshes, TerrainError> {
        self.build_grid(&self.grid(heightmap))
    }

    /// Builds both meshes for an existing tile grid.
    pub fn build_grid(&self, grid: &TileGrid) -> Result<TerrainMeshes, TerrainError> {
        info!(
            "Start building terrain ({} x {} tiles).",
            grid.width(),
            grid.height()
        );

        let terrain = FinishedMesh::finish(&self.terrain_mesh_data(grid))?;
        info!(
            "Terrain mesh created ({} vertices, {} triangles).",
            terrain.positions.len(),
            terrain.triangle_count()
        );

        let water = FinishedMesh::finish(&self.water_mesh_data(grid))?;
        info!(
            "Water mesh created ({} vertices, {} triangles).",
            water.positions.len(),
            water.triangle_count()
        );

        Ok(TerrainMeshes {
            bounds: terrain.bounds,
            terrain,
            water,
            grid_width: grid.width(),
            grid_height: grid.height(),
        })
    }

    /// Terrain surface of every tile, before post-processing.
    pub fn terrain_mesh_data(&self, grid: &TileGrid) -> MeshData {
        let synthesizer = TileSynthesizer::new(&self.layout, self.settings.wall_edge_height);
        let mut mesh = MeshData::new();
        for tile in grid.tiles() {
            synthesizer.synthesize(&mut mesh, grid, tile);
        }
        mesh
    }

    /// Water sheet over every tile at or below sea level or on a coast.
    pub fn water_mesh_data(&self, grid: &TileGrid) -> MeshData {
        let height = self.settings.height_unit * WATER_LEVEL - self.settings.water_offset;
        let mut mesh = MeshData::new();
        for tile in grid
            .tiles()
            .iter()
            .filter(|tile| tile.z <= 0 || grid.has_coast(tile))
        {
            self.water_fan(&mut mesh, tile, height);
        }
        mesh
    }

    /// Flat hexagon over the whole tile, built from the bottom and top rows
    /// towards the middle.
    fn water_fan(&self, mesh: &mut MeshData, tile: &Tile, height: f64) {
        let mut vertex = |index: usize| {
            mesh.add_vertex(&self.layout, tile, index, height, VertexOptions::WATER);
        };
        for row in 0..8 {
            for col in 0..row + 9 {
                let offset = col * 68 + row * 64;
                for index in [16 + offset, 80 + offset, 148 + offset] {
                    vertex(index);
                }
                for index in [1996 - offset, 2128 - offset, 2064 - offset] {
                    vertex(index);
                }
                if col < row + 8 {
                    for index in [16 + offset, 148 + offset, 84 + offset] {
                        vertex(index);
                    }
                    for index in [1996 - offset, 2060 - offset, 2128 - offset] {
                        vertex(index);
                    }
                }
            }
        }
    }

    /// Tile under the world-space point `(x, y)`, if inside `grid`.
    pub fn tile_at<'g>(&self, grid: &'g TileGrid, point: DVec2) -> Option<&'g Tile> {
        let position = TileGrid::position_at(point / self.settings.scale);
        grid.tile(position.x, position.y)
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec3;

    use super::*;
    use crate::math::{self, NoiseParameters};
    use crate::terrain::TerrainConfig;

    /// Local index of the tile center.
    const CENTER: usize = 32 * 33 + 16;

    fn flat_settings() -> TerrainSettings {
        TerrainSettings {
            noise_x: NoiseParameters::FLAT,
            noise_y: NoiseParameters::FLAT,
            noise_z: NoiseParameters::FLAT,
            ..TerrainConfig::default().mesh
        }
    }

    fn flat_builder() -> TerrainBuilder {
        TerrainBuilder::new(flat_settings()).unwrap()
    }

    fn grid(width: u32, height: u32, heights: &[i32]) -> TileGrid {
        TileGrid::from_heights(width, height, heights).unwrap()
    }

    fn contains(mesh: &FinishedMesh, point: DVec3) -> bool {
        mesh.positions.iter().any(|p| (*p - point).length() < 1e-9)
    }

    fn assert_indices_valid(mesh: &FinishedMesh) {
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
        assert_eq!(mesh.uvs.len(), mesh.positions.len());
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    // ── Construction ────────────────────────────────────────────────

    #[test]
    fn invalid_settings_are_rejected() {
        let mut settings = flat_settings();
        settings.noise_x.octaves = 0;
        assert!(matches!(
            TerrainBuilder::new(settings),
            Err(TerrainError::InvalidConfig(_))
        ));
    }

    // ── Scenarios ───────────────────────────────────────────────────

    #[test]
    fn two_by_two_with_one_sea_tile() {
        let builder = flat_builder();
        let grid = grid(2, 2, &[2, 2, 2, 0]);
        let meshes = builder.build_grid(&grid).unwrap();
        assert_indices_valid(&meshes.terrain);
        assert_indices_valid(&meshes.water);

        let layout = VertexLayout::new(&flat_settings());
        let water_height = flat_settings().height_unit * WATER_LEVEL;
        for tile in grid.tiles() {
            let cap = layout.position(tile, CENTER, 1.0, false);
            assert!(contains(&meshes.terrain, cap), "no center fan for {tile:?}");
            let water = layout.position(tile, CENTER, water_height, true);
            assert!(contains(&meshes.water, water), "no water for {tile:?}");
        }

        let positions = &meshes.terrain.positions;
        let has_wall = meshes.terrain.indices.chunks_exact(3).any(|t| {
            let n = math::face_normal(
                positions[t[0] as usize],
                positions[t[1] as usize],
                positions[t[2] as usize],
            );
            n.z == 0.0 && n.length() > 0.0
        });
        assert!(has_wall);

        let level = builder.build_grid(&self::grid(2, 2, &[2, 2, 2, 2])).unwrap();
        assert!(meshes.terrain.triangle_count() > level.terrain.triangle_count());
    }

    #[test]
    fn two_by_two_with_one_sea_tile_at_default_settings() {
        let settings = TerrainConfig::default().mesh;
        let builder = TerrainBuilder::new(settings.clone()).unwrap();
        let grid = grid(2, 2, &[2, 2, 2, 0]);
        let meshes = builder.build_grid(&grid).unwrap();
        assert_indices_valid(&meshes.terrain);
        assert_indices_valid(&meshes.water);

        let finite = |mesh: &FinishedMesh| {
            mesh.positions.iter().all(|p| p.is_finite())
                && mesh.normals.iter().all(|n| n.is_finite())
                && mesh.uvs.iter().all(|uv| uv.is_finite())
        };
        assert!(finite(&meshes.terrain));
        assert!(finite(&meshes.water));

        // Water is never distorted, so its fans sit exactly over every tile.
        let layout = VertexLayout::new(&settings);
        let water_height = settings.height_unit * WATER_LEVEL - settings.water_offset;
        for tile in grid.tiles() {
            let water = layout.position(tile, CENTER, water_height, true);
            assert!(contains(&meshes.water, water), "no water for {tile:?}");
        }

        // Distortion moves vertices but keeps the topology of the flat build.
        let flat = flat_builder().build_grid(&grid).unwrap();
        assert_eq!(meshes.terrain.positions.len(), flat.terrain.positions.len());
        assert_eq!(meshes.terrain.triangle_count(), flat.terrain.triangle_count());
        assert_ne!(meshes.terrain.positions, flat.terrain.positions);
    }

    #[test]
    fn build_is_deterministic() {
        let builder = TerrainBuilder::new(TerrainConfig::default().mesh).unwrap();
        let grid = grid(3, 3, &[1, 2, 3, 0, 4, 2, 1, 1, 5]);
        let a = builder.build_grid(&grid).unwrap();
        let b = builder.build_grid(&grid).unwrap();
        assert_eq!(a.terrain.positions, b.terrain.positions);
        assert_eq!(a.terrain.indices, b.terrain.indices);
        assert_eq!(a.water.positions, b.water.positions);
        assert_eq!(a.terrain.normals, b.terrain.normals);
        assert_indices_valid(&a.terrain);
    }

    #[test]
    fn build_reads_heightmap_through_height_factor() {
        let builder = flat_builder();
        let heightmap = Heightmap::new(2, 1, vec![16, 7]).unwrap();
        let grid = builder.grid(&heightmap);
        assert_eq!(grid.tile(0, 0).map(|t| t.z), Some(2));
        assert_eq!(grid.tile(1, 0).map(|t| t.z), Some(0));
        let meshes = builder.build(&heightmap).unwrap();
        assert_eq!((meshes.grid_width, meshes.grid_height), (2, 1));
    }

    // ── Post-processing ─────────────────────────────────────────────

    #[test]
    fn flat_tile_normals_point_up() {
        let meshes = flat_builder().build_grid(&grid(1, 1, &[1])).unwrap();
        assert!(!meshes.terrain.is_empty());
        for n in &meshes.terrain.normals {
            assert!((*n - DVec3::Z).length() < 1e-9, "{n:?}");
        }
    }

    #[test]
    fn flat_tile_uvs_span_unit_square() {
        let meshes = flat_builder().build_grid(&grid(1, 1, &[1])).unwrap();
        let uvs = &meshes.terrain.uvs;
        assert!(uvs.iter().all(|uv| (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)));
        let min = uvs.iter().fold(DVec2::INFINITY, |a, &b| a.min(b));
        let max = uvs.iter().fold(DVec2::NEG_INFINITY, |a, &b| a.max(b));
        assert!(min.abs_diff_eq(DVec2::ZERO, 1e-12));
        assert!(max.abs_diff_eq(DVec2::ONE, 1e-12));
    }

    // ── Water ───────────────────────────────────────────────────────

    #[test]
    fn inland_tile_gets_no_water() {
        let builder = flat_builder();
        let grid = grid(3, 3, &[1; 9]);
        let water = FinishedMesh::finish(&builder.water_mesh_data(&grid)).unwrap();
        let layout = VertexLayout::new(&flat_settings());
        let height = flat_settings().height_unit * WATER_LEVEL;
        let inland = grid.tile(1, 1).unwrap();
        assert!(!contains(&water, layout.position(inland, CENTER, height, true)));
        let shore = grid.tile(0, 0).unwrap();
        assert!(contains(&water, layout.position(shore, CENTER, height, true)));
    }

    #[test]
    fn sea_tile_always_gets_water() {
        let builder = flat_builder();
        let grid = grid(3, 3, &[1, 1, 1, 1, 0, 1, 1, 1, 1]);
        let water = FinishedMesh::finish(&builder.water_mesh_data(&grid)).unwrap();
        let layout = VertexLayout::new(&flat_settings());
        let height = flat_settings().height_unit * WATER_LEVEL;
        let sea = grid.tile(1, 1).unwrap();
        assert!(contains(&water, layout.position(sea, CENTER, height, true)));
    }

    #[test]
    fn water_sheet_is_flat_and_faces_up() {
        let builder = flat_builder();
        let water = FinishedMesh::finish(&builder.water_mesh_data(&grid(1, 1, &[0]))).unwrap();
        let expected = flat_settings().height_unit * WATER_LEVEL * flat_settings().scale;
        assert!(water.positions.iter().all(|p| (p.z - expected).abs() < 1e-9));
        assert!(water.normals.iter().all(|n| (*n - DVec3::Z).length() < 1e-9));
    }

    #[test]
    fn water_offset_lowers_the_sheet() {
        let settings = TerrainSettings {
            water_offset: 0.01,
            ..flat_settings()
        };
        let builder = TerrainBuilder::new(settings.clone()).unwrap();
        let water = FinishedMesh::finish(&builder.water_mesh_data(&grid(1, 1, &[0]))).unwrap();
        let expected = (settings.height_unit * WATER_LEVEL - 0.01) * settings.scale;
        assert!(water.positions.iter().all(|p| (p.z - expected).abs() < 1e-9));
    }

    // ── Picking and tiling ──────────────────────────────────────────

    #[test]
    fn tile_at_finds_tile_under_its_center() {
        let builder = flat_builder();
        let grid = grid(3, 3, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let scale = builder.settings().scale;
        for tile in grid.tiles() {
            let center = TileGrid::center(tile.x, tile.y) * scale;
            assert_eq!(builder.tile_at(&grid, center), Some(tile));
        }
        assert_eq!(builder.tile_at(&grid, DVec2::new(-5.0, -5.0) * scale), None);
    }

    #[test]
    fn material_tiling_follows_grid_size() {
        let meshes = flat_builder().build_grid(&grid(4, 6, &[1; 24])).unwrap();
        let tiling = meshes.material_tiling(100.0);
        assert_eq!(tiling.grid_tile_x, 4.5);
        assert_eq!(tiling.grid_tile_y, (6.0 * 0.75 + 0.25) / 1.5);
    }
}
