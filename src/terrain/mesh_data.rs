use bevy::math::DVec3;
use bevy::platform::collections::HashMap;

use super::TerrainSettings;
use super::edge_vertices::{self, SUB_GRID_WIDTH};
use super::tile_grid::{Direction, ROW_HEIGHT, TILE_WIDTH, Tile};
use crate::math::Distortion;

/// Multiplier applied before rounding positions into deduplication keys.
pub const KEY_FACTOR: f64 = 1_000_000.0;

/// Vertical size of one local sub-grid row in tile units (1/64).
const SUB_ROW_HEIGHT: f64 = 0.015_625;

/// Planar (XY) bounds of the vertices emitted into a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshBounds {
    /// Smallest X coordinate.
    pub min_x: f64,
    /// Smallest Y coordinate.
    pub min_y: f64,
    /// Greatest X coordinate.
    pub max_x: f64,
    /// Greatest Y coordinate.
    pub max_y: f64,
}

impl MeshBounds {
    /// Bounds containing nothing; the first [`include`](Self::include) sets them.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Grows the bounds to contain `point`.
    pub fn include(&mut self, point: DVec3) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along Y.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether no point was included yet.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }
}

impl Default for MeshBounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// How [`MeshData::add_vertex`] interprets the height and applies noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexOptions {
    /// Height is a world Z (times scale) instead of height-units on top of the tile.
    pub absolute: bool,
    /// Skip the noise displacement.
    pub no_distortion: bool,
}

impl VertexOptions {
    /// Terrain surface: stacked on the tile height, distorted.
    pub const TERRAIN: Self = Self {
        absolute: false,
        no_distortion: false,
    };
    /// Water sheet: absolute height, never distorted.
    pub const WATER: Self = Self {
        absolute: true,
        no_distortion: true,
    };
}

/// Converts tile-local addresses into world positions.
#[derive(Clone)]
pub struct VertexLayout {
    scale: f64,
    height_unit: f64,
    distortion: Distortion,
}

impl VertexLayout {
    /// Layout for the given settings.
    pub fn new(settings: &TerrainSettings) -> Self {
        Self {
            scale: settings.scale,
            height_unit: settings.height_unit,
            distortion: Distortion::new(
                settings.seed,
                settings.noise_x,
                settings.noise_y,
                settings.noise_z,
            ),
        }
    }

    /// Scale from tile units to world units.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Undistorted world position of `local_index` on `tile`.
    ///
    /// The local index addresses a 33-column sub-grid whose origin is the
    /// lower left corner of the tile's bounding box. `height` is in
    /// height-units above the tile base, or an absolute Z when
    /// `absolute` is set.
    pub fn position(&self, tile: &Tile, local_index: usize, height: f64, absolute: bool) -> DVec3 {
        let shift = if tile.y & 1 == 0 { 0.0 } else { TILE_WIDTH / 2.0 };
        let px = f64::from(tile.x) * TILE_WIDTH + shift - TILE_WIDTH / 2.0;
        let py = f64::from(tile.y) * ROW_HEIGHT - 0.5;
        let pz = f64::from(tile.z) * self.height_unit * 4.0;

        let vy = (local_index / SUB_GRID_WIDTH) as f64;
        let vx = (local_index % SUB_GRID_WIDTH) as f64;
        let z = if absolute {
            height
        } else {
            pz + height * self.height_unit
        };

        DVec3::new(
            (px + TILE_WIDTH / 32.0 * vx) * self.scale,
            (py + SUB_ROW_HEIGHT * vy) * self.scale,
            z * self.scale,
        )
    }

    /// Deduplication key of an undistorted world position.
    pub fn key(&self, position: DVec3) -> [i64; 3] {
        (position * KEY_FACTOR / self.scale)
            .round()
            .to_array()
            .map(|c| c as i64)
    }

    /// Noise displacement for an undistorted world position.
    pub fn displacement(&self, position: DVec3) -> DVec3 {
        self.distortion.displacement(position)
    }
}

/// Accumulator for one mesh: deduplicated vertices, triangle indices, bounds.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    vertex_map: HashMap<[i64; 3], u32>,
    vertices: Vec<DVec3>,
    indices: Vec<u32>,
    bounds: MeshBounds,
}

impl MeshData {
    /// Empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one triangle corner at `local_index` of `tile`.
    ///
    /// A vertex whose key was already seen is reused; otherwise it is
    /// displaced (unless `options.no_distortion`), appended and included in
    /// the bounds. The resolved index is always appended to the triangle list.
    pub fn add_vertex(
        &mut self,
        layout: &VertexLayout,
        tile: &Tile,
        local_index: usize,
        height: f64,
        options: VertexOptions,
    ) -> u32 {
        let position = layout.position(tile, local_index, height, options.absolute);
        let key = layout.key(position);
        let index = match self.vertex_map.get(&key) {
            Some(&index) => index,
            None => {
                let displaced = if options.no_distortion {
                    position
                } else {
                    position + layout.displacement(position)
                };
                let index = self.vertices.len() as u32;
                self.vertex_map.insert(key, index);
                self.vertices.push(displaced);
                self.bounds.include(position);
                index
            }
        };
        self.indices.push(index);
        index
    }

    /// Emits a triangle from three `(rule index, height)` corners in `direction`.
    ///
    /// Rule indices are resolved through the edge vertex table; the winding
    /// follows the argument order.
    pub fn add_triangle(
        &mut self,
        layout: &VertexLayout,
        tile: &Tile,
        direction: Direction,
        corners: [(usize, f64); 3],
    ) {
        for (rule_index, height) in corners {
            self.add_vertex(
                layout,
                tile,
                edge_vertices::local_index(direction, rule_index),
                height,
                VertexOptions::TERRAIN,
            );
        }
    }

    /// Emitted vertex positions.
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Triangle indices, three per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Planar bounds of the undistorted vertex positions.
    pub fn bounds(&self) -> MeshBounds {
        self.bounds
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainConfig;

    fn layout() -> VertexLayout {
        VertexLayout::new(&TerrainConfig::default().mesh)
    }

    #[test]
    fn same_vertex_twice_reuses_index() {
        let layout = layout();
        let tile = Tile::new(2, 3, 1);
        let mut mesh = MeshData::new();
        let a = mesh.add_vertex(&layout, &tile, 544, 1.0, VertexOptions::WATER);
        let b = mesh.add_vertex(&layout, &tile, 544, 1.0, VertexOptions::WATER);
        assert_eq!(a, b);
        assert_eq!(mesh.vertices().len(), 1);
        assert_eq!(mesh.indices(), &[a, a]);
    }

    #[test]
    fn shared_border_vertex_of_adjacent_tiles_is_deduplicated() {
        // The right border column of (0, 0) is the left border column of (1, 0).
        let layout = layout();
        let mut mesh = MeshData::new();
        let left = Tile::new(0, 0, 2);
        let right = Tile::new(1, 0, 2);
        let a = mesh.add_vertex(&layout, &left, 16 * 33 + 32, 1.0, VertexOptions::TERRAIN);
        let b = mesh.add_vertex(&layout, &right, 16 * 33, 1.0, VertexOptions::TERRAIN);
        assert_eq!(a, b);
    }

    #[test]
    fn odd_rows_are_shifted_half_a_tile() {
        let layout = layout();
        let even = layout.position(&Tile::new(0, 0, 0), 0, 0.0, false);
        let odd = layout.position(&Tile::new(0, 1, 0), 0, 0.0, false);
        assert!((odd.x - even.x - TILE_WIDTH / 2.0 * layout.scale()).abs() < 1e-9);
        assert!((odd.y - even.y - ROW_HEIGHT * layout.scale()).abs() < 1e-9);
    }

    #[test]
    fn absolute_height_ignores_tile_height() {
        let layout = layout();
        let low = layout.position(&Tile::new(0, 0, 0), 100, 0.075, true);
        let high = layout.position(&Tile::new(0, 0, 9), 100, 0.075, true);
        assert_eq!(low, high);
        assert!((low.z - 0.075 * layout.scale()).abs() < 1e-9);
    }

    #[test]
    fn relative_height_stacks_on_tile_height() {
        let layout = layout();
        let settings = TerrainConfig::default().mesh;
        let p = layout.position(&Tile::new(0, 0, 2), 0, 1.0, false);
        let expected = (2.0 * 4.0 + 1.0) * settings.height_unit * settings.scale;
        assert!((p.z - expected).abs() < 1e-9);
    }

    #[test]
    fn bounds_track_emitted_vertices() {
        let layout = layout();
        let tile = Tile::new(0, 0, 0);
        let mut mesh = MeshData::new();
        assert!(mesh.bounds().is_empty());
        mesh.add_vertex(&layout, &tile, 0, 0.0, VertexOptions::WATER);
        mesh.add_vertex(&layout, &tile, 2 * 33 + 4, 0.0, VertexOptions::WATER);
        let b = mesh.bounds();
        assert!(!b.is_empty());
        assert!((b.width() - TILE_WIDTH / 8.0 * layout.scale()).abs() < 1e-9);
        assert!((b.height() - 2.0 / 64.0 * layout.scale()).abs() < 1e-9);
    }

    #[test]
    fn add_triangle_emits_three_indices() {
        let layout = layout();
        let tile = Tile::new(1, 1, 1);
        let mut mesh = MeshData::new();
        mesh.add_triangle(&layout, &tile, Direction::Right, [(0, 1.0), (6, 1.0), (1, 1.0)]);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices().len(), 3);
    }
}
