//! Per-tile topology rules.
//!
//! A tile is a flat hexagonal cap (the center fan) surrounded by six wedges,
//! one per [`Direction`]. Each wedge is built from an inner edge strip, an
//! outer edge strip, two inner and two outer corners, and as many cliff walls
//! as the height differences to the three neighbours facing that wedge need.
//! Heights below are in height-units relative to the tile base; one tile level
//! is four height-units.

use super::mesh_data::{MeshData, VertexLayout, VertexOptions};
use super::tile_grid::{Direction, Tile, TileGrid};

/// Height-units per tile level.
const LEVEL: f64 = 4.0;

/// Rule indices spanning the left side wall.
const LEFT_SIDE_WALL: (usize, usize) = (27, 11);
/// Rule indices spanning the right side wall.
const RIGHT_SIDE_WALL: (usize, usize) = (17, 33);

/// Emits the terrain geometry of tiles into a [`MeshData`].
pub struct TileSynthesizer<'a> {
    layout: &'a VertexLayout,
    wall_edge_height: f64,
}

impl<'a> TileSynthesizer<'a> {
    /// Synthesizer placing vertices with `layout` and bevelling walls by
    /// `wall_edge_height` height-units.
    pub fn new(layout: &'a VertexLayout, wall_edge_height: f64) -> Self {
        Self {
            layout,
            wall_edge_height,
        }
    }

    /// Emits the complete geometry of `tile`: center fan plus all six wedges.
    pub fn synthesize(&self, mesh: &mut MeshData, grid: &TileGrid, tile: &Tile) {
        self.center_fan(mesh, tile);
        for direction in Direction::ALL {
            let [left, center, right] = grid.neighbour_heights(tile, direction);
            let mut wedge = Wedge {
                mesh: &mut *mesh,
                layout: self.layout,
                tile,
                direction,
                wall_edge_height: self.wall_edge_height,
            };
            wedge.inner_edge(center);
            wedge.outer_edge(left, center, right);
            wedge.inner_corners(left, center, right);
            wedge.outer_corners(left, center, right);
            wedge.center_wall(center);
            wedge.side_wall(center, left, LEFT_SIDE_WALL);
            wedge.side_wall(center, right, RIGHT_SIDE_WALL);
            wedge.left_corner_wall(center, left);
            wedge.right_corner_wall(center, right);
        }
    }

    /// Flat cap of the tile at one height-unit, independent of neighbours.
    pub fn center_fan(&self, mesh: &mut MeshData, tile: &Tile) {
        let mut vertex = |index: usize| {
            mesh.add_vertex(self.layout, tile, index, 1.0, VertexOptions::TERRAIN);
        };
        for row in 0..4 {
            for col in 0..row + 5 {
                let offset = col * 68 + row * 64;
                // Lower half, mirrored by the upper half.
                for index in [544 + offset, 608 + offset, 676 + offset] {
                    vertex(index);
                }
                for index in [1600 - offset, 1536 - offset, 1468 - offset] {
                    vertex(index);
                }
                if col < row + 4 {
                    for index in [544 + offset, 676 + offset, 612 + offset] {
                        vertex(index);
                    }
                    for index in [1600 - offset, 1468 - offset, 1532 - offset] {
                        vertex(index);
                    }
                }
            }
        }
    }
}

/// Heights of the two inner corner triangles for a tile against its center
/// and side neighbours.
pub fn inner_corner_heights(tile: i32, center: i32, side: i32) -> [f64; 4] {
    if tile < center {
        [1.0, 2.0, 1.5, 2.0]
    } else if tile == center && tile < side {
        [1.0, 1.0, 1.5, 2.0]
    } else if tile == center && tile > side {
        [1.0, 1.0, 0.5, 0.0]
    } else if tile > center {
        [1.0, 0.0, 0.5, 0.0]
    } else {
        [1.0; 4]
    }
}

/// Heights of the two outer corner triangles for a tile against its center
/// and side neighbours.
pub fn outer_corner_heights(tile: i32, center: i32, side: i32) -> [f64; 4] {
    let center_diff = f64::from(center - tile) * LEVEL;
    let side_diff = f64::from(side - tile) * LEVEL;

    if tile < center && tile <= side {
        [2.0, 3.0, 2.5, 3.0]
    } else if tile == center && tile < side {
        [2.0, 2.0, 2.5, 3.0]
    } else if tile > side && center > side {
        [
            side_diff + 4.0,
            side_diff + 4.0,
            side_diff + 3.5,
            side_diff + 3.0,
        ]
    } else if tile > center && center <= side {
        [
            center_diff + 4.0,
            center_diff + 3.0,
            center_diff + 3.5,
            center_diff + 3.0,
        ]
    } else {
        [1.0; 4]
    }
}

/// Top-to-bottom heights of one wall level starting at `top`: upper edge,
/// upper bevel, middle, lower bevel, lower edge.
fn wall_level(top: f64, wall_edge_height: f64) -> [f64; 5] {
    [
        top,
        top - wall_edge_height,
        top - 2.0,
        top - (LEVEL - wall_edge_height),
        top - LEVEL,
    ]
}

/// One direction of one tile while it is being emitted.
struct Wedge<'m, 'a> {
    mesh: &'m mut MeshData,
    layout: &'a VertexLayout,
    tile: &'a Tile,
    direction: Direction,
    wall_edge_height: f64,
}

impl Wedge<'_, '_> {
    fn tri(&mut self, a: (usize, f64), b: (usize, f64), c: (usize, f64)) {
        self.mesh
            .add_triangle(self.layout, self.tile, self.direction, [a, b, c]);
    }

    /// Strip between the cap and the outer edge, bending toward the center
    /// neighbour.
    fn inner_edge(&mut self, center: i32) {
        let z = self.tile.z;
        let (h1, h2) = match z.cmp(&center) {
            std::cmp::Ordering::Greater => (0.5, 0.0),
            std::cmp::Ordering::Less => (1.5, 2.0),
            std::cmp::Ordering::Equal => (1.0, 1.0),
        };
        for col in 0..4 {
            self.tri((col, 1.0), (col + 6, h1), (col + 1, 1.0));
            self.tri((col, 1.0), (col + 12, h2), (col + 6, h1));
            self.tri((col + 1, 1.0), (col + 6, h1), (col + 13, h2));
            self.tri((col + 6, h1), (col + 12, h2), (col + 13, h2));
        }
    }

    /// Strip along the tile border. The middle columns follow the center
    /// neighbour; the corner columns step toward the side neighbours when the
    /// center neighbour is level with the tile.
    fn outer_edge(&mut self, left: i32, center: i32, right: i32) {
        let z = self.tile.z;
        let drop = f64::from(center - z) * LEVEL;

        let (hc0, hc1, hc2) = if z > center {
            (drop + 4.0, drop + 3.5, drop + 3.0)
        } else if z < center {
            (2.0, 2.5, 3.0)
        } else {
            (1.0, 1.0, 1.0)
        };

        let side = |side: i32| -> (f64, f64, f64) {
            if z != center {
                return (hc0, hc1, hc2);
            }
            let (h0, h1) = if z > side {
                (0.0, 0.5)
            } else if z < side {
                (2.0, 1.5)
            } else {
                (hc0, hc1)
            };
            (h0, h1, h0)
        };
        let (hl0, hl1, hl2) = side(left);
        let (hr0, hr1, hr2) = side(right);

        self.tri((11, hl0), (19, hl1), (12, hc0));
        self.tri((11, hl0), (27, hl2), (19, hl1));
        self.tri((12, hc0), (19, hl1), (28, hc2));
        self.tri((19, hl1), (27, hl2), (28, hc2));

        for col in 1..5 {
            self.tri((col + 11, hc0), (col + 19, hc1), (col + 12, hc0));
            self.tri((col + 11, hc0), (col + 27, hc2), (col + 19, hc1));
            self.tri((col + 12, hc0), (col + 19, hc1), (col + 28, hc2));
            self.tri((col + 19, hc1), (col + 27, hc2), (col + 28, hc2));
        }

        self.tri((16, hc0), (24, hr1), (17, hr0));
        self.tri((16, hc0), (32, hc2), (24, hr1));
        self.tri((17, hr0), (24, hr1), (33, hr2));
        self.tri((24, hr1), (32, hc2), (33, hr2));
    }

    fn inner_corners(&mut self, left: i32, center: i32, right: i32) {
        let [l0, l1, l2, l3] = inner_corner_heights(self.tile.z, center, left);
        self.tri((0, l0), (5, l2), (12, l1));
        self.tri((5, l2), (11, l3), (12, l1));

        let [r0, r1, r2, r3] = inner_corner_heights(self.tile.z, center, right);
        self.tri((4, r0), (16, r1), (10, r2));
        self.tri((10, r2), (16, r1), (17, r3));
    }

    fn outer_corners(&mut self, left: i32, center: i32, right: i32) {
        let [l0, l1, l2, l3] = outer_corner_heights(self.tile.z, center, left);
        self.tri((11, l0), (18, l2), (27, l1));
        self.tri((18, l2), (26, l3), (27, l1));

        let [r0, r1, r2, r3] = outer_corner_heights(self.tile.z, center, right);
        self.tri((17, r0), (33, r1), (25, r2));
        self.tri((25, r2), (33, r1), (34, r3));
    }

    /// Emits the eight triangles of one wall level between two rule indices.
    /// `first` and `second` are ordered so the wall faces away from the tile.
    fn wall_strip(&mut self, first: usize, second: usize, levels: [f64; 5]) {
        for pair in levels.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            self.tri((first, upper), (second, upper), (second, lower));
            self.tri((first, upper), (second, lower), (first, lower));
        }
    }

    /// Cliff down to a center neighbour more than one level lower.
    fn center_wall(&mut self, center: i32) {
        let diff = self.tile.z - center;
        for level in 0..(diff - 1).max(0) {
            let levels = wall_level(f64::from(level) * -LEVEL, self.wall_edge_height);
            for col in 0..6 {
                self.wall_strip(col + 12, col + 11, levels);
            }
        }
    }

    /// Cliff along the seam between the center and a side neighbour, filling
    /// the levels the side neighbour lies below both the tile and the center
    /// neighbour.
    fn side_wall(&mut self, center: i32, side: i32, (first, second): (usize, usize)) {
        let z = self.tile.z;
        let rows = z.min(center) - side - 1;
        let start = if z > center {
            f64::from(center - z) * LEVEL
        } else {
            0.0
        };
        for row in 0..rows.max(0) {
            let levels = wall_level(start - f64::from(row) * LEVEL, self.wall_edge_height);
            self.wall_strip(first, second, levels);
        }
    }

    fn left_corner_wall(&mut self, center: i32, left: i32) {
        let z = self.tile.z;
        let w = self.wall_edge_height;

        if z > center && z - 1 > left && center > left {
            let [h0, h1, h3, h4, h5] = wall_level(f64::from(z - center - 1) * -LEVEL, w);
            let h2 = h0 - 1.0;
            self.tri((11, h0), (11, h1), (27, h2));
            self.tri((11, h1), (27, h3), (27, h2));
            self.tri((11, h1), (11, h3), (27, h3));
            self.tri((11, h3), (27, h4), (27, h3));
            self.tri((11, h3), (11, h4), (27, h4));
            self.tri((11, h4), (27, h5), (27, h4));
            self.tri((11, h4), (11, h5), (27, h5));
        }

        // Notch where the center neighbour rises and the left one falls away.
        if z < center && z > left {
            self.tri((0, 1.0), (5, 0.5), (5, 1.5));
            self.tri((11, 2.0), (5, 1.5), (11, 0.5));
            self.tri((11, 0.5), (5, 1.5), (5, 0.5));
            self.tri((11, 0.5), (5, 0.5), (11, 0.0));
            self.tri((27, 3.0), (11, 2.0), (27, 2.0));
            self.tri((27, 2.0), (11, 2.0), (11, 0.5));
            self.tri((27, 2.0), (11, 0.5), (27, w));
            self.tri((27, w), (11, 0.5), (11, 0.0));
            self.tri((27, w), (11, 0.0), (27, 0.0));
        }
    }

    fn right_corner_wall(&mut self, center: i32, right: i32) {
        let z = self.tile.z;
        let w = self.wall_edge_height;

        if z > center && z - 1 > right && center > right {
            let [h0, h1, h3, h4, h5] = wall_level(f64::from(z - center - 1) * -LEVEL, w);
            let h2 = h0 - 1.0;
            self.tri((17, h0), (33, h2), (17, h1));
            self.tri((17, h1), (33, h2), (33, h3));
            self.tri((17, h1), (33, h3), (17, h3));
            self.tri((17, h3), (33, h3), (33, h4));
            self.tri((17, h3), (33, h4), (17, h4));
            self.tri((17, h4), (33, h4), (33, h5));
            self.tri((17, h4), (33, h5), (17, h5));
        }

        if z < center && z > right {
            self.tri((4, 1.0), (10, 1.5), (10, 0.5));
            self.tri((17, 2.0), (17, 0.5), (10, 1.5));
            self.tri((10, 1.5), (17, 0.5), (10, 0.5));
            self.tri((10, 0.5), (17, 0.5), (17, 0.0));
            self.tri((17, 2.0), (33, 3.0), (33, 2.0));
            self.tri((17, 2.0), (33, 2.0), (33, w));
            self.tri((17, 2.0), (33, w), (17, 0.5));
            self.tri((17, 0.5), (33, w), (33, 0.0));
            self.tri((17, 0.5), (33, 0.0), (17, 0.0));
        }
    }
}
