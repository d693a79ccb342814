use bevy::math::{DVec2, IVec2};
use bevy::prelude::{Reflect, Vec2, default};
use hexx::{Hex, HexLayout, HexOrientation, OffsetHexMode};

use super::heightmap::{Heightmap, HeightmapError};

/// Width of a hexagon in tile units (`sqrt(3) / 2`).
pub const TILE_WIDTH: f64 = 0.866_025_403_784_438_6;

/// Vertical distance between two tile rows in tile units.
pub const ROW_HEIGHT: f64 = 0.75;

/// One of the six neighbour directions of a pointy-top hexagon.
///
/// The variant order is the cyclic order used by the geometry rules:
/// [`left`](Self::left) and [`right`](Self::right) step through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum Direction {
    /// Up and to the right.
    TopRight,
    /// Same row, next column.
    Right,
    /// Down and to the right.
    BottomRight,
    /// Down and to the left.
    BottomLeft,
    /// Same row, previous column.
    Left,
    /// Up and to the left.
    TopLeft,
}

impl Direction {
    /// All directions in cyclic order, starting at [`TopRight`](Self::TopRight).
    pub const ALL: [Direction; 6] = [
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// Position in [`Direction::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Previous direction in the cycle (wraps from `TopRight` to `TopLeft`).
    pub const fn left(self) -> Self {
        Self::ALL[(self.index() + 5) % 6]
    }

    /// Next direction in the cycle (wraps from `TopLeft` to `TopRight`).
    pub const fn right(self) -> Self {
        Self::ALL[(self.index() + 1) % 6]
    }

    /// The direction pointing back.
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % 6]
    }

    /// Axial step to the neighbour in this direction.
    ///
    /// Axial `r` grows with the row, so the diagonal steps are the same on
    /// every row; the row parity only enters through the offset conversion.
    pub const fn axial(self) -> Hex {
        match self {
            Direction::TopRight => Hex::new(0, 1),
            Direction::Right => Hex::new(1, 0),
            Direction::BottomRight => Hex::new(1, -1),
            Direction::BottomLeft => Hex::new(0, -1),
            Direction::Left => Hex::new(-1, 0),
            Direction::TopLeft => Hex::new(-1, 1),
        }
    }
}

/// A terrain tile: grid column `x`, grid row `y` and height `z` in height-units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Height above sea level in height-units.
    pub z: i32,
}

impl Tile {
    /// Creates a tile.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Dense row-major grid of tiles covering `[0, width) × [0, height)`.
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Builds the grid from a heightmap.
    ///
    /// Each pixel becomes one tile with `z = value / height_factor - sea_level`.
    /// `height_factor` must be positive.
    pub fn build(heightmap: &Heightmap, sea_level: i32, height_factor: i32) -> Self {
        let width = heightmap.width() as i32;
        let height = heightmap.height() as i32;
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let value = i32::from(heightmap.value(x as u32, y as u32));
                Tile::new(x, y, value / height_factor - sea_level)
            })
            .collect();
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Builds the grid directly from row-major tile heights.
    pub fn from_heights(width: u32, height: u32, heights: &[i32]) -> Result<Self, HeightmapError> {
        let expected = width as usize * height as usize;
        if heights.len() != expected {
            return Err(HeightmapError::SizeMismatch {
                expected,
                actual: heights.len(),
            });
        }
        let width = width as i32;
        let tiles = heights
            .iter()
            .enumerate()
            .map(|(i, &z)| Tile::new(i as i32 % width, i as i32 / width, z))
            .collect();
        Ok(Self {
            width,
            height: height as i32,
            tiles,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile at `(x, y)`, or `None` outside the grid.
    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if (0..self.width).contains(&x) && (0..self.height).contains(&y) {
            self.tiles.get((x + y * self.width) as usize)
        } else {
            None
        }
    }

    /// Adjacent tile in `direction`, or `None` past the grid border.
    pub fn neighbour(&self, tile: &Tile, direction: Direction) -> Option<&Tile> {
        let position = Self::offset_position(Self::hex(tile.x, tile.y) + direction.axial());
        self.tile(position.x, position.y)
    }

    /// Heights of the left, center and right neighbours around `direction`.
    ///
    /// A missing neighbour reports the tile's own height, so grid borders
    /// behave like flat terrain.
    pub fn neighbour_heights(&self, tile: &Tile, direction: Direction) -> [i32; 3] {
        [direction.left(), direction, direction.right()]
            .map(|d| self.neighbour(tile, d).map_or(tile.z, |n| n.z))
    }

    /// Whether `tile` borders the grid edge or a tile at or below sea level.
    pub fn has_coast(&self, tile: &Tile) -> bool {
        Direction::ALL
            .iter()
            .any(|&d| self.neighbour(tile, d).is_none_or(|n| n.z <= 0))
    }

    /// Grid position of the tile whose hexagon contains `point`.
    ///
    /// `point` is in tile units (world position divided by the mesh scale).
    /// The result may lie outside the grid; use [`tile`](Self::tile) to
    /// resolve it.
    pub fn position_at(point: DVec2) -> IVec2 {
        Self::offset_position(layout().world_pos_to_hex(point.as_vec2()))
    }

    /// Center of the tile hexagon at grid position `(x, y)` in tile units.
    pub fn center(x: i32, y: i32) -> DVec2 {
        layout().hex_to_world_pos(Self::hex(x, y)).as_dvec2()
    }

    /// Axial hex of the grid position `(x, y)`.
    fn hex(x: i32, y: i32) -> Hex {
        Hex::from_offset_coordinates([x, y], OffsetHexMode::Odd, HexOrientation::Pointy)
    }

    /// Grid position of an axial hex.
    fn offset_position(hex: Hex) -> IVec2 {
        IVec2::from(hex.to_offset_coordinates(OffsetHexMode::Odd, HexOrientation::Pointy))
    }
}

/// Pointy-top layout with a circumradius of half a tile, centered on tile `(0, 0)`.
///
/// Rows are [`ROW_HEIGHT`] apart and columns [`TILE_WIDTH`] apart.
fn layout() -> HexLayout {
    HexLayout {
        orientation: HexOrientation::Pointy,
        scale: Vec2::splat(0.5),
        ..default()
    }
}
