//! Per-direction remapping of the tile rule indices.
//!
//! The geometry rules address a wedge of the hexagon with 35 indices laid out
//! in rows of 5, 6, 7, 8 and 9, running from the inner edge (row 0) to the
//! tile border (row 4). The table rotates that wedge into each of the six
//! directions by mapping every rule index to a local sub-grid index
//! (`row * SUB_GRID_WIDTH + column`).

use super::tile_grid::Direction;

/// Number of columns of the local sub-grid.
pub const SUB_GRID_WIDTH: usize = 33;

/// Local sub-grid index for `[direction][rule index]`.
pub const EDGE_VERTICES: [[usize; 35]; 6] = [
    // TopRight
    [
        1600, 1536, 1472, 1408, 1344, //
        1732, 1668, 1604, 1540, 1476, 1412, //
        1864, 1800, 1736, 1672, 1608, 1544, 1480, //
        1996, 1932, 1868, 1804, 1740, 1676, 1612, 1548, //
        2128, 2064, 2000, 1936, 1872, 1808, 1744, 1680, 1616,
    ],
    // Right
    [
        1344, 1212, 1080, 948, 816, //
        1412, 1280, 1148, 1016, 884, 752, //
        1480, 1348, 1216, 1084, 952, 820, 688, //
        1548, 1416, 1284, 1152, 1020, 888, 756, 624, //
        1616, 1484, 1352, 1220, 1088, 956, 824, 692, 560,
    ],
    // BottomRight
    [
        816, 748, 680, 612, 544, //
        752, 684, 616, 548, 480, 412, //
        688, 620, 552, 484, 416, 348, 280, //
        624, 556, 488, 420, 352, 284, 216, 148, //
        560, 492, 424, 356, 288, 220, 152, 84, 16,
    ],
    // BottomLeft
    [
        544, 608, 672, 736, 800, //
        412, 476, 540, 604, 668, 732, //
        280, 344, 408, 472, 536, 600, 664, //
        148, 212, 276, 340, 404, 468, 532, 596, //
        16, 80, 144, 208, 272, 336, 400, 464, 528,
    ],
    // Left
    [
        800, 932, 1064, 1196, 1328, //
        732, 864, 996, 1128, 1260, 1392, //
        664, 796, 928, 1060, 1192, 1324, 1456, //
        596, 728, 860, 992, 1124, 1256, 1388, 1520, //
        528, 660, 792, 924, 1056, 1188, 1320, 1452, 1584,
    ],
    // TopLeft
    [
        1328, 1396, 1464, 1532, 1600, //
        1392, 1460, 1528, 1596, 1664, 1732, //
        1456, 1524, 1592, 1660, 1728, 1796, 1864, //
        1520, 1588, 1656, 1724, 1792, 1860, 1928, 1996, //
        1584, 1652, 1720, 1788, 1856, 1924, 1992, 2060, 2128,
    ],
];

/// Local sub-grid index of `rule_index` in `direction`.
pub fn local_index(direction: Direction, rule_index: usize) -> usize {
    EDGE_VERTICES[direction.index()][rule_index]
}
