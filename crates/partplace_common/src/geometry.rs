//! Grid coordinates, fractional centers, and edge directions.
//!
//! Board coordinates grow rightwards on `x` (columns) and downwards on `y`
//! (rows), with the origin at the top-left cell.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on the device grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column index, starting at zero on the left edge.
    pub x: usize,
    /// Row index, starting at zero on the top edge.
    pub y: usize,
}

impl GridPoint {
    /// Creates a grid point from a column and a row.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A continuous coordinate, used for rectangle centers and wire targets.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the Manhattan (L1) distance between two points.
    pub fn manhattan(self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<GridPoint> for Point {
    fn from(p: GridPoint) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// One of the four rectangle edges.
///
/// The declaration order is significant: expansion scans edges in this
/// order, and [`opposite`](Direction::opposite) pairs each edge with the one
/// two positions further along.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// The top edge.
    Up,
    /// The right edge.
    Right,
    /// The bottom edge.
    Down,
    /// The left edge.
    Left,
}

impl Direction {
    /// All directions in scan order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Returns the edge on the other side of the rectangle.
    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 2) % 4]
    }

    /// Returns `true` for the left and right edges.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Position of this direction in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
        }
    }
}

/// Whether a shaping step grows or shrinks an edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ShapeAction {
    /// Move the edge outwards.
    Expand,
    /// Move the edge inwards.
    Shrink,
}
