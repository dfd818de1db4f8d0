//! The device grid and its constant-time rectangle resource index.

use crate::block::{BlockType, Resources};
use crate::error::BoardError;
use partplace_common::GridPoint;

/// An immutable grid of cells with reconfiguration metadata.
///
/// Besides the cells themselves the board carries the tile height (rows per
/// reconfiguration frame) and, per column, whether a reconfigurable area may
/// start (`LRecCol`) or end (`RRecCol`) there. A cumulative count table
/// answers "how many cells of each type lie in this rectangle" with four
/// lookups.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    tile_height: usize,
    cells: Vec<BlockType>,
    left_boundaries: Vec<bool>,
    right_boundaries: Vec<bool>,
    /// `(rows + 1) x (cols + 1)` table; entry `(y, x)` counts the cells in
    /// rows `0..y` and columns `0..x`.
    prefix: Vec<Resources>,
}

impl Board {
    /// Builds a board from row-major cells and the two boundary tables.
    pub fn new(
        cells: Vec<Vec<BlockType>>,
        tile_height: usize,
        left_boundaries: Vec<bool>,
        right_boundaries: Vec<bool>,
    ) -> Result<Self, BoardError> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(BoardError::Empty);
        }
        if tile_height == 0 {
            return Err(BoardError::ZeroTileHeight);
        }
        for (row, line) in cells.iter().enumerate() {
            if line.len() != cols {
                return Err(BoardError::RowLength {
                    row,
                    found: line.len(),
                    expected: cols,
                });
            }
        }
        for (side, table) in [("left", &left_boundaries), ("right", &right_boundaries)] {
            if table.len() != cols {
                return Err(BoardError::BoundaryLength {
                    side,
                    found: table.len(),
                    expected: cols,
                });
            }
        }

        let cells: Vec<BlockType> = cells.into_iter().flatten().collect();
        let prefix = build_prefix(&cells, rows, cols);
        Ok(Self {
            rows,
            cols,
            tile_height,
            cells,
            left_boundaries,
            right_boundaries,
            prefix,
        })
    }

    /// Builds a board from cell strings, one per row, with every column a
    /// legal reconfiguration boundary.
    ///
    /// Handy for small hand-written boards; see [`BlockType::from_char`].
    pub fn from_rows(rows: &[&str], tile_height: usize) -> Result<Self, BoardError> {
        let cells = rows
            .iter()
            .map(|row| {
                row.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| BlockType::from_char(c).ok_or(BoardError::UnknownCell(c)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let cols = cells.first().map_or(0, Vec::len);
        Self::new(cells, tile_height, vec![true; cols], vec![true; cols])
    }

    /// Replaces both boundary tables.
    pub fn with_boundaries(self, left: Vec<bool>, right: Vec<bool>) -> Result<Self, BoardError> {
        let cells = self
            .cells
            .chunks(self.cols)
            .map(<[BlockType]>::to_vec)
            .collect();
        Self::new(cells, self.tile_height, left, right)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Largest column index.
    pub fn x_max(&self) -> usize {
        self.cols - 1
    }

    /// Largest row index.
    pub fn y_max(&self) -> usize {
        self.rows - 1
    }

    /// Rows per reconfiguration tile.
    pub fn tile_height(&self) -> usize {
        self.tile_height
    }

    /// Returns the tile row containing grid row `y`.
    pub fn tile_row(&self, y: usize) -> usize {
        y / self.tile_height
    }

    /// Returns the block type at `p`.
    pub fn cell(&self, p: GridPoint) -> BlockType {
        self.cells[p.y * self.cols + p.x]
    }

    /// Whether a reconfigurable area may have its left edge on column `x`.
    pub fn is_left_boundary(&self, x: usize) -> bool {
        self.left_boundaries[x]
    }

    /// Whether a reconfigurable area may have its right edge on column `x`.
    pub fn is_right_boundary(&self, x: usize) -> bool {
        self.right_boundaries[x]
    }

    /// Returns `true` if `p` lies on the board.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x <= self.x_max() && p.y <= self.y_max()
    }

    /// Returns `true` if the rectangle from `top_left` spanning `width` and
    /// `height` offsets lies entirely on the board.
    pub fn contains_rect(&self, top_left: GridPoint, width: usize, height: usize) -> bool {
        top_left.x + width <= self.x_max() && top_left.y + height <= self.y_max()
    }

    /// Counts the cells of every type in a rectangle.
    ///
    /// `width` and `height` are offsets to the far edge, so the rectangle
    /// covers `(width + 1) x (height + 1)` cells. The rectangle must lie on
    /// the board.
    pub fn resources_for(&self, top_left: GridPoint, width: usize, height: usize) -> Resources {
        debug_assert!(self.contains_rect(top_left, width, height));
        let (x0, y0) = (top_left.x, top_left.y);
        let (x1, y1) = (x0 + width + 1, y0 + height + 1);
        // (a + d) first so no intermediate underflows
        (self.prefix_at(y1, x1) + self.prefix_at(y0, x0))
            - (self.prefix_at(y0, x1) + self.prefix_at(y1, x0))
    }

    /// Cell counts for the whole board.
    pub fn totals(&self) -> Resources {
        self.prefix_at(self.rows, self.cols)
    }

    /// Every point that is neither forbidden nor null, in row-major order.
    pub fn valid_points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.points().filter(move |&p| {
            !matches!(self.cell(p), BlockType::Forbidden | BlockType::Null)
        })
    }

    /// Every point on the board, in row-major order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| GridPoint::new(x, y)))
    }

    fn prefix_at(&self, y: usize, x: usize) -> Resources {
        self.prefix[y * (self.cols + 1) + x]
    }
}

fn build_prefix(cells: &[BlockType], rows: usize, cols: usize) -> Vec<Resources> {
    let stride = cols + 1;
    let mut prefix = vec![Resources::ZERO; (rows + 1) * stride];
    for y in 0..rows {
        let mut row_run = Resources::ZERO;
        for x in 0..cols {
            row_run[cells[y * cols + x]] += 1;
            prefix[(y + 1) * stride + x + 1] = prefix[y * stride + x + 1] + row_run;
        }
    }
    prefix
}
