//! Candidate rectangles and their board-relative queries.

use crate::error::AreaError;
use partplace_common::{Direction, GridPoint, Point, ShapeAction};
use partplace_device::{BlockType, Board, Costs, Design, Region, RegionId, RegionKind, Resources};
use std::ops::RangeInclusive;

/// A rectangle proposed for one region.
///
/// `width` and `height` are offsets from the top-left corner to the far
/// edge, so an area covers `(width + 1) x (height + 1)` cells and a
/// zero-sized area still occupies its top-left cell. Every mutation keeps
/// the rectangle on the board; a change that would leave it is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    region: RegionId,
    kind: RegionKind,
    top_left: GridPoint,
    width: usize,
    height: usize,
    confirmed: bool,
}

impl Area {
    /// Creates an unconfirmed single-cell area at the origin.
    pub fn new(region: &Region) -> Self {
        Self {
            region: region.id,
            kind: region.kind,
            top_left: GridPoint::default(),
            width: 0,
            height: 0,
            confirmed: false,
        }
    }

    /// Creates an unconfirmed area with the given bounds.
    pub fn with_bounds(
        region: &Region,
        top_left: GridPoint,
        width: usize,
        height: usize,
        board: &Board,
    ) -> Result<Self, AreaError> {
        let mut area = Self::new(region);
        area.set_bounds(top_left, width, height, board)?;
        Ok(area)
    }

    /// The region this area is proposed for.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// The owning region's kind.
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Top-left cell.
    pub fn top_left(&self) -> GridPoint {
        self.top_left
    }

    /// Horizontal offset to the right edge.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Vertical offset to the bottom edge.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Leftmost column.
    pub fn left(&self) -> usize {
        self.top_left.x
    }

    /// Rightmost column.
    pub fn right(&self) -> usize {
        self.top_left.x + self.width
    }

    /// Topmost row.
    pub fn top(&self) -> usize {
        self.top_left.y
    }

    /// Bottom row.
    pub fn bottom(&self) -> usize {
        self.top_left.y + self.height
    }

    /// Whether this area is committed to its floorplan.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub(crate) fn set_confirmed(&mut self, confirmed: bool) {
        self.confirmed = confirmed;
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> usize {
        (self.width + 1) * (self.height + 1)
    }

    /// Replaces position and size at once.
    pub fn set_bounds(
        &mut self,
        top_left: GridPoint,
        width: usize,
        height: usize,
        board: &Board,
    ) -> Result<(), AreaError> {
        if !board.contains_rect(top_left, width, height) {
            return Err(AreaError::OutOfRange {
                region: self.region,
                top_left,
                width,
                height,
            });
        }
        self.top_left = top_left;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Copies position and size from another rectangle.
    pub(crate) fn adopt_bounds(&mut self, other: &Area) {
        self.top_left = other.top_left;
        self.width = other.width;
        self.height = other.height;
    }

    /// Moves the area so its top-left corner is `p`, keeping its size.
    pub fn move_to(&mut self, p: GridPoint, board: &Board) -> Result<(), AreaError> {
        self.set_bounds(p, self.width, self.height, board)
    }

    /// Like [`move_to`](Self::move_to), reporting success instead of an error.
    pub fn try_move_to(&mut self, p: GridPoint, board: &Board) -> bool {
        self.move_to(p, board).is_ok()
    }

    /// Grows or shrinks one edge by a single cell.
    ///
    /// Returns `false` and leaves the area unchanged if the edge would leave
    /// the board or the area would lose its last row or column.
    pub fn try_shape(&mut self, action: ShapeAction, dir: Direction, board: &Board) -> bool {
        self.try_shape_by(action, dir, 1, board)
    }

    /// Grows or shrinks one edge by `steps` cells.
    pub fn try_shape_by(
        &mut self,
        action: ShapeAction,
        dir: Direction,
        steps: usize,
        board: &Board,
    ) -> bool {
        let GridPoint { x, y } = self.top_left;
        let (w, h) = (self.width, self.height);
        let next = match (action, dir) {
            (ShapeAction::Expand, Direction::Up) => {
                y.checked_sub(steps).map(|y| (GridPoint::new(x, y), w, h + steps))
            }
            (ShapeAction::Expand, Direction::Left) => {
                x.checked_sub(steps).map(|x| (GridPoint::new(x, y), w + steps, h))
            }
            (ShapeAction::Expand, Direction::Right) => Some((self.top_left, w + steps, h)),
            (ShapeAction::Expand, Direction::Down) => Some((self.top_left, w, h + steps)),
            (ShapeAction::Shrink, Direction::Up) => h
                .checked_sub(steps)
                .map(|h| (GridPoint::new(x, y + steps), w, h)),
            (ShapeAction::Shrink, Direction::Left) => w
                .checked_sub(steps)
                .map(|w| (GridPoint::new(x + steps, y), w, h)),
            (ShapeAction::Shrink, Direction::Right) => w.checked_sub(steps).map(|w| (self.top_left, w, h)),
            (ShapeAction::Shrink, Direction::Down) => h.checked_sub(steps).map(|h| (self.top_left, w, h)),
        };
        match next {
            Some((tl, w, h)) => self.set_bounds(tl, w, h, board).is_ok(),
            None => false,
        }
    }

    /// Cells of every type under the area.
    pub fn resources(&self, board: &Board) -> Resources {
        board.resources_for(self.top_left, self.width, self.height)
    }

    /// No forbidden cell is covered and, for a reconfigurable region, the
    /// left and right edges sit on legal reconfiguration columns.
    pub fn is_valid(&self, board: &Board) -> bool {
        if self.resources(board)[BlockType::Forbidden] > 0 {
            return false;
        }
        match self.kind {
            RegionKind::Static => true,
            RegionKind::Reconfigurable => {
                board.is_left_boundary(self.left()) && board.is_right_boundary(self.right())
            }
        }
    }

    /// The covered resources meet the region's requirement for every type.
    pub fn is_sufficient(&self, design: &Design) -> bool {
        self.resources(&design.board)
            .covers(&design.region(self.region).resources)
    }

    /// Whether the two areas clash once both are committed.
    ///
    /// Areas in disjoint tile rows never clash. Two reconfigurable areas
    /// sharing a tile row clash whenever their columns intersect, because a
    /// reconfiguration frame spans the full tile height. Any other pair
    /// clashes only if their cells intersect.
    pub fn is_overlapping(&self, other: &Area, tile_height: usize) -> bool {
        let rows = self.tile_rows(tile_height);
        let other_rows = other.tile_rows(tile_height);
        if rows.end() < other_rows.start() || other_rows.end() < rows.start() {
            return false;
        }
        let x_overlap = self.left() <= other.right() && other.left() <= self.right();
        if self.kind == RegionKind::Reconfigurable && other.kind == RegionKind::Reconfigurable {
            return x_overlap;
        }
        x_overlap && self.top() <= other.bottom() && other.top() <= self.bottom()
    }

    /// Whether the footprints touch flush along one full edge.
    ///
    /// Centers must coincide on one axis and sit exactly one combined
    /// half-footprint apart on the other.
    pub fn is_adjacent(&self, other: &Area) -> bool {
        // Doubled coordinates keep every center on the integer grid.
        let (ax, ay) = self.doubled_center();
        let (bx, by) = other.doubled_center();
        let flush_x = ax.abs_diff(bx) == self.width + other.width + 2;
        let flush_y = ay.abs_diff(by) == self.height + other.height + 2;
        (flush_x && ay == by) || (flush_y && ax == bx)
    }

    /// Weighted resource cost of the covered cells.
    pub fn cost(&self, board: &Board, costs: &Costs) -> i64 {
        costs.resource_cost(&self.resources(board))
    }

    /// Geometric center with fractional coordinates.
    pub fn center(&self) -> Point {
        Point::new(
            self.top_left.x as f64 + self.width as f64 / 2.0,
            self.top_left.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Tile rows the area spans.
    pub fn tile_rows(&self, tile_height: usize) -> RangeInclusive<usize> {
        self.top() / tile_height..=self.bottom() / tile_height
    }

    /// Whether `p` lies inside the area.
    pub fn contains(&self, p: GridPoint) -> bool {
        (self.left()..=self.right()).contains(&p.x) && (self.top()..=self.bottom()).contains(&p.y)
    }

    /// Every covered cell, in row-major order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (self.top()..=self.bottom())
            .flat_map(move |y| (self.left()..=self.right()).map(move |x| GridPoint::new(x, y)))
    }

    fn doubled_center(&self) -> (usize, usize) {
        (2 * self.top_left.x + self.width, 2 * self.top_left.y + self.height)
    }
}
