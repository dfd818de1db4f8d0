//! Island placement: grow maximal free rectangles, then reduce each one from
//! several seed points and keep the cheapest result.

use crate::area::Area;
use crate::error::PlaceError;
use crate::floorplan::Floorplan;
use crate::reducer::AreaReducer;
use partplace_common::{Direction, GridPoint, PlanResult, Point, ShapeAction};
use partplace_device::{Board, RegionKind};
use rayon::prelude::*;

/// Spacing of the extra seeds along the top edge of wide islands.
const ANCHOR_STEP: usize = 5;

/// Finds a rectangle for one region within the current floorplan.
pub trait AreaPlacer: Send + Sync {
    /// Moves and sizes `area` so that it can be confirmed in `plan`.
    ///
    /// `hint` is the region's ideal center. The area is left unchanged on
    /// failure.
    fn place_area(&self, area: &mut Area, plan: &Floorplan<'_>, hint: Point) -> Result<(), PlaceError>;
}

/// Places an area by enumerating maximal free islands.
///
/// Every still-free point seeds an island that grows edge by edge while it
/// remains placeable. Islands that cannot hold the region are dropped; each
/// remaining island is reduced once per seed (its corners, its center, points
/// along its top edge and the hint) in parallel. The cheapest reduction over
/// all islands wins, ties going to the earlier candidate.
pub struct IslandPlacer {
    reducer: Box<dyn AreaReducer>,
}

impl IslandPlacer {
    /// Creates a placer that shrinks islands with `reducer`.
    pub fn new(reducer: Box<dyn AreaReducer>) -> Self {
        Self { reducer }
    }

    fn islands(&self, area: &Area, plan: &Floorplan<'_>) -> Vec<Area> {
        let design = plan.design();
        let board = &design.board;
        let mut consumed = vec![false; board.rows() * board.cols()];
        let mut islands = Vec::new();

        for p in plan.free_points() {
            if consumed[p.y * board.cols() + p.x] {
                continue;
            }
            let mut island = area.clone();
            if island.set_bounds(p, 0, 0, board).is_err() || !plan.can_place(&island) {
                consumed[p.y * board.cols() + p.x] = true;
                continue;
            }
            grow(&mut island, plan);
            for q in island.points() {
                consumed[q.y * board.cols() + q.x] = true;
            }
            if fit_reconfiguration_columns(&mut island, board) && island.is_sufficient(design) {
                islands.push(island);
            }
        }
        islands
    }

    fn reduce_from(
        &self,
        island: &Area,
        seed: Point,
        plan: &Floorplan<'_>,
    ) -> PlanResult<(i64, Area)> {
        let design = plan.design();
        let board = &design.board;
        let mut reduced = island.clone();
        self.reducer.reduce(&mut reduced, seed, plan)?;
        let cost = self.reducer.cost(&reduced, plan);

        let mut bottom = reduced.clone();
        let flush = GridPoint::new(reduced.left(), island.bottom() - reduced.height());
        if flush != reduced.top_left()
            && bottom.try_move_to(flush, board)
            && plan.can_place(&bottom)
            && bottom.is_valid(board)
            && bottom.is_sufficient(design)
        {
            let bottom_cost = self.reducer.cost(&bottom, plan);
            if bottom_cost < cost {
                return Ok((bottom_cost, bottom));
            }
        }
        Ok((cost, reduced))
    }
}

impl AreaPlacer for IslandPlacer {
    fn place_area(&self, area: &mut Area, plan: &Floorplan<'_>, hint: Point) -> Result<(), PlaceError> {
        let islands = self.islands(area, plan);
        let jobs: Vec<(&Area, Point)> = islands
            .iter()
            .flat_map(|island| seeds(island, hint).into_iter().map(move |seed| (island, seed)))
            .collect();

        let results = jobs
            .par_iter()
            .map(|&(island, seed)| self.reduce_from(island, seed, plan))
            .collect::<PlanResult<Vec<_>>>()?;

        let mut best: Option<(i64, Area)> = None;
        for (cost, candidate) in results {
            if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                best = Some((cost, candidate));
            }
        }
        match best {
            Some((_, placed)) => {
                area.adopt_bounds(&placed);
                Ok(())
            }
            None => Err(PlaceError::PlacementFailure {
                region: area.region(),
            }),
        }
    }
}

/// Pushes each edge outwards, in scan order, for as long as the area stays
/// placeable.
fn grow(island: &mut Area, plan: &Floorplan<'_>) {
    let board = &plan.design().board;
    for dir in Direction::ALL {
        while island.try_shape(ShapeAction::Expand, dir, board) {
            if !plan.can_place(island) {
                island.try_shape(ShapeAction::Shrink, dir, board);
                break;
            }
        }
    }
}

/// Pulls the side edges of a reconfigurable island inwards onto legal
/// reconfiguration columns. Static islands are left alone.
fn fit_reconfiguration_columns(island: &mut Area, board: &Board) -> bool {
    if island.kind() != RegionKind::Reconfigurable {
        return true;
    }
    let saved = island.clone();
    while !board.is_left_boundary(island.left()) {
        if !island.try_shape(ShapeAction::Shrink, Direction::Left, board) {
            break;
        }
    }
    while !board.is_right_boundary(island.right()) {
        if !island.try_shape(ShapeAction::Shrink, Direction::Right, board) {
            break;
        }
    }
    if island.is_valid(board) {
        true
    } else {
        *island = saved;
        false
    }
}

/// Reduction seeds for one island.
fn seeds(island: &Area, hint: Point) -> Vec<Point> {
    let (left, right) = (island.left() as f64, island.right() as f64);
    let (top, bottom) = (island.top() as f64, island.bottom() as f64);
    let mut seeds = vec![
        Point::new(left, top),
        Point::new(right, top),
        Point::new(left, bottom),
        Point::new(right, bottom),
        island.center(),
    ];
    if island.width() > 2 * ANCHOR_STEP {
        seeds.extend(
            (island.left() + ANCHOR_STEP..island.right())
                .step_by(ANCHOR_STEP)
                .map(|x| Point::new(x as f64, top)),
        );
    }
    seeds.push(hint);
    seeds
}
