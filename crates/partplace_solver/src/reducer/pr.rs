//! Tile-aware reducer for reconfigurable regions.
//!
//! A reconfigurable area claims whole tile rows of its columns no matter how
//! many cell rows it covers, so height is first cut in tile-row steps. Every
//! distinct tile span seen along the way becomes a candidate; each candidate
//! then has its width and finally its cell height trimmed, and the cheapest
//! one wins.

use super::{check_admissible, shrink, AreaReducer, CostModel, RatioReducer};
use crate::area::Area;
use crate::floorplan::Floorplan;
use partplace_common::{Direction, GridPoint, PlanResult, Point, ShapeAction};
use partplace_device::{Design, RegionKind};

/// Tile-grain reducer with an optional fallback for static regions.
#[derive(Debug, Clone)]
pub struct PrReducer {
    min_thickness: usize,
    model: CostModel,
    fallback: Option<RatioReducer>,
}

impl PrReducer {
    /// Creates a reducer without a fallback.
    pub fn new(min_thickness: usize, model: CostModel) -> Self {
        Self {
            min_thickness,
            model,
            fallback: None,
        }
    }

    /// Delegates static regions to `fallback`.
    pub fn with_fallback(mut self, fallback: RatioReducer) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn tile_candidates(&self, mut area: Area, center_row: usize, design: &Design) -> Vec<Area> {
        let board = &design.board;
        let tile_height = board.tile_height();
        if area.height() < tile_height {
            return vec![area];
        }

        let span = |a: &Area| {
            let rows = a.tile_rows(tile_height);
            (*rows.start(), *rows.end())
        };
        let (mut min_row, mut max_row) = span(&area);
        let mut candidates = vec![area.clone()];
        loop {
            let dir = if min_row >= center_row {
                Direction::Down
            } else {
                Direction::Up
            };
            if !shrink(&mut area, dir, self.min_thickness, board) {
                break;
            }
            let (min, max) = span(&area);
            if !area.is_sufficient(design) {
                break;
            }
            if (min, max) != (min_row, max_row) {
                candidates.push(area.clone());
                (min_row, max_row) = (min, max);
            }
            if min_row >= max_row {
                break;
            }
        }
        candidates
    }

    /// Pulls one vertical edge inwards as far as sufficiency allows, then
    /// lets it back out until the area is sufficient and on legal columns.
    fn shrink_width_on(&self, area: &mut Area, dir: Direction, design: &Design) {
        let board = &design.board;
        while area.is_sufficient(design) {
            if !shrink(area, dir, self.min_thickness, board) {
                break;
            }
        }
        while !area.is_sufficient(design) || !area.is_valid(board) {
            if !area.try_shape(ShapeAction::Expand, dir, board) {
                break;
            }
        }
    }

    /// Trims surplus cell rows from the bottom, then slides the area down to
    /// the next tile boundary when the trimmed rows leave room for it.
    fn shrink_height(&self, area: &mut Area, design: &Design) {
        let board = &design.board;
        let tile_height = board.tile_height();
        let (start_y, start_height) = (area.top(), area.height());

        while shrink(area, Direction::Down, self.min_thickness, board) {
            if !area.is_sufficient(design) {
                area.try_shape(ShapeAction::Expand, Direction::Down, board);
                break;
            }
        }
        let trimmed = start_height - area.height();
        if trimmed == 0 {
            return;
        }

        let to_boundary = tile_height - start_y % tile_height;
        if to_boundary <= trimmed {
            let before = area.clone();
            let target = GridPoint::new(area.left(), start_y + to_boundary);
            if !area.try_move_to(target, board) || !area.is_sufficient(design) {
                *area = before;
            }
        }
    }
}

impl AreaReducer for PrReducer {
    fn reduce(&self, area: &mut Area, ideal: Point, plan: &Floorplan<'_>) -> PlanResult<()> {
        if area.kind() == RegionKind::Static {
            if let Some(fallback) = &self.fallback {
                return fallback.reduce(area, ideal, plan);
            }
        }
        let design = plan.design();
        check_admissible(area, design, "PR reducer input")?;

        let board = &design.board;
        let center_row = board.tile_row((ideal.y.max(0.0) as usize).min(board.y_max()));
        // Ties go to the candidate spanning fewer tile rows.
        let mut best: Option<((i64, usize), Area)> = None;
        for mut candidate in self.tile_candidates(area.clone(), center_row, design) {
            let dir = if candidate.center().x > ideal.x {
                Direction::Right
            } else {
                Direction::Left
            };
            self.shrink_width_on(&mut candidate, dir, design);
            self.shrink_width_on(&mut candidate, dir.opposite(), design);
            self.shrink_height(&mut candidate, design);

            if !candidate.is_valid(board) || !candidate.is_sufficient(design) {
                continue;
            }
            let cost = (
                self.cost(&candidate, plan),
                candidate.tile_rows(board.tile_height()).count(),
            );
            if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                best = Some((cost, candidate));
            }
        }

        match best {
            Some((_, reduced)) => {
                *area = reduced;
                Ok(())
            }
            None => Err(format!("PR reducer lost every candidate for {}", area.region()).into()),
        }
    }

    fn cost(&self, area: &Area, plan: &Floorplan<'_>) -> i64 {
        self.model.evaluate(area, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::tests::strip_design;
    use crate::reducer::tests::wide_strip;
    use partplace_config::SolverTuning;
    use partplace_device::{Board, Costs, Region, RegionId, Resources};

    fn reducer() -> PrReducer {
        PrReducer::new(1, CostModel::Area)
    }

    /// 6 columns of CLB over 12 rows in tiles of 4.
    fn clb_design(clb: u32) -> Design {
        let board = Board::from_rows(&["CCCCCC"; 12], 4).unwrap();
        let costs = Costs {
            max_score: 10_000,
            area_weight: 1,
            wire_weight: 0,
            clb_weight: 1,
            bram_weight: 1,
            dsp_weight: 1,
        };
        let region = Region::new(
            RegionId::from_raw(0),
            RegionKind::Reconfigurable,
            Resources::logic(clb, 0, 0),
        );
        Design::new("pr", board, costs, vec![region], vec![vec![0]]).unwrap()
    }

    fn full(design: &Design) -> Area {
        Area::with_bounds(&design.regions()[0], GridPoint::new(0, 0), 5, 11, &design.board).unwrap()
    }

    #[test]
    fn tile_candidates_record_each_span() {
        let d = clb_design(6);
        let candidates = reducer().tile_candidates(full(&d), 0, &d);
        let spans: Vec<_> = candidates
            .iter()
            .map(|a| {
                let r = a.tile_rows(4);
                (*r.start(), *r.end())
            })
            .collect();
        assert_eq!(spans, vec![(0, 2), (0, 1), (0, 0)]);
        assert!(candidates.iter().all(|a| a.is_sufficient(&d)));
    }

    #[test]
    fn single_tile_area_is_its_own_candidate() {
        let d = clb_design(6);
        let area = Area::with_bounds(&d.regions()[0], GridPoint::new(0, 0), 5, 3, &d.board).unwrap();
        assert_eq!(reducer().tile_candidates(area.clone(), 0, &d), vec![area]);
    }

    #[test]
    fn reduces_within_one_tile_row() {
        let d = clb_design(6);
        let plan = Floorplan::new(&d);
        let mut area = full(&d);
        reducer().reduce(&mut area, Point::new(0.0, 0.0), &plan).unwrap();
        assert!(area.is_sufficient(&d));
        assert_eq!(area.cell_count(), 6);
        assert_eq!(area.tile_rows(4), 0..=0);
    }

    #[test]
    fn trimmed_rows_slide_to_tile_boundary() {
        let d = clb_design(4);
        // Rows 2-5 straddle tiles 0 and 1; two rows of width 2 suffice.
        let mut area = Area::with_bounds(&d.regions()[0], GridPoint::new(0, 2), 1, 3, &d.board).unwrap();
        reducer().shrink_height(&mut area, &d);
        assert_eq!(area.height(), 1);
        assert_eq!(area.top_left(), GridPoint::new(0, 4));
    }

    #[test]
    fn width_shrink_stops_on_legal_columns() {
        let board = Board::from_rows(&["CCCCCC"; 4], 4)
            .unwrap()
            .with_boundaries(
                vec![true, false, false, true, false, false],
                vec![false, false, true, false, false, true],
            )
            .unwrap();
        let costs = Costs {
            max_score: 0,
            area_weight: 1,
            wire_weight: 0,
            clb_weight: 1,
            bram_weight: 1,
            dsp_weight: 1,
        };
        let region = Region::new(
            RegionId::from_raw(0),
            RegionKind::Reconfigurable,
            Resources::logic(8, 0, 0),
        );
        let d = Design::new("cols", board, costs, vec![region], vec![vec![0]]).unwrap();
        let mut area = Area::with_bounds(&d.regions()[0], GridPoint::new(0, 0), 5, 3, &d.board).unwrap();
        reducer().shrink_width_on(&mut area, Direction::Right, &d);
        assert_eq!((area.left(), area.right()), (0, 2));
        assert!(area.is_valid(&d.board));
    }

    #[test]
    fn static_regions_use_the_fallback() {
        let d = strip_design(RegionKind::Static);
        let plan = Floorplan::new(&d);
        let r = reducer().with_fallback(RatioReducer::new(&SolverTuning::default(), CostModel::Area));
        let mut area = wide_strip(&d);
        r.reduce(&mut area, Point::new(4.5, 4.5), &plan).unwrap();
        assert_eq!(area.top_left(), GridPoint::new(2, 0));
        assert_eq!((area.width(), area.height()), (5, 9));
    }
}
