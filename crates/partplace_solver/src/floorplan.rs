//! The assignment of one area per region, its cost, and its solution output.

use crate::area::Area;
use crate::error::FloorplanError;
use partplace_common::{GridPoint, Point};
use partplace_device::{BlockType, Design, RegionId};
use serde::Serialize;
use std::io::{self, Write};

/// One area per region of a design, in design order.
///
/// Cloning a floorplan copies every area but shares the design, so each
/// improvement worker can mutate its own copy.
#[derive(Debug, Clone)]
pub struct Floorplan<'d> {
    design: &'d Design,
    areas: Vec<Area>,
}

/// One line of a written solution, in one-based board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolutionRow {
    /// Region index in design order, zero-based.
    pub region: u32,
    /// Leftmost column, one-based.
    pub x: usize,
    /// Top row, one-based.
    pub y: usize,
    /// Columns covered.
    pub w: usize,
    /// Rows covered.
    pub h: usize,
}

impl<'d> Floorplan<'d> {
    /// Creates a floorplan with every region unplaced.
    pub fn new(design: &'d Design) -> Self {
        Self {
            design,
            areas: design.regions().iter().map(Area::new).collect(),
        }
    }

    /// Rebuilds a floorplan from previously extracted areas, such as the best
    /// partial assignment carried by an infeasibility error.
    ///
    /// Returns `None` if the areas do not match the design's regions.
    pub fn from_areas(design: &'d Design, areas: Vec<Area>) -> Option<Self> {
        let matches = areas.len() == design.region_count()
            && areas
                .iter()
                .enumerate()
                .all(|(i, a)| a.region().index() == i && design.board.contains_rect(a.top_left(), a.width(), a.height()));
        matches.then_some(Self { design, areas })
    }

    /// The design being floorplanned.
    pub fn design(&self) -> &'d Design {
        self.design
    }

    /// Every area, in design order.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Consumes the floorplan, returning its areas.
    pub fn into_areas(self) -> Vec<Area> {
        self.areas
    }

    /// The area assigned to `id`.
    pub fn area(&self, id: RegionId) -> &Area {
        &self.areas[id.index()]
    }

    /// Areas committed so far.
    pub fn confirmed(&self) -> impl Iterator<Item = &Area> + '_ {
        self.areas.iter().filter(|a| a.is_confirmed())
    }

    /// Regions still waiting for an area, in design order.
    pub fn pending(&self) -> Vec<RegionId> {
        self.areas
            .iter()
            .filter(|a| !a.is_confirmed())
            .map(Area::region)
            .collect()
    }

    /// Whether every region has a committed area.
    pub fn is_fully_placed(&self) -> bool {
        self.areas.iter().all(Area::is_confirmed)
    }

    /// Commits `area` as its region's placement.
    pub fn confirm_area(&mut self, mut area: Area) {
        area.set_confirmed(true);
        let index = area.region().index();
        self.areas[index] = area;
    }

    /// Returns a region to the pending set. Its last rectangle is kept so it
    /// can still guide the next placement attempt.
    pub fn unconfirm(&mut self, id: RegionId) {
        self.areas[id.index()].set_confirmed(false);
    }

    /// Whether `area` could be committed now: it covers no forbidden cell and
    /// clashes with no confirmed area of another region.
    pub fn can_place(&self, area: &Area) -> bool {
        let board = &self.design.board;
        if area.resources(board)[BlockType::Forbidden] > 0 {
            return false;
        }
        let tile_height = board.tile_height();
        self.confirmed()
            .filter(|other| other.region() != area.region())
            .all(|other| !area.is_overlapping(other, tile_height))
    }

    /// Placeable points not covered by any confirmed area, in row-major order.
    pub fn free_points(&self) -> Vec<GridPoint> {
        let board = &self.design.board;
        let mut taken = vec![false; board.rows() * board.cols()];
        for area in self.confirmed() {
            for p in area.points() {
                taken[p.y * board.cols() + p.x] = true;
            }
        }
        board
            .valid_points()
            .filter(|p| !taken[p.y * board.cols() + p.x])
            .collect()
    }

    /// `max_score` minus the cost of the complete floorplan.
    pub fn score(&self) -> Result<i64, FloorplanError> {
        if !self.is_fully_placed() {
            return Err(FloorplanError::NotFullyPlaced {
                pending: self.areas.iter().filter(|a| !a.is_confirmed()).count(),
            });
        }
        let areas: Vec<&Area> = self.areas.iter().collect();
        Ok(self.design.costs.max_score - self.cost_of(&areas))
    }

    /// Cost of the confirmed areas together with `candidate`, which replaces
    /// any confirmed area of the same region.
    pub fn partial_cost_with(&self, candidate: &Area) -> i64 {
        let areas: Vec<&Area> = self
            .confirmed()
            .filter(|a| a.region() != candidate.region())
            .chain(std::iter::once(candidate))
            .collect();
        self.cost_of(&areas)
    }

    /// Cost charged to one region: its own area cost plus every wire that
    /// touches it, measured between current centers whether or not the
    /// areas are confirmed.
    pub fn region_cost(&self, id: RegionId) -> i64 {
        let design = self.design;
        let costs = &design.costs;
        let area = self.area(id);
        let center = area.center();
        let mut wires: f64 = design
            .region(id)
            .io
            .iter()
            .map(|io| Point::from(io.point).manhattan(center) * f64::from(io.wires))
            .sum();
        for other in self.areas.iter().filter(|a| a.region() != id) {
            let w = design.wires(id, other.region()) + design.wires(other.region(), id);
            wires += f64::from(w) * center.manhattan(other.center());
        }
        area.cost(&design.board, costs) * costs.area_weight + wires as i64 * costs.wire_weight
    }

    /// Wire-weighted mean of the region's IO points and its partners'
    /// current centers. `None` when nothing is wired to the region.
    pub fn pull_center(&self, id: RegionId) -> Option<Point> {
        let design = self.design;
        let mut sum = Point::default();
        let mut total = 0.0;
        let mut add = |p: Point, w: u32| {
            let w = f64::from(w);
            sum.x += p.x * w;
            sum.y += p.y * w;
            total += w;
        };
        for io in &design.region(id).io {
            add(Point::from(io.point), io.wires);
        }
        for other in self.areas.iter().filter(|a| a.region() != id) {
            add(other.center(), design.wires(id, other.region()) + design.wires(other.region(), id));
        }
        (total > 0.0).then(|| Point::new(sum.x / total, sum.y / total))
    }

    fn cost_of(&self, areas: &[&Area]) -> i64 {
        let design = self.design;
        let costs = &design.costs;
        let area_cost: i64 = areas.iter().map(|a| a.cost(&design.board, costs)).sum();
        let wire_length = wire_length(design, areas);
        area_cost * costs.area_weight + wire_length as i64 * costs.wire_weight
    }

    /// One-based solution rows, in design order.
    pub fn solution_rows(&self) -> Vec<SolutionRow> {
        self.areas
            .iter()
            .map(|a| SolutionRow {
                region: a.region().as_raw(),
                x: a.left() + 1,
                y: a.top() + 1,
                w: a.width() + 1,
                h: a.height() + 1,
            })
            .collect()
    }

    /// Writes the design id followed by one `x y w h` line per region.
    pub fn write_solution(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.design.id)?;
        for row in self.solution_rows() {
            writeln!(out, "{} {} {} {}", row.x, row.y, row.w, row.h)?;
        }
        Ok(())
    }

    /// Draws the board with each confirmed area labeled by its region index.
    ///
    /// Cells outside every area show their block type; regions past the
    /// tenth are labeled with letters.
    pub fn render_map(&self) -> String {
        let board = &self.design.board;
        let mut grid: Vec<Vec<char>> = (0..board.rows())
            .map(|y| {
                (0..board.cols())
                    .map(|x| board.cell(GridPoint::new(x, y)).as_char().to_ascii_lowercase())
                    .collect()
            })
            .collect();
        for area in self.confirmed() {
            let label = region_label(area.region());
            for p in area.points() {
                grid[p.y][p.x] = label;
            }
        }
        let mut out = String::with_capacity(board.rows() * (board.cols() + 1));
        for row in grid {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

/// IO wires pull each area's center towards its pins; region wires pull
/// centers towards each other. Both count weighted Manhattan distance.
fn wire_length(design: &Design, areas: &[&Area]) -> f64 {
    let centers: Vec<(RegionId, Point)> = areas.iter().map(|a| (a.region(), a.center())).collect();
    let mut total = 0.0;
    for &(id, center) in &centers {
        for io in &design.region(id).io {
            total += Point::from(io.point).manhattan(center) * f64::from(io.wires);
        }
        for &(other, other_center) in &centers {
            if other != id {
                total += f64::from(design.wires(id, other)) * center.manhattan(other_center);
            }
        }
    }
    total
}

fn region_label(id: RegionId) -> char {
    const LABELS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    LABELS.get(id.index()).map_or('#', |&b| b as char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use partplace_device::{Board, Costs, Region, RegionKind, Resources};

    fn costs() -> Costs {
        Costs {
            max_score: 1_000,
            area_weight: 2,
            wire_weight: 3,
            clb_weight: 1,
            bram_weight: 5,
            dsp_weight: 7,
        }
    }

    fn design() -> Design {
        let board = Board::from_rows(&["CCCCCC", "CCCCCC", "CCFCCC", "CCCCCC"], 2).unwrap();
        let regions = vec![
            Region::new(RegionId::from_raw(0), RegionKind::Static, Resources::logic(2, 0, 0))
                .with_io(GridPoint::new(0, 0), 2),
            Region::new(RegionId::from_raw(1), RegionKind::Static, Resources::logic(2, 0, 0)),
        ];
        Design::new("fp", board, costs(), regions, vec![vec![0, 1], vec![0, 0]]).unwrap()
    }

    fn area(design: &Design, id: u32, x: usize, y: usize, w: usize, h: usize) -> Area {
        Area::with_bounds(
            design.region(RegionId::from_raw(id)),
            GridPoint::new(x, y),
            w,
            h,
            &design.board,
        )
        .unwrap()
    }

    #[test]
    fn new_floorplan_is_empty() {
        let d = design();
        let plan = Floorplan::new(&d);
        assert_eq!(plan.pending().len(), 2);
        assert!(!plan.is_fully_placed());
        assert!(matches!(
            plan.score(),
            Err(FloorplanError::NotFullyPlaced { pending: 2 })
        ));
        // 24 cells minus one forbidden.
        assert_eq!(plan.free_points().len(), 23);
    }

    #[test]
    fn confirm_and_unconfirm() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));
        assert_eq!(plan.pending(), vec![RegionId::from_raw(1)]);
        assert_eq!(plan.free_points().len(), 21);

        plan.unconfirm(RegionId::from_raw(0));
        assert_eq!(plan.pending().len(), 2);
        assert_eq!(plan.area(RegionId::from_raw(0)).width(), 1);
    }

    #[test]
    fn can_place_rejects_clashes_and_forbidden_cells() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));

        assert!(!plan.can_place(&area(&d, 1, 1, 0, 1, 0)));
        assert!(plan.can_place(&area(&d, 1, 2, 0, 1, 0)));
        assert!(!plan.can_place(&area(&d, 1, 2, 2, 0, 0)));
        // A region never clashes with its own confirmed area.
        assert!(plan.can_place(&area(&d, 0, 0, 0, 2, 0)));
    }

    #[test]
    fn score_combines_area_and_wires() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        // Centers (0.5, 0) and (4.5, 0).
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));
        plan.confirm_area(area(&d, 1, 4, 0, 1, 0));

        // area: 4 CLB * 1 * weight 2 = 8
        // wires: io 0.5 * 2 = 1, region 0 -> 1 distance 4 * 1 = 4, total 5 * 3 = 15
        assert_eq!(plan.score().unwrap(), 1_000 - 8 - 15);
    }

    #[test]
    fn partial_cost_replaces_own_region() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));
        let candidate = area(&d, 0, 0, 0, 0, 1);
        // Only the candidate counts: 2 CLB * 2 + io distance 0.5 * 2 wires * 3.
        assert_eq!(plan.partial_cost_with(&candidate), 4 + 3);
    }

    #[test]
    fn region_cost_counts_wires_both_ways() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));
        plan.confirm_area(area(&d, 1, 4, 0, 1, 0));
        // 8 area, (io 1 + link 4) * 3 wires.
        assert_eq!(plan.region_cost(RegionId::from_raw(0)), 8 + 15);
        // The 0 -> 1 link is charged to region 1 as well.
        assert_eq!(plan.region_cost(RegionId::from_raw(1)), 8 + 12);
    }

    #[test]
    fn pull_center_weights_io_and_partners() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));
        plan.confirm_area(area(&d, 1, 4, 0, 1, 0));
        // Two io wires at x = 0, one link to the partner at x = 4.5.
        assert_eq!(plan.pull_center(RegionId::from_raw(0)), Some(Point::new(1.5, 0.0)));
        assert_eq!(plan.pull_center(RegionId::from_raw(1)), Some(Point::new(0.5, 0.0)));
    }

    #[test]
    fn writes_one_based_solution() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));
        plan.confirm_area(area(&d, 1, 3, 1, 2, 2));

        let mut out = Vec::new();
        plan.write_solution(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "fp\n1 1 2 1\n4 2 3 3\n");

        let json = serde_json::to_value(plan.solution_rows()).unwrap();
        assert_eq!(json[1]["x"], 4);
        assert_eq!(json[1]["h"], 3);
    }

    #[test]
    fn map_labels_regions() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 1, 4, 0, 1, 0));
        let map = plan.render_map();
        assert_eq!(map.lines().next(), Some("cccc11"));
        assert_eq!(map.lines().nth(2), Some("ccfccc"));
    }

    #[test]
    fn from_areas_checks_region_order() {
        let d = design();
        let mut plan = Floorplan::new(&d);
        plan.confirm_area(area(&d, 0, 0, 0, 1, 0));
        let areas = plan.clone().into_areas();
        let rebuilt = Floorplan::from_areas(&d, areas.clone()).unwrap();
        assert_eq!(rebuilt.areas(), plan.areas());

        let reversed: Vec<Area> = areas.into_iter().rev().collect();
        assert!(Floorplan::from_areas(&d, reversed).is_none());
    }
}
