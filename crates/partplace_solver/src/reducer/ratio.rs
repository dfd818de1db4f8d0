//! Row-and-column reducer guided by resource ratios.

use super::{check_admissible, shrink, AreaReducer, CostModel};
use crate::area::Area;
use crate::floorplan::Floorplan;
use partplace_common::{Direction, PlanResult, Point};
use partplace_config::SolverTuning;
use partplace_device::{BlockType, Design};

/// Which axis to cut next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    /// Cut height while scarce BRAM or DSP coverage is tight, since the
    /// scarce types sit in columns and cutting width would drop them whole.
    Heterogeneous,
    /// Cut the axis with the larger offset from the ideal center.
    Homogeneous,
}

/// Peels single rows and columns off an area until no edge can move without
/// losing sufficiency.
///
/// Both policies run on separate copies and the cheaper result wins. Each
/// edge is retried until a shrink on it fails; a failed edge is restored and
/// marked explored, and reduction ends once all four are explored.
#[derive(Debug, Clone)]
pub struct RatioReducer {
    min_thickness: usize,
    bram_ratio: f64,
    dsp_ratio: f64,
    model: CostModel,
}

impl RatioReducer {
    /// Creates a reducer with the thresholds from `tuning`.
    pub fn new(tuning: &SolverTuning, model: CostModel) -> Self {
        Self {
            min_thickness: tuning.min_region_thickness,
            bram_ratio: tuning.bram_ratio_threshold,
            dsp_ratio: tuning.dsp_ratio_threshold,
            model,
        }
    }

    fn reduce_with(
        &self,
        area: &mut Area,
        ideal: Point,
        design: &Design,
        policy: Policy,
    ) -> PlanResult<()> {
        let board = &design.board;
        let mut explored = [false; 4];
        let is_explored = |explored: &[bool; 4], d: Direction| explored[d.index()];

        while explored.iter().any(|e| !e) {
            let saved = area.clone();
            let center = area.center();
            let vertical_open =
                !is_explored(&explored, Direction::Up) || !is_explored(&explored, Direction::Down);
            let horizontal_open = !is_explored(&explored, Direction::Left)
                || !is_explored(&explored, Direction::Right);

            let cut_height = vertical_open && self.prefers_height(area, ideal, design, policy);
            let dir = if !cut_height && horizontal_open {
                if ideal.x > center.x {
                    Direction::Left
                } else {
                    Direction::Right
                }
            } else if ideal.y > center.y {
                Direction::Up
            } else {
                Direction::Down
            };
            let dir = if is_explored(&explored, dir) {
                dir.opposite()
            } else {
                dir
            };

            loop {
                if !shrink(area, dir, self.min_thickness, board) || !area.is_sufficient(design) {
                    explored[dir.index()] = true;
                    *area = saved;
                    break;
                }
                if area.is_valid(board) {
                    break;
                }
            }
        }
        check_admissible(area, design, "ratio reducer")
    }

    fn prefers_height(&self, area: &Area, ideal: Point, design: &Design, policy: Policy) -> bool {
        if policy == Policy::Heterogeneous {
            if let Some(tight) = self.scarce_coverage_is_tight(area, design) {
                return tight;
            }
        }
        let center = area.center();
        (ideal.y - center.y).abs() >= (ideal.x - center.x).abs()
    }

    /// `None` when the region needs neither BRAM nor DSP.
    fn scarce_coverage_is_tight(&self, area: &Area, design: &Design) -> Option<bool> {
        let required = &design.region(area.region()).resources;
        let covered = area.resources(&design.board);
        let ratio = |kind: BlockType| {
            (required[kind] > 0).then(|| f64::from(covered[kind]) / f64::from(required[kind]))
        };
        let bram = ratio(BlockType::Bram);
        let dsp = ratio(BlockType::Dsp);
        if bram.is_none() && dsp.is_none() {
            return None;
        }
        Some(dsp.is_some_and(|r| r <= self.dsp_ratio) || bram.is_some_and(|r| r <= self.bram_ratio))
    }
}

impl AreaReducer for RatioReducer {
    fn reduce(&self, area: &mut Area, ideal: Point, plan: &Floorplan<'_>) -> PlanResult<()> {
        let design = plan.design();
        check_admissible(area, design, "ratio reducer input")?;

        let mut het = area.clone();
        let mut hom = area.clone();
        let (het_result, hom_result) = rayon::join(
            || self.reduce_with(&mut het, ideal, design, Policy::Heterogeneous),
            || self.reduce_with(&mut hom, ideal, design, Policy::Homogeneous),
        );
        het_result?;
        hom_result?;

        *area = if self.cost(&het, plan) <= self.cost(&hom, plan) {
            het
        } else {
            hom
        };
        Ok(())
    }

    fn cost(&self, area: &Area, plan: &Floorplan<'_>) -> i64 {
        self.model.evaluate(area, plan)
    }
}
