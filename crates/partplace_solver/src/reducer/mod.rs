//! Reducers shrink an expanded island into a tight rectangle.
//!
//! A reducer receives a valid, sufficient area and an ideal center and
//! returns a valid, sufficient area contained in the input. Two strategies
//! exist: [`RatioReducer`] peels single rows and columns guided by resource
//! ratios, and [`PrReducer`] works in whole reconfiguration tiles first.
//! [`build_reducer`] picks one for a design.

mod pr;
mod ratio;

pub use pr::PrReducer;
pub use ratio::RatioReducer;

use crate::area::Area;
use crate::floorplan::Floorplan;
use partplace_common::{Direction, PlanResult, Point, ShapeAction};
use partplace_config::{ReducerStrategy, SolverTuning};
use partplace_device::{Board, Design};

/// Shrinks an area towards an ideal center while keeping it admissible.
pub trait AreaReducer: Send + Sync {
    /// Reduces `area` in place. Requires a valid, sufficient input and leaves
    /// `area` valid and sufficient.
    fn reduce(&self, area: &mut Area, ideal: Point, plan: &Floorplan<'_>) -> PlanResult<()>;

    /// The score this reducer minimizes.
    fn cost(&self, area: &Area, plan: &Floorplan<'_>) -> i64;
}

/// How candidate rectangles are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostModel {
    /// The candidate's own weighted resource cost. Used while building the
    /// first floorplan, when most areas are still unplaced.
    Area,
    /// The cost of the confirmed floorplan with the candidate added. Used by
    /// improvement workers, which optimize the real objective.
    Floorplan,
}

impl CostModel {
    /// Scores `area` against `plan`.
    pub fn evaluate(self, area: &Area, plan: &Floorplan<'_>) -> i64 {
        match self {
            CostModel::Area => {
                let design = plan.design();
                let costs = design.costs.non_zero();
                area.cost(&design.board, &costs) * costs.area_weight
            }
            CostModel::Floorplan => plan.partial_cost_with(area),
        }
    }
}

/// Picks the reducer configured by `tuning` for `design`.
///
/// `auto` chooses the PR reducer, with the ratio reducer as its fallback for
/// static regions, once reconfigurable regions make up more than
/// `pr_dominance` of the design.
pub fn build_reducer(
    tuning: &SolverTuning,
    design: &Design,
    model: CostModel,
) -> Box<dyn AreaReducer> {
    let ratio = || RatioReducer::new(tuning, model);
    let pr = || -> Box<dyn AreaReducer> {
        Box::new(PrReducer::new(tuning.min_region_thickness, model).with_fallback(ratio()))
    };
    match tuning.reducer {
        ReducerStrategy::Ratio => Box::new(ratio()),
        ReducerStrategy::Pr => pr(),
        ReducerStrategy::Auto if design.reconfigurable_share() > tuning.pr_dominance => pr(),
        ReducerStrategy::Auto => Box::new(ratio()),
    }
}

/// Shrinks one edge unless the footprint along that axis is already at the
/// minimum thickness.
pub(crate) fn shrink(area: &mut Area, dir: Direction, min_thickness: usize, board: &Board) -> bool {
    let extent = if dir.is_horizontal() {
        area.width()
    } else {
        area.height()
    };
    // extent + 1 cells now, extent after the shrink
    extent >= min_thickness.max(1) && area.try_shape(ShapeAction::Shrink, dir, board)
}

/// Rejects reducer input that is not admissible.
pub(crate) fn check_admissible(area: &Area, design: &Design, stage: &str) -> PlanResult<()> {
    if !area.is_valid(&design.board) {
        return Err(format!("{stage}: area for {} is not valid", area.region()).into());
    }
    if !area.is_sufficient(design) {
        return Err(format!("{stage}: area for {} is not sufficient", area.region()).into());
    }
    Ok(())
}
