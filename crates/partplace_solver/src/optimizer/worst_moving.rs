//! Improvement by relocating the costliest regions toward their partners.

use super::first_placement::{first_placement, PhaseError};
use super::{codes, SearchContext};
use crate::cancel::CancelToken;
use crate::disruptor::CommonResourcesDisruptor;
use crate::error::{PlaceError, SolveError};
use crate::floorplan::Floorplan;
use crate::placer::AreaPlacer;
use partplace_common::Point;
use partplace_config::SolverTuning;
use partplace_device::RegionId;
use partplace_diagnostics::{Diagnostic, DiagnosticSink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Keeps the disruption seeds of this improver apart from the first
/// placement and from the disrupt improver.
const MOVE_SEED_SALT: u64 = 0x2545_f491_4f6c_dd1d;

/// Runs up to `max_optimization_rounds` worst-first passes on `start`.
///
/// A pass visits regions from the highest [`Floorplan::region_cost`] down.
/// Each visited region is placed alone on an emptied board near the wire
/// weighted center of its partners; the other areas are then put back
/// where they were unless they now clash, and the clashing ones are placed
/// again with a worker disruption budget. The pass ends at the first
/// strictly better floorplan. A pass that finds none leaves the floorplan
/// unchanged.
pub(crate) fn move_worst<'d>(
    start: Floorplan<'d>,
    tuning: &SolverTuning,
    placer: &dyn AreaPlacer,
    centers: Option<&[Point]>,
    sink: &DiagnosticSink,
    cancel: &CancelToken,
) -> Result<Floorplan<'d>, SolveError> {
    let mut rng = StdRng::seed_from_u64(tuning.seed ^ MOVE_SEED_SALT);
    let mut best_score = start.score()?;
    let mut best = start;

    for round in 1..=tuning.max_optimization_rounds {
        let mut order: Vec<(i64, RegionId)> =
            best.areas().iter().map(|a| (best.region_cost(a.region()), a.region())).collect();
        // Costliest first, design order among equals.
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut improved = None;
        for (_, worst) in order {
            if cancel.is_cancelled() {
                sink.emit(Diagnostic::warning(
                    codes::IMPROVE_CANCELLED,
                    format!("improvement stopped in round {round}; keeping score {best_score}"),
                ));
                return Ok(best);
            }
            let Some(target) = best.pull_center(worst) else {
                continue;
            };
            let ctx = SearchContext {
                placer,
                centers,
                cancel,
                sink: None,
            };
            if let Some(plan) = relocate(&best, worst, target, rng.gen(), tuning, &ctx)? {
                let score = plan.score()?;
                if score > best_score {
                    improved = Some((worst, plan, score));
                    break;
                }
            }
        }

        match improved {
            Some((worst, plan, score)) => {
                sink.emit(Diagnostic::note(
                    codes::ROUND_IMPROVED,
                    format!("round {round}: moved {worst}, score {best_score} -> {score}"),
                ));
                best = plan;
                best_score = score;
            }
            None => sink.emit(Diagnostic::note(
                codes::ROUND_UNCHANGED,
                format!("round {round}: no region could be moved past score {best_score}"),
            )),
        }
    }
    Ok(best)
}

/// Places `worst` near `target` on an emptied copy of `plan`, restores the
/// areas it does not clash with, and re-places the rest.
///
/// Returns `None` when the displaced areas cannot all be placed again or the
/// run was cancelled.
fn relocate<'d>(
    plan: &Floorplan<'d>,
    worst: RegionId,
    target: Point,
    seed: u64,
    tuning: &SolverTuning,
    ctx: &SearchContext<'_>,
) -> Result<Option<Floorplan<'d>>, SolveError> {
    let design = plan.design();
    let mut moved = plan.area(worst).clone();
    match ctx.placer.place_area(&mut moved, &Floorplan::new(design), target) {
        Ok(()) => {}
        Err(PlaceError::PlacementFailure { .. }) => return Ok(None),
        Err(PlaceError::Internal(err)) => return Err(err.into()),
    }

    let mut next = Floorplan::new(design);
    next.confirm_area(moved);
    for area in plan.areas().iter().filter(|a| a.region() != worst) {
        let clashes = !next.can_place(area);
        next.confirm_area(area.clone());
        if clashes {
            next.unconfirm(area.region());
        }
    }
    if next.is_fully_placed() {
        return Ok(Some(next));
    }

    let mut disruptor = CommonResourcesDisruptor::new(tuning, seed);
    match first_placement(next, tuning.worker_disruptions(), &mut disruptor, ctx) {
        Ok(placed) if placed.is_fully_placed() => Ok(Some(placed)),
        Ok(_) | Err(PhaseError::Exhausted { .. }) => Ok(None),
        Err(PhaseError::Internal(err)) => Err(err.into()),
    }
}
