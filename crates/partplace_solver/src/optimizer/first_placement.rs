//! Phase one: place every region, disrupting the floorplan when stuck.

use super::{codes, SearchContext};
use crate::disruptor::AreaDisruptor;
use crate::error::PlaceError;
use crate::floorplan::Floorplan;
use partplace_common::InternalError;
use partplace_diagnostics::Diagnostic;

/// Why phase one stopped without a complete floorplan.
#[derive(Debug)]
pub(crate) enum PhaseError<'d> {
    /// The disruption budget ran out. `best` is the partial floorplan that
    /// left the fewest regions unplaced.
    Exhausted {
        best: Floorplan<'d>,
        disruptions: usize,
    },
    Internal(InternalError),
}

/// Places every pending region of `plan`.
///
/// Pending regions are tried hardest first. Regions that do not fit are
/// skipped for this pass; after a pass that left some unplaced, one
/// disruption is spent on the hardest of them and the pass repeats.
///
/// Cancellation is polled before each pass and before each region attempt;
/// a cancelled run returns the current, possibly partial, floorplan.
pub(crate) fn first_placement<'d>(
    mut plan: Floorplan<'d>,
    budget: usize,
    disruptor: &mut dyn AreaDisruptor,
    ctx: &SearchContext<'_>,
) -> Result<Floorplan<'d>, PhaseError<'d>> {
    let design = plan.design();
    let mut pending = plan.pending();
    let mut best_left = pending.len();
    let mut best = plan.clone();
    let mut disruptions = 0;

    while !pending.is_empty() && !ctx.cancel.is_cancelled() {
        design.sort_by_difficulty(&mut pending);

        let mut i = 0;
        while i < pending.len() {
            if ctx.cancel.is_cancelled() {
                return Ok(plan);
            }
            let id = pending[i];
            let mut area = plan.area(id).clone();
            let hint = ctx
                .centers
                .and_then(|centers| centers.get(id.index()).copied())
                .unwrap_or_else(|| area.center());

            match ctx.placer.place_area(&mut area, &plan, hint) {
                Ok(()) => {
                    ctx.emit(Diagnostic::note(
                        codes::REGION_PLACED,
                        format!(
                            "placed {id} at {} covering {}x{} cells",
                            area.top_left(),
                            area.width() + 1,
                            area.height() + 1
                        ),
                    ));
                    plan.confirm_area(area);
                    pending.remove(i);
                }
                Err(PlaceError::PlacementFailure { .. }) => {
                    ctx.emit(Diagnostic::note(
                        codes::REGION_DEFERRED,
                        format!("no room for {id} in this pass"),
                    ));
                    i += 1;
                }
                Err(PlaceError::Internal(err)) => return Err(PhaseError::Internal(err)),
            }
        }

        if pending.is_empty() {
            break;
        }
        if pending.len() < best_left {
            best_left = pending.len();
            best = plan.clone();
        }
        if disruptions == budget {
            return Err(PhaseError::Exhausted { best, disruptions });
        }
        if ctx.cancel.is_cancelled() {
            break;
        }

        let target = pending[0];
        let evicted = disruptor.disrupt_for(target, &mut plan, &mut pending);
        if evicted == 0 {
            // Nothing confirmed to give up, so further rounds cannot change the plan.
            return Err(PhaseError::Exhausted { best, disruptions });
        }
        disruptions += 1;
        ctx.emit(Diagnostic::note(
            codes::DISRUPTION,
            format!("disruption {disruptions}/{budget}: evicted {evicted} areas to make room for {target}"),
        ));
    }
    Ok(plan)
}
