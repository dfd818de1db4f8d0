//! Phase two: improvement rounds over a complete floorplan.

use super::first_placement::{first_placement, PhaseError};
use super::worst_moving::move_worst;
use super::{codes, SearchContext};
use crate::cancel::CancelToken;
use crate::disruptor::{AreaDisruptor, CommonResourcesDisruptor};
use crate::error::SolveError;
use crate::floorplan::Floorplan;
use crate::placer::AreaPlacer;
use partplace_common::{InternalError, Point};
use partplace_config::{ImproveStrategy, SolverTuning};
use partplace_device::RegionId;
use partplace_diagnostics::{Diagnostic, DiagnosticSink};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::mpsc;
use std::thread;

/// Mixed into the configured seed so worker seeds differ from the stream
/// used by the first placement.
const ROUND_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// What one improvement worker came back with.
enum WorkerOutcome<'d> {
    Improved { plan: Floorplan<'d>, score: i64 },
    Failed,
    Cancelled,
    Internal(InternalError),
}

/// Improves a complete floorplan with the strategy selected by `tuning`.
pub(crate) fn improve<'d>(
    start: Floorplan<'d>,
    tuning: &SolverTuning,
    placer: &dyn AreaPlacer,
    centers: Option<&[Point]>,
    sink: &DiagnosticSink,
    cancel: &CancelToken,
) -> Result<Floorplan<'d>, SolveError> {
    match tuning.improver {
        ImproveStrategy::Disrupt => disrupt_rounds(start, tuning, placer, centers, sink, cancel),
        ImproveStrategy::WorstMoving => move_worst(start, tuning, placer, centers, sink, cancel),
    }
}

/// Runs up to `max_optimization_rounds` disrupt-and-replace rounds on `start`.
///
/// Each round hands a private copy of the best floorplan to one worker per
/// target region (at most `max_concurrency`). A worker evicts areas around
/// its target, then re-places everything pending with its own disruption
/// budget. The first worker to report a strictly higher score wins the round
/// and the others are cancelled. The returned floorplan never scores below
/// `start`.
fn disrupt_rounds<'d>(
    start: Floorplan<'d>,
    tuning: &SolverTuning,
    placer: &dyn AreaPlacer,
    centers: Option<&[Point]>,
    sink: &DiagnosticSink,
    cancel: &CancelToken,
) -> Result<Floorplan<'d>, SolveError> {
    let mut rng = StdRng::seed_from_u64(tuning.seed ^ ROUND_SEED_SALT);
    let mut best_score = start.score()?;
    let mut best = start;
    let region_count = best.design().region_count();
    let workers = region_count.min(tuning.max_concurrency.max(1));

    for round in 1..=tuning.max_optimization_rounds {
        if cancel.is_cancelled() {
            sink.emit(Diagnostic::warning(
                codes::IMPROVE_CANCELLED,
                format!("improvement stopped before round {round}; keeping score {best_score}"),
            ));
            break;
        }

        let mut targets: Vec<RegionId> = best.areas().iter().map(|a| a.region()).collect();
        targets.shuffle(&mut rng);
        targets.truncate(workers);
        let jobs: Vec<(RegionId, u64)> = targets.into_iter().map(|t| (t, rng.gen())).collect();

        let round_cancel = cancel.child();
        let (winner, failed) = run_round(&best, best_score, &jobs, tuning, placer, centers, &round_cancel)?;

        match winner {
            Some((plan, score)) => {
                sink.emit(Diagnostic::note(
                    codes::ROUND_IMPROVED,
                    format!("round {round}: score {best_score} -> {score}"),
                ));
                best = plan;
                best_score = score;
            }
            None => {
                sink.emit(Diagnostic::note(
                    codes::ROUND_UNCHANGED,
                    format!(
                        "round {round}: no improvement over {best_score} ({failed} of {} workers ran out of disruptions)",
                        jobs.len()
                    ),
                ));
            }
        }
    }
    Ok(best)
}

/// Runs one round of workers and returns the winning floorplan, if any,
/// with the number of workers that exhausted their budget.
fn run_round<'d>(
    best: &Floorplan<'d>,
    best_score: i64,
    jobs: &[(RegionId, u64)],
    tuning: &SolverTuning,
    placer: &dyn AreaPlacer,
    centers: Option<&[Point]>,
    round_cancel: &CancelToken,
) -> Result<(Option<(Floorplan<'d>, i64)>, usize), InternalError> {
    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        for &(target, seed) in jobs {
            let tx = tx.clone();
            let plan = best.clone();
            scope.spawn(move || {
                let ctx = SearchContext {
                    placer,
                    centers,
                    cancel: round_cancel,
                    sink: None,
                };
                // The receiver only hangs up once the round is decided.
                let _ = tx.send(replace_around(plan, target, seed, tuning, &ctx));
            });
        }
        drop(tx);

        let mut failed = 0;
        for outcome in rx {
            match outcome {
                WorkerOutcome::Improved { plan, score } if score > best_score => {
                    round_cancel.cancel();
                    return Ok((Some((plan, score)), failed));
                }
                WorkerOutcome::Improved { .. } | WorkerOutcome::Cancelled => {}
                WorkerOutcome::Failed => failed += 1,
                WorkerOutcome::Internal(err) => {
                    round_cancel.cancel();
                    return Err(err);
                }
            }
        }
        Ok((None, failed))
    })
}

/// One worker: evict around `target`, release `target` itself, then place
/// everything pending again.
fn replace_around<'d>(
    mut plan: Floorplan<'d>,
    target: RegionId,
    seed: u64,
    tuning: &SolverTuning,
    ctx: &SearchContext<'_>,
) -> WorkerOutcome<'d> {
    let mut disruptor = CommonResourcesDisruptor::new(tuning, seed);
    let mut evicted = Vec::new();
    disruptor.disrupt_for(target, &mut plan, &mut evicted);
    plan.unconfirm(target);

    match first_placement(plan, tuning.worker_disruptions(), &mut disruptor, ctx) {
        Ok(plan) if plan.is_fully_placed() => match plan.score() {
            Ok(score) => WorkerOutcome::Improved { plan, score },
            Err(err) => WorkerOutcome::Internal(InternalError::new(err.to_string())),
        },
        Ok(_) => WorkerOutcome::Cancelled,
        Err(PhaseError::Exhausted { .. }) => WorkerOutcome::Failed,
        Err(PhaseError::Internal(err)) => WorkerOutcome::Internal(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::optimizer::tests::{config, small_design};
    use crate::placer::IslandPlacer;
    use crate::reducer::{build_reducer, CostModel};
    use partplace_common::GridPoint;
    use partplace_device::Design;

    /// A complete but deliberately poor floorplan: every region boxed into a
    /// corner far from its partners.
    fn spread(d: &Design) -> Floorplan<'_> {
        let mut plan = Floorplan::new(d);
        let board = &d.board;
        // Region 0: CLB + BRAM around column 3, rows 0-1.
        plan.confirm_area(Area::with_bounds(&d.regions()[0], GridPoint::new(1, 0), 2, 1, board).unwrap());
        // Region 1: DSP column 8, bottom rows.
        plan.confirm_area(Area::with_bounds(&d.regions()[1], GridPoint::new(7, 3), 2, 2, board).unwrap());
        // Region 2: reconfigurable block in the far corner.
        plan.confirm_area(Area::with_bounds(&d.regions()[2], GridPoint::new(9, 0), 2, 1, board).unwrap());
        plan
    }

    fn worker_placer(d: &Design) -> IslandPlacer {
        IslandPlacer::new(build_reducer(&config().solver, d, CostModel::Floorplan))
    }

    #[test]
    fn never_returns_a_worse_floorplan() {
        let d = small_design();
        let start = spread(&d);
        assert!(start.is_fully_placed());
        let before = start.score().unwrap();

        let sink = DiagnosticSink::new();
        let tuning = config().solver;
        let placer = worker_placer(&d);
        let best = improve(start, &tuning, &placer, None, &sink, &CancelToken::new()).unwrap();
        assert!(best.is_fully_placed());
        assert!(best.score().unwrap() >= before);

        let rounds = sink
            .diagnostics()
            .iter()
            .filter(|diag| diag.code == codes::ROUND_IMPROVED || diag.code == codes::ROUND_UNCHANGED)
            .count();
        assert_eq!(rounds, tuning.max_optimization_rounds);
    }

    #[test]
    fn cancelled_improvement_keeps_the_start() {
        let d = small_design();
        let start = spread(&d);
        let before = start.areas().to_vec();

        let sink = DiagnosticSink::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let placer = worker_placer(&d);
        let best = improve(start, &config().solver, &placer, None, &sink, &cancel).unwrap();
        assert_eq!(best.areas(), before.as_slice());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|diag| diag.code == codes::IMPROVE_CANCELLED));
    }

    #[test]
    fn zero_rounds_is_a_no_op() {
        let d = small_design();
        let start = spread(&d);
        let before = start.score().unwrap();
        let mut tuning = config().solver;
        tuning.max_optimization_rounds = 0;

        let sink = DiagnosticSink::new();
        let placer = worker_placer(&d);
        let best = improve(start, &tuning, &placer, None, &sink, &CancelToken::new()).unwrap();
        assert_eq!(best.score().unwrap(), before);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn cancelled_worker_reports_cancelled() {
        let d = small_design();
        let tuning = config().solver;
        let placer = worker_placer(&d);
        let cancel = CancelToken::new();
        cancel.cancel();
        let ctx = SearchContext {
            placer: &placer,
            centers: None,
            cancel: &cancel,
            sink: None,
        };
        let outcome = replace_around(spread(&d), d.regions()[1].id, 3, &tuning, &ctx);
        assert!(matches!(outcome, WorkerOutcome::Cancelled));
    }
}
