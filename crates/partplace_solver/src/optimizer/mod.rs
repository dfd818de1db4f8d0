//! The two-phase search: build a first complete floorplan, then improve it.
//!
//! # Phases
//!
//! 1. **Precheck**: reject designs whose aggregate demand exceeds the board.
//! 2. **First placement**: place regions hardest first with the area cost
//!    model; when some do not fit, disrupt the floorplan and retry until
//!    everything is placed or the disruption budget runs out.
//! 3. **Improvement**: by default each round starts several workers on
//!    private copies of the best floorplan. A worker evicts areas around one
//!    region and re-places them with the floorplan cost model; the first
//!    result scoring strictly better is adopted. The `worst_moving` improver
//!    instead pulls the costliest regions toward their partners one by one.

mod first_placement;
mod improve;
mod worst_moving;

use crate::cancel::CancelToken;
use crate::centers::build_oracle;
use crate::disruptor::CommonResourcesDisruptor;
use crate::error::SolveError;
use crate::floorplan::Floorplan;
use crate::placer::{AreaPlacer, IslandPlacer};
use crate::reducer::{build_reducer, CostModel};
use first_placement::{first_placement, PhaseError};
use partplace_common::Point;
use partplace_config::PlannerConfig;
use partplace_device::Design;
use partplace_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

pub(crate) mod codes {
    use super::{Category, DiagnosticCode};

    pub const SOLVE_START: DiagnosticCode = DiagnosticCode::new(Category::Input, 1);
    pub const INFEASIBLE_DESIGN: DiagnosticCode = DiagnosticCode::new(Category::Input, 2);
    pub const NO_CENTERS: DiagnosticCode = DiagnosticCode::new(Category::Input, 3);
    pub const REGION_PLACED: DiagnosticCode = DiagnosticCode::new(Category::Placement, 1);
    pub const REGION_DEFERRED: DiagnosticCode = DiagnosticCode::new(Category::Placement, 2);
    pub const DISRUPTION: DiagnosticCode = DiagnosticCode::new(Category::Search, 1);
    pub const BUDGET_EXHAUSTED: DiagnosticCode = DiagnosticCode::new(Category::Search, 2);
    pub const PLACEMENT_CANCELLED: DiagnosticCode = DiagnosticCode::new(Category::Search, 3);
    pub const FIRST_FLOORPLAN: DiagnosticCode = DiagnosticCode::new(Category::Improve, 1);
    pub const ROUND_IMPROVED: DiagnosticCode = DiagnosticCode::new(Category::Improve, 2);
    pub const ROUND_UNCHANGED: DiagnosticCode = DiagnosticCode::new(Category::Improve, 3);
    pub const IMPROVE_CANCELLED: DiagnosticCode = DiagnosticCode::new(Category::Improve, 4);
}

/// Where a [`Solver`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvePhase {
    /// Nothing has been attempted.
    Unplaced,
    /// Building the first floorplan, including disruption rounds.
    Placing,
    /// A complete floorplan exists.
    AllPlaced,
    /// Running improvement rounds.
    Improving,
    /// Finished with a complete floorplan, or stopped early by cancellation.
    Done,
    /// Gave up: the design is infeasible or the disruption budget ran out.
    Infeasible,
}

/// Shared, read-only inputs of a placement run.
pub(crate) struct SearchContext<'a> {
    pub placer: &'a dyn AreaPlacer,
    pub centers: Option<&'a [Point]>,
    pub cancel: &'a CancelToken,
    /// Progress is reported only by the top-level run, not by workers.
    pub sink: Option<&'a DiagnosticSink>,
}

impl SearchContext<'_> {
    fn emit(&self, diag: Diagnostic) {
        if let Some(sink) = self.sink {
            sink.emit(diag);
        }
    }
}

/// Drives one design through all phases.
#[derive(Debug)]
pub struct Solver<'d> {
    design: &'d Design,
    config: PlannerConfig,
    phase: SolvePhase,
}

impl<'d> Solver<'d> {
    /// Creates a solver for `design`.
    pub fn new(design: &'d Design, config: PlannerConfig) -> Self {
        Self {
            design,
            config,
            phase: SolvePhase::Unplaced,
        }
    }

    /// The phase reached so far.
    pub fn phase(&self) -> SolvePhase {
        self.phase
    }

    /// Runs every phase and returns the best floorplan found.
    ///
    /// If `cancel` fires before a complete floorplan exists, the partial
    /// floorplan is returned; check [`Floorplan::is_fully_placed`].
    pub fn run(
        &mut self,
        sink: &DiagnosticSink,
        cancel: &CancelToken,
    ) -> Result<Floorplan<'d>, SolveError> {
        let design = self.design;
        let tuning = &self.config.solver;
        let board = &design.board;
        sink.emit(Diagnostic::note(
            codes::SOLVE_START,
            format!(
                "solving design '{}': {} regions on a {}x{} board",
                design.id,
                design.region_count(),
                board.cols(),
                board.rows()
            ),
        ));

        if let Err(err) = design.check_feasibility() {
            self.phase = SolvePhase::Infeasible;
            sink.emit(
                Diagnostic::error(codes::INFEASIBLE_DESIGN, err.to_string())
                    .with_help("reduce the regional requirements or use a larger device"),
            );
            return Err(err.into());
        }

        let centers = build_oracle(&self.config.centers).ideal_centers(design);
        if centers.is_none() {
            sink.emit(Diagnostic::note(
                codes::NO_CENTERS,
                "no ideal centers available; placement follows current area centers",
            ));
        }

        self.phase = SolvePhase::Placing;
        let placer = IslandPlacer::new(build_reducer(tuning, design, CostModel::Area));
        let ctx = SearchContext {
            placer: &placer,
            centers: centers.as_deref(),
            cancel,
            sink: Some(sink),
        };
        let mut disruptor = CommonResourcesDisruptor::new(tuning, tuning.seed);
        let first = match first_placement(
            Floorplan::new(design),
            tuning.max_disruptions,
            &mut disruptor,
            &ctx,
        ) {
            Ok(plan) => plan,
            Err(PhaseError::Exhausted { best, disruptions }) => {
                self.phase = SolvePhase::Infeasible;
                let unplaced = best.pending().len();
                sink.emit(
                    Diagnostic::error(
                        codes::BUDGET_EXHAUSTED,
                        format!(
                            "{unplaced} of {} regions could not be placed after {disruptions} disruptions",
                            design.region_count()
                        ),
                    )
                    .with_help("raise `max_disruptions` or relax the regional requirements"),
                );
                return Err(SolveError::Infeasible {
                    unplaced,
                    total: design.region_count(),
                    disruptions,
                    best: best.into_areas(),
                });
            }
            Err(PhaseError::Internal(err)) => return Err(err.into()),
        };

        if !first.is_fully_placed() {
            self.phase = SolvePhase::Done;
            sink.emit(Diagnostic::warning(
                codes::PLACEMENT_CANCELLED,
                format!(
                    "cancelled with {} of {} regions unplaced",
                    first.pending().len(),
                    design.region_count()
                ),
            ));
            return Ok(first);
        }

        self.phase = SolvePhase::AllPlaced;
        sink.emit(Diagnostic::note(
            codes::FIRST_FLOORPLAN,
            format!("first floorplan scores {}", first.score()?),
        ));

        self.phase = SolvePhase::Improving;
        let worker_placer = IslandPlacer::new(build_reducer(tuning, design, CostModel::Floorplan));
        let best = improve::improve(first, tuning, &worker_placer, centers.as_deref(), sink, cancel)?;
        self.phase = SolvePhase::Done;
        Ok(best)
    }
}

/// Solves `design` with the given configuration.
///
/// Convenience wrapper around [`Solver::run`].
pub fn solve<'d>(
    design: &'d Design,
    config: &PlannerConfig,
    sink: &DiagnosticSink,
    cancel: &CancelToken,
) -> Result<Floorplan<'d>, SolveError> {
    Solver::new(design, config.clone()).run(sink, cancel)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use partplace_common::GridPoint;
    use partplace_config::{ImproveStrategy, SolverTuning};
    use partplace_device::{Board, Costs, Region, RegionId, RegionKind, Resources};
    use partplace_diagnostics::Severity;

    pub(crate) fn costs() -> Costs {
        Costs {
            max_score: 100_000,
            area_weight: 1,
            wire_weight: 1,
            clb_weight: 1,
            bram_weight: 4,
            dsp_weight: 6,
        }
    }

    /// 12x6 board with a BRAM column at 3 and a DSP column at 8, tiles of 3.
    pub(crate) fn board() -> Board {
        Board::from_rows(&["CCCBCCCCDCCC"; 6], 3).unwrap()
    }

    pub(crate) fn small_design() -> Design {
        let regions = vec![
            Region::new(RegionId::from_raw(0), RegionKind::Static, Resources::logic(4, 2, 0))
                .with_io(GridPoint::new(0, 0), 2),
            Region::new(RegionId::from_raw(1), RegionKind::Static, Resources::logic(4, 0, 2)),
            Region::new(RegionId::from_raw(2), RegionKind::Reconfigurable, Resources::logic(6, 0, 0)),
        ];
        let wires = vec![vec![0, 3, 0], vec![0, 0, 1], vec![1, 0, 0]];
        Design::new("small", board(), costs(), regions, wires).unwrap()
    }

    pub(crate) fn config() -> PlannerConfig {
        PlannerConfig {
            solver: SolverTuning {
                max_optimization_rounds: 2,
                max_concurrency: 2,
                seed: 9,
                ..SolverTuning::default()
            },
            ..PlannerConfig::default()
        }
    }

    #[test]
    fn solves_small_design() {
        let d = small_design();
        let sink = DiagnosticSink::new();
        let mut solver = Solver::new(&d, config());
        let plan = solver.run(&sink, &CancelToken::new()).unwrap();
        assert_eq!(solver.phase(), SolvePhase::Done);
        assert!(plan.is_fully_placed());
        assert!(plan.score().unwrap() > 0);
        for area in plan.areas() {
            assert!(area.is_valid(&d.board));
            assert!(area.is_sufficient(&d));
            for other in plan.areas() {
                if other.region() != area.region() {
                    assert!(!area.is_overlapping(other, d.board.tile_height()));
                }
            }
        }
        assert!(!sink.has_errors());
    }

    #[test]
    fn worst_moving_improver_keeps_a_complete_floorplan() {
        let d = small_design();
        let mut cfg = config();
        cfg.solver.improver = ImproveStrategy::WorstMoving;
        let sink = DiagnosticSink::new();
        let mut solver = Solver::new(&d, cfg);
        let plan = solver.run(&sink, &CancelToken::new()).unwrap();
        assert_eq!(solver.phase(), SolvePhase::Done);
        assert!(plan.is_fully_placed());
        assert_eq!(
            sink.count(codes::ROUND_IMPROVED) + sink.count(codes::ROUND_UNCHANGED),
            2
        );
    }

    #[test]
    fn infeasible_design_is_rejected_before_search() {
        let regions = vec![Region::new(
            RegionId::from_raw(0),
            RegionKind::Static,
            Resources::logic(0, 7, 0),
        )];
        let d = Design::new("big", board(), costs(), regions, vec![vec![0]]).unwrap();
        let sink = DiagnosticSink::new();
        let mut solver = Solver::new(&d, config());
        let err = solver.run(&sink, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SolveError::InfeasibleDesign(_)));
        assert_eq!(solver.phase(), SolvePhase::Infeasible);

        let diags = sink.take_all();
        assert!(diags.iter().any(|d| d.code == codes::INFEASIBLE_DESIGN));
        // No placement progress was reported.
        assert!(!diags.iter().any(|d| d.code == codes::REGION_PLACED));
    }

    #[test]
    fn exhausted_budget_reports_best_partial() {
        // One tile row spans the whole board, so two reconfigurable regions
        // that both need the BRAM column can never coexist.
        let single_tile = Board::from_rows(&["CCCBCCCCDCCC"; 6], 6).unwrap();
        let regions = (0..2)
            .map(|i| {
                Region::new(
                    RegionId::from_raw(i),
                    RegionKind::Reconfigurable,
                    Resources::logic(0, 2, 0),
                )
            })
            .collect();
        let d = Design::new("tight", single_tile, costs(), regions, vec![vec![0; 2]; 2]).unwrap();
        assert!(d.check_feasibility().is_ok());

        let mut cfg = config();
        cfg.solver.max_disruptions = 3;
        let sink = DiagnosticSink::new();
        let mut solver = Solver::new(&d, cfg);
        match solver.run(&sink, &CancelToken::new()) {
            Err(SolveError::Infeasible {
                unplaced,
                total,
                disruptions,
                best,
            }) => {
                assert_eq!(unplaced, 1);
                assert_eq!(total, 2);
                assert_eq!(disruptions, 3);
                assert_eq!(sink.count(codes::DISRUPTION), 3);
                assert_eq!(best.iter().filter(|a| a.is_confirmed()).count(), 1);
                assert_eq!(solver.phase(), SolvePhase::Infeasible);
                assert!(sink
                    .diagnostics()
                    .iter()
                    .any(|d| d.severity == Severity::Error && d.code == codes::BUDGET_EXHAUSTED));
            }
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_before_start_returns_partial_plan() {
        let d = small_design();
        let sink = DiagnosticSink::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let plan = solve(&d, &config(), &sink, &cancel).unwrap();
        assert!(!plan.is_fully_placed());
        assert!(sink.count(codes::PLACEMENT_CANCELLED) > 0);
    }
}
