//! End-to-end runs over designs read from text.

use partplace_config::{PlannerConfig, SolverTuning};
use partplace_device::parse_design;
use partplace_diagnostics::DiagnosticSink;
use partplace_solver::{solve, CancelToken, SolveError};

const FOUR_REGIONS: &str = "\
quad
100000 1 1
1 4 6
8 12
4
CCCBCCCCDCCC
CCCBCCCCDCCC
CCCBCCCCDCCC
CCCBCCCCDCCC
CCCBCCCCDCCC
CCCBCCCCDCCC
CCCBCCCCDCCC
CCCBCCCCDCCC
1 1 1 1 1 1 1 1 1 1 1 1
1 1 1 1 1 1 1 1 1 1 1 1
4
S 6 2 0 1
1 1 4
S 4 0 2 0
R 8 0 0 0
R 4 1 0 0
0 5 0 0
5 0 2 0
0 2 0 3
0 0 3 0
";

fn config() -> PlannerConfig {
    PlannerConfig {
        solver: SolverTuning {
            max_optimization_rounds: 2,
            max_concurrency: 2,
            seed: 17,
            ..SolverTuning::default()
        },
        ..PlannerConfig::default()
    }
}

#[test]
fn solves_and_writes_one_based_rows() {
    let design = parse_design(FOUR_REGIONS).unwrap();
    let sink = DiagnosticSink::new();
    let plan = solve(&design, &config(), &sink, &CancelToken::new()).unwrap();

    assert!(plan.is_fully_placed());
    assert!(plan.score().unwrap() > 0);
    assert!(!sink.has_errors());

    let th = design.board.tile_height();
    for a in plan.areas() {
        assert!(a.is_valid(&design.board), "{a:?}");
        assert!(a.is_sufficient(&design), "{a:?}");
        for b in plan.areas() {
            if a.region() != b.region() {
                assert!(!a.is_overlapping(b, th), "{a:?} overlaps {b:?}");
            }
        }
    }

    let mut out = Vec::new();
    plan.write_solution(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("quad"));
    for (line, row) in lines.zip(plan.solution_rows()) {
        assert_eq!(line, format!("{} {} {} {}", row.x, row.y, row.w, row.h));
        assert!(row.x >= 1 && row.y >= 1);
        assert!(row.x + row.w - 1 <= 12 && row.y + row.h - 1 <= 8);
    }
    assert_eq!(text.lines().count(), 1 + design.region_count());
}

#[test]
fn oversized_design_is_rejected_without_search() {
    let text = FOUR_REGIONS.replace("S 4 0 2 0", "S 4 0 9 0");
    let design = parse_design(&text).unwrap();
    let sink = DiagnosticSink::new();
    let err = solve(&design, &config(), &sink, &CancelToken::new()).unwrap_err();
    match err {
        SolveError::InfeasibleDesign(infeasible) => {
            assert!(infeasible.to_string().contains("DSP"), "{infeasible}");
        }
        other => panic!("expected an infeasible design, got {other:?}"),
    }
    assert!(sink.has_errors());
}

#[test]
fn same_seed_same_first_floorplan() {
    let design = parse_design(FOUR_REGIONS).unwrap();
    let mut cfg = config();
    cfg.solver.max_optimization_rounds = 0;
    let run = || {
        let sink = DiagnosticSink::new();
        solve(&design, &cfg, &sink, &CancelToken::new())
            .unwrap()
            .solution_rows()
    };
    assert_eq!(run(), run());
}
