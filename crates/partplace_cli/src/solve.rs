//! `partplace solve`: floorplan one or more designs and write solutions.
//!
//! For each design file:
//!
//! 1. Parse the design
//! 2. Arm the `--time-limit` timer, if any
//! 3. Run the solver
//! 4. Write the solution when it is complete and scores above zero
//! 5. Render the collected diagnostics
//!
//! Without `--out-dir` exactly one design is accepted and its solution goes
//! to `-o <path>` or stdout. In JSON mode stdout carries the report instead,
//! with the solution rows embedded.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use partplace_config::PlannerConfig;
use partplace_device::load_design;
use partplace_diagnostics::{Diagnostic, DiagnosticSink};
use partplace_solver::{solve, CancelToken, Floorplan, SolutionRow, SolveError};
use serde::Serialize;

use crate::pipeline::{apply_overrides, render_text, resolve_config, visible};
use crate::{GlobalArgs, ReportFormat, SolveArgs};

/// How one design ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A complete floorplan with a positive score was written.
    Solved,
    /// A complete floorplan was found but scored zero or below; nothing written.
    NonPositiveScore,
    /// The time limit fired before every region was placed.
    Incomplete,
    /// The design cannot be placed on its board.
    Infeasible,
    /// The design could not be read or the solution could not be written.
    Failed,
}

/// Result of one design, as printed in JSON mode.
#[derive(Debug, Serialize)]
pub struct DesignReport {
    /// The design file as given on the command line.
    pub file: String,
    /// The design id, once parsed.
    pub design: Option<String>,
    /// How the run ended.
    pub outcome: Outcome,
    /// Score of the complete floorplan.
    pub score: Option<i64>,
    /// One-based solution rows, empty unless a complete floorplan exists.
    pub solution: Vec<SolutionRow>,
    /// Where the solution was written, if it went to a file.
    pub written_to: Option<String>,
    /// Explanation for any outcome other than `Solved`.
    pub message: Option<String>,
    /// Diagnostics visible under the current verbosity.
    pub diagnostics: Vec<Diagnostic>,
}

impl DesignReport {
    fn new(file: &Path) -> Self {
        Self {
            file: file.display().to_string(),
            design: None,
            outcome: Outcome::Failed,
            score: None,
            solution: Vec::new(),
            written_to: None,
            message: None,
            diagnostics: Vec::new(),
        }
    }

    fn fail(mut self, outcome: Outcome, message: impl Into<String>) -> Self {
        self.outcome = outcome;
        self.message = Some(message.into());
        self
    }
}

/// Runs the `partplace solve` command.
///
/// Returns exit code 0 when every design was solved and written, 1 otherwise.
pub fn run(args: &SolveArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if args.designs.len() > 1 && args.out_dir.is_none() {
        return Err("solving several designs requires --out-dir".into());
    }
    let mut config = resolve_config(global)?;
    apply_overrides(&mut config, args)?;
    if let Some(ref dir) = args.out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut reports = Vec::with_capacity(args.designs.len());
    for path in &args.designs {
        if !global.quiet && args.format == ReportFormat::Text {
            eprintln!("   Solving {}", path.display());
        }
        let report = solve_one(path, &config, args, global);
        if args.format == ReportFormat::Text {
            print_text(&report, global);
        }
        reports.push(report);
    }

    if args.format == ReportFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let failed = reports.iter().filter(|r| r.outcome != Outcome::Solved).count();
    if !global.quiet && args.format == ReportFormat::Text && reports.len() > 1 {
        eprintln!(
            "   Result: {} solved, {} not written",
            reports.len() - failed,
            failed
        );
    }
    Ok(if failed == 0 { 0 } else { 1 })
}

/// Solves one design file and writes its solution.
pub fn solve_one(
    path: &Path,
    config: &PlannerConfig,
    args: &SolveArgs,
    global: &GlobalArgs,
) -> DesignReport {
    let mut report = DesignReport::new(path);
    let design = match load_design(path) {
        Ok(design) => design,
        Err(e) => return report.fail(Outcome::Failed, e.to_string()),
    };
    report.design = Some(design.id.clone());

    let sink = DiagnosticSink::new();
    let cancel = CancelToken::new();
    if let Some(secs) = args.time_limit {
        arm_time_limit(&cancel, secs);
    }

    let result = solve(&design, config, &sink, &cancel);
    let mut report = match result {
        Ok(plan) => finish(report, &plan, path, args, global),
        Err(SolveError::Infeasible { best, unplaced, total, disruptions }) => {
            if args.map && !global.quiet {
                if let Some(partial) = Floorplan::from_areas(&design, best) {
                    eprint!("{}", partial.render_map());
                }
            }
            report.fail(
                Outcome::Infeasible,
                format!("{unplaced} of {total} regions unplaced after {disruptions} disruptions"),
            )
        }
        Err(e @ SolveError::InfeasibleDesign(_)) => report.fail(Outcome::Infeasible, e.to_string()),
        Err(e) => report.fail(Outcome::Failed, e.to_string()),
    };
    report.diagnostics = visible(sink.take_all(), global);
    report
}

/// Records and writes a floorplan returned by the solver.
fn finish(
    mut report: DesignReport,
    plan: &Floorplan<'_>,
    path: &Path,
    args: &SolveArgs,
    global: &GlobalArgs,
) -> DesignReport {
    if args.map && !global.quiet {
        eprint!("{}", plan.render_map());
    }
    if !plan.is_fully_placed() {
        let pending = plan.pending().len();
        return report.fail(
            Outcome::Incomplete,
            format!("time limit reached with {pending} regions unplaced"),
        );
    }
    let score = match plan.score() {
        Ok(score) => score,
        Err(e) => return report.fail(Outcome::Failed, e.to_string()),
    };
    report.score = Some(score);
    report.solution = plan.solution_rows();
    if score <= 0 {
        return report.fail(
            Outcome::NonPositiveScore,
            format!("score {score} is not positive; solution not written"),
        );
    }

    match destination(path, args) {
        Some(out) => {
            if let Err(e) = write_to_file(plan, &out) {
                return report.fail(
                    Outcome::Failed,
                    format!("failed to write {}: {e}", out.display()),
                );
            }
            report.written_to = Some(out.display().to_string());
        }
        None if args.format == ReportFormat::Text => {
            if let Err(e) = plan.write_solution(&mut io::stdout().lock()) {
                return report.fail(Outcome::Failed, format!("failed to write solution: {e}"));
            }
        }
        None => {}
    }
    report.outcome = Outcome::Solved;
    report
}

/// File the solution of `path` goes to, or `None` for stdout.
fn destination(path: &Path, args: &SolveArgs) -> Option<PathBuf> {
    match (&args.out_dir, &args.output) {
        (Some(dir), _) => Some(dir.join(path.file_name().unwrap_or(path.as_os_str()))),
        (None, Some(output)) => Some(output.clone()),
        (None, None) => None,
    }
}

fn write_to_file(plan: &Floorplan<'_>, out: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(out)?);
    plan.write_solution(&mut writer)?;
    writer.flush()
}

/// Cancels `cancel` after `secs` seconds. The timer thread is detached.
fn arm_time_limit(cancel: &CancelToken, secs: u64) {
    let token = cancel.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(secs));
        token.cancel();
    });
}

fn print_text(report: &DesignReport, global: &GlobalArgs) {
    render_text(&report.diagnostics, global);
    match (report.outcome, &report.message) {
        (Outcome::Solved, _) => {
            if !global.quiet {
                let score = report.score.unwrap_or_default();
                match report.written_to {
                    Some(ref out) => eprintln!("   Solved {} (score {score}) -> {out}", report.file),
                    None => eprintln!("   Solved {} (score {score})", report.file),
                }
            }
        }
        (_, Some(message)) => eprintln!("error: {}: {message}", report.file),
        (_, None) => eprintln!("error: {}: not solved", report.file),
    }
}
