//! `partplace check`: resource precheck without solving.

use partplace_device::{load_design, BlockType, Design, RegionKind};
use partplace_diagnostics::{Category, Diagnostic, DiagnosticCode};
use serde::Serialize;

use crate::pipeline::{render_text, visible};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

const DEMAND_EXCEEDS_SUPPLY: DiagnosticCode = DiagnosticCode::new(Category::Input, 2);

/// Supply and demand of one logic type.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResourceLine {
    /// Block type name.
    pub kind: String,
    /// Cells of this type on the board.
    pub available: u32,
    /// Summed demand over all regions.
    pub required: u32,
}

/// Result of `partplace check`, as printed in JSON mode.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// The design id.
    pub design: String,
    /// Board columns.
    pub cols: usize,
    /// Board rows.
    pub rows: usize,
    /// Number of regions.
    pub regions: usize,
    /// Number of reconfigurable regions.
    pub reconfigurable: usize,
    /// Supply against demand per logic type.
    pub resources: Vec<ResourceLine>,
    /// Whether aggregate demand fits the board.
    pub feasible: bool,
    /// Diagnostics raised by the check.
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the precheck report for a design.
pub fn check_design(design: &Design) -> CheckReport {
    let supply = design.board.totals();
    let demand = design.total_demand();
    let resources = BlockType::LOGIC
        .into_iter()
        .map(|kind| ResourceLine {
            kind: kind.to_string(),
            available: supply[kind],
            required: demand[kind],
        })
        .collect();

    let mut diagnostics = Vec::new();
    let feasible = match design.check_feasibility() {
        Ok(()) => true,
        Err(e) => {
            diagnostics.push(
                Diagnostic::error(DEMAND_EXCEEDS_SUPPLY, e.to_string())
                    .with_help("reduce the regional requirements or use a larger device"),
            );
            false
        }
    };

    CheckReport {
        design: design.id.clone(),
        cols: design.board.cols(),
        rows: design.board.rows(),
        regions: design.region_count(),
        reconfigurable: design
            .regions()
            .iter()
            .filter(|r| r.kind == RegionKind::Reconfigurable)
            .count(),
        resources,
        feasible,
        diagnostics,
    }
}

/// Runs the `partplace check` command.
///
/// Returns exit code 0 if the design passes the precheck, 1 if not.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let design = load_design(&args.design)?;
    let mut report = check_design(&design);
    report.diagnostics = visible(report.diagnostics, global);

    match args.format {
        ReportFormat::Text => {
            render_text(&report.diagnostics, global);
            if !global.quiet {
                print_text(&report, &design, global);
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(if report.feasible { 0 } else { 1 })
}

fn print_text(report: &CheckReport, design: &Design, global: &GlobalArgs) {
    println!(
        "{}: {}x{} board, {} regions ({} reconfigurable)",
        report.design, report.cols, report.rows, report.regions, report.reconfigurable
    );
    for line in &report.resources {
        println!("  {:<5} {:>6} / {:<6}", line.kind, line.required, line.available);
    }
    if global.verbose {
        for region in design.regions() {
            println!(
                "  {} {:?} needs {} (weight {})",
                region.id,
                region.kind,
                region.resources,
                design.region_weight(region.id)
            );
        }
    }
    println!("{}", if report.feasible { "ok" } else { "infeasible" });
}
