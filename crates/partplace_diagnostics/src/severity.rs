//! How serious a solver or CLI diagnostic is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a diagnostic, ordered so that `Note < Warning < Error`.
///
/// Solver progress (regions placed, disruptions, improvement rounds) is a
/// `Note`. A `Warning` marks a run that still produced a floorplan but a
/// weaker one, such as a missing center oracle or an early stop. An `Error`
/// means no usable floorplan came out.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Search progress.
    Note,
    /// A degraded but usable result.
    Warning,
    /// No floorplan, or an infeasible design.
    Error,
}

impl Severity {
    /// Least severe level reported at a given verbosity.
    ///
    /// `quiet` keeps errors only and wins over `verbose`, which adds the
    /// search progress notes. By default warnings and errors are shown.
    pub fn reporting_threshold(quiet: bool, verbose: bool) -> Severity {
        match (quiet, verbose) {
            (true, _) => Severity::Error,
            (false, true) => Severity::Note,
            (false, false) => Severity::Warning,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}
