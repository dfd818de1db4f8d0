//! Shared helpers for CLI commands: configuration resolution and
//! diagnostic rendering.

use std::path::Path;

use partplace_config::{validate_config, PlannerConfig};
use partplace_diagnostics::{Diagnostic, DiagnosticRenderer, Severity, TerminalRenderer};

use crate::{GlobalArgs, SolveArgs};

/// Loads the planner configuration.
///
/// With `--config` the named file must exist. Otherwise `partplace.toml` in
/// the current directory is used when present, and defaults when not.
pub fn resolve_config(global: &GlobalArgs) -> Result<PlannerConfig, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref path) => Ok(partplace_config::load_config_file(Path::new(path))?),
        None => Ok(partplace_config::load_config(&std::env::current_dir()?)?),
    }
}

/// Applies `solve` flags on top of the file configuration and revalidates.
pub fn apply_overrides(
    config: &mut PlannerConfig,
    args: &SolveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(seed) = args.seed {
        config.solver.seed = seed;
    }
    if let Some(rounds) = args.rounds {
        config.solver.max_optimization_rounds = rounds;
    }
    if let Some(jobs) = args.jobs {
        config.solver.max_concurrency = jobs;
    }
    validate_config(config)?;
    Ok(())
}

/// Keeps only the diagnostics visible under the global verbosity.
pub fn visible(diagnostics: Vec<Diagnostic>, global: &GlobalArgs) -> Vec<Diagnostic> {
    let threshold = Severity::reporting_threshold(global.quiet, global.verbose);
    diagnostics
        .into_iter()
        .filter(|d| d.severity >= threshold)
        .collect()
}

/// Prints diagnostics to stderr in terminal format.
pub fn render_text(diagnostics: &[Diagnostic], global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color, 100);
    for diag in diagnostics {
        eprint!("{}", renderer.render(diag));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportFormat;
    use partplace_diagnostics::{Category, DiagnosticCode};
    use std::path::PathBuf;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    fn solve_args() -> SolveArgs {
        SolveArgs {
            designs: vec![PathBuf::from("a.txt")],
            output: None,
            out_dir: None,
            format: ReportFormat::Text,
            seed: Some(3),
            rounds: Some(0),
            jobs: None,
            time_limit: None,
            map: false,
        }
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = PlannerConfig::default();
        apply_overrides(&mut config, &solve_args()).unwrap();
        assert_eq!(config.solver.seed, 3);
        assert_eq!(config.solver.max_optimization_rounds, 0);
        assert_eq!(
            config.solver.max_concurrency,
            PlannerConfig::default().solver.max_concurrency
        );
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let mut config = PlannerConfig::default();
        let args = SolveArgs {
            jobs: Some(0),
            ..solve_args()
        };
        let err = apply_overrides(&mut config, &args).unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }

    #[test]
    fn visible_drops_hidden_notes() {
        let code = DiagnosticCode::new(Category::Placement, 1);
        let diags = vec![
            Diagnostic::note(code, "placed"),
            Diagnostic::error(code, "broken"),
        ];
        let kept = visible(diags.clone(), &global(false, false));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].severity, Severity::Error);
        assert_eq!(visible(diags, &global(false, true)).len(), 2);
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let g = GlobalArgs {
            config: Some("/nonexistent/partplace.toml".to_string()),
            ..global(false, false)
        };
        assert!(resolve_config(&g).is_err());
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(&path, "[solver]\nseed = 42\n").unwrap();
        let g = GlobalArgs {
            config: Some(path.to_string_lossy().into_owned()),
            ..global(false, false)
        };
        assert_eq!(resolve_config(&g).unwrap().solver.seed, 42);
    }
}
