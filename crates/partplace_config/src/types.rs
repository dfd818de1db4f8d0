//! Configuration types deserialized from `partplace.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `partplace.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Search and improvement tuning.
    pub solver: SolverTuning,
    /// Ideal-center oracle settings.
    pub centers: CenterConfig,
}

/// Knobs controlling placement, disruption, and the improvement loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverTuning {
    /// Nominal number of areas evicted per disruption.
    pub chaos_factor: usize,
    /// Random jitter applied to `chaos_factor`, in both directions.
    pub chaos_variance: usize,
    /// Disruption budget for the first-placement phase.
    pub max_disruptions: usize,
    /// Number of improvement rounds after a first valid floorplan.
    pub max_optimization_rounds: usize,
    /// Fraction of `max_disruptions` granted to each improvement worker.
    pub disruption_decay_ratio: f64,
    /// Upper bound on concurrently running improvement workers.
    pub max_concurrency: usize,
    /// Smallest footprint, in cells, reducers may leave on either axis.
    pub min_region_thickness: usize,
    /// Per-type resource count an adjacent pair must reach to be evicted together.
    pub resource_disrupt_threshold: u32,
    /// Seed for every random choice the solver makes.
    pub seed: u64,
    /// Which reducer shrinks expanded islands.
    pub reducer: ReducerStrategy,
    /// How improvement rounds look for a better floorplan.
    pub improver: ImproveStrategy,
    /// Share of reconfigurable regions above which `auto` picks the PR reducer.
    pub pr_dominance: f64,
    /// Covered-to-required BRAM ratio at or below which the ratio reducer cuts height.
    pub bram_ratio_threshold: f64,
    /// Covered-to-required DSP ratio at or below which the ratio reducer cuts height.
    pub dsp_ratio_threshold: f64,
}

impl Default for SolverTuning {
    fn default() -> Self {
        Self {
            chaos_factor: 5,
            chaos_variance: 2,
            max_disruptions: 30,
            max_optimization_rounds: 5,
            disruption_decay_ratio: 0.5,
            max_concurrency: 4,
            min_region_thickness: 1,
            resource_disrupt_threshold: 2,
            seed: 0,
            reducer: ReducerStrategy::Auto,
            improver: ImproveStrategy::Disrupt,
            pr_dominance: 0.8,
            bram_ratio_threshold: 1.5,
            dsp_ratio_threshold: 1.5,
        }
    }
}

impl SolverTuning {
    /// Disruption budget handed to each improvement worker.
    pub fn worker_disruptions(&self) -> usize {
        ((self.max_disruptions as f64 * self.disruption_decay_ratio).round() as usize).max(1)
    }
}

/// Reducer selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducerStrategy {
    /// PR reducer with a ratio fallback when reconfigurable regions dominate,
    /// ratio reducer otherwise.
    #[default]
    Auto,
    /// Always use the ratio reducer.
    Ratio,
    /// Always use the PR reducer with a ratio fallback for static regions.
    Pr,
}

/// Improvement-round selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImproveStrategy {
    /// Parallel workers each evict around a random region and re-place.
    #[default]
    Disrupt,
    /// Move the costliest regions toward the weighted center of their
    /// partners, one at a time, and re-place whatever they displace.
    WorstMoving,
}

/// Ideal-center oracle settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CenterConfig {
    /// Which oracle supplies per-region target points.
    pub oracle: OracleKind,
    /// Coordinate-descent sweeps performed by the median oracle.
    pub iterations: usize,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            oracle: OracleKind::Median,
            iterations: 50,
        }
    }
}

/// Available ideal-center oracles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Iterated weighted-median wire-length minimizer.
    #[default]
    Median,
    /// No oracle; placement is guided by current area centers.
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_defaults() {
        let t = SolverTuning::default();
        assert_eq!(t.chaos_factor, 5);
        assert_eq!(t.chaos_variance, 2);
        assert_eq!(t.max_disruptions, 30);
        assert_eq!(t.resource_disrupt_threshold, 2);
        assert_eq!(t.reducer, ReducerStrategy::Auto);
    }

    #[test]
    fn worker_budget_decays() {
        let t = SolverTuning::default();
        assert_eq!(t.worker_disruptions(), 15);

        let tiny = SolverTuning {
            max_disruptions: 1,
            disruption_decay_ratio: 0.1,
            ..SolverTuning::default()
        };
        assert_eq!(tiny.worker_disruptions(), 1);
    }

    #[test]
    fn strategy_names_are_lowercase() {
        for (name, expected) in [
            ("auto", ReducerStrategy::Auto),
            ("ratio", ReducerStrategy::Ratio),
            ("pr", ReducerStrategy::Pr),
        ] {
            let parsed: SolverTuning = toml::from_str(&format!("reducer = \"{name}\"")).unwrap();
            assert_eq!(parsed.reducer, expected);
        }
        let parsed: SolverTuning = toml::from_str("improver = \"worst_moving\"").unwrap();
        assert_eq!(parsed.improver, ImproveStrategy::WorstMoving);
        assert_eq!(SolverTuning::default().improver, ImproveStrategy::Disrupt);
    }
}
