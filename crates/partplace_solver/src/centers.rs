//! Ideal-center oracles: per-region target points that guide reduction.
//!
//! The wire objective is a sum of weighted Manhattan distances, which splits
//! into independent `x` and `y` problems. On each axis the point minimizing
//! a weighted sum of distances to fixed points is their weighted median, so
//! [`WeightedMedianOracle`] sweeps the regions repeatedly, moving each one to
//! the weighted median of its IO pins and its neighbors' current targets.

use partplace_common::Point;
use partplace_config::{CenterConfig, OracleKind};
use partplace_device::Design;

/// Supplies one target point per region, in design order.
pub trait CenterOracle: Send + Sync {
    /// Returns the targets, or `None` if this oracle has no opinion.
    fn ideal_centers(&self, design: &Design) -> Option<Vec<Point>>;
}

/// Builds the oracle selected by `config`.
pub fn build_oracle(config: &CenterConfig) -> Box<dyn CenterOracle> {
    match config.oracle {
        OracleKind::Median => Box::new(WeightedMedianOracle::new(config.iterations)),
        OracleKind::None => Box::new(NoOracle),
    }
}

/// Iterated weighted-median minimizer of the wire objective.
#[derive(Debug, Clone, Copy)]
pub struct WeightedMedianOracle {
    iterations: usize,
}

impl WeightedMedianOracle {
    /// Creates an oracle performing at most `iterations` sweeps.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }
}

impl CenterOracle for WeightedMedianOracle {
    fn ideal_centers(&self, design: &Design) -> Option<Vec<Point>> {
        let board = &design.board;
        let (x_max, y_max) = (board.x_max() as f64, board.y_max() as f64);
        let mut targets = vec![Point::new(x_max / 2.0, y_max / 2.0); design.region_count()];

        for _ in 0..self.iterations {
            let mut moved = false;
            for region in design.regions() {
                let i = region.id.index();
                let mut xs = Vec::new();
                let mut ys = Vec::new();
                for io in &region.io {
                    let w = f64::from(io.wires);
                    xs.push((io.point.x as f64, w));
                    ys.push((io.point.y as f64, w));
                }
                for other in design.regions() {
                    if other.id == region.id {
                        continue;
                    }
                    let w = design.wires(region.id, other.id) + design.wires(other.id, region.id);
                    if w > 0 {
                        let t = targets[other.id.index()];
                        xs.push((t.x, f64::from(w)));
                        ys.push((t.y, f64::from(w)));
                    }
                }
                let (Some(x), Some(y)) = (weighted_median(&mut xs), weighted_median(&mut ys)) else {
                    continue;
                };
                let next = Point::new(x.clamp(0.0, x_max), y.clamp(0.0, y_max));
                if next != targets[i] {
                    targets[i] = next;
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }
        Some(targets)
    }
}

/// An oracle with no opinion; placement falls back to current area centers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOracle;

impl CenterOracle for NoOracle {
    fn ideal_centers(&self, _design: &Design) -> Option<Vec<Point>> {
        None
    }
}

/// Weighted median of `(value, weight)` pairs. When the cumulative weight
/// reaches exactly half, the midpoint of the two straddling values is used.
fn weighted_median(values: &mut [(f64, f64)]) -> Option<f64> {
    let total: f64 = values.iter().map(|&(_, w)| w).sum();
    if values.is_empty() || total <= 0.0 {
        return None;
    }
    values.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut acc = 0.0;
    for (i, &(v, w)) in values.iter().enumerate() {
        acc += w;
        if acc * 2.0 > total {
            return Some(v);
        }
        if acc * 2.0 == total {
            return Some(values.get(i + 1).map_or(v, |&(next, _)| (v + next) / 2.0));
        }
    }
    values.last().map(|&(v, _)| v)
}
