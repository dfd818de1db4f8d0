//! Eviction of confirmed areas to make room for a region that did not fit.

use crate::area::Area;
use crate::floorplan::Floorplan;
use partplace_config::SolverTuning;
use partplace_device::{BlockType, RegionId, Resources};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Share of confirmed areas evicted when too few are confirmed for a batch.
const FALLBACK_SHARE: f64 = 0.7;

/// Confirmed-area count, as a multiple of the chaos factor, below which the
/// flat-share fallback is used.
const FALLBACK_THRESHOLD: f64 = 1.3;

/// Frees space in a floorplan for a region the placer could not fit.
pub trait AreaDisruptor: Send {
    /// Unconfirms a batch of areas on behalf of `target`, appending each
    /// evicted region to `pending`. Returns how many were evicted.
    fn disrupt_for(
        &mut self,
        target: RegionId,
        plan: &mut Floorplan<'_>,
        pending: &mut Vec<RegionId>,
    ) -> usize;
}

/// Evicts areas that hold the resources the target region lacks.
///
/// Confirmed areas are split into those that cover less than the target
/// needs of some type ("smaller") and the rest ("bigger"). Most of a batch
/// comes from the smaller pool, evicting adjacent pairs whose combined
/// resources are large first, since two neighbors freed together leave one
/// large hole. The larger pool fills the rest, so a batch always evicts
/// its full size while enough areas are confirmed.
#[derive(Debug, Clone)]
pub struct CommonResourcesDisruptor {
    chaos_factor: usize,
    chaos_variance: usize,
    pair_threshold: u32,
    rng: StdRng,
}

impl CommonResourcesDisruptor {
    /// Creates a disruptor with the batch settings from `tuning` and a
    /// random stream seeded by `seed`.
    pub fn new(tuning: &SolverTuning, seed: u64) -> Self {
        Self {
            chaos_factor: tuning.chaos_factor,
            chaos_variance: tuning.chaos_variance,
            pair_threshold: tuning.resource_disrupt_threshold,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn batch_size(&mut self) -> usize {
        let variance = self.chaos_variance as i64;
        let jitter = if variance > 0 {
            self.rng.gen_range(-variance..=variance)
        } else {
            0
        };
        (self.chaos_factor as i64 + jitter).max(1) as usize
    }

    fn pair_qualifies(&self, a: &Area, b: &Area, plan: &Floorplan<'_>, need: &Resources) -> bool {
        if !a.is_adjacent(b) {
            return false;
        }
        let board = &plan.design().board;
        let combined = a.resources(board) + b.resources(board);
        BlockType::LOGIC
            .into_iter()
            .filter(|&kind| need[kind] > 0)
            .all(|kind| combined[kind] >= self.pair_threshold)
    }
}

impl AreaDisruptor for CommonResourcesDisruptor {
    fn disrupt_for(
        &mut self,
        target: RegionId,
        plan: &mut Floorplan<'_>,
        pending: &mut Vec<RegionId>,
    ) -> usize {
        let mut confirmed: Vec<RegionId> = plan.confirmed().map(Area::region).collect();
        if confirmed.is_empty() {
            return 0;
        }

        let mut evicted = Vec::new();
        if (confirmed.len() as f64) < self.chaos_factor as f64 * FALLBACK_THRESHOLD {
            let count = ((confirmed.len() as f64 * FALLBACK_SHARE) as usize).max(1);
            confirmed.shuffle(&mut self.rng);
            evicted.extend_from_slice(&confirmed[..count]);
        } else {
            let view: &Floorplan<'_> = plan;
            let design = view.design();
            let need = design.region(target).resources;
            let (mut smaller, mut bigger): (Vec<RegionId>, Vec<RegionId>) =
                confirmed.into_iter().partition(|&id| {
                    let covered = view.area(id).resources(&design.board);
                    let short = covered.shortfalls(&need).next().is_some();
                    short
                });
            smaller.shuffle(&mut self.rng);
            bigger.shuffle(&mut self.rng);

            let batch = self.batch_size();
            let small_share = if smaller.len() > bigger.len() { 0.65 } else { 0.8 };
            let small_quota = ((batch as f64 * small_share).ceil() as usize).min(smaller.len());

            // Adjacent pairs first.
            let mut taken = vec![false; smaller.len()];
            let mut quota = small_quota;
            for i in 0..smaller.len() {
                if quota < 2 {
                    break;
                }
                if taken[i] {
                    continue;
                }
                let partner = (i + 1..smaller.len()).find(|&j| {
                    !taken[j]
                        && self.pair_qualifies(view.area(smaller[i]), view.area(smaller[j]), view, &need)
                });
                if let Some(j) = partner {
                    taken[i] = true;
                    taken[j] = true;
                    evicted.push(smaller[i]);
                    evicted.push(smaller[j]);
                    quota -= 2;
                }
            }
            // Then singles from what is left.
            for (i, &id) in smaller.iter().enumerate() {
                if quota == 0 {
                    break;
                }
                if !taken[i] {
                    taken[i] = true;
                    evicted.push(id);
                    quota -= 1;
                }
            }
            // The larger pool fills the rest of the batch, and leftover
            // smaller areas cover a short larger pool.
            let rest = batch.saturating_sub(evicted.len());
            let leftovers = (0..smaller.len()).filter(|&i| !taken[i]).map(|i| smaller[i]);
            evicted.extend(bigger.iter().copied().chain(leftovers).take(rest));
        }

        for &id in &evicted {
            plan.unconfirm(id);
            pending.push(id);
        }
        evicted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partplace_common::GridPoint;
    use partplace_device::{Board, Costs, Design, Region, RegionKind};

    fn costs() -> Costs {
        Costs {
            max_score: 0,
            area_weight: 1,
            wire_weight: 1,
            clb_weight: 1,
            bram_weight: 1,
            dsp_weight: 1,
        }
    }

    /// Twelve single-column static regions on a 12x4 CLB board plus one
    /// unplaced target needing two columns.
    fn crowded() -> Design {
        let board = Board::from_rows(&["CCCCCCCCCCCC"; 4], 2).unwrap();
        let mut regions: Vec<Region> = (0..12)
            .map(|i| Region::new(RegionId::from_raw(i), RegionKind::Static, Resources::logic(4, 0, 0)))
            .collect();
        regions.push(Region::new(
            RegionId::from_raw(12),
            RegionKind::Static,
            Resources::logic(8, 0, 0),
        ));
        Design::new("crowd", board, costs(), regions, vec![vec![0; 13]; 13]).unwrap()
    }

    fn fill(design: &Design) -> Floorplan<'_> {
        let mut plan = Floorplan::new(design);
        for i in 0..12 {
            let region = design.region(RegionId::from_raw(i));
            let area = Area::with_bounds(region, GridPoint::new(i as usize, 0), 0, 3, &design.board).unwrap();
            plan.confirm_area(area);
        }
        plan
    }

    fn tuning(chaos: usize, variance: usize) -> SolverTuning {
        SolverTuning {
            chaos_factor: chaos,
            chaos_variance: variance,
            ..SolverTuning::default()
        }
    }

    #[test]
    fn nothing_to_evict() {
        let d = crowded();
        let mut plan = Floorplan::new(&d);
        let mut pending = Vec::new();
        let mut disruptor = CommonResourcesDisruptor::new(&tuning(5, 2), 1);
        assert_eq!(disruptor.disrupt_for(RegionId::from_raw(12), &mut plan, &mut pending), 0);
        assert!(pending.is_empty());
    }

    #[test]
    fn few_confirmed_uses_flat_share() {
        let d = crowded();
        let mut plan = fill(&d);
        let mut pending = Vec::new();
        // 12 confirmed < 1.3 * 10
        let mut disruptor = CommonResourcesDisruptor::new(&tuning(10, 0), 7);
        let n = disruptor.disrupt_for(RegionId::from_raw(12), &mut plan, &mut pending);
        assert_eq!(n, 8);
        assert_eq!(pending.len(), 8);
        assert_eq!(plan.confirmed().count(), 4);
        for id in &pending {
            assert!(!plan.area(*id).is_confirmed());
        }
    }

    #[test]
    fn single_confirmed_area_is_still_evicted() {
        let d = crowded();
        let mut plan = Floorplan::new(&d);
        let region = d.region(RegionId::from_raw(0));
        plan.confirm_area(Area::with_bounds(region, GridPoint::new(0, 0), 0, 0, &d.board).unwrap());
        let mut pending = Vec::new();
        let mut disruptor = CommonResourcesDisruptor::new(&tuning(5, 0), 3);
        assert_eq!(disruptor.disrupt_for(RegionId::from_raw(12), &mut plan, &mut pending), 1);
        assert_eq!(pending, vec![RegionId::from_raw(0)]);
    }

    #[test]
    fn batch_prefers_adjacent_pairs_of_small_areas() {
        let d = crowded();
        let mut plan = fill(&d);
        let mut pending = Vec::new();
        // Every area covers 4 CLB, short of the target's 8, so all are
        // "smaller". Batch 5 -> ceil(5 * 0.65) = 4 from the small pool, and
        // with no larger areas the last slot also comes from the small pool.
        let mut disruptor = CommonResourcesDisruptor::new(&tuning(5, 0), 11);
        let n = disruptor.disrupt_for(RegionId::from_raw(12), &mut plan, &mut pending);
        assert_eq!(n, 5);

        let mut columns: Vec<usize> = pending.iter().map(|id| plan.area(*id).left()).collect();
        columns.sort_unstable();
        // Evicted in neighbor pairs.
        let neighbors = columns.windows(2).filter(|w| w[1] == w[0] + 1).count();
        assert!(neighbors >= 2, "{columns:?}");
    }

    /// `narrow` one-column and `wide` two-column static areas side by side
    /// on a 4-row CLB board, plus an unplaced target needing 8 CLB. Narrow
    /// areas fall short of the target, wide ones cover it.
    fn mixed(narrow: usize, wide: usize) -> Design {
        let cols = narrow + 2 * wide;
        let row = "C".repeat(cols);
        let board = Board::from_rows(&[row.as_str(); 4], 2).unwrap();
        let mut regions: Vec<Region> = (0..narrow + wide)
            .map(|i| {
                let clb = if i < narrow { 4 } else { 8 };
                Region::new(RegionId::from_raw(i as u32), RegionKind::Static, Resources::logic(clb, 0, 0))
            })
            .collect();
        let n = regions.len();
        regions.push(Region::new(
            RegionId::from_raw(n as u32),
            RegionKind::Static,
            Resources::logic(8, 0, 0),
        ));
        Design::new("mixed", board, costs(), regions, vec![vec![0; n + 1]; n + 1]).unwrap()
    }

    fn fill_mixed(design: &Design, narrow: usize) -> Floorplan<'_> {
        let mut plan = Floorplan::new(design);
        let mut column = 0;
        for i in 0..design.region_count() - 1 {
            let width = if i < narrow { 0 } else { 1 };
            let region = design.region(RegionId::from_raw(i as u32));
            let area = Area::with_bounds(region, GridPoint::new(column, 0), width, 3, &design.board).unwrap();
            plan.confirm_area(area);
            column += width + 1;
        }
        plan
    }

    /// Evicts one batch for the target and splits the evictions into
    /// (narrow, wide) counts.
    fn evict_mixed(narrow: usize, wide: usize, chaos: usize, seed: u64) -> (usize, usize) {
        let d = mixed(narrow, wide);
        let mut plan = fill_mixed(&d, narrow);
        let mut pending = Vec::new();
        let target = RegionId::from_raw((narrow + wide) as u32);
        let n = CommonResourcesDisruptor::new(&tuning(chaos, 0), seed).disrupt_for(target, &mut plan, &mut pending);
        assert_eq!(n, pending.len());
        let small = pending.iter().filter(|id| plan.area(**id).width() == 0).count();
        (small, n - small)
    }

    #[test]
    fn larger_pool_alone_fills_the_batch() {
        for seed in 0..8 {
            assert_eq!(evict_mixed(0, 12, 5, seed), (0, 5));
            assert_eq!(evict_mixed(0, 12, 6, seed), (0, 6));
        }
    }

    #[test]
    fn batch_splits_eighty_twenty_when_smaller_pool_is_not_larger() {
        // 6 narrow vs 6 wide: ceil(6 * 0.8) = 5 narrow, 1 wide.
        for seed in 0..8 {
            assert_eq!(evict_mixed(6, 6, 6, seed), (5, 1));
        }
    }

    #[test]
    fn batch_splits_sixty_five_thirty_five_when_smaller_pool_dominates() {
        // 8 narrow vs 5 wide: ceil(6 * 0.65) = 4 narrow, 2 wide.
        for seed in 0..8 {
            assert_eq!(evict_mixed(8, 5, 6, seed), (4, 2));
        }
    }

    #[test]
    fn short_smaller_pool_is_topped_up_from_larger() {
        // 2 narrow vs 10 wide: the small quota of 4 shrinks to 2.
        for seed in 0..8 {
            assert_eq!(evict_mixed(2, 10, 5, seed), (2, 3));
        }
    }

    #[test]
    fn same_seed_same_eviction() {
        let d = crowded();
        let run = |seed| {
            let mut plan = fill(&d);
            let mut pending = Vec::new();
            CommonResourcesDisruptor::new(&tuning(5, 2), seed).disrupt_for(
                RegionId::from_raw(12),
                &mut plan,
                &mut pending,
            );
            pending
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn batch_jitter_stays_positive() {
        let mut disruptor = CommonResourcesDisruptor::new(&tuning(1, 3), 5);
        for _ in 0..100 {
            let b = disruptor.batch_size();
            assert!((1..=4).contains(&b));
        }
    }
}
