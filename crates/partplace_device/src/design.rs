//! The top-level solver input.

use crate::block::{BlockType, Resources};
use crate::board::Board;
use crate::costs::Costs;
use crate::error::{DesignError, InfeasibleDesign, ResourceShortage};
use crate::ids::RegionId;
use crate::region::Region;
use std::cmp::Reverse;

/// A board, its objective weights, the ordered regions to place, and the
/// wires between them.
#[derive(Debug, Clone)]
pub struct Design {
    /// Identifier echoed at the top of written solutions.
    pub id: String,
    /// The device grid.
    pub board: Board,
    /// Objective weights.
    pub costs: Costs,
    regions: Vec<Region>,
    /// Row-major `N x N` wire counts; entry `(i, j)` counts wires from region
    /// `i` to region `j`. Not necessarily symmetric.
    wires: Vec<u32>,
}

impl Design {
    /// Assembles a design, checking that its parts agree.
    pub fn new(
        id: impl Into<String>,
        board: Board,
        costs: Costs,
        regions: Vec<Region>,
        wires: Vec<Vec<u32>>,
    ) -> Result<Self, DesignError> {
        let n = regions.len();
        if wires.len() != n {
            return Err(DesignError::WireMatrixShape {
                regions: n,
                found: wires.len(),
            });
        }
        if let Some(row) = wires.iter().find(|row| row.len() != n) {
            return Err(DesignError::WireMatrixShape {
                regions: n,
                found: row.len(),
            });
        }
        for (position, region) in regions.iter().enumerate() {
            if region.id.index() != position {
                return Err(DesignError::RegionOrder {
                    position,
                    id: region.id.as_raw(),
                });
            }
            if let Some(io) = region.io.iter().find(|io| !board.contains(io.point)) {
                return Err(DesignError::IoOutOfBoard {
                    region: position,
                    x: io.point.x,
                    y: io.point.y,
                });
            }
        }

        Ok(Self {
            id: id.into(),
            board,
            costs,
            regions,
            wires: wires.into_iter().flatten().collect(),
        })
    }

    /// Regions in design order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Looks up a region.
    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    /// Number of regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Wires from `from` to `to`.
    pub fn wires(&self, from: RegionId, to: RegionId) -> u32 {
        self.wires[from.index() * self.regions.len() + to.index()]
    }

    /// Summed requirement of every region.
    pub fn total_demand(&self) -> Resources {
        self.regions
            .iter()
            .fold(Resources::ZERO, |acc, r| acc + r.resources)
    }

    /// Rejects designs whose aggregate demand exceeds the board's supply.
    ///
    /// Passing this check does not guarantee a floorplan exists.
    pub fn check_feasibility(&self) -> Result<(), InfeasibleDesign> {
        let demand = self.total_demand();
        let supply = self.board.totals();
        let shortages: Vec<_> = BlockType::LOGIC
            .into_iter()
            .filter(|&kind| demand[kind] > supply[kind])
            .map(|kind| ResourceShortage {
                kind,
                required: demand[kind],
                available: supply[kind],
            })
            .collect();
        if shortages.is_empty() {
            Ok(())
        } else {
            Err(InfeasibleDesign { shortages })
        }
    }

    /// Sort key for placement difficulty: DSP, then BRAM, then CLB demand.
    pub fn difficulty(&self, id: RegionId) -> (u32, u32, u32) {
        let res = &self.region(id).resources;
        (
            res[BlockType::Dsp],
            res[BlockType::Bram],
            res[BlockType::Clb],
        )
    }

    /// Sorts region IDs hardest first. The sort is stable, so equally
    /// demanding regions keep their relative order.
    pub fn sort_by_difficulty(&self, ids: &mut [RegionId]) {
        ids.sort_by_key(|&id| Reverse(self.difficulty(id)));
    }

    /// All region IDs, hardest first.
    pub fn placement_order(&self) -> Vec<RegionId> {
        let mut ids: Vec<RegionId> = self.regions.iter().map(|r| r.id).collect();
        self.sort_by_difficulty(&mut ids);
        ids
    }

    /// Static weight of a region: its weighted demand plus the wires it drives.
    pub fn region_weight(&self, id: RegionId) -> i64 {
        let region = self.region(id);
        let outgoing: i64 = self
            .regions
            .iter()
            .map(|other| i64::from(self.wires(id, other.id)))
            .sum();
        let io: i64 = region.io.iter().map(|io| i64::from(io.wires)).sum();
        self.costs.resource_cost(&region.resources) * self.costs.area_weight
            + (io + outgoing) * self.costs.wire_weight
    }

    /// Fraction of regions that are reconfigurable; zero for an empty design.
    pub fn reconfigurable_share(&self) -> f64 {
        if self.regions.is_empty() {
            return 0.0;
        }
        let reconf = self.regions.iter().filter(|r| r.is_reconfigurable()).count();
        reconf as f64 / self.regions.len() as f64
    }
}
