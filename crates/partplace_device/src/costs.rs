//! Objective weights.

use crate::block::{BlockType, Resources};
use serde::{Deserialize, Serialize};

/// Score ceiling and the weights of the area and wire-length terms.
///
/// A floorplan scores `max_score - (area_cost * area_weight + wire_length * wire_weight)`,
/// where the area cost weighs every covered cell by its type.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Costs {
    /// Score of a floorplan with zero cost.
    pub max_score: i64,
    /// Multiplier of the total area cost.
    pub area_weight: i64,
    /// Multiplier of the total wire length.
    pub wire_weight: i64,
    /// Cost of one covered CLB.
    pub clb_weight: i64,
    /// Cost of one covered BRAM.
    pub bram_weight: i64,
    /// Cost of one covered DSP.
    pub dsp_weight: i64,
}

impl Costs {
    /// Per-cell weight of a block type. Forbidden and null cells cost nothing.
    pub fn weight(&self, kind: BlockType) -> i64 {
        match kind {
            BlockType::Clb => self.clb_weight,
            BlockType::Bram => self.bram_weight,
            BlockType::Dsp => self.dsp_weight,
            BlockType::Forbidden | BlockType::Null => 0,
        }
    }

    /// Weighted cell count of `resources`.
    pub fn resource_cost(&self, resources: &Resources) -> i64 {
        resources
            .iter()
            .map(|(kind, count)| i64::from(count) * self.weight(kind))
            .sum()
    }

    /// Returns weights usable for ranking shrink candidates.
    ///
    /// A design that weighs only wire length gives every rectangle the same
    /// area cost, which leaves reducers blind. A zero area weight is replaced
    /// by the wire weight together with default per-type weights, and a zero
    /// CLB weight is derived from the scarcer types.
    pub fn non_zero(&self) -> Costs {
        let mut c = *self;
        if c.area_weight == 0 {
            c.area_weight = c.wire_weight;
            c.clb_weight = 10;
            c.bram_weight = 20;
            c.dsp_weight = 25;
        }
        if c.clb_weight == 0 {
            c.clb_weight = (c.bram_weight.max(c.dsp_weight) as f64 / 2.5) as i64;
        }
        c
    }
}
