//! Requested logical partitions and their IO pins.

use crate::block::Resources;
use crate::ids::RegionId;
use partplace_common::GridPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a region is fixed logic or a dynamically reconfigurable slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum RegionKind {
    /// Static logic. No column-boundary constraint.
    Static,
    /// A reconfigurable partition. Its left and right edges must sit on
    /// marked boundary columns.
    Reconfigurable,
}

impl RegionKind {
    /// Parses the design-file marker (`S` or `R`).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'S' => Some(RegionKind::Static),
            'R' => Some(RegionKind::Reconfigurable),
            _ => None,
        }
    }

    /// The design-file marker for this kind.
    pub fn as_char(self) -> char {
        match self {
            RegionKind::Static => 'S',
            RegionKind::Reconfigurable => 'R',
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Static => write!(f, "static"),
            RegionKind::Reconfigurable => write!(f, "reconfigurable"),
        }
    }
}

/// A bundle of wires from a region to a fixed board location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IoConn {
    /// Zero-based pin location.
    pub point: GridPoint,
    /// Number of wires to the pin.
    pub wires: u32,
}

/// A requested partition: what it needs and where it talks to.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Region {
    /// Position in the design.
    pub id: RegionId,
    /// Static or reconfigurable.
    pub kind: RegionKind,
    /// Minimum cell counts the placed area must cover.
    pub resources: Resources,
    /// IO pin connections.
    pub io: Vec<IoConn>,
}

impl Region {
    /// Creates a region without IO connections.
    pub fn new(id: RegionId, kind: RegionKind, resources: Resources) -> Self {
        Self {
            id,
            kind,
            resources,
            io: Vec::new(),
        }
    }

    /// Adds an IO connection.
    pub fn with_io(mut self, point: GridPoint, wires: u32) -> Self {
        self.io.push(IoConn { point, wires });
        self
    }

    /// Returns `true` for reconfigurable regions.
    pub fn is_reconfigurable(&self) -> bool {
        self.kind == RegionKind::Reconfigurable
    }
}
