//! Cell classifications and per-type resource counts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub};

/// The resource classification of one grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BlockType {
    /// Configurable logic block.
    Clb,
    /// Block RAM.
    Bram,
    /// DSP slice.
    Dsp,
    /// A cell no area may cover.
    Forbidden,
    /// An empty cell: coverable, but providing nothing.
    Null,
}

impl BlockType {
    /// Every block type, in table order.
    pub const ALL: [BlockType; 5] = [
        BlockType::Clb,
        BlockType::Bram,
        BlockType::Dsp,
        BlockType::Forbidden,
        BlockType::Null,
    ];

    /// The block types regions can request.
    pub const LOGIC: [BlockType; 3] = [BlockType::Clb, BlockType::Bram, BlockType::Dsp];

    /// Parses a cell character from a design file.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(BlockType::Clb),
            'B' => Some(BlockType::Bram),
            'D' => Some(BlockType::Dsp),
            'F' => Some(BlockType::Forbidden),
            '-' | 'N' => Some(BlockType::Null),
            _ => None,
        }
    }

    /// The character used for this type in design files and board maps.
    pub fn as_char(self) -> char {
        match self {
            BlockType::Clb => 'C',
            BlockType::Bram => 'B',
            BlockType::Dsp => 'D',
            BlockType::Forbidden => 'F',
            BlockType::Null => '-',
        }
    }

    /// Position of this type in [`BlockType::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Clb => write!(f, "CLB"),
            BlockType::Bram => write!(f, "BRAM"),
            BlockType::Dsp => write!(f, "DSP"),
            BlockType::Forbidden => write!(f, "forbidden"),
            BlockType::Null => write!(f, "null"),
        }
    }
}

/// A count of cells per [`BlockType`].
///
/// Used both for what a rectangle covers and for what a region requires.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Resources([u32; 5]);

impl Resources {
    /// No cells of any type.
    pub const ZERO: Resources = Resources([0; 5]);

    /// Creates a logic requirement with no forbidden or null cells.
    pub const fn logic(clb: u32, bram: u32, dsp: u32) -> Self {
        Self([clb, bram, dsp, 0, 0])
    }

    /// Returns the count for one type.
    pub fn get(&self, kind: BlockType) -> u32 {
        self.0[kind.index()]
    }

    /// Returns `true` when every count in `self` is at least the one in `required`.
    pub fn covers(&self, required: &Resources) -> bool {
        self.0.iter().zip(required.0.iter()).all(|(have, need)| have >= need)
    }

    /// Logic types where `self` holds fewer cells than `required`.
    pub fn shortfalls<'a>(&'a self, required: &'a Resources) -> impl Iterator<Item = BlockType> + 'a {
        BlockType::LOGIC
            .into_iter()
            .filter(move |&kind| self.get(kind) < required.get(kind))
    }

    /// Total number of cells counted.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Iterates over `(type, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (BlockType, u32)> + '_ {
        BlockType::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

impl Index<BlockType> for Resources {
    type Output = u32;

    fn index(&self, kind: BlockType) -> &u32 {
        &self.0[kind.index()]
    }
}

impl IndexMut<BlockType> for Resources {
    fn index_mut(&mut self, kind: BlockType) -> &mut u32 {
        &mut self.0[kind.index()]
    }
}

impl Add for Resources {
    type Output = Resources;

    fn add(mut self, rhs: Resources) -> Resources {
        self += rhs;
        self
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Resources) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

/// Element-wise subtraction. Callers guarantee `self` covers `rhs`.
impl Sub for Resources {
    type Output = Resources;

    fn sub(mut self, rhs: Resources) -> Resources {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
        self
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} CLB, {} BRAM, {} DSP",
            self[BlockType::Clb],
            self[BlockType::Bram],
            self[BlockType::Dsp]
        )
    }
}
