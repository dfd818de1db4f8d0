//! Error types for board construction, design validation, and parsing.

use crate::block::BlockType;

/// Errors raised when a board's tables disagree with its dimensions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The board has no rows or no columns.
    #[error("board must have at least one row and one column")]
    Empty,

    /// The tile height is zero.
    #[error("tile height must be at least 1")]
    ZeroTileHeight,

    /// A row has the wrong number of cells.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Zero-based row index.
        row: usize,
        /// Cells found.
        found: usize,
        /// Cells expected.
        expected: usize,
    },

    /// A reconfiguration boundary table has the wrong length.
    #[error("{side} boundary table has {found} entries, expected {expected}")]
    BoundaryLength {
        /// `"left"` or `"right"`.
        side: &'static str,
        /// Entries found.
        found: usize,
        /// Entries expected.
        expected: usize,
    },

    /// A cell character is not a known block type.
    #[error("unknown cell '{0}'")]
    UnknownCell(char),
}

/// Errors raised when design parts are inconsistent with each other.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    /// The wire matrix is not `N x N` for `N` regions.
    #[error("wire matrix must be {regions}x{regions}, found a row of {found}")]
    WireMatrixShape {
        /// Number of regions.
        regions: usize,
        /// Offending row or column count.
        found: usize,
    },

    /// A region's ID does not match its position.
    #[error("region at position {position} carries id {id}")]
    RegionOrder {
        /// Position in the region list.
        position: usize,
        /// ID found there.
        id: u32,
    },

    /// An IO connection lies outside the board.
    #[error("region {region} has an IO pin at ({x}, {y}) outside the board")]
    IoOutOfBoard {
        /// Owning region index.
        region: usize,
        /// Zero-based column.
        x: usize,
        /// Zero-based row.
        y: usize,
    },
}

/// One block type the board cannot supply in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceShortage {
    /// The lacking block type.
    pub kind: BlockType,
    /// Aggregate demand over all regions.
    pub required: u32,
    /// Cells of that type on the board.
    pub available: u32,
}

/// The summed regional demand exceeds the board's supply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "design requires more resources than the board provides: {}",
    describe_shortages(.shortages)
)]
pub struct InfeasibleDesign {
    /// Every lacking type. Never empty.
    pub shortages: Vec<ResourceShortage>,
}

/// Errors raised while reading a design file.
#[derive(Debug, thiserror::Error)]
pub enum DesignParseError {
    /// The design file could not be read.
    #[error("failed to read design: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended while more data was expected.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// A line could not be interpreted.
    #[error("line {line}: {message}")]
    Syntax {
        /// One-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The board section is inconsistent.
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),

    /// The parsed parts do not form a valid design.
    #[error("invalid design: {0}")]
    Design(#[from] DesignError),
}

fn describe_shortages(shortages: &[ResourceShortage]) -> String {
    shortages
        .iter()
        .map(|s| format!("{} {} required, {} available", s.required, s.kind, s.available))
        .collect::<Vec<_>>()
        .join("; ")
}
