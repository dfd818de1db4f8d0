//! Error types raised while shaping, placing, and searching.

use crate::area::Area;
use partplace_common::{GridPoint, InternalError};
use partplace_device::{InfeasibleDesign, RegionId};

/// A rectangle change would leave the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AreaError {
    /// The requested rectangle does not fit on the board.
    #[error("area for {region} at {top_left} spanning {width}x{height} leaves the board")]
    OutOfRange {
        /// Owning region.
        region: RegionId,
        /// Requested top-left corner.
        top_left: GridPoint,
        /// Requested width offset.
        width: usize,
        /// Requested height offset.
        height: usize,
    },
}

/// Errors raised by an [`AreaPlacer`](crate::AreaPlacer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    /// No admissible rectangle exists for the region in the current floorplan.
    /// Recoverable: the search disrupts the floorplan and retries.
    #[error("no admissible rectangle for {region} in the current floorplan")]
    PlacementFailure {
        /// The region that could not be placed.
        region: RegionId,
    },

    /// A reducer broke one of its own guarantees.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Errors raised when scoring a floorplan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FloorplanError {
    /// Only complete floorplans have a score.
    #[error("floorplan is not fully placed: {pending} regions pending")]
    NotFullyPlaced {
        /// Number of unconfirmed areas.
        pending: usize,
    },
}

/// Errors returned by [`solve`](crate::solve).
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// Aggregate demand exceeds the board's supply; no search was attempted.
    #[error(transparent)]
    InfeasibleDesign(#[from] InfeasibleDesign),

    /// The disruption budget ran out before every region was placed.
    #[error("{unplaced} of {total} regions could not be placed after {disruptions} disruptions")]
    Infeasible {
        /// Regions left unplaced in the best partial floorplan.
        unplaced: usize,
        /// Regions in the design.
        total: usize,
        /// Disruptions spent.
        disruptions: usize,
        /// Areas of the partial floorplan with the fewest unplaced regions.
        best: Vec<Area>,
    },

    /// A solver component broke one of its guarantees.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<FloorplanError> for SolveError {
    fn from(err: FloorplanError) -> Self {
        SolveError::Internal(InternalError::new(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = PlaceError::PlacementFailure {
            region: RegionId::from_raw(2),
        };
        assert_eq!(
            err.to_string(),
            "no admissible rectangle for R2 in the current floorplan"
        );

        let err = SolveError::Infeasible {
            unplaced: 1,
            total: 4,
            disruptions: 30,
            best: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "1 of 4 regions could not be placed after 30 disruptions"
        );
    }

    #[test]
    fn scoring_errors_become_internal() {
        let err: SolveError = FloorplanError::NotFullyPlaced { pending: 2 }.into();
        assert!(matches!(err, SolveError::Internal(_)));
    }
}
